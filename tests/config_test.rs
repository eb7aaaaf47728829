// ==========================================
// ConfigManager 集成测试
// ==========================================
// 测试目标: 默认值、覆写、格式错误回退
// ==========================================

mod test_helpers;

use retail_analytics::config::{config_keys, AllocationConfigReader, ConfigManager, ForecastConfigReader};
use retail_analytics::domain::types::{AllocationMode, DemandSourceKind};
use std::path::PathBuf;
use test_helpers::{create_test_db, open_test_connection, set_config};

#[tokio::test]
async fn test_allocation_defaults() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config = ConfigManager::new(&db_path).expect("Failed to create ConfigManager");

    assert_eq!(config.get_allocation_mode().await.unwrap(), AllocationMode::Strict);
    assert_eq!(config.get_solver_max_iterations().await.unwrap(), 100_000);
    assert!(config.get_integral_flow().await.unwrap());
    assert_eq!(config.get_demand_source().await.unwrap(), DemandSourceKind::Demo);
    assert_eq!(config.get_demand_lookback_days().await.unwrap(), 90);
    assert_eq!(config.get_lane_cost_near().await.unwrap(), 2.0);
    assert_eq!(config.get_lane_cost_far().await.unwrap(), 5.0);

    let warehouses = config.get_warehouse_network().await.unwrap();
    let ids: Vec<&str> = warehouses.iter().map(|w| w.id.as_str()).collect();
    assert_eq!(ids, vec!["WH_North", "WH_South", "WH_East", "WH_West"]);
    assert!(warehouses.iter().all(|w| w.capacity == 5000.0));
}

#[tokio::test]
async fn test_forecast_defaults() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config = ConfigManager::new(&db_path).unwrap();

    assert_eq!(config.get_band_ratio().await.unwrap(), 0.2);
    assert_eq!(config.get_assumed_discount().await.unwrap(), 0.1);
    assert_eq!(config.get_assumed_weather_index().await.unwrap(), 80.0);
    assert!(!config.get_assumed_is_promo().await.unwrap());
    assert_eq!(config.get_max_horizon_days().await.unwrap(), 365);
    assert!(config.get_model_dir().await.unwrap().ends_with("models"));
}

#[tokio::test]
async fn test_overrides() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let conn = open_test_connection(&db_path).unwrap();
    set_config(&conn, config_keys::ALLOCATION_MODE, "best_effort").unwrap();
    set_config(&conn, config_keys::INTEGRAL_FLOW, "0").unwrap();
    set_config(&conn, config_keys::DEMAND_SOURCE, "ORDER_HISTORY").unwrap();
    set_config(&conn, config_keys::DEMAND_LOOKBACK_DAYS, "30").unwrap();
    set_config(
        &conn,
        config_keys::WAREHOUSE_NETWORK,
        r#"[{"id": "DC_1", "capacity": 120, "region": "North"}]"#,
    )
    .unwrap();
    set_config(&conn, config_keys::MODEL_DIR, " /opt/models ").unwrap();
    set_config(&conn, config_keys::ASSUMED_IS_PROMO, "TRUE").unwrap();
    set_config(&conn, config_keys::BAND_RATIO, " 0.35 ").unwrap();

    let config = ConfigManager::new(&db_path).unwrap();

    assert_eq!(config.get_allocation_mode().await.unwrap(), AllocationMode::BestEffort);
    assert!(!config.get_integral_flow().await.unwrap());
    assert_eq!(config.get_demand_source().await.unwrap(), DemandSourceKind::OrderHistory);
    assert_eq!(config.get_demand_lookback_days().await.unwrap(), 30);
    let warehouses = config.get_warehouse_network().await.unwrap();
    assert_eq!(warehouses.len(), 1);
    assert_eq!(warehouses[0].region.as_deref(), Some("North"));
    assert_eq!(config.get_model_dir().await.unwrap(), PathBuf::from("/opt/models"));
    assert!(config.get_assumed_is_promo().await.unwrap());
    assert_eq!(config.get_band_ratio().await.unwrap(), 0.35);
}

#[tokio::test]
async fn test_malformed_values_fall_back_to_defaults() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let conn = open_test_connection(&db_path).unwrap();
    set_config(&conn, config_keys::ALLOCATION_MODE, "GREEDY").unwrap();
    set_config(&conn, config_keys::SOLVER_MAX_ITERATIONS, "many").unwrap();
    set_config(&conn, config_keys::DEMAND_LOOKBACK_DAYS, "-5").unwrap();
    set_config(&conn, config_keys::WAREHOUSE_NETWORK, "not json").unwrap();
    set_config(&conn, config_keys::BAND_RATIO, "1.5").unwrap();
    set_config(&conn, config_keys::MAX_HORIZON_DAYS, "0").unwrap();
    set_config(&conn, config_keys::INTEGRAL_FLOW, "maybe").unwrap();

    let config = ConfigManager::new(&db_path).unwrap();

    assert_eq!(config.get_allocation_mode().await.unwrap(), AllocationMode::Strict);
    assert_eq!(config.get_solver_max_iterations().await.unwrap(), 100_000);
    assert_eq!(config.get_demand_lookback_days().await.unwrap(), 90);
    assert_eq!(config.get_warehouse_network().await.unwrap().len(), 4);
    assert_eq!(config.get_band_ratio().await.unwrap(), 0.2);
    assert_eq!(config.get_max_horizon_days().await.unwrap(), 365);
    assert!(config.get_integral_flow().await.unwrap());
}

#[test]
fn test_set_value_and_snapshot() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config = ConfigManager::new(&db_path).unwrap();

    config.set_global_config_value(config_keys::LANE_COST_FAR, "7").unwrap();
    config.set_global_config_value(config_keys::LANE_COST_FAR, "8").unwrap();
    config.set_global_config_value(config_keys::BAND_RATIO, "0.1").unwrap();

    assert_eq!(
        config.get_global_config_value(config_keys::LANE_COST_FAR).unwrap(),
        Some("8".to_string())
    );

    let snapshot: serde_json::Value = serde_json::from_str(&config.get_config_snapshot().unwrap()).unwrap();
    assert_eq!(snapshot["lane_cost_far"], "8");
    assert_eq!(snapshot["band_ratio"], "0.1");
}
