use super::{solve, SolverConfig, SolverError, TransportSolver};
use crate::domain::allocation::{CostMatrix, ProblemInstance, ShipmentPlan, Store, Warehouse};
use crate::domain::types::{AllocationMode, SolveStatus};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

// ==========================================
// 测试辅助函数
// ==========================================

/// 按稠密矩阵构造实例
fn create_instance(capacities: &[f64], demands: &[f64], costs: &[Vec<f64>]) -> ProblemInstance {
    let warehouses: Vec<Warehouse> = capacities
        .iter()
        .enumerate()
        .map(|(i, c)| Warehouse::new(format!("W{}", i + 1), *c))
        .collect();
    let stores: Vec<Store> = demands
        .iter()
        .enumerate()
        .map(|(j, d)| Store::new(format!("S{}", j + 1), *d))
        .collect();
    let matrix = CostMatrix::from_rows(&warehouses, &stores, costs).unwrap();
    ProblemInstance::new(warehouses, stores, matrix)
}

/// 随机生成总产能 ≥ 总需求的实例
fn random_feasible_instance(rng: &mut SmallRng) -> ProblemInstance {
    let w_count = rng.random_range(1..=4usize);
    let s_count = rng.random_range(1..=5usize);

    let mut capacities: Vec<f64> = (0..w_count).map(|_| rng.random_range(0..=30u32) as f64).collect();
    let demands: Vec<f64> = (0..s_count).map(|_| rng.random_range(0..=15u32) as f64).collect();
    let shortfall = demands.iter().sum::<f64>() - capacities.iter().sum::<f64>();
    if shortfall > 0.0 {
        capacities[0] += shortfall;
    }

    let costs: Vec<Vec<f64>> = (0..w_count)
        .map(|_| (0..s_count).map(|_| rng.random_range(0..=9u32) as f64).collect())
        .collect();
    create_instance(&capacities, &demands, &costs)
}

/// 校验方案满足全部约束
fn assert_plan_feasible(instance: &ProblemInstance, plan: &ShipmentPlan) {
    assert_eq!(plan.status, SolveStatus::Optimal);
    for store in &instance.stores {
        assert!(
            plan.inbound(&store.id) + 1e-9 >= store.demand,
            "门店{}入库{}低于需求{}",
            store.id,
            plan.inbound(&store.id),
            store.demand
        );
    }
    for warehouse in &instance.warehouses {
        assert!(
            plan.outbound(&warehouse.id) <= warehouse.capacity + 1e-9,
            "仓库{}出库{}超过产能{}",
            warehouse.id,
            plan.outbound(&warehouse.id),
            warehouse.capacity
        );
    }
    for flow in &plan.flows {
        assert!(flow.quantity > 0.0);
        assert_eq!(
            instance.costs.get(&flow.warehouse_id, &flow.store_id),
            Some(flow.unit_cost)
        );
    }

    let recomputed: f64 = plan.flows.iter().map(|f| f.quantity * f.unit_cost).sum();
    assert!((plan.total_cost.unwrap() - recomputed).abs() < 1e-6);
}

/// 最优性证书: 残量网络中不存在负费用环
fn assert_no_negative_cycle(instance: &ProblemInstance, plan: &ShipmentPlan) {
    let w_count = instance.warehouses.len();
    let s_count = instance.stores.len();
    let source = 0;
    let sink = w_count + s_count + 1;
    let eps = 1e-9;

    let mut edges: Vec<(usize, usize, f64)> = Vec::new();
    for (i, warehouse) in instance.warehouses.iter().enumerate() {
        let out = plan.outbound(&warehouse.id);
        if out < warehouse.capacity - eps {
            edges.push((source, 1 + i, 0.0));
        }
        if out > eps {
            edges.push((1 + i, source, 0.0));
        }
        for (j, store) in instance.stores.iter().enumerate() {
            if let Some(cost) = instance.costs.get(&warehouse.id, &store.id) {
                edges.push((1 + i, 1 + w_count + j, cost));
                if plan.flow(&warehouse.id, &store.id) > eps {
                    edges.push((1 + w_count + j, 1 + i, -cost));
                }
            }
        }
    }
    for (j, store) in instance.stores.iter().enumerate() {
        edges.push((1 + w_count + j, sink, 0.0));
        if plan.inbound(&store.id) > store.demand + eps {
            edges.push((sink, 1 + w_count + j, 0.0));
        }
    }
    edges.push((sink, source, 0.0));
    if plan.total_shipped() > eps {
        edges.push((source, sink, 0.0));
    }

    let n = sink + 1;
    let mut dist = vec![0.0f64; n];
    for round in 0..n {
        let mut improved = false;
        for &(u, v, c) in &edges {
            if dist[u] + c < dist[v] - eps {
                dist[v] = dist[u] + c;
                improved = true;
            }
        }
        if !improved {
            return;
        }
        assert!(round + 1 < n, "残量网络存在负环, 方案非最优");
    }
}

// ==========================================
// 测试用例 1: 典型场景
// ==========================================

#[test]
fn test_two_by_two_optimal_plan() {
    let instance = create_instance(&[10.0, 10.0], &[8.0, 8.0], &[vec![1.0, 3.0], vec![4.0, 2.0]]);

    let plan = solve(&instance).unwrap();

    assert_eq!(plan.status, SolveStatus::Optimal);
    assert_eq!(plan.flows.len(), 2);
    assert_eq!(plan.flow("W1", "S1"), 8.0);
    assert_eq!(plan.flow("W2", "S2"), 8.0);
    assert_eq!(plan.total_cost, Some(24.0));
    assert_plan_feasible(&instance, &plan);
}

#[test]
fn test_total_capacity_shortfall_is_infeasible() {
    let instance = create_instance(&[10.0, 10.0], &[15.0, 15.0], &[vec![1.0, 3.0], vec![4.0, 2.0]]);

    let plan = solve(&instance).unwrap();

    assert_eq!(plan.status, SolveStatus::Infeasible);
    assert!(plan.flows.is_empty());
    assert_eq!(plan.total_cost, None);
}

#[test]
fn test_disallowed_lanes_make_instance_infeasible() {
    // 总产能充足, 但 S2 只能由产能 3 的 W2 供货
    let warehouses = vec![Warehouse::new("W1", 20.0), Warehouse::new("W2", 3.0)];
    let stores = vec![Store::new("S1", 5.0), Store::new("S2", 5.0)];
    let mut costs = CostMatrix::new();
    costs.set("W1", "S1", 1.0);
    costs.set("W1", "S2", f64::INFINITY);
    costs.set("W2", "S2", 1.0);
    let instance = ProblemInstance::new(warehouses, stores, costs);

    let plan = solve(&instance).unwrap();

    assert_eq!(plan.status, SolveStatus::Infeasible);
    assert!(plan.flows.is_empty());
}

#[test]
fn test_split_supply_when_cheap_warehouse_runs_out() {
    // W1 便宜但产能只有 5
    let instance = create_instance(&[5.0, 20.0], &[12.0], &[vec![1.0], vec![3.0]]);

    let plan = solve(&instance).unwrap();

    assert_eq!(plan.flow("W1", "S1"), 5.0);
    assert_eq!(plan.flow("W2", "S1"), 7.0);
    assert_eq!(plan.total_cost, Some(26.0));
    assert_no_negative_cycle(&instance, &plan);
}

#[test]
fn test_empty_and_zero_demand_instances() {
    let instance = create_instance(&[10.0], &[0.0, 0.0], &[vec![1.0, 1.0]]);
    let plan = solve(&instance).unwrap();
    assert_eq!(plan.status, SolveStatus::Optimal);
    assert!(plan.flows.is_empty());
    assert_eq!(plan.total_cost, Some(0.0));

    let empty = ProblemInstance::default();
    let plan = solve(&empty).unwrap();
    assert_eq!(plan.status, SolveStatus::Optimal);
    assert!(plan.flows.is_empty());
}

#[test]
fn test_zero_cost_lanes_do_not_overship() {
    let instance = create_instance(&[100.0, 100.0], &[10.0, 20.0], &[vec![0.0, 0.0], vec![0.0, 0.0]]);

    let plan = solve(&instance).unwrap();

    assert_eq!(plan.total_shipped(), 30.0);
    assert_eq!(plan.inbound("S1"), 10.0);
    assert_eq!(plan.inbound("S2"), 20.0);
}

// ==========================================
// 测试用例 2: 随机实例性质
// ==========================================

#[test]
fn test_random_instances_are_feasible_and_optimal() {
    let mut rng = SmallRng::seed_from_u64(20240601);
    for _ in 0..200 {
        let instance = random_feasible_instance(&mut rng);
        let plan = solve(&instance).unwrap();
        assert_plan_feasible(&instance, &plan);
        assert_no_negative_cycle(&instance, &plan);
    }
}

#[test]
fn test_random_infeasible_instances() {
    let mut rng = SmallRng::seed_from_u64(7);
    for _ in 0..50 {
        let mut instance = random_feasible_instance(&mut rng);
        let total_capacity = instance.total_capacity();
        instance.stores[0].demand += total_capacity + 1.0;

        let plan = solve(&instance).unwrap();
        assert_eq!(plan.status, SolveStatus::Infeasible);
        assert!(plan.flows.is_empty());
        assert!(plan.total_cost.is_none());
    }
}

// ==========================================
// 测试用例 3: 确定性与并发
// ==========================================

#[test]
fn test_equal_cost_tie_breaks_lexically() {
    let warehouses = vec![Warehouse::new("WB", 10.0), Warehouse::new("WA", 10.0)];
    let stores = vec![Store::new("S1", 5.0)];
    let mut costs = CostMatrix::new();
    costs.set("WA", "S1", 1.0);
    costs.set("WB", "S1", 1.0);
    let instance = ProblemInstance::new(warehouses, stores, costs);

    let plan = solve(&instance).unwrap();

    assert_eq!(plan.flow("WA", "S1"), 5.0);
    assert_eq!(plan.flow("WB", "S1"), 0.0);
}

#[test]
fn test_identical_input_yields_identical_flows() {
    let mut rng = SmallRng::seed_from_u64(99);
    for _ in 0..50 {
        let instance = random_feasible_instance(&mut rng);
        let first = solve(&instance).unwrap();
        let second = solve(&instance).unwrap();
        assert_eq!(first, second);

        // 输入顺序不影响结果
        let mut reversed = instance.clone();
        reversed.warehouses.reverse();
        reversed.stores.reverse();
        assert_eq!(solve(&reversed).unwrap(), first);
    }
}

#[test]
fn test_concurrent_solves_share_solver() {
    let solver = TransportSolver::default();
    let instance = create_instance(&[10.0, 10.0], &[8.0, 8.0], &[vec![1.0, 3.0], vec![4.0, 2.0]]);
    let expected = solver.solve(&instance).unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| solver.solve(&instance).unwrap()))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

// ==========================================
// 测试用例 4: 校验错误
// ==========================================

#[test]
fn test_negative_quantities_rejected() {
    let instance = create_instance(&[-1.0], &[1.0], &[vec![1.0]]);
    assert!(matches!(solve(&instance), Err(SolverError::InvalidInstance(_))));

    let instance = create_instance(&[10.0], &[-2.0], &[vec![1.0]]);
    assert!(matches!(solve(&instance), Err(SolverError::InvalidInstance(_))));

    let instance = create_instance(&[f64::NAN], &[1.0], &[vec![1.0]]);
    assert!(matches!(solve(&instance), Err(SolverError::InvalidInstance(_))));
}

#[test]
fn test_negative_cost_rejected_before_feasibility() {
    // 即使总产能不足, 非法运费也优先报告为校验错误
    let instance = create_instance(&[1.0], &[5.0], &[vec![-1.0]]);
    assert!(matches!(solve(&instance), Err(SolverError::InvalidInstance(_))));
}

#[test]
fn test_duplicate_and_unknown_ids_rejected() {
    let warehouses = vec![Warehouse::new("W1", 10.0), Warehouse::new("W1", 5.0)];
    let stores = vec![Store::new("S1", 1.0)];
    let instance = ProblemInstance::new(warehouses, stores, CostMatrix::new());
    assert!(matches!(solve(&instance), Err(SolverError::InvalidInstance(_))));

    let mut costs = CostMatrix::new();
    costs.set("W9", "S1", 1.0);
    let instance = ProblemInstance::new(
        vec![Warehouse::new("W1", 10.0)],
        vec![Store::new("S1", 1.0)],
        costs,
    );
    assert!(matches!(solve(&instance), Err(SolverError::InvalidInstance(_))));
}

#[test]
fn test_fractional_quantity_rejected_in_integral_mode() {
    let instance = create_instance(&[10.0], &[2.5], &[vec![1.0]]);
    assert!(matches!(solve(&instance), Err(SolverError::InvalidInstance(_))));
}

// ==========================================
// 测试用例 5: 配置项
// ==========================================

#[test]
fn test_fractional_mode_keeps_precision() {
    let solver = TransportSolver::new(SolverConfig {
        integral: false,
        ..SolverConfig::default()
    });
    let instance = create_instance(&[2.5, 10.0], &[3.25], &[vec![1.0], vec![2.0]]);

    let plan = solver.solve(&instance).unwrap();

    assert_eq!(plan.flow("W1", "S1"), 2.5);
    assert_eq!(plan.flow("W2", "S1"), 0.75);
    assert!((plan.total_cost.unwrap() - 4.0).abs() < 1e-9);
}

fn fractional_solver() -> TransportSolver {
    TransportSolver::new(SolverConfig {
        integral: false,
        ..SolverConfig::default()
    })
}

#[test]
fn test_fractional_mode_rejects_off_grid_quantities() {
    let solver = fractional_solver();

    // 8.0005 不在 1/1000 网格上, 报校验错误而非 INFEASIBLE
    let instance = create_instance(&[8.0005], &[8.0005], &[vec![1.0]]);
    assert!(matches!(solver.solve(&instance), Err(SolverError::InvalidInstance(_))));

    let instance = create_instance(&[0.0006, 0.0006], &[0.001], &[vec![1.0], vec![1.0]]);
    assert!(matches!(solver.solve(&instance), Err(SolverError::InvalidInstance(_))));
}

#[test]
fn test_fractional_mode_sufficient_capacity_is_optimal() {
    let solver = fractional_solver();

    let instance = create_instance(&[0.0005, 0.0005], &[0.001], &[vec![1.0], vec![2.0]]);
    let plan = solver.solve(&instance).unwrap();
    assert_plan_feasible(&instance, &plan);
    assert_eq!(plan.inbound("S1"), 0.001);

    // 浮点累加误差（0.1 + 0.2 ≠ 0.3）不影响可行性判定
    let instance = create_instance(&[0.3], &[0.1, 0.2], &[vec![1.0, 1.0]]);
    let plan = solver.solve(&instance).unwrap();
    assert_plan_feasible(&instance, &plan);
    assert!((plan.outbound("W1") - 0.3).abs() < 1e-9);
}

#[test]
fn test_best_effort_serves_max_demand_at_min_cost() {
    let solver = TransportSolver::new(SolverConfig {
        mode: AllocationMode::BestEffort,
        ..SolverConfig::default()
    });
    let instance = create_instance(&[6.0, 4.0], &[8.0, 8.0], &[vec![1.0, 3.0], vec![4.0, 2.0]]);

    let plan = solver.solve(&instance).unwrap();

    assert_eq!(plan.status, SolveStatus::Optimal);
    assert_eq!(plan.total_shipped(), 10.0);
    assert_eq!(plan.flow("W1", "S1"), 6.0);
    assert_eq!(plan.flow("W2", "S2"), 4.0);
    assert_eq!(plan.total_cost, Some(14.0));
}

#[test]
fn test_best_effort_matches_strict_when_feasible() {
    let best_effort = TransportSolver::new(SolverConfig {
        mode: AllocationMode::BestEffort,
        ..SolverConfig::default()
    });
    let instance = create_instance(&[10.0, 10.0], &[8.0, 8.0], &[vec![1.0, 3.0], vec![4.0, 2.0]]);

    assert_eq!(best_effort.solve(&instance).unwrap(), solve(&instance).unwrap());
}

#[test]
fn test_iteration_limit_reports_nonconvergence() {
    let solver = TransportSolver::new(SolverConfig {
        max_iterations: 1,
        ..SolverConfig::default()
    });
    let instance = create_instance(&[10.0, 10.0], &[8.0, 8.0], &[vec![1.0, 3.0], vec![4.0, 2.0]]);

    assert_eq!(
        solver.solve(&instance),
        Err(SolverError::DidNotConverge { iterations: 1 })
    );
}
