// ==========================================
// 零售分析驾驶舱 - 命令行入口
// ==========================================
// 用法:
//   retail-analytics allocation [--instance <file.json>]
//   retail-analytics forecast [--region R] [--category C] [--sub-category S] [--days N]
//   retail-analytics config show
//   retail-analytics config set <key> <value>
// 输出: JSON 写入 stdout, 日志写入 stderr
// ==========================================

use std::collections::HashMap;
use std::process::ExitCode;

use anyhow::{bail, Context};
use retail_analytics::api::{ApiError, ErrorClass, ForecastQuery};
use retail_analytics::app::{get_default_db_path, AppState};
use retail_analytics::domain::ProblemInstance;
use retail_analytics::i18n::t;

#[tokio::main]
async fn main() -> ExitCode {
    retail_analytics::logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => match err.downcast::<ApiError>() {
            Ok(api_err) => {
                let response = api_err.to_response();
                tracing::error!(code = %response.code, "{}", response.message);
                match serde_json::to_string_pretty(&response) {
                    Ok(json) => println!("{}", json),
                    Err(e) => eprintln!("{}", e),
                }
                match response.class {
                    ErrorClass::ClientInput => ExitCode::from(2),
                    ErrorClass::ServiceDegraded => ExitCode::from(3),
                    ErrorClass::Internal => ExitCode::FAILURE,
                }
            }
            Err(other) => {
                eprintln!("{:#}", other);
                ExitCode::FAILURE
            }
        },
    }
}

async fn run(args: &[String]) -> anyhow::Result<()> {
    let command = args.first().map(String::as_str).unwrap_or("help");
    if matches!(command, "help" | "--help" | "-h") {
        print_usage();
        return Ok(());
    }

    let db_path = get_default_db_path();
    tracing::info!("{} v{} - 数据库: {}", retail_analytics::APP_NAME, retail_analytics::VERSION, db_path);
    let state = AppState::new(db_path).map_err(anyhow::Error::msg)?;

    match command {
        "allocation" => {
            let options = parse_options(&args[1..])?;
            let report = match options.get("instance") {
                Some(path) => {
                    let raw = std::fs::read_to_string(path)
                        .with_context(|| format!("无法读取调拨实例文件: {}", path))?;
                    let instance: ProblemInstance = serde_json::from_str(&raw)
                        .map_err(|e| ApiError::InvalidInput(format!("调拨实例格式错误: {}", e)))?;
                    state.allocation_api.compute_report_for_instance(&instance).await?
                }
                None => state.allocation_api.compute_allocation_report().await?,
            };
            tracing::info!("{}", t(&format!("allocation.status.{}", report.status)));
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        "forecast" => {
            let mut options = parse_options(&args[1..])?;
            if let Some(sub_category) = options.remove("sub-category") {
                options.insert("sub_category".to_string(), sub_category);
            }
            let query = ForecastQuery::from_params(&options)?;
            let points = state.forecast_api.forecast(&query).await?;
            println!("{}", serde_json::to_string_pretty(&points)?);
        }
        "config" => match args.get(1).map(String::as_str) {
            Some("show") | None => {
                let snapshot = state
                    .config_manager
                    .get_config_snapshot()
                    .map_err(anyhow::Error::msg)?;
                println!("{}", snapshot);
            }
            Some("set") => {
                let (key, value) = match (args.get(2), args.get(3)) {
                    (Some(k), Some(v)) => (k, v),
                    _ => bail!("用法: config set <key> <value>"),
                };
                state
                    .config_manager
                    .set_global_config_value(key, value)
                    .map_err(anyhow::Error::msg)?;
                tracing::info!(key = %key, value = %value, "配置已更新");
            }
            Some(other) => bail!("未知的 config 子命令: {}", other),
        },
        other => {
            print_usage();
            bail!("未知命令: {}", other);
        }
    }

    Ok(())
}

/// 解析 --key value 形式的选项
fn parse_options(args: &[String]) -> anyhow::Result<HashMap<String, String>> {
    let mut options = HashMap::new();
    let mut iter = args.iter();
    while let Some(flag) = iter.next() {
        let key = match flag.strip_prefix("--") {
            Some(k) if !k.is_empty() => k,
            _ => bail!("无法识别的参数: {}", flag),
        };
        let value = iter
            .next()
            .with_context(|| format!("参数 --{} 缺少取值", key))?;
        options.insert(key.to_string(), value.clone());
    }
    Ok(options)
}

fn print_usage() {
    eprintln!(
        "{} v{}\n\n\
         用法:\n  \
         retail-analytics allocation [--instance <file.json>]\n  \
         retail-analytics forecast [--region R] [--category C] [--sub-category S] [--days N]\n  \
         retail-analytics config show\n  \
         retail-analytics config set <key> <value>",
        retail_analytics::APP_NAME,
        retail_analytics::VERSION
    );
}
