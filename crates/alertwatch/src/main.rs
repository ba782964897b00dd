use std::path::PathBuf;
use std::sync::Arc;

use alerts_client::AlertsClient;
use alertwatch_core::{AlertWatcher, Handler, HandlerArgs, Scheduler, WatchConfig};
use anyhow::Context;
use tracing::info;

const ENV_CONFIG: &str = "ALERTWATCH_CONFIG";
const ENV_TOKEN: &str = "ALERTS_IN_UA_TOKEN";
const ENV_BASE_URL: &str = "ALERTS_IN_UA_BASE_URL";
const DEFAULT_CONFIG: &str = "alertwatch.yaml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_target(false)
        .init();

    let config_path =
        PathBuf::from(std::env::var(ENV_CONFIG).unwrap_or_else(|_| DEFAULT_CONFIG.to_string()));
    let config = WatchConfig::load(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    let token = std::env::var(ENV_TOKEN).with_context(|| format!("{ENV_TOKEN} is not set"))?;
    let client = match std::env::var(ENV_BASE_URL) {
        Ok(base_url) => AlertsClient::with_base_url(token, base_url),
        Err(_) => AlertsClient::new(token),
    };

    let mut args = HandlerArgs::new();
    args.insert("target".into(), serde_json::json!("stdout"));
    let watcher = AlertWatcher::builder(config)
        .source(client)
        .handler(Handler::new("log", log_alerts).with_args(args))
        .build()
        .context("invalid region configuration")?;

    let mut handle = Scheduler::start(Arc::new(watcher));
    tokio::select! {
        result = handle.join() => return result.context("alert scheduler halted"),
        _ = tokio::signal::ctrl_c() => info!("interrupted, waiting for in-flight cycles"),
    }

    handle.stop();
    handle.join().await.context("alert scheduler halted")
}

async fn log_alerts(
    alerts: Vec<alertwatch_core::NotificationAlert>,
    args: HandlerArgs,
) -> anyhow::Result<()> {
    for alert in alerts {
        let state = if alert.alert_active { "ALERT" } else { "clear" };
        info!(
            location_id = alert.location_id,
            target = ?args.get("target"),
            "{state}: {}",
            alert.title
        );
    }
    Ok(())
}
