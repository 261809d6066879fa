use filedrop::config::{Config, DEFAULT_CONFIG_PATH};
use filedrop::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    // filedrop [CONFIG_PATH] [PORT]
    let mut args = std::env::args().skip(1);
    let config_path = args.next().unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    let mut cfg = Config::load(&config_path)?;
    if let Some(port) = args.next() {
        cfg.override_port(&port)?;
    }

    tokio::select! {
        res = server::listener::run(cfg) => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
