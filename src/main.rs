use clap::Parser;
use envoy2prom::{credential, ApiManager, Cli, Config, DeviceHandle, TelemetryCollector};
use log::{error, info};
use std::io;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Initialize logging
    let default_filter = std::env::var("ENVOY2PROM_LOG_LEVEL").unwrap_or("info".to_string());
    env_logger::init_from_env(env_logger::Env::new().default_filter_or(default_filter));

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref()).map_err(|e| {
        error!("{e}");
        io::Error::other(e)
    })?;
    config.apply_cli(&cli);

    info!("port: {}, listen: {}, target: {}", config.httpd.port, config.httpd.listen, config.envoy.target);

    // Nothing is served with an unresolved token
    let token = credential::resolve(&config.envoy.token).map_err(|e| {
        error!("{e}");
        io::Error::other(e)
    })?;

    let timeout = config.envoy.request_timeout();
    let handle = Arc::new(DeviceHandle::envoy(config.envoy.target.clone(), token, timeout));
    let collector = TelemetryCollector::new(handle, timeout);

    ApiManager::new(config.httpd.clone()).start_thread(collector).await
}
