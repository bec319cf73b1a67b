//! The lookup endpoint
//!
//! Serves WHOIS lookups over HTTP: navigate to `/example.com` to get the
//! availability verdict and the extracted record as JSON.
//!
//! For the API see the [httpd] module
mod httpd;

use actix_web::{web, App, HttpServer};
use tracing::{error, info};
use tracing_subscriber::prelude::*;
use whois_refer_lib::{
    load_env_config, ConfigManager, LookupConfig, WhoisChecker, WhoisError, DEFAULT_BIND,
};

/// Lookup configuration and listen address.
///
/// Precedence: defaults < config files (or `WR_CONFIG`) < `WR_*` variables.
fn load_settings() -> Result<(LookupConfig, String), WhoisError> {
    let config_manager = ConfigManager::new(false);
    let env_config = load_env_config(false);

    let file_config = match &env_config.config {
        Some(path) => config_manager.load_file(path)?,
        None => config_manager.discover_and_load()?,
    };

    let lookup = env_config.apply_to(file_config.apply_to(LookupConfig::default()));
    let bind = env_config
        .bind
        .clone()
        .or_else(|| file_config.bind().map(str::to_string))
        .unwrap_or_else(|| DEFAULT_BIND.to_string());

    Ok((lookup, bind))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let (lookup, bind) = load_settings().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;
    info!(
        "Root server {}:{}, timeout {:?}",
        lookup.root_server, lookup.port, lookup.timeout
    );

    let checker = web::Data::new(WhoisChecker::with_config(lookup));

    let server = HttpServer::new(move || {
        App::new()
            .configure(httpd::app_setup)
            .app_data(checker.clone())
    })
    .bind(&bind)
    .map_err(|e| {
        error!("Failed to bind {}: {}", bind, e);
        e
    })?;

    info!("Listening on {}", bind);
    server.run().await?;
    Ok(())
}
