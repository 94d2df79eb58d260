/// Photoshare Server - photo-sharing social backend
///
/// Main server entry point. Handles:
/// - Command-line argument parsing
/// - Database initialization
/// - HTTP server startup
use actix_web::web;
use photoshare_server::auth::AuthKeys;
use photoshare_server::config::Config;
use photoshare_server::{db, server};
use std::fs;
use std::process;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_default_env()
        .format_timestamp_millis()
        .init();

    let config = Config::from_args();

    log::info!("Starting Photoshare Server");
    log::info!("Database: {:?}", config.database);
    log::info!("Port: {}", config.port);
    log::info!("Token TTL: {}s", config.token_ttl_secs);

    // Write PID file if specified
    if let Some(pidfile) = &config.pidfile {
        let pid = process::id().to_string();
        fs::write(pidfile, pid).expect("Failed to write PID file");
        log::info!("PID file written to: {:?}", pidfile);
    }

    // Initialize database
    let pool =
        db::create_pool(config.database.to_str().unwrap()).expect("Failed to create database pool");

    log::info!("Database initialized");

    let pool_data = web::Data::new(pool);
    let auth_keys = web::Data::new(AuthKeys::new(&config.jwt_secret, config.token_ttl_secs));

    // Start HTTP server
    let bind_addr = format!("127.0.0.1:{}", config.port);
    log::info!("Starting HTTP server on {}", bind_addr);

    let http_server = server::create_http_server(pool_data, auth_keys, &bind_addr)?;
    http_server.await
}
