use actix_cors::Cors;
use actix_web::http::header;
use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use clap::Parser;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use mlops_dashboard::{api, config::DashboardConfig, AppState};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file path
    #[arg(short, long)]
    config: Option<String>,

    /// Log level
    #[arg(short, long)]
    log_level: Option<String>,

    /// Default API base URL for new sessions
    #[arg(long)]
    api_url: Option<String>,

    /// Listen port
    #[arg(short, long)]
    port: Option<u16>,
}

#[actix_web::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Flags win over file and environment
    let mut config = DashboardConfig::load(args.config.as_deref()).context("invalid configuration")?;
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    if let Some(api_url) = args.api_url {
        config.api.base_url = api_url;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    init_logging(&config.logging.level)?;

    let host = config.server.host.clone();
    let port = config.server.port;
    let cors_origins = config.server.cors_origins.clone();
    let max_upload_size = config.uploads.max_upload_size;

    info!("Forwarding to {}{}", config.api.base_url, config.api.api_prefix);
    let sweep_every = Duration::from_secs(config.ui.session_ttl_secs.clamp(1, 60));
    let app_state = web::Data::new(AppState::new(config));

    // Periodic idle-session sweep
    let sessions = app_state.sessions.clone();
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(sweep_every);
        loop {
            interval.tick().await;
            sessions.sweep();
        }
    });

    let server = HttpServer::new(move || {
        let cors = cors_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST"])
            .allowed_headers(vec![header::CONTENT_TYPE])
            .max_age(3600);

        App::new()
            .app_data(app_state.clone())
            .app_data(web::PayloadConfig::new(max_upload_size))
            .app_data(web::FormConfig::default().limit(max_upload_size))
            .wrap(cors)
            .configure(api::configure)
    })
    .bind((host.clone(), port))?
    .run();

    info!("MLOps dashboard started on {}:{}", host, port);

    server.await?;

    Ok(())
}

fn init_logging(level: &str) -> Result<()> {
    let log_level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();

    tracing::subscriber::set_global_default(subscriber).context("cannot install log subscriber")?;

    Ok(())
}
