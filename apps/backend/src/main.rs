use std::sync::Arc;

use actix::Actor;
use actix_web::{web, App, HttpServer};
use backend::adapters::{LogMailer, MemoryStatsStore};
use backend::config::TimingConfig;
use backend::middleware::cors::cors_middleware;
use backend::routes;
use backend::services::coordinator::Coordinator;
use backend::state::app_state::AppState;

mod telemetry;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    // Environment variables must be set by the runtime environment:
    // - Docker: Set via docker-compose env_file or docker run --env-file
    // - Local dev: Source env files manually (e.g., set -a; . ./.env; set +a)
    let host = std::env::var("BACKEND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("BACKEND_PORT")
        .unwrap_or_else(|_| "3001".to_string())
        .parse::<u16>()
        .unwrap_or_else(|_| {
            eprintln!("❌ BACKEND_PORT must be a valid port number");
            std::process::exit(1);
        });

    let timing = match TimingConfig::from_env() {
        Ok(timing) => timing,
        Err(e) => {
            eprintln!("❌ Invalid timing configuration: {e}");
            std::process::exit(1);
        }
    };

    println!("🚀 Starting Coinche Backend on http://{}:{}", host, port);

    let stats = Arc::new(MemoryStatsStore::new());
    let mailer = Arc::new(LogMailer);
    let coordinator = Coordinator::new(timing.clone(), stats, mailer).start();
    let data = web::Data::new(AppState::new(coordinator, timing));

    HttpServer::new(move || {
        App::new()
            .wrap(cors_middleware())
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
