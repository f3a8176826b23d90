use std::time::Duration;

use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger, web, App, HttpServer};
use quizmaster_server::{
    app_state::AppState, config::Config, handlers, middleware::RequestIdMiddleware,
    repositories::run_expiry_sweep,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };

    let bind_address = (config.web_server_host.clone(), config.web_server_port);
    let allowed_origin = config.cors_allowed_origin.clone();
    log::info!(
        "Using model {} at {} ({} attempts, {}s timeout)",
        config.model,
        config.api_base,
        config.max_attempts,
        config.request_timeout_secs
    );

    let session_ttl = config.session_ttl();
    let state = AppState::new(config);

    if let Some(ttl) = session_ttl {
        let period = (ttl / 4).clamp(Duration::from_secs(1), Duration::from_secs(60));
        log::info!("Idle sessions expire after {:?}", ttl);
        actix_web::rt::spawn(run_expiry_sweep(state.session_repository.clone(), period));
    }

    log::info!(
        "Starting HTTP server on {}:{}",
        bind_address.0,
        bind_address.1
    );

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&allowed_origin)
            .allowed_methods(vec!["GET", "POST", "DELETE"])
            .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT, header::IF_NONE_MATCH])
            .expose_headers(vec![
                header::CONTENT_DISPOSITION,
                header::ETAG,
                header::HeaderName::from_static("x-request-id"),
            ])
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(cors)
            .wrap(Logger::default())
            .wrap(RequestIdMiddleware)
            .configure(handlers::configure)
    })
    .bind(bind_address)?
    .run()
    .await
}
