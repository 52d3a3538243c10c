use actix_web::{middleware::Logger, web, App, HttpServer};
use taskdeck_server::{config::Config, routes, AppState};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(error) => {
            log::error!("configuration error: {error}");
            std::process::exit(1);
        }
    };
    if config.tokens.is_empty() {
        log::warn!("TASKDECK_TOKENS is empty, every request will be rejected");
    }

    let state = match AppState::from_config(&config).await {
        Ok(state) => web::Data::new(state),
        Err(error) => {
            log::error!("failed to initialize state: {error}");
            std::process::exit(1);
        }
    };

    let (host, port) = config.bind_address();
    log::info!("listening on {host}:{port}");

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(routes::configure)
    })
    .bind((host, port))?
    .run()
    .await
}
