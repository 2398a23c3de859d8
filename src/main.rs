use actix_files as fs;
use actix_web::{middleware::Logger, web::Data, App, HttpServer};
use dotenv::dotenv;
use log::{error, info, warn};

use consultancy_site::config::SiteConfig;
use consultancy_site::web::routes;
use consultancy_site::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize environment
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    info!("Starting consultancy site");

    let config = match SiteConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    if config.completion.api_key.is_none() {
        warn!("OPENAI_API_KEY is not set; /api/ai will answer with a configuration error");
    }
    if config.smtp.is_none() {
        warn!("SMTP is not configured; /api/contact will answer with a configuration error");
    }

    let bind = (config.host.clone(), config.port);
    let static_dir = config.static_dir.clone();

    let app_state = match AppState::from_config(config) {
        Ok(state) => Data::new(state),
        Err(e) => {
            error!("Failed to initialize application: {:#}", e);
            std::process::exit(1);
        }
    };

    info!("Listening on http://{}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(app_state.clone())
            .configure(routes::configure)
            .service(fs::Files::new("/static", &static_dir))
    })
    .bind(bind)?
    .run()
    .await
}
