use actix_web::{middleware::Logger, web, App, HttpResponse, HttpServer};
use dotenv::dotenv;
use log::{error, info};

mod auth;
mod config;
mod db;
mod error;
mod models;
mod routes;
#[cfg(test)]
mod test_support;

use config::Config;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let pool = match db::connect(&config.database_url, config.database_max_connections).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to create pool: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = auth::ensure_superuser(&pool, &config).await {
        error!("Failed to create superuser: {}", e);
        std::process::exit(1);
    }

    let server_address = config.server_address.clone();
    info!("Server running at http://{}", server_address);

    let config = web::Data::new(config);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(web::Data::new(pool.clone()))
            .app_data(config.clone())
            .route("/", web::get().to(|| async { HttpResponse::Ok().body("Hello, this is the todo tracker API.") }))
            .configure(routes::routes::configure)
    })
    .bind(server_address)?
    .run()
    .await
}
