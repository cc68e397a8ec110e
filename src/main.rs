use actix_web::{web, App, HttpServer};
use dotenv::dotenv;

use crate::config::service_config::ServiceConfig;
use crate::logger::init_logger;
use crate::services::chrome_manager::ChromeManager;
use crate::services::local_host::Registry;
use crate::services::pdf_service::PdfService;

mod app;
mod config;
mod handlers;
mod logger;
mod models;
mod services;

#[cfg(test)]
mod tests;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok(); // Cargar .env al inicio
    init_logger();

    let config = ServiceConfig::from_env().expect("Configuración inválida");

    // Chrome se arranca bajo demanda, en la primera petición que lo necesite
    let chrome = ChromeManager::new(config.chrome.clone());
    let pdf_service =
        PdfService::new(&config, chrome.clone()).expect("No se pudo inicializar PdfService");

    let registry = Registry::new();

    log::info!("Levantando servidor en {}:{}", config.bind_addr, config.port);
    let result = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pdf_service.clone()))
            .app_data(web::Data::new(registry.clone()))
            .configure(app::init_app)
    })
    .bind((config.bind_addr.as_str(), config.port))?
    .run()
    .await;

    if let Err(e) = chrome.stop().await {
        log::warn!("No se pudo detener Chrome: {:?}", e);
    }
    result
}
