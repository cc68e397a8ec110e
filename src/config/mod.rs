//! config/mod.rs
//! Configuración del servicio (entorno + valores por defecto de PDF).

pub mod pdf_config;
pub mod service_config;
