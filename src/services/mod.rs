//! services/mod.rs
//! Módulo que agrupa distintos "servicios" o "capas de negocio" de la app.

pub mod backend_policy;
pub mod chrome_manager;
pub mod form_events;
pub mod host_context;
pub mod local_host;
pub mod pdf_service;
pub mod print_format_service;
pub mod print_view;
pub mod units;
