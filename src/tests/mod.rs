//! tests/mod.rs
//! Pruebas de la política de backend, la vista de impresión y los endpoints.

mod pdf_tests;
mod print_view_tests;
mod registry_tests;
