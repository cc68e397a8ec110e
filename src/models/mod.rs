//! models/mod.rs
//! Módulo raíz para modelos/estructuras compartidas.

pub mod document_model;
pub mod notice_model;
pub mod pdf_model;
pub mod print_format_model;
pub mod print_model;
