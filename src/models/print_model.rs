//! models/print_model.rs
//! Requests/responses de la vista de impresión y del formulario de formatos.

use serde::{Deserialize, Serialize};

use crate::models::{notice_model::Notice, print_format_model::PrintFormatConfig};

#[derive(Debug, Clone, Deserialize)]
pub struct PrintViewRequest {
    pub doctype: String,
    pub name: String,
    /// Formato seleccionado en la vista.
    pub format: Option<String>,
    #[serde(default)]
    pub no_letterhead: bool,
    pub letterhead: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrintViewResponse {
    pub title: String,
    pub format: Option<String>,
    /// Campos del doctype según sus metadatos.
    pub fields: Vec<String>,
    pub notices: Vec<Notice>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrintFormatResponse {
    pub config: PrintFormatConfig,
    pub notices: Vec<Notice>,
    /// El botón "Test Puppeteer PDF" sólo existe con el diseñador activo.
    pub test_available: bool,
}

/// Fallo de impresión con los avisos que ya se habían mostrado.
#[derive(Debug, Clone, Serialize)]
pub struct PrintFailureResponse {
    pub success: bool,
    pub message: String,
    pub notices: Vec<Notice>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TestPdfResponse {
    pub success: bool,
    pub notices: Vec<Notice>,
}

/// Estado del proceso Chrome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ChromeStatus {
    Running { port: u16 },
    Stopped,
    Error,
}
