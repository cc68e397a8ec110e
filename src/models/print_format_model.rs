//! models/print_format_model.rs
//! Configuración de un print format y los campos que el formulario puede editar.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::pdf_model::PdfOrientation;

/// Motor que convierte el HTML del formato en PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PdfBackend {
    /// Chrome headless vía DevTools.
    #[serde(rename = "puppeteer", alias = "chrome")]
    Puppeteer,
    /// wkhtmltopdf.
    #[default]
    #[serde(rename = "wkhtmltopdf")]
    LegacyRenderer,
}

impl PdfBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            PdfBackend::Puppeteer => "puppeteer",
            PdfBackend::LegacyRenderer => "wkhtmltopdf",
        }
    }
}

impl fmt::Display for PdfBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrintFormatConfig {
    pub name: String,

    /// Formato construido con el diseñador visual.
    #[serde(rename = "print_designer", default)]
    pub uses_advanced_designer: bool,

    #[serde(rename = "pdf_generator", default)]
    pub pdf_backend: PdfBackend,

    #[serde(default)]
    pub pdf_page_orientation: PdfOrientation,

    /// Plantilla HTML del formato.
    #[serde(default)]
    pub html: Option<String>,
}

impl PrintFormatConfig {
    pub fn new(name: impl Into<String>, uses_advanced_designer: bool, pdf_backend: PdfBackend) -> Self {
        Self {
            name: name.into(),
            uses_advanced_designer,
            pdf_backend,
            pdf_page_orientation: PdfOrientation::Portrait,
            html: None,
        }
    }

    /// Combinación que el formulario desaconseja (diseñador sin Puppeteer).
    pub fn prefers_other_backend(&self) -> bool {
        self.uses_advanced_designer && self.pdf_backend != PdfBackend::Puppeteer
    }

    /// Valor de un campo por nombre, como lo expondría el host.
    pub fn field_value(&self, field: &str) -> Option<Value> {
        match field {
            fields::NAME => Some(Value::String(self.name.clone())),
            fields::PRINT_DESIGNER => Some(Value::Bool(self.uses_advanced_designer)),
            fields::PDF_GENERATOR => Some(Value::String(self.pdf_backend.as_str().to_string())),
            fields::PDF_PAGE_ORIENTATION => {
                Some(Value::String(self.pdf_page_orientation.as_str().to_string()))
            }
            fields::HTML => Some(self.html.clone().map(Value::String).unwrap_or(Value::Null)),
            _ => None,
        }
    }

    /// Escribe un campo desde un valor JSON del formulario.
    pub fn set_field(&mut self, field: &str, value: Value) -> Result<(), String> {
        match field {
            fields::PRINT_DESIGNER => {
                self.uses_advanced_designer = match value {
                    Value::Bool(b) => b,
                    // el formulario manda los checkbox como 0/1
                    Value::Number(n) => n.as_i64().map(|v| v != 0).unwrap_or(false),
                    other => return Err(format!("print_designer no acepta {}", other)),
                };
            }
            fields::PDF_GENERATOR => {
                self.pdf_backend = serde_json::from_value(value).map_err(|e| e.to_string())?;
            }
            fields::PDF_PAGE_ORIENTATION => {
                self.pdf_page_orientation =
                    serde_json::from_value(value).map_err(|e| e.to_string())?;
            }
            fields::HTML => {
                self.html = match value {
                    Value::Null => None,
                    Value::String(s) => Some(s),
                    other => return Err(format!("html no acepta {}", other)),
                };
            }
            fields::NAME => return Err("name no se puede modificar".to_string()),
            other => return Err(format!("Campo desconocido: {}", other)),
        }
        Ok(())
    }
}

/// Nombres de campo del doctype Print Format.
pub mod fields {
    pub const NAME: &str = "name";
    pub const PRINT_DESIGNER: &str = "print_designer";
    pub const PDF_GENERATOR: &str = "pdf_generator";
    pub const PDF_PAGE_ORIENTATION: &str = "pdf_page_orientation";
    pub const HTML: &str = "html";
}

/// Cambio de un campo enviado por el formulario.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldChangeRequest {
    pub field: String,
    pub value: Value,
}

/// Cuerpo del PATCH: un campo suelto o un guardado con varios.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FieldChanges {
    One(FieldChangeRequest),
    Many(Vec<FieldChangeRequest>),
}
