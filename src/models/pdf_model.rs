//! models/pdf_model.rs
//! Estructuras de datos para requests/responses de PDF

use serde::{Deserialize, Serialize};

use crate::models::print_format_model::PdfBackend;

/// Márgenes en milímetros.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PdfMargins {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

/// Tamaño de papel en milímetros (sólo con `PdfPagePreset::Custom`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaperSize {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PdfOrientation {
    #[default]
    #[serde(alias = "portrait")]
    Portrait,
    #[serde(alias = "landscape")]
    Landscape,
}

impl PdfOrientation {
    pub fn as_str(&self) -> &'static str {
        match self {
            PdfOrientation::Portrait => "Portrait",
            PdfOrientation::Landscape => "Landscape",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PdfPagePreset {
    A3,
    #[default]
    A4,
    A5,
    Letter,
    Legal,
    Tabloid,
    Custom,
}

impl PdfPagePreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            PdfPagePreset::A3 => "A3",
            PdfPagePreset::A4 => "A4",
            PdfPagePreset::A5 => "A5",
            PdfPagePreset::Letter => "Letter",
            PdfPagePreset::Legal => "Legal",
            PdfPagePreset::Tabloid => "Tabloid",
            PdfPagePreset::Custom => "Custom",
        }
    }

    /// Dimensiones en mm (ancho, alto) en orientación vertical.
    pub fn dimensions_mm(&self) -> Option<(f64, f64)> {
        match self {
            PdfPagePreset::A3 => Some((297.0, 420.0)),
            PdfPagePreset::A4 => Some((210.0, 297.0)),
            PdfPagePreset::A5 => Some((148.0, 210.0)),
            PdfPagePreset::Letter => Some((215.9, 279.4)),
            PdfPagePreset::Legal => Some((215.9, 355.6)),
            PdfPagePreset::Tabloid => Some((279.4, 431.8)),
            PdfPagePreset::Custom => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PdfRequest {
    #[serde(default = "default_file_name")]
    pub file_name: String,
    /// HTML que vamos a renderizar.
    pub html: String,

    /// Print format que origina el documento (para resolver backend y orientación).
    pub print_format: Option<String>,

    /// Backend pedido explícitamente por el cliente.
    pub pdf_generator: Option<PdfBackend>,

    pub orientation: Option<PdfOrientation>,
    pub page_size_preset: Option<PdfPagePreset>,
    pub custom_page_size: Option<PaperSize>,
    pub margins: Option<PdfMargins>,
    pub scale: Option<f64>,
    pub page_ranges: Option<String>,

    /// Si es true, además se guarda el PDF en disco.
    pub store_local_pdf: Option<bool>,
}

fn default_file_name() -> String {
    "document.pdf".to_string()
}

#[derive(Debug, Clone, Serialize)]
pub struct PdfResponse {
    pub success: bool,
    pub message: String,
}

/// Resultado de una generación: bytes + backend que realmente se usó.
#[derive(Debug, Clone)]
pub struct GeneratedPdf {
    pub data: Vec<u8>,
    pub backend: PdfBackend,
    pub stored_at: Option<String>,
}

impl PdfRequest {
    #[allow(dead_code)]
    #[cfg(test)]
    pub fn test_new(html: String) -> Self {
        Self {
            file_name: "test.pdf".to_string(),
            html,
            ..Default::default()
        }
    }
}
