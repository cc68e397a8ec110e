//! config/pdf_config.rs
//! Valores por defecto de página para los PDFs (milímetros).

use serde::{Deserialize, Serialize};

use crate::models::pdf_model::{PdfMargins, PdfOrientation, PdfPagePreset};

/// Configuración global de PDF, usada cuando la petición no trae el dato.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfGlobalConfig {
    pub default_orientation: PdfOrientation,
    pub default_page_preset: PdfPagePreset,
    pub default_page_width: f64,  // mm, sólo con preset Custom
    pub default_page_height: f64, // mm, sólo con preset Custom
    pub default_margins: PdfMargins,
    pub default_scale: f64,
}

impl Default for PdfGlobalConfig {
    fn default() -> Self {
        PdfGlobalConfig {
            default_orientation: PdfOrientation::Portrait,
            default_page_preset: PdfPagePreset::A4,
            default_page_width: 210.0,
            default_page_height: 297.0,
            default_margins: PdfMargins {
                top: 0.0,
                bottom: 0.0,
                left: 0.0,
                right: 0.0,
            },
            default_scale: 1.0,
        }
    }
}
