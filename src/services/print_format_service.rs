//! services/print_format_service.rs
//! Ajustes que los formatos del diseñador aplican al HTML y a los print settings.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::print_format_model::{PdfBackend, PrintFormatConfig};

const DESIGNER_ROOT_MARKER: &str = r#"<div id="__print_designer""#;
const BODY_OPEN: &str = "<body";
const BODY_OPEN_MARKED: &str = r#"<body data-puppeteer-pdf="true""#;

/// Print settings de una impresión; los campos que no conocemos se conservan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrintSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_generator: Option<PdfBackend>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Marca el `<body>` de los formatos del diseñador para que el backend los identifique.
pub fn render_html(format: &PrintFormatConfig, html: &str) -> String {
    if format.uses_advanced_designer && !html.contains(DESIGNER_ROOT_MARKER) {
        return html.replace(BODY_OPEN, BODY_OPEN_MARKED);
    }
    html.to_string()
}

/// Completa los settings: un formato del diseñador sin generador explícito usa Puppeteer.
pub fn print_settings(format: &PrintFormatConfig, settings: Option<PrintSettings>) -> PrintSettings {
    let mut settings = settings.unwrap_or_default();
    if format.uses_advanced_designer && settings.pdf_generator.is_none() {
        settings.pdf_generator = Some(PdfBackend::Puppeteer);
    }
    settings
}

/// Justo antes de imprimir, los formatos del diseñador siempre van por Puppeteer.
pub fn before_print(format: &PrintFormatConfig, mut settings: PrintSettings) -> PrintSettings {
    if format.uses_advanced_designer {
        settings.pdf_generator = Some(PdfBackend::Puppeteer);
    }
    settings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn designer() -> PrintFormatConfig {
        PrintFormatConfig::new("Invoice PD", true, PdfBackend::LegacyRenderer)
    }

    #[test]
    fn marks_body_of_designer_formats() {
        let html = "<html><body class=\"x\"><p>hi</p></body></html>";
        let out = render_html(&designer(), html);
        assert!(out.contains(r#"<body data-puppeteer-pdf="true" class="x">"#));
    }

    #[test]
    fn leaves_html_with_designer_root_alone() {
        let html = r#"<body><div id="__print_designer"></div></body>"#;
        assert_eq!(render_html(&designer(), html), html);
    }

    #[test]
    fn leaves_classic_formats_alone() {
        let classic = PrintFormatConfig::new("Classic", false, PdfBackend::LegacyRenderer);
        assert_eq!(render_html(&classic, "<body></body>"), "<body></body>");
    }

    #[test]
    fn settings_default_to_puppeteer_only_when_unset() {
        let filled = print_settings(&designer(), None);
        assert_eq!(filled.pdf_generator, Some(PdfBackend::Puppeteer));

        let explicit = PrintSettings {
            pdf_generator: Some(PdfBackend::LegacyRenderer),
            ..Default::default()
        };
        let kept = print_settings(&designer(), Some(explicit.clone()));
        assert_eq!(kept.pdf_generator, Some(PdfBackend::LegacyRenderer));

        let forced = before_print(&designer(), explicit);
        assert_eq!(forced.pdf_generator, Some(PdfBackend::Puppeteer));
    }
}
