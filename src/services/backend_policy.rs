//! services/backend_policy.rs
//! Mantiene `pdf_generator` coherente con `print_designer` y avisa de las
//! combinaciones desaconsejadas. No guarda estado entre invocaciones.

use std::future::Future;

use serde_json::Value;
use thiserror::Error;

use crate::{
    models::{
        document_model::{RenderPdfArgs, RenderedPdf, PRINT_FORMAT_DOCTYPE},
        notice_model::Notice,
        print_format_model::{fields, PdfBackend, PrintFormatConfig},
    },
    services::host_context::{HostContext, HostError},
};

pub const PUPPETEER_INFO: &str = "This print format will use Puppeteer/Chrome for PDF generation.";
pub const DESIGNER_BACKEND_WARNING: &str =
    "Print Designer formats work best with Puppeteer PDF generator.";
pub const PRINT_ADVISORY: &str = "This print format may work better with Puppeteer PDF generator";
pub const TEST_PDF_SUCCESS: &str = "PDF generated successfully with Puppeteer";
pub const PUPPETEER_VIEW_TITLE: &str = "Print (Puppeteer)";

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("the test button is only available for Print Designer formats")]
    TestUnavailable,
    #[error(transparent)]
    Host(#[from] HostError),
}

/// Ajuste que `on_designer_toggle` hizo sobre el registro.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendChange {
    Unchanged,
    Set(PdfBackend),
}

pub struct BackendPolicy<'h, H: HostContext + ?Sized> {
    host: &'h H,
}

impl<'h, H: HostContext + ?Sized> BackendPolicy<'h, H> {
    pub fn new(host: &'h H) -> Self {
        Self { host }
    }

    /// Al cargar el formulario: sólo informa, no modifica.
    pub fn on_load(&self, config: &PrintFormatConfig) {
        if config.uses_advanced_designer {
            self.host.show_notice(Notice::info(PUPPETEER_INFO));
        }
    }

    /// `print_designer` cambió: activarlo fuerza Puppeteer; desactivarlo
    /// devuelve Puppeteer al renderer clásico.
    pub fn on_designer_toggle(&self, config: &mut PrintFormatConfig) -> BackendChange {
        let target = if config.uses_advanced_designer {
            PdfBackend::Puppeteer
        } else if config.pdf_backend == PdfBackend::Puppeteer {
            PdfBackend::LegacyRenderer
        } else {
            return BackendChange::Unchanged;
        };

        if config.pdf_backend == target {
            return BackendChange::Unchanged;
        }
        log::debug!(
            "{}: pdf_generator {} -> {}",
            config.name,
            config.pdf_backend,
            target
        );
        config.pdf_backend = target;
        BackendChange::Set(target)
    }

    /// `pdf_generator` cambió: avisa, pero nunca revierte el valor.
    pub fn on_backend_field_change(&self, config: &PrintFormatConfig) {
        if config.prefers_other_backend() {
            self.host
                .show_notice(Notice::warning("Warning", DESIGNER_BACKEND_WARNING));
        }
    }

    /// Título de la vista de impresión para el formato seleccionado, si
    /// usa Puppeteer. Un fallo al consultar el host deja el título como está.
    pub async fn on_print_view_open(&self, format: Option<&str>) -> Option<&'static str> {
        let format = format?;
        let backend = self
            .host
            .get_field_value(PRINT_FORMAT_DOCTYPE, format, fields::PDF_GENERATOR)
            .await
            .and_then(|value| parse_backend(&value));
        match backend {
            Ok(PdfBackend::Puppeteer) => Some(PUPPETEER_VIEW_TITLE),
            Ok(_) => None,
            Err(e) => {
                log::warn!("No se pudo leer pdf_generator de {}: {}", format, e);
                None
            }
        }
    }

    /// Sugiere Puppeteer cuando corresponde y luego imprime siempre con `print`.
    pub async fn on_print_action<F, Fut, T>(&self, format: Option<&str>, print: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        if let Some(format) = format {
            match self.fetch_backend(format).await {
                Ok((true, backend)) if backend != PdfBackend::Puppeteer => {
                    self.host.show_notice(Notice::advisory(PRINT_ADVISORY));
                }
                Ok(_) => {}
                Err(e) => log::warn!("No se pudo leer la configuración de {}: {}", format, e),
            }
        }
        print().await
    }

    /// Botón "Test Puppeteer PDF". Sólo existe con el diseñador activo.
    pub async fn on_test_button_invoked(
        &self,
        config: &PrintFormatConfig,
    ) -> Result<RenderedPdf, PolicyError> {
        if !config.uses_advanced_designer {
            return Err(PolicyError::TestUnavailable);
        }

        let args = RenderPdfArgs {
            doctype: PRINT_FORMAT_DOCTYPE.to_string(),
            name: config.name.clone(),
            format: config.name.clone(),
            no_letterhead: 0,
            letterhead: None,
            settings: None,
        };

        match self.host.render_pdf(args).await {
            Ok(rendered) => {
                self.host
                    .show_notice(Notice::success("Success", TEST_PDF_SUCCESS));
                Ok(rendered)
            }
            Err(e) => {
                log::error!("Test PDF de {} falló: {}", config.name, e);
                self.host.show_notice(Notice::error("Error", e.to_string()));
                Err(e.into())
            }
        }
    }

    /// (print_designer, pdf_generator) del formato según el host.
    async fn fetch_backend(&self, format: &str) -> Result<(bool, PdfBackend), HostError> {
        let values = self
            .host
            .get_field_values(
                PRINT_FORMAT_DOCTYPE,
                format,
                &[fields::PRINT_DESIGNER, fields::PDF_GENERATOR],
            )
            .await?;

        let designer = values.first().map(is_truthy).unwrap_or(false);
        let backend = match values.get(1) {
            Some(value) => parse_backend(value)?,
            None => PdfBackend::default(),
        };
        Ok((designer, backend))
    }
}

/// Un pdf_generator vacío equivale al valor por defecto del campo.
fn parse_backend(value: &Value) -> Result<PdfBackend, HostError> {
    if value.is_null() {
        return Ok(PdfBackend::default());
    }
    serde_json::from_value(value.clone())
        .map_err(|e| HostError::Remote(format!("pdf_generator inválido: {}", e)))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|v| v != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty() && s != "0",
        _ => false,
    }
}
