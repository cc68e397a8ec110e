//! services/host_context.rs
//! Contrato con el host: documentos, metadatos, campos, render de PDF y avisos.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::models::{
    document_model::{DocMeta, Document, RenderPdfArgs, RenderedPdf},
    notice_model::Notice,
};

#[derive(Debug, Error)]
pub enum HostError {
    #[error("{doctype} {name} not found")]
    NotFound { doctype: String, name: String },
    #[error("unknown field {field} on {doctype}")]
    UnknownField { doctype: String, field: String },
    #[error("remote call failed: {0}")]
    Remote(String),
    #[error("PDF rendering failed: {0}")]
    Render(#[from] anyhow::Error),
}

pub type HostResult<T> = Result<T, HostError>;

/// Capacidades del host que consume la política de backend.
/// Cada llamada es una única suspensión que termina en valor o error.
#[async_trait]
pub trait HostContext: Send + Sync {
    async fn get_document(&self, doctype: &str, name: &str) -> HostResult<Document>;

    async fn get_metadata(&self, doctype: &str) -> HostResult<DocMeta>;

    /// Valores de varios campos de un registro, en el mismo orden que `fields`.
    async fn get_field_values(
        &self,
        doctype: &str,
        name: &str,
        fields: &[&str],
    ) -> HostResult<Vec<Value>>;

    async fn get_field_value(&self, doctype: &str, name: &str, field: &str) -> HostResult<Value> {
        let mut values = self.get_field_values(doctype, name, &[field]).await?;
        values.pop().ok_or_else(|| HostError::UnknownField {
            doctype: doctype.to_string(),
            field: field.to_string(),
        })
    }

    async fn render_pdf(&self, args: RenderPdfArgs) -> HostResult<RenderedPdf>;

    fn show_notice(&self, notice: Notice);
}
