//! models/document_model.rs
//! Documentos del host y argumentos de las llamadas remotas.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Doctype bajo el que se registran los print formats.
pub const PRINT_FORMAT_DOCTYPE: &str = "Print Format";

/// Referencia a un documento (doctype + nombre).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocRef {
    pub doctype: String,
    pub name: String,
}

impl DocRef {
    pub fn new(doctype: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            doctype: doctype.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub doctype: String,
    pub name: String,
    #[serde(default)]
    pub data: BTreeMap<String, Value>,
}

impl Document {
    pub fn doc_ref(&self) -> DocRef {
        DocRef::new(self.doctype.clone(), self.name.clone())
    }
}

/// Metadatos mínimos de un doctype.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocMeta {
    pub doctype: String,
    pub fields: Vec<String>,
}

/// Argumentos de la llamada "render PDF" del host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderPdfArgs {
    pub doctype: String,
    pub name: String,
    pub format: String,
    #[serde(default)]
    pub no_letterhead: u8,
    #[serde(default)]
    pub letterhead: Option<String>,
    #[serde(default)]
    pub settings: Option<Value>,
}

/// Respuesta de éxito de "render PDF".
#[derive(Debug, Clone)]
pub struct RenderedPdf {
    pub file_name: String,
    pub data: Vec<u8>,
}
