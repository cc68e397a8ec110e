//! services/local_host.rs
//! Host en memoria: registro de formatos y documentos, render de PDF con
//! `PdfService` y colector de avisos por petición.

use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    sync::Arc,
};

use async_trait::async_trait;
use minijinja::{
    context, value::ValueKind, AutoEscape, Environment, Error as TemplateError, ErrorKind,
};
use parking_lot::{Mutex, RwLock};
use serde_json::Value;

use crate::{
    models::{
        document_model::{
            DocMeta, DocRef, Document, RenderPdfArgs, RenderedPdf, PRINT_FORMAT_DOCTYPE,
        },
        notice_model::Notice,
        pdf_model::PdfRequest,
        print_format_model::{fields, PdfBackend, PrintFormatConfig},
    },
    services::{
        host_context::{HostContext, HostError, HostResult},
        pdf_service::PdfService,
        print_format_service::{self, PrintSettings},
        print_view::STANDARD_FORMAT,
        units::{self, Unit},
    },
};

const DEFAULT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>{{ name }}</title></head>
<body>
{% if letterhead %}<div class="letter-head">{{ letterhead }}</div>{% endif %}
<h2>{{ doctype }}: {{ name }}</h2>
<table class="table table-bordered">
{% for key, value in doc|items %}<tr><th>{{ key }}</th><td>{{ value }}</td></tr>
{% endfor %}</table>
</body>
</html>"#;

const PRINT_FORMAT_FIELDS: &[&str] = &[
    fields::NAME,
    fields::PRINT_DESIGNER,
    fields::PDF_GENERATOR,
    fields::PDF_PAGE_ORIENTATION,
    fields::HTML,
];

/// Registro compartido entre peticiones.
#[derive(Clone, Default)]
pub struct Registry {
    formats: Arc<RwLock<HashMap<String, PrintFormatConfig>>>,
    documents: Arc<RwLock<BTreeMap<DocRef, Document>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert_format(&self, config: PrintFormatConfig) {
        self.formats.write().insert(config.name.clone(), config);
    }

    pub fn format(&self, name: &str) -> Option<PrintFormatConfig> {
        self.formats.read().get(name).cloned()
    }

    /// Sustituye el formato sólo si sigue igual a `expected` (la copia que se
    /// editó). Devuelve false si otra petición lo cambió entretanto.
    pub fn replace_format(&self, expected: &PrintFormatConfig, updated: PrintFormatConfig) -> bool {
        let mut formats = self.formats.write();
        match formats.get_mut(&expected.name) {
            Some(current) if current == expected => {
                *current = updated;
                true
            }
            _ => false,
        }
    }

    pub fn insert_document(&self, doc: Document) {
        self.documents.write().insert(doc.doc_ref(), doc);
    }

    pub fn document(&self, doctype: &str, name: &str) -> Option<Document> {
        if doctype == PRINT_FORMAT_DOCTYPE {
            return self.format(name).map(|config| format_as_document(&config));
        }
        self.documents
            .read()
            .get(&DocRef::new(doctype, name))
            .cloned()
    }

    /// Campos conocidos de un doctype (unión de los documentos registrados).
    pub fn metadata(&self, doctype: &str) -> Option<DocMeta> {
        if doctype == PRINT_FORMAT_DOCTYPE {
            return Some(DocMeta {
                doctype: doctype.to_string(),
                fields: PRINT_FORMAT_FIELDS.iter().map(|f| f.to_string()).collect(),
            });
        }
        let documents = self.documents.read();
        let mut seen = false;
        let mut field_names = BTreeSet::new();
        for doc in documents.values().filter(|d| d.doctype == doctype) {
            seen = true;
            field_names.extend(doc.data.keys().cloned());
        }
        seen.then(|| DocMeta {
            doctype: doctype.to_string(),
            fields: field_names.into_iter().collect(),
        })
    }
}

fn format_as_document(config: &PrintFormatConfig) -> Document {
    let data = PRINT_FORMAT_FIELDS
        .iter()
        .filter_map(|f| config.field_value(f).map(|v| (f.to_string(), v)))
        .collect();
    Document {
        doctype: PRINT_FORMAT_DOCTYPE.to_string(),
        name: config.name.clone(),
        data,
    }
}

/// Host de una petición. Los avisos quedan aquí hasta `take_notices`.
pub struct LocalHost {
    registry: Registry,
    pdf_service: PdfService,
    notices: Mutex<Vec<Notice>>,
}

impl LocalHost {
    pub fn new(registry: Registry, pdf_service: PdfService) -> Self {
        Self {
            registry,
            pdf_service,
            notices: Mutex::new(Vec::new()),
        }
    }

    pub fn take_notices(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.notices.lock())
    }

    fn resolve_format(&self, name: &str) -> HostResult<PrintFormatConfig> {
        match self.registry.format(name) {
            Some(config) => Ok(config),
            None if name == STANDARD_FORMAT => Ok(PrintFormatConfig::new(
                STANDARD_FORMAT,
                false,
                PdfBackend::LegacyRenderer,
            )),
            None => Err(HostError::NotFound {
                doctype: PRINT_FORMAT_DOCTYPE.to_string(),
                name: name.to_string(),
            }),
        }
    }
}

fn template_error(msg: impl Into<String>) -> TemplateError {
    TemplateError::new(ErrorKind::InvalidOperation, msg.into())
}

fn parse_unit(unit: Option<String>) -> Result<Unit, TemplateError> {
    match unit {
        Some(unit) => unit
            .parse()
            .map_err(|e: anyhow::Error| template_error(e.to_string())),
        None => Ok(Unit::Px),
    }
}

/// Entorno de plantillas con los helpers de unidades del diseñador.
fn template_env() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_auto_escape_callback(|_| AutoEscape::Html);

    // {{ convert_uom(10, "mm", "px") }} -> "37.795px"; las unidades por defecto son px
    env.add_function(
        "convert_uom",
        |number: minijinja::Value,
         from: Option<String>,
         to: Option<String>,
         only_number: Option<bool>|
         -> Result<minijinja::Value, TemplateError> {
            let from = parse_unit(from)?;
            let to = parse_unit(to)?;
            if from == to {
                return Ok(number);
            }
            let value = f64::try_from(number)?;
            Ok(if only_number.unwrap_or(false) {
                minijinja::Value::from(units::convert_uom(value, from, to))
            } else {
                minijinja::Value::from(units::format_uom(value, from, to))
            })
        },
    );
    // style="{{ element.style|convert_css }}"
    env.add_filter("convert_css", |style: minijinja::Value| -> Result<String, TemplateError> {
        if style.is_undefined() || style.is_none() {
            return Ok(units::convert_css_declarations(Vec::<(String, String)>::new()));
        }
        if style.kind() != ValueKind::Map {
            return Err(template_error("convert_css expects a mapping"));
        }
        let mut declarations = Vec::new();
        for key in style.try_iter()? {
            let value = style.get_item(&key)?;
            declarations.push((key.to_string(), value.to_string()));
        }
        Ok(units::convert_css_declarations(declarations))
    });
    env
}

/// Renderiza la plantilla del formato (o la tabla por defecto) con el documento.
pub fn render_document_html(
    format: &PrintFormatConfig,
    doc: &Document,
    letterhead: Option<&str>,
) -> Result<String, HostError> {
    let env = template_env();
    let source = format.html.as_deref().unwrap_or(DEFAULT_TEMPLATE);
    env.render_str(
        source,
        context! {
            doc => &doc.data,
            doctype => &doc.doctype,
            name => &doc.name,
            letterhead => letterhead,
        },
    )
    .map_err(|e| HostError::Render(anyhow::anyhow!("template error in {}: {}", format.name, e)))
}

#[async_trait]
impl HostContext for LocalHost {
    async fn get_document(&self, doctype: &str, name: &str) -> HostResult<Document> {
        self.registry
            .document(doctype, name)
            .ok_or_else(|| HostError::NotFound {
                doctype: doctype.to_string(),
                name: name.to_string(),
            })
    }

    async fn get_metadata(&self, doctype: &str) -> HostResult<DocMeta> {
        self.registry
            .metadata(doctype)
            .ok_or_else(|| HostError::NotFound {
                doctype: "DocType".to_string(),
                name: doctype.to_string(),
            })
    }

    async fn get_field_values(
        &self,
        doctype: &str,
        name: &str,
        field_names: &[&str],
    ) -> HostResult<Vec<Value>> {
        let doc = self.get_document(doctype, name).await?;
        field_names
            .iter()
            .map(|field| match *field {
                fields::NAME => Ok(Value::String(doc.name.clone())),
                other => doc.data.get(other).cloned().ok_or_else(|| HostError::UnknownField {
                    doctype: doctype.to_string(),
                    field: other.to_string(),
                }),
            })
            .collect()
    }

    async fn render_pdf(&self, args: RenderPdfArgs) -> HostResult<RenderedPdf> {
        let doc = self.get_document(&args.doctype, &args.name).await?;
        let format = self.resolve_format(&args.format)?;

        let settings = args
            .settings
            .clone()
            .filter(|v| !v.is_null())
            .map(serde_json::from_value::<PrintSettings>)
            .transpose()
            .map_err(|e| HostError::Remote(format!("invalid print settings: {}", e)))?;
        let settings = print_format_service::print_settings(&format, settings);
        let settings = print_format_service::before_print(&format, settings);

        let letterhead = if args.no_letterhead == 0 {
            args.letterhead.as_deref()
        } else {
            None
        };
        let html = render_document_html(&format, &doc, letterhead)?;
        let html = print_format_service::render_html(&format, &html);

        let file_name = format!("{}.pdf", doc.name);
        let req = PdfRequest {
            file_name: file_name.clone(),
            html,
            print_format: Some(format.name.clone()),
            pdf_generator: settings.pdf_generator,
            ..Default::default()
        };

        log::info!(
            "render_pdf {} {} con formato {} (pdf_generator={:?})",
            args.doctype,
            args.name,
            format.name,
            settings.pdf_generator
        );
        let generated = self.pdf_service.generate_pdf(req, Some(&format)).await?;
        Ok(RenderedPdf {
            file_name,
            data: generated.data,
        })
    }

    fn show_notice(&self, notice: Notice) {
        log::debug!("Aviso {:?}: {}", notice.kind, notice.message);
        self.notices.lock().push(notice);
    }
}
