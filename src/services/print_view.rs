//! services/print_view.rs
//! Vista de impresión y su decorador con la política de backend.

use async_trait::async_trait;

use crate::{
    models::document_model::{DocMeta, DocRef, Document, RenderPdfArgs, RenderedPdf},
    services::{
        backend_policy::BackendPolicy,
        host_context::{HostContext, HostError, HostResult},
    },
};

pub const DEFAULT_VIEW_TITLE: &str = "Print";
/// Formato que se usa cuando la vista no selecciona ninguno.
pub const STANDARD_FORMAT: &str = "Standard";

#[async_trait]
pub trait PrintView: Send {
    fn selected_format(&self) -> Option<&str>;

    fn title(&self) -> &str;

    fn set_title(&mut self, title: &str);

    /// Carga el documento en la vista.
    async fn show(&mut self, record: &DocRef) -> HostResult<()>;

    /// Imprime el documento cargado con el formato seleccionado.
    async fn print_doc(&mut self) -> HostResult<RenderedPdf>;
}

/// Vista básica: resuelve todo contra el host.
pub struct HostPrintView<'h, H: HostContext + ?Sized> {
    host: &'h H,
    format: Option<String>,
    title: String,
    no_letterhead: bool,
    letterhead: Option<String>,
    record: Option<Document>,
    meta: Option<DocMeta>,
}

impl<'h, H: HostContext + ?Sized> HostPrintView<'h, H> {
    pub fn new(host: &'h H, format: Option<String>) -> Self {
        Self {
            host,
            format,
            title: DEFAULT_VIEW_TITLE.to_string(),
            no_letterhead: false,
            letterhead: None,
            record: None,
            meta: None,
        }
    }

    pub fn with_letterhead(mut self, no_letterhead: bool, letterhead: Option<String>) -> Self {
        self.no_letterhead = no_letterhead;
        self.letterhead = letterhead;
        self
    }

    pub fn meta(&self) -> Option<&DocMeta> {
        self.meta.as_ref()
    }
}

#[async_trait]
impl<'h, H: HostContext + ?Sized> PrintView for HostPrintView<'h, H> {
    fn selected_format(&self) -> Option<&str> {
        self.format.as_deref()
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    async fn show(&mut self, record: &DocRef) -> HostResult<()> {
        let doc = self.host.get_document(&record.doctype, &record.name).await?;
        let meta = self.host.get_metadata(&record.doctype).await?;
        self.record = Some(doc);
        self.meta = Some(meta);
        self.title = DEFAULT_VIEW_TITLE.to_string();
        Ok(())
    }

    async fn print_doc(&mut self) -> HostResult<RenderedPdf> {
        let record = self
            .record
            .as_ref()
            .ok_or_else(|| HostError::Remote("no document loaded in print view".to_string()))?;

        let args = RenderPdfArgs {
            doctype: record.doctype.clone(),
            name: record.name.clone(),
            format: self
                .format
                .clone()
                .unwrap_or_else(|| STANDARD_FORMAT.to_string()),
            no_letterhead: u8::from(self.no_letterhead),
            letterhead: self.letterhead.clone(),
            settings: None,
        };
        self.host.render_pdf(args).await
    }
}

/// Decora otra vista: etiqueta el título al mostrar y sugiere Puppeteer al
/// imprimir, delegando siempre en la vista envuelta.
pub struct PolicyPrintView<'h, V: PrintView, H: HostContext + ?Sized> {
    inner: V,
    policy: BackendPolicy<'h, H>,
}

impl<'h, V: PrintView, H: HostContext + ?Sized> PolicyPrintView<'h, V, H> {
    pub fn new(inner: V, host: &'h H) -> Self {
        Self {
            inner,
            policy: BackendPolicy::new(host),
        }
    }

    pub fn into_inner(self) -> V {
        self.inner
    }
}

#[async_trait]
impl<'h, V: PrintView, H: HostContext + ?Sized> PrintView for PolicyPrintView<'h, V, H> {
    fn selected_format(&self) -> Option<&str> {
        self.inner.selected_format()
    }

    fn title(&self) -> &str {
        self.inner.title()
    }

    fn set_title(&mut self, title: &str) {
        self.inner.set_title(title);
    }

    async fn show(&mut self, record: &DocRef) -> HostResult<()> {
        self.inner.show(record).await?;
        let label = self
            .policy
            .on_print_view_open(self.inner.selected_format())
            .await;
        if let Some(title) = label {
            self.inner.set_title(title);
        }
        Ok(())
    }

    async fn print_doc(&mut self) -> HostResult<RenderedPdf> {
        let Self { inner, policy } = self;
        let format = inner.selected_format().map(str::to_string);
        policy
            .on_print_action(format.as_deref(), move || inner.print_doc())
            .await
    }
}
