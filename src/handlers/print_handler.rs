//! handlers/print_handler.rs
//! Vista de impresión decorada con la política de backend.

use actix_web::{web, HttpResponse};
use log::error;

use crate::{
    handlers::{host_error_response, host_error_status},
    models::{
        document_model::DocRef,
        notice_model::Notice,
        print_model::{PrintFailureResponse, PrintViewRequest, PrintViewResponse},
    },
    services::{
        local_host::{LocalHost, Registry},
        pdf_service::PdfService,
        print_view::{HostPrintView, PolicyPrintView, PrintView},
    },
};

/// Header con los avisos (JSON url-encoded) que acompañan al PDF.
pub const NOTICES_HEADER: &str = "X-Print-Notices";

/// POST /api/print/view
pub async fn open_print_view_endpoint(
    registry: web::Data<Registry>,
    pdf_service: web::Data<PdfService>,
    body: web::Json<PrintViewRequest>,
) -> HttpResponse {
    let req = body.into_inner();
    let host = LocalHost::new(registry.get_ref().clone(), pdf_service.get_ref().clone());
    let mut view = PolicyPrintView::new(HostPrintView::new(&host, req.format.clone()), &host);

    if let Err(e) = view.show(&DocRef::new(req.doctype, req.name)).await {
        return host_error_response(&e);
    }

    let title = view.title().to_string();
    let format = view.selected_format().map(str::to_string);
    let inner = view.into_inner();
    HttpResponse::Ok().json(PrintViewResponse {
        title,
        format,
        fields: inner.meta().map(|m| m.fields.clone()).unwrap_or_default(),
        notices: host.take_notices(),
    })
}

/// POST /api/print
/// Imprime el documento; el PDF nunca se bloquea por la sugerencia de backend.
pub async fn print_endpoint(
    registry: web::Data<Registry>,
    pdf_service: web::Data<PdfService>,
    body: web::Json<PrintViewRequest>,
) -> HttpResponse {
    let req = body.into_inner();
    let host = LocalHost::new(registry.get_ref().clone(), pdf_service.get_ref().clone());
    let inner = HostPrintView::new(&host, req.format.clone())
        .with_letterhead(req.no_letterhead, req.letterhead.clone());
    let mut view = PolicyPrintView::new(inner, &host);

    if let Err(e) = view.show(&DocRef::new(req.doctype, req.name)).await {
        return host_error_response(&e);
    }

    match view.print_doc().await {
        Ok(rendered) => HttpResponse::Ok()
            .append_header(("Content-Type", "application/pdf"))
            .append_header((
                "Content-Disposition",
                format!("inline; filename=\"{}\"", rendered.file_name),
            ))
            .append_header((NOTICES_HEADER, encode_notices(&host.take_notices())))
            .append_header(("Content-Length", rendered.data.len().to_string()))
            .body(rendered.data),
        Err(e) => {
            error!("Error imprimiendo: {:?}", e);
            HttpResponse::build(host_error_status(&e)).json(PrintFailureResponse {
                success: false,
                message: e.to_string(),
                notices: host.take_notices(),
            })
        }
    }
}

pub fn encode_notices(notices: &[Notice]) -> String {
    let json = serde_json::to_string(notices).unwrap_or_else(|_| "[]".to_string());
    urlencoding::encode(&json).into_owned()
}
