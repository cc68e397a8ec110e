//! handlers/document_handler.rs
//! Registro de documentos que luego se imprimen.

use actix_web::{web, HttpResponse};

use crate::{
    models::{
        document_model::{Document, PRINT_FORMAT_DOCTYPE},
        pdf_model::PdfResponse,
    },
    services::local_host::Registry,
};

/// POST /api/documents
pub async fn register_document_endpoint(
    registry: web::Data<Registry>,
    body: web::Json<Document>,
) -> HttpResponse {
    let doc = body.into_inner();
    if doc.doctype == PRINT_FORMAT_DOCTYPE {
        return HttpResponse::BadRequest().json(PdfResponse {
            success: false,
            message: "Use /api/print-formats to register print formats".to_string(),
        });
    }
    if doc.doctype.trim().is_empty() || doc.name.trim().is_empty() {
        return HttpResponse::BadRequest().json(PdfResponse {
            success: false,
            message: "doctype and name are required".to_string(),
        });
    }

    log::info!("Registrando documento {} {}", doc.doctype, doc.name);
    let message = format!("{} {} registered", doc.doctype, doc.name);
    registry.insert_document(doc);
    HttpResponse::Ok().json(PdfResponse {
        success: true,
        message,
    })
}
