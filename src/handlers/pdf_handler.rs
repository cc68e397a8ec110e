//! handlers/pdf_handler.rs
//! Endpoint para generar PDFs a partir de HTML.

use actix_files::NamedFile;
use actix_web::{web, HttpResponse};
use log::error;

use crate::models::pdf_model::{PdfRequest, PdfResponse};
use crate::services::{local_host::Registry, pdf_service::PdfService, print_format_service};

/// Header con el backend que realmente generó el PDF.
pub const BACKEND_HEADER: &str = "X-Pdf-Backend";
/// Header con el nombre del archivo guardado (si `store_local_pdf`).
pub const STORED_HEADER: &str = "X-Pdf-Stored-As";

/// Recibe una petición POST con un JSON de tipo PdfRequest
/// y retorna un PDF binario en caso de éxito.
pub async fn generate_pdf_endpoint(
    registry: web::Data<Registry>,
    pdf_service: web::Data<PdfService>,
    req_body: web::Json<PdfRequest>,
) -> HttpResponse {
    log::info!("Entrando a generate_pdf_endpoint");
    let mut req_data = req_body.into_inner();
    let file_name = req_data.file_name.clone();

    // El formato decide backend y orientación; si no existe se ignora.
    let format = req_data.print_format.as_deref().and_then(|name| {
        let found = registry.format(name);
        if found.is_none() {
            log::warn!("Print Format {} no registrado, se ignora", name);
        }
        found
    });
    if let Some(f) = &format {
        req_data.html = print_format_service::render_html(f, &req_data.html);
    }

    match pdf_service.generate_pdf(req_data, format.as_ref()).await {
        Ok(generated) => {
            let mut response = HttpResponse::Ok();
            response
                .append_header(("Content-Type", "application/pdf"))
                .append_header((
                    "Content-Disposition",
                    format!("inline; filename=\"{}\"", file_name),
                ))
                .append_header(("Cache-Control", "public, must-revalidate, max-age=0"))
                .append_header(("Pragma", "public"))
                .append_header((BACKEND_HEADER, generated.backend.as_str()))
                .append_header(("Content-Length", generated.data.len().to_string()));
            if let Some(stored) = &generated.stored_at {
                response.append_header((STORED_HEADER, stored.as_str()));
            }
            response.body(generated.data)
        }
        Err(e) => {
            error!("Error generando PDF: {:?}", e);
            HttpResponse::InternalServerError().json(PdfResponse {
                success: false,
                message: format!("Failed to generate PDF: {:?}", e),
            })
        }
    }
}

/// GET /api/pdf/local/{filename}
/// Sirve un archivo PDF que haya sido guardado en disco.
pub async fn serve_local_pdf(
    pdf_service: web::Data<PdfService>,
    path: web::Path<String>,
) -> Result<NamedFile, actix_web::Error> {
    let filename = path.into_inner();
    if filename.contains('/') || filename.contains('\\') || filename.contains("..") {
        return Err(actix_web::error::ErrorBadRequest("invalid file name"));
    }

    // Actix Files gestiona los headers de Content-Type apropiados.
    // Retorna 404 si no existe.
    Ok(NamedFile::open(pdf_service.store_dir().join(filename))?)
}
