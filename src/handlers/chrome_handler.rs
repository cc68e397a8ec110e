//! handlers/chrome_handler.rs

use actix_web::{web, HttpResponse};

use crate::services::pdf_service::PdfService;

/// GET /api/chrome/status
pub async fn chrome_status_endpoint(pdf_service: web::Data<PdfService>) -> HttpResponse {
    HttpResponse::Ok().json(pdf_service.chrome().status().await)
}
