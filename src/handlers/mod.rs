//! handlers/mod.rs
//! Módulo que agrupa los distintos handlers (formatos, impresión, PDF, Chrome).

pub mod chrome_handler;
pub mod document_handler;
pub mod pdf_handler;
pub mod print_format_handler;
pub mod print_handler;

use actix_web::{http::StatusCode, HttpResponse};

use crate::{models::pdf_model::PdfResponse, services::host_context::HostError};

/// Código HTTP que corresponde a un error del host.
pub(crate) fn host_error_status(e: &HostError) -> StatusCode {
    match e {
        HostError::NotFound { .. } => StatusCode::NOT_FOUND,
        HostError::UnknownField { .. } => StatusCode::BAD_REQUEST,
        HostError::Remote(_) | HostError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Traduce un error del host a la respuesta HTTP correspondiente.
pub(crate) fn host_error_response(e: &HostError) -> HttpResponse {
    HttpResponse::build(host_error_status(e)).json(PdfResponse {
        success: false,
        message: e.to_string(),
    })
}
