//! handlers/print_format_handler.rs
//! Formulario de Print Format: carga, cambios de campo y botón de prueba.

use actix_web::{web, HttpResponse};
use log::error;

use crate::{
    models::{
        pdf_model::PdfResponse,
        print_format_model::{FieldChanges, PrintFormatConfig},
        print_model::{PrintFormatResponse, TestPdfResponse},
    },
    services::{
        backend_policy::{BackendPolicy, PolicyError},
        form_events::{apply_field_change, apply_field_changes, dispatch, FormEvent},
        host_context::HostError,
        local_host::{LocalHost, Registry},
        pdf_service::PdfService,
    },
};

fn format_not_found(name: &str) -> HttpResponse {
    HttpResponse::NotFound().json(PdfResponse {
        success: false,
        message: format!("Print Format {} not found", name),
    })
}

/// Respuesta del formulario tras disparar el evento de carga.
fn loaded_form(host: &LocalHost, mut config: PrintFormatConfig) -> PrintFormatResponse {
    let policy = BackendPolicy::new(host);
    dispatch(&policy, &mut config, &FormEvent::Load);
    PrintFormatResponse {
        test_available: config.uses_advanced_designer,
        notices: host.take_notices(),
        config,
    }
}

/// POST /api/print-formats
pub async fn upsert_format_endpoint(
    registry: web::Data<Registry>,
    pdf_service: web::Data<PdfService>,
    body: web::Json<PrintFormatConfig>,
) -> HttpResponse {
    let config = body.into_inner();
    if config.name.trim().is_empty() {
        return HttpResponse::BadRequest().json(PdfResponse {
            success: false,
            message: "Print Format name is required".to_string(),
        });
    }

    log::info!("Guardando Print Format {}", config.name);
    registry.upsert_format(config.clone());

    let host = LocalHost::new(registry.get_ref().clone(), pdf_service.get_ref().clone());
    HttpResponse::Ok().json(loaded_form(&host, config))
}

/// GET /api/print-formats/{name}
pub async fn get_format_endpoint(
    registry: web::Data<Registry>,
    pdf_service: web::Data<PdfService>,
    path: web::Path<String>,
) -> HttpResponse {
    let name = path.into_inner();
    let Some(config) = registry.format(&name) else {
        return format_not_found(&name);
    };

    let host = LocalHost::new(registry.get_ref().clone(), pdf_service.get_ref().clone());
    HttpResponse::Ok().json(loaded_form(&host, config))
}

/// PATCH /api/print-formats/{name}
pub async fn update_field_endpoint(
    registry: web::Data<Registry>,
    pdf_service: web::Data<PdfService>,
    path: web::Path<String>,
    body: web::Json<FieldChanges>,
) -> HttpResponse {
    let name = path.into_inner();
    let changes = body.into_inner();
    let host = LocalHost::new(registry.get_ref().clone(), pdf_service.get_ref().clone());
    let policy = BackendPolicy::new(&host);

    // Se edita una copia y se guarda sólo si nadie la cambió mientras tanto;
    // si hubo conflicto se repite sobre la versión nueva.
    let config = loop {
        let Some(original) = registry.format(&name) else {
            return format_not_found(&name);
        };
        let mut config = original.clone();

        let applied = match changes.clone() {
            FieldChanges::One(change) => apply_field_change(&policy, &mut config, change).map(|_| ()),
            FieldChanges::Many(changes) => apply_field_changes(&policy, &mut config, changes)
                .await
                .map(|_| ()),
        };
        if let Err(e) = applied {
            return HttpResponse::BadRequest().json(PdfResponse {
                success: false,
                message: format!("Invalid field change: {}", e),
            });
        }

        if registry.replace_format(&original, config.clone()) {
            break config;
        }
        log::debug!("Print Format {} cambió durante el PATCH, reintentando", name);
        host.take_notices();
    };
    log::info!("Print Format {} actualizado", name);

    HttpResponse::Ok().json(PrintFormatResponse {
        test_available: config.uses_advanced_designer,
        notices: host.take_notices(),
        config,
    })
}

/// POST /api/print-formats/{name}/test-pdf
pub async fn test_pdf_endpoint(
    registry: web::Data<Registry>,
    pdf_service: web::Data<PdfService>,
    path: web::Path<String>,
) -> HttpResponse {
    let name = path.into_inner();
    let Some(config) = registry.format(&name) else {
        return format_not_found(&name);
    };

    let host = LocalHost::new(registry.get_ref().clone(), pdf_service.get_ref().clone());
    let policy = BackendPolicy::new(&host);

    match policy.on_test_button_invoked(&config).await {
        Ok(rendered) => {
            log::info!(
                "Test PDF de {} generado ({} bytes)",
                name,
                rendered.data.len()
            );
            HttpResponse::Ok().json(TestPdfResponse {
                success: true,
                notices: host.take_notices(),
            })
        }
        Err(PolicyError::TestUnavailable) => HttpResponse::Conflict().json(TestPdfResponse {
            success: false,
            notices: host.take_notices(),
        }),
        Err(PolicyError::Host(e)) => {
            error!("Error en test PDF de {}: {:?}", name, e);
            let body = TestPdfResponse {
                success: false,
                notices: host.take_notices(),
            };
            match e {
                HostError::NotFound { .. } => HttpResponse::NotFound().json(body),
                _ => HttpResponse::InternalServerError().json(body),
            }
        }
    }
}
