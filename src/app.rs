//! app.rs
use crate::handlers::{
    chrome_handler, document_handler, pdf_handler, print_format_handler, print_handler,
};
use actix_web::web;

pub fn init_app(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(
                web::scope("/pdf")
                    .route("", web::post().to(pdf_handler::generate_pdf_endpoint))
                    .route(
                        "/local/{filename}",
                        web::get().to(pdf_handler::serve_local_pdf),
                    ),
            )
            .service(
                web::scope("/print-formats")
                    .route(
                        "",
                        web::post().to(print_format_handler::upsert_format_endpoint),
                    )
                    .route(
                        "/{name}",
                        web::get().to(print_format_handler::get_format_endpoint),
                    )
                    .route(
                        "/{name}",
                        web::patch().to(print_format_handler::update_field_endpoint),
                    )
                    .route(
                        "/{name}/test-pdf",
                        web::post().to(print_format_handler::test_pdf_endpoint),
                    ),
            )
            .service(
                web::scope("/documents").route(
                    "",
                    web::post().to(document_handler::register_document_endpoint),
                ),
            )
            .service(
                web::scope("/print")
                    .route("", web::post().to(print_handler::print_endpoint))
                    .route(
                        "/view",
                        web::post().to(print_handler::open_print_view_endpoint),
                    ),
            )
            .service(
                web::scope("/chrome").route(
                    "/status",
                    web::get().to(chrome_handler::chrome_status_endpoint),
                ),
            ),
    );
}
