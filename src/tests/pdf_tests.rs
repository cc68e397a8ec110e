//! tests/pdf_tests.rs
//! Pruebas unitarias para `PdfService` y el mapeo de opciones.

#[cfg(test)]
pub(crate) mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use crate::config::pdf_config::PdfGlobalConfig;
    use crate::config::service_config::{ChromeConfig, ServiceConfig};
    use crate::models::document_model::Document;
    use crate::models::pdf_model::{PaperSize, PdfMargins, PdfOrientation, PdfPagePreset, PdfRequest};
    use crate::models::print_format_model::{PdfBackend, PrintFormatConfig};
    use crate::services::chrome_manager::ChromeManager;
    use crate::services::local_host::render_document_html;
    use crate::services::pdf_service::{
        map_chrome_options, safe_file_stem, select_backend, strip_print_hide, wkhtmltopdf_args,
        PdfService,
    };

    /// Servicio sin Chrome ni wkhtmltopdf disponibles.
    pub(crate) fn unavailable_service(store_dir: PathBuf) -> PdfService {
        let config = ServiceConfig {
            chrome: ChromeConfig {
                executable_path: Some(PathBuf::from("/nonexistent/chromium")),
                debug_port: 9399,
                startup_wait: Duration::from_millis(10),
            },
            wkhtmltopdf_path: Some(PathBuf::from("/nonexistent/wkhtmltopdf")),
            pdf_store_dir: store_dir,
            ..ServiceConfig::default()
        };
        let chrome = ChromeManager::new(config.chrome.clone());
        PdfService::new(&config, chrome).expect("Failed to create service")
    }

    /// Servicio sin Chrome cuyo wkhtmltopdf es un script que escribe un PDF mínimo.
    #[cfg(unix)]
    pub(crate) fn stub_legacy_service(dir: &std::path::Path) -> PdfService {
        use std::os::unix::fs::PermissionsExt;

        let script = dir.join("wkhtmltopdf");
        std::fs::write(
            &script,
            "#!/bin/sh\nfor last; do :; done\nprintf '%%PDF-1.4 stub' > \"$last\"\n",
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let config = ServiceConfig {
            chrome: ChromeConfig {
                executable_path: Some(PathBuf::from("/nonexistent/chromium")),
                debug_port: 9398,
                startup_wait: Duration::from_millis(10),
            },
            wkhtmltopdf_path: Some(script),
            pdf_store_dir: dir.join("pdfs"),
            ..ServiceConfig::default()
        };
        let chrome = ChromeManager::new(config.chrome.clone());
        PdfService::new(&config, chrome).expect("Failed to create service")
    }

    #[test]
    fn chrome_defaults_match_a4_portrait_without_margins() {
        let opts = map_chrome_options(&PdfRequest::test_new("<p/>".into()), &PdfGlobalConfig::default());

        assert_eq!(opts.format, Some(PdfPagePreset::A4));
        assert_eq!(opts.width_mm, None);
        assert!(opts.print_background);
        assert_eq!(opts.scale, 1.0);
        assert!(!opts.display_header_footer);
        assert!(!opts.landscape);
        assert_eq!(opts.page_ranges, "");
        assert_eq!(opts.margins.top, 0.0);
        assert!(!opts.prefer_css_page_size);
    }

    #[test]
    fn custom_page_size_replaces_preset() {
        let req = PdfRequest {
            page_size_preset: Some(PdfPagePreset::Custom),
            custom_page_size: Some(PaperSize {
                width: 100.0,
                height: 150.0,
            }),
            orientation: Some(PdfOrientation::Landscape),
            margins: Some(PdfMargins {
                top: 10.0,
                bottom: 5.0,
                left: 25.4,
                right: 0.0,
            }),
            page_ranges: Some("1-2".to_string()),
            ..PdfRequest::test_new("<p/>".into())
        };
        let opts = map_chrome_options(&req, &PdfGlobalConfig::default());

        assert_eq!(opts.format, None);
        assert_eq!((opts.width_mm, opts.height_mm), (Some(100.0), Some(150.0)));
        assert!(opts.landscape);

        let params = opts.to_print_params();
        assert_eq!(params.landscape, Some(true));
        assert_eq!(params.margin_left, Some(1.0));
        assert_eq!(params.page_ranges.as_deref(), Some("1-2"));
        assert_eq!(params.print_background, Some(true));
    }

    #[test]
    fn custom_page_size_without_dimensions_uses_a4_size() {
        let req = PdfRequest {
            page_size_preset: Some(PdfPagePreset::Custom),
            ..PdfRequest::test_new("<p/>".into())
        };
        let opts = map_chrome_options(&req, &PdfGlobalConfig::default());
        assert_eq!((opts.width_mm, opts.height_mm), (Some(210.0), Some(297.0)));
    }

    #[test]
    fn letter_preset_is_converted_to_inches() {
        let req = PdfRequest {
            page_size_preset: Some(PdfPagePreset::Letter),
            ..PdfRequest::test_new("<p/>".into())
        };
        let params = map_chrome_options(&req, &PdfGlobalConfig::default()).to_print_params();
        assert_eq!(params.paper_width, Some(8.5));
        assert_eq!(params.paper_height, Some(11.0));
        assert_eq!(params.page_ranges, None);
    }

    #[test]
    fn backend_selection_follows_the_format_first() {
        let pd = PrintFormatConfig::new("PD", true, PdfBackend::Puppeteer);
        let classic = PrintFormatConfig::new("Classic", false, PdfBackend::LegacyRenderer);

        assert_eq!(
            select_backend(Some(&pd), Some(PdfBackend::LegacyRenderer)),
            PdfBackend::Puppeteer
        );
        assert_eq!(
            select_backend(Some(&classic), Some(PdfBackend::Puppeteer)),
            PdfBackend::Puppeteer
        );
        assert_eq!(select_backend(Some(&classic), None), PdfBackend::LegacyRenderer);
        assert_eq!(select_backend(None, None), PdfBackend::LegacyRenderer);
    }

    #[test]
    fn print_hide_banner_is_removed() {
        let html = "<body><div class=\"action-banner print-hide\">\n<a>Print</a>\n</div><p>x</p></body>";
        assert_eq!(strip_print_hide(html), "<body><p>x</p></body>");
    }

    #[test]
    fn wkhtmltopdf_args_use_preset_and_margins() {
        let req = PdfRequest {
            orientation: Some(PdfOrientation::Landscape),
            page_size_preset: Some(PdfPagePreset::Legal),
            scale: Some(1.5),
            ..PdfRequest::test_new("<p/>".into())
        };
        let args = wkhtmltopdf_args(&req, &PdfGlobalConfig::default());

        let joined = args.join(" ");
        assert!(joined.contains("--orientation Landscape"));
        assert!(joined.contains("--page-size Legal"));
        assert!(joined.contains("--margin-top 0mm"));
        assert!(joined.contains("--zoom 1.5"));
        assert!(joined.ends_with("--print-media-type"));
    }

    #[test]
    fn default_template_escapes_document_values() {
        let format = PrintFormatConfig::new("Standard", false, PdfBackend::LegacyRenderer);
        let doc = Document {
            doctype: "Note".to_string(),
            name: "N-1".to_string(),
            data: [("title".to_string(), serde_json::json!("<b>hi</b>"))]
                .into_iter()
                .collect(),
        };

        let html = render_document_html(&format, &doc, Some("ACME")).unwrap();
        assert!(html.contains("&lt;b&gt;hi"));
        assert!(!html.contains("<b>"));
        assert!(html.contains("<div class=\"letter-head\">ACME</div>"));
        assert!(html.contains("Note: N-1"));
    }

    #[test]
    fn format_template_is_rendered_with_doc() {
        let mut format = PrintFormatConfig::new("Custom", true, PdfBackend::Puppeteer);
        format.html = Some("<body><h1>{{ doc.title }}</h1></body>".to_string());
        let doc = Document {
            doctype: "Note".to_string(),
            name: "N-1".to_string(),
            data: [("title".to_string(), serde_json::json!("Hola"))]
                .into_iter()
                .collect(),
        };

        let html = render_document_html(&format, &doc, None).unwrap();
        assert_eq!(html, "<body><h1>Hola</h1></body>");
    }

    #[test]
    fn templates_can_use_unit_helpers() {
        let mut format = PrintFormatConfig::new("Designer", true, PdfBackend::Puppeteer);
        format.html = Some(
            "<div style=\"{{ {'fontSize': '12px'}|convert_css }}\">{{ convert_uom(25.4, 'mm', 'in') }}</div>"
                .to_string(),
        );
        let doc = Document {
            doctype: "Note".to_string(),
            name: "N-1".to_string(),
            data: Default::default(),
        };

        let html = render_document_html(&format, &doc, None).unwrap();
        assert!(html.contains("font-size:12px!important;user-select: all;"));
        assert!(html.contains(">1in</div>"));
    }

    #[test]
    fn unknown_unit_in_template_is_a_render_error() {
        let mut format = PrintFormatConfig::new("Designer", true, PdfBackend::Puppeteer);
        format.html = Some("{{ convert_uom(1, 'pt', 'px') }}".to_string());
        let doc = Document {
            doctype: "Note".to_string(),
            name: "N-1".to_string(),
            data: Default::default(),
        };

        assert!(render_document_html(&format, &doc, None).is_err());
    }

    #[test]
    fn convert_uom_defaults_to_pixels_and_keeps_same_unit_values() {
        let mut format = PrintFormatConfig::new("Designer", true, PdfBackend::Puppeteer);
        format.html = Some(
            "{{ convert_uom(12) }}|{{ convert_uom(12, 'mm', 'mm') }}|{{ convert_uom(1, 'in') }}|{{ convert_uom(10, 'mm', 'px', true) }}"
                .to_string(),
        );
        let doc = Document {
            doctype: "Note".to_string(),
            name: "N-1".to_string(),
            data: Default::default(),
        };

        let html = render_document_html(&format, &doc, None).unwrap();
        assert_eq!(html, "12|12|96px|37.795");
    }

    #[test]
    fn convert_css_keeps_declaration_order() {
        let mut format = PrintFormatConfig::new("Designer", true, PdfBackend::Puppeteer);
        format.html = Some(
            "{{ {'padding': '1px', 'border': '0'}|convert_css }}\n{{ doc.style|convert_css }}\n{{ none|convert_css }}"
                .to_string(),
        );
        let doc = Document {
            doctype: "Note".to_string(),
            name: "N-1".to_string(),
            data: [(
                "style".to_string(),
                serde_json::json!({ "margin": "0", "backgroundColor": "" }),
            )]
            .into_iter()
            .collect(),
        };

        let html = render_document_html(&format, &doc, None).unwrap();
        let lines: Vec<&str> = html.lines().collect();
        assert_eq!(lines[0], "padding:1px!important;border:0!important;user-select: all;");
        assert_eq!(
            lines[1],
            "margin:0!important;background-color:transparent!important;user-select: all;"
        );
        assert_eq!(lines[2], "user-select: all;");
    }

    #[test]
    fn file_names_are_reduced_to_their_last_component() {
        assert_eq!(safe_file_stem("factura.pdf"), "factura");
        assert_eq!(safe_file_stem("../escaped"), "escaped");
        assert_eq!(safe_file_stem("../../etc/passwd"), "passwd");
        assert_eq!(safe_file_stem("..\\win\\evil.pdf"), "evil");
        assert_eq!(safe_file_stem(".."), "document");
        assert_eq!(safe_file_stem("dir/"), "document");
    }

    #[test]
    fn stored_pdf_stays_inside_store_dir() {
        let root = tempfile::tempdir().unwrap();
        let store = root.path().join("pdfs");
        let service = unavailable_service(store.clone());

        let stored = service.store_pdf("../escaped", b"%PDF").unwrap();

        assert!(!stored.contains('/') && !stored.contains(".."));
        assert!(store.join(&stored).exists());
        let leaked = std::fs::read_dir(root.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .any(|e| e.file_name().to_string_lossy().starts_with("escaped_"));
        assert!(!leaked, "PDF escrito fuera de {:?}", store);
    }

    #[test]
    fn temp_files_stay_inside_temp_dir() {
        let store = tempfile::tempdir().unwrap();
        let service = unavailable_service(store.path().to_path_buf());

        let files = service.create_temp_files("../../evil.pdf");

        assert_eq!(files.html_path.parent(), Some(service.temp_dir().as_path()));
        assert_eq!(files.pdf_path.parent(), Some(service.temp_dir().as_path()));
    }

    #[actix_rt::test]
    async fn missing_chrome_degrades_to_legacy() {
        let store = tempfile::tempdir().unwrap();
        let service = unavailable_service(store.path().to_path_buf());
        let pd = PrintFormatConfig::new("PD", true, PdfBackend::Puppeteer);

        let backend = service.resolve_backend(Some(&pd), None).await;
        assert_eq!(backend, PdfBackend::LegacyRenderer);
    }

    #[actix_rt::test]
    async fn generation_fails_when_no_backend_is_available() {
        let store = tempfile::tempdir().unwrap();
        let service = unavailable_service(store.path().to_path_buf());
        let pd = PrintFormatConfig::new("PD", true, PdfBackend::Puppeteer);

        let res = service
            .generate_pdf(PdfRequest::test_new("<h1>Hola</h1>".into()), Some(&pd))
            .await;
        assert!(res.is_err());
        // no queda nada guardado
        assert_eq!(std::fs::read_dir(store.path()).unwrap().count(), 0);
    }

    // Requiere Chrome/Chromium instalado: cargo test -- --ignored
    #[actix_rt::test]
    #[ignore]
    async fn test_generate_pdf_with_chrome() {
        let store = tempfile::tempdir().unwrap();
        let config = ServiceConfig {
            pdf_store_dir: store.path().to_path_buf(),
            ..ServiceConfig::default()
        };
        let chrome = ChromeManager::new(config.chrome.clone());
        let service = PdfService::new(&config, chrome.clone()).expect("Failed to create service");
        let pd = PrintFormatConfig::new("PD", true, PdfBackend::Puppeteer);

        let req = PdfRequest {
            store_local_pdf: Some(true),
            ..PdfRequest::test_new("<h1>Hola mundo</h1>".into())
        };
        let generated = service.generate_pdf(req, Some(&pd)).await.unwrap();
        chrome.stop().await.unwrap();

        assert!(generated.data.starts_with(b"%PDF"), "No inicia con %PDF");
        assert_eq!(generated.backend, PdfBackend::Puppeteer);
        let stored = generated.stored_at.expect("stored file name");
        assert!(store.path().join(stored).exists());
    }
}
