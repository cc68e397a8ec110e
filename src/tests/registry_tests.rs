//! tests/registry_tests.rs
//! Escrituras concurrentes sobre el registro de formatos.

#[cfg(test)]
mod tests {
    use std::thread;

    use crate::models::print_format_model::{PdfBackend, PrintFormatConfig};
    use crate::services::local_host::Registry;

    #[test]
    fn stale_copy_does_not_overwrite_newer_change() {
        let registry = Registry::new();
        let original = PrintFormatConfig::new("Invoice", false, PdfBackend::LegacyRenderer);
        registry.upsert_format(original.clone());

        // A activa el diseñador
        let mut a = original.clone();
        a.uses_advanced_designer = true;
        a.pdf_backend = PdfBackend::Puppeteer;
        assert!(registry.replace_format(&original, a.clone()));

        // B partió de la misma copia y sólo cambió el html
        let mut b = original.clone();
        b.html = Some("<body></body>".to_string());
        assert!(!registry.replace_format(&original, b));

        assert_eq!(registry.format("Invoice"), Some(a));
    }

    #[test]
    fn replace_requires_an_existing_format() {
        let registry = Registry::new();
        let cfg = PrintFormatConfig::new("Ghost", true, PdfBackend::Puppeteer);
        assert!(!registry.replace_format(&cfg, cfg.clone()));
        assert!(registry.format("Ghost").is_none());
    }

    #[test]
    fn concurrent_edits_are_all_kept() {
        let registry = Registry::new();
        let mut base = PrintFormatConfig::new("Invoice", false, PdfBackend::LegacyRenderer);
        base.html = Some(String::new());
        registry.upsert_format(base);

        let workers: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                thread::spawn(move || {
                    for _ in 0..25 {
                        loop {
                            let original = registry.format("Invoice").unwrap();
                            let mut edited = original.clone();
                            edited.html.get_or_insert_with(String::new).push('x');
                            if registry.replace_format(&original, edited) {
                                break;
                            }
                        }
                    }
                })
            })
            .collect();
        for w in workers {
            w.join().unwrap();
        }

        let html = registry.format("Invoice").unwrap().html.unwrap();
        assert_eq!(html.len(), 200);
    }
}
