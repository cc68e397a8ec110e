//! tests/print_view_tests.rs
//! Vista de impresión decorada.

#[cfg(test)]
mod tests {
    use crate::models::{
        document_model::DocRef, notice_model::NoticeKind, print_format_model::PdfBackend,
    };
    use crate::services::{
        backend_policy::PUPPETEER_VIEW_TITLE,
        host_context::HostError,
        print_view::{HostPrintView, PolicyPrintView, PrintView, DEFAULT_VIEW_TITLE},
    };
    use crate::tests::fake_host::FakeHost;

    fn host() -> FakeHost {
        FakeHost::new()
            .with_format("PD Invoice", true, PdfBackend::Puppeteer)
            .with_format("PD Legacy", true, PdfBackend::LegacyRenderer)
            .with_document("Sales Invoice", "SINV-0001")
    }

    fn invoice() -> DocRef {
        DocRef::new("Sales Invoice", "SINV-0001")
    }

    #[actix_rt::test]
    async fn puppeteer_formats_relabel_the_view() {
        let host = host();
        let mut view = PolicyPrintView::new(
            HostPrintView::new(&host, Some("PD Invoice".to_string())),
            &host,
        );

        view.show(&invoice()).await.unwrap();

        assert_eq!(view.title(), PUPPETEER_VIEW_TITLE);
        assert!(host.notices().is_empty());
    }

    #[actix_rt::test]
    async fn legacy_formats_keep_the_default_title() {
        let host = host();
        let mut view = PolicyPrintView::new(
            HostPrintView::new(&host, Some("PD Legacy".to_string())),
            &host,
        );

        view.show(&invoice()).await.unwrap();

        assert_eq!(view.title(), DEFAULT_VIEW_TITLE);
        let inner = view.into_inner();
        assert_eq!(inner.meta().map(|m| m.doctype.as_str()), Some("Sales Invoice"));
    }

    #[actix_rt::test]
    async fn print_suggests_puppeteer_and_still_delegates() {
        let host = host();
        let inner = HostPrintView::new(&host, Some("PD Legacy".to_string()))
            .with_letterhead(true, Some("ACME Letterhead".to_string()));
        let mut view = PolicyPrintView::new(inner, &host);

        view.show(&invoice()).await.unwrap();
        let rendered = view.print_doc().await.unwrap();

        assert_eq!(rendered.file_name, "SINV-0001.pdf");
        assert_eq!(host.notices_of(NoticeKind::Advisory), 1);

        let calls = host.render_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].doctype, "Sales Invoice");
        assert_eq!(calls[0].name, "SINV-0001");
        assert_eq!(calls[0].format, "PD Legacy");
        assert_eq!(calls[0].no_letterhead, 1);
        assert_eq!(calls[0].letterhead.as_deref(), Some("ACME Letterhead"));
    }

    #[actix_rt::test]
    async fn print_without_format_uses_standard() {
        let host = host();
        let mut view = PolicyPrintView::new(HostPrintView::new(&host, None), &host);

        view.show(&invoice()).await.unwrap();
        view.print_doc().await.unwrap();

        assert_eq!(host.render_calls()[0].format, "Standard");
        assert!(host.notices().is_empty());
    }

    #[actix_rt::test]
    async fn render_failure_is_propagated_after_advice() {
        let host = host().failing_render();
        let mut view = PolicyPrintView::new(
            HostPrintView::new(&host, Some("PD Legacy".to_string())),
            &host,
        );

        view.show(&invoice()).await.unwrap();
        let res = view.print_doc().await;

        assert!(matches!(res, Err(HostError::Render(_))));
        assert_eq!(host.notices_of(NoticeKind::Advisory), 1);
        assert_eq!(host.render_calls().len(), 1);
    }

    #[actix_rt::test]
    async fn missing_document_fails_show() {
        let host = host();
        let mut view = PolicyPrintView::new(
            HostPrintView::new(&host, Some("PD Invoice".to_string())),
            &host,
        );

        let res = view.show(&DocRef::new("Sales Invoice", "NOPE")).await;

        assert!(matches!(res, Err(HostError::NotFound { .. })));
        assert_eq!(view.title(), DEFAULT_VIEW_TITLE);
    }
}
