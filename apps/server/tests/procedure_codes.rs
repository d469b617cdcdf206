#[allow(unused)]
mod support;

use axum::http::StatusCode;
use support::*;

#[tokio::test]
async fn digit_terms_are_code_prefixes() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            app.insert_procedure_codes(&sample_procedure_codes()).await?;

            // "456" appears inside 04567 and in a description, but only 45678 starts with it.
            let (status, page) = app.get_json("/api/tuss?search=456").await?;
            assert_status(status, StatusCode::OK, "prefix search");
            assert_eq!(item_field(&page, "code")?, vec!["45678"]);

            // Code search trims the term.
            let (_, page) = app.get_json("/api/tuss?search=%20456%20").await?;
            assert_eq!(item_field(&page, "code")?, vec!["45678"]);

            let (_, page) = app.get_json("/api/tuss?search=101010").await?;
            assert_eq!(item_field(&page, "code")?, vec!["10101012", "10101039"]);
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn text_terms_match_description_case_insensitively() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            app.insert_procedure_codes(&sample_procedure_codes()).await?;

            let (_, page) = app.get_json("/api/tuss?search=consulta").await?;
            assert_page(&page, 2, 2, 1, 1);
            assert_eq!(item_field(&page, "code")?, vec!["10101012", "10101039"]);

            let (_, page) = app.get_json("/api/tuss?search=EXAME%20de").await?;
            assert_eq!(item_field(&page, "code")?, vec!["45678", "04567"]);

            let (_, page) = app.get_json("/api/tuss?search=50%25").await?;
            assert_eq!(item_field(&page, "code")?, vec!["40301630"]);
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn listing_pages_in_insertion_order() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            app.insert_procedure_codes(&sample_procedure_codes()).await?;

            let (_, page) = app.get_json("/api/tuss?page=2&page_size=4").await?;
            assert_page(&page, 2, 6, 2, 2);
            assert_eq!(item_field(&page, "code")?, vec!["99999", "40301630"]);

            let (status, body) = app.get_json("/api/tuss?page_size=501").await?;
            assert_status(status, StatusCode::BAD_REQUEST, "oversized page");
            assert_error_body(&body, StatusCode::BAD_REQUEST, "invalid-parameter");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn lookup_by_code() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            app.insert_procedure_codes(&sample_procedure_codes()).await?;

            let (status, body) = app.get_json("/api/tuss/10101039").await?;
            assert_status(status, StatusCode::OK, "known code");
            assert_eq!(
                body,
                serde_json::json!({"code": "10101039", "description": "CONSULTA EM PRONTO SOCORRO"})
            );

            // Leading zeros are part of the code.
            let (status, _) = app.get_json("/api/tuss/4567").await?;
            assert_status(status, StatusCode::NOT_FOUND, "code without leading zero");

            let (status, body) = app.get_json("/api/tuss/00000000").await?;
            assert_status(status, StatusCode::NOT_FOUND, "unknown code");
            let message = assert_error_body(&body, StatusCode::NOT_FOUND, "not-found");
            assert!(message.contains("00000000"), "{message}");
            Ok(())
        })
    })
    .await
}
