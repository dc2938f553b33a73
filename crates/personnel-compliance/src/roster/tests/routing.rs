use super::common::*;
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

use crate::roster::domain::EmployeeId;
use crate::roster::repository::NotificationError;
use crate::roster::router::{
    document_request_handler, fetch_handler, insert_handler, list_handler, update_handler,
};
use crate::roster::PersonnelService;

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

#[tokio::test]
async fn insert_handler_returns_created_with_id() {
    let (service, repository, _) = build_service();

    let response = insert_handler::<MemoryRepository, MemoryNotifier>(
        State(Arc::new(service)),
        Ok(axum::Json(anna_draft())),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["success"], json!(true));
    assert_eq!(payload["id"], json!(1));
    assert!(repository.stored(EmployeeId(1)).is_some());
}

#[tokio::test]
async fn insert_handler_returns_unprocessable_for_validation_errors() {
    let (service, _, _) = build_service();
    let mut draft = anna_draft();
    draft.postal_address = "1234 Berlin".to_string();

    let response = insert_handler::<MemoryRepository, MemoryNotifier>(
        State(Arc::new(service)),
        Ok(axum::Json(draft)),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["success"], json!(false));
    assert_eq!(
        payload["message"],
        json!("Die Postleitzahl ist falsch eingetragen.")
    );
}

#[tokio::test]
async fn insert_handler_returns_internal_error_on_repository_failure() {
    let service = Arc::new(PersonnelService::new(
        Arc::new(UnavailableRepository),
        Arc::new(MemoryNotifier::default()),
        template(),
    ));

    let response = insert_handler::<UnavailableRepository, MemoryNotifier>(
        State(service),
        Ok(axum::Json(anna_draft())),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let payload = read_json_body(response).await;
    assert_eq!(
        payload["message"],
        json!("Fehler beim Hinzufügen des Mitarbeiters.")
    );
    assert!(payload["error"]
        .as_str()
        .unwrap_or_default()
        .contains("database offline"));
}

#[tokio::test]
async fn update_handler_requires_an_id() {
    let (service, _, _) = build_service();

    let response = update_handler::<MemoryRepository, MemoryNotifier>(
        State(Arc::new(service)),
        Ok(axum::Json(anna_draft())),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    assert_eq!(payload["message"], json!("Fehlende Daten."));
}

#[tokio::test]
async fn update_handler_confirms_in_german() {
    let (service, _, _) = build_service();
    let service = Arc::new(service);
    let id = service.insert(anna_draft()).expect("insert succeeds");

    let mut draft = anna_draft();
    draft.id = Some(id);
    let response = update_handler::<MemoryRepository, MemoryNotifier>(
        State(service),
        Ok(axum::Json(draft)),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(
        payload["message"],
        json!("Mitarbeiter erfolgreich aktualisiert.")
    );
}

#[tokio::test]
async fn fetch_and_list_handlers_return_records() {
    let (service, _, _) = build_service();
    let service = Arc::new(service);
    service.insert(anna_draft()).expect("insert succeeds");

    let response = fetch_handler::<MemoryRepository, MemoryNotifier>(
        State(service.clone()),
        Ok(axum::extract::Path(1)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["vorname"], json!("Anna"));
    assert_eq!(payload["fz_abgelaufen"], json!("2029-01-01"));
    assert_eq!(
        payload["fz_kontrolliert"],
        json!("Max Mustermann Erika Musterfrau")
    );

    let response = fetch_handler::<MemoryRepository, MemoryNotifier>(
        State(service.clone()),
        Ok(axum::extract::Path(99)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = list_handler::<MemoryRepository, MemoryNotifier>(State(service)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn document_request_handler_uses_notifier_status() {
    let service = Arc::new(PersonnelService::new(
        Arc::new(MemoryRepository::default()),
        Arc::new(FailingNotifier(NotificationError::new("SMTP abgelehnt"))),
        template(),
    ));

    let response = document_request_handler::<MemoryRepository, FailingNotifier>(
        State(service),
        Ok(axum::Json(document_request())),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    assert_eq!(payload["message"], json!("SMTP abgelehnt"));
}

#[tokio::test]
async fn document_request_route_confirms_delivery() {
    let (service, _, notifier) = build_service();
    let router = personnel_router_with_service(service);

    let response = router
        .oneshot(post_json(
            "/api/v1/personnel/document-request",
            json!({"email": "anna@example.org", "name": "Müller", "vorname": "Anna"}),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["message"], json!("Email erfolgreich versendet"));
    assert_eq!(notifier.sent().len(), 1);
}

#[tokio::test]
async fn insert_route_accepts_dashboard_payloads() {
    let (service, repository, _) = build_service();
    let router = personnel_router_with_service(service);

    let response = router
        .oneshot(post_json(
            "/api/v1/personnel/insert",
            json!({
                "name": "Müller",
                "vorname": "Anna",
                "email": "A@X.com",
                "postadresse": "12345 Berlin",
                "gemeinde_freizeit": null,
                "fz_eingetragen": "2024-01-01",
                "fz_abgelaufen": "",
                "fz_kontrolliert_first": "Max Mustermann",
                "fz_kontrolliert_second": "Erika Musterfrau",
                "fz_kontrolliert_am": "2024-01-05",
                "hauptamt": false
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CREATED);
    let stored = repository.stored(EmployeeId(1)).expect("record present");
    assert_eq!(stored.email, "a@x.com");
}

#[tokio::test]
async fn non_post_requests_are_rejected() {
    let (service, _, _) = build_service();
    let router = personnel_router_with_service(service);

    let response = router
        .oneshot(
            Request::get("/api/v1/personnel/insert")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["success"], json!(false));
    assert_eq!(payload["message"], json!("Ungültige Anfrage."));
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let (service, repository, _) = build_service();
    let router = personnel_router_with_service(service);

    let response = router
        .oneshot(
            Request::post("/api/v1/personnel/update")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    assert_eq!(payload["message"], json!("Ungültige Anfrage."));
    assert_eq!(repository.calls(), 0);
}

#[tokio::test]
async fn fetched_record_can_be_posted_back_to_update() {
    let (service, repository, _) = build_service();
    service.insert(anna_draft()).expect("insert succeeds");
    let router = personnel_router_with_service(service);

    let response = router
        .clone()
        .oneshot(
            Request::get("/api/v1/personnel/records/1")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let mut record = read_json_body(response).await;
    record["fz_abgelaufen"] = json!("2099-12-31");

    let response = router
        .oneshot(post_json("/api/v1/personnel/update", record))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(
        payload["message"],
        json!("Mitarbeiter erfolgreich aktualisiert.")
    );
    let stored = repository.stored(EmployeeId(1)).expect("record present");
    assert_eq!(
        stored.background_check.verified_by.as_deref(),
        Some("Max Mustermann Erika Musterfrau")
    );
    assert_eq!(
        stored.background_check.expires_on,
        chrono::NaiveDate::from_ymd_opt(2029, 1, 1)
    );
}

#[tokio::test]
async fn update_with_combined_verifier_column_keeps_verifiers() {
    let (service, repository, _) = build_service();
    service.insert(anna_draft()).expect("insert succeeds");
    let router = personnel_router_with_service(service);

    let response = router
        .oneshot(post_json(
            "/api/v1/personnel/update",
            json!({
                "id": 1,
                "name": "Müller",
                "vorname": "Anna",
                "email": "anna@example.org",
                "fz_eingetragen": "2024-01-01",
                "fz_kontrolliert": "Max Mustermann Erika Musterfrau",
                "fz_kontrolliert_am": "2024-01-05"
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let stored = repository.stored(EmployeeId(1)).expect("record present");
    assert_eq!(stored.email, "anna@example.org");
    assert_eq!(
        stored.background_check.verified_by.as_deref(),
        Some("Max Mustermann Erika Musterfrau")
    );
}

#[tokio::test]
async fn non_numeric_record_id_keeps_the_envelope() {
    let (service, _, _) = build_service();
    let router = personnel_router_with_service(service);

    let response = router
        .oneshot(
            Request::get("/api/v1/personnel/records/abc")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    assert_eq!(payload["success"], json!(false));
    assert_eq!(payload["message"], json!("Ungültige Anfrage."));
    assert!(payload["error"].is_string());
}
