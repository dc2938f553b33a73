use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use super::domain::{EmployeeDraft, EmployeeId};
use super::notification::DocumentRequest;
use super::repository::{NotificationSender, PersonnelRepository, RepositoryError};
use super::service::{PersonnelService, PersonnelServiceError};

const INVALID_REQUEST: &str = "Ungültige Anfrage.";

/// `{success, message}` envelope returned on every personnel endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<EmployeeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiResponse {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            id: None,
            error: None,
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            id: None,
            error: None,
        }
    }
}

/// Router builder exposing the dashboard's personnel endpoints.
pub fn personnel_router<R, N>(service: Arc<PersonnelService<R, N>>) -> Router
where
    R: PersonnelRepository + 'static,
    N: NotificationSender + 'static,
{
    Router::new()
        .route(
            "/api/v1/personnel/insert",
            post(insert_handler::<R, N>).fallback(reject_method),
        )
        .route(
            "/api/v1/personnel/update",
            post(update_handler::<R, N>).fallback(reject_method),
        )
        .route(
            "/api/v1/personnel/document-request",
            post(document_request_handler::<R, N>).fallback(reject_method),
        )
        .route("/api/v1/personnel/records", get(list_handler::<R, N>))
        .route(
            "/api/v1/personnel/records/:employee_id",
            get(fetch_handler::<R, N>),
        )
        .with_state(service)
}

pub(crate) async fn reject_method() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ApiResponse::failure(INVALID_REQUEST)),
    )
        .into_response()
}

pub(crate) async fn insert_handler<R, N>(
    State(service): State<Arc<PersonnelService<R, N>>>,
    payload: Result<Json<EmployeeDraft>, JsonRejection>,
) -> Response
where
    R: PersonnelRepository + 'static,
    N: NotificationSender + 'static,
{
    let Json(draft) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejected_body(rejection),
    };

    match service.insert(draft) {
        Ok(id) => {
            let mut body = ApiResponse::ok("Mitarbeiter erfolgreich hinzugefügt.");
            body.id = Some(id);
            (StatusCode::CREATED, Json(body)).into_response()
        }
        Err(err) => failure_response(err, "Fehler beim Hinzufügen des Mitarbeiters."),
    }
}

pub(crate) async fn update_handler<R, N>(
    State(service): State<Arc<PersonnelService<R, N>>>,
    payload: Result<Json<EmployeeDraft>, JsonRejection>,
) -> Response
where
    R: PersonnelRepository + 'static,
    N: NotificationSender + 'static,
{
    let Json(draft) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejected_body(rejection),
    };

    match service.update(draft) {
        Ok(id) => {
            let mut body = ApiResponse::ok("Mitarbeiter erfolgreich aktualisiert.");
            body.id = Some(id);
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(err) => failure_response(err, "Fehler beim Aktualisieren des Mitarbeiters."),
    }
}

pub(crate) async fn document_request_handler<R, N>(
    State(service): State<Arc<PersonnelService<R, N>>>,
    payload: Result<Json<DocumentRequest>, JsonRejection>,
) -> Response
where
    R: PersonnelRepository + 'static,
    N: NotificationSender + 'static,
{
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejected_body(rejection),
    };

    match service.request_document(request) {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse::ok("Email erfolgreich versendet")),
        )
            .into_response(),
        Err(err) => failure_response(err, "Email konnte nicht versendet werden."),
    }
}

pub(crate) async fn list_handler<R, N>(
    State(service): State<Arc<PersonnelService<R, N>>>,
) -> Response
where
    R: PersonnelRepository + 'static,
    N: NotificationSender + 'static,
{
    match service.list() {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(err) => failure_response(err, "Fehler beim Laden der Mitarbeiter."),
    }
}

pub(crate) async fn fetch_handler<R, N>(
    State(service): State<Arc<PersonnelService<R, N>>>,
    employee_id: Result<Path<u64>, PathRejection>,
) -> Response
where
    R: PersonnelRepository + 'static,
    N: NotificationSender + 'static,
{
    let Path(employee_id) = match employee_id {
        Ok(path) => path,
        Err(rejection) => return rejected_request(rejection.body_text()),
    };

    match service.get(EmployeeId(employee_id)) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(err) => failure_response(err, "Fehler beim Laden des Mitarbeiters."),
    }
}

fn rejected_body(rejection: JsonRejection) -> Response {
    rejected_request(rejection.body_text())
}

/// Extractor rejections keep the envelope; axum's own text goes to `error`.
fn rejected_request(detail: String) -> Response {
    let mut body = ApiResponse::failure(INVALID_REQUEST);
    body.error = Some(detail);
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}

/// Validation problems are the user's to fix (422); store failures keep the
/// underlying message in `error`; mail failures carry the collaborator's
/// status.
fn failure_response(err: PersonnelServiceError, context: &str) -> Response {
    let (status, body) = match err {
        PersonnelServiceError::Validation(err) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            ApiResponse::failure(err.to_string()),
        ),
        PersonnelServiceError::Form(err) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            ApiResponse::failure(err.to_string()),
        ),
        PersonnelServiceError::InvalidRequest(message) => {
            (StatusCode::BAD_REQUEST, ApiResponse::failure(message))
        }
        PersonnelServiceError::Repository(err @ RepositoryError::NotFound(_)) => {
            (StatusCode::NOT_FOUND, ApiResponse::failure(err.to_string()))
        }
        PersonnelServiceError::Repository(err) => {
            let mut body = ApiResponse::failure(context);
            body.error = Some(err.to_string());
            (StatusCode::INTERNAL_SERVER_ERROR, body)
        }
        PersonnelServiceError::Notification(err) => {
            let status =
                StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::BAD_REQUEST);
            (status, ApiResponse::failure(err.message))
        }
    };

    (status, Json(body)).into_response()
}
