use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use tenantdesk_core::DomainError;
use tenantdesk_infra::{ControlPlaneError, store::StoreError};

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::InvariantViolation(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation", msg)
        }
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        DomainError::Unauthorized => json_error(StatusCode::FORBIDDEN, "forbidden", "forbidden"),
    }
}

/// Single place where DynamoDB failure classes become HTTP statuses.
pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::AccessDenied(msg) => json_error(StatusCode::FORBIDDEN, "access_denied", msg),
        StoreError::TableNotFound(msg) => {
            json_error(StatusCode::NOT_FOUND, "resource_not_found", msg)
        }
        StoreError::Throttled(msg) => {
            json_error(StatusCode::TOO_MANY_REQUESTS, "throttling", msg)
        }
        StoreError::CapacityExceeded(msg) => {
            json_error(StatusCode::TOO_MANY_REQUESTS, "throughput_exceeded", msg)
        }
        StoreError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        StoreError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        StoreError::Unavailable(msg) => {
            json_error(StatusCode::SERVICE_UNAVAILABLE, "network_error", msg)
        }
        StoreError::Decode(msg) | StoreError::Other(msg) => {
            tracing::error!(error = %msg, "store operation failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg)
        }
    }
}

pub fn control_plane_error_to_response(err: ControlPlaneError) -> axum::response::Response {
    match err {
        ControlPlaneError::Status { status, body } => {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            json_error(status, "upstream_error", body)
        }
        ControlPlaneError::Http(e) => {
            tracing::warn!(error = %e, "control plane unreachable");
            json_error(
                StatusCode::SERVICE_UNAVAILABLE,
                "network_error",
                "Unable to connect to the control plane",
            )
        }
        ControlPlaneError::Decode(msg) => {
            json_error(StatusCode::BAD_GATEWAY, "bad_upstream_payload", msg)
        }
    }
}
