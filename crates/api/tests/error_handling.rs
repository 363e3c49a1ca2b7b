//! Tests for `AppError` → HTTP response mapping.

use artgrid_api::error::AppError;
use artgrid_core::error::CoreError;
use artgrid_matrix::MatrixError;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;

async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn batch_not_found_returns_404() {
    let (status, json) =
        error_to_response(MatrixError::BatchNotFound("20250101-000000".into()).into()).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Batch '20250101-000000' not found");
}

#[tokio::test]
async fn validation_error_returns_400() {
    let (status, json) =
        error_to_response(CoreError::Validation("bad name".into()).into()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "bad name");
}

#[tokio::test]
async fn io_error_is_sanitized_500() {
    let err = CoreError::io(
        "/srv/secret/path",
        std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
    );
    let (status, json) = error_to_response(MatrixError::Core(err).into()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}

#[tokio::test]
async fn unreadable_store_returns_503() {
    let err = MatrixError::Store(sqlx::Error::RowNotFound);
    let (status, json) = error_to_response(err.into()).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["code"], "STORE_UNAVAILABLE");
    assert_eq!(json["error"], "The batch record store is not readable yet");
}
