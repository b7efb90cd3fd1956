// handlers/save_data.rs - POST and OPTIONS /save-data

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{
        header::{ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN},
        HeaderValue, StatusCode,
    },
    response::IntoResponse,
};
use serde_json::Value;

use crate::api::{ApiResult, SaveResponse};
use crate::database::{BoundStatement, PreparedStatement};
use crate::error::ApiError;
use crate::server::AppState;
use crate::types::ScanRecord;

const INSERT_SCAN_SQL: &str =
    "INSERT INTO scan_data (sequence, barcode_text, scan_timestamp) VALUES (?, ?, ?)";

/**
 * POST /save-data - Store a batch of scanned barcodes
 *
 * Expected Input:
 * ```json
 * { "data": [ { "sequence": 1, "text": "ABC123", "timestamp": "2024-01-01T00:00:00Z" } ] }
 * ```
 *
 * Expected Output (Success):
 * ```json
 * { "success": true, "message": "1개의 데이터가 성공적으로 저장되었습니다!", "saved": 1 }
 * ```
 *
 * The table is created on first use. All rows of a request are written in
 * one transaction, so a failing item leaves nothing behind.
 */
pub async fn save_data_post(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<SaveResponse> {
    // Read and parsed by hand so oversized or malformed bodies get the same
    // envelope as any other failure
    let body = body?;
    let payload: Value = serde_json::from_slice(&body)?;
    let items = scan_items(&payload)?;

    state
        .schema
        .ensure(state.db.as_ref())
        .await
        .map_err(ApiError::schema)?;

    let statements = bind_all(items)?;
    let results = state
        .db
        .batch(statements)
        .await
        .map_err(ApiError::persistence)?;

    tracing::debug!(received = items.len(), saved = results.len(), "stored scan batch");
    Ok(SaveResponse::saved(items.len(), results.len(), state.cors_origin.clone()))
}

/// OPTIONS /save-data - CORS preflight, never touches the database
pub async fn save_data_options(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [
            (ACCESS_CONTROL_ALLOW_ORIGIN, state.cors_origin.clone()),
            (ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static("POST, OPTIONS")),
            (ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("Content-Type")),
        ],
    )
}

/// The non-empty `data` array of the request body
fn scan_items(payload: &Value) -> Result<&[Value], ApiError> {
    if payload.is_null() {
        return Err(ApiError::internal_server_error("request body is null"));
    }

    match payload.get("data") {
        Some(Value::Array(items)) if !items.is_empty() => Ok(items.as_slice()),
        _ => Err(ApiError::no_data()),
    }
}

fn bind_all(items: &[Value]) -> Result<Vec<BoundStatement>, ApiError> {
    let insert = PreparedStatement::new(INSERT_SCAN_SQL);
    items
        .iter()
        .map(|item| -> Result<BoundStatement, ApiError> {
            let params = ScanRecord::from_item(item).params()?;
            Ok(insert.bind(params))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::SqlValue;
    use serde_json::json;

    #[test]
    fn rejects_missing_empty_or_non_array_data() {
        for payload in [json!({}), json!({ "data": [] }), json!({ "data": "x" }), json!({ "data": null }), json!([1, 2])] {
            let err = scan_items(&payload).unwrap_err();
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST, "payload: {}", payload);
        }
    }

    #[test]
    fn null_body_is_an_internal_error() {
        let err = scan_items(&Value::Null).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.detail(), "request body is null");
    }

    #[test]
    fn binds_one_statement_per_item() {
        let payload = json!({ "data": [
            { "sequence": 1, "text": "A", "timestamp": "t1" },
            { "sequence": 2, "text": "B", "timestamp": "t2" }
        ]});
        let statements = bind_all(scan_items(&payload).unwrap()).unwrap();

        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0].sql(), INSERT_SCAN_SQL);
        assert_eq!(
            statements[1].params(),
            &[SqlValue::Integer(2), SqlValue::Text("B".into()), SqlValue::Text("t2".into())]
        );
    }

    #[test]
    fn one_unbindable_item_fails_the_batch() {
        let payload = json!({ "data": [
            { "sequence": 1, "text": "A", "timestamp": "t1" },
            { "sequence": 2, "text": ["B"], "timestamp": "t2" }
        ]});
        let err = bind_all(scan_items(&payload).unwrap()).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
