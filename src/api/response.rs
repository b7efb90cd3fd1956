use axum::{
    http::{header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;

/// Body of a successful save
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveSummary {
    pub success: bool,
    pub message: String,
    /// Statements the batch reported as executed
    pub saved: usize,
}

/// 200 response for a stored batch, carrying the CORS origin header
#[derive(Debug)]
pub struct SaveResponse {
    pub summary: SaveSummary,
    pub allow_origin: HeaderValue,
}

impl SaveResponse {
    /// `received` is the number of items in the request, `saved` the batch result count
    pub fn saved(received: usize, saved: usize, allow_origin: HeaderValue) -> Self {
        Self {
            summary: SaveSummary {
                success: true,
                message: format!("{}개의 데이터가 성공적으로 저장되었습니다!", received),
                saved,
            },
            allow_origin,
        }
    }
}

impl IntoResponse for SaveResponse {
    fn into_response(self) -> Response {
        (
            StatusCode::OK,
            [(ACCESS_CONTROL_ALLOW_ORIGIN, self.allow_origin)],
            Json(self.summary),
        )
            .into_response()
    }
}

pub type ApiResult<T> = Result<T, crate::error::ApiError>;
