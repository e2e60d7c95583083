pub mod server;
pub mod talk;
pub mod types;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: 200,
            message: "success".to_string(),
            data: Some(data),
        }
    }

    pub fn error(message: &str) -> Self {
        Self {
            code: 400,
            message: message.to_string(),
            data: None,
        }
    }
}

/// Error response: status plus an `ApiResponse` body / 错误响应
pub type ApiError = (StatusCode, Json<ApiResponse<()>>);

pub fn api_error(status: StatusCode, message: &str) -> ApiError {
    let mut body = ApiResponse::error(message);
    body.code = status.as_u16() as i32;
    (status, Json(body))
}

/// JSON response with `Cache-Control: max-age` / 带缓存头的响应
pub fn cached<T: Serialize>(max_age: u64, body: ApiResponse<T>) -> Response {
    (
        [(header::CACHE_CONTROL, format!("max-age={}", max_age))],
        Json(body),
    )
        .into_response()
}
