use axum::{http::{header, StatusCode, HeaderValue}, response::{IntoResponse, Response}, Json};
use serde::Serialize;

pub const ERROR_CODE_HEADER: &str = "X-Error-Code";

#[derive(Serialize, Debug)]
pub struct ErrorBody {
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")] pub message: Option<String>,
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest { code: &'static str, message: Option<String> },
    /// Rejected provider callback. Rendered as plain text, the format webhook senders log verbatim.
    WebhookRejected { message: String },
    BadGateway { code: &'static str, message: Option<String> },
    Internal { message: Option<String> },
}

impl ApiError {
    pub fn internal<E: std::fmt::Display>(e: E) -> Self { Self::Internal { message: Some(e.to_string()) } }
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self { Self::BadRequest { code, message: Some(message.into()) } }
    pub fn bad_gateway(code: &'static str, message: impl Into<String>) -> Self { Self::BadGateway { code, message: Some(message.into()) } }
    pub fn webhook_rejected(message: impl Into<String>) -> Self { Self::WebhookRejected { message: message.into() } }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest { code, .. } | ApiError::BadGateway { code, .. } => *code,
            ApiError::WebhookRejected { .. } => "webhook_rejected",
            ApiError::Internal { .. } => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error_code = self.code();
        let mut resp = match self {
            ApiError::WebhookRejected { message } => (
                StatusCode::BAD_REQUEST,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                format!("Webhook Error: {message}"),
            ).into_response(),
            ApiError::BadRequest { code, message } => (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody { code: code.into(), message }),
            ).into_response(),
            ApiError::BadGateway { code, message } => (
                StatusCode::BAD_GATEWAY,
                Json(ErrorBody { code: code.into(), message }),
            ).into_response(),
            ApiError::Internal { message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody { code: "internal_error".into(), message }),
            ).into_response(),
        };
        if let Ok(val) = HeaderValue::from_str(error_code) {
            resp.headers_mut().insert(ERROR_CODE_HEADER, val);
        }
        resp
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
