use common_http_errors::ApiError;
use axum::response::IntoResponse;
use axum::body::to_bytes;

#[tokio::test]
async fn json_errors_carry_code_and_message() {
    let err = ApiError::bad_request("invalid_payment_session", "items must not be empty");
    let resp = err.into_response();
    assert_eq!(resp.status().as_u16(), 400);
    let body_bytes = to_bytes(resp.into_body(), 1024*8).await.unwrap();
    let text = String::from_utf8(body_bytes.to_vec()).unwrap();
    assert!(text.contains("\"code\":\"invalid_payment_session\""), "unexpected body: {}", text);
    assert!(text.contains("items must not be empty"), "unexpected body: {}", text);
}

#[tokio::test]
async fn webhook_rejection_is_plain_text() {
    let resp = ApiError::webhook_rejected("No signatures found").into_response();
    let body_bytes = to_bytes(resp.into_body(), 1024*8).await.unwrap();
    assert_eq!(&body_bytes[..], b"Webhook Error: No signatures found");
}
