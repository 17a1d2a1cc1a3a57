use axum::{body::to_bytes, response::Response};
use serde_json::Value;

/// Read the body of `response` and parse it as JSON.
pub(crate) async fn response_json(response: Response) -> Value {
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Could not read response body");

    serde_json::from_slice(&body).expect("Response body is not valid JSON")
}
