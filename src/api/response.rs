//! Response envelope
//!
//! Every endpoint answers with the `{ status, message, data }` envelope
//! the existing clients already consume. The HTTP status code always
//! matches the `status` field in the body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct BaseResponse {
    pub status: u16,
    pub message: String,
    pub data: Value,
}

impl BaseResponse {
    /// 200 envelope with a payload.
    pub fn success(message: impl Into<String>, data: impl Serialize) -> Self {
        Self {
            status: StatusCode::OK.as_u16(),
            message: message.into(),
            data: serde_json::to_value(data).unwrap_or(Value::Null),
        }
    }

    /// 400 envelope with an optional payload.
    pub fn failure(message: impl Into<String>, data: impl Serialize) -> Self {
        Self::with_status(StatusCode::BAD_REQUEST, message, data)
    }

    /// Envelope with an explicit status code.
    pub fn with_status(
        status: StatusCode,
        message: impl Into<String>,
        data: impl Serialize,
    ) -> Self {
        Self {
            status: status.as_u16(),
            message: message.into(),
            data: serde_json::to_value(data).unwrap_or(Value::Null),
        }
    }
}

impl IntoResponse for BaseResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_envelope() {
        let resp = BaseResponse::success("Payment processed", json!({"amount": "105.00"}));
        assert_eq!(resp.status, 200);
        assert_eq!(resp.message, "Payment processed");
        assert_eq!(resp.data["amount"], "105.00");
    }

    #[test]
    fn test_failure_envelope_null_data() {
        let resp = BaseResponse::failure("Insufficient balance", Value::Null);
        assert_eq!(resp.status, 400);
        assert_eq!(resp.data, Value::Null);
    }
}
