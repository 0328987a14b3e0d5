use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{Map, Value};

/// Uniform response body `{code, success, message, data}`
///
/// Every route answers with this shape, success or failure. The HTTP
/// status always equals `code`. A handler produces exactly one envelope
/// and hands it to axum by value, so a response can't be written twice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    #[serde(skip)]
    status: StatusCode,
    code: u16,
    success: bool,
    message: String,
    data: Value,
}

impl Envelope {
    /// Creates an envelope with the given status, flag, message and data
    ///
    /// `None` (or any non-object value that serializes to `null`) becomes an
    /// empty object so clients can always index into `data`.
    pub fn new(
        status: StatusCode,
        success: bool,
        message: impl Into<String>,
        data: Option<Value>,
    ) -> Self {
        let data = match data {
            Some(Value::Null) | None => Value::Object(Map::new()),
            Some(value) => value,
        };

        Self {
            status,
            code: status.as_u16(),
            success,
            message: message.into(),
            data,
        }
    }

    /// Success envelope carrying a payload
    pub fn success(status: StatusCode, message: impl Into<String>, data: Value) -> Self {
        Self::new(status, true, message, Some(data))
    }

    /// Success envelope with an empty payload
    pub fn message(status: StatusCode, message: impl Into<String>) -> Self {
        Self::new(status, true, message, None)
    }

    /// Failure envelope with an empty payload
    pub fn failure(status: StatusCode, message: impl Into<String>) -> Self {
        Self::new(status, false, message, None)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn message_text(&self) -> &str {
        &self.message
    }

    pub fn data(&self) -> &Value {
        &self.data
    }
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}
