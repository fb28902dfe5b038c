//! Response handling and the uniform response envelope.
//!
//! # Responsibilities
//! - Build the `{code, message, data, timestamp}` envelope every reply uses
//! - Carry buffered downstream responses back through the filter chain
//! - Map gateway failures to error envelopes at the outer boundary
//!
//! # Design Decisions
//! - `data` is present iff `code == 200`; fields are private so only the
//!   constructors build an envelope, and decoding goes through the same check
//! - A success payload must not serialize to `null`; encoding such an
//!   envelope fails and the caller answers with a 500 instead
//! - The timestamp is taken when the envelope is built, never cached
//! - Responses are fully buffered, so the final status is known before any
//!   header reaches the client

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

/// Envelope code used for successful replies.
pub const SUCCESS_CODE: u16 = 200;

/// `chrono` format of [`Envelope::timestamp`] (`yyyy-MM-dd HH:mm:ss`).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const DEFAULT_SUCCESS_MESSAGE: &str = "Operation successful";

/// Why an envelope could not be encoded or decoded.
#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    #[error("success envelope carries no data")]
    MissingData,

    #[error("error envelope with code {0} carries data")]
    UnexpectedData(u16),

    #[error("success payload serialized to null")]
    NullPayload,

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Uniform reply wrapper shared by the gateway and the services behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawEnvelope<T>")]
pub struct Envelope<T> {
    code: u16,
    message: String,
    data: Option<T>,
    timestamp: String,
}

/// Wire shape before the code/data check.
#[derive(Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct RawEnvelope<T> {
    code: u16,
    message: String,
    #[serde(default)]
    data: Option<T>,
    timestamp: String,
}

impl<T> TryFrom<RawEnvelope<T>> for Envelope<T> {
    type Error = EnvelopeError;

    fn try_from(raw: RawEnvelope<T>) -> Result<Self, Self::Error> {
        match (raw.code == SUCCESS_CODE, raw.data.is_some()) {
            (true, false) => return Err(EnvelopeError::MissingData),
            (false, true) => return Err(EnvelopeError::UnexpectedData(raw.code)),
            _ => {}
        }
        Ok(Self {
            code: raw.code,
            message: raw.message,
            data: raw.data,
            timestamp: raw.timestamp,
        })
    }
}

impl<T> Envelope<T> {
    /// Successful reply with the default message.
    ///
    /// `data` must not serialize to `null` (`()`, `None`), otherwise
    /// [`Envelope::encode`] rejects the envelope.
    pub fn success(data: T) -> Self {
        Self::success_with_message(data, DEFAULT_SUCCESS_MESSAGE)
    }

    /// Successful reply with a custom message.
    pub fn success_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            code: SUCCESS_CODE,
            message: message.into(),
            data: Some(data),
            timestamp: now(),
        }
    }

    /// Error reply. `data` is always absent.
    ///
    /// A `code` of 200 is not an error; it is mapped to 500 so the
    /// presence invariant holds.
    pub fn error(code: u16, message: impl Into<String>) -> Self {
        let code = if code == SUCCESS_CODE {
            StatusCode::INTERNAL_SERVER_ERROR.as_u16()
        } else {
            code
        };
        Self {
            code,
            message: message.into(),
            data: None,
            timestamp: now(),
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::error(500, message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::error(400, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::error(401, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::error(403, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::error(404, message)
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }

    /// HTTP status the envelope is sent with.
    pub fn http_status(&self) -> StatusCode {
        if self.is_success() {
            return StatusCode::OK;
        }
        StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl<T: Serialize> Envelope<T> {
    /// JSON body of the envelope.
    pub fn encode(&self) -> Result<Vec<u8>, EnvelopeError> {
        let value = serde_json::to_value(self)?;
        if self.is_success() && value["data"].is_null() {
            return Err(EnvelopeError::NullPayload);
        }
        Ok(serde_json::to_vec(&value)?)
    }
}

fn now() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        let status = self.http_status();
        GatewayResponse::from_envelope(status, &self).into_response()
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        Envelope::<()>::error(status.as_u16(), self.to_string()).into_response()
    }
}

/// A fully buffered response travelling back through the filter chain.
#[derive(Debug, Clone)]
pub struct GatewayResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl GatewayResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// JSON response carrying the given envelope.
    ///
    /// Filters that short-circuit use this so their reply has the same shape
    /// as everything else leaving the gateway.
    pub fn from_envelope<T: Serialize>(status: StatusCode, envelope: &Envelope<T>) -> Self {
        let (status, body) = match envelope.encode() {
            Ok(body) => (status, body),
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize envelope");
                let fallback = Envelope::<()>::internal_error("Failed to serialize response");
                let body = fallback.encode().unwrap_or_default();
                (StatusCode::INTERNAL_SERVER_ERROR, body)
            }
        };

        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        Self::new(status, headers, body)
    }
}

impl IntoResponse for GatewayResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}
