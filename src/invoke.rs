//! # Synchronous invocation of other Lambda functions.
//!
//! Thin wrapper over the Lambda `Invoke` API plus two delegates built on top
//! of it: event parsing and authorization. Remote functions answer with an
//! `{statusCode, body}` envelope where `body` is a JSON string.

use std::env;

use aws_sdk_lambda::model::InvocationType;
use aws_sdk_lambda::Client;
use aws_smithy_types::Blob;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info, instrument};

use crate::errors::{AuthorizationError, InvocationError};

pub type E = Box<dyn std::error::Error + Sync + Send + 'static>;

lazy_static! {
    static ref PARSE_EVENT_FUNCTION: String =
        env::var("PARSE_EVENT_FUNCTION").unwrap_or_else(|_| "ParseEvent".to_owned());
    static ref AUTHORIZE_FUNCTION: String =
        env::var("AUTHORIZE_FUNCTION").unwrap_or_else(|_| "Authorize".to_owned());
}

const UNAUTHORIZED_MESSAGE: &str = "ACS: Unauthorized";

/// The `{statusCode, body}` shape returned by remote functions.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ResponseEnvelope {
    #[serde(rename = "statusCode")]
    pub status_code: Option<u16>,
    pub body: Option<String>,
}

pub struct FunctionInvoker<'a> {
    client: &'a Client,
}

impl<'a> FunctionInvoker<'a> {
    pub fn new(client: &'a Client) -> FunctionInvoker<'a> {
        FunctionInvoker { client }
    }

    /// Invokes another Lambda function and returns its entire decoded
    /// response payload. The caller is responsible for interpreting the
    /// response. An empty response payload decodes to `{}`.
    #[instrument(skip(self, payload))]
    pub async fn invoke(
        &self,
        function_name: &str,
        payload: &Value,
        invocation_type: InvocationType,
    ) -> Result<Value, InvocationError> {
        info!(
            "invoking {} with type {}",
            function_name,
            invocation_type.as_str()
        );

        let request = serde_json::to_vec(payload).map_err(|err| {
            error!("failed to serialize payload for {}: {}", function_name, err);
            InvocationError::new(500, "An unexpected error occurred during Lambda invocation.")
        })?;

        let output = self
            .client
            .invoke()
            .function_name(function_name)
            .invocation_type(invocation_type)
            .payload(Blob::new(request))
            .send()
            .await
            .map_err(|err| {
                error!("error invoking {}: {}", function_name, err);
                InvocationError::new(
                    500,
                    format!("Failed to invoke {} due to a client error.", function_name),
                )
            })?;

        decode_payload(function_name, output.payload())
    }

    /// Parse a raw inbound event by delegating to the ParseEvent function.
    /// Returns the JSON-decoded inner body of its response.
    #[instrument(skip(self, event))]
    pub async fn parse_event(&self, event: &Value) -> Result<Value, InvocationError> {
        let response = self
            .invoke(&PARSE_EVENT_FUNCTION, event, InvocationType::RequestResponse)
            .await?;

        let envelope: ResponseEnvelope = serde_json::from_value(response).map_err(|err| {
            error!(
                "malformed response envelope from {}: {}",
                &*PARSE_EVENT_FUNCTION, err
            );
            InvocationError::new(500, "Failed to parse event.")
        })?;

        unwrap_parsed_event(&envelope)
    }

    /// Authorize a user by delegating to the Authorize function. Returns the
    /// decoded decision body on success.
    #[instrument(skip(self))]
    pub async fn authorize(&self, user_id: &str, session_id: &str) -> Result<Value, E> {
        let payload = json!({ "user_id": user_id, "session_id": session_id });
        let response = self
            .invoke(&AUTHORIZE_FUNCTION, &payload, InvocationType::RequestResponse)
            .await?;

        let envelope: ResponseEnvelope = serde_json::from_value(response).map_err(|err| {
            error!(
                "malformed response envelope from {}: {}",
                &*AUTHORIZE_FUNCTION, err
            );
            AuthorizationError::new(401, UNAUTHORIZED_MESSAGE)
        })?;

        Ok(check_authorization(&envelope)?)
    }
}

/// Decode a response payload from the named function. An absent or empty
/// payload decodes to `{}`; anything else must be JSON.
fn decode_payload(function_name: &str, payload: Option<&Blob>) -> Result<Value, InvocationError> {
    match payload {
        Some(blob) if !blob.as_ref().is_empty() => {
            serde_json::from_slice(blob.as_ref()).map_err(|err| {
                error!("failed to parse JSON response from {}: {}", function_name, err);
                InvocationError::new(
                    500,
                    format!("Invalid JSON response from {}.", function_name),
                )
            })
        }
        _ => Ok(json!({})),
    }
}

/// Unwrap a ParseEvent response envelope: a 200 status exposes the decoded
/// inner body (absent body decodes to `{}`), anything else carries the
/// remote's reported status, or 500 when it reported none.
pub fn unwrap_parsed_event(envelope: &ResponseEnvelope) -> Result<Value, InvocationError> {
    if envelope.status_code != Some(200) {
        return Err(InvocationError::new(
            envelope.status_code.unwrap_or(500),
            "Failed to parse event.",
        ));
    }

    match envelope.body.as_deref() {
        Some(raw) => serde_json::from_str(raw)
            .map_err(|_| InvocationError::new(500, "Failed to parse event.")),
        None => Ok(json!({})),
    }
}

/// Check an Authorize response envelope: the caller is authorized only when
/// the status is 200 and the decoded body's `authorized` field is truthy.
/// Denials carry the envelope's status (401 when absent) and the body's
/// `message` (a default otherwise).
pub fn check_authorization(envelope: &ResponseEnvelope) -> Result<Value, AuthorizationError> {
    let body: Value = envelope
        .body
        .as_deref()
        .and_then(|raw| serde_json::from_str(raw).ok())
        .unwrap_or_else(|| json!({}));

    let authorized = body.get("authorized").map(is_truthy).unwrap_or(false);
    if envelope.status_code != Some(200) || !authorized {
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or(UNAUTHORIZED_MESSAGE)
            .to_owned();

        return Err(AuthorizationError::new(
            envelope.status_code.unwrap_or(401),
            message,
        ));
    }

    Ok(body)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
