use crate::store::{SessionBackend, SESSION_TTL_SECS};
use crate::utils::response;
use chrono::Utc;
use http::StatusCode;
use lambda_http::{Request, Response};
use serde_json::{json, Value};
use tracing::{instrument, warn};

type E = Box<dyn std::error::Error + Sync + Send + 'static>;

/// Create a session for the account named in the request, or push back the
/// expiration of the one it already has.
///
/// The request body is JSON with a required `uid` field. Responses:
/// - 200 `{sessionId, message, isNewSession}` for both the created and the
///   refreshed case,
/// - 400 when `uid` is missing or empty,
/// - 500 when the body is not JSON or the store write fails.
#[instrument(skip(store))]
pub async fn manage_session<S: SessionBackend>(
    store: &S,
    event: Request,
) -> Result<Response<String>, E> {
    let body = match parse_body(event.body()) {
        Ok(body) => body,
        Err(err) => {
            warn!("cannot parse request body: {}", err);
            return Ok(server_error(&err.to_string()));
        }
    };

    let uid = body.get("uid").and_then(Value::as_str).unwrap_or("");
    if uid.is_empty() {
        return Ok(response(
            StatusCode::BAD_REQUEST,
            json!({ "message": "Missing required fields: uid" }).to_string(),
        ));
    }

    let expiration = Utc::now().timestamp() + SESSION_TTL_SECS;

    // Lookup and refresh failures are swallowed on purpose: a store outage on
    // this path falls through to creating a fresh session instead of failing
    // the request.
    match store.refresh(uid, expiration).await {
        Ok(Some(session_id)) => return Ok(session_response(&session_id, false)),
        Ok(None) => {}
        Err(err) => warn!("error checking for existing session: {}", err),
    }

    let session_id = match store.create(uid, expiration).await {
        Ok(session_id) => session_id,
        Err(err) => return Ok(server_error(&err.to_string())),
    };

    Ok(session_response(&session_id, true))
}

fn parse_body(raw: &[u8]) -> Result<Value, serde_json::Error> {
    if raw.is_empty() {
        return Ok(json!({}));
    }
    serde_json::from_slice(raw)
}

fn session_response(session_id: &str, is_new_session: bool) -> Response<String> {
    let message = if is_new_session {
        "New session created successfully"
    } else {
        "Existing session TTL updated"
    };

    response(
        StatusCode::OK,
        json!({
            "sessionId": session_id,
            "message": message,
            "isNewSession": is_new_session,
        })
        .to_string(),
    )
}

fn server_error(details: &str) -> Response<String> {
    response(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "message": format!("Failed to manage session: {}", details) }).to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;
    use crate::store::SessionStore;
    use aws_sdk_dynamodb::{Client, Config};
    use lambda_http::Body;

    fn offline_client() -> Client {
        Client::from_conf(Config::builder().build())
    }

    struct RefreshOutage;

    impl SessionBackend for RefreshOutage {
        async fn refresh(&self, _uid: &str, _expiration: i64) -> Result<Option<String>, Error> {
            Err(Error::new("scan timed out"))
        }

        async fn create(&self, _uid: &str, _expiration: i64) -> Result<String, Error> {
            Ok("1712345678901-a1b2c3d4".to_owned())
        }
    }

    struct ExistingSession;

    impl SessionBackend for ExistingSession {
        async fn refresh(&self, _uid: &str, _expiration: i64) -> Result<Option<String>, Error> {
            Ok(Some("1700000000000-s1s1s1s1".to_owned()))
        }

        async fn create(&self, _uid: &str, _expiration: i64) -> Result<String, Error> {
            Err(Error::new("create should not be reached"))
        }
    }

    struct WriteOutage;

    impl SessionBackend for WriteOutage {
        async fn refresh(&self, _uid: &str, _expiration: i64) -> Result<Option<String>, Error> {
            Ok(None)
        }

        async fn create(&self, _uid: &str, _expiration: i64) -> Result<String, Error> {
            Err(Error::new("put timed out"))
        }
    }

    fn request(body: &str) -> Request {
        http::Request::builder()
            .method("POST")
            .body(Body::from(body))
            .unwrap()
    }

    fn body_json(response: &Response<String>) -> Value {
        serde_json::from_str(response.body()).unwrap()
    }

    #[tokio::test]
    async fn missing_uid_is_a_bad_request() {
        let client = offline_client();
        let store = SessionStore::new(&client, "Sessions".to_owned());

        let resp = manage_session(&store, request(r#"{"other": 1}"#))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(&resp),
            json!({ "message": "Missing required fields: uid" })
        );
    }

    #[tokio::test]
    async fn empty_uid_is_a_bad_request() {
        let client = offline_client();
        let store = SessionStore::new(&client, "Sessions".to_owned());

        let resp = manage_session(&store, request(r#"{"uid": ""}"#))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn empty_body_is_a_bad_request_not_a_server_error() {
        let client = offline_client();
        let store = SessionStore::new(&client, "Sessions".to_owned());

        let resp = manage_session(&store, http::Request::new(Body::Empty))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_json_is_a_server_error() {
        let client = offline_client();
        let store = SessionStore::new(&client, "Sessions".to_owned());

        let resp = manage_session(&store, request("{not json")).await.unwrap();

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let message = body_json(&resp)["message"].as_str().unwrap().to_owned();
        assert!(message.starts_with("Failed to manage session: "));
    }

    #[tokio::test]
    async fn lookup_failure_falls_through_to_creation() {
        let resp = manage_session(&RefreshOutage, request(r#"{"uid": "user123"}"#))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            body_json(&resp),
            json!({
                "sessionId": "1712345678901-a1b2c3d4",
                "message": "New session created successfully",
                "isNewSession": true,
            })
        );
    }

    #[tokio::test]
    async fn existing_session_is_refreshed_not_replaced() {
        let resp = manage_session(&ExistingSession, request(r#"{"uid": "user123"}"#))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            body_json(&resp),
            json!({
                "sessionId": "1700000000000-s1s1s1s1",
                "message": "Existing session TTL updated",
                "isNewSession": false,
            })
        );
    }

    #[tokio::test]
    async fn failed_insert_is_a_server_error() {
        let resp = manage_session(&WriteOutage, request(r#"{"uid": "user123"}"#))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(&resp),
            json!({ "message": "Failed to manage session: put timed out" })
        );
    }

    #[test]
    fn created_response_shape() {
        let resp = session_response("1712345678901-a1b2c3d4", true);

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            body_json(&resp),
            json!({
                "sessionId": "1712345678901-a1b2c3d4",
                "message": "New session created successfully",
                "isNewSession": true,
            })
        );
    }

    #[test]
    fn refreshed_response_shape() {
        let resp = session_response("1712345678901-a1b2c3d4", false);

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            body_json(&resp),
            json!({
                "sessionId": "1712345678901-a1b2c3d4",
                "message": "Existing session TTL updated",
                "isNewSession": false,
            })
        );
    }
}
