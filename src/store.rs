use std::collections::HashMap;

use aws_sdk_dynamodb::model::AttributeValue;
use aws_sdk_dynamodb::Client;
use chrono::{DateTime, Utc};
use tracing::instrument;
use uuid::Uuid;

use crate::errors::Error;
use crate::ext::AttributeValuesExt;

/// Sessions live for 30 days from their last refresh.
pub const SESSION_TTL_SECS: i64 = 30 * 24 * 3600;

/// A session record as persisted in the sessions table.
///
/// `session_id` is the partition key; `expiration` doubles as the table's
/// TTL attribute, so stale records are reaped by DynamoDB itself.
#[derive(Debug, Clone)]
pub struct Session {
    pub session_id: String,
    pub created_at: DateTime<Utc>,
    pub expiration: i64,
    pub associated_account: String,
}

/// Generate a session identifier: millisecond timestamp plus an 8 character
/// random suffix. Uniqueness is probabilistic, not guaranteed.
pub fn generate_session_id() -> String {
    let timestamp = Utc::now().timestamp_millis();
    let random = Uuid::new_v4().simple().to_string();
    format!("{}-{}", timestamp, &random[..8])
}

fn session_from_item(item: &HashMap<String, AttributeValue>) -> Result<Session, Error> {
    Ok(Session {
        session_id: item
            .get_s("session_id")
            .ok_or_else(|| Error::new("session record is missing session_id"))?,
        created_at: item
            .get_dt("created_at")
            .ok_or_else(|| Error::new("session record is missing created_at"))?,
        expiration: item
            .get_n("expiration")
            .ok_or_else(|| Error::new("session record is missing expiration"))?,
        associated_account: item
            .get_s("associated_account")
            .ok_or_else(|| Error::new("session record is missing associated_account"))?,
    })
}

/// Storage seam for the session handler. `SessionStore` is the DynamoDB
/// implementation; tests substitute their own.
pub trait SessionBackend {
    async fn refresh(&self, uid: &str, expiration: i64) -> Result<Option<String>, Error>;
    async fn create(&self, uid: &str, expiration: i64) -> Result<String, Error>;
}

pub struct SessionStore<'a> {
    client: &'a Client,
    table_name: String,
}

impl SessionBackend for SessionStore<'_> {
    async fn refresh(&self, uid: &str, expiration: i64) -> Result<Option<String>, Error> {
        SessionStore::refresh(self, uid, expiration).await
    }

    async fn create(&self, uid: &str, expiration: i64) -> Result<String, Error> {
        SessionStore::create(self, uid, expiration).await
    }
}

impl<'a> SessionStore<'a> {
    pub fn new(client: &'a Client, table_name: String) -> SessionStore<'a> {
        SessionStore { client, table_name }
    }

    /// Find the session associated with an account, if any.
    ///
    /// This is a scan with a filter, limited to the first match. There is no
    /// index on `associated_account`, and at most one session is expected per
    /// account.
    #[instrument(skip(self))]
    pub async fn find_by_account(&self, uid: &str) -> Result<Option<Session>, Error> {
        let output = self
            .client
            .scan()
            .table_name(&self.table_name)
            .filter_expression("associated_account = :uid")
            .expression_attribute_values(":uid", AttributeValue::S(uid.to_owned()))
            .limit(1)
            .send()
            .await?;

        match output.items().and_then(|items| items.first()) {
            Some(item) => Ok(Some(session_from_item(item)?)),
            None => Ok(None),
        }
    }

    /// Push back the expiration of an existing session. All other attributes
    /// are left untouched.
    #[instrument(skip(self))]
    pub async fn extend(&self, session_id: &str, expiration: i64) -> Result<(), Error> {
        self.client
            .update_item()
            .table_name(&self.table_name)
            .key("session_id", AttributeValue::S(session_id.to_owned()))
            .update_expression("SET expiration = :ttl")
            .expression_attribute_values(":ttl", AttributeValue::N(expiration.to_string()))
            .send()
            .await?;

        Ok(())
    }

    /// Refresh the account's existing session, returning its id, or `None`
    /// when the account has no session yet.
    #[instrument(skip(self))]
    pub async fn refresh(&self, uid: &str, expiration: i64) -> Result<Option<String>, Error> {
        let session = match self.find_by_account(uid).await? {
            Some(session) => session,
            None => return Ok(None),
        };

        self.extend(&session.session_id, expiration).await?;

        Ok(Some(session.session_id))
    }

    /// Insert a fresh session record for the account and return its id.
    #[instrument(skip(self))]
    pub async fn create(&self, uid: &str, expiration: i64) -> Result<String, Error> {
        let session_id = generate_session_id();

        self.client
            .put_item()
            .table_name(&self.table_name)
            .item("session_id", AttributeValue::S(session_id.clone()))
            .item("created_at", AttributeValue::S(Utc::now().to_rfc3339()))
            .item("expiration", AttributeValue::N(expiration.to_string()))
            .item("associated_account", AttributeValue::S(uid.to_owned()))
            .send()
            .await?;

        Ok(session_id)
    }
}
