use serde::Deserialize;
use thiserror::Error;

pub mod normalize;

#[derive(Debug, Error)]
pub enum GmailError {
    #[error("gmail request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("gmail api error ({status}): {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// One page of `users/me/messages`. `messages` is absent (not empty) when
/// the mailbox has nothing matching the query.
#[derive(Debug, Deserialize)]
pub struct MessageList {
    #[serde(default)]
    pub messages: Option<Vec<MessageRef>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageRef {
    pub id: String,
    #[serde(rename = "threadId", default)]
    pub thread_id: String,
}

/// Full message as returned by `users/me/messages/{id}`. Kept as a wire
/// type; only the normalizer converts it into an `Email` record.
#[derive(Debug, Deserialize)]
pub struct Message {
    pub id: String,
    #[serde(rename = "threadId", default)]
    pub thread_id: String,
    #[serde(rename = "labelIds", default)]
    pub label_ids: Vec<String>,
    /// Epoch milliseconds as a decimal string.
    #[serde(rename = "internalDate", default)]
    pub internal_date: Option<String>,
    pub payload: MessagePayload,
}

#[derive(Debug, Default, Deserialize)]
pub struct MessagePayload {
    #[serde(rename = "mimeType", default)]
    pub mime_type: String,
    #[serde(default)]
    pub headers: Vec<Header>,
    #[serde(default)]
    pub body: Option<MessageBody>,
    #[serde(default)]
    pub parts: Option<Vec<MessagePart>>,
}

#[derive(Debug, Deserialize)]
pub struct Header {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct MessageBody {
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub size: i64,
}

#[derive(Debug, Deserialize)]
pub struct MessagePart {
    #[serde(rename = "mimeType", default)]
    pub mime_type: String,
    #[serde(default)]
    pub body: Option<MessageBody>,
}

/// Thin client over the Gmail REST API. The base URL is configurable so
/// tests can run against a local stub.
#[derive(Clone)]
pub struct GmailClient {
    http: reqwest::Client,
    api_base: String,
}

impl GmailClient {
    pub fn new(http: reqwest::Client, api_base: impl Into<String>) -> Self {
        Self {
            http,
            api_base: api_base.into(),
        }
    }

    /// List INBOX message ids, one page, capped at `max_results`.
    pub async fn list_inbox(
        &self,
        access_token: &str,
        max_results: u32,
    ) -> Result<Vec<MessageRef>, GmailError> {
        let url = format!(
            "{}/users/me/messages?labelIds=INBOX&maxResults={}",
            self.api_base, max_results
        );
        let resp = self.http.get(&url).bearer_auth(access_token).send().await?;
        let list: MessageList = check(resp).await?.json().await?;
        Ok(list.messages.unwrap_or_default())
    }

    pub async fn get_message(
        &self,
        access_token: &str,
        message_id: &str,
    ) -> Result<Message, GmailError> {
        let url = format!("{}/users/me/messages/{}", self.api_base, message_id);
        let resp = self.http.get(&url).bearer_auth(access_token).send().await?;
        Ok(check(resp).await?.json().await?)
    }
}

async fn check(resp: reqwest::Response) -> Result<reqwest::Response, GmailError> {
    let status = resp.status();
    if status.is_success() {
        Ok(resp)
    } else {
        let body = resp.text().await.unwrap_or_default();
        Err(GmailError::Api { status, body })
    }
}
