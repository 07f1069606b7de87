//! Inbound event payloads and their resolution into requests
//!
//! A [`Payload`] arrives on the event queue. It is turned into a [`Request`]
//! one of two ways, chosen by [`Resolution::for_payload`]:
//!
//! - **Local**: the payload already carries a category id, so the request is
//!   built from its fields without any network call.
//! - **Remote**: the category id is missing, so the request is fetched from
//!   the [`RequestAuthority`] (`GET /requests/{id}`) and decoded from the
//!   `{"Results": {...}}` envelope.
//!
//! A remote failure (connect, status, read or decode) is returned unchanged.
//! There is no retry and no fallback to local construction once the remote
//! path has been chosen.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::Result;
use crate::traits::RequestAuthority;

/// Event payload as received from the queue
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub cat_id: String,
    /// Account the event belongs to; carried on the wire, never stored
    #[serde(rename = "email", default)]
    pub account_id: String,
    #[serde(rename = "cattype", default)]
    pub cat_type: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Actionable request derived from a payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub cat_id: String,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body returned by the request authority
#[derive(Debug, Clone, Deserialize)]
pub struct ApiRequests {
    #[serde(rename = "Results")]
    pub results: Request,
}

impl Payload {
    /// Decode a payload from queue bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| {
            error!("Failed to parse the payload message: {}", e);
            e.into()
        })
    }

    /// Fill the identifying fields and serialize for publishing
    pub fn as_bytes(
        &mut self,
        id: impl Into<String>,
        cat_id: impl Into<String>,
        action: impl Into<String>,
        category: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Vec<u8>> {
        self.id = id.into();
        self.cat_id = cat_id.into();
        self.action = action.into();
        self.category = category.into();
        self.created_at = Some(created_at);

        Ok(serde_json::to_vec(self)?)
    }

    /// Build the request directly from this payload
    pub fn to_local_request(&self) -> Request {
        Request {
            id: self.id.clone(),
            cat_id: self.cat_id.clone(),
            action: self.action.clone(),
            category: self.category.clone(),
            created_at: self.created_at,
        }
    }
}

impl Request {
    /// Decode a request from an authority response body
    pub fn from_envelope(body: &[u8]) -> Result<Self> {
        let envelope: ApiRequests = serde_json::from_slice(body)?;
        Ok(envelope.results)
    }
}

/// Which path resolves a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Build from payload fields
    Local,
    /// Fetch from the request authority
    Remote,
}

impl Resolution {
    /// `Local` iff the payload carries a category id
    pub fn for_payload(p: &Payload) -> Self {
        if p.cat_id.is_empty() {
            Self::Remote
        } else {
            Self::Local
        }
    }
}

/// Resolves payloads to requests
#[derive(Clone)]
pub struct PayloadResolver {
    authority: Arc<dyn RequestAuthority>,
}

impl std::fmt::Debug for PayloadResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayloadResolver")
            .field("authority", &self.authority.authority_name())
            .finish()
    }
}

impl PayloadResolver {
    pub fn new(authority: Arc<dyn RequestAuthority>) -> Self {
        Self { authority }
    }

    /// Resolve a payload to its request
    pub async fn resolve(&self, p: &Payload) -> Result<Request> {
        debug!("get requests {}", p.id);

        let request = match Resolution::for_payload(p) {
            Resolution::Local => p.to_local_request(),
            Resolution::Remote => self.fetch_remote(&p.id).await?,
        };

        debug!("Requests {:?}", request);
        Ok(request)
    }

    async fn fetch_remote(&self, id: &str) -> Result<Request> {
        let body = self.authority.fetch_request(id).await?;
        Request::from_envelope(&body)
    }
}
