//! Inbound query parameters.

use std::fmt;

use axum::http::HeaderValue;
use serde::Deserialize;

use crate::relay::error::RelayError;

/// Resume cursor sent upstream when the client supplies none.
pub const DEFAULT_LAST_EVENT_ID: &str = "0";

/// Raw `/sse-proxy` query string. Every field is optional here; presence is
/// checked by `RelayParams::try_from`.
#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayQuery {
    pub scrt_url: Option<String>,
    pub conversation_id: Option<String>,
    pub last_event_id: Option<String>,
    pub org_id: Option<String>,
    pub access_token: Option<String>,
}

/// Opaque bearer credential. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Validated parameters for one relay session.
#[derive(Debug, Clone)]
pub struct RelayParams {
    pub scrt_url: String,
    /// Lowercased.
    pub conversation_id: String,
    pub last_event_id: String,
    pub org_id: String,
    pub access_token: AccessToken,
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl TryFrom<RelayQuery> for RelayParams {
    type Error = RelayError;

    fn try_from(query: RelayQuery) -> Result<Self, Self::Error> {
        let scrt_url = present(query.scrt_url);
        let conversation_id = present(query.conversation_id);
        let org_id = present(query.org_id);
        let access_token = present(query.access_token);

        let mut missing = Vec::new();
        if scrt_url.is_none() {
            missing.push("scrtUrl");
        }
        if conversation_id.is_none() {
            missing.push("conversationId");
        }
        if org_id.is_none() {
            missing.push("orgId");
        }
        if access_token.is_none() {
            missing.push("accessToken");
        }

        let (Some(scrt_url), Some(conversation_id), Some(org_id), Some(access_token)) =
            (scrt_url, conversation_id, org_id, access_token)
        else {
            return Err(RelayError::MissingParameters(missing));
        };

        // Both travel as upstream header values.
        for (name, value) in [("orgId", &org_id), ("accessToken", &access_token)] {
            if HeaderValue::from_str(value).is_err() {
                return Err(RelayError::InvalidParameter {
                    name,
                    reason: "contains characters not allowed in an HTTP header".to_string(),
                });
            }
        }

        Ok(Self {
            scrt_url,
            conversation_id: conversation_id.to_lowercase(),
            last_event_id: present(query.last_event_id)
                .unwrap_or_else(|| DEFAULT_LAST_EVENT_ID.to_string()),
            org_id,
            access_token: AccessToken::new(access_token),
        })
    }
}
