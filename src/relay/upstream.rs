//! Upstream event endpoint client.
//!
//! # Responsibilities
//! - Derive the upstream URL from `scrtUrl` and the session parameters
//! - Enforce the host allow-list before any network activity
//! - Issue exactly one GET per session; no retries, no redirects
//! - Classify failures: transport (500) vs. upstream rejection (status + body)

use axum::http::header::ACCEPT;
use reqwest::redirect::Policy;
use url::Url;

use crate::config::UpstreamConfig;
use crate::relay::error::RelayError;
use crate::relay::params::RelayParams;
use crate::security::HostPolicy;

pub const X_ORG_ID: &str = "X-Org-Id";

/// Shared handle for reaching upstream SSE endpoints.
///
/// Idle connections are not pooled: every session opens and owns its own
/// upstream connection.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    scheme: String,
    path: String,
    policy: HostPolicy,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder()
            .pool_max_idle_per_host(0)
            .redirect(Policy::none());
        if let Some(timeout) = config.connect_timeout() {
            builder = builder.connect_timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self {
            http,
            scheme: config.scheme.clone(),
            path: config.path.clone(),
            policy: HostPolicy::new(&config.allowed_host_suffixes),
        })
    }

    pub fn policy(&self) -> &HostPolicy {
        &self.policy
    }

    /// `<scheme>://<scrtUrl><path>?conversationId=..&lastEventId=..`
    pub fn target_url(&self, params: &RelayParams) -> Result<Url, RelayError> {
        let invalid = |reason: String| RelayError::InvalidParameter {
            name: "scrtUrl",
            reason,
        };

        let mut url = Url::parse(&format!("{}://{}", self.scheme, params.scrt_url))
            .map_err(|e| invalid(e.to_string()))?;

        // Only a bare authority is accepted.
        if !url.username().is_empty()
            || url.password().is_some()
            || url.path() != "/"
            || url.query().is_some()
            || url.fragment().is_some()
        {
            return Err(invalid("expected a host with optional port".to_string()));
        }

        let host = url
            .host_str()
            .ok_or_else(|| invalid("missing host".to_string()))?;
        if !self.policy.permits(host) {
            return Err(RelayError::HostNotAllowed(host.to_string()));
        }

        url.set_path(&self.path);
        url.query_pairs_mut()
            .append_pair("conversationId", &params.conversation_id)
            .append_pair("lastEventId", &params.last_event_id);
        Ok(url)
    }

    /// Open the upstream stream.
    ///
    /// A non-success status has its body read fully and returned as
    /// `UpstreamRejected`; nothing has been sent to the client yet.
    pub async fn connect(&self, params: &RelayParams) -> Result<reqwest::Response, RelayError> {
        let url = self.target_url(params)?;
        tracing::debug!(url = %url, "Connecting to upstream");

        let response = self
            .http
            .get(url)
            .header(ACCEPT, "text/event-stream")
            .bearer_auth(params.access_token.expose())
            .header(X_ORG_ID, &params.org_id)
            .send()
            .await
            .map_err(RelayError::transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.map_err(RelayError::transport)?;
            return Err(RelayError::UpstreamRejected { status, body });
        }

        tracing::info!(status = %status, "Upstream stream established");
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::params::{AccessToken, RelayParams};

    fn params(scrt_url: &str) -> RelayParams {
        RelayParams {
            scrt_url: scrt_url.to_string(),
            conversation_id: "abc-123".to_string(),
            last_event_id: "0".to_string(),
            org_id: "00D000000000001".to_string(),
            access_token: AccessToken::new("token"),
        }
    }

    fn client(suffixes: &[&str]) -> UpstreamClient {
        let config = UpstreamConfig {
            allowed_host_suffixes: suffixes.iter().map(|s| s.to_string()).collect(),
            ..UpstreamConfig::default()
        };
        UpstreamClient::new(&config).unwrap()
    }

    #[test]
    fn builds_event_router_url() {
        let url = client(&[])
            .target_url(&params("acme.my.salesforce-scrt.com"))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://acme.my.salesforce-scrt.com/eventrouter/v1/sse?conversationId=abc-123&lastEventId=0"
        );
    }

    #[test]
    fn unbounded_connect_still_builds() {
        let config = UpstreamConfig {
            connect_timeout_secs: 0,
            ..UpstreamConfig::default()
        };
        let client = UpstreamClient::new(&config).unwrap();
        assert!(client.target_url(&params("acme.example.com")).is_ok());
    }

    #[test]
    fn keeps_explicit_port() {
        let url = client(&[]).target_url(&params("127.0.0.1:8443")).unwrap();
        assert_eq!(url.port(), Some(8443));
        assert_eq!(url.path(), "/eventrouter/v1/sse");
    }

    #[test]
    fn cursor_is_query_encoded() {
        let mut p = params("acme.example.com");
        p.last_event_id = "a b&c".to_string();
        let url = client(&[]).target_url(&p).unwrap();
        assert_eq!(url.query(), Some("conversationId=abc-123&lastEventId=a+b%26c"));
    }

    #[test]
    fn rejects_anything_but_an_authority() {
        let c = client(&[]);
        for bad in [
            "acme.example.com/other/path",
            "user:pw@acme.example.com",
            "acme.example.com?x=1",
            "acme.example.com#frag",
            "",
        ] {
            assert!(
                matches!(
                    c.target_url(&params(bad)),
                    Err(RelayError::InvalidParameter { name: "scrtUrl", .. })
                ),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn allow_list_blocks_foreign_hosts() {
        let c = client(&["salesforce-scrt.com"]);
        assert!(c.target_url(&params("acme.my.salesforce-scrt.com")).is_ok());
        match c.target_url(&params("169.254.169.254")) {
            Err(RelayError::HostNotAllowed(host)) => assert_eq!(host, "169.254.169.254"),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
