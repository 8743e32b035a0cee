//! Upstream host allow-list.
//!
//! `scrtUrl` is caller-controlled and the relay makes an authenticated request
//! to it, so deployments can pin the reachable hosts to a set of domain
//! suffixes. An empty list leaves the relay open.

/// Decides whether a `scrtUrl` host may be contacted.
#[derive(Debug, Clone, Default)]
pub struct HostPolicy {
    suffixes: Vec<String>,
}

impl HostPolicy {
    pub fn new(suffixes: &[String]) -> Self {
        let suffixes = suffixes
            .iter()
            .map(|s| s.trim_matches('.').to_ascii_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        Self { suffixes }
    }

    /// True when no allow-list is configured.
    pub fn is_open(&self) -> bool {
        self.suffixes.is_empty()
    }

    /// A host matches a suffix when equal to it or a subdomain of it.
    pub fn permits(&self, host: &str) -> bool {
        if self.is_open() {
            return true;
        }
        let host = host.trim_end_matches('.').to_ascii_lowercase();
        self.suffixes.iter().any(|suffix| {
            host == *suffix
                || host
                    .strip_suffix(suffix.as_str())
                    .is_some_and(|head| head.ends_with('.'))
        })
    }
}
