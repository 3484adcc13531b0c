//! Shared WebSocket adapter state.

use std::sync::Arc;

use tracing::warn;
use url::{Origin, Url};

use crate::domain::ports::ToastFeed;

/// Dependency bundle for the `/ws` entry point and its sessions.
#[derive(Clone)]
pub struct WsState {
    pub toasts: Arc<dyn ToastFeed>,
    allowed_origins: Arc<[Origin]>,
}

impl WsState {
    /// Build state from the toast feed and the configured origin allow-list.
    ///
    /// Entries that do not parse as URLs are skipped with a warning.
    pub fn new<I, S>(toasts: Arc<dyn ToastFeed>, allowed_origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed_origins = allowed_origins
            .into_iter()
            .filter_map(|raw| match Url::parse(raw.as_ref()) {
                Ok(url) => Some(url.origin()),
                Err(error) => {
                    warn!(origin = raw.as_ref(), error = %error, "ignoring invalid WebSocket origin");
                    None
                }
            })
            .filter(Origin::is_tuple)
            .collect();
        Self {
            toasts,
            allowed_origins,
        }
    }

    /// Whether `origin` matches one of the configured origins exactly.
    pub fn allows(&self, origin: &Url) -> bool {
        let origin = origin.origin();
        self.allowed_origins.iter().any(|allowed| *allowed == origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockToastFeed;
    use rstest::rstest;

    fn state() -> WsState {
        WsState::new(
            Arc::new(MockToastFeed::new()),
            [
                "https://alumni.example",
                "http://localhost:3000",
                "not a url",
            ],
        )
    }

    #[rstest]
    #[case("https://alumni.example", true)]
    #[case("https://alumni.example/", true)]
    #[case("https://alumni.example:443", true)]
    #[case("http://localhost:3000", true)]
    #[case("http://localhost:4000", false)]
    #[case("http://alumni.example", false)]
    #[case("https://chat.alumni.example", false)]
    #[case("https://alumni.example.evil.com", false)]
    fn matches_scheme_host_and_port(#[case] origin: &str, #[case] expected: bool) {
        let parsed = Url::parse(origin).expect("url should parse");
        assert_eq!(state().allows(&parsed), expected);
    }

    #[test]
    fn empty_allow_list_rejects_everything() {
        let state = WsState::new(Arc::new(MockToastFeed::new()), Vec::<String>::new());
        let parsed = Url::parse("http://localhost:3000").expect("url should parse");
        assert!(!state.allows(&parsed));
    }
}
