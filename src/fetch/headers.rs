//! Browser-like request headers and the rotating User-Agent pool.

use rand::rng;
use rand::seq::IndexedRandom;
use reqwest::header::{
    ACCEPT, ACCEPT_ENCODING, ACCEPT_LANGUAGE, CACHE_CONTROL, CONNECTION, DNT, HeaderMap,
    HeaderName, HeaderValue, UPGRADE_INSECURE_REQUESTS, USER_AGENT,
};

const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36 Edg/123.0.2420.81",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4.1 Safari/605.1.15",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14.4; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_4 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Mobile/15E148 Safari/604.1",
    "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Mobile Safari/537.36",
];

/// Source of User-Agent strings for outgoing requests.
///
/// Implementations must be callable from many workers at once without
/// synchronization, so each call is independent of the previous ones.
pub trait UserAgentSource: Send + Sync {
    fn next_user_agent(&self) -> String;
}

/// Draws a User-Agent uniformly at random from a fixed pool of desktop and
/// mobile browsers.
#[derive(Debug, Default, Clone, Copy)]
pub struct RotatingUserAgents;

impl UserAgentSource for RotatingUserAgents {
    fn next_user_agent(&self) -> String {
        USER_AGENTS
            .choose(&mut rng())
            .copied()
            .unwrap_or(USER_AGENTS[0])
            .to_string()
    }
}

/// Draw a User-Agent that differs from `previous`.
///
/// Gives up after a few draws so a degenerate source cannot stall a worker.
pub fn fresh_user_agent(source: &dyn UserAgentSource, previous: &str) -> String {
    let mut candidate = source.next_user_agent();
    for _ in 0..8 {
        if candidate != previous {
            break;
        }
        candidate = source.next_user_agent();
    }
    candidate
}

/// The full header set sent with every attempt.
pub fn browser_headers(user_agent: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    let ua = HeaderValue::from_str(user_agent)
        .unwrap_or_else(|_| HeaderValue::from_static(USER_AGENTS[0]));
    headers.insert(USER_AGENT, ua);
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
    headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip, deflate, br"));
    headers.insert(DNT, HeaderValue::from_static("1"));
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    headers.insert(
        HeaderName::from_static("sec-fetch-dest"),
        HeaderValue::from_static("document"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-mode"),
        HeaderValue::from_static("navigate"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-site"),
        HeaderValue::from_static("none"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-user"),
        HeaderValue::from_static("?1"),
    );
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Stuck;

    impl UserAgentSource for Stuck {
        fn next_user_agent(&self) -> String {
            "same".to_string()
        }
    }

    struct Cycling(AtomicUsize);

    impl UserAgentSource for Cycling {
        fn next_user_agent(&self) -> String {
            format!("agent-{}", self.0.fetch_add(1, Ordering::SeqCst) % 2)
        }
    }

    #[test]
    fn test_rotating_agents_come_from_pool() {
        let source = RotatingUserAgents;
        for _ in 0..20 {
            let ua = source.next_user_agent();
            assert!(USER_AGENTS.contains(&ua.as_str()));
        }
    }

    #[test]
    fn test_fresh_user_agent_differs() {
        let source = Cycling(AtomicUsize::new(0));
        assert_eq!(fresh_user_agent(&source, "agent-0"), "agent-1");
    }

    #[test]
    fn test_fresh_user_agent_gives_up_on_degenerate_source() {
        assert_eq!(fresh_user_agent(&Stuck, "same"), "same");
    }

    #[test]
    fn test_browser_headers_are_complete() {
        let headers = browser_headers("test-agent");
        assert_eq!(headers.get(USER_AGENT).unwrap(), "test-agent");
        assert_eq!(headers.get(DNT).unwrap(), "1");
        assert_eq!(headers.get("sec-fetch-mode").unwrap(), "navigate");
        assert_eq!(headers.get(ACCEPT_LANGUAGE).unwrap(), "en-US,en;q=0.5");
        assert!(headers.contains_key(ACCEPT));
        assert!(headers.contains_key(ACCEPT_ENCODING));
    }

    #[test]
    fn test_invalid_user_agent_falls_back() {
        let headers = browser_headers("bad\nagent");
        assert_eq!(headers.get(USER_AGENT).unwrap(), USER_AGENTS[0]);
    }
}
