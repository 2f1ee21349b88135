//! Realistic browser User-Agent strings.
//!
//! The direct tier presents a different User-Agent on every attempt so a block
//! keyed on one browser signature does not repeat identically. The rotation is
//! deterministic: attempt `n` always uses the same string, which keeps runs
//! reproducible.

/// Chrome major version used in the Chrome-based strings.
const CHROME_VERSION: &str = "131.0.0.0";

/// Desktop browser signatures in rotation order.
static USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{chrome} Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/18.1 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{chrome} Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{chrome} Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{chrome} Safari/537.36 Edg/131.0.0.0",
];

/// Returns the User-Agent for the given zero-based attempt.
///
/// Consecutive attempts never share a string as long as fewer attempts are
/// made than there are entries in the rotation.
pub fn user_agent_for_attempt(attempt: usize) -> String {
    USER_AGENTS[attempt % USER_AGENTS.len()].replace("{chrome}", CHROME_VERSION)
}

/// The User-Agent used when no rotation applies (crawl, probes, rendering).
pub fn default_user_agent() -> String {
    user_agent_for_attempt(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attempts_use_distinct_agents() {
        let agents: Vec<String> = (0..3).map(user_agent_for_attempt).collect();
        assert_ne!(agents[0], agents[1]);
        assert_ne!(agents[1], agents[2]);
        assert_ne!(agents[0], agents[2]);
    }

    #[test]
    fn test_agents_look_like_browsers() {
        for attempt in 0..USER_AGENTS.len() {
            let agent = user_agent_for_attempt(attempt);
            assert!(agent.starts_with("Mozilla/5.0 ("), "{agent}");
            assert!(!agent.contains('{'), "unexpanded placeholder in {agent}");
        }
    }

    #[test]
    fn test_rotation_wraps() {
        assert_eq!(
            user_agent_for_attempt(0),
            user_agent_for_attempt(USER_AGENTS.len())
        );
        assert_eq!(default_user_agent(), user_agent_for_attempt(0));
    }
}
