// User agent selection for outbound requests.

use rand::seq::SliceRandom;

static USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:127.0) Gecko/20100101 Firefox/127.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.5 Safari/605.1.15",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/125.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:126.0) Gecko/20100101 Firefox/126.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36 Edg/126.0.0.0",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_5 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.5 Mobile/15E148 Safari/604.1",
];

/// How the crawler identifies itself to targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAgentPolicy {
    /// A caller-supplied string, used for the whole session.
    Fixed(String),
    /// One random browser agent, chosen at client build time.
    RandomOnce,
    /// A fresh random browser agent on every request.
    PerRequest,
}

impl UserAgentPolicy {
    pub fn from_flags(user_agent: Option<&str>, randomize_each: bool) -> Self {
        if randomize_each {
            UserAgentPolicy::PerRequest
        } else if let Some(agent) = user_agent {
            UserAgentPolicy::Fixed(agent.to_string())
        } else {
            UserAgentPolicy::RandomOnce
        }
    }

    /// The agent string baked into the HTTP client at build time.
    pub fn session_agent(&self) -> String {
        match self {
            UserAgentPolicy::Fixed(agent) => agent.clone(),
            UserAgentPolicy::RandomOnce | UserAgentPolicy::PerRequest => random_agent().to_string(),
        }
    }

    pub fn randomize_per_request(&self) -> bool {
        matches!(self, UserAgentPolicy::PerRequest)
    }
}

pub fn random_agent() -> &'static str {
    USER_AGENTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(USER_AGENTS[0])
}
