// Scope filtering for crawl candidates.
//
// Directory mode pins the crawl to one host and collects paths below it.
// Subdomain mode roams every host whose name contains the target's root
// domain, collecting the hosts themselves. The subdomain match is a plain
// substring test over the host, so lookalike registrations such as
// `example.com.evil.net` are treated as in scope on purpose: a recon run
// wants to surface those, not hide them.

use crate::error::Result;
use regex::Regex;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlMode {
    /// Stay on the target host, enumerate paths.
    Directory,
    /// Roam sibling hosts of the target's root domain.
    Subdomain,
}

pub struct ScopeSpec {
    target: String,
    scheme: String,
    mode: CrawlMode,
    pattern: Regex,
}

impl ScopeSpec {
    pub fn new(target: &str, scheme: &str, mode: CrawlMode) -> Result<Self> {
        let pattern = match mode {
            CrawlMode::Directory => Regex::new(&format!(
                r"^(http://|https://|ftp://)(www\.)?{}(/.*)?$",
                regex::escape(target)
            ))?,
            CrawlMode::Subdomain => {
                let root = root_domain(strip_port(target));
                Regex::new(&format!(
                    r"([-a-z0-9.]*){}([-a-z0-9.]*)",
                    regex::escape(&root)
                ))?
            }
        };
        Ok(Self {
            target: target.to_string(),
            scheme: scheme.to_string(),
            mode,
            pattern,
        })
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn mode(&self) -> CrawlMode {
        self.mode
    }

    /// The URL the crawl starts from.
    pub fn seed_url(&self) -> String {
        format!("{}://{}", self.scheme, self.target)
    }

    /// Whether a discovered URL belongs to this crawl.
    pub fn in_scope(&self, url: &str) -> bool {
        match self.mode {
            CrawlMode::Directory => self.pattern.is_match(url),
            CrawlMode::Subdomain => match host_of(url) {
                Some(host) => self.pattern.is_match(&host),
                None => false,
            },
        }
    }

    /// The registry key an in-scope URL registers under: the URL itself in
    /// directory mode, its host in subdomain mode.
    pub fn asset_key(&self, url: &str) -> Option<String> {
        match self.mode {
            CrawlMode::Directory => Some(url.to_string()),
            CrawlMode::Subdomain => host_of(url),
        }
    }
}

/// Host component of a URL, keeping any explicit port.
pub fn host_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    Some(match parsed.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

/// Last two labels of a host, the registrable root for scoping purposes.
pub fn root_domain(host: &str) -> String {
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() <= 2 {
        host.to_string()
    } else {
        labels[labels.len() - 2..].join(".")
    }
}

fn strip_port(target: &str) -> &str {
    match target.rsplit_once(':') {
        Some((host, port)) if port.chars().all(|c| c.is_ascii_digit()) => host,
        _ => target,
    }
}
