// Recursive crawl engine.
//
// A fixed pool of workers shares the discovery frontier through per-worker
// queues, handing new URLs out round-robin. Each fetched page is probed,
// classified against the ignore list, registered, and mined for further
// candidates in a single pass. The crawl ends when every scheduled URL has
// been fully processed, or immediately once any worker hits a fatal
// reporting error.

use crate::agent::UserAgentPolicy;
use crate::error::{Result, ScanError};
use crate::registry::{Asset, AssetRegistry};
use crate::scope::ScopeSpec;
use reqwest::Client;
use scraper::{Html, Selector};
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error, info};
use url::Url;

/// Callback invoked for every newly registered asset, exactly once per
/// asset. Errors abort the crawl.
pub type SinkCallback = Arc<dyn Fn(&Asset) -> Result<()> + Send + Sync>;

pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Shared HTTP client used by the crawler and the batch probers.
pub fn build_probe_client(agent: &UserAgentPolicy, timeout_secs: u64) -> Result<Client> {
    let client = Client::builder()
        .user_agent(agent.session_agent())
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs((timeout_secs / 2).max(1)))
        .redirect(reqwest::redirect::Policy::limited(5))
        .pool_max_idle_per_host(50)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .cookie_store(true)
        .build()?;
    Ok(client)
}

pub struct Crawler {
    client: Client,
    scope: Arc<ScopeSpec>,
    registry: Arc<AssetRegistry>,
    ignore: Arc<HashSet<u16>>,
    per_request_agent: bool,
    sink: Option<SinkCallback>,
}

impl Crawler {
    pub fn new(
        scope: ScopeSpec,
        registry: Arc<AssetRegistry>,
        agent: UserAgentPolicy,
    ) -> Result<Self> {
        let client = build_probe_client(&agent, REQUEST_TIMEOUT_SECS)?;
        Ok(Self {
            client,
            scope: Arc::new(scope),
            registry,
            ignore: Arc::new(HashSet::new()),
            per_request_agent: agent.randomize_per_request(),
            sink: None,
        })
    }

    /// Status codes that are crawled through but never registered or
    /// reported. An empty set disables classification entirely.
    pub fn with_ignore(mut self, ignore: HashSet<u16>) -> Self {
        self.ignore = Arc::new(ignore);
        self
    }

    pub fn with_sink(mut self, sink: SinkCallback) -> Self {
        self.sink = Some(sink);
        self
    }

    pub async fn crawl(&self, workers: usize) -> Result<()> {
        let workers = workers.max(1);
        let seed = normalize_url(&self.scope.seed_url())?;

        let worker_queues: Arc<Vec<Mutex<VecDeque<String>>>> =
            Arc::new((0..workers).map(|_| Mutex::new(VecDeque::new())).collect());
        let visited = Arc::new(Mutex::new(HashSet::new()));
        // Every queued URL bumps `scheduled`; every fully handled URL bumps
        // `completed`. Children are scheduled before their parent counts as
        // complete, so equality means the frontier is truly exhausted.
        let scheduled = Arc::new(AtomicUsize::new(0));
        let completed = Arc::new(AtomicUsize::new(0));
        let fatal: Arc<StdMutex<Option<ScanError>>> = Arc::new(StdMutex::new(None));

        visited.lock().await.insert(seed.clone());
        scheduled.fetch_add(1, Ordering::SeqCst);
        worker_queues[0].lock().await.push_back(seed.clone());

        info!("Starting crawl of {} with {} workers", seed, workers);

        let mut handles = Vec::new();
        for worker_id in 0..workers {
            let client = self.client.clone();
            let scope = Arc::clone(&self.scope);
            let registry = Arc::clone(&self.registry);
            let ignore = Arc::clone(&self.ignore);
            let sink = self.sink.clone();
            let per_request_agent = self.per_request_agent;
            let worker_queues = Arc::clone(&worker_queues);
            let visited = Arc::clone(&visited);
            let scheduled = Arc::clone(&scheduled);
            let completed = Arc::clone(&completed);
            let fatal = Arc::clone(&fatal);
            let seed = seed.clone();

            handles.push(tokio::spawn(async move {
                let num_workers = worker_queues.len();
                let mut target_worker = 0;

                loop {
                    if fatal.lock().expect("crawler fatal slot poisoned").is_some() {
                        break;
                    }

                    let next = {
                        let mut queue = worker_queues[worker_id].lock().await;
                        queue.pop_front()
                    };

                    let Some(url) = next else {
                        if completed.load(Ordering::SeqCst) == scheduled.load(Ordering::SeqCst) {
                            break;
                        }
                        tokio::time::sleep(Duration::from_millis(10)).await;
                        continue;
                    };

                    match Self::fetch_and_report_static(
                        &client,
                        &scope,
                        &registry,
                        &ignore,
                        sink.as_ref(),
                        per_request_agent,
                        &url,
                    )
                    .await
                    {
                        Ok(candidates) => {
                            for candidate in candidates {
                                if candidate == seed || !scope.in_scope(&candidate) {
                                    continue;
                                }
                                if let Some(key) = scope.asset_key(&candidate)
                                    && registry.present(&key)
                                {
                                    continue;
                                }
                                let should_queue = {
                                    let mut visited_lock = visited.lock().await;
                                    if !visited_lock.contains(&candidate) {
                                        visited_lock.insert(candidate.clone());
                                        true
                                    } else {
                                        false
                                    }
                                };
                                if should_queue {
                                    scheduled.fetch_add(1, Ordering::SeqCst);
                                    let mut queue = worker_queues[target_worker].lock().await;
                                    queue.push_back(candidate);
                                    drop(queue);
                                    target_worker = (target_worker + 1) % num_workers;
                                }
                            }
                        }
                        // Unreachable branches are dropped, not fatal.
                        Err(ScanError::HttpError(err)) => {
                            debug!("Dropping {}: {}", url, err);
                        }
                        Err(err) => {
                            error!("Aborting crawl: {}", err);
                            let mut slot = fatal.lock().expect("crawler fatal slot poisoned");
                            if slot.is_none() {
                                *slot = Some(err);
                            }
                            drop(slot);
                            completed.fetch_add(1, Ordering::SeqCst);
                            break;
                        }
                    }

                    completed.fetch_add(1, Ordering::SeqCst);
                }
            }));
        }

        for result in futures::future::join_all(handles).await {
            result?;
        }

        if let Some(err) = fatal.lock().expect("crawler fatal slot poisoned").take() {
            return Err(err);
        }

        info!(
            "Crawl of {} complete, {} assets registered",
            seed,
            self.registry.len()
        );
        Ok(())
    }

    /// Fetches one URL, registers it if its status survives the ignore
    /// list, hands any fresh registry entries to the sink, and returns the
    /// link candidates found in an HTML body.
    async fn fetch_and_report_static(
        client: &Client,
        scope: &ScopeSpec,
        registry: &AssetRegistry,
        ignore: &HashSet<u16>,
        sink: Option<&SinkCallback>,
        per_request_agent: bool,
        url: &str,
    ) -> Result<Vec<String>> {
        debug!("Fetching {}", url);

        let mut request = client.get(url);
        if per_request_agent {
            request = request.header(reqwest::header::USER_AGENT, crate::agent::random_agent());
        }
        let response = request.send().await?;

        let status_line = format_status_line(response.status());
        let html = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.contains("text/html"))
            .unwrap_or(false);
        let body = response.text().await?;

        let reportable = if ignore.is_empty() {
            true
        } else {
            !ignore.contains(&parse_status_code(&status_line)?)
        };

        if reportable && let Some(key) = scope.asset_key(url) {
            registry.add(&key, &status_line);
            if let Some(sink) = sink {
                registry.drain_with(|asset| sink(asset))?;
            }
        }

        if html {
            Ok(extract_candidate_links(&body, url))
        } else {
            Ok(Vec::new())
        }
    }
}

/// Pulls every link-bearing attribute out of a page in one pass:
/// `a[href]`, `script[src]`, `link[href]`, `iframe[src]`. Values are
/// resolved against the page URL and normalized; scope filtering is the
/// caller's job.
pub fn extract_candidate_links(body: &str, base: &str) -> Vec<String> {
    const SOURCES: &[(&str, &str)] = &[
        ("a[href]", "href"),
        ("script[src]", "src"),
        ("link[href]", "href"),
        ("iframe[src]", "src"),
    ];

    let document = Html::parse_document(body);
    let mut links = Vec::new();
    for (selector, attribute) in SOURCES {
        let Ok(parsed) = Selector::parse(selector) else {
            continue;
        };
        for element in document.select(&parsed) {
            if let Some(value) = element.value().attr(attribute)
                && let Some(resolved) = resolve_url(base, value)
            {
                links.push(resolved);
            }
        }
    }
    links
}

/// Single GET returning only the response status line.
pub async fn probe_status(client: &Client, url: &str, per_request_agent: bool) -> Result<String> {
    let mut request = client.get(url);
    if per_request_agent {
        request = request.header(reqwest::header::USER_AGENT, crate::agent::random_agent());
    }
    let response = request.send().await?;
    Ok(format_status_line(response.status()))
}

/// Canonical form used for frontier dedup: fragment and query stripped,
/// trailing slashes trimmed.
pub fn normalize_url(raw: &str) -> std::result::Result<String, url::ParseError> {
    Ok(normalize_parsed(Url::parse(raw)?))
}

fn normalize_parsed(mut url: Url) -> String {
    url.set_fragment(None);
    url.set_query(None);
    let mut rendered = url.to_string();
    while rendered.ends_with('/') {
        rendered.pop();
    }
    rendered
}

fn resolve_url(base: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
    {
        return None;
    }
    let base = Url::parse(base).ok()?;
    let resolved = base.join(href).ok()?;
    Some(normalize_parsed(resolved))
}

/// Status line in `<code> <reason>` form, bare code when the reason
/// phrase is unknown.
pub fn format_status_line(status: reqwest::StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}

/// First whitespace-separated token of a status line, parsed as a code.
pub fn parse_status_code(status_line: &str) -> Result<u16> {
    status_line
        .split_whitespace()
        .next()
        .and_then(|token| token.parse::<u16>().ok())
        .ok_or_else(|| ScanError::InvalidStatusLine(status_line.to_string()))
}
