// Crawl orchestration: wires a scope, a registry and the report sinks
// into a crawler run.

use crate::report::{RecordKind, Reporter};
use sark_scanner::crawler::SinkCallback;
use sark_scanner::{Asset, AssetRegistry, CrawlMode, Crawler, ScopeSpec, UserAgentPolicy};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;

pub struct CrawlOptions {
    pub target: String,
    pub scheme: String,
    pub mode: CrawlMode,
    pub ignore: HashSet<u16>,
    pub agent: UserAgentPolicy,
    pub workers: usize,
}

/// Runs a full crawl of the target, reporting every registered asset
/// through the shared reporter. The registry is caller-owned so that
/// other enumeration sources can feed the same dedup set.
pub async fn execute_crawl(
    options: CrawlOptions,
    registry: Arc<AssetRegistry>,
    reporter: Arc<Reporter>,
) -> Result<(), String> {
    let CrawlOptions {
        target,
        scheme,
        mode,
        ignore,
        agent,
        workers,
    } = options;

    let scope = ScopeSpec::new(&target, &scheme, mode)
        .map_err(|e| format!("Invalid scope for {}: {}", target, e))?;

    let kind = match mode {
        CrawlMode::Directory => RecordKind::Dir,
        CrawlMode::Subdomain => RecordKind::Subdomain,
    };
    let sink_reporter = Arc::clone(&reporter);
    let sink: SinkCallback = Arc::new(move |asset: &Asset| sink_reporter.emit_asset(asset, &kind));

    let crawler = Crawler::new(scope, Arc::clone(&registry), agent)
        .map_err(|e| format!("Failed to create HTTP client: {}", e))?
        .with_ignore(ignore)
        .with_sink(sink);

    crawler
        .crawl(workers)
        .await
        .map_err(|e| format!("Crawl of {} failed: {}", target, e))?;

    info!("Crawl of {} registered {} assets", target, registry.len());
    Ok(())
}
