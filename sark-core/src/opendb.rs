// Public-database subdomain retrieval.

use crate::report::{RecordKind, Reporter};
use anyhow::Context;
use reqwest::Client;
use sark_scanner::AssetRegistry;
use serde::Deserialize;
use tracing::debug;

pub const CRTSH_BASE: &str = "https://crt.sh";
pub const SONAR_BASE: &str = "https://sonar.omnisint.io";

#[derive(Debug, Deserialize)]
struct CrtShEntry {
    name_value: String,
}

/// Queries the public certificate-transparency and passive-DNS sources
/// for already known subdomains of the target. A source that fails or
/// returns malformed data contributes nothing. The merged list comes
/// back lowercased, sorted and deduplicated.
pub async fn retrieve_subdomains(client: &Client, target: &str) -> Vec<String> {
    let mut found = Vec::new();

    match crtsh_subdomains(client, CRTSH_BASE, target).await {
        Ok(mut subs) => found.append(&mut subs),
        Err(err) => debug!("crt.sh gave nothing for {}: {:#}", target, err),
    }
    match sonar_subdomains(client, SONAR_BASE, target).await {
        Ok(mut subs) => found.append(&mut subs),
        Err(err) => debug!("sonar gave nothing for {}: {:#}", target, err),
    }

    found.sort();
    found.dedup();
    found
}

pub async fn crtsh_subdomains(
    client: &Client,
    base: &str,
    domain: &str,
) -> anyhow::Result<Vec<String>> {
    let url = format!("{base}/?q=%25.{domain}&output=json");
    let entries: Vec<CrtShEntry> = client
        .get(&url)
        .send()
        .await
        .context("certificate transparency query failed")?
        .error_for_status()?
        .json()
        .await
        .context("certificate transparency response was not JSON")?;

    let mut subdomains = Vec::new();
    for entry in entries {
        // One certificate covers several names, one per line.
        for line in entry.name_value.lines() {
            let subdomain = line.trim().to_lowercase();
            if !subdomain.is_empty() && !subdomain.starts_with('*') && subdomain.ends_with(domain) {
                subdomains.push(subdomain);
            }
        }
    }
    Ok(subdomains)
}

/// Registers database hosts without probing them. The empty status line
/// marks an asset whose liveness was never checked.
pub fn register_unchecked(
    hosts: &[String],
    registry: &AssetRegistry,
    reporter: &Reporter,
    kind: &RecordKind,
) -> Result<(), String> {
    for host in hosts {
        registry.add(host, "");
    }
    registry
        .drain_with(|asset| reporter.emit_asset(asset, kind))
        .map_err(|e| format!("Failed to report unchecked hosts: {}", e))
}

pub async fn sonar_subdomains(
    client: &Client,
    base: &str,
    domain: &str,
) -> anyhow::Result<Vec<String>> {
    let url = format!("{base}/subdomains/{domain}");
    let subdomains: Vec<String> = client
        .get(&url)
        .send()
        .await
        .context("passive DNS query failed")?
        .error_for_status()?
        .json()
        .await
        .context("passive DNS response was not JSON")?;
    Ok(subdomains
        .into_iter()
        .map(|name| name.trim().to_lowercase())
        .collect())
}
