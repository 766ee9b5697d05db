// TCP connect scanning.

use crate::report::Reporter;
use futures::stream::{FuturesUnordered, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::debug;

pub const COMMON_PORTS: &[u16] = &[
    21, 22, 23, 25, 53, 80, 110, 111, 135, 139, 143, 443, 445, 993, 995, 1723, 3306, 3389, 5432,
    5900, 8080, 8443,
];

pub struct PortScanOptions {
    pub host: String,
    pub ports: Vec<u16>,
    pub timeout_secs: u64,
    pub workers: usize,
    pub show_progress: bool,
}

/// Expands the ports flag into a concrete scan list: a single port, an
/// inclusive `start-end` range, a comma list, or the common-ports preset.
/// With no selection at all, every port is scanned.
pub fn parse_port_selection(selection: Option<&str>, common: bool) -> Result<Vec<u16>, String> {
    if common {
        return Ok(COMMON_PORTS.to_vec());
    }
    let Some(selection) = selection else {
        return Ok((1..=65535).collect());
    };
    if selection.contains(',') {
        return selection.split(',').map(|port| parse_port(port.trim())).collect();
    }
    if let Some((start, end)) = selection.split_once('-') {
        let start = parse_port(start.trim())?;
        let end = parse_port(end.trim())?;
        if start > end {
            return Err(format!("Invalid port range: {:?}", selection));
        }
        return Ok((start..=end).collect());
    }
    Ok(vec![parse_port(selection)?])
}

fn parse_port(token: &str) -> Result<u16, String> {
    let port: u16 = token
        .parse()
        .map_err(|_| format!("Invalid port: {:?}", token))?;
    if port == 0 {
        return Err(format!("Invalid port: {:?}", token));
    }
    Ok(port)
}

/// Connect-scans the selected ports and reports the open ones in
/// ascending order. Connection failures and timeouts just mean closed.
pub async fn execute_port_scan(
    options: PortScanOptions,
    reporter: Arc<Reporter>,
) -> Result<Vec<u16>, String> {
    let PortScanOptions {
        host,
        ports,
        timeout_secs,
        workers,
        show_progress,
    } = options;
    let total = ports.len();

    let progress = if show_progress {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("[{bar:40.cyan/blue}] {pos}/{len} ports")
                .unwrap()
                .progress_chars("=>-"),
        );
        Some(bar)
    } else {
        None
    };

    let semaphore = Arc::new(Semaphore::new(workers.max(1)));
    let mut probes = FuturesUnordered::new();
    for port in ports {
        let host = host.clone();
        let semaphore = semaphore.clone();
        probes.push(tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await.unwrap();
            let open = matches!(
                timeout(
                    Duration::from_secs(timeout_secs),
                    TcpStream::connect((host.as_str(), port)),
                )
                .await,
                Ok(Ok(_))
            );
            (port, open)
        }));
    }

    let mut open_ports = Vec::new();
    while let Some(result) = probes.next().await {
        let (port, open) = result.map_err(|e| format!("Port probe task failed: {}", e))?;
        if open {
            open_ports.push(port);
        }
        if let Some(ref bar) = progress {
            bar.inc(1);
        }
    }
    if let Some(ref bar) = progress {
        bar.finish_and_clear();
    }

    open_ports.sort_unstable();
    for port in &open_ports {
        reporter
            .emit_open_port(&host, *port)
            .map_err(|e| format!("Failed to report open port {}: {}", port, e))?;
    }

    debug!("{} of {} probed ports open on {}", open_ports.len(), total, host);
    Ok(open_ports)
}
