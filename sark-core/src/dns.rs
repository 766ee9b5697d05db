// DNS record enumeration.

use crate::report::Reporter;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use trust_dns_resolver::TokioAsyncResolver;
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::proto::rr::RecordType;

/// Record types queried, in reporting order.
pub const RECORD_TYPES: &[&str] = &["A", "AAAA", "CNAME", "MX", "NS", "SOA", "TXT"];

pub fn record_type_of(name: &str) -> Option<RecordType> {
    match name {
        "A" => Some(RecordType::A),
        "AAAA" => Some(RecordType::AAAA),
        "CNAME" => Some(RecordType::CNAME),
        "MX" => Some(RecordType::MX),
        "NS" => Some(RecordType::NS),
        "SOA" => Some(RecordType::SOA),
        "TXT" => Some(RecordType::TXT),
        _ => None,
    }
}

/// Queries every supported record type against the system resolver and
/// reports each value found. A type with no answer is logged and skipped,
/// never fatal.
pub async fn execute_dns_enum(target: &str, reporter: Arc<Reporter>) -> Result<(), String> {
    let mut opts = ResolverOpts::default();
    opts.timeout = Duration::from_secs(5);
    opts.attempts = 2;
    let resolver = TokioAsyncResolver::tokio(ResolverConfig::default(), opts);

    for record in RECORD_TYPES {
        let Some(record_type) = record_type_of(record) else {
            continue;
        };
        match resolver.lookup(target, record_type).await {
            Ok(lookup) => {
                for data in lookup.iter() {
                    reporter
                        .emit_dns_record(record, &data.to_string())
                        .map_err(|e| format!("Failed to report {} record: {}", record, e))?;
                }
            }
            Err(err) => {
                debug!("No {} records for {}: {}", record, target, err);
            }
        }
    }
    Ok(())
}
