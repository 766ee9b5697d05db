// Parsing of the ignored-status flag.

use std::collections::HashSet;

/// Parses a comma-separated ignore list into concrete status codes.
/// Entries are either literal codes (`404`) or whole classes written as
/// `4**`, which expands to 400 through 499. Codes outside 100-599 are
/// rejected.
pub fn parse_ignore_list(raw: &str) -> Result<HashSet<u16>, String> {
    let mut codes = HashSet::new();
    for entry in raw.split(',') {
        let entry = entry.trim();
        if let Some(class) = entry.strip_suffix("**") {
            let class: u16 = class
                .parse()
                .map_err(|_| format!("Invalid status class: {entry:?}"))?;
            if !(1..=5).contains(&class) {
                return Err(format!("Invalid status class: {entry:?}"));
            }
            for code in (class * 100)..=(class * 100 + 99) {
                codes.insert(code);
            }
        } else {
            let code: u16 = entry
                .parse()
                .map_err(|_| format!("Invalid status code: {entry:?}"))?;
            if !(100..=599).contains(&code) {
                return Err(format!("Invalid status code: {entry:?}"));
            }
            codes.insert(code);
        }
    }
    Ok(codes)
}
