// Concurrent registry of discovered assets.
//
// Every worker and enumeration source funnels its findings through one
// registry, which is the single point of deduplication and the gate in
// front of the reporting sinks. Keys are inserted at most once, and each
// asset is handed to a sink at most once, no matter how many workers race
// on the same discovery.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// How keys are canonicalized on insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStyle {
    /// Keys are absolute URLs, stored verbatim.
    Url,
    /// Keys are bare hosts; an `http://` or `https://` prefix is stripped.
    Host,
}

/// A single discovery: registry key plus the status line observed when
/// the asset was probed. `printed` flips once the asset has been handed
/// to the reporting sinks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub key: String,
    pub status_line: String,
    pub printed: bool,
}

struct RegistryInner {
    assets: HashMap<String, Asset>,
    pending: VecDeque<String>,
}

pub struct AssetRegistry {
    style: KeyStyle,
    inner: Mutex<RegistryInner>,
}

impl AssetRegistry {
    pub fn new(style: KeyStyle) -> Self {
        Self {
            style,
            inner: Mutex::new(RegistryInner {
                assets: HashMap::new(),
                pending: VecDeque::new(),
            }),
        }
    }

    pub fn style(&self) -> KeyStyle {
        self.style
    }

    /// Whether a key is already registered. Lookups canonicalize the same
    /// way `add` does, so callers may pass either form.
    pub fn present(&self, key: &str) -> bool {
        let key = self.canonical(key);
        let inner = self.inner.lock().expect("registry mutex poisoned");
        inner.assets.contains_key(key.as_ref())
    }

    /// Registers a discovery. The first insert wins; duplicate keys leave
    /// the stored status line and print state untouched.
    pub fn add(&self, key: &str, status_line: &str) {
        let key = self.canonical(key).into_owned();
        let mut inner = self.inner.lock().expect("registry mutex poisoned");
        if inner.assets.contains_key(&key) {
            return;
        }
        inner.assets.insert(
            key.clone(),
            Asset {
                key: key.clone(),
                status_line: status_line.to_string(),
                printed: false,
            },
        );
        inner.pending.push_back(key);
    }

    /// Hands every not-yet-printed asset to `sink`, marking each printed
    /// first so that no asset can be emitted twice. The registry lock is
    /// held for the whole drain, serializing sink output across workers.
    ///
    /// A sink failure stops the drain and propagates; assets already
    /// claimed stay marked, the rest keep their place in the queue.
    pub fn drain_with<E>(&self, mut sink: impl FnMut(&Asset) -> Result<(), E>) -> Result<(), E> {
        let mut inner = self.inner.lock().expect("registry mutex poisoned");
        while let Some(key) = inner.pending.pop_front() {
            if let Some(asset) = inner.assets.get_mut(&key)
                && !asset.printed
            {
                asset.printed = true;
                sink(&*asset)?;
            }
        }
        Ok(())
    }

    /// Snapshot of every registered asset, in no particular order.
    pub fn assets(&self) -> Vec<Asset> {
        let inner = self.inner.lock().expect("registry mutex poisoned");
        inner.assets.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        let inner = self.inner.lock().expect("registry mutex poisoned");
        inner.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn canonical<'a>(&self, key: &'a str) -> std::borrow::Cow<'a, str> {
        match self.style {
            KeyStyle::Url => std::borrow::Cow::Borrowed(key),
            KeyStyle::Host => std::borrow::Cow::Borrowed(strip_scheme(key)),
        }
    }
}

/// Drops a leading `http://` or `https://` from a key.
pub fn strip_scheme(key: &str) -> &str {
    key.strip_prefix("https://")
        .or_else(|| key.strip_prefix("http://"))
        .unwrap_or(key)
}
