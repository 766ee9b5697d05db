pub mod agent;
pub mod crawler;
pub mod error;
pub mod registry;
pub mod scope;

pub use agent::UserAgentPolicy;
pub use crawler::Crawler;
pub use error::ScanError;
pub use registry::{Asset, AssetRegistry, KeyStyle};
pub use scope::{CrawlMode, ScopeSpec};
