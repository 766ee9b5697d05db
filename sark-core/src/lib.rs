pub mod banner;
pub mod crawl;
pub mod dns;
pub mod ignore;
pub mod opendb;
pub mod portscan;
pub mod report;
pub mod wordlist;

pub use banner::print_banner;
