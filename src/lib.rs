pub mod models;
pub mod errors;
pub mod config;
pub mod locators;
pub mod diff;
pub mod verdict;
pub mod browser;
pub mod prober;
pub mod pipeline;
pub mod reporting;

// Re-export commonly used items
pub use models::*;
pub use errors::*;
pub use config::*;
pub use locators::*;
pub use diff::*;
pub use verdict::*;
pub use browser::{Browser, HttpBrowser};
pub use prober::*;
pub use pipeline::*;
pub use reporting::*;
