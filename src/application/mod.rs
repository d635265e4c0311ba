//! Application Layer
//!
//! Fetch lifecycle and dashboard state:
//! - `Fetcher`: retry-on-timeout wrapper around a market data port
//! - `RefreshScheduler`: load/interval/manual refresh with throttling
//! - `Dashboard`: current view, search and favorites

pub mod dashboard;
pub mod fetcher;
pub mod scheduler;

pub use dashboard::Dashboard;
pub use fetcher::{Fetcher, RetryPolicy};
pub use scheduler::{DashboardState, RefreshConfig, RefreshOutcome, RefreshScheduler};
