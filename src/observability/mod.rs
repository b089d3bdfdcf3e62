//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! relay operations produce:
//!     → logging.rs (structured log events, one span per operation)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout via tracing-subscriber
//!     → Prometheus scrape endpoint (optional)
//! ```

pub mod logging;
pub mod metrics;
