//! Kernel utilities shared across the feature crates.
//! Keep this crate lightweight: configuration loading and the clock abstraction.
//!
//! ## Config loading
//! ```rust,ignore
//! use psn_kernel::config::load_config;
//! use psn_kernel::domain::config::ServiceConfig;
//!
//! let cfg: ServiceConfig = load_config(Some("psn.toml"))?;
//! ```

pub mod clock;
pub mod config;

pub use clock::{Clock, FixedClock, SystemClock};
pub use psn_domain as domain;
