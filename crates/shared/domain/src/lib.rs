//! # Domain Models
//!
//! Pure data types of the pseudonymization service: the domain tree node, its inheritable
//! attributes, and the service configuration. No I/O and no resolution logic lives here.

pub mod attributes;
pub mod config;
pub mod constants;
pub mod domain;

pub use attributes::{AttributeSet, DomainAttributes};
pub use domain::{Domain, DomainId, DomainPatch};
