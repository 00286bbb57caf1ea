//! # Pseudonyms
//!
//! Generation strategies, generalized Luhn check digits, per-domain counters and the
//! issuance service that ties them to the domain tree.
//!
//! ```rust
//! use psn_pseudonym::generator::{AlgorithmSelection, PseudonymGenerator};
//!
//! let mut selection = AlgorithmSelection::new("MD5");
//! selection.prefix = "TS-".to_owned();
//! selection.length = 16;
//!
//! let generated = PseudonymGenerator::generate("12345", &selection, None).unwrap();
//! assert!(generated.pseudonym.starts_with("TS-"));
//! assert_eq!(generated.pseudonym.len(), 3 + 16 + 1);
//! ```

pub mod algorithm;
pub mod check_digit;
pub mod counter;
mod error;
pub mod generator;
pub mod records;
pub mod service;

pub use algorithm::{Algorithm, AlgorithmRegistry, Selection};
pub use check_digit::{CheckDigitCalculator, append_check_digit, validate_check_digit};
pub use counter::{CounterError, CounterStore, FileCounterStore, MemoryCounterStore};
pub use error::{PseudonymError, PseudonymErrorExt};
pub use generator::{AlgorithmSelection, Generated, PseudonymGenerator, correct_length, subject};
pub use records::{PseudonymRecord, RecordStore};
pub use service::{Issued, Pseudonymizer};
