//! Sandboxed file storage for the persistent state of the pseudonymization service.
//!
//! Every entry lives below one canonical root directory. Writes go through a unique temporary
//! file, `fsync` and `rename`, so a reader never observes a half-written counter. Entries are
//! grouped in namespaces (`counters`, ...) and addressed by relative keys that cannot leave the
//! root. Temporary files orphaned by a crash are removed when the store is opened.
//!
//! ```rust
//! use psn_storage::{Storage, StorageError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), StorageError> {
//!     # let tmp = tempfile::tempdir().unwrap();
//!     # let root = tmp.path().join("data");
//!     let storage = Storage::builder().root(&root).create(true).connect().await?;
//!     let counters = storage.namespace("counters")?;
//!
//!     counters.write("7", b"42").await?;
//!     assert_eq!(counters.read_optional("7").await?.as_deref(), Some(&b"42"[..]));
//!     assert_eq!(counters.keys().await?, vec!["7".to_owned()]);
//!     Ok(())
//! }
//! ```

mod builder;
mod engine;
mod error;
mod maintenance;
mod namespace;
mod security;

pub use builder::StorageBuilder;
pub use engine::Storage;
pub use error::{StorageError, StorageErrorExt};
pub use namespace::{NamespaceName, NamespacedStorage};
