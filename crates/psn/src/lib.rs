//! Facade crate for the pseudonymization service.
//! Re-exports the domain, kernel and feature crates and wires them together from a
//! [`ServiceConfig`]. Keep this crate thin: it composes other crates, it does not implement
//! business logic.
//!
//! ## Usage
//! ```rust,ignore
//! let config: ServiceConfig = psn::kernel::config::load_config(Some("psn.toml"))?;
//! let service = psn::PseudonymService::init(&config).await?;
//! let issued = service.pseudonymizer().issue("study", "4711", "MRN").await?;
//! ```

mod error;

pub use error::{PsnError, PsnErrorExt};
pub use psn_domain as domain;
pub use psn_hierarchy as hierarchy;
pub use psn_kernel as kernel;
pub use psn_pseudonym as pseudonym;
pub use psn_storage as storage;

use psn_domain::DomainId;
use psn_domain::config::ServiceConfig;
use psn_hierarchy::{DomainCatalog, DomainConfigResolver};
use psn_pseudonym::{CounterStore, FileCounterStore, Pseudonymizer};
use psn_storage::Storage;
use std::sync::Arc;
use tracing::info;

/// The issuance service as configured: counters persisted under `storage.data_dir`, the
/// catalogue seeded from `domains`.
pub type ConfiguredPseudonymizer = Pseudonymizer<DomainCatalog, FileCounterStore>;

#[derive(Debug, Clone)]
pub struct PseudonymService {
    catalog: Arc<DomainCatalog>,
    pseudonymizer: ConfiguredPseudonymizer,
    storage: Storage,
}

impl PseudonymService {
    /// Opens the storage root, seeds the catalogue and builds the issuance service.
    ///
    /// # Errors
    /// Returns [`PsnError::Storage`] when the data directory is unusable and
    /// [`PsnError::Hierarchy`] when the seed domains are invalid.
    pub async fn init(config: &ServiceConfig) -> Result<Self, PsnError> {
        let storage = Storage::builder()
            .root(&config.storage.data_dir)
            .create(config.storage.create)
            .connect()
            .await
            .context("Opening data directory")?;
        let counters = FileCounterStore::new(&storage)?;
        let catalog =
            Arc::new(DomainCatalog::from_seeds(&config.domains, config.defaults.clone())?);
        let resolver = DomainConfigResolver::new(config.defaults.clone());

        let pseudonymizer = Pseudonymizer::new(Arc::clone(&catalog), Arc::new(counters), resolver);
        info!(
            domains = catalog.len(),
            data_dir = %storage.root().display(),
            "Pseudonym service initialised"
        );
        Ok(Self { catalog, pseudonymizer, storage })
    }

    #[must_use]
    pub fn catalog(&self) -> &DomainCatalog {
        &self.catalog
    }

    #[must_use]
    pub const fn pseudonymizer(&self) -> &ConfiguredPseudonymizer {
        &self.pseudonymizer
    }

    #[must_use]
    pub const fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Deletes a domain (with its subtree when `recursive`) together with its records and
    /// persisted counter.
    ///
    /// # Errors
    /// Returns [`PsnError::Hierarchy`] when the catalogue refuses the deletion and
    /// [`PsnError::Counter`] when a counter file cannot be removed.
    pub async fn delete_domain(
        &self,
        id: DomainId,
        recursive: bool,
    ) -> Result<Vec<DomainId>, PsnError> {
        let removed = self.catalog.delete(id, recursive)?;
        for domain in &removed {
            self.pseudonymizer.delete_domain_records(*domain);
            self.pseudonymizer
                .counters()
                .remove(*domain)
                .await
                .context(format!("Removing counter of domain {domain}"))?;
        }
        Ok(removed)
    }
}
