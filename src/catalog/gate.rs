//! Readiness gate in front of the catalog.
//!
//! Requests that need the catalog ask the gate for it. At most one load is in
//! flight at any time, callers that arrive while it runs (or after it failed)
//! are told the catalog is unavailable instead of waiting.

use super::{load_catalog, Catalog, LoadError};
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use tracing::{error, info};

#[derive(Debug, Clone)]
pub enum CatalogStatus {
    NotLoaded,
    Loading,
    Ready(Arc<Catalog>),
    Failed(String),
}

impl CatalogStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogStatus::NotLoaded => "not_loaded",
            CatalogStatus::Loading => "loading",
            CatalogStatus::Ready(_) => "ready",
            CatalogStatus::Failed(_) => "failed",
        }
    }
}

pub struct CatalogGate {
    status: RwLock<CatalogStatus>,
    source: Option<PathBuf>,
}

pub type GuardedCatalogGate = Arc<CatalogGate>;

impl CatalogGate {
    /// A gate that is ready from the start and cannot be reloaded.
    pub fn with_catalog(catalog: Catalog) -> CatalogGate {
        CatalogGate {
            status: RwLock::new(CatalogStatus::Ready(Arc::new(catalog))),
            source: None,
        }
    }

    /// A gate that loads `source` when first asked for the catalog.
    pub fn from_source(source: PathBuf) -> CatalogGate {
        CatalogGate {
            status: RwLock::new(CatalogStatus::NotLoaded),
            source: Some(source),
        }
    }

    pub fn status(&self) -> CatalogStatus {
        self.status
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn catalog(&self) -> Option<Arc<Catalog>> {
        match self.status() {
            CatalogStatus::Ready(catalog) => Some(catalog),
            _ => None,
        }
    }

    fn set_status(&self, status: CatalogStatus) {
        *self
            .status
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = status;
    }

    /// Moves the gate to `Loading` if nothing is loaded or a previous load
    /// failed. Returns false when a load is running or the catalog is ready.
    fn try_begin_load(&self) -> bool {
        if self.source.is_none() {
            return false;
        }
        let mut status = self
            .status
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match *status {
            CatalogStatus::NotLoaded | CatalogStatus::Failed(_) => {
                *status = CatalogStatus::Loading;
                true
            }
            CatalogStatus::Loading | CatalogStatus::Ready(_) => false,
        }
    }

    async fn run_load(&self) -> Result<Arc<Catalog>, LoadError> {
        let Some(source) = self.source.clone() else {
            return Err(LoadError::Task("catalog gate has no dataset source".to_owned()));
        };
        info!("Loading recipe catalog from {:?}...", source);
        match load_catalog(&source).await {
            Ok(catalog) => {
                let catalog = Arc::new(catalog);
                self.set_status(CatalogStatus::Ready(catalog.clone()));
                Ok(catalog)
            }
            Err(err) => {
                error!("Recipe catalog could not be loaded: {}", err);
                self.set_status(CatalogStatus::Failed(err.to_string()));
                Err(err)
            }
        }
    }

    /// Returns the current status, starting a background load first when the
    /// catalog is not loaded yet or the last attempt failed.
    pub fn ensure_loaded(self: &Arc<Self>) -> CatalogStatus {
        if self.try_begin_load() {
            let gate = self.clone();
            tokio::spawn(async move {
                let _ = gate.run_load().await;
            });
        }
        self.status()
    }

    /// Loads the dataset and waits for the result, replacing any catalog
    /// already held. Meant for the startup phase, before traffic is served.
    pub async fn load_now(&self) -> Result<Arc<Catalog>, LoadError> {
        if self.source.is_some() {
            self.set_status(CatalogStatus::Loading);
        }
        self.run_load().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Recipe;
    use std::time::Duration;

    async fn wait_while_loading(gate: &Arc<CatalogGate>) -> CatalogStatus {
        for _ in 0..200 {
            match gate.status() {
                CatalogStatus::Loading => tokio::time::sleep(Duration::from_millis(10)).await,
                status => return status,
            }
        }
        panic!("catalog load did not complete");
    }

    #[test]
    fn prebuilt_catalog_is_ready() {
        let gate = CatalogGate::with_catalog(Catalog::new(vec![Recipe::default()]));
        assert_eq!(gate.catalog().map(|c| c.len()), Some(1));
        assert_eq!(gate.status().as_str(), "ready");
    }

    #[tokio::test]
    async fn prebuilt_catalog_is_never_reloaded() {
        let gate = Arc::new(CatalogGate::with_catalog(Catalog::empty()));
        assert!(matches!(gate.ensure_loaded(), CatalogStatus::Ready(_)));
    }

    #[tokio::test]
    async fn loads_lazily_on_first_request() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("recipes.csv");
        std::fs::write(&path, "dish_name,mood\nSoup,cozy\n").unwrap();

        let gate = Arc::new(CatalogGate::from_source(path));
        assert_eq!(gate.status().as_str(), "not_loaded");

        let status = gate.ensure_loaded();
        assert!(matches!(
            status,
            CatalogStatus::Loading | CatalogStatus::Ready(_)
        ));

        match wait_while_loading(&gate).await {
            CatalogStatus::Ready(catalog) => assert_eq!(catalog.len(), 1),
            other => panic!("unexpected status {:?}", other),
        }
    }

    #[tokio::test]
    async fn failed_load_is_retried_on_next_request() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("recipes.csv");

        let gate = Arc::new(CatalogGate::from_source(path.clone()));
        gate.ensure_loaded();
        assert!(matches!(
            wait_while_loading(&gate).await,
            CatalogStatus::Failed(_)
        ));

        std::fs::write(&path, "dish_name,mood\nSoup,cozy\n").unwrap();
        gate.ensure_loaded();
        assert!(matches!(
            wait_while_loading(&gate).await,
            CatalogStatus::Ready(_)
        ));
    }

    #[tokio::test]
    async fn load_now_surfaces_errors() {
        let dir = tempfile::TempDir::new().unwrap();
        let gate = CatalogGate::from_source(dir.path().join("missing.csv"));
        assert!(gate.load_now().await.is_err());
        assert_eq!(gate.status().as_str(), "failed");
    }
}
