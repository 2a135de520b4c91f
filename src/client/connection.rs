use std::env;
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::infrastructure::rest::RestTableStore;
use crate::{Error, Result};

/// Environment variable holding the store endpoint URL.
pub const URL_VAR: &str = "RESTBASE_URL";
/// Environment variable holding the service key.
pub const SERVICE_KEY_VAR: &str = "RESTBASE_SERVICE_KEY";

/// Connection credentials for the hosted table store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub url: String,
    pub service_key: String,
}

impl ClientConfig {
    pub fn new(url: impl Into<String>, service_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            service_key: service_key.into(),
        }
    }

    /// Loads credentials from `RESTBASE_URL` and `RESTBASE_SERVICE_KEY`.
    ///
    /// Fails with [`Error::Config`] before any remote call when either
    /// variable is unset or empty.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(env::var(URL_VAR).ok(), env::var(SERVICE_KEY_VAR).ok())
    }

    fn from_vars(url: Option<String>, service_key: Option<String>) -> Result<Self> {
        match (url, service_key) {
            (Some(url), Some(key)) if !url.is_empty() && !key.is_empty() => {
                Ok(Self::new(url, key))
            }
            _ => Err(Error::Config(format!(
                "{URL_VAR} and {SERVICE_KEY_VAR} must be set in environment variables"
            ))),
        }
    }
}

/// Process-wide, lazily constructed store handle.
///
/// The handle is built at most once; after the first successful `get`
/// every caller receives a clone of the same `Arc`. A failed construction
/// caches nothing, so calls with missing credentials keep failing with
/// the same configuration error.
pub struct SharedStore {
    cell: OnceCell<Arc<RestTableStore>>,
}

impl SharedStore {
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    /// Returns the shared handle, building it from the environment on
    /// first use.
    pub fn get(&self) -> Result<Arc<RestTableStore>> {
        self.get_with(ClientConfig::from_env)
    }

    /// Same as [`get`](Self::get) with an explicit credential source.
    pub fn get_with(&self, load: impl FnOnce() -> Result<ClientConfig>) -> Result<Arc<RestTableStore>> {
        self.cell
            .get_or_try_init(|| Ok(Arc::new(RestTableStore::new(load()?))))
            .cloned()
    }
}

impl Default for SharedStore {
    fn default() -> Self {
        Self::new()
    }
}

static SHARED: SharedStore = SharedStore::new();

/// The process-wide store handle used by [`Repository::connect`](crate::Repository::connect).
pub fn shared_store() -> Result<Arc<RestTableStore>> {
    SHARED.get()
}
