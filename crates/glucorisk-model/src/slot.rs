//! Process-wide predictor lifecycle
//!
//! A [`PredictorSlot`] loads its predictor at most once and hands out shared
//! references until it is torn down or reloaded. One slot can be installed as
//! the process-global instance.

use crate::predictor::Predictor;
use crate::provider::ModelProvider;
use glucorisk_core::{Error, Result};
use parking_lot::RwLock;
use std::sync::{Arc, OnceLock};
use tracing::info;

/// Memoized holder for a loaded predictor
pub struct PredictorSlot {
    provider: Arc<dyn ModelProvider>,
    loaded: RwLock<Option<Arc<dyn Predictor>>>,
}

impl PredictorSlot {
    /// Create an empty slot; nothing is loaded until first use
    pub fn new(provider: Arc<dyn ModelProvider>) -> Self {
        Self {
            provider,
            loaded: RwLock::new(None),
        }
    }

    /// Get the predictor, loading it on first access
    pub fn get(&self) -> Result<Arc<dyn Predictor>> {
        if let Some(predictor) = self.loaded.read().as_ref() {
            return Ok(Arc::clone(predictor));
        }

        let mut loaded = self.loaded.write();
        // Another caller may have loaded while we waited for the lock
        if let Some(predictor) = loaded.as_ref() {
            return Ok(Arc::clone(predictor));
        }

        info!(source = %self.provider.source(), "Loading predictor on first use");
        let predictor = self.provider.load()?;
        *loaded = Some(Arc::clone(&predictor));
        Ok(predictor)
    }

    /// Load eagerly, e.g. at startup
    pub fn preload(&self) -> Result<()> {
        self.get().map(|_| ())
    }

    /// Re-invoke the provider and swap in the new predictor.
    ///
    /// Callers holding the previous predictor keep using it. On failure the
    /// previously loaded predictor stays in place.
    pub fn reload(&self) -> Result<Arc<dyn Predictor>> {
        info!(source = %self.provider.source(), "Reloading predictor");
        let predictor = self.provider.load()?;
        *self.loaded.write() = Some(Arc::clone(&predictor));
        Ok(predictor)
    }

    /// Drop the loaded predictor. Returns whether one was loaded.
    pub fn teardown(&self) -> bool {
        let was_loaded = self.loaded.write().take().is_some();
        if was_loaded {
            info!(source = %self.provider.source(), "Predictor torn down");
        }
        was_loaded
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.read().is_some()
    }
}

static GLOBAL: OnceLock<PredictorSlot> = OnceLock::new();

/// Install the process-global slot. Fails if one is already installed.
pub fn install_global(provider: Arc<dyn ModelProvider>) -> Result<&'static PredictorSlot> {
    let mut installed = false;
    let slot = GLOBAL.get_or_init(|| {
        installed = true;
        PredictorSlot::new(provider)
    });

    if installed {
        Ok(slot)
    } else {
        Err(Error::config("global predictor slot is already installed"))
    }
}

/// The process-global slot, if installed
pub fn global() -> Option<&'static PredictorSlot> {
    GLOBAL.get()
}

/// Drop the globally loaded predictor; the slot stays installed and reloads on next use
pub fn teardown_global() -> bool {
    GLOBAL.get().map(PredictorSlot::teardown).unwrap_or(false)
}
