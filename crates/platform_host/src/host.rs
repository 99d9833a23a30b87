//! Host service bundle injected into the surface runtime.

use std::rc::Rc;

use crate::{
    AlertPresenter, MemoryAlertPresenter, MemoryResourceLoader, NoopAlertPresenter,
    NoopResourceLoader, ResourceLoader,
};

/// Stable host strategy selected for the current runtime composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostStrategy {
    /// Browser-backed composition with a network loader.
    Browser,
    /// Headless composition (tests, tooling) with in-memory adapters.
    Headless,
}

impl HostStrategy {
    /// Returns a stable string token for diagnostics.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Browser => "browser",
            Self::Headless => "headless",
        }
    }
}

/// Runtime-selected host services.
///
/// All environment-specific service selection happens before this bundle crosses into the
/// runtime, which keeps the runtime decoupled from transport details.
#[derive(Clone)]
pub struct HostServices {
    /// Descriptor and template loader.
    pub loader: Rc<dyn ResourceLoader>,
    /// Blocking alert and progress presenter.
    pub alerts: Rc<dyn AlertPresenter>,
    /// Stable strategy identifier for diagnostics.
    pub host_strategy: HostStrategy,
}

impl HostServices {
    /// Builds a bundle from explicit adapters.
    pub fn new(
        loader: Rc<dyn ResourceLoader>,
        alerts: Rc<dyn AlertPresenter>,
        host_strategy: HostStrategy,
    ) -> Self {
        Self {
            loader,
            alerts,
            host_strategy,
        }
    }

    /// Headless bundle backed by in-memory adapters shared with the caller.
    pub fn memory(loader: MemoryResourceLoader, alerts: MemoryAlertPresenter) -> Self {
        Self::new(Rc::new(loader), Rc::new(alerts), HostStrategy::Headless)
    }
}

impl Default for HostServices {
    fn default() -> Self {
        Self::new(
            Rc::new(NoopResourceLoader),
            Rc::new(NoopAlertPresenter),
            HostStrategy::Headless,
        )
    }
}
