//! Error and outcome types returned by the runtime.

use surface_contract::{BundleId, SurfaceId};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Errors returned by application and controller operations.
pub enum RuntimeError {
    /// `open` was called for a bundle that is not registered.
    #[error("application bundle ({0}) is not installed")]
    NotInstalled(BundleId),
    /// The operation needs a loaded application.
    #[error("application bundle ({0}) is not loaded")]
    NotLoaded(BundleId),
    /// A descriptor or template fetch failed.
    #[error("failed to load {resource} for ({bundle_id}): {reason}")]
    LoadFailure {
        /// Bundle whose resource failed.
        bundle_id: BundleId,
        /// Path of the failed resource.
        resource: String,
        /// Loader failure message.
        reason: String,
    },
    /// The loader reported an expired session while fetching `resource`.
    #[error("session expired while loading {resource}")]
    SessionExpired {
        /// Path of the failed resource.
        resource: String,
    },
    /// The requested controller is not declared in the descriptor.
    #[error("controller ({controller}) does not exist in application ({bundle_id})")]
    UnknownController {
        /// Owning bundle.
        bundle_id: BundleId,
        /// Requested controller name.
        controller: String,
    },
    /// A `remote` controller was requested without an endpoint.
    #[error("controller ({controller}) is remote and requires an endpoint")]
    EndpointRequired {
        /// Requested controller name.
        controller: String,
    },
    /// The controller declares a renderer other than `html`.
    #[error("renderer ({renderer}) is not supported for controller ({controller})")]
    UnsupportedRenderer {
        /// Requested controller name.
        controller: String,
        /// Declared renderer.
        renderer: String,
    },
    /// `add_controller` targeted a name that is already configured.
    #[error("controller ({controller}) is already configured in application ({bundle_id})")]
    ControllerAlreadyConfigured {
        /// Owning bundle.
        bundle_id: BundleId,
        /// Duplicate controller name.
        controller: String,
    },
    /// The surface id does not exist in the surface arena.
    #[error("surface ({0}) does not exist")]
    MissingController(SurfaceId),
    /// [`crate::RuntimeConfig`] failed to parse or validate.
    #[error("invalid runtime configuration: {reason}")]
    InvalidConfig {
        /// Parse or validation message.
        reason: String,
    },
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
/// Stack bookkeeping inconsistencies. Callers log and tolerate these.
pub enum StackError {
    /// The surface is not present in either stack.
    #[error("surface ({0}) is not in the stack")]
    NotInStack(SurfaceId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Result of closing an application.
pub enum CloseOutcome {
    /// The application was torn down.
    Closed,
    /// No application with that bundle id was loaded.
    NotLoaded,
    /// A close for the same bundle is already running; this call did nothing.
    AlreadyClosing,
}
