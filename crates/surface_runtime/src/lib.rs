//! Window and application runtime for a browser-hosted desktop.
//!
//! The runtime keeps one [`RuntimeState`]: the registered and loaded applications, the window and
//! modal stacks, the OS-bar menus, and the script registry. [`ApplicationManager`] is the shared
//! handle that loads bundles through the injected [`platform_host::HostServices`], mutates the
//! state, and drives the mounted [`surface_contract::SurfaceController`] and
//! [`surface_contract::ApplicationDelegate`] callbacks.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

mod applications;
pub mod config;
pub mod error;
pub mod factory;
mod focus;
mod manager;
pub mod menus;
pub mod model;
pub mod registry;
pub mod scripts;
pub mod stack;
mod state;
pub mod template;
#[cfg(test)]
mod testing;

pub use config::{HostAttributes, RuntimeConfig};
pub use error::{CloseOutcome, RuntimeError, StackError};
pub use focus::KeyRouting;
pub use manager::{ApplicationManager, RuntimeHandle};
pub use menus::{AppMenu, AppMenuSlot, MenuEntry, OsBar};
pub use model::{
    ApplicationInstance, ApplicationState, ControllerKey, FocusState, MenuId, Point, Surface,
    SurfaceKind,
};
pub use registry::{
    AppModule, ApplicationContext, ControllerMountFn, ControllerRegistry, DelegateMountFn,
    SurfaceContext,
};
pub use scripts::{ScriptFragment, ScriptRegistry};
pub use stack::{StackRegistry, StackSlot};
pub use state::RuntimeState;
