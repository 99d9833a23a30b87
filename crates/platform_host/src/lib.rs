//! Typed host-service contracts consumed by the surface runtime.
//!
//! This crate is the API-first boundary for everything the runtime treats as an external
//! collaborator: the template/descriptor loader and the user-facing alert surface. Concrete
//! network or browser adapters live outside the runtime; the in-memory adapters here back
//! headless hosts and tests.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod alerts;
pub mod host;
pub mod loader;

pub use alerts::{AlertPresenter, AlertRecord, MemoryAlertPresenter, NoopAlertPresenter};
pub use host::{HostServices, HostStrategy};
pub use loader::{
    fetch_json_with, fetch_text_with, Decoder, FetchError, Fetched, MemoryResourceLoader,
    NoopResourceLoader, ResourceFuture, ResourceLoader,
};
