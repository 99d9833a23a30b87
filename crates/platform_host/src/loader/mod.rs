//! Resource-loader contracts and lightweight test adapters.

mod resource_loader;

pub use resource_loader::{
    fetch_json_with, fetch_text_with, Decoder, FetchError, Fetched, MemoryResourceLoader,
    NoopResourceLoader, ResourceFuture, ResourceLoader,
};
