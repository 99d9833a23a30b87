//! Template/configuration fetch service contracts and adapters.

use std::{
    cell::RefCell,
    collections::{HashMap, HashSet},
    future::Future,
    pin::Pin,
    rc::Rc,
};

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Object-safe boxed future used by [`ResourceLoader`].
pub type ResourceFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// How the fetched body should be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoder {
    /// Return the raw body.
    Text,
    /// Parse the body as JSON.
    Json,
}

/// A decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched {
    /// Raw text body.
    Text(String),
    /// Parsed JSON body.
    Json(Value),
}

/// Fetch failure, distinguishing an expired session from every other failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The backend rejected the request because the session expired.
    SessionExpired {
        /// Requested resource.
        url: String,
    },
    /// Any other failure (transport, missing resource, undecodable body).
    Failure {
        /// Requested resource.
        url: String,
        /// Human readable cause.
        reason: String,
    },
}

impl FetchError {
    /// Returns the requested resource path.
    pub fn url(&self) -> &str {
        match self {
            Self::SessionExpired { url } | Self::Failure { url, .. } => url,
        }
    }

    /// Returns whether the failure was caused by an expired session.
    pub const fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionExpired { .. })
    }
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SessionExpired { url } => {
                write!(f, "must be signed in to access resource ({url})")
            }
            Self::Failure { url, reason } => write!(f, "request for ({url}) failed: {reason}"),
        }
    }
}

impl std::error::Error for FetchError {}

/// Host service that fetches bundle descriptors and controller templates.
pub trait ResourceLoader {
    /// Fetches `path` and decodes the body with `decoder`.
    fn fetch<'a>(
        &'a self,
        path: &'a str,
        decoder: Decoder,
    ) -> ResourceFuture<'a, Result<Fetched, FetchError>>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Loader for hosts without a backend; every fetch fails.
pub struct NoopResourceLoader;

impl ResourceLoader for NoopResourceLoader {
    fn fetch<'a>(
        &'a self,
        path: &'a str,
        _decoder: Decoder,
    ) -> ResourceFuture<'a, Result<Fetched, FetchError>> {
        Box::pin(async move {
            Err(FetchError::Failure {
                url: path.to_string(),
                reason: "no resource loader configured".to_string(),
            })
        })
    }
}

#[derive(Debug, Default)]
struct MemoryResources {
    bodies: HashMap<String, String>,
    expired: HashSet<String>,
    requests: Vec<String>,
}

#[derive(Debug, Clone, Default)]
/// In-memory loader keyed by resource path. Clones share the same resources.
pub struct MemoryResourceLoader {
    inner: Rc<RefCell<MemoryResources>>,
}

impl MemoryResourceLoader {
    /// Serves `body` for `path`.
    pub fn insert_text(&self, path: impl Into<String>, body: impl Into<String>) {
        self.inner
            .borrow_mut()
            .bodies
            .insert(path.into(), body.into());
    }

    /// Serves the serialized `value` for `path`.
    pub fn insert_json(&self, path: impl Into<String>, value: &Value) {
        self.insert_text(path, value.to_string());
    }

    /// Answers every later fetch of `path` with [`FetchError::SessionExpired`].
    pub fn expire(&self, path: impl Into<String>) {
        self.inner.borrow_mut().expired.insert(path.into());
    }

    /// Stops serving `path`.
    pub fn remove(&self, path: &str) {
        self.inner.borrow_mut().bodies.remove(path);
    }

    /// Returns every requested path in request order.
    pub fn requests(&self) -> Vec<String> {
        self.inner.borrow().requests.clone()
    }

    /// Returns how many times `path` was requested.
    pub fn request_count(&self, path: &str) -> usize {
        self.inner
            .borrow()
            .requests
            .iter()
            .filter(|requested| *requested == path)
            .count()
    }

    fn resolve(&self, path: &str, decoder: Decoder) -> Result<Fetched, FetchError> {
        let mut inner = self.inner.borrow_mut();
        inner.requests.push(path.to_string());
        if inner.expired.contains(path) {
            return Err(FetchError::SessionExpired {
                url: path.to_string(),
            });
        }
        let Some(body) = inner.bodies.get(path).cloned() else {
            return Err(FetchError::Failure {
                url: path.to_string(),
                reason: "not found".to_string(),
            });
        };
        match decoder {
            Decoder::Text => Ok(Fetched::Text(body)),
            Decoder::Json => serde_json::from_str(&body)
                .map(Fetched::Json)
                .map_err(|e| FetchError::Failure {
                    url: path.to_string(),
                    reason: e.to_string(),
                }),
        }
    }
}

impl ResourceLoader for MemoryResourceLoader {
    fn fetch<'a>(
        &'a self,
        path: &'a str,
        decoder: Decoder,
    ) -> ResourceFuture<'a, Result<Fetched, FetchError>> {
        Box::pin(async move { self.resolve(path, decoder) })
    }
}

/// Fetches `path` as text through a [`ResourceLoader`] implementation.
///
/// # Errors
///
/// Returns the loader's error, or a [`FetchError::Failure`] when the loader answered with JSON.
pub async fn fetch_text_with<L: ResourceLoader + ?Sized>(
    loader: &L,
    path: &str,
) -> Result<String, FetchError> {
    match loader.fetch(path, Decoder::Text).await? {
        Fetched::Text(text) => Ok(text),
        Fetched::Json(value) => Ok(value.to_string()),
    }
}

/// Fetches `path` as JSON and deserializes it through a [`ResourceLoader`] implementation.
///
/// # Errors
///
/// Returns the loader's error, or a [`FetchError::Failure`] when deserialization fails.
pub async fn fetch_json_with<L: ResourceLoader + ?Sized, T: DeserializeOwned>(
    loader: &L,
    path: &str,
) -> Result<T, FetchError> {
    let value = match loader.fetch(path, Decoder::Json).await? {
        Fetched::Json(value) => value,
        Fetched::Text(text) => {
            serde_json::from_str(&text).map_err(|e| FetchError::Failure {
                url: path.to_string(),
                reason: e.to_string(),
            })?
        }
    };
    serde_json::from_value(value).map_err(|e| FetchError::Failure {
        url: path.to_string(),
        reason: e.to_string(),
    })
}
