//! Shared contract types between the surface runtime and the applications it hosts.
//!
//! Applications describe themselves with an [`ApplicationConfig`] (the `application.json`
//! bundle descriptor) and implement the optional [`SurfaceController`] and
//! [`ApplicationDelegate`] callbacks. Every callback has a no-op default so an app only
//! implements what it needs.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

mod controller;
mod descriptor;
mod menu;

use serde::{Deserialize, Serialize};

pub use controller::{ApplicationDelegate, MainController, SurfaceController};
pub use descriptor::{
    ApplicationConfig, ApplicationDescriptor, ControllerConfig, InstalledApp, InstalledEntry,
    APPLICATION_CONTROLLER, HTML_RENDERER,
};
pub use menu::{AppMenuSpec, Menu, MenuAction, MenuGroup, MenuItem};

/// Stable identifier for an application bundle (for example `io.bithead.boss`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BundleId(String);

impl BundleId {
    /// Returns a bundle id when `raw` conforms to the `segment.segment...` policy.
    pub fn new(raw: impl Into<String>) -> Result<Self, String> {
        let raw = raw.into();
        if is_valid_bundle_id(&raw) {
            Ok(Self(raw))
        } else {
            Err(format!(
                "invalid bundle id `{raw}`; expected namespaced dotted segments"
            ))
        }
    }

    /// Returns the string form of the identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Creates an id without validation for trusted constants.
    pub fn trusted(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }
}

impl std::fmt::Display for BundleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn is_valid_bundle_id(raw: &str) -> bool {
    if raw.is_empty() || raw.len() > 120 {
        return false;
    }

    let mut count = 0usize;
    for part in raw.split('.') {
        count += 1;
        if part.is_empty() || part.len() > 48 {
            return false;
        }
        let bytes = part.as_bytes();
        if !bytes[0].is_ascii_lowercase() {
            return false;
        }
        if !bytes
            .iter()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'-')
        {
            return false;
        }
        if part.ends_with('-') {
            return false;
        }
    }

    count >= 2
}

/// Process-unique identifier for a window or modal surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SurfaceId(pub u64);

impl std::fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Window_{:06}", self.0)
    }
}

/// Signed-in user forwarded to controllers through `user_did_sign_in`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Backend user id.
    pub id: u64,
    /// User email address.
    pub email: String,
    /// Display name.
    #[serde(default)]
    pub full_name: String,
}

/// A key press routed to the topmost surface.
///
/// `Enter` is a distinct channel from every other key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// The commit key.
    Enter,
    /// Any other key, by its platform name (for example `Escape` or `a`).
    Other(String),
}

impl Key {
    /// Maps a platform key name to a [`Key`].
    pub fn from_name(name: &str) -> Self {
        if name == "Enter" {
            Self::Enter
        } else {
            Self::Other(name.to_string())
        }
    }

    /// Returns the platform key name.
    pub fn name(&self) -> &str {
        match self {
            Self::Enter => "Enter",
            Self::Other(name) => name,
        }
    }
}
