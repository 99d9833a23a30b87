//! Application bundle descriptor (`application.json`) and registered-app listing models.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::BundleId;

/// Controller name reserved for the application delegate template.
pub const APPLICATION_CONTROLLER: &str = "Application";

/// The only renderer the runtime knows how to build surfaces from.
pub const HTML_RENDERER: &str = "html";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Full bundle descriptor fetched from `<root>/<bundle>/application.json`.
pub struct ApplicationConfig {
    /// Application-level attributes.
    pub application: ApplicationDescriptor,
    /// Controllers the application may load, keyed by controller name.
    #[serde(default)]
    pub controllers: BTreeMap<String, ControllerConfig>,
}

impl ApplicationConfig {
    /// Returns whether the bundle declares an application delegate controller.
    pub fn has_application_controller(&self) -> bool {
        self.controllers.contains_key(APPLICATION_CONTROLLER)
    }

    /// Returns a controller definition by name.
    pub fn controller(&self, name: &str) -> Option<&ControllerConfig> {
        self.controllers.get(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// The `application` object of a bundle descriptor.
pub struct ApplicationDescriptor {
    /// Bundle id; must match the id the bundle was opened with.
    pub bundle_id: BundleId,
    /// Human readable name.
    pub name: String,
    /// Icon file relative to the bundle resource path.
    #[serde(default)]
    pub icon: Option<String>,
    /// Entry controller name.
    #[serde(default)]
    pub main: Option<String>,
    /// Bundle version string.
    #[serde(default)]
    pub version: Option<String>,
    /// Secure apps are closed when the user signs out.
    #[serde(default)]
    pub secure: bool,
    /// System apps are always passive and carry no menu affordances.
    #[serde(default)]
    pub system: bool,
    /// Passive apps never become the active application.
    #[serde(default)]
    pub passive: bool,
    /// Controller shown by the default menu's `About` entry.
    #[serde(default)]
    pub about: Option<String>,
    /// Close the application when its last surface closes.
    #[serde(default)]
    pub quit_automatically: bool,
    /// Endpoint used when loading the `main` controller.
    #[serde(default)]
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Per-controller entry of a bundle descriptor.
pub struct ControllerConfig {
    /// Server-side path of the controller template; disables template caching.
    #[serde(default)]
    pub path: Option<String>,
    /// Template renderer; only `html` is supported.
    #[serde(default)]
    pub renderer: Option<String>,
    /// The caller must supply an endpoint when loading this controller.
    #[serde(default)]
    pub remote: bool,
    /// Only one surface may exist for this controller at a time.
    #[serde(default)]
    pub singleton: bool,
    /// Build a modal instead of a window.
    #[serde(default)]
    pub modal: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Registration record for an application the user may open.
pub struct InstalledApp {
    /// Human readable name.
    pub name: String,
    /// Icon file relative to the bundle resource path.
    #[serde(default)]
    pub icon: Option<String>,
    /// System apps may only be seeded, never registered.
    #[serde(default)]
    pub system: bool,
}

impl InstalledApp {
    /// Creates a non-system registration.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            icon: None,
            system: false,
        }
    }

    /// Sets the icon file name.
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Marks the registration as a system app.
    pub fn system(mut self) -> Self {
        self.system = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Entry returned by the installed-applications listing.
pub struct InstalledEntry {
    /// Bundle id.
    pub id: BundleId,
    /// List label; carries an `img:<path>,<name>` prefix when the app has an icon.
    pub display_name: String,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn descriptor_defaults_optional_flags_to_false() {
        let config: ApplicationConfig = serde_json::from_value(json!({
            "application": {
                "bundleId": "io.bithead.wordy",
                "name": "Wordy",
                "main": "Main",
                "quitAutomatically": true
            },
            "controllers": {
                "Main": {},
                "Detail": { "remote": true, "singleton": true }
            }
        }))
        .expect("descriptor parses");

        let app = &config.application;
        assert_eq!(app.bundle_id.as_str(), "io.bithead.wordy");
        assert!(!app.system && !app.passive && !app.secure);
        assert!(app.quit_automatically);
        assert_eq!(config.controller("Main"), Some(&ControllerConfig::default()));
        let detail = config.controller("Detail").expect("detail controller");
        assert!(detail.remote && detail.singleton && !detail.modal);
        assert!(!config.has_application_controller());
    }

    #[test]
    fn descriptor_ignores_unknown_fields() {
        let config: ApplicationConfig = serde_json::from_value(json!({
            "application": {
                "bundleId": "io.bithead.boss",
                "name": "BOSS",
                "system": true,
                "copyright": "ignored"
            },
            "controllers": { "Application": { "renderer": "html" } }
        }))
        .expect("descriptor parses");
        assert!(config.application.system);
        assert!(config.has_application_controller());
    }
}
