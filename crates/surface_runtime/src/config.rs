//! Runtime tuning knobs, loadable from TOML.

use serde::{Deserialize, Serialize};

use crate::error::RuntimeError;

/// Stacking, stagger, and resource-path configuration for one runtime instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// z-index of the bottom window; window `i` sits at `window_base_z + i`.
    pub window_base_z: u32,
    /// z-index of the bottom modal; always above every window.
    pub modal_base_z: u32,
    /// Pixels added to both insets per stagger step.
    pub stagger_step_px: i32,
    /// Number of stagger steps before wrapping back to step 1.
    pub stagger_steps: u32,
    /// Top inset below the OS bar.
    pub stagger_top_inset: i32,
    /// Left inset.
    pub stagger_left_inset: i32,
    /// Root path under which bundles are served.
    pub resource_root: String,
    /// Values exposed to templates as `$(os.*)`.
    pub host: HostAttributes,
}

/// Host facts interpolated into every template under the `os` group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostAttributes {
    /// `dev` or `prod`.
    pub environment: String,
    /// Root URL the desktop is served from.
    pub host: String,
    /// Contact address shown by system dialogs.
    pub email: String,
    /// Contact phone shown by system dialogs.
    pub phone: String,
}

impl Default for HostAttributes {
    fn default() -> Self {
        Self {
            environment: "prod".to_string(),
            host: "https://localhost".to_string(),
            email: String::new(),
            phone: String::new(),
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            window_base_z: 10,
            modal_base_z: 1999,
            stagger_step_px: 10,
            stagger_steps: 5,
            stagger_top_inset: 40,
            stagger_left_inset: 10,
            resource_root: "/boss/app".to_string(),
            host: HostAttributes::default(),
        }
    }
}

impl RuntimeConfig {
    /// Parses and validates a TOML document; missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::InvalidConfig`] when the document does not parse or fails
    /// validation.
    pub fn from_toml_str(raw: &str) -> Result<Self, RuntimeError> {
        let config: Self = toml::from_str(raw).map_err(|e| RuntimeError::InvalidConfig {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the stacking and stagger invariants.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::InvalidConfig`] when modals would not sit above windows or the
    /// stagger cycle is empty.
    pub fn validate(&self) -> Result<(), RuntimeError> {
        if self.modal_base_z <= self.window_base_z {
            return Err(RuntimeError::InvalidConfig {
                reason: format!(
                    "modal_base_z ({}) must be above window_base_z ({})",
                    self.modal_base_z, self.window_base_z
                ),
            });
        }
        if self.stagger_steps == 0 {
            return Err(RuntimeError::InvalidConfig {
                reason: "stagger_steps must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Resource path of a bundle, e.g. `/boss/app/io.bithead.boss`.
    pub fn bundle_path(&self, bundle_id: &str) -> String {
        format!("{}/{bundle_id}", self.resource_root.trim_end_matches('/'))
    }

    /// Path of a bundle's `application.json`.
    pub fn descriptor_path(&self, bundle_id: &str) -> String {
        format!("{}/application.json", self.bundle_path(bundle_id))
    }

    /// Default path of a controller template.
    pub fn controller_path(&self, bundle_id: &str, controller: &str, renderer: &str) -> String {
        format!(
            "{}/controller/{controller}.{renderer}",
            self.bundle_path(bundle_id)
        )
    }
}
