//! Fixtures shared by the unit tests.

use serde_json::json;
use surface_contract::{ApplicationConfig, BundleId};

use crate::{
    applications::{attach_menus, insert_application},
    config::RuntimeConfig,
    state::{RuntimeState, Signal},
};

pub(crate) fn test_state() -> RuntimeState {
    RuntimeState::new(RuntimeConfig::default())
}

/// Loads an application with a single `Main` controller and default menus.
pub(crate) fn load_test_app(state: &mut RuntimeState, bundle: &str, passive: bool) -> BundleId {
    let config: ApplicationConfig = serde_json::from_value(json!({
        "application": { "bundleId": bundle, "name": bundle, "passive": passive },
        "controllers": { "Main": {} }
    }))
    .expect("fixture descriptor");
    let bundle_id = config.application.bundle_id.clone();
    insert_application(state, config);
    attach_menus(state, &bundle_id, None, None);
    bundle_id
}

pub(crate) fn drain(state: &mut RuntimeState) -> Vec<Signal> {
    state.signals.drain(..).collect()
}
