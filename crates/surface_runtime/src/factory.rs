//! Builds window and modal surfaces from controller templates.

use surface_contract::{BundleId, SurfaceId, APPLICATION_CONTROLLER};

use crate::{
    config::RuntimeConfig,
    model::{FocusState, Point, Surface, SurfaceKind},
    state::RuntimeState,
    template::{extract_scripts, interpolate, interpolate_controller_refs, TemplateAttributes},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// Repeating diagonal offset for new windows.
pub struct Stagger {
    step: u32,
}

impl Stagger {
    /// Advances to the next step (wrapping to 1 after the last) and returns its position.
    pub fn next_position(&mut self, config: &RuntimeConfig) -> Point {
        self.step += 1;
        if self.step > config.stagger_steps {
            self.step = 1;
        }
        let offset = self.step as i32 * config.stagger_step_px;
        Point {
            top: config.stagger_top_inset + offset,
            left: config.stagger_left_inset + offset,
        }
    }
}

fn base_attributes(config: &RuntimeConfig, bundle_id: &BundleId) -> TemplateAttributes {
    let mut attrs = TemplateAttributes::default();
    attrs
        .set("app", "bundleId", bundle_id.as_str())
        .set("app", "resourcePath", config.bundle_path(bundle_id.as_str()))
        .set("os", "environment", config.host.environment.as_str())
        .set("os", "host", config.host.host.as_str())
        .set("os", "email", config.host.email.as_str())
        .set("os", "phone", config.host.phone.as_str());
    attrs
}

/// Attribute set for a controller template rendered as `surface_id`.
pub fn surface_attributes(
    config: &RuntimeConfig,
    bundle_id: &BundleId,
    controller: &str,
    surface_id: SurfaceId,
) -> TemplateAttributes {
    let mut attrs = base_attributes(config, bundle_id);
    attrs
        .set("app", "controller", format!("os.application('{bundle_id}')"))
        .set("this", "id", surface_id.to_string())
        .set("this", "controller", format!("os.ui.controller.{surface_id}"))
        .set("this", "name", controller);
    attrs
}

/// Interpolates `template`, registers its script fragments, and stores an unshown surface.
///
/// Windows receive the next stagger position; modals are left for the host to center.
pub fn make_surface(
    state: &mut RuntimeState,
    owner: &BundleId,
    controller: &str,
    kind: SurfaceKind,
    template: &str,
) -> SurfaceId {
    let id = state.next_surface_id();
    let attrs = surface_attributes(&state.config, owner, controller, id);
    let rendered = interpolate_controller_refs(&interpolate(template, &attrs));
    let (markup, sources) = extract_scripts(&rendered);
    let fragments = state
        .scripts
        .register_surface(id, owner, controller, sources);
    let position = match kind {
        SurfaceKind::Window => Some(state.stagger.next_position(&state.config)),
        SurfaceKind::Modal => None,
    };
    tracing::debug!(
        bundle_id = %owner,
        surface_id = %id,
        controller,
        modal = kind.is_modal(),
        scripts = fragments.len(),
        "surface created"
    );
    state.surfaces.insert(
        id,
        Surface {
            id,
            owner: owner.clone(),
            controller_name: controller.to_string(),
            kind,
            focus: FocusState::Unfocused,
            position,
            restore_position: None,
            fullscreen: false,
            markup,
            menu_ref: None,
            shown: false,
        },
    );
    id
}

/// Interpolates an `Application` template and registers its scripts under a new
/// `AppScript_<n>` group. Returns the stripped markup and the group id when scripts exist.
pub fn prepare_application_template(
    state: &mut RuntimeState,
    owner: &BundleId,
    template: &str,
) -> (String, Option<String>) {
    let mut attrs = base_attributes(&state.config, owner);
    attrs
        .set("this", "controller", format!("os.application('{owner}').proxy"))
        .set("this", "name", APPLICATION_CONTROLLER);
    let rendered = interpolate_controller_refs(&interpolate(template, &attrs));
    let (markup, sources) = extract_scripts(&rendered);
    if sources.is_empty() {
        return (markup, None);
    }
    let group = state.scripts.register_application(owner, sources);
    (markup, Some(group))
}
