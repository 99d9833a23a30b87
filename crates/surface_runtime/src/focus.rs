//! Focus ownership, blur propagation, and keyboard routing.

use surface_contract::{Key, SurfaceId};

use crate::{
    applications::switch_menu,
    error::RuntimeError,
    model::FocusState,
    state::{RuntimeState, SurfaceSignal},
};

#[derive(Debug, Clone, PartialEq, Eq)]
/// Where a key event went.
pub struct KeyRouting {
    /// Top modal, else top window.
    pub target: Option<SurfaceId>,
    /// The target was focused and its controller was signalled.
    pub delivered: bool,
    /// The host must suppress the platform default action.
    pub prevent_default: bool,
}

/// Marks `id` focused, shows its surface menus, and queues `view_did_focus`.
pub(crate) fn did_focus(state: &mut RuntimeState, id: SurfaceId) {
    let Some(surface) = state.surfaces.get_mut(&id) else {
        return;
    };
    if surface.focus == FocusState::Focused {
        return;
    }
    surface.focus = FocusState::Focused;
    if let Some(menu_id) = surface.menu_ref.clone() {
        state.os_bar.set_menu_visible(&menu_id, true);
    }
    state.emit_surface(id, SurfaceSignal::ViewDidFocus);
}

/// Marks `id` blurred, queues `view_did_blur`, and hides its surface menus.
pub(crate) fn did_blur(state: &mut RuntimeState, id: SurfaceId) {
    let Some(surface) = state.surfaces.get_mut(&id) else {
        return;
    };
    if surface.focus != FocusState::Focused {
        return;
    }
    surface.focus = FocusState::Blurred;
    let menu_ref = surface.menu_ref.clone();
    state.emit_surface(id, SurfaceSignal::ViewDidBlur);
    if let Some(menu_id) = menu_ref {
        state.os_bar.set_menu_visible(&menu_id, false);
    }
}

fn hide_app_button(state: &mut RuntimeState, id: SurfaceId) {
    let Some(owner) = state.surfaces.get(&id).map(|s| s.owner.clone()) else {
        return;
    };
    if state.apps.get(&owner).is_some_and(|app| app.is_switchable()) {
        state.os_bar.set_app_menu_visible(&owner, false);
    }
}

/// Focuses `id` and raises it to the top of its stack.
///
/// Modals are stacked on first focus and focused immediately. A window that is already on top
/// is a no-op unless it was left blurred by a removal above it.
///
/// # Errors
///
/// Returns [`RuntimeError::MissingController`] when `id` is not a live surface.
pub(crate) fn focus_surface(state: &mut RuntimeState, id: SurfaceId) -> Result<(), RuntimeError> {
    let (owner, is_modal, focus) = match state.surfaces.get(&id) {
        Some(surface) => (surface.owner.clone(), surface.is_modal(), surface.focus),
        None => return Err(RuntimeError::MissingController(id)),
    };

    if is_modal {
        if !state.stack.contains(id) {
            state.stack.add(id, true);
        }
        did_focus(state, id);
        return Ok(());
    }

    if state.stack.is_topmost_window(id) {
        if focus != FocusState::Focused && switch_menu(state, &owner) {
            hide_app_button(state, id);
        }
        did_focus(state, id);
        return Ok(());
    }

    if let Some(top) = state.stack.topmost_window() {
        did_blur(state, top);
        let top_owner = state.surfaces.get(&top).map(|s| s.owner.clone());
        if let Some(top_owner) = top_owner.filter(|o| o != &owner) {
            state.os_bar.set_app_menu_visible(&top_owner, true);
        }
    }

    if state.stack.contains(id) {
        if let Err(err) = state.stack.remove(id) {
            tracing::warn!(surface_id = %id, error = %err, "failed to lift surface");
        }
    }
    state.stack.add(id, false);

    if switch_menu(state, &owner) {
        hide_app_button(state, id);
    }
    did_focus(state, id);
    Ok(())
}

/// Blurs the top window, if any.
pub(crate) fn blur_topmost(state: &mut RuntimeState) {
    if let Some(top) = state.stack.topmost_window() {
        did_blur(state, top);
    }
}

/// Focuses the highest window whose application can currently display its menu.
///
/// Returns `false` when no such window exists.
pub(crate) fn focus_topmost(state: &mut RuntimeState) -> bool {
    for id in state.stack.windows_top_down() {
        let Some(owner) = state.surfaces.get(&id).map(|s| s.owner.clone()) else {
            continue;
        };
        if switch_menu(state, &owner) {
            hide_app_button(state, id);
            did_focus(state, id);
            return true;
        }
    }
    false
}

/// Routes a key to the top modal, else the top window. Unfocused targets ignore it.
pub(crate) fn dispatch_key(state: &mut RuntimeState, key: &Key) -> KeyRouting {
    let prevent_default = matches!(key, Key::Enter);
    let target = state.stack.topmost();
    let delivered = match target {
        Some(id) if state.surfaces.get(&id).is_some_and(|s| s.is_focused()) => {
            let signal = match key {
                Key::Enter => SurfaceSignal::DidHitEnter,
                Key::Other(name) => SurfaceSignal::DidHitKey(name.clone()),
            };
            state.emit_surface(id, signal);
            true
        }
        _ => false,
    };
    KeyRouting {
        target,
        delivered,
        prevent_default,
    }
}
