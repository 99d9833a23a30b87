//! Application lifecycle transitions over [`RuntimeState`].
//!
//! These functions mutate state synchronously and queue controller and delegate callbacks as
//! signals; [`crate::ApplicationManager`] drains the queue once the state borrow is released.

use std::collections::BTreeMap;

use surface_contract::{
    AppMenuSpec, ApplicationConfig, BundleId, ControllerConfig, InstalledApp, InstalledEntry,
    MenuGroup, SurfaceId, User, HTML_RENDERER,
};

use crate::{
    error::{CloseOutcome, RuntimeError},
    factory::make_surface,
    focus::{blur_topmost, focus_surface, focus_topmost},
    menus::AppMenu,
    model::{ApplicationInstance, ControllerKey, MenuId, SurfaceKind},
    state::{AppSignal, RuntimeState, Signal, SurfaceSignal},
};

/// Seeds the immutable system application set.
pub(crate) fn init(state: &mut RuntimeState, system_apps: BTreeMap<BundleId, InstalledApp>) {
    state.registered = system_apps.clone();
    state.system_apps = system_apps;
}

/// Rebuilds the registered set from the system set plus `apps`.
pub(crate) fn register_applications(
    state: &mut RuntimeState,
    apps: BTreeMap<BundleId, InstalledApp>,
) {
    let mut registered = state.system_apps.clone();
    for (bundle_id, app) in apps {
        if registered.contains_key(&bundle_id) {
            tracing::warn!(bundle_id = %bundle_id, "system applications may not be overwritten");
            continue;
        }
        if app.system {
            tracing::warn!(bundle_id = %bundle_id, "system applications may not be registered");
            continue;
        }
        registered.insert(bundle_id, app);
    }
    state.registered = registered;
}

/// Registered non-system applications, formatted for a list box.
pub(crate) fn installed(state: &RuntimeState) -> Vec<InstalledEntry> {
    state
        .registered
        .iter()
        .filter(|(_, app)| !app.system)
        .map(|(bundle_id, app)| {
            let display_name = match &app.icon {
                Some(icon) if !icon.is_empty() => format!(
                    "img:{}/{icon},{}",
                    state.config.bundle_path(bundle_id.as_str()),
                    app.name
                ),
                _ => app.name.clone(),
            };
            InstalledEntry {
                id: bundle_id.clone(),
                display_name,
            }
        })
        .collect()
}

/// Inserts a freshly loaded application and returns its object id.
pub(crate) fn insert_application(state: &mut RuntimeState, config: ApplicationConfig) -> u64 {
    let object_id = state.next_object_id();
    let app = ApplicationInstance::new(config, object_id);
    tracing::debug!(bundle_id = %app.bundle_id, object_id, "application loaded");
    state.apps.insert(app.bundle_id.clone(), app);
    object_id
}

/// Attaches the left-side menu group and the right-side app-menu affordance.
///
/// System applications receive neither. Passive applications receive only the left menu.
pub(crate) fn attach_menus(
    state: &mut RuntimeState,
    bundle_id: &BundleId,
    menus: Option<MenuGroup>,
    app_menu: Option<AppMenuSpec>,
) {
    let Some(app) = state.apps.get(bundle_id) else {
        return;
    };
    if app.system {
        return;
    }
    let group = menus.unwrap_or_else(|| {
        MenuGroup::default_for(&app.name, app.config.application.about.as_deref())
    });
    let menu_id = app.menu_id.clone();
    let switchable = app.is_switchable();
    state.os_bar.add_menu(menu_id, bundle_id.clone(), group);
    if switchable {
        let affordance = app_menu.map(AppMenu::from).unwrap_or(AppMenu::Button);
        state.os_bar.add_app_menu(bundle_id.clone(), affordance);
    }
}

/// Displays `bundle_id`'s left menu when the application may currently own it.
///
/// Returns `false` when the bundle is not loaded, is stopping, or is a non-passive application
/// that is not active.
pub(crate) fn switch_menu(state: &mut RuntimeState, bundle_id: &BundleId) -> bool {
    let Some(app) = state.apps.get(bundle_id) else {
        tracing::warn!(bundle_id = %bundle_id, "switch menu requested for an unloaded application");
        return false;
    };
    if app.stopping {
        return false;
    }
    if !app.passive && state.active_application.as_ref() != Some(bundle_id) {
        return false;
    }
    let menu_id = app.menu_id.clone();
    if state.os_bar.displayed() == Some(&menu_id) {
        return true;
    }
    state.os_bar.display(&menu_id);
    true
}

/// Blurs the active application: hides its menu and container and shows its app-menu button.
pub(crate) fn blur_active_application(state: &mut RuntimeState) {
    let Some(active) = state.active_application.take() else {
        return;
    };
    state.emit_app(&active, AppSignal::DidBlur);
    if let Some(app) = state.apps.get_mut(&active) {
        app.container_visible = false;
        let menu_id = app.menu_id.clone();
        state.os_bar.hide(&menu_id);
    }
    state.os_bar.set_app_menu_visible(&active, true);
}

/// Makes `bundle_id` the application in context.
///
/// # Errors
///
/// Returns [`RuntimeError::NotLoaded`] when the bundle is not loaded.
pub(crate) fn switch_to(state: &mut RuntimeState, bundle_id: &BundleId) -> Result<(), RuntimeError> {
    let Some(app) = state.apps.get(bundle_id) else {
        return Err(RuntimeError::NotLoaded(bundle_id.clone()));
    };
    if app.system {
        return Ok(());
    }
    let passive = app.passive;
    let menu_id = app.menu_id.clone();

    state.os_bar.hide_panels();

    if passive {
        if let Some(app) = state.apps.get_mut(bundle_id) {
            app.container_visible = true;
        }
        if let Some(top) = state.topmost_surface_of(bundle_id) {
            focus_surface(state, top)?;
        }
        return Ok(());
    }

    if state.active_application.as_ref() != Some(bundle_id) {
        blur_active_application(state);
    }
    state.active_application = Some(bundle_id.clone());
    state.os_bar.display(&menu_id);
    state.os_bar.set_app_menu_visible(bundle_id, false);
    if let Some(app) = state.apps.get_mut(bundle_id) {
        app.container_visible = true;
    }

    match state.topmost_surface_of(bundle_id) {
        None => {
            blur_topmost(state);
            switch_menu(state, bundle_id);
        }
        Some(top) => focus_surface(state, top)?,
    }

    state.emit_app(bundle_id, AppSignal::DidFocus);
    Ok(())
}

/// Tears an application down. Re-entrant calls for the same bundle are ignored.
pub(crate) fn close_application(state: &mut RuntimeState, bundle_id: &BundleId) -> CloseOutcome {
    let Some(app) = state.apps.get(bundle_id) else {
        tracing::warn!(bundle_id = %bundle_id, "close requested for an application that is not loaded");
        return CloseOutcome::NotLoaded;
    };
    if !state.closing.insert(bundle_id.clone()) {
        return CloseOutcome::AlreadyClosing;
    }
    let menu_id = app.menu_id.clone();
    let script_id = app.script_id.clone();

    state.os_bar.remove_menu(&menu_id);
    if let Some(script_id) = script_id {
        state.scripts.unregister(&script_id);
    }
    state.os_bar.remove_app_menu(bundle_id);

    stop_application(state, bundle_id);

    if let Some(app) = state.apps.get_mut(bundle_id) {
        app.container_visible = false;
    }
    state.closing.remove(bundle_id);
    state.apps.remove(bundle_id);
    state.os_bar.remove_owner(bundle_id);
    state.emit(Signal::ReleaseDelegate(bundle_id.clone()));

    if state.active_application.as_ref() == Some(bundle_id) {
        state.active_application = None;
    }

    if !focus_topmost(state) {
        if let Some(active) = state.active_application.clone() {
            if let Err(err) = switch_to(state, &active) {
                tracing::warn!(bundle_id = %active, error = %err, "failed to restore active application");
            }
        }
    }
    tracing::info!(bundle_id = %bundle_id, "application closed");
    CloseOutcome::Closed
}

/// Marks the application stopping, closes every launched surface, and queues
/// `application_did_stop`.
fn stop_application(state: &mut RuntimeState, bundle_id: &BundleId) {
    let Some(app) = state.apps.get_mut(bundle_id) else {
        return;
    };
    app.stopping = true;
    for id in app.surface_ids() {
        close_surface(state, id);
    }

    let unshown: Vec<SurfaceId> = state
        .surfaces
        .values()
        .filter(|surface| &surface.owner == bundle_id)
        .map(|surface| surface.id)
        .collect();
    for id in unshown {
        discard_surface(state, id);
    }
    state.emit_app(bundle_id, AppSignal::DidStop);
}

fn discard_surface(state: &mut RuntimeState, id: SurfaceId) {
    state.scripts.unregister(&id.to_string());
    if let Some(surface) = state.surfaces.remove(&id) {
        if let Some(app) = state.apps.get_mut(&surface.owner) {
            app.forget_surface(id);
        }
    }
}

/// Removes a partially loaded application without running its stop lifecycle.
pub(crate) fn rollback_application(state: &mut RuntimeState, bundle_id: &BundleId) {
    let Some(app) = state.apps.remove(bundle_id) else {
        return;
    };
    if let Some(script_id) = &app.script_id {
        state.scripts.unregister(script_id);
    }
    let owned: Vec<SurfaceId> = state
        .surfaces
        .values()
        .filter(|surface| &surface.owner == bundle_id)
        .map(|surface| surface.id)
        .collect();
    for id in owned {
        if state.stack.contains(id) {
            if let Err(err) = state.stack.remove(id) {
                tracing::warn!(surface_id = %id, error = %err, "failed to unstack surface");
            }
            state.emit(Signal::ReleaseController(id));
        }
        state.scripts.unregister(&id.to_string());
        state.surfaces.remove(&id);
    }
    state.os_bar.remove_owner(bundle_id);
    state.emit(Signal::ReleaseDelegate(bundle_id.clone()));
    if state.active_application.as_ref() == Some(bundle_id) {
        state.active_application = None;
    }
    tracing::warn!(bundle_id = %bundle_id, "rolled back partially loaded application");
}

/// Closes a shown surface and runs the owning application's unload bookkeeping.
pub(crate) fn close_surface(state: &mut RuntimeState, id: SurfaceId) {
    let Some(surface) = state.surfaces.get(&id) else {
        tracing::warn!(surface_id = %id, "attempting to close a surface that does not exist");
        return;
    };
    if !surface.shown {
        tracing::warn!(surface_id = %id, "attempting to close a surface that is not loaded");
        return;
    }
    let owner = surface.owner.clone();
    let menu_ref = surface.menu_ref.clone();

    state.emit_surface(id, SurfaceSignal::ViewWillUnload);
    state.emit(Signal::ReleaseController(id));
    if let Some(menu_id) = menu_ref {
        state.os_bar.remove_menu(&menu_id);
    }
    state.scripts.unregister(&id.to_string());
    state.surfaces.remove(&id);
    if let Err(err) = state.stack.remove(id) {
        tracing::warn!(surface_id = %id, error = %err, "closed surface was not stacked");
    }
    focus_topmost(state);

    surface_did_unload(state, &owner, id);
}

fn surface_did_unload(state: &mut RuntimeState, owner: &BundleId, id: SurfaceId) {
    let Some(app) = state.apps.get_mut(owner) else {
        return;
    };
    app.forget_surface(id);
    if !app.launched.is_empty() {
        return;
    }
    let quit = app.quit_automatically;
    let stopping = app.stopping;
    if quit {
        close_application(state, owner);
    }
    let still_running = state.apps.get(owner).is_some_and(|app| !app.stopping);
    if !stopping && still_running {
        state.emit_app(owner, AppSignal::DidCloseAllWindows);
    }
}

/// Result of resolving a controller request before any template fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LoadPlan {
    /// Singleton already launched.
    Existing(SurfaceId),
    /// Build from the cached template.
    Cached { template: String, modal: bool },
    /// Fetch `path`; `cache` when the template may be reused.
    Fetch {
        path: String,
        modal: bool,
        cache: bool,
    },
}

/// Validates a controller request and decides how its template is obtained.
///
/// # Errors
///
/// [`RuntimeError::NotLoaded`], [`RuntimeError::UnknownController`],
/// [`RuntimeError::EndpointRequired`], or [`RuntimeError::UnsupportedRenderer`].
pub(crate) fn plan_load(
    state: &mut RuntimeState,
    bundle_id: &BundleId,
    name: &str,
    endpoint: Option<&str>,
) -> Result<LoadPlan, RuntimeError> {
    let app = state
        .apps
        .get(bundle_id)
        .ok_or_else(|| RuntimeError::NotLoaded(bundle_id.clone()))?;
    let def = app
        .config
        .controller(name)
        .ok_or_else(|| RuntimeError::UnknownController {
            bundle_id: bundle_id.clone(),
            controller: name.to_string(),
        })?;
    let endpoint = endpoint.filter(|e| !e.is_empty());
    if def.remote && endpoint.is_none() {
        return Err(RuntimeError::EndpointRequired {
            controller: name.to_string(),
        });
    }

    if let Some(id) = app.launched.get(&ControllerKey::Singleton(name.to_string())) {
        let id = *id;
        if state.surfaces.get(&id).is_some_and(|s| s.shown) {
            focus_surface(state, id)?;
        }
        return Ok(LoadPlan::Existing(id));
    }

    let modal = def.modal;
    if def.path.is_none() && endpoint.is_none() {
        if let Some(template) = app.templates.get(name) {
            return Ok(LoadPlan::Cached {
                template: template.clone(),
                modal,
            });
        }
    }

    let renderer = def.renderer.as_deref().unwrap_or(HTML_RENDERER);
    if renderer != HTML_RENDERER {
        return Err(RuntimeError::UnsupportedRenderer {
            controller: name.to_string(),
            renderer: renderer.to_string(),
        });
    }

    let path = match (endpoint, &def.path) {
        (Some(endpoint), _) => endpoint.to_string(),
        (None, None) => state
            .config
            .controller_path(bundle_id.as_str(), name, renderer),
        (None, Some(path)) => path.clone(),
    };
    Ok(LoadPlan::Fetch {
        path,
        modal,
        cache: endpoint.is_none() && def.path.is_none(),
    })
}

/// Builds the surface for a resolved template and records it as launched in instance
/// `object_id`.
///
/// # Errors
///
/// [`RuntimeError::NotLoaded`] when the application closed, or was closed and reopened,
/// while the template was loading.
pub(crate) fn complete_load(
    state: &mut RuntimeState,
    bundle_id: &BundleId,
    object_id: u64,
    name: &str,
    template: &str,
    modal: bool,
    cache: bool,
) -> Result<SurfaceId, RuntimeError> {
    let app = state
        .apps
        .get_mut(bundle_id)
        .filter(|app| app.object_id == object_id)
        .ok_or_else(|| RuntimeError::NotLoaded(bundle_id.clone()))?;
    if cache {
        app.templates.insert(name.to_string(), template.to_string());
    }
    let singleton = app.config.controller(name).is_some_and(|def| def.singleton);
    if singleton {
        if let Some(id) = app.launched.get(&ControllerKey::Singleton(name.to_string())) {
            return Ok(*id);
        }
    }

    let kind = if modal {
        SurfaceKind::Modal
    } else {
        SurfaceKind::Window
    };
    let id = make_surface(state, bundle_id, name, kind, template);
    let key = if singleton {
        ControllerKey::Singleton(name.to_string())
    } else {
        ControllerKey::Surface(id)
    };
    if let Some(app) = state.apps.get_mut(bundle_id) {
        app.launched.insert(key, id);
    }
    Ok(id)
}

/// Attaches a controller configuration to a loaded application.
///
/// # Errors
///
/// [`RuntimeError::NotLoaded`] or [`RuntimeError::ControllerAlreadyConfigured`].
pub(crate) fn add_controller(
    state: &mut RuntimeState,
    bundle_id: &BundleId,
    name: &str,
    config: ControllerConfig,
) -> Result<(), RuntimeError> {
    let app = state
        .apps
        .get_mut(bundle_id)
        .ok_or_else(|| RuntimeError::NotLoaded(bundle_id.clone()))?;
    if app.config.controllers.contains_key(name) {
        return Err(RuntimeError::ControllerAlreadyConfigured {
            bundle_id: bundle_id.clone(),
            controller: name.to_string(),
        });
    }
    app.config.controllers.insert(name.to_string(), config);
    Ok(())
}

/// Marks a surface shown. Returns `true` when it already was.
///
/// # Errors
///
/// [`RuntimeError::MissingController`] when the surface does not exist.
pub(crate) fn mark_shown(state: &mut RuntimeState, id: SurfaceId) -> Result<bool, RuntimeError> {
    let surface = state
        .surfaces
        .get_mut(&id)
        .ok_or(RuntimeError::MissingController(id))?;
    let already = surface.shown;
    surface.shown = true;
    Ok(already)
}

/// Attaches a shown surface's menus, focuses it, and queues `view_did_load`.
///
/// # Errors
///
/// [`RuntimeError::MissingController`] when the surface does not exist.
pub(crate) fn attach_surface(
    state: &mut RuntimeState,
    id: SurfaceId,
    menus: Option<MenuGroup>,
) -> Result<(), RuntimeError> {
    let surface = state
        .surfaces
        .get_mut(&id)
        .ok_or(RuntimeError::MissingController(id))?;
    if let Some(group) = menus {
        let menu_id = MenuId::surface(id);
        surface.menu_ref = Some(menu_id.clone());
        let owner = surface.owner.clone();
        state.os_bar.add_menu(menu_id, owner, group);
    }
    focus_surface(state, id)?;
    state.emit_surface(id, SurfaceSignal::ViewDidLoad);
    Ok(())
}

/// Toggles fullscreen for a window. Returns the new fullscreen state.
///
/// # Errors
///
/// [`RuntimeError::MissingController`] when the surface does not exist.
pub(crate) fn toggle_zoom(state: &mut RuntimeState, id: SurfaceId) -> Result<bool, RuntimeError> {
    let surface = state
        .surfaces
        .get_mut(&id)
        .ok_or(RuntimeError::MissingController(id))?;
    if surface.is_modal() {
        return Ok(false);
    }
    if surface.fullscreen {
        surface.fullscreen = false;
        surface.position = surface.restore_position.take();
        return Ok(false);
    }
    focus_surface(state, id)?;
    if let Some(surface) = state.surfaces.get_mut(&id) {
        surface.restore_position = surface.position.take();
        surface.fullscreen = true;
    }
    Ok(true)
}

/// Queues `user_did_sign_in` for every shown surface of every loaded application.
pub(crate) fn sign_in_all(state: &mut RuntimeState, user: &User) {
    for id in shown_launched_surfaces(state) {
        state.emit_surface(id, SurfaceSignal::UserDidSignIn(user.clone()));
    }
}

/// Queues `user_did_sign_out` for every shown surface of every loaded application.
pub(crate) fn sign_out_all(state: &mut RuntimeState) {
    for id in shown_launched_surfaces(state) {
        state.emit_surface(id, SurfaceSignal::UserDidSignOut);
    }
}

fn shown_launched_surfaces(state: &RuntimeState) -> Vec<SurfaceId> {
    state
        .apps
        .values()
        .flat_map(|app| app.launched.values().copied())
        .filter(|id| state.surfaces.get(id).is_some_and(|s| s.shown))
        .collect()
}

/// Closes every loaded application matching `filter`.
pub(crate) fn close_where(
    state: &mut RuntimeState,
    filter: impl Fn(&ApplicationInstance) -> bool,
) -> Vec<BundleId> {
    let targets: Vec<BundleId> = state
        .apps
        .values()
        .filter(|app| filter(app))
        .map(|app| app.bundle_id.clone())
        .collect();
    targets
        .into_iter()
        .filter(|bundle_id| close_application(state, bundle_id) == CloseOutcome::Closed)
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::testing::{drain, load_test_app, test_state};

    fn object_id(state: &RuntimeState, app: &BundleId) -> u64 {
        state.apps.get(app).map(|a| a.object_id).expect("loaded")
    }

    fn window(state: &mut RuntimeState, app: &BundleId) -> SurfaceId {
        let object_id = object_id(state, app);
        let id = complete_load(state, app, object_id, "Main", "<div/>", false, false)
            .expect("loaded");
        mark_shown(state, id).expect("exists");
        attach_surface(state, id, None).expect("attached");
        id
    }

    #[test]
    fn installed_formats_icons_and_hides_system_apps() {
        let mut state = test_state();
        let mut system = BTreeMap::new();
        system.insert(
            BundleId::trusted("io.bithead.boss"),
            InstalledApp::new("BOSS").system(),
        );
        init(&mut state, system);

        let mut apps = BTreeMap::new();
        apps.insert(
            BundleId::trusted("io.bithead.wordy"),
            InstalledApp::new("Wordy").with_icon("icon.svg"),
        );
        apps.insert(BundleId::trusted("io.bithead.plain"), InstalledApp::new("Plain"));
        apps.insert(BundleId::trusted("io.bithead.boss"), InstalledApp::new("Fake"));
        apps.insert(
            BundleId::trusted("io.bithead.sneaky"),
            InstalledApp::new("Sneaky").system(),
        );
        register_applications(&mut state, apps);

        let entries: Vec<(String, String)> = installed(&state)
            .into_iter()
            .map(|e| (e.id.to_string(), e.display_name))
            .collect();
        assert_eq!(
            entries,
            vec![
                ("io.bithead.plain".to_string(), "Plain".to_string()),
                (
                    "io.bithead.wordy".to_string(),
                    "img:/boss/app/io.bithead.wordy/icon.svg,Wordy".to_string()
                ),
            ]
        );
        assert_eq!(state.registered[&BundleId::trusted("io.bithead.boss")].name, "BOSS");
    }

    #[test]
    fn switch_menu_refuses_inactive_non_passive_apps() {
        let mut state = test_state();
        let wordy = load_test_app(&mut state, "io.bithead.wordy", false);
        let player = load_test_app(&mut state, "io.bithead.player", true);

        assert!(!switch_menu(&mut state, &wordy));
        assert!(switch_menu(&mut state, &player));
        assert!(!switch_menu(&mut state, &BundleId::trusted("io.bithead.ghost")));

        state.active_application = Some(wordy.clone());
        assert!(switch_menu(&mut state, &wordy));
        assert_eq!(state.os_bar().displayed(), Some(&MenuId::application(&wordy)));
        assert!(!state.os_bar().is_visible(&MenuId::application(&player)));
    }

    #[test]
    fn switching_with_zero_surfaces_blurs_the_top_window() {
        let mut state = test_state();
        let a = load_test_app(&mut state, "io.bithead.alpha", false);
        let b = load_test_app(&mut state, "io.bithead.beta", false);
        switch_to(&mut state, &a).expect("switch a");
        let wa = window(&mut state, &a);
        drain(&mut state);

        switch_to(&mut state, &b).expect("switch b");
        assert_eq!(state.active_application(), Some(&b));
        assert!(!state.surface(wa).is_some_and(|s| s.is_focused()));
        assert_eq!(state.os_bar().displayed(), Some(&MenuId::application(&b)));
        assert!(state.os_bar().app_menu(&a).is_some_and(|slot| slot.visible));
        assert!(state.os_bar().app_menu(&b).is_some_and(|slot| !slot.visible));
        assert_eq!(
            drain(&mut state),
            vec![
                Signal::Application(a.clone(), AppSignal::DidBlur),
                Signal::Surface(wa, SurfaceSignal::ViewDidBlur),
                Signal::Application(b.clone(), AppSignal::DidFocus),
            ]
        );
    }

    #[test]
    fn close_application_twice_tears_down_once() {
        let mut state = test_state();
        let a = load_test_app(&mut state, "io.bithead.alpha", false);
        switch_to(&mut state, &a).expect("switch");
        let wa = window(&mut state, &a);
        drain(&mut state);

        assert_eq!(close_application(&mut state, &a), CloseOutcome::Closed);
        assert_eq!(close_application(&mut state, &a), CloseOutcome::NotLoaded);
        assert_eq!(state.active_application(), None);
        assert!(state.stack().windows().is_empty());
        assert!(state.os_bar().menu(&MenuId::application(&a)).is_none());
        assert!(state.os_bar().app_menu(&a).is_none());
        assert_eq!(
            drain(&mut state),
            vec![
                Signal::Surface(wa, SurfaceSignal::ViewWillUnload),
                Signal::ReleaseController(wa),
                Signal::Application(a.clone(), AppSignal::DidStop),
                Signal::ReleaseDelegate(a.clone()),
            ]
        );
    }

    #[test]
    fn nested_close_reports_already_closing() {
        let mut state = test_state();
        let a = load_test_app(&mut state, "io.bithead.alpha", false);
        state.closing.insert(a.clone());
        assert_eq!(close_application(&mut state, &a), CloseOutcome::AlreadyClosing);
        assert!(state.is_loaded(&a));
    }

    #[test]
    fn closing_the_last_window_signals_close_all_windows() {
        let mut state = test_state();
        let a = load_test_app(&mut state, "io.bithead.alpha", false);
        switch_to(&mut state, &a).expect("switch");
        let wa = window(&mut state, &a);
        drain(&mut state);

        close_surface(&mut state, wa);
        assert!(state.is_loaded(&a));
        assert_eq!(
            drain(&mut state),
            vec![
                Signal::Surface(wa, SurfaceSignal::ViewWillUnload),
                Signal::ReleaseController(wa),
                Signal::Application(a.clone(), AppSignal::DidCloseAllWindows),
            ]
        );

        close_surface(&mut state, wa);
        assert!(drain(&mut state).is_empty(), "second close is a no-op");
    }

    #[test]
    fn zoom_round_trip_restores_position() {
        let mut state = test_state();
        let a = load_test_app(&mut state, "io.bithead.alpha", false);
        switch_to(&mut state, &a).expect("switch");
        let wa = window(&mut state, &a);
        let before = state.surface(wa).and_then(|s| s.position);

        assert_eq!(toggle_zoom(&mut state, wa), Ok(true));
        assert_eq!(state.surface(wa).and_then(|s| s.position), None);
        assert_eq!(toggle_zoom(&mut state, wa), Ok(false));
        assert_eq!(state.surface(wa).and_then(|s| s.position), before);
        assert_eq!(
            toggle_zoom(&mut state, SurfaceId(99)),
            Err(RuntimeError::MissingController(SurfaceId(99)))
        );
    }

    #[test]
    fn plan_load_validates_controller_requests() {
        let mut state = test_state();
        let a = load_test_app(&mut state, "io.bithead.alpha", false);
        add_controller(
            &mut state,
            &a,
            "Remote",
            ControllerConfig {
                remote: true,
                ..ControllerConfig::default()
            },
        )
        .expect("added");
        add_controller(
            &mut state,
            &a,
            "Game",
            ControllerConfig {
                renderer: Some("godot".to_string()),
                ..ControllerConfig::default()
            },
        )
        .expect("added");

        assert!(matches!(
            plan_load(&mut state, &a, "Nope", None),
            Err(RuntimeError::UnknownController { .. })
        ));
        assert!(matches!(
            plan_load(&mut state, &a, "Remote", None),
            Err(RuntimeError::EndpointRequired { .. })
        ));
        assert_eq!(
            plan_load(&mut state, &a, "Remote", Some("/api/doc/7")),
            Ok(LoadPlan::Fetch {
                path: "/api/doc/7".to_string(),
                modal: false,
                cache: false,
            })
        );
        assert!(matches!(
            plan_load(&mut state, &a, "Game", None),
            Err(RuntimeError::UnsupportedRenderer { .. })
        ));
        assert_eq!(
            plan_load(&mut state, &a, "Main", None),
            Ok(LoadPlan::Fetch {
                path: "/boss/app/io.bithead.alpha/controller/Main.html".to_string(),
                modal: false,
                cache: true,
            })
        );
        assert!(matches!(
            add_controller(&mut state, &a, "Main", ControllerConfig::default()),
            Err(RuntimeError::ControllerAlreadyConfigured { .. })
        ));
    }
    #[test]
    fn surface_menus_are_a_separate_group_that_follows_focus() {
        let mut state = test_state();
        let a = load_test_app(&mut state, "io.bithead.alpha", false);
        switch_to(&mut state, &a).expect("switch");
        let first = window(&mut state, &a);
        let object_id = object_id(&state, &a);
        let editor = complete_load(&mut state, &a, object_id, "Main", "<div/>", false, false)
            .expect("loaded");
        mark_shown(&mut state, editor).expect("exists");
        attach_surface(&mut state, editor, Some(MenuGroup::default_for("Edit", None)))
            .expect("attached");

        let surface_menu = MenuId::surface(editor);
        assert_eq!(surface_menu.to_string(), format!("Menu_{editor}"));
        assert!(state.os_bar().is_visible(&surface_menu));
        assert_eq!(state.os_bar().displayed(), Some(&MenuId::application(&a)));

        focus_surface(&mut state, first).expect("refocus");
        assert!(!state.os_bar().is_visible(&surface_menu));
        assert!(state.os_bar().menu(&surface_menu).is_some());

        close_surface(&mut state, editor);
        assert!(state.os_bar().menu(&surface_menu).is_none());
        assert!(state.os_bar().is_visible(&MenuId::application(&a)));
    }

    #[test]
    fn template_for_a_replaced_instance_is_discarded() {
        let mut state = test_state();
        let a = load_test_app(&mut state, "io.bithead.alpha", false);
        let stale = object_id(&state, &a);
        assert_eq!(close_application(&mut state, &a), CloseOutcome::Closed);
        load_test_app(&mut state, "io.bithead.alpha", false);
        drain(&mut state);

        assert_eq!(
            complete_load(&mut state, &a, stale, "Main", "<div/>", false, true),
            Err(RuntimeError::NotLoaded(a.clone()))
        );
        assert_eq!(state.surfaces().count(), 0);
        let app = state.apps.get(&a).expect("reopened");
        assert!(app.launched.is_empty());
        assert!(app.templates.is_empty());
    }
}
