//! The single mutable runtime state shared by the stack, focus, and lifecycle functions.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use surface_contract::{BundleId, InstalledApp, SurfaceId, User};

use crate::{
    config::RuntimeConfig,
    factory::Stagger,
    menus::OsBar,
    model::{ApplicationInstance, ApplicationState, Surface},
    scripts::ScriptRegistry,
    stack::StackRegistry,
};

#[derive(Debug, Clone, PartialEq, Eq)]
/// Callback queued for a surface controller.
pub(crate) enum SurfaceSignal {
    ViewDidLoad,
    ViewWillUnload,
    ViewDidFocus,
    ViewDidBlur,
    DidHitKey(String),
    DidHitEnter,
    UserDidSignIn(User),
    UserDidSignOut,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Callback queued for an application delegate.
pub(crate) enum AppSignal {
    DidStart,
    DidFocus,
    DidBlur,
    DidStop,
    DidCloseAllWindows,
    DidSelectCommand(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Deferred work produced by state transitions and drained by the manager after the state
/// borrow is released.
pub(crate) enum Signal {
    Surface(SurfaceId, SurfaceSignal),
    Application(BundleId, AppSignal),
    ReleaseController(SurfaceId),
    ReleaseDelegate(BundleId),
}

#[derive(Debug)]
/// Window stack, modal stack, loaded applications, and OS-bar state for one desktop.
pub struct RuntimeState {
    pub(crate) config: RuntimeConfig,
    pub(crate) stack: StackRegistry,
    pub(crate) surfaces: BTreeMap<SurfaceId, Surface>,
    pub(crate) apps: BTreeMap<BundleId, ApplicationInstance>,
    pub(crate) system_apps: BTreeMap<BundleId, InstalledApp>,
    pub(crate) registered: BTreeMap<BundleId, InstalledApp>,
    pub(crate) active_application: Option<BundleId>,
    pub(crate) os_bar: OsBar,
    pub(crate) scripts: ScriptRegistry,
    pub(crate) stagger: Stagger,
    pub(crate) closing: BTreeSet<BundleId>,
    pub(crate) loading: BTreeMap<BundleId, u32>,
    pub(crate) signals: VecDeque<Signal>,
    next_surface: u64,
    next_object: u64,
}

impl RuntimeState {
    /// Creates an empty desktop.
    pub fn new(config: RuntimeConfig) -> Self {
        Self {
            stack: StackRegistry::new(config.window_base_z, config.modal_base_z),
            surfaces: BTreeMap::new(),
            apps: BTreeMap::new(),
            system_apps: BTreeMap::new(),
            registered: BTreeMap::new(),
            active_application: None,
            os_bar: OsBar::default(),
            scripts: ScriptRegistry::default(),
            stagger: Stagger::default(),
            closing: BTreeSet::new(),
            loading: BTreeMap::new(),
            signals: VecDeque::new(),
            next_surface: 0,
            next_object: 0,
            config,
        }
    }

    pub(crate) fn next_surface_id(&mut self) -> SurfaceId {
        self.next_surface += 1;
        SurfaceId(self.next_surface)
    }

    pub(crate) fn next_object_id(&mut self) -> u64 {
        self.next_object += 1;
        self.next_object
    }

    pub(crate) fn begin_loading(&mut self, bundle_id: &BundleId) {
        *self.loading.entry(bundle_id.clone()).or_default() += 1;
    }

    pub(crate) fn end_loading(&mut self, bundle_id: &BundleId) {
        if let Some(count) = self.loading.get_mut(bundle_id) {
            *count -= 1;
            if *count == 0 {
                self.loading.remove(bundle_id);
            }
        }
    }

    /// Returns whether `bundle_id` is still loaded as the same instance.
    pub(crate) fn is_same_instance(&self, bundle_id: &BundleId, object_id: u64) -> bool {
        self.apps
            .get(bundle_id)
            .is_some_and(|app| app.object_id == object_id)
    }

    pub(crate) fn emit(&mut self, signal: Signal) {
        self.signals.push_back(signal);
    }

    pub(crate) fn emit_surface(&mut self, id: SurfaceId, signal: SurfaceSignal) {
        self.emit(Signal::Surface(id, signal));
    }

    pub(crate) fn emit_app(&mut self, bundle_id: &BundleId, signal: AppSignal) {
        self.emit(Signal::Application(bundle_id.clone(), signal));
    }

    /// Active configuration.
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Window and modal stacks.
    pub fn stack(&self) -> &StackRegistry {
        &self.stack
    }

    /// OS-bar menus and app-menu affordances.
    pub fn os_bar(&self) -> &OsBar {
        &self.os_bar
    }

    /// Registered script fragments.
    pub fn scripts(&self) -> &ScriptRegistry {
        &self.scripts
    }

    /// Looks up a surface.
    pub fn surface(&self, id: SurfaceId) -> Option<&Surface> {
        self.surfaces.get(&id)
    }

    /// Every live surface, shown or not.
    pub fn surfaces(&self) -> impl Iterator<Item = &Surface> {
        self.surfaces.values()
    }

    /// Looks up a loaded application.
    pub fn application(&self, bundle_id: &BundleId) -> Option<&ApplicationInstance> {
        self.apps.get(bundle_id)
    }

    /// Bundle ids of every loaded application.
    pub fn loaded_applications(&self) -> Vec<BundleId> {
        self.apps.keys().cloned().collect()
    }

    /// Returns whether `bundle_id` is loaded.
    pub fn is_loaded(&self, bundle_id: &BundleId) -> bool {
        self.apps.contains_key(bundle_id)
    }

    /// The active application, if any. Never a system or passive application.
    pub fn active_application(&self) -> Option<&BundleId> {
        self.active_application.as_ref()
    }

    /// Lifecycle state of a bundle.
    pub fn application_state(&self, bundle_id: &BundleId) -> ApplicationState {
        if self.closing.contains(bundle_id) {
            return ApplicationState::Stopping;
        }
        if self.apps.contains_key(bundle_id) {
            return ApplicationState::Loaded {
                focused: self.active_application.as_ref() == Some(bundle_id),
            };
        }
        if self.loading.contains_key(bundle_id) {
            return ApplicationState::Loading;
        }
        ApplicationState::Unloaded
    }

    /// Shown surfaces owned by `bundle_id`, ordered bottom to top.
    pub fn stacked_surfaces_of(&self, bundle_id: &BundleId) -> Vec<SurfaceId> {
        self.stack
            .windows()
            .iter()
            .chain(self.stack.modals())
            .map(|slot| slot.id)
            .filter(|id| {
                self.surfaces
                    .get(id)
                    .is_some_and(|surface| &surface.owner == bundle_id)
            })
            .collect()
    }

    /// Highest stacked surface owned by `bundle_id`.
    pub fn topmost_surface_of(&self, bundle_id: &BundleId) -> Option<SurfaceId> {
        self.stacked_surfaces_of(bundle_id).last().copied()
    }

    /// The surface that receives keyboard input: the top modal if any, else the top window,
    /// provided it is focused.
    pub fn focused_surface(&self) -> Option<SurfaceId> {
        self.stack
            .topmost()
            .filter(|id| self.surfaces.get(id).is_some_and(Surface::is_focused))
    }
}
