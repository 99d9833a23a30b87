//! Surface and application records held by [`crate::RuntimeState`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use surface_contract::{ApplicationConfig, BundleId, SurfaceId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Top-left position of a surface in pixels.
pub struct Point {
    /// Distance from the top of the desktop.
    pub top: i32,
    /// Distance from the left of the desktop.
    pub left: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Window or modal.
pub enum SurfaceKind {
    /// Stacked window.
    Window,
    /// Exclusive surface above every window.
    Modal,
}

impl SurfaceKind {
    /// Returns whether this is [`SurfaceKind::Modal`].
    pub const fn is_modal(self) -> bool {
        matches!(self, Self::Modal)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Per-surface focus state: `Unfocused -> Focused -> Blurred -> Focused -> ...`.
pub enum FocusState {
    /// Created but never focused.
    #[default]
    Unfocused,
    /// Receives keyboard input.
    Focused,
    /// Previously focused, lost focus to another surface.
    Blurred,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
/// Identifier of a left-side menu group in the OS bar.
pub struct MenuId(pub String);

impl MenuId {
    /// Left menu of an application (`Menu_<bundle>`).
    pub fn application(bundle_id: &BundleId) -> Self {
        Self(format!("Menu_{bundle_id}"))
    }

    /// Right-side app menu of an application (`AppMenu_<bundle>`).
    pub fn app_menu(bundle_id: &BundleId) -> Self {
        Self(format!("AppMenu_{bundle_id}"))
    }

    /// Menu group owned by a surface (`Menu_Window_000001`).
    pub fn surface(surface_id: SurfaceId) -> Self {
        Self(format!("Menu_{surface_id}"))
    }
}

impl std::fmt::Display for MenuId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// A window or modal built from a controller template.
pub struct Surface {
    /// Process-unique id.
    pub id: SurfaceId,
    /// Owning application.
    pub owner: BundleId,
    /// Controller name from the descriptor.
    pub controller_name: String,
    /// Window or modal.
    pub kind: SurfaceKind,
    /// Current focus state.
    pub focus: FocusState,
    /// Initial staggered position; `None` for modals, which the host centers.
    pub position: Option<Point>,
    /// Position to restore when leaving fullscreen.
    pub restore_position: Option<Point>,
    /// Zoomed to fill the desktop.
    pub fullscreen: bool,
    /// Interpolated markup with script fragments stripped.
    pub markup: String,
    /// Left-side menu group attached while the surface is focused.
    pub menu_ref: Option<MenuId>,
    /// Attached to the desktop via `show_surface`.
    pub shown: bool,
}

impl Surface {
    /// Returns whether the surface is a modal.
    pub fn is_modal(&self) -> bool {
        self.kind.is_modal()
    }

    /// Returns whether the surface currently has focus.
    pub fn is_focused(&self) -> bool {
        self.focus == FocusState::Focused
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
/// Key under which a launched surface is recorded by its application.
pub enum ControllerKey {
    /// Regular controller keyed by generated surface id.
    Surface(SurfaceId),
    /// Singleton controller keyed by controller name.
    Singleton(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// One loaded application.
pub struct ApplicationInstance {
    /// Bundle id.
    pub bundle_id: BundleId,
    /// Distinguishes successive loads of the same bundle.
    pub object_id: u64,
    /// Display name.
    pub name: String,
    /// Always-loaded system application. Implies `passive`.
    pub system: bool,
    /// Never becomes the active application.
    pub passive: bool,
    /// Closed by `close_secure_applications`.
    pub secure: bool,
    /// Closes when its last surface closes.
    pub quit_automatically: bool,
    /// Left-side menu id.
    pub menu_id: MenuId,
    /// Right-side app-menu id.
    pub app_menu_id: MenuId,
    /// Script group registered for the `Application` template, if any.
    pub script_id: Option<String>,
    /// Rendered `Application` template with its scripts stripped.
    pub markup: Option<String>,
    /// Container holding every surface of the application.
    pub container_id: String,
    /// Whether the container is displayed.
    pub container_visible: bool,
    /// Parsed `application.json`.
    pub config: ApplicationConfig,
    /// Launched surfaces keyed by surface id or singleton name.
    pub launched: BTreeMap<ControllerKey, SurfaceId>,
    /// Template cache keyed by controller name.
    pub templates: BTreeMap<String, String>,
    /// Set while `application_did_stop` closes the surfaces.
    pub stopping: bool,
}

impl ApplicationInstance {
    /// Builds an instance from its descriptor. `system` forces `passive`.
    pub fn new(config: ApplicationConfig, object_id: u64) -> Self {
        let descriptor = &config.application;
        let bundle_id = descriptor.bundle_id.clone();
        Self {
            object_id,
            name: descriptor.name.clone(),
            system: descriptor.system,
            passive: descriptor.system || descriptor.passive,
            secure: descriptor.secure,
            quit_automatically: descriptor.quit_automatically,
            menu_id: MenuId::application(&bundle_id),
            app_menu_id: MenuId::app_menu(&bundle_id),
            script_id: None,
            markup: None,
            container_id: format!("app-container-{bundle_id}"),
            container_visible: false,
            launched: BTreeMap::new(),
            templates: BTreeMap::new(),
            stopping: false,
            bundle_id,
            config,
        }
    }

    /// Returns whether the application may become the active application.
    pub fn is_switchable(&self) -> bool {
        !self.system && !self.passive
    }

    /// Ids of every launched surface.
    pub fn surface_ids(&self) -> Vec<SurfaceId> {
        self.launched.values().copied().collect()
    }

    /// Removes the launch record pointing at `surface_id`.
    pub fn forget_surface(&mut self, surface_id: SurfaceId) -> bool {
        let key = self
            .launched
            .iter()
            .find(|(_, id)| **id == surface_id)
            .map(|(key, _)| key.clone());
        match key {
            Some(key) => self.launched.remove(&key).is_some(),
            None => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Lifecycle state of an application bundle.
pub enum ApplicationState {
    /// Not in the loaded set.
    Unloaded,
    /// `open` is awaiting its descriptor or templates.
    Loading,
    /// Loaded; `focused` when it is the active application.
    Loaded {
        /// Whether the bundle is the active application.
        focused: bool,
    },
    /// `close` is tearing the application down.
    Stopping,
}
