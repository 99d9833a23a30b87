//! OS-bar model: left-side menu groups and right-side app-menu affordances.

use std::collections::BTreeMap;

use surface_contract::{AppMenuSpec, BundleId, Menu, MenuGroup};

use crate::model::MenuId;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Right-side affordance of a blurred, switchable application.
pub enum AppMenu {
    /// Plain button that switches to the application.
    Button,
    /// Single dropdown menu.
    Dropdown(Menu),
    /// Caret-activated custom view.
    Panel {
        /// Panel markup.
        markup: String,
        /// Whether the panel is expanded.
        open: bool,
    },
}

impl From<AppMenuSpec> for AppMenu {
    fn from(spec: AppMenuSpec) -> Self {
        match spec {
            AppMenuSpec::Dropdown(menu) => Self::Dropdown(menu),
            AppMenuSpec::Panel { markup } => Self::Panel {
                markup,
                open: false,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A menu group attached to the OS bar.
pub struct MenuEntry {
    /// Owning application.
    pub owner: BundleId,
    /// Menus in the group.
    pub group: MenuGroup,
    /// Whether the group is displayed.
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// App-menu slot on the right side of the OS bar.
pub struct AppMenuSlot {
    /// Affordance kind.
    pub menu: AppMenu,
    /// Hidden while the owning application is active.
    pub visible: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Menu state of the OS bar.
///
/// At most one application menu group is displayed at a time; surface menu groups are shown
/// and hidden with their surface's focus.
pub struct OsBar {
    menus: BTreeMap<MenuId, MenuEntry>,
    displayed: Option<MenuId>,
    app_menus: BTreeMap<BundleId, AppMenuSlot>,
}

impl OsBar {
    /// Attaches a menu group, initially hidden.
    pub fn add_menu(&mut self, id: MenuId, owner: BundleId, group: MenuGroup) {
        self.menus.insert(
            id,
            MenuEntry {
                owner,
                group,
                visible: false,
            },
        );
    }

    /// Detaches a menu group. Clears the displayed marker when it pointed at `id`.
    pub fn remove_menu(&mut self, id: &MenuId) -> Option<MenuEntry> {
        if self.displayed.as_ref() == Some(id) {
            self.displayed = None;
        }
        self.menus.remove(id)
    }

    /// Sets the visibility of a single group without touching the displayed marker.
    pub fn set_menu_visible(&mut self, id: &MenuId, visible: bool) {
        if let Some(entry) = self.menus.get_mut(id) {
            entry.visible = visible;
        }
    }

    /// Displays an application menu group, hiding the previously displayed one.
    pub fn display(&mut self, id: &MenuId) {
        if let Some(previous) = self.displayed.take() {
            if &previous != id {
                self.set_menu_visible(&previous, false);
            }
        }
        self.set_menu_visible(id, true);
        self.displayed = Some(id.clone());
    }

    /// Hides a group and clears the displayed marker when it pointed at `id`.
    pub fn hide(&mut self, id: &MenuId) {
        if self.displayed.as_ref() == Some(id) {
            self.displayed = None;
        }
        self.set_menu_visible(id, false);
    }

    /// Currently displayed application menu group.
    pub fn displayed(&self) -> Option<&MenuId> {
        self.displayed.as_ref()
    }

    /// Looks up a menu group.
    pub fn menu(&self, id: &MenuId) -> Option<&MenuEntry> {
        self.menus.get(id)
    }

    /// Returns whether a menu group is attached and visible.
    pub fn is_visible(&self, id: &MenuId) -> bool {
        self.menus.get(id).is_some_and(|entry| entry.visible)
    }

    /// Attaches a visible app-menu affordance.
    pub fn add_app_menu(&mut self, bundle_id: BundleId, menu: AppMenu) {
        self.app_menus.insert(
            bundle_id,
            AppMenuSlot {
                menu,
                visible: true,
            },
        );
    }

    /// Detaches an app-menu affordance.
    pub fn remove_app_menu(&mut self, bundle_id: &BundleId) -> Option<AppMenuSlot> {
        self.app_menus.remove(bundle_id)
    }

    /// Shows or hides an app-menu affordance.
    pub fn set_app_menu_visible(&mut self, bundle_id: &BundleId, visible: bool) {
        if let Some(slot) = self.app_menus.get_mut(bundle_id) {
            slot.visible = visible;
        }
    }

    /// Looks up an app-menu affordance.
    pub fn app_menu(&self, bundle_id: &BundleId) -> Option<&AppMenuSlot> {
        self.app_menus.get(bundle_id)
    }

    /// Toggles a panel affordance and returns its new `open` state.
    ///
    /// Opening a panel collapses every other open panel.
    pub fn toggle_panel(&mut self, bundle_id: &BundleId) -> Option<bool> {
        let opening = match self.app_menus.get(bundle_id).map(|slot| &slot.menu) {
            Some(AppMenu::Panel { open, .. }) => !*open,
            _ => return None,
        };
        if opening {
            self.hide_panels();
        }
        if let Some(AppMenuSlot {
            menu: AppMenu::Panel { open, .. },
            ..
        }) = self.app_menus.get_mut(bundle_id)
        {
            *open = opening;
        }
        Some(opening)
    }

    /// Collapses every open panel affordance.
    pub fn hide_panels(&mut self) {
        for slot in self.app_menus.values_mut() {
            if let AppMenu::Panel { open, .. } = &mut slot.menu {
                *open = false;
            }
        }
    }

    /// Removes every menu group owned by `owner` and its app-menu affordance.
    pub fn remove_owner(&mut self, owner: &BundleId) {
        let ids: Vec<MenuId> = self
            .menus
            .iter()
            .filter(|(_, entry)| &entry.owner == owner)
            .map(|(id, _)| id.clone())
            .collect();
        for id in ids {
            self.remove_menu(&id);
        }
        self.remove_app_menu(owner);
    }
}
