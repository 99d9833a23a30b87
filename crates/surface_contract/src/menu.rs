//! Menu affordance models shown in the OS bar.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Action performed when a menu item is activated.
pub enum MenuAction {
    /// Close the owning application.
    Quit,
    /// Load and show the named controller.
    Show(String),
    /// Switch to the owning application.
    Switch,
    /// Application-defined command forwarded to the application delegate.
    Command(String),
    /// Visual separator; never activates.
    Divider,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// One entry of a [`Menu`].
pub struct MenuItem {
    /// Item label.
    pub label: String,
    /// Activation behavior.
    pub action: MenuAction,
    /// Disabled items ignore activation.
    pub enabled: bool,
}

impl MenuItem {
    /// Creates an enabled item.
    pub fn new(label: impl Into<String>, action: MenuAction) -> Self {
        Self {
            label: label.into(),
            action,
            enabled: true,
        }
    }

    /// Creates a divider.
    pub fn divider() -> Self {
        Self {
            label: String::new(),
            action: MenuAction::Divider,
            enabled: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// A titled dropdown.
pub struct Menu {
    /// Dropdown title.
    pub title: String,
    /// Dropdown entries in display order.
    pub items: Vec<MenuItem>,
}

impl Menu {
    /// Creates an empty dropdown.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            items: Vec::new(),
        }
    }

    /// Appends an item.
    pub fn with_item(mut self, item: MenuItem) -> Self {
        self.items.push(item);
        self
    }

    /// Finds the first enabled item carrying `label`.
    pub fn item(&self, label: &str) -> Option<&MenuItem> {
        self.items
            .iter()
            .find(|item| item.enabled && item.label == label)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Left-side menu group displayed while the owning app (or surface) has focus.
pub struct MenuGroup {
    /// Dropdowns in display order.
    pub menus: Vec<Menu>,
}

impl MenuGroup {
    /// Creates a group from dropdowns.
    pub fn new(menus: Vec<Menu>) -> Self {
        Self { menus }
    }

    /// Synthesizes the default group: the app name as title, an optional `About` entry,
    /// and `Quit <name>`.
    pub fn default_for(name: &str, about: Option<&str>) -> Self {
        let mut menu = Menu::new(name);
        if let Some(about) = about {
            menu = menu
                .with_item(MenuItem::new(
                    format!("About {name}"),
                    MenuAction::Show(about.to_string()),
                ))
                .with_item(MenuItem::divider());
        }
        menu = menu.with_item(MenuItem::new(format!("Quit {name}"), MenuAction::Quit));
        Self { menus: vec![menu] }
    }

    /// Finds an enabled item by dropdown title and item label.
    pub fn find(&self, menu_title: &str, label: &str) -> Option<&MenuItem> {
        self.menus
            .iter()
            .find(|menu| menu.title == menu_title)
            .and_then(|menu| menu.item(label))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Custom right-side affordance an application delegate may provide.
pub enum AppMenuSpec {
    /// A dropdown shown in place of the plain switch button.
    Dropdown(Menu),
    /// A caret-activated mini panel with app-rendered markup.
    Panel {
        /// Panel markup.
        markup: String,
    },
}
