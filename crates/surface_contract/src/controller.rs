//! Lifecycle callback contracts implemented by application code.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{AppMenuSpec, MenuGroup, User};

/// Callbacks for the controller embedded in a window or modal surface.
///
/// All methods default to no-ops.
pub trait SurfaceController {
    /// Receives launch parameters before the view loads, and again on every re-show.
    fn configure(&mut self, _launch_params: &Value) {}

    /// The surface was attached to the stack for the first time.
    fn view_did_load(&mut self) {}

    /// The surface is about to be destroyed.
    fn view_will_unload(&mut self) {}

    /// The surface became the focused surface.
    fn view_did_focus(&mut self) {}

    /// The surface lost focus.
    fn view_did_blur(&mut self) {}

    /// A non-commit key was routed to this surface.
    fn did_hit_key(&mut self, _key: &str) {}

    /// The commit key was routed to this surface.
    fn did_hit_enter(&mut self) {}

    /// A user signed in.
    fn user_did_sign_in(&mut self, _user: &User) {}

    /// The current user signed out.
    fn user_did_sign_out(&mut self) {}

    /// Menus registered as this surface's own `Menu_<surface id>` group when it is shown.
    ///
    /// The group is displayed alongside the application menu only while the surface is
    /// focused, and is removed when the surface closes.
    fn menus(&self) -> Option<MenuGroup> {
        None
    }
}

/// Callbacks for an application's main delegate.
///
/// System and passive applications never receive `application_did_focus` or
/// `application_did_blur`.
pub trait ApplicationDelegate {
    /// The application finished loading.
    fn application_did_start(&mut self) {}

    /// The application became the active application.
    fn application_did_focus(&mut self) {}

    /// The application stopped being the active application.
    fn application_did_blur(&mut self) {}

    /// The application was stopped; all of its surfaces are already closed.
    fn application_did_stop(&mut self) {}

    /// The last surface of a running application closed.
    fn application_did_close_all_windows(&mut self) {}

    /// A [`crate::MenuAction::Command`] item of this application's menus was activated.
    fn did_select_command(&mut self, _command: &str) {}

    /// Left-side menu group; `None` synthesizes the default `Quit` menu.
    fn menus(&self) -> Option<MenuGroup> {
        None
    }

    /// Right-side affordance; `None` yields a plain switch button.
    fn app_menu(&self) -> Option<AppMenuSpec> {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Overrides the bundle's configured `main` controller when opening an application.
pub struct MainController {
    /// Controller name.
    pub name: String,
    /// Endpoint for remote controllers.
    pub endpoint: Option<String>,
    /// Parameters handed to the controller's `configure` callback.
    pub launch_params: Value,
}

impl MainController {
    /// Creates an override without endpoint or launch parameters.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoint: None,
            launch_params: Value::Null,
        }
    }

    /// Sets the endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Sets the launch parameters.
    pub fn with_launch_params(mut self, launch_params: Value) -> Self {
        self.launch_params = launch_params;
        self
    }
}
