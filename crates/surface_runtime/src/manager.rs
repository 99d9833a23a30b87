//! Shared application manager handle.
//!
//! [`ApplicationManager`] owns the single [`RuntimeState`] behind a `RefCell`. Every public
//! operation mutates the state in one short borrow and then drains the queued signals into the
//! mounted controllers and delegates, so callbacks may re-enter the manager freely.

use std::{
    cell::{Cell, Ref, RefCell},
    collections::BTreeMap,
    rc::{Rc, Weak},
};

use platform_host::{fetch_json_with, fetch_text_with, FetchError, HostServices};
use serde_json::Value;
use surface_contract::{
    ApplicationConfig, ApplicationDelegate, BundleId, ControllerConfig, InstalledApp,
    InstalledEntry, Key, MainController, MenuAction, SurfaceController, SurfaceId, User,
    APPLICATION_CONTROLLER,
};

use crate::{
    applications::{self, LoadPlan},
    config::RuntimeConfig,
    error::{CloseOutcome, RuntimeError},
    factory::prepare_application_template,
    focus::{self, KeyRouting},
    menus::AppMenu,
    model::{ApplicationInstance, ApplicationState, MenuId, Surface},
    registry::{AppModule, ApplicationContext, ControllerRegistry, SurfaceContext},
    state::{AppSignal, RuntimeState, Signal, SurfaceSignal},
};

type SharedController = Rc<RefCell<Box<dyn SurfaceController>>>;
type SharedDelegate = Rc<RefCell<Box<dyn ApplicationDelegate>>>;

struct ManagerInner {
    state: RefCell<RuntimeState>,
    services: HostServices,
    registry: RefCell<ControllerRegistry>,
    controllers: RefCell<BTreeMap<SurfaceId, SharedController>>,
    delegates: RefCell<BTreeMap<BundleId, SharedDelegate>>,
    dispatching: Cell<bool>,
}

/// Cloneable handle to the runtime. Clones share the same state.
#[derive(Clone)]
pub struct ApplicationManager {
    inner: Rc<ManagerInner>,
}

/// Weak back-reference held by controllers and delegates.
#[derive(Clone, Default)]
pub struct RuntimeHandle {
    inner: Weak<ManagerInner>,
}

impl RuntimeHandle {
    /// Returns the manager while it is still alive.
    pub fn upgrade(&self) -> Option<ApplicationManager> {
        self.inner
            .upgrade()
            .map(|inner| ApplicationManager { inner })
    }

    /// Closes a surface. No-op once the manager is gone.
    pub fn close_surface(&self, id: SurfaceId) {
        if let Some(manager) = self.upgrade() {
            manager.close_surface(id);
        }
    }

    /// Closes an application. Reports [`CloseOutcome::NotLoaded`] once the manager is gone.
    pub fn close_application(&self, bundle_id: &BundleId) -> CloseOutcome {
        self.upgrade()
            .map_or(CloseOutcome::NotLoaded, |manager| manager.close(bundle_id))
    }
}

struct DispatchGuard<'a>(&'a Cell<bool>);

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

struct OpenFailure {
    error: RuntimeError,
    message: String,
}

impl OpenFailure {
    fn new(error: RuntimeError, message: impl Into<String>) -> Self {
        Self {
            error,
            message: message.into(),
        }
    }
}

fn fetch_error(bundle_id: &BundleId, err: FetchError) -> RuntimeError {
    match err {
        FetchError::SessionExpired { url } => RuntimeError::SessionExpired { resource: url },
        FetchError::Failure { url, reason } => RuntimeError::LoadFailure {
            bundle_id: bundle_id.clone(),
            resource: url,
            reason,
        },
    }
}

impl ApplicationManager {
    /// Builds a manager over validated configuration and host services.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::InvalidConfig`] when `config` fails validation.
    pub fn new(config: RuntimeConfig, services: HostServices) -> Result<Self, RuntimeError> {
        config.validate()?;
        tracing::info!(
            host_strategy = services.host_strategy.as_str(),
            resource_root = %config.resource_root,
            "application manager created"
        );
        Ok(Self {
            inner: Rc::new(ManagerInner {
                state: RefCell::new(RuntimeState::new(config)),
                services,
                registry: RefCell::new(ControllerRegistry::default()),
                controllers: RefCell::new(BTreeMap::new()),
                delegates: RefCell::new(BTreeMap::new()),
                dispatching: Cell::new(false),
            }),
        })
    }

    /// Returns a weak handle for controllers and delegates.
    pub fn handle(&self) -> RuntimeHandle {
        RuntimeHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Read-only view of the runtime state. Drop the guard before calling back into the manager.
    pub fn state(&self) -> Ref<'_, RuntimeState> {
        self.inner.state.borrow()
    }

    /// Injected host services.
    pub fn services(&self) -> &HostServices {
        &self.inner.services
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut RuntimeState) -> R) -> R {
        let result = {
            let mut state = self.inner.state.borrow_mut();
            f(&mut *state)
        };
        self.flush();
        result
    }

    fn flush(&self) {
        if self.inner.dispatching.replace(true) {
            return;
        }
        let _guard = DispatchGuard(&self.inner.dispatching);
        loop {
            let next = self.inner.state.borrow_mut().signals.pop_front();
            let Some(signal) = next else {
                break;
            };
            self.deliver(signal);
        }
    }

    fn deliver(&self, signal: Signal) {
        match signal {
            Signal::Surface(id, signal) => self.deliver_to_controller(id, signal),
            Signal::Application(bundle_id, signal) => self.deliver_to_delegate(&bundle_id, signal),
            Signal::ReleaseController(id) => {
                let released = self.inner.controllers.borrow_mut().remove(&id);
                drop(released);
            }
            Signal::ReleaseDelegate(bundle_id) => {
                let released = self.inner.delegates.borrow_mut().remove(&bundle_id);
                drop(released);
            }
        }
    }

    fn deliver_to_controller(&self, id: SurfaceId, signal: SurfaceSignal) {
        let Some(shared) = self.inner.controllers.borrow().get(&id).cloned() else {
            return;
        };
        let Ok(mut controller) = shared.try_borrow_mut() else {
            tracing::warn!(surface_id = %id, ?signal, "controller busy; dropping re-entrant signal");
            return;
        };
        match signal {
            SurfaceSignal::ViewDidLoad => controller.view_did_load(),
            SurfaceSignal::ViewWillUnload => controller.view_will_unload(),
            SurfaceSignal::ViewDidFocus => controller.view_did_focus(),
            SurfaceSignal::ViewDidBlur => controller.view_did_blur(),
            SurfaceSignal::DidHitKey(key) => controller.did_hit_key(&key),
            SurfaceSignal::DidHitEnter => controller.did_hit_enter(),
            SurfaceSignal::UserDidSignIn(user) => controller.user_did_sign_in(&user),
            SurfaceSignal::UserDidSignOut => controller.user_did_sign_out(),
        }
    }

    fn deliver_to_delegate(&self, bundle_id: &BundleId, signal: AppSignal) {
        let Some(shared) = self.inner.delegates.borrow().get(bundle_id).cloned() else {
            return;
        };
        let Ok(mut delegate) = shared.try_borrow_mut() else {
            tracing::warn!(bundle_id = %bundle_id, ?signal, "delegate busy; dropping re-entrant signal");
            return;
        };
        match signal {
            AppSignal::DidStart => delegate.application_did_start(),
            AppSignal::DidFocus => delegate.application_did_focus(),
            AppSignal::DidBlur => delegate.application_did_blur(),
            AppSignal::DidStop => delegate.application_did_stop(),
            AppSignal::DidCloseAllWindows => delegate.application_did_close_all_windows(),
            AppSignal::DidSelectCommand(command) => delegate.did_select_command(&command),
        }
    }

    fn module(&self, bundle_id: &BundleId) -> Option<AppModule> {
        self.inner.registry.borrow().module(bundle_id).cloned()
    }

    fn controller(&self, id: SurfaceId) -> Option<SharedController> {
        self.inner.controllers.borrow().get(&id).cloned()
    }

    /// Seeds the system applications. Call once before anything else.
    pub fn init(&self, system_apps: BTreeMap<BundleId, InstalledApp>) {
        self.with_state(|state| applications::init(state, system_apps));
    }

    /// Replaces the user-installed applications. System entries are never overwritten.
    pub fn register_applications(&self, apps: BTreeMap<BundleId, InstalledApp>) {
        self.with_state(|state| applications::register_applications(state, apps));
    }

    /// Registers the controller and delegate factories of one bundle.
    pub fn register_module(&self, module: AppModule) {
        self.inner.registry.borrow_mut().register(module);
    }

    /// Registered non-system applications for the launcher list.
    pub fn installed(&self) -> Vec<InstalledEntry> {
        applications::installed(&self.state())
    }

    /// Snapshot of a loaded application.
    pub fn instance(&self, bundle_id: &BundleId) -> Option<ApplicationInstance> {
        let instance = self.state().application(bundle_id).cloned();
        if instance.is_none() {
            tracing::warn!(bundle_id = %bundle_id, "application is not loaded");
        }
        instance
    }

    /// Lifecycle state of a bundle.
    pub fn application_state(&self, bundle_id: &BundleId) -> ApplicationState {
        self.state().application_state(bundle_id)
    }

    /// Currently active application.
    pub fn active_application(&self) -> Option<BundleId> {
        self.state().active_application().cloned()
    }

    /// Snapshot of a surface.
    pub fn surface(&self, id: SurfaceId) -> Option<Surface> {
        self.state().surface(id).cloned()
    }

    /// Window ids, bottom to top.
    pub fn window_stack(&self) -> Vec<SurfaceId> {
        self.state().stack().windows().iter().map(|slot| slot.id).collect()
    }

    /// Modal ids, bottom to top.
    pub fn modal_stack(&self) -> Vec<SurfaceId> {
        self.state().stack().modals().iter().map(|slot| slot.id).collect()
    }

    /// Application menu group currently shown in the OS bar.
    pub fn displayed_menu(&self) -> Option<MenuId> {
        self.state().os_bar().displayed().cloned()
    }

    /// Returns whether a controller is mounted for `id`.
    pub fn has_controller(&self, id: SurfaceId) -> bool {
        self.inner.controllers.borrow().contains_key(&id)
    }

    /// Returns whether a delegate is mounted for `bundle_id`.
    pub fn has_delegate(&self, bundle_id: &BundleId) -> bool {
        self.inner.delegates.borrow().contains_key(bundle_id)
    }

    /// Opens an application, or switches to it when it is already loaded.
    ///
    /// `main` overrides the descriptor's entry controller. Failures after the descriptor request
    /// starts are reported through the alert presenter and roll the application back.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::NotInstalled`] for unregistered bundles, otherwise the load failure.
    pub async fn open(
        &self,
        bundle_id: &BundleId,
        main: Option<MainController>,
    ) -> Result<(), RuntimeError> {
        if self.state().is_loaded(bundle_id) {
            return self.switch_to(bundle_id);
        }
        let name = self
            .state()
            .registered
            .get(bundle_id)
            .map(|app| app.name.clone())
            .ok_or_else(|| RuntimeError::NotInstalled(bundle_id.clone()))?;

        let alerts = Rc::clone(&self.inner.services.alerts);
        alerts.progress_started(&format!("Loading application {name}..."));
        self.inner.state.borrow_mut().begin_loading(bundle_id);
        let result = self.open_loaded(bundle_id, main).await;
        self.inner.state.borrow_mut().end_loading(bundle_id);
        alerts.progress_finished();
        self.flush();

        match result {
            Ok(()) => Ok(()),
            Err(failure) => {
                tracing::warn!(bundle_id = %bundle_id, error = %failure.error, "failed to open application");
                alerts.show_error(&failure.message);
                Err(failure.error)
            }
        }
    }

    async fn open_loaded(
        &self,
        bundle_id: &BundleId,
        main: Option<MainController>,
    ) -> Result<(), OpenFailure> {
        let loader = Rc::clone(&self.inner.services.loader);
        let descriptor_path = self.state().config().descriptor_path(bundle_id.as_str());
        let mut config: ApplicationConfig = fetch_json_with(&*loader, &descriptor_path)
            .await
            .map_err(|err| {
                OpenFailure::new(
                    fetch_error(bundle_id, err),
                    format!("Failed to load application bundle ({bundle_id}) configuration."),
                )
            })?;

        if self.state().is_loaded(bundle_id) {
            tracing::debug!(bundle_id = %bundle_id, "application finished loading elsewhere");
            return self.switch_after_open(bundle_id);
        }
        if config.application.bundle_id != *bundle_id {
            tracing::warn!(
                requested = %bundle_id,
                declared = %config.application.bundle_id,
                "descriptor declares a different bundle id"
            );
            config.application.bundle_id = bundle_id.clone();
        }

        let has_application_template = config.has_application_controller();
        let main_name = config.application.main.clone();
        let main_endpoint = config.application.endpoint.clone();
        let object_id = self.with_state(|state| applications::insert_application(state, config));

        if has_application_template {
            let path = self.state().config().controller_path(
                bundle_id.as_str(),
                APPLICATION_CONTROLLER,
                surface_contract::HTML_RENDERER,
            );
            let html = match fetch_text_with(&*loader, &path).await {
                Ok(html) => html,
                Err(err) => {
                    self.rollback(bundle_id, object_id);
                    return Err(OpenFailure::new(
                        fetch_error(bundle_id, err),
                        format!("Failed to load UIApplication for application bundle ({bundle_id})."),
                    ));
                }
            };
            if !self.state().is_same_instance(bundle_id, object_id) {
                tracing::info!(bundle_id = %bundle_id, "application closed while its template loaded");
                return Ok(());
            }
            self.with_state(|state| {
                let (markup, script_id) = prepare_application_template(state, bundle_id, &html);
                if let Some(app) = state.apps.get_mut(bundle_id) {
                    app.markup = Some(markup);
                    app.script_id = script_id;
                }
            });
        }

        let delegate = self.module(bundle_id).and_then(|module| {
            module.mount_delegate(ApplicationContext {
                bundle_id: bundle_id.clone(),
                runtime: self.handle(),
            })
        });
        let (menus, app_menu) = match &delegate {
            Some(delegate) => (delegate.menus(), delegate.app_menu()),
            None => (None, None),
        };
        if let Some(delegate) = delegate {
            self.inner
                .delegates
                .borrow_mut()
                .insert(bundle_id.clone(), Rc::new(RefCell::new(delegate)));
        }
        self.with_state(|state| applications::attach_menus(state, bundle_id, menus, app_menu));

        let (controller, endpoint, launch_params) = match main.filter(|m| !m.name.is_empty()) {
            Some(main) => (main.name, main.endpoint, main.launch_params),
            None => match main_name {
                Some(name) if name != APPLICATION_CONTROLLER => (name, main_endpoint, Value::Null),
                _ => {
                    self.with_state(|state| state.emit_app(bundle_id, AppSignal::DidStart));
                    return self.switch_after_open(bundle_id);
                }
            },
        };

        self.inner
            .services
            .alerts
            .progress_updated(50, "Loading controller...");
        let surface_id = match self
            .load_surface(bundle_id, object_id, &controller, endpoint.as_deref())
            .await
        {
            Ok(id) => id,
            Err(RuntimeError::NotLoaded(_)) => {
                tracing::info!(bundle_id = %bundle_id, "application closed while its main controller loaded");
                return Ok(());
            }
            Err(_) if !self.state().is_same_instance(bundle_id, object_id) => {
                tracing::info!(bundle_id = %bundle_id, "main controller failed for a closed instance");
                return Ok(());
            }
            Err(error) => {
                self.rollback(bundle_id, object_id);
                return Err(OpenFailure::new(
                    error,
                    format!("Failed to load application ({bundle_id}) main controller ({controller})"),
                ));
            }
        };
        self.with_state(|state| state.emit_app(bundle_id, AppSignal::DidStart));
        self.switch_after_open(bundle_id)?;
        self.show_surface(surface_id, launch_params).map_err(|error| {
            let message = format!("Failed to show application ({bundle_id}) main controller ({controller})");
            OpenFailure::new(error, message)
        })
    }

    fn switch_after_open(&self, bundle_id: &BundleId) -> Result<(), OpenFailure> {
        self.with_state(|state| applications::switch_to(state, bundle_id))
            .map_err(|error| {
                OpenFailure::new(error, format!("Application bundle ({bundle_id}) is not loaded."))
            })
    }

    fn rollback(&self, bundle_id: &BundleId, object_id: u64) {
        self.with_state(|state| {
            if state.is_same_instance(bundle_id, object_id) {
                applications::rollback_application(state, bundle_id);
            }
        });
    }

    async fn load_surface(
        &self,
        bundle_id: &BundleId,
        object_id: u64,
        name: &str,
        endpoint: Option<&str>,
    ) -> Result<SurfaceId, RuntimeError> {
        let plan = self.with_state(|state| applications::plan_load(state, bundle_id, name, endpoint))?;
        match plan {
            LoadPlan::Existing(id) => Ok(id),
            LoadPlan::Cached { template, modal } => self.with_state(|state| {
                applications::complete_load(state, bundle_id, object_id, name, &template, modal, false)
            }),
            LoadPlan::Fetch { path, modal, cache } => {
                let loader = Rc::clone(&self.inner.services.loader);
                let template = fetch_text_with(&*loader, &path)
                    .await
                    .map_err(|err| fetch_error(bundle_id, err))?;
                self.with_state(|state| {
                    applications::complete_load(
                        state, bundle_id, object_id, name, &template, modal, cache,
                    )
                })
            }
        }
    }

    /// Loads controller `name` of a loaded application and returns its unshown surface.
    ///
    /// A launched singleton is focused and returned instead of building a second surface.
    /// Templates without a configured `path` or `endpoint` are cached per application.
    ///
    /// # Errors
    ///
    /// Validation errors from the descriptor, or the fetch failure (also shown as an alert).
    pub async fn load_controller(
        &self,
        bundle_id: &BundleId,
        name: &str,
        endpoint: Option<&str>,
    ) -> Result<SurfaceId, RuntimeError> {
        let object_id = self
            .state()
            .application(bundle_id)
            .map(|app| app.object_id)
            .ok_or_else(|| RuntimeError::NotLoaded(bundle_id.clone()))?;
        let result = self.load_surface(bundle_id, object_id, name, endpoint).await;
        if matches!(
            result,
            Err(RuntimeError::LoadFailure { .. } | RuntimeError::SessionExpired { .. })
        ) {
            self.inner.services.alerts.show_error(&format!(
                "Failed to load application bundle ({bundle_id}) controller ({name})."
            ));
        }
        result
    }

    /// Shows a loaded surface: mounts its controller, attaches its menus, focuses it, and
    /// signals `view_did_load`. Showing an already shown surface only re-runs `configure`.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::MissingController`] when the surface no longer exists.
    pub fn show_surface(&self, id: SurfaceId, launch_params: Value) -> Result<(), RuntimeError> {
        let already_shown = self.with_state(|state| applications::mark_shown(state, id))?;
        if already_shown {
            if launch_params.is_null() {
                return Ok(());
            }
            if let Some(shared) = self.controller(id) {
                match shared.try_borrow_mut() {
                    Ok(mut controller) => controller.configure(&launch_params),
                    Err(_) => tracing::warn!(surface_id = %id, "controller busy; configure skipped"),
                }
            }
            return Ok(());
        }

        let (bundle_id, controller_name) = {
            let state = self.state();
            let surface = state.surface(id).ok_or(RuntimeError::MissingController(id))?;
            (surface.owner.clone(), surface.controller_name.clone())
        };
        let context = SurfaceContext {
            surface_id: id,
            bundle_id: bundle_id.clone(),
            controller_name: controller_name.clone(),
            runtime: self.handle(),
        };
        let mut menus = None;
        match self
            .module(&bundle_id)
            .and_then(|module| module.mount_controller(context))
        {
            Some(mut controller) => {
                controller.configure(&launch_params);
                menus = controller.menus();
                self.inner
                    .controllers
                    .borrow_mut()
                    .insert(id, Rc::new(RefCell::new(controller)));
            }
            None => {
                tracing::debug!(surface_id = %id, controller = %controller_name, "surface has no controller");
            }
        }
        self.with_state(|state| applications::attach_surface(state, id, menus))
    }

    /// Adds a controller definition to a loaded application at runtime.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::NotLoaded`] or [`RuntimeError::ControllerAlreadyConfigured`].
    pub fn add_controller(
        &self,
        bundle_id: &BundleId,
        name: &str,
        config: ControllerConfig,
    ) -> Result<(), RuntimeError> {
        self.with_state(|state| applications::add_controller(state, bundle_id, name, config))
    }

    /// Closes a loaded application and every surface it owns.
    pub fn close(&self, bundle_id: &BundleId) -> CloseOutcome {
        self.with_state(|state| applications::close_application(state, bundle_id))
    }

    /// Closes one surface.
    pub fn close_surface(&self, id: SurfaceId) {
        self.with_state(|state| applications::close_surface(state, id));
    }

    /// Makes a loaded application active.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::NotLoaded`], also shown as an alert.
    pub fn switch_to(&self, bundle_id: &BundleId) -> Result<(), RuntimeError> {
        let result = self.with_state(|state| applications::switch_to(state, bundle_id));
        if let Err(RuntimeError::NotLoaded(_)) = &result {
            self.inner
                .services
                .alerts
                .show_alert(&format!("Application bundle ({bundle_id}) is not loaded."));
        }
        result
    }

    /// Displays an application's menu when it may currently own the OS bar.
    pub fn switch_menu(&self, bundle_id: &BundleId) -> bool {
        self.with_state(|state| applications::switch_menu(state, bundle_id))
    }

    /// Focuses and raises a surface.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::MissingController`] when the surface does not exist.
    pub fn focus_surface(&self, id: SurfaceId) -> Result<(), RuntimeError> {
        self.with_state(|state| focus::focus_surface(state, id))
    }

    /// Focuses the highest window whose application may display its menu.
    pub fn focus_topmost(&self) -> bool {
        self.with_state(focus::focus_topmost)
    }

    /// Blurs the top window.
    pub fn blur_topmost(&self) {
        self.with_state(focus::blur_topmost);
    }

    /// Routes a key press to the top modal, else the top window.
    pub fn dispatch_key(&self, key: &Key) -> KeyRouting {
        self.with_state(|state| focus::dispatch_key(state, key))
    }

    /// Toggles fullscreen for a window and returns the new state.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::MissingController`] when the surface does not exist.
    pub fn toggle_zoom(&self, id: SurfaceId) -> Result<bool, RuntimeError> {
        self.with_state(|state| applications::toggle_zoom(state, id))
    }

    /// Signals `user_did_sign_in` to every shown surface.
    pub fn sign_in_all_applications(&self, user: &User) {
        self.with_state(|state| applications::sign_in_all(state, user));
    }

    /// Signals `user_did_sign_out` to every shown surface.
    pub fn sign_out_all_applications(&self) {
        self.with_state(applications::sign_out_all);
    }

    /// Closes every non-system application and returns the closed bundles.
    pub fn close_all_applications(&self) -> Vec<BundleId> {
        self.with_state(|state| applications::close_where(state, |app| !app.system))
    }

    /// Closes every secure application and returns the closed bundles.
    pub fn close_secure_applications(&self) -> Vec<BundleId> {
        self.with_state(|state| applications::close_where(state, |app| app.secure))
    }

    /// Activates an item of the application's left-side menu group.
    ///
    /// Unknown items and dividers are ignored.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::NotLoaded`], or the failure of a `Show` or `Switch` action.
    pub async fn activate_menu_item(
        &self,
        bundle_id: &BundleId,
        menu_title: &str,
        label: &str,
    ) -> Result<(), RuntimeError> {
        let action = {
            let state = self.state();
            let app = state
                .application(bundle_id)
                .ok_or_else(|| RuntimeError::NotLoaded(bundle_id.clone()))?;
            let action = state
                .os_bar()
                .menu(&app.menu_id)
                .and_then(|entry| entry.group.find(menu_title, label))
                .filter(|item| item.enabled)
                .map(|item| item.action.clone());
            action
        };
        let Some(action) = action else {
            tracing::warn!(bundle_id = %bundle_id, menu_title, label, "menu item not found");
            return Ok(());
        };
        match action {
            MenuAction::Quit => {
                self.close(bundle_id);
                Ok(())
            }
            MenuAction::Show(controller) => {
                let id = self.load_controller(bundle_id, &controller, None).await?;
                self.show_surface(id, Value::Null)
            }
            MenuAction::Switch => self.switch_to(bundle_id),
            MenuAction::Command(command) => {
                self.with_state(|state| {
                    state.emit_app(bundle_id, AppSignal::DidSelectCommand(command));
                });
                Ok(())
            }
            MenuAction::Divider => Ok(()),
        }
    }

    /// Activates an application's right-side app-menu affordance.
    ///
    /// Buttons switch to the application and panels toggle. Dropdowns open host-side.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::NotLoaded`] when the application is gone.
    pub fn activate_app_menu(&self, bundle_id: &BundleId) -> Result<(), RuntimeError> {
        let menu = self
            .state()
            .os_bar()
            .app_menu(bundle_id)
            .map(|slot| slot.menu.clone());
        match menu {
            Some(AppMenu::Button) => self.switch_to(bundle_id),
            Some(AppMenu::Panel { .. }) => {
                self.with_state(|state| state.os_bar.toggle_panel(bundle_id));
                Ok(())
            }
            Some(AppMenu::Dropdown(_)) => Ok(()),
            None if self.state().is_loaded(bundle_id) => Ok(()),
            None => Err(RuntimeError::NotLoaded(bundle_id.clone())),
        }
    }
}
