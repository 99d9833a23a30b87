//! Headless desktop fixture shared by the runtime scenario tests.

#![allow(dead_code)]

use std::{
    cell::RefCell,
    collections::{BTreeMap, HashSet},
    rc::Rc,
};

use futures::{channel::oneshot, executor::block_on};
use platform_host::{
    Decoder, FetchError, Fetched, HostServices, HostStrategy, MemoryAlertPresenter,
    MemoryResourceLoader, ResourceFuture, ResourceLoader,
};
use serde_json::{json, Value};
use surface_contract::{
    AppMenuSpec, ApplicationDelegate, BundleId, InstalledApp, MenuGroup, SurfaceController,
    SurfaceId, User, APPLICATION_CONTROLLER,
};
use surface_runtime::{
    AppModule, ApplicationContext, ApplicationManager, RuntimeConfig, RuntimeError, RuntimeHandle,
    SurfaceContext,
};

pub type EventLog = Rc<RefCell<Vec<String>>>;

/// Memory loader whose gated paths wait until released.
#[derive(Clone, Default)]
pub struct GatedLoader {
    pub resources: MemoryResourceLoader,
    gated: Rc<RefCell<HashSet<String>>>,
    waiting: Rc<RefCell<Vec<(String, oneshot::Sender<()>)>>>,
}

impl GatedLoader {
    pub fn gate(&self, path: impl Into<String>) {
        self.gated.borrow_mut().insert(path.into());
    }

    pub fn release(&self, path: &str) {
        self.gated.borrow_mut().remove(path);
        let waiting = std::mem::take(&mut *self.waiting.borrow_mut());
        let (ready, pending): (Vec<_>, Vec<_>) =
            waiting.into_iter().partition(|(waiting_for, _)| waiting_for == path);
        *self.waiting.borrow_mut() = pending;
        for (_, sender) in ready {
            let _ = sender.send(());
        }
    }

    pub fn waiting_on(&self, path: &str) -> usize {
        self.waiting
            .borrow()
            .iter()
            .filter(|(waiting_for, _)| waiting_for == path)
            .count()
    }
}

impl ResourceLoader for GatedLoader {
    fn fetch<'a>(
        &'a self,
        path: &'a str,
        decoder: Decoder,
    ) -> ResourceFuture<'a, Result<Fetched, FetchError>> {
        Box::pin(async move {
            if self.gated.borrow().contains(path) {
                let (sender, receiver) = oneshot::channel();
                self.waiting.borrow_mut().push((path.to_string(), sender));
                let _ = receiver.await;
            }
            self.resources.fetch(path, decoder).await
        })
    }
}

#[derive(Clone, Default)]
pub struct AppOptions {
    pub menus: Option<MenuGroup>,
    pub app_menu: Option<AppMenuSpec>,
    pub quit_when_empty: bool,
}

struct RecordingController {
    tag: String,
    log: EventLog,
}

impl RecordingController {
    fn record(&self, event: impl AsRef<str>) {
        self.log
            .borrow_mut()
            .push(format!("{}:{}", self.tag, event.as_ref()));
    }
}

impl SurfaceController for RecordingController {
    fn configure(&mut self, launch_params: &Value) {
        if !launch_params.is_null() {
            self.record(format!("configure {launch_params}"));
        }
    }

    fn view_did_load(&mut self) {
        self.record("view_did_load");
    }

    fn view_will_unload(&mut self) {
        self.record("view_will_unload");
    }

    fn view_did_focus(&mut self) {
        self.record("view_did_focus");
    }

    fn view_did_blur(&mut self) {
        self.record("view_did_blur");
    }

    fn did_hit_key(&mut self, key: &str) {
        self.record(format!("key {key}"));
    }

    fn did_hit_enter(&mut self) {
        self.record("enter");
    }

    fn user_did_sign_in(&mut self, user: &User) {
        self.record(format!("sign_in {}", user.email));
    }

    fn user_did_sign_out(&mut self) {
        self.record("sign_out");
    }
}

struct RecordingDelegate {
    tag: String,
    log: EventLog,
    options: AppOptions,
    bundle_id: BundleId,
    runtime: RuntimeHandle,
}

impl RecordingDelegate {
    fn record(&self, event: impl AsRef<str>) {
        self.log
            .borrow_mut()
            .push(format!("{}:{}", self.tag, event.as_ref()));
    }
}

impl ApplicationDelegate for RecordingDelegate {
    fn application_did_start(&mut self) {
        self.record("did_start");
    }

    fn application_did_focus(&mut self) {
        self.record("did_focus");
    }

    fn application_did_blur(&mut self) {
        self.record("did_blur");
    }

    fn application_did_stop(&mut self) {
        self.record("did_stop");
    }

    fn application_did_close_all_windows(&mut self) {
        self.record("did_close_all_windows");
        if self.options.quit_when_empty {
            self.runtime.close_application(&self.bundle_id);
        }
    }

    fn did_select_command(&mut self, command: &str) {
        self.record(format!("command {command}"));
    }

    fn menus(&self) -> Option<MenuGroup> {
        self.options.menus.clone()
    }

    fn app_menu(&self) -> Option<AppMenuSpec> {
        self.options.app_menu.clone()
    }
}

/// Descriptor with a `Main` window controller as entry point.
pub fn simple_app(bundle: &str, name: &str) -> Value {
    json!({
        "application": { "bundleId": bundle, "name": name, "main": "Main" },
        "controllers": { "Main": {} }
    })
}

pub fn descriptor_path(bundle: &str) -> String {
    format!("/boss/app/{bundle}/application.json")
}

pub fn template_path(bundle: &str, controller: &str) -> String {
    format!("/boss/app/{bundle}/controller/{controller}.html")
}

pub struct Desktop {
    pub manager: ApplicationManager,
    pub loader: GatedLoader,
    pub alerts: MemoryAlertPresenter,
    pub log: EventLog,
    installed: RefCell<BTreeMap<BundleId, InstalledApp>>,
}

pub fn desktop() -> Desktop {
    let loader = GatedLoader::default();
    let alerts = MemoryAlertPresenter::default();
    let services = HostServices::new(
        Rc::new(loader.clone()),
        Rc::new(alerts.clone()),
        HostStrategy::Headless,
    );
    let manager =
        ApplicationManager::new(RuntimeConfig::default(), services).expect("default config");
    Desktop {
        manager,
        loader,
        alerts,
        log: Rc::default(),
        installed: RefCell::default(),
    }
}

impl Desktop {
    pub fn install(&self, bundle: &str, descriptor: Value) -> BundleId {
        self.install_with(bundle, descriptor, AppOptions::default())
    }

    /// Serves the descriptor and one template per controller, and registers recording
    /// controllers and a recording delegate for the bundle.
    pub fn install_with(&self, bundle: &str, descriptor: Value, options: AppOptions) -> BundleId {
        let bundle_id = BundleId::new(bundle).expect("valid bundle id");
        let name = descriptor["application"]["name"]
            .as_str()
            .unwrap_or(bundle)
            .to_string();
        self.loader
            .resources
            .insert_json(descriptor_path(bundle), &descriptor);

        let tag = bundle.rsplit('.').next().unwrap_or(bundle).to_string();
        let controllers: Vec<String> = descriptor["controllers"]
            .as_object()
            .map(|controllers| controllers.keys().cloned().collect())
            .unwrap_or_default();
        let mut module = AppModule::new(bundle_id.clone());
        for controller in controllers
            .into_iter()
            .filter(|controller| controller != APPLICATION_CONTROLLER)
        {
            self.loader.resources.insert_text(
                template_path(bundle, &controller),
                format!("<div id=\"$(this.id)\">{controller}</div>"),
            );
            let log = Rc::clone(&self.log);
            let tag = format!("{tag}.{controller}");
            module = module.with_controller(controller, move |_ctx: SurfaceContext| {
                Box::new(RecordingController {
                    tag: tag.clone(),
                    log: Rc::clone(&log),
                }) as Box<dyn SurfaceController>
            });
        }
        let log = Rc::clone(&self.log);
        module = module.with_delegate(move |ctx: ApplicationContext| {
            Box::new(RecordingDelegate {
                tag: tag.clone(),
                log: Rc::clone(&log),
                options: options.clone(),
                bundle_id: ctx.bundle_id,
                runtime: ctx.runtime,
            }) as Box<dyn ApplicationDelegate>
        });
        self.manager.register_module(module);

        self.installed
            .borrow_mut()
            .insert(bundle_id.clone(), InstalledApp::new(name));
        self.manager
            .register_applications(self.installed.borrow().clone());
        bundle_id
    }

    pub fn open(&self, bundle_id: &BundleId) -> Result<(), RuntimeError> {
        block_on(self.manager.open(bundle_id, None))
    }

    /// Loads and shows `controller`, returning its surface.
    pub fn show(&self, bundle_id: &BundleId, controller: &str) -> SurfaceId {
        let id = block_on(self.manager.load_controller(bundle_id, controller, None))
            .expect("controller loads");
        self.manager
            .show_surface(id, Value::Null)
            .expect("surface shows");
        id
    }

    pub fn top_surface_of(&self, bundle_id: &BundleId) -> SurfaceId {
        self.manager
            .state()
            .topmost_surface_of(bundle_id)
            .expect("application has a stacked surface")
    }

    pub fn take_log(&self) -> Vec<String> {
        std::mem::take(&mut *self.log.borrow_mut())
    }
}
