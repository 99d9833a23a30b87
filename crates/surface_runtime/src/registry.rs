//! Compile-time controller registry populated by application modules at startup.

use std::{collections::BTreeMap, rc::Rc};

use surface_contract::{ApplicationDelegate, BundleId, SurfaceController, SurfaceId};

use crate::manager::RuntimeHandle;

/// Context handed to a controller mount function.
#[derive(Clone)]
pub struct SurfaceContext {
    /// Surface the controller drives.
    pub surface_id: SurfaceId,
    /// Owning application.
    pub bundle_id: BundleId,
    /// Controller name from the descriptor.
    pub controller_name: String,
    /// Weak handle back into the runtime.
    pub runtime: RuntimeHandle,
}

/// Context handed to an application delegate mount function.
#[derive(Clone)]
pub struct ApplicationContext {
    /// Application the delegate serves.
    pub bundle_id: BundleId,
    /// Weak handle back into the runtime.
    pub runtime: RuntimeHandle,
}

/// Builds the controller for one surface.
pub type ControllerMountFn = Rc<dyn Fn(SurfaceContext) -> Box<dyn SurfaceController>>;

/// Builds the delegate for one application load.
pub type DelegateMountFn = Rc<dyn Fn(ApplicationContext) -> Box<dyn ApplicationDelegate>>;

#[derive(Clone)]
/// Controller and delegate factories for one bundle.
pub struct AppModule {
    bundle_id: BundleId,
    delegate: Option<DelegateMountFn>,
    controllers: BTreeMap<String, ControllerMountFn>,
}

impl AppModule {
    /// Creates an empty module for `bundle_id`.
    pub fn new(bundle_id: BundleId) -> Self {
        Self {
            bundle_id,
            delegate: None,
            controllers: BTreeMap::new(),
        }
    }

    /// Sets the application delegate factory.
    pub fn with_delegate<F>(mut self, mount: F) -> Self
    where
        F: Fn(ApplicationContext) -> Box<dyn ApplicationDelegate> + 'static,
    {
        self.delegate = Some(Rc::new(mount));
        self
    }

    /// Registers the factory for controller `name`.
    pub fn with_controller<F>(mut self, name: impl Into<String>, mount: F) -> Self
    where
        F: Fn(SurfaceContext) -> Box<dyn SurfaceController> + 'static,
    {
        self.controllers.insert(name.into(), Rc::new(mount));
        self
    }

    /// Bundle served by this module.
    pub fn bundle_id(&self) -> &BundleId {
        &self.bundle_id
    }

    /// Returns whether a controller factory is registered under `name`.
    pub fn has_controller(&self, name: &str) -> bool {
        self.controllers.contains_key(name)
    }

    pub(crate) fn mount_controller(&self, context: SurfaceContext) -> Option<Box<dyn SurfaceController>> {
        self.controllers
            .get(&context.controller_name)
            .map(|mount| mount(context.clone()))
    }

    pub(crate) fn mount_delegate(&self, context: ApplicationContext) -> Option<Box<dyn ApplicationDelegate>> {
        self.delegate.as_ref().map(|mount| mount(context))
    }
}

#[derive(Clone, Default)]
/// Modules keyed by bundle id.
pub struct ControllerRegistry {
    modules: BTreeMap<BundleId, AppModule>,
}

impl ControllerRegistry {
    /// Registers a module, replacing any previous module for the same bundle.
    pub fn register(&mut self, module: AppModule) {
        let bundle_id = module.bundle_id.clone();
        if self.modules.insert(bundle_id.clone(), module).is_some() {
            tracing::warn!(bundle_id = %bundle_id, "replaced previously registered app module");
        }
    }

    /// Looks up a module.
    pub fn module(&self, bundle_id: &BundleId) -> Option<&AppModule> {
        self.modules.get(bundle_id)
    }
}
