//! Registry of script fragments extracted from surface and application templates.

use std::collections::BTreeMap;

use surface_contract::{BundleId, SurfaceId, APPLICATION_CONTROLLER};

#[derive(Debug, Clone, PartialEq, Eq)]
/// One re-attached script fragment.
pub struct ScriptFragment {
    /// `<group>/<n>` identifier.
    pub id: String,
    /// Owning application.
    pub owner: BundleId,
    /// Source locator, `/<bundle>/<controller>/<group>/<n>`.
    pub locator: String,
    /// Script body.
    pub source: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Script fragments grouped by surface id or application script id.
pub struct ScriptRegistry {
    groups: BTreeMap<String, Vec<ScriptFragment>>,
    next_app_script: u64,
}

impl ScriptRegistry {
    /// Registers a surface's fragments under `<surface-id>/<n>` and returns their ids.
    pub fn register_surface(
        &mut self,
        surface_id: SurfaceId,
        owner: &BundleId,
        controller: &str,
        sources: Vec<String>,
    ) -> Vec<String> {
        self.register(surface_id.to_string(), owner, controller, sources)
    }

    /// Registers an application template's fragments under a fresh `AppScript_<n>` group.
    pub fn register_application(&mut self, owner: &BundleId, sources: Vec<String>) -> String {
        self.next_app_script += 1;
        let group = format!("AppScript_{}", self.next_app_script);
        self.register(group.clone(), owner, APPLICATION_CONTROLLER, sources);
        group
    }

    fn register(
        &mut self,
        group: String,
        owner: &BundleId,
        controller: &str,
        sources: Vec<String>,
    ) -> Vec<String> {
        let fragments: Vec<ScriptFragment> = sources
            .into_iter()
            .enumerate()
            .map(|(n, source)| ScriptFragment {
                id: format!("{group}/{n}"),
                owner: owner.clone(),
                locator: format!("/{owner}/{controller}/{group}/{n}"),
                source,
            })
            .collect();
        let ids = fragments.iter().map(|f| f.id.clone()).collect();
        self.groups.insert(group, fragments);
        ids
    }

    /// Unregisters a group. Returns the number of fragments removed.
    pub fn unregister(&mut self, group: &str) -> usize {
        self.groups.remove(group).map_or(0, |fragments| fragments.len())
    }

    /// Fragments registered under `group`.
    pub fn group(&self, group: &str) -> &[ScriptFragment] {
        self.groups.get(group).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total registered fragments owned by `owner`.
    pub fn count_for(&self, owner: &BundleId) -> usize {
        self.groups
            .values()
            .flatten()
            .filter(|fragment| &fragment.owner == owner)
            .count()
    }
}
