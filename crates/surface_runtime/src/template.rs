//! Template interpolation and script-fragment extraction.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static RE_ATTRIBUTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\(([A-Za-z_]\w*)\.([A-Za-z_]\w*)\)").unwrap());

static RE_CONTROLLER_REF: Lazy<Regex> = Lazy::new(|| Regex::new(r"%\(([A-Za-z_]\w*)\)").unwrap());

static RE_SCRIPT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script\b[^>]*>(.*?)</script\s*>").unwrap());

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// `group.key` attribute table resolved by [`interpolate`].
pub struct TemplateAttributes {
    values: BTreeMap<(String, String), String>,
}

impl TemplateAttributes {
    /// Sets `group.key`.
    pub fn set(
        &mut self,
        group: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> &mut Self {
        self.values.insert((group.into(), key.into()), value.into());
        self
    }

    /// Resolves `group.key`.
    pub fn get(&self, group: &str, key: &str) -> Option<&str> {
        self.values
            .get(&(group.to_string(), key.to_string()))
            .map(String::as_str)
    }
}

/// Replaces `$(group.key)` tokens. Unknown tokens are left verbatim.
pub fn interpolate(template: &str, attributes: &TemplateAttributes) -> String {
    RE_ATTRIBUTE
        .replace_all(template, |caps: &Captures<'_>| {
            attributes
                .get(&caps[1], &caps[2])
                .map(str::to_string)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Rewrites `%(Name)` back-references to `os.ui.controller.Name`.
pub fn interpolate_controller_refs(template: &str) -> String {
    RE_CONTROLLER_REF
        .replace_all(template, "os.ui.controller.$1")
        .into_owned()
}

/// Strips `<script>` blocks from `markup`, returning the remaining markup and each non-empty
/// script body in document order.
pub fn extract_scripts(markup: &str) -> (String, Vec<String>) {
    let scripts = RE_SCRIPT
        .captures_iter(markup)
        .filter_map(|caps| {
            let body = caps[1].trim();
            (!body.is_empty()).then(|| body.to_string())
        })
        .collect();
    let stripped = RE_SCRIPT.replace_all(markup, "").into_owned();
    (stripped, scripts)
}
