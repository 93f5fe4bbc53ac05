//! Registry of the kinds this binary knows about, addressed by type name.

mod karmada;

use std::sync::Arc;

use crate::adapter::Variant;
use crate::kind::ResourceKind;

const MANIFEST_SUFFIX: &str = "_manifest";

#[derive(Debug, Clone)]
pub struct Catalog {
    kinds: Vec<Arc<ResourceKind>>,
}

impl Catalog {
    pub fn new(kinds: impl IntoIterator<Item = ResourceKind>) -> Self {
        Self {
            kinds: kinds.into_iter().map(Arc::new).collect(),
        }
    }

    /// The built-in Karmada policy kinds.
    pub fn builtin() -> Self {
        Self::new(karmada::kinds())
    }

    pub fn kinds(&self) -> &[Arc<ResourceKind>] {
        &self.kinds
    }

    /// Resolve a type name. Names ending in `_manifest` select the
    /// render-only variant; all others the live resource.
    pub fn lookup(&self, type_name: &str) -> Option<(Arc<ResourceKind>, Variant)> {
        let (base, variant) = match type_name.strip_suffix(MANIFEST_SUFFIX) {
            Some(base) => (base, Variant::Manifest),
            None => (type_name, Variant::Resource),
        };
        self.kinds
            .iter()
            .find(|kind| kind.type_name() == base)
            .map(|kind| (Arc::clone(kind), variant))
    }

    /// Every addressable type name, resource and manifest variant of each
    /// kind.
    pub fn type_names(&self) -> Vec<String> {
        self.kinds
            .iter()
            .flat_map(|kind| [kind.type_name(), kind.manifest_type_name()])
            .collect()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}
