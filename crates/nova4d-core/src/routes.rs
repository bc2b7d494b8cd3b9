//! Route registry
//!
//! Static lookup from route path to `{category, action}`. Built once and
//! read-only afterwards; any route a caller names that is absent here makes
//! admission fail closed with `RouteNotFound`.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::Serialize;

use crate::errors::{NovaError, Result};

/// One routable command endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RouteSpec {
    pub path: &'static str,
    pub category: &'static str,
    pub action: &'static str,
}

impl RouteSpec {
    pub const fn new(path: &'static str, category: &'static str, action: &'static str) -> Self {
        Self {
            path,
            category,
            action,
        }
    }
}

const BUILTIN_ROUTES: &[RouteSpec] = &[
    RouteSpec::new("/nova4d/scene/spawn-object", "scene", "spawn-object"),
    RouteSpec::new("/nova4d/scene/set-transform", "scene", "set-transform"),
    RouteSpec::new("/nova4d/scene/set-property", "scene", "set-property"),
    RouteSpec::new("/nova4d/scene/set-visibility", "scene", "set-visibility"),
    RouteSpec::new("/nova4d/scene/set-color", "scene", "set-color"),
    RouteSpec::new("/nova4d/scene/delete-object", "scene", "delete-object"),
    RouteSpec::new("/nova4d/scene/duplicate-object", "scene", "duplicate-object"),
    RouteSpec::new("/nova4d/scene/group-objects", "scene", "group-objects"),
    RouteSpec::new("/nova4d/scene/parent-object", "scene", "parent-object"),
    RouteSpec::new("/nova4d/scene/rename-object", "scene", "rename-object"),
    RouteSpec::new("/nova4d/scene/select-object", "scene", "select-object"),
    RouteSpec::new("/nova4d/scene/clear-selection", "scene", "clear-selection"),
    RouteSpec::new("/nova4d/material/create-standard", "material", "create-standard-material"),
    RouteSpec::new("/nova4d/material/create-redshift", "material", "create-redshift-material"),
    RouteSpec::new("/nova4d/material/create-arnold", "material", "create-arnold-material"),
    RouteSpec::new("/nova4d/material/assign", "material", "assign-material"),
    RouteSpec::new("/nova4d/material/set-parameter", "material", "set-material-parameter"),
    RouteSpec::new("/nova4d/material/set-texture", "material", "set-material-texture"),
    RouteSpec::new("/nova4d/mograph/cloner/create", "mograph", "create-cloner"),
    RouteSpec::new("/nova4d/mograph/matrix/create", "mograph", "create-matrix"),
    RouteSpec::new("/nova4d/mograph/effector/random", "mograph", "create-random-effector"),
    RouteSpec::new("/nova4d/mograph/effector/plain", "mograph", "create-plain-effector"),
    RouteSpec::new("/nova4d/mograph/effector/step", "mograph", "create-step-effector"),
    RouteSpec::new("/nova4d/mograph/assign-effector", "mograph", "assign-effector"),
    RouteSpec::new("/nova4d/mograph/set-count", "mograph", "set-cloner-count"),
    RouteSpec::new("/nova4d/mograph/set-mode", "mograph", "set-cloner-mode"),
    RouteSpec::new("/nova4d/xpresso/create-tag", "xpresso", "create-xpresso-tag"),
    RouteSpec::new("/nova4d/xpresso/add-node", "xpresso", "add-xpresso-node"),
    RouteSpec::new("/nova4d/xpresso/connect", "xpresso", "connect-xpresso-ports"),
    RouteSpec::new("/nova4d/xpresso/set-parameter", "xpresso", "set-xpresso-parameter"),
    RouteSpec::new("/nova4d/animation/set-key", "animation", "set-key"),
    RouteSpec::new("/nova4d/animation/delete-key", "animation", "delete-key"),
    RouteSpec::new("/nova4d/animation/set-range", "animation", "set-range"),
    RouteSpec::new("/nova4d/animation/play", "animation", "play"),
    RouteSpec::new("/nova4d/animation/stop", "animation", "stop"),
    RouteSpec::new("/nova4d/animation/set-fps", "animation", "set-fps"),
    RouteSpec::new("/nova4d/render/set-engine", "render", "set-render-engine"),
    RouteSpec::new("/nova4d/render/frame", "render", "render-frame"),
    RouteSpec::new("/nova4d/render/sequence", "render", "render-sequence"),
    RouteSpec::new("/nova4d/render/queue/redshift", "render", "queue-redshift-render"),
    RouteSpec::new("/nova4d/render/queue/arnold", "render", "queue-arnold-render"),
    RouteSpec::new("/nova4d/render/team-render/publish", "render", "publish-team-render"),
    RouteSpec::new("/nova4d/viewport/set-camera", "viewport", "set-camera"),
    RouteSpec::new("/nova4d/viewport/focus-object", "viewport", "focus-object"),
    RouteSpec::new("/nova4d/viewport/screenshot", "viewport", "capture-screenshot"),
    RouteSpec::new("/nova4d/viewport/set-display-mode", "viewport", "set-display-mode"),
    RouteSpec::new("/nova4d/io/import/gltf", "io", "import-gltf"),
    RouteSpec::new("/nova4d/io/import/fbx", "io", "import-fbx"),
    RouteSpec::new("/nova4d/io/import/obj", "io", "import-obj"),
    RouteSpec::new("/nova4d/io/export/gltf", "io", "export-gltf"),
    RouteSpec::new("/nova4d/io/export/fbx", "io", "export-fbx"),
    RouteSpec::new("/nova4d/io/export/obj", "io", "export-obj"),
    RouteSpec::new("/nova4d/io/export/alembic", "io", "export-alembic"),
    RouteSpec::new("/nova4d/blender/import-gltf", "blender", "import-blender-gltf"),
    RouteSpec::new("/nova4d/blender/import-fbx", "blender", "import-blender-fbx"),
    RouteSpec::new("/nova4d/system/new-scene", "system", "new-scene"),
    RouteSpec::new("/nova4d/system/open-scene", "system", "open-scene"),
    RouteSpec::new("/nova4d/system/save-scene", "system", "save-scene"),
    RouteSpec::new("/nova4d/headless/render-queue", "headless", "headless-render-queue"),
    RouteSpec::new("/nova4d/headless/c4dpy-script", "headless", "run-c4dpy-script"),
    RouteSpec::new("/nova4d/introspection/scene", "introspection", "introspect-scene"),
    RouteSpec::new("/nova4d/test/ping", "test", "test-ping"),
];

/// Immutable route table with O(1) lookup and stable listing order
#[derive(Debug, Clone)]
pub struct RouteRegistry {
    ordered: Vec<RouteSpec>,
    by_path: HashMap<&'static str, usize>,
}

static GLOBAL_REGISTRY: OnceLock<RouteRegistry> = OnceLock::new();

impl RouteRegistry {
    /// Build a registry from explicit specs; a repeated path keeps its first entry
    pub fn from_specs(specs: impl IntoIterator<Item = RouteSpec>) -> Self {
        let mut ordered = Vec::new();
        let mut by_path = HashMap::new();
        for spec in specs {
            if by_path.contains_key(spec.path) {
                continue;
            }
            by_path.insert(spec.path, ordered.len());
            ordered.push(spec);
        }
        Self { ordered, by_path }
    }

    /// Registry of every route the remote application understands
    pub fn builtin() -> Self {
        Self::from_specs(BUILTIN_ROUTES.iter().copied())
    }

    /// Process-wide builtin registry, constructed on first use
    pub fn global() -> &'static RouteRegistry {
        GLOBAL_REGISTRY.get_or_init(Self::builtin)
    }

    pub fn get(&self, path: &str) -> Option<&RouteSpec> {
        self.by_path.get(path).map(|&idx| &self.ordered[idx])
    }

    /// Resolve a route or fail closed
    ///
    /// # Errors
    ///
    /// Returns `RouteNotFound` if `path` is not registered.
    pub fn resolve(&self, path: &str) -> Result<&RouteSpec> {
        self.get(path).ok_or_else(|| NovaError::RouteNotFound {
            route: path.to_string(),
        })
    }

    pub fn contains(&self, path: &str) -> bool {
        self.by_path.contains_key(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RouteSpec> {
        self.ordered.iter()
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// Distinct categories in first-seen order
    pub fn categories(&self) -> Vec<&'static str> {
        let mut seen = Vec::new();
        for spec in &self.ordered {
            if !seen.contains(&spec.category) {
                seen.push(spec.category);
            }
        }
        seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup() {
        let registry = RouteRegistry::builtin();
        let spec = registry.get("/nova4d/material/create-redshift").unwrap();
        assert_eq!(spec.category, "material");
        assert_eq!(spec.action, "create-redshift-material");
        assert_eq!(registry.len(), BUILTIN_ROUTES.len());
    }

    #[test]
    fn test_resolve_unknown_fails_closed() {
        let err = RouteRegistry::global()
            .resolve("/nova4d/scene/explode")
            .unwrap_err();
        assert_eq!(
            err,
            NovaError::RouteNotFound {
                route: "/nova4d/scene/explode".to_string()
            }
        );
    }

    #[test]
    fn test_duplicate_paths_keep_first() {
        let registry = RouteRegistry::from_specs([
            RouteSpec::new("/a", "one", "first"),
            RouteSpec::new("/a", "two", "second"),
        ]);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("/a").unwrap().action, "first");
    }

    #[test]
    fn test_categories_are_distinct() {
        let categories = RouteRegistry::builtin().categories();
        assert_eq!(categories.first(), Some(&"scene"));
        assert!(categories.contains(&"blender"));
        let mut deduped = categories.clone();
        deduped.dedup();
        assert_eq!(deduped.len(), categories.len());
    }
}
