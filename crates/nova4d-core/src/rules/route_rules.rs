//! Per-route payload rules
//!
//! Each rule names the keys a payload must carry, alternative key groups, and
//! the route's risk level. Routes without a rule accept any object payload
//! and are treated as safe.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::Serialize;

use crate::policy::RiskLevel;

/// Schema and risk for one route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RouteRule {
    pub description: &'static str,
    pub risk: RiskLevel,
    /// Every key must be present
    pub required: &'static [&'static str],
    /// Each group needs at least one present key
    pub any_of: &'static [&'static [&'static str]],
    /// At least one of these keys must be present (ignored when empty)
    pub at_least_one_of: &'static [&'static str],
    /// Documented but never enforced
    pub optional: &'static [&'static str],
}

impl RouteRule {
    pub const fn new(description: &'static str, risk: RiskLevel) -> Self {
        Self {
            description,
            risk,
            required: &[],
            any_of: &[],
            at_least_one_of: &[],
            optional: &[],
        }
    }

    pub const fn required(mut self, keys: &'static [&'static str]) -> Self {
        self.required = keys;
        self
    }

    pub const fn any_of(mut self, groups: &'static [&'static [&'static str]]) -> Self {
        self.any_of = groups;
        self
    }

    pub const fn at_least_one_of(mut self, keys: &'static [&'static str]) -> Self {
        self.at_least_one_of = keys;
        self
    }

    pub const fn optional(mut self, keys: &'static [&'static str]) -> Self {
        self.optional = keys;
        self
    }
}

/// Rule applied to routes without an explicit entry
pub static DEFAULT_RULE: RouteRule = RouteRule::new("No explicit schema", RiskLevel::Safe);

const ROUTE_RULES: &[(&str, RouteRule)] = &[
    (
        "/nova4d/scene/spawn-object",
        RouteRule::new("Create a scene object.", RiskLevel::Safe)
            .optional(&["object_type", "name", "position", "rotation", "scale", "parent_name"]),
    ),
    (
        "/nova4d/scene/set-transform",
        RouteRule::new("Set position, rotation, or scale on an existing object.", RiskLevel::Safe)
            .any_of(&[&["target_name", "target_path"]])
            .at_least_one_of(&["position", "rotation", "scale"]),
    ),
    (
        "/nova4d/scene/set-property",
        RouteRule::new("Set object property.", RiskLevel::Moderate)
            .required(&["property", "value"])
            .any_of(&[&["target_name", "target_path"]]),
    ),
    (
        "/nova4d/scene/set-visibility",
        RouteRule::new("Set object editor/render visibility.", RiskLevel::Safe)
            .any_of(&[&["target_name", "target_path"]])
            .at_least_one_of(&["editor", "render"]),
    ),
    (
        "/nova4d/scene/set-color",
        RouteRule::new("Set object color.", RiskLevel::Safe)
            .required(&["color"])
            .any_of(&[&["target_name", "target_path"]]),
    ),
    (
        "/nova4d/scene/delete-object",
        RouteRule::new("Delete object from scene.", RiskLevel::Dangerous)
            .any_of(&[&["target_name", "target_path", "name"]]),
    ),
    (
        "/nova4d/scene/duplicate-object",
        RouteRule::new("Duplicate object.", RiskLevel::Safe)
            .any_of(&[&["target_name", "target_path", "name"]])
            .optional(&["new_name", "parent_name"]),
    ),
    (
        "/nova4d/scene/group-objects",
        RouteRule::new("Group objects under null.", RiskLevel::Safe)
            .required(&["object_names"])
            .optional(&["group_name"]),
    ),
    (
        "/nova4d/scene/parent-object",
        RouteRule::new("Parent one object under another.", RiskLevel::Safe)
            .required(&["child_name", "parent_name"]),
    ),
    (
        "/nova4d/scene/rename-object",
        RouteRule::new("Rename object.", RiskLevel::Safe)
            .required(&["new_name"])
            .any_of(&[&["target_name", "target_path", "name"]]),
    ),
    (
        "/nova4d/scene/select-object",
        RouteRule::new("Select object.", RiskLevel::Safe)
            .any_of(&[&["target_name", "target_path", "name"]]),
    ),
    (
        "/nova4d/scene/clear-selection",
        RouteRule::new("Clear scene selection.", RiskLevel::Safe),
    ),
    (
        "/nova4d/material/create-standard",
        RouteRule::new("Create standard material.", RiskLevel::Safe)
            .optional(&["name", "color"]),
    ),
    (
        "/nova4d/material/create-redshift",
        RouteRule::new("Create Redshift material (falls back if renderer plugin is unavailable).", RiskLevel::Safe)
            .optional(&["name"]),
    ),
    (
        "/nova4d/material/create-arnold",
        RouteRule::new("Create Arnold material (falls back if renderer plugin is unavailable).", RiskLevel::Safe)
            .optional(&["name"]),
    ),
    (
        "/nova4d/material/assign",
        RouteRule::new("Assign material to object.", RiskLevel::Safe)
            .required(&["target_name", "material_name"]),
    ),
    (
        "/nova4d/material/set-parameter",
        RouteRule::new("Set material parameter.", RiskLevel::Moderate)
            .required(&["material_name", "parameter", "value"]),
    ),
    (
        "/nova4d/material/set-texture",
        RouteRule::new("Set material texture path.", RiskLevel::Moderate)
            .required(&["material_name", "texture_path"]),
    ),
    (
        "/nova4d/mograph/cloner/create",
        RouteRule::new("Create cloner object.", RiskLevel::Safe)
            .optional(&["name", "parent_name"]),
    ),
    (
        "/nova4d/mograph/matrix/create",
        RouteRule::new("Create matrix object.", RiskLevel::Safe)
            .optional(&["name", "parent_name"]),
    ),
    (
        "/nova4d/mograph/effector/random",
        RouteRule::new("Create random effector.", RiskLevel::Safe)
            .optional(&["name", "parent_name"]),
    ),
    (
        "/nova4d/mograph/effector/plain",
        RouteRule::new("Create plain effector.", RiskLevel::Safe)
            .optional(&["name", "parent_name"]),
    ),
    (
        "/nova4d/mograph/effector/step",
        RouteRule::new("Create step effector.", RiskLevel::Safe)
            .optional(&["name", "parent_name"]),
    ),
    (
        "/nova4d/mograph/assign-effector",
        RouteRule::new("Assign effector metadata.", RiskLevel::Safe)
            .required(&["cloner_name", "effector_name"]),
    ),
    (
        "/nova4d/mograph/set-count",
        RouteRule::new("Set cloner count by parameter ID.", RiskLevel::Moderate)
            .required(&["count", "parameter_id"])
            .any_of(&[&["cloner_name", "target_name"]]),
    ),
    (
        "/nova4d/mograph/set-mode",
        RouteRule::new("Set cloner mode by parameter ID.", RiskLevel::Moderate)
            .required(&["mode", "parameter_id"])
            .any_of(&[&["cloner_name", "target_name"]]),
    ),
    (
        "/nova4d/xpresso/create-tag",
        RouteRule::new("Create XPresso tag.", RiskLevel::Safe)
            .optional(&["target_name", "name"]),
    ),
    (
        "/nova4d/xpresso/add-node",
        RouteRule::new("Add XPresso node to tag graph.", RiskLevel::Moderate),
    ),
    (
        "/nova4d/xpresso/connect",
        RouteRule::new("Connect XPresso ports between nodes.", RiskLevel::Moderate),
    ),
    (
        "/nova4d/xpresso/set-parameter",
        RouteRule::new("Set XPresso parameter and apply target value.", RiskLevel::Moderate),
    ),
    (
        "/nova4d/animation/set-key",
        RouteRule::new("Set animation key.", RiskLevel::Safe)
            .required(&["parameter", "value"])
            .any_of(&[&["target_name", "target_path", "name"]])
            .optional(&["frame", "interpolation"]),
    ),
    (
        "/nova4d/animation/delete-key",
        RouteRule::new("Delete animation key.", RiskLevel::Moderate)
            .required(&["parameter"])
            .any_of(&[&["target_name", "target_path", "name"]])
            .optional(&["frame"]),
    ),
    (
        "/nova4d/animation/set-range",
        RouteRule::new("Set timeline range.", RiskLevel::Safe)
            .optional(&["start_frame", "end_frame"]),
    ),
    (
        "/nova4d/animation/play",
        RouteRule::new("Play animation from frame/time cursor.", RiskLevel::Safe),
    ),
    (
        "/nova4d/animation/stop",
        RouteRule::new("Stop animation playback.", RiskLevel::Safe),
    ),
    (
        "/nova4d/animation/set-fps",
        RouteRule::new("Set document FPS.", RiskLevel::Moderate)
            .optional(&["fps"]),
    ),
    (
        "/nova4d/render/set-engine",
        RouteRule::new("Set render engine ID.", RiskLevel::Moderate)
            .any_of(&[&["engine", "engine_id"]]),
    ),
    (
        "/nova4d/render/frame",
        RouteRule::new("Render frame.", RiskLevel::Moderate)
            .optional(&["frame", "output_path"]),
    ),
    (
        "/nova4d/render/sequence",
        RouteRule::new("Render frame sequence.", RiskLevel::Moderate)
            .optional(&["start_frame", "end_frame", "step", "output_path"]),
    ),
    (
        "/nova4d/render/queue/redshift",
        RouteRule::new("Queue redshift render.", RiskLevel::Moderate),
    ),
    (
        "/nova4d/render/queue/arnold",
        RouteRule::new("Queue arnold render.", RiskLevel::Moderate),
    ),
    (
        "/nova4d/render/team-render/publish",
        RouteRule::new("Publish scene for Team Render.", RiskLevel::Moderate),
    ),
    (
        "/nova4d/viewport/set-camera",
        RouteRule::new("Set active camera.", RiskLevel::Safe)
            .any_of(&[&["camera_name", "target_name", "name"]]),
    ),
    (
        "/nova4d/viewport/focus-object",
        RouteRule::new("Frame/focus object or selection.", RiskLevel::Safe)
            .optional(&["target_name", "target_path", "name"]),
    ),
    (
        "/nova4d/viewport/screenshot",
        RouteRule::new("Capture viewport screenshot.", RiskLevel::Safe)
            .optional(&["frame", "output_path"]),
    ),
    (
        "/nova4d/viewport/set-display-mode",
        RouteRule::new("Set viewport display mode.", RiskLevel::Safe)
            .any_of(&[&["mode", "display_mode"]]),
    ),
    (
        "/nova4d/io/import/gltf",
        RouteRule::new("Import glTF file.", RiskLevel::Moderate)
            .required(&["file_path"]),
    ),
    (
        "/nova4d/io/import/fbx",
        RouteRule::new("Import FBX file.", RiskLevel::Moderate)
            .required(&["file_path"]),
    ),
    (
        "/nova4d/io/import/obj",
        RouteRule::new("Import OBJ file.", RiskLevel::Moderate)
            .required(&["file_path"]),
    ),
    (
        "/nova4d/io/export/gltf",
        RouteRule::new("Export glTF file.", RiskLevel::Moderate)
            .any_of(&[&["output_path", "file_path"]]),
    ),
    (
        "/nova4d/io/export/fbx",
        RouteRule::new("Export FBX file.", RiskLevel::Moderate)
            .any_of(&[&["output_path", "file_path"]]),
    ),
    (
        "/nova4d/io/export/obj",
        RouteRule::new("Export OBJ file.", RiskLevel::Moderate)
            .any_of(&[&["output_path", "file_path"]]),
    ),
    (
        "/nova4d/io/export/alembic",
        RouteRule::new("Export Alembic file.", RiskLevel::Moderate)
            .any_of(&[&["output_path", "file_path"]]),
    ),
    (
        "/nova4d/blender/import-gltf",
        RouteRule::new("Import Blender glTF with scale fix.", RiskLevel::Moderate)
            .required(&["file_path"]),
    ),
    (
        "/nova4d/blender/import-fbx",
        RouteRule::new("Import Blender FBX with scale fix.", RiskLevel::Moderate)
            .required(&["file_path"]),
    ),
    (
        "/nova4d/system/new-scene",
        RouteRule::new("Create new scene, replacing active doc.", RiskLevel::Dangerous),
    ),
    (
        "/nova4d/system/open-scene",
        RouteRule::new("Open scene file.", RiskLevel::Dangerous)
            .required(&["file_path"]),
    ),
    (
        "/nova4d/system/save-scene",
        RouteRule::new("Save scene file.", RiskLevel::Moderate)
            .required(&["file_path"]),
    ),
    (
        "/nova4d/headless/render-queue",
        RouteRule::new("Queue headless render.", RiskLevel::Moderate),
    ),
    (
        "/nova4d/headless/c4dpy-script",
        RouteRule::new("Queue c4dpy script execution.", RiskLevel::Dangerous),
    ),
    (
        "/nova4d/test/ping",
        RouteRule::new("Queue test ping command.", RiskLevel::Safe)
            .optional(&["message"]),
    ),
    (
        "/nova4d/introspection/scene",
        RouteRule::new("Collect scene summary snapshot from active C4D document.", RiskLevel::Safe)
            .optional(&["max_objects", "max_materials", "include_paths"]),
    ),
];

fn rule_index() -> &'static HashMap<&'static str, &'static RouteRule> {
    static INDEX: OnceLock<HashMap<&'static str, &'static RouteRule>> = OnceLock::new();
    INDEX.get_or_init(|| {
        ROUTE_RULES
            .iter()
            .map(|(path, rule)| (*path, rule))
            .collect()
    })
}

/// Rule for a route, falling back to [`DEFAULT_RULE`]
pub fn rule_for(route: &str) -> &'static RouteRule {
    rule_index().get(route).copied().unwrap_or(&DEFAULT_RULE)
}

/// Whether the route has an explicit rule
pub fn has_rule(route: &str) -> bool {
    rule_index().contains_key(route)
}

/// Risk level for a route
pub fn risk_for(route: &str) -> RiskLevel {
    rule_for(route).risk
}
