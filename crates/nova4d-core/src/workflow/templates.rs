//! Command templates for the built-in workflows
//!
//! Every workflow is a fixed sequence drawn from one shared pool of builders.
//! Order matters: objects are created before anything refers to them.

use serde::Serialize;
use serde_json::json;

use crate::errors::Result;
use crate::model::{CommandCandidate, Payload};

use super::catalog::WorkflowId;
use super::options::WorkflowOptions;

pub const ROUTE_SPAWN_OBJECT: &str = "/nova4d/scene/spawn-object";
pub const ROUTE_CREATE_CLONER: &str = "/nova4d/mograph/cloner/create";
pub const ROUTE_CREATE_REDSHIFT: &str = "/nova4d/material/create-redshift";
pub const ROUTE_ASSIGN_MATERIAL: &str = "/nova4d/material/assign";
pub const ROUTE_SET_KEY: &str = "/nova4d/animation/set-key";
pub const ROUTE_RENDER_FRAME: &str = "/nova4d/render/frame";
pub const ROUTE_EXPORT_GLTF: &str = "/nova4d/io/export/gltf";
pub const ROUTE_IMPORT_BLENDER_GLTF: &str = "/nova4d/blender/import-gltf";

/// Parameter animated by the keyframe templates
const ANIMATED_PARAMETER: &str = "position.x";

/// One step of a workflow, not yet guarded or queued
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandTemplate {
    pub route: &'static str,
    pub payload: Payload,
    pub reason: &'static str,
}

impl CommandTemplate {
    fn new(route: &'static str, payload: serde_json::Value, reason: &'static str) -> Self {
        Self {
            route,
            payload: Payload::from_value(Some(&payload)),
            reason,
        }
    }
}

impl From<CommandTemplate> for CommandCandidate {
    fn from(template: CommandTemplate) -> Self {
        CommandCandidate::new(template.route, template.payload).with_reason(template.reason)
    }
}

fn spawn_cube(options: &WorkflowOptions) -> CommandTemplate {
    CommandTemplate::new(
        ROUTE_SPAWN_OBJECT,
        json!({
            "object_type": "cube",
            "name": options.object_name,
            "position": [0, 120, 0],
        }),
        "Create workflow base cube.",
    )
}

fn create_cloner(options: &WorkflowOptions) -> CommandTemplate {
    CommandTemplate::new(
        ROUTE_CREATE_CLONER,
        json!({ "name": options.cloner_name }),
        "Create workflow cloner.",
    )
}

fn create_redshift(options: &WorkflowOptions) -> CommandTemplate {
    CommandTemplate::new(
        ROUTE_CREATE_REDSHIFT,
        json!({ "name": options.material_name }),
        "Create workflow Redshift material.",
    )
}

fn assign_material(options: &WorkflowOptions) -> CommandTemplate {
    CommandTemplate::new(
        ROUTE_ASSIGN_MATERIAL,
        json!({
            "target_name": options.object_name,
            "material_name": options.material_name,
        }),
        "Assign workflow material to cube.",
    )
}

fn set_key(
    options: &WorkflowOptions,
    frame: i64,
    value: f64,
    reason: &'static str,
) -> CommandTemplate {
    CommandTemplate::new(
        ROUTE_SET_KEY,
        json!({
            "target_name": options.object_name,
            "parameter": ANIMATED_PARAMETER,
            "frame": frame,
            "value": value,
        }),
        reason,
    )
}

fn key_start(options: &WorkflowOptions) -> CommandTemplate {
    set_key(options, options.frame_start, options.start_value, "Animation start key.")
}

fn key_end(options: &WorkflowOptions) -> CommandTemplate {
    set_key(options, options.frame_end, options.end_value, "Animation end key.")
}

fn render_frame(options: &WorkflowOptions) -> CommandTemplate {
    CommandTemplate::new(
        ROUTE_RENDER_FRAME,
        json!({
            "frame": options.render_frame,
            "output_path": options.render_output,
        }),
        "Render workflow preview frame.",
    )
}

fn export_gltf(options: &WorkflowOptions) -> CommandTemplate {
    CommandTemplate::new(
        ROUTE_EXPORT_GLTF,
        json!({ "output_path": options.gltf_output }),
        "Export workflow scene to glTF.",
    )
}

fn import_blender_gltf(options: &WorkflowOptions) -> CommandTemplate {
    CommandTemplate::new(
        ROUTE_IMPORT_BLENDER_GLTF,
        json!({
            "file_path": options.gltf_output,
            "scale_fix": "blender_to_c4d",
        }),
        "Validate Blender glTF import path.",
    )
}

type Builder = fn(&WorkflowOptions) -> CommandTemplate;

const SPAWN_CUBE: &[Builder] = &[spawn_cube];
const MOGRAPH_CLONER: &[Builder] = &[create_cloner];
const REDSHIFT_MATERIAL: &[Builder] = &[spawn_cube, create_redshift, assign_material];
const ANIMATE_RENDER: &[Builder] = &[spawn_cube, key_start, key_end, render_frame];
const FULL_SMOKE: &[Builder] = &[
    spawn_cube,
    create_cloner,
    create_redshift,
    assign_material,
    key_start,
    key_end,
    render_frame,
];
const CINEMATIC_SMOKE: &[Builder] = &[
    spawn_cube,
    create_cloner,
    create_redshift,
    assign_material,
    key_start,
    key_end,
    render_frame,
    export_gltf,
    import_blender_gltf,
];

fn sequence(id: WorkflowId) -> &'static [Builder] {
    match id {
        WorkflowId::SpawnCube => SPAWN_CUBE,
        WorkflowId::MographCloner => MOGRAPH_CLONER,
        WorkflowId::RedshiftMaterial => REDSHIFT_MATERIAL,
        WorkflowId::AnimateRender => ANIMATE_RENDER,
        WorkflowId::FullSmoke => FULL_SMOKE,
        WorkflowId::CinematicSmoke => CINEMATIC_SMOKE,
    }
}

/// Expand a workflow into its ordered templates
pub fn build_workflow_commands(id: WorkflowId, options: &WorkflowOptions) -> Vec<CommandTemplate> {
    sequence(id).iter().map(|build| build(options)).collect()
}

/// String-keyed variant of [`build_workflow_commands`]
///
/// # Errors
///
/// `WorkflowNotFound` for ids outside the catalog.
pub fn build_workflow_commands_by_id(
    id: &str,
    options: &WorkflowOptions,
) -> Result<Vec<CommandTemplate>> {
    Ok(build_workflow_commands(id.parse()?, options))
}
