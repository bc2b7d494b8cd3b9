//! Workflow option normalization
//!
//! Callers send a loose JSON bag. [`workflow_defaults`] turns any bag into a
//! fully populated [`WorkflowOptions`]; it cannot fail. Keys it does not know
//! are kept verbatim in `extra`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::coerce::{parse_float, parse_integer, string_option};

/// Lowest accepted frame number
pub const FRAME_MIN: i64 = -100_000;
/// Highest accepted frame number
pub const FRAME_MAX: i64 = 1_000_000;

pub const DEFAULT_OBJECT_NAME: &str = "WorkflowCube";
pub const DEFAULT_CLONER_NAME: &str = "WorkflowCloner";
pub const DEFAULT_MATERIAL_NAME: &str = "WorkflowRedshiftMat";
pub const DEFAULT_FRAME_START: i64 = 0;
pub const DEFAULT_FRAME_END: i64 = 30;
pub const DEFAULT_START_VALUE: f64 = 0.0;
pub const DEFAULT_END_VALUE: f64 = 180.0;
pub const DEFAULT_RENDER_OUTPUT: &str = "/tmp/nova4d-workflow-frame.png";
pub const DEFAULT_GLTF_OUTPUT: &str = "/tmp/nova4d-workflow-smoke.gltf";

const KNOWN_KEYS: [&str; 10] = [
    "object_name",
    "cloner_name",
    "material_name",
    "frame_start",
    "frame_end",
    "start_value",
    "end_value",
    "render_frame",
    "render_output",
    "gltf_output",
];

/// Normalized workflow options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowOptions {
    pub object_name: String,
    pub cloner_name: String,
    pub material_name: String,
    pub frame_start: i64,
    pub frame_end: i64,
    pub start_value: f64,
    pub end_value: f64,
    /// Defaults to `frame_start`
    pub render_frame: i64,
    pub render_output: String,
    pub gltf_output: String,
    /// Unrecognized keys, passed through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for WorkflowOptions {
    fn default() -> Self {
        workflow_defaults(&Map::new())
    }
}

/// Normalize a loose option bag
///
/// Strings are trimmed and fall back to their default when empty. Frames are
/// integers clamped to `[-100000, 1000000]`; values are finite floats.
pub fn workflow_defaults(options: &Map<String, Value>) -> WorkflowOptions {
    let text = |key: &str, default: &str| string_option(options.get(key), default);
    let frame = |key: &str, default: i64| {
        parse_integer(options.get(key), default, FRAME_MIN, FRAME_MAX)
    };

    let frame_start = frame("frame_start", DEFAULT_FRAME_START);
    let extra = options
        .iter()
        .filter(|(key, _)| !KNOWN_KEYS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    WorkflowOptions {
        object_name: text("object_name", DEFAULT_OBJECT_NAME),
        cloner_name: text("cloner_name", DEFAULT_CLONER_NAME),
        material_name: text("material_name", DEFAULT_MATERIAL_NAME),
        frame_start,
        frame_end: frame("frame_end", DEFAULT_FRAME_END),
        start_value: parse_float(options.get("start_value"), DEFAULT_START_VALUE),
        end_value: parse_float(options.get("end_value"), DEFAULT_END_VALUE),
        render_frame: frame("render_frame", frame_start),
        render_output: text("render_output", DEFAULT_RENDER_OUTPUT),
        gltf_output: text("gltf_output", DEFAULT_GLTF_OUTPUT),
        extra,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bag(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn test_defaults_for_empty_bag() {
        let options = WorkflowOptions::default();
        assert_eq!(options.object_name, "WorkflowCube");
        assert_eq!(options.cloner_name, "WorkflowCloner");
        assert_eq!(options.material_name, "WorkflowRedshiftMat");
        assert_eq!(options.frame_start, 0);
        assert_eq!(options.frame_end, 30);
        assert_eq!(options.start_value, 0.0);
        assert_eq!(options.end_value, 180.0);
        assert_eq!(options.render_frame, 0);
        assert_eq!(options.render_output, "/tmp/nova4d-workflow-frame.png");
        assert_eq!(options.gltf_output, "/tmp/nova4d-workflow-smoke.gltf");
        assert!(options.extra.is_empty());
    }

    #[test]
    fn test_blank_name_falls_back() {
        let options = workflow_defaults(&bag(json!({"object_name": "  "})));
        assert_eq!(options.object_name, "WorkflowCube");
    }

    #[test]
    fn test_render_frame_follows_clamped_frame_start() {
        let options = workflow_defaults(&bag(json!({"frame_start": "-999999"})));
        assert_eq!(options.frame_start, FRAME_MIN);
        assert_eq!(options.render_frame, FRAME_MIN);

        let options = workflow_defaults(&bag(json!({"frame_start": 12, "render_frame": 40})));
        assert_eq!(options.render_frame, 40);
    }

    #[test]
    fn test_malformed_numbers_degrade() {
        let options = workflow_defaults(&bag(json!({
            "frame_end": "soon",
            "start_value": "NaN",
            "end_value": {"deg": 90},
        })));
        assert_eq!(options.frame_end, 30);
        assert_eq!(options.start_value, 0.0);
        assert_eq!(options.end_value, 180.0);
    }

    #[test]
    fn test_unknown_keys_pass_through() {
        let options = workflow_defaults(&bag(json!({"camera": "Cam1", "object_name": "Hero"})));
        assert_eq!(options.extra.get("camera"), Some(&json!("Cam1")));
        assert!(!options.extra.contains_key("object_name"));

        let json = serde_json::to_value(&options).unwrap();
        assert_eq!(json["camera"], json!("Cam1"));
        assert_eq!(json["object_name"], json!("Hero"));
    }
}
