//! Workflow catalog
//!
//! Fixed at compile time. Ids are modelled as [`WorkflowId`] so the template
//! builder can never be asked for a workflow that does not exist; string ids
//! are resolved once at the boundary.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::NovaError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowId {
    SpawnCube,
    MographCloner,
    RedshiftMaterial,
    AnimateRender,
    FullSmoke,
    CinematicSmoke,
}

impl WorkflowId {
    pub const ALL: [WorkflowId; 6] = [
        WorkflowId::SpawnCube,
        WorkflowId::MographCloner,
        WorkflowId::RedshiftMaterial,
        WorkflowId::AnimateRender,
        WorkflowId::FullSmoke,
        WorkflowId::CinematicSmoke,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowId::SpawnCube => "spawn_cube",
            WorkflowId::MographCloner => "mograph_cloner",
            WorkflowId::RedshiftMaterial => "redshift_material",
            WorkflowId::AnimateRender => "animate_render",
            WorkflowId::FullSmoke => "full_smoke",
            WorkflowId::CinematicSmoke => "cinematic_smoke",
        }
    }

    pub fn spec(&self) -> &'static WorkflowSpec {
        &WORKFLOW_SPECS[*self as usize]
    }
}

impl std::fmt::Display for WorkflowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkflowId {
    type Err = NovaError;

    /// Exact match on the stable id
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WorkflowId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| NovaError::WorkflowNotFound {
                workflow_id: s.to_string(),
            })
    }
}

/// Catalog entry for one named workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WorkflowSpec {
    pub id: WorkflowId,
    pub name: &'static str,
    pub description: &'static str,
}

/// Indexed by `WorkflowId as usize`
const WORKFLOW_SPECS: [WorkflowSpec; 6] = [
    WorkflowSpec {
        id: WorkflowId::SpawnCube,
        name: "Spawn Cube",
        description: "Create a single cube object.",
    },
    WorkflowSpec {
        id: WorkflowId::MographCloner,
        name: "MoGraph Cloner Setup",
        description: "Create a cloner object.",
    },
    WorkflowSpec {
        id: WorkflowId::RedshiftMaterial,
        name: "Redshift Material",
        description: "Create and assign a Redshift material.",
    },
    WorkflowSpec {
        id: WorkflowId::AnimateRender,
        name: "Animate + Render",
        description: "Set keys and render frame 0.",
    },
    WorkflowSpec {
        id: WorkflowId::FullSmoke,
        name: "Full Workflow Smoke",
        description: "Cube + cloner + Redshift + animation + render.",
    },
    WorkflowSpec {
        id: WorkflowId::CinematicSmoke,
        name: "Cinematic Smoke",
        description: "Cube + cloner + Redshift + animation + render + glTF export/import.",
    },
];

/// All workflows in catalog order
pub fn workflow_specs() -> &'static [WorkflowSpec] {
    &WORKFLOW_SPECS
}

/// Look up a workflow by its string id
pub fn find_workflow(id: &str) -> Option<&'static WorkflowSpec> {
    id.parse::<WorkflowId>().ok().map(|id| id.spec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_specs_indexed_by_id() {
        for id in WorkflowId::ALL {
            assert_eq!(id.spec().id, id);
        }
        assert_eq!(workflow_specs().len(), 6);
    }

    #[test]
    fn test_parse_is_exact() {
        assert_eq!(
            "cinematic_smoke".parse::<WorkflowId>().unwrap(),
            WorkflowId::CinematicSmoke
        );
        assert!(" spawn_cube".parse::<WorkflowId>().is_err());
        assert!(find_workflow("Spawn_Cube").is_none());
        assert_eq!(
            find_workflow("full_smoke").map(|spec| spec.name),
            Some("Full Workflow Smoke")
        );
    }

    #[test]
    fn test_id_serializes_as_stable_string() {
        assert_eq!(
            serde_json::to_string(&WorkflowId::MographCloner).unwrap(),
            "\"mograph_cloner\""
        );
    }
}
