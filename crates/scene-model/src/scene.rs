//! The ordered scene list.

use scenecast_common::error::{ScenecastError, ScenecastResult};

/// One independently renderable segment of the animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Scene {
    /// Class name the renderer looks up in the scene file.
    pub name: &'static str,

    /// Human-readable title.
    pub title: &'static str,
}

/// Every scene, in final video order.
pub const SCENES: [Scene; 8] = [
    Scene {
        name: "Part0_Introduction",
        title: "Title and authors",
    },
    Scene {
        name: "Part1_FlowMatching",
        title: "Flow matching with stochastic interpolants",
    },
    Scene {
        name: "Part2_FlowMapDefinition",
        title: "Flow map definition",
    },
    Scene {
        name: "Part3_TangentCondition",
        title: "Tangent condition",
    },
    Scene {
        name: "Part4_EulerianLoss",
        title: "Eulerian self-distillation",
    },
    Scene {
        name: "Part5_ProgressiveLoss",
        title: "Progressive self-distillation",
    },
    Scene {
        name: "Part6_LagrangianLoss",
        title: "Lagrangian self-distillation",
    },
    Scene {
        name: "Part7_MethodComparison",
        title: "Method comparison",
    },
];

/// Look up a scene by its exact name.
pub fn find_scene(name: &str) -> Option<&'static Scene> {
    SCENES.iter().find(|s| s.name == name)
}

/// Scene names in video order.
pub fn scene_names() -> impl Iterator<Item = &'static str> {
    SCENES.iter().map(|s| s.name)
}

/// Resolve a subset of scenes by name.
///
/// The result always follows [`SCENES`] order regardless of argument order,
/// and duplicates collapse. An empty selection means every scene.
pub fn select_scenes<S: AsRef<str>>(names: &[S]) -> ScenecastResult<Vec<Scene>> {
    if names.is_empty() {
        return Ok(SCENES.to_vec());
    }

    let unknown: Vec<&str> = names
        .iter()
        .map(AsRef::as_ref)
        .filter(|n| find_scene(n).is_none())
        .collect();
    if !unknown.is_empty() {
        return Err(ScenecastError::invalid_argument(format!(
            "unknown scene(s): {}. Known scenes: {}",
            unknown.join(", "),
            scene_names().collect::<Vec<_>>().join(", ")
        )));
    }

    Ok(SCENES
        .iter()
        .filter(|s| names.iter().any(|n| n.as_ref() == s.name))
        .copied()
        .collect())
}
