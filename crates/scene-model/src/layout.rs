//! Renderer output layout.

use std::path::{Path, PathBuf};

use scenecast_common::config::MediaConfig;

use crate::quality::ResolutionToken;
use crate::scene::{Scene, SCENES};

/// Where the renderer writes per-scene videos:
/// `{media_root}/{renderer_name}/{token}/{scene}.mp4`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaLayout {
    pub media_root: PathBuf,
    pub renderer_name: String,
}

impl MediaLayout {
    pub fn new(media_root: impl Into<PathBuf>, renderer_name: impl Into<String>) -> Self {
        Self {
            media_root: media_root.into(),
            renderer_name: renderer_name.into(),
        }
    }

    /// Layout rooted under `base` (a project directory) instead of the
    /// working directory. Absolute media roots are left as they are.
    pub fn rooted_at(&self, base: &Path) -> Self {
        Self {
            media_root: base.join(&self.media_root),
            renderer_name: self.renderer_name.clone(),
        }
    }

    /// Directory holding all scenes rendered at `token`.
    pub fn quality_dir(&self, token: &ResolutionToken) -> PathBuf {
        self.media_root
            .join(&self.renderer_name)
            .join(token.as_str())
    }

    pub fn scene_video_path(&self, token: &ResolutionToken, scene: &Scene) -> PathBuf {
        self.quality_dir(token).join(format!("{}.mp4", scene.name))
    }

    /// Every scene's expected video, in video order.
    pub fn scene_video_paths(&self, token: &ResolutionToken) -> Vec<PathBuf> {
        SCENES
            .iter()
            .map(|scene| self.scene_video_path(token, scene))
            .collect()
    }
}

impl Default for MediaLayout {
    fn default() -> Self {
        MediaConfig::default().into()
    }
}

impl From<MediaConfig> for MediaLayout {
    fn from(config: MediaConfig) -> Self {
        Self::new(config.media_root, config.renderer_name)
    }
}
