//! scenecast Scene Model
//!
//! Defines the data the render and combine pipelines share:
//! - **Scenes:** The single ordered list of renderable segments
//! - **Quality:** Renderer quality selectors and their output directories
//! - **Layout:** Where the renderer writes each scene's video
//!
//! The scene order here is the order of the final combined video.

pub mod layout;
pub mod quality;
pub mod scene;

pub use layout::*;
pub use quality::*;
pub use scene::*;
