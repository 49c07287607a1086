//! scenecast Render Engine
//!
//! Drives the external tools that turn the scene file into the final video.
//! Every stage runs one process at a time and stops at the first failure.
//!
//! # Pipeline Architecture
//!
//! ```text
//! manim_flow_maps.py ──┐
//!                      ├── renderer -q<quality>, once per scene
//! scene list ──────────┘         │
//!                                ▼
//!        media/videos/manim_flow_maps/<token>/Part*.mp4
//!                                │
//!                                ├── concat manifest (scene order)
//!                                ▼
//!                     ffmpeg -f concat -c copy
//!                                │
//!                                ▼
//!               static/videos/flow_maps_method.mp4
//!                                │
//!                                ▼
//!                     ffprobe (duration report)
//! ```

pub mod combine;
pub mod manifest;
pub mod pipeline;
pub mod probe;
pub mod render;
pub mod runner;

pub use combine::*;
pub use manifest::*;
pub use pipeline::*;
pub use probe::*;
pub use render::*;
pub use runner::*;
