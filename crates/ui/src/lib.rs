//! Plan Area UI Library
//!
//! Input routing, the real-length dialog and scene building for the
//! measurement surface. Drawing itself is left to a host [`Renderer`].
//!
//! [`Renderer`]: renderer::Renderer

pub mod input;
pub mod length_dialog;
pub mod renderer;
pub mod scene;

pub use input::{InputHandler, Key, Modifiers, PointerAction, PointerButton};
pub use length_dialog::{DialogOutcome, LengthDialog, LENGTH_UNIT};
pub use renderer::{build_scene, CommandRecorder, RenderStats, RenderStyle, Renderer};
pub use scene::{
    Color, Layer, NodeId, Primitive, Rect, RenderCommand, Scene, SceneNode, Stroke, Transform,
};
