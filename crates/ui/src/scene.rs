//! Scene description for the measurement overlay
//!
//! A scene is rebuilt from the session on every change: a view transform
//! plus ordered layers of primitives in image coordinates. The host
//! applies the transform and draws the primitives in order.

use plan_area_core::ViewState;
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for a scene node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u64);

impl NodeId {
    /// Create a new unique node ID
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Translation followed by scale, mapping image space to surface space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Translation (x, y) in surface pixels
    pub translation: [f32; 2],
    /// Scale (x, y)
    pub scale: [f32; 2],
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: [0.0, 0.0],
            scale: [1.0, 1.0],
        }
    }
}

impl Transform {
    /// Transform for the current pan and zoom
    pub fn from_view(view: &ViewState) -> Self {
        Self {
            translation: [view.offset_x as f32, view.offset_y as f32],
            scale: [view.scale as f32, view.scale as f32],
        }
    }
}

/// RGBA color value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);

    /// Create a new color from RGBA values (0.0 to 1.0)
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create a new opaque color from RGB values
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Create a color from 8-bit channels and an alpha in 0.0..=1.0
    pub fn from_rgb8(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self::rgba(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, a)
    }
}

/// Rectangle primitive
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Top-left x coordinate
    pub x: f32,
    /// Top-left y coordinate
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }
}

/// Outline of a shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f32,
}

impl Stroke {
    pub fn new(color: Color, width: f32) -> Self {
        Self { color, width }
    }
}

/// Visual primitive types that can be rendered
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// The loaded plan, drawn at its intrinsic size
    Image { rect: Rect, texture_id: u64 },
    /// Line segment
    Line {
        start: [f32; 2],
        end: [f32; 2],
        width: f32,
        color: Color,
    },
    /// Filled circle with optional outline
    Circle {
        center: [f32; 2],
        radius: f32,
        fill_color: Color,
        stroke: Option<Stroke>,
    },
    /// Connected line segments
    Polyline {
        points: Vec<[f32; 2]>,
        width: f32,
        color: Color,
        closed: bool,
    },
    /// Closed shape with optional fill and outline
    Polygon {
        points: Vec<[f32; 2]>,
        fill_color: Option<Color>,
        stroke: Option<Stroke>,
    },
    /// Text centred on `position`
    Label {
        position: [f32; 2],
        text: String,
        size: f32,
        color: Color,
        background: Option<Color>,
    },
}

/// Which part of the overlay a node draws
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    Image,
    Calibration,
    Measurement,
    Result,
}

/// A group of primitives drawn together
#[derive(Debug, Clone)]
pub struct SceneNode {
    id: NodeId,
    layer: Layer,
    primitives: Vec<Primitive>,
}

impl SceneNode {
    /// Create an empty node for a layer
    pub fn new(layer: Layer) -> Self {
        Self {
            id: NodeId::new(),
            layer,
            primitives: Vec::new(),
        }
    }

    /// Get the node's unique ID
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn layer(&self) -> Layer {
        self.layer
    }

    /// Add a primitive to this node
    pub fn add_primitive(&mut self, primitive: Primitive) {
        self.primitives.push(primitive);
    }

    /// Get primitives
    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }
}

/// Everything the host needs to draw one frame
#[derive(Debug, Clone, Default)]
pub struct Scene {
    transform: Transform,
    nodes: Vec<SceneNode>,
}

impl Scene {
    /// Create an empty scene with the given view transform
    pub fn new(transform: Transform) -> Self {
        Self {
            transform,
            nodes: Vec::new(),
        }
    }

    /// Image-to-surface transform
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Append a node; empty nodes are dropped
    pub fn push_node(&mut self, node: SceneNode) {
        if !node.is_empty() {
            self.nodes.push(node);
        }
    }

    /// Nodes in draw order
    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    /// First node for a layer, if present
    pub fn layer(&self, layer: Layer) -> Option<&SceneNode> {
        self.nodes.iter().find(|node| node.layer == layer)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All primitives in draw order
    pub fn primitives(&self) -> impl Iterator<Item = &Primitive> {
        self.nodes.iter().flat_map(|node| node.primitives.iter())
    }

    /// Flatten the scene into draw commands
    pub fn collect_render_commands(&self) -> Vec<RenderCommand> {
        self.primitives()
            .map(|primitive| RenderCommand {
                transform: self.transform,
                primitive: primitive.clone(),
            })
            .collect()
    }
}

/// A render command combining a primitive with its transform
#[derive(Debug, Clone, PartialEq)]
pub struct RenderCommand {
    pub transform: Transform,
    pub primitive: Primitive,
}
