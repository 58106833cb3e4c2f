//! Scene building and the renderer seam
//!
//! [`build_scene`] is a pure read of the session: it never mutates state
//! and never logs, so it can run on every frame.

use crate::scene::{
    Color, Layer, Primitive, Rect, RenderCommand, Scene, SceneNode, Stroke, Transform,
};
use plan_area_core::{ImagePoint, MeasurementSession, Phase};
use std::convert::Infallible;

/// Visual style of the overlay, in screen pixels
#[derive(Debug, Clone, PartialEq)]
pub struct RenderStyle {
    /// Calibration segment and its markers
    pub calibration_color: Color,
    /// Measurement polygon outline and markers
    pub measurement_color: Color,
    /// Measurement polygon fill
    pub fill_color: Color,
    /// Vertex marker outline
    pub outline_color: Color,
    pub vertex_radius: f32,
    pub outline_width: f32,
    pub stroke_width: f32,
    pub label_size: f32,
    pub label_color: Color,
    pub label_background: Option<Color>,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            calibration_color: Color::from_rgb8(0xef, 0x44, 0x44, 1.0),
            measurement_color: Color::from_rgb8(0x3b, 0x82, 0xf6, 1.0),
            fill_color: Color::from_rgb8(59, 130, 246, 0.2),
            outline_color: Color::WHITE,
            vertex_radius: 6.0,
            outline_width: 2.0,
            stroke_width: 3.0,
            label_size: 16.0,
            label_color: Color::from_rgb8(0x1f, 0x29, 0x37, 1.0),
            label_background: Some(Color::rgba(1.0, 1.0, 1.0, 0.85)),
        }
    }
}

/// Build the frame for the current session state.
///
/// Sizes are divided by the view scale so markers and strokes keep a
/// constant on-screen size at every zoom level.
pub fn build_scene(session: &MeasurementSession, style: &RenderStyle) -> Scene {
    let view = session.view_state();
    let mut scene = Scene::new(Transform::from_view(&view));

    let Some(image) = session.image() else {
        return scene;
    };

    let inv = 1.0 / view.scale as f32;
    let cursor = session.cursor_image_point().map(to_f32);

    let mut image_node = SceneNode::new(Layer::Image);
    image_node.add_primitive(Primitive::Image {
        rect: Rect::new(0.0, 0.0, image.size.width as f32, image.size.height as f32),
        texture_id: image.id,
    });
    scene.push_node(image_node);

    // Calibration segment stays visible after the scale is set
    let calibration: Vec<[f32; 2]> =
        session.calibration_points().iter().copied().map(to_f32).collect();
    let mut calibration_node = SceneNode::new(Layer::Calibration);
    match calibration.as_slice() {
        [start] => {
            if let (Phase::Calibrate, Some(end)) = (session.phase(), cursor) {
                let preview = line(*start, end, style.calibration_color, style, inv);
                calibration_node.add_primitive(preview);
            }
        }
        [start, end, ..] => {
            calibration_node.add_primitive(line(*start, *end, style.calibration_color, style, inv));
        }
        [] => {}
    }
    add_markers(&mut calibration_node, &calibration, style.calibration_color, style, inv);
    scene.push_node(calibration_node);

    let vertices: Vec<[f32; 2]> =
        session.measurement_points().iter().copied().map(to_f32).collect();
    if !vertices.is_empty() {
        let mut measurement_node = SceneNode::new(Layer::Measurement);
        let stroke = Stroke::new(style.measurement_color, style.stroke_width * inv);

        if session.phase() == Phase::Result {
            measurement_node.add_primitive(Primitive::Polygon {
                points: vertices.clone(),
                fill_color: Some(style.fill_color),
                stroke: Some(stroke),
            });
        } else {
            let mut path = vertices.clone();
            if let (Phase::Measure, Some(c)) = (session.phase(), cursor) {
                path.push(c);
            }
            if path.len() >= 3 {
                measurement_node.add_primitive(Primitive::Polygon {
                    points: path.clone(),
                    fill_color: Some(style.fill_color),
                    stroke: None,
                });
            }
            if path.len() >= 2 {
                measurement_node.add_primitive(Primitive::Polyline {
                    points: path,
                    width: stroke.width,
                    color: stroke.color,
                    closed: false,
                });
            }
        }

        add_markers(&mut measurement_node, &vertices, style.measurement_color, style, inv);
        scene.push_node(measurement_node);
    }

    if let (Phase::Result, Some(result)) = (session.phase(), session.result()) {
        let mut result_node = SceneNode::new(Layer::Result);
        result_node.add_primitive(Primitive::Label {
            position: to_f32(result.label_position()),
            text: result.label(session.config().area_fraction_digits),
            size: style.label_size * inv,
            color: style.label_color,
            background: style.label_background,
        });
        scene.push_node(result_node);
    }

    scene
}

fn to_f32(point: ImagePoint) -> [f32; 2] {
    [point.x as f32, point.y as f32]
}

fn line(start: [f32; 2], end: [f32; 2], color: Color, style: &RenderStyle, inv: f32) -> Primitive {
    Primitive::Line {
        start,
        end,
        width: style.stroke_width * inv,
        color,
    }
}

fn add_markers(
    node: &mut SceneNode,
    points: &[[f32; 2]],
    color: Color,
    style: &RenderStyle,
    inv: f32,
) {
    for &center in points {
        node.add_primitive(Primitive::Circle {
            center,
            radius: style.vertex_radius * inv,
            fill_color: color,
            stroke: Some(Stroke::new(style.outline_color, style.outline_width * inv)),
        });
    }
}

/// Drawing backend implemented by the host
pub trait Renderer {
    type Error;

    /// Draw one frame
    fn render(&mut self, scene: &Scene) -> Result<(), Self::Error>;
}

/// Render statistics for debugging and profiling
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RenderStats {
    /// Number of frames rendered
    pub frame_count: usize,
    /// Number of primitives in the last frame
    pub primitive_count: usize,
    /// Number of nodes in the last frame
    pub node_count: usize,
}

impl RenderStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all counters to zero
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Headless renderer that keeps the last frame's commands
#[derive(Debug, Default)]
pub struct CommandRecorder {
    commands: Vec<RenderCommand>,
    stats: RenderStats,
}

impl CommandRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands of the last rendered frame
    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    pub fn stats(&self) -> &RenderStats {
        &self.stats
    }
}

impl Renderer for CommandRecorder {
    type Error = Infallible;

    fn render(&mut self, scene: &Scene) -> Result<(), Self::Error> {
        self.commands = scene.collect_render_commands();
        self.stats.frame_count += 1;
        self.stats.primitive_count = self.commands.len();
        self.stats.node_count = scene.nodes().len();
        Ok(())
    }
}
