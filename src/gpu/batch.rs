//! Display list to GPU instance conversion.

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec4};

use crate::render::{DisplayList, DrawCommand, GradientStop};

pub const KIND_DISC: u32 = 0;
pub const KIND_SEGMENT: u32 = 1;
pub const KIND_RING: u32 = 2;
pub const KIND_FILL: u32 = 3;

/// One instanced quad, laid out to match `InstanceIn` in `shapes.wgsl`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ShapeInstance {
    pub a: [f32; 2],
    pub b: [f32; 2],
    pub color0: [f32; 4],
    pub color1: [f32; 4],
    pub radius: f32,
    pub kind: u32,
    pub _pad: [f32; 2],
}

impl ShapeInstance {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 6] = wgpu::vertex_attr_array![
        0 => Float32x2,
        1 => Float32x2,
        2 => Float32x4,
        3 => Float32x4,
        4 => Float32,
        5 => Uint32
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ShapeInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }

    fn new(kind: u32, a: Vec2, b: Vec2, color0: Vec4, color1: Vec4, radius: f32) -> Self {
        Self {
            a: a.to_array(),
            b: b.to_array(),
            color0: color0.to_array(),
            color1: color1.to_array(),
            radius,
            kind,
            _pad: [0.0; 2],
        }
    }

    fn segment(from: Vec2, to: Vec2, width: f32, color: Vec4) -> Self {
        Self::new(KIND_SEGMENT, from, to, color, color, width * 0.5)
    }
}

/// Flatten a display list into instances, preserving paint order.
///
/// Polygons become one segment per edge; radial gradients become one ring per
/// pair of adjacent stops, plus a solid disc inside the first stop.
pub fn build_instances(list: &DisplayList) -> Vec<ShapeInstance> {
    let mut out = Vec::with_capacity(list.len());
    for command in list {
        match command {
            DrawCommand::Fill { color } => {
                out.push(ShapeInstance::new(KIND_FILL, Vec2::ZERO, Vec2::ZERO, *color, *color, 0.0));
            }
            DrawCommand::Circle { center, radius, color } => {
                if center.is_finite() {
                    out.push(ShapeInstance::new(KIND_DISC, *center, Vec2::ZERO, *color, *color, *radius));
                }
            }
            DrawCommand::Line { from, to, width, color } => {
                if from.is_finite() && to.is_finite() {
                    out.push(ShapeInstance::segment(*from, *to, *width, *color));
                }
            }
            DrawCommand::Polygon { points, width, color } => {
                for (i, &a) in points.iter().enumerate() {
                    let b = points[(i + 1) % points.len()];
                    if a.is_finite() && b.is_finite() {
                        out.push(ShapeInstance::segment(a, b, *width, *color));
                    }
                }
            }
            DrawCommand::RadialGradient {
                center,
                inner_radius,
                outer_radius,
                stops,
            } => push_gradient(&mut out, *center, *inner_radius, *outer_radius, stops),
        }
    }
    out
}

fn push_gradient(out: &mut Vec<ShapeInstance>, center: Vec2, inner: f32, outer: f32, stops: &[GradientStop]) {
    let (Some(first), Some(last)) = (stops.first(), stops.last()) else {
        return;
    };
    let span = outer - inner;
    let at = |offset: f32| inner + offset.clamp(0.0, 1.0) * span;

    let mut rings: Vec<(f32, f32, Vec4, Vec4)> = Vec::with_capacity(stops.len() + 1);
    let start = at(first.offset);
    if start > 0.0 {
        rings.push((0.0, start, first.color, first.color));
    }
    for pair in stops.windows(2) {
        let (r0, r1) = (at(pair[0].offset), at(pair[1].offset));
        if r1 > r0 {
            rings.push((r0, r1, pair[0].color, pair[1].color));
        }
    }
    if at(last.offset) < outer {
        rings.push((at(last.offset), outer, last.color, last.color));
    }

    let count = rings.len();
    for (i, (r0, r1, c0, c1)) in rings.into_iter().enumerate() {
        let soft = if i + 1 == count { 1.0 } else { 0.0 };
        out.push(ShapeInstance::new(KIND_RING, center, Vec2::new(r0, r1), c0, c1, soft));
    }
}
