//! CPU reference of what each variant's `vs_main` writes, one invocation at a
//! time. The WGSL in `assets/` computes the same thing on the GPU.

use na::{Vector2, Vector3, Vector4};

use crate::{
  instance::{MatrixInstance, OffsetInstance},
  vertex::{SpriteVertex, Vertex},
};

/// Corners of the hard-coded triangle in clip space (z = 0, w = 1).
pub const TRIANGLE: [Vector2<f32>; 3] = [
  Vector2::new(0.0, -0.5),
  Vector2::new(0.5, 0.5),
  Vector2::new(-0.5, 0.5),
];
pub const TRIANGLE_COLOURS: [Vector3<f32>; 3] = [
  Vector3::new(1.0, 0.0, 0.0),
  Vector3::new(0.0, 1.0, 0.0),
  Vector3::new(0.0, 0.0, 1.0),
];
pub const TRIANGLE_POINT_SIZE: f32 = 10.0;

/// The record a vertex invocation hands to the fragment stage.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VertexOutput {
  pub clip_position: Vector4<f32>,
  pub point_size: Option<f32>,
  pub colour: Vector4<f32>,
}

/// `position + offset`, passed through as clip space.
pub fn offset(vertex: &Vertex, instance: &OffsetInstance) -> VertexOutput {
  VertexOutput {
    clip_position: (vertex.position + instance.position_offset).push(1.0),
    point_size: None,
    colour: instance.colour.push(1.0),
  }
}

pub fn point_sprite(vertex: &SpriteVertex) -> VertexOutput {
  VertexOutput {
    clip_position: vertex.position,
    point_size: Some(vertex.size),
    colour: vertex.colour,
  }
}

/// Ignores everything but the vertex index; indices past 2 wrap around.
pub fn hardcoded_triangle(vertex_index: u32) -> VertexOutput {
  let corner = (vertex_index % 3) as usize;
  let xy = TRIANGLE[corner];
  VertexOutput {
    clip_position: Vector4::new(xy.x, xy.y, 0.0, 1.0),
    point_size: Some(TRIANGLE_POINT_SIZE),
    colour: TRIANGLE_COLOURS[corner].push(1.0),
  }
}

/// `model_matrix * [position, 1]`.
pub fn instanced_matrix(vertex: &Vertex, instance: &MatrixInstance) -> VertexOutput {
  VertexOutput {
    clip_position: instance.model_matrix * vertex.position.push(1.0),
    point_size: None,
    colour: instance.colour.push(1.0),
  }
}
