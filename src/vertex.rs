use na::{Vector3, Vector4};

use crate::variant::{Step, Variant};

/// Mesh vertex shared by the two instanced variants, position only.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
  pub position: Vector3<f32>,
}
impl Vertex {
  const ATTRIBS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];

  pub const fn new(x: f32, y: f32, z: f32) -> Self {
    Vertex {
      position: Vector3::new(x, y, z),
    }
  }

  pub fn midpoint(a: &Vertex, b: &Vertex) -> Vertex {
    Vertex {
      position: (a.position + b.position) * 0.5,
    }
  }

  pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
    wgpu::VertexBufferLayout {
      // array_stride 定义了每个顶点的宽度
      array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
      step_mode: wgpu::VertexStepMode::Vertex,
      attributes: &Self::ATTRIBS,
    }
  }
}

/// A point sprite. wgpu has no point-size builtin, so every point is drawn
/// as one instance of a six-vertex quad and these attributes step per
/// instance.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SpriteVertex {
  pub position: Vector4<f32>,
  pub size: f32,
  pub colour: Vector4<f32>,
}
impl SpriteVertex {
  const ATTRIBS: [wgpu::VertexAttribute; 3] =
    wgpu::vertex_attr_array![0 => Float32x4, 1 => Float32, 2 => Float32x4];

  /// Two counter-clockwise triangles over a unit square centred on the point,
  /// in the order `point_sprite.wgsl` reads them by vertex index.
  pub const QUAD_CORNERS: [[f32; 2]; 6] = [
    [-0.5, -0.5],
    [0.5, -0.5],
    [-0.5, 0.5],
    [0.5, -0.5],
    [0.5, 0.5],
    [-0.5, 0.5],
  ];
  /// vertices per expanded sprite quad
  pub const QUAD_VERTICES: u32 = Self::QUAD_CORNERS.len() as u32;

  pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
    wgpu::VertexBufferLayout {
      array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
      step_mode: wgpu::VertexStepMode::Instance,
      attributes: &Self::ATTRIBS,
    }
  }
}

/// Checks a set of buffer layouts against a variant's attribute contract.
pub fn layouts_match(variant: Variant, layouts: &[wgpu::VertexBufferLayout]) -> bool {
  let mut declared = Vec::new();
  for layout in layouts {
    let step = match layout.step_mode {
      wgpu::VertexStepMode::Vertex => Step::Vertex,
      wgpu::VertexStepMode::Instance => Step::Instance,
    };
    for attr in layout.attributes {
      declared.push((attr.shader_location, attr.format, step));
    }
  }
  declared.sort_by_key(|(location, ..)| *location);
  let expected: Vec<_> = variant
    .bindings()
    .iter()
    .map(|b| (b.location, b.format, b.step))
    .collect();
  declared == expected
}

#[test]
fn test_sprite_layout() {
  assert_eq!(std::mem::size_of::<SpriteVertex>(), 36);
  assert!(layouts_match(Variant::PointSprite, &[SpriteVertex::desc()]));
  assert!(!layouts_match(Variant::PointSprite, &[Vertex::desc()]));
}

#[test]
fn test_midpoint() {
  let m = Vertex::midpoint(&Vertex::new(0.0, 2.0, -4.0), &Vertex::new(2.0, 0.0, 4.0));
  assert_eq!(m, Vertex::new(1.0, 1.0, 0.0));
}

#[test]
fn test_quad_corners_cover_unit_square() {
  let area: f32 = SpriteVertex::QUAD_CORNERS
    .chunks(3)
    .map(|t| {
      let [a, b, c] = [t[0], t[1], t[2]];
      ((b[0] - a[0]) * (c[1] - a[1]) - (c[0] - a[0]) * (b[1] - a[1])) / 2.0
    })
    .inspect(|signed| assert!(*signed > 0.0, "triangle is not counter-clockwise"))
    .sum();
  assert_eq!(area, 1.0);
}
