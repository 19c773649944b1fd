use na::{Matrix4, Vector3};

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct OffsetInstance {
  pub position_offset: Vector3<f32>,
  pub colour: Vector3<f32>,
}

impl OffsetInstance {
  const ATTRIBS: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![1 => Float32x3, 2 => Float32x3];

  pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
    use std::mem;
    wgpu::VertexBufferLayout {
      array_stride: mem::size_of::<Self>() as wgpu::BufferAddress,
      // 我们需要从把 Vertex 的 step mode 切换为 Instance
      // 这样着色器只有在开始处理一次新实例化绘制时，才会接受下一份实例
      step_mode: wgpu::VertexStepMode::Instance,
      attributes: &Self::ATTRIBS,
    }
  }
}

/// Column-major model matrix spread over locations 1..=4, colour at 5.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MatrixInstance {
  pub model_matrix: Matrix4<f32>,
  pub colour: Vector3<f32>,
}

impl MatrixInstance {
  const ATTRIBS: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
    1 => Float32x4,
    2 => Float32x4,
    3 => Float32x4,
    4 => Float32x4,
    5 => Float32x3
  ];

  pub fn new(model_matrix: Matrix4<f32>, colour: [f32; 3]) -> Self {
    MatrixInstance {
      model_matrix,
      colour: colour.into(),
    }
  }

  pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
    use std::mem;
    wgpu::VertexBufferLayout {
      array_stride: mem::size_of::<Self>() as wgpu::BufferAddress,
      step_mode: wgpu::VertexStepMode::Instance,
      attributes: &Self::ATTRIBS,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    variant::Variant,
    vertex::{layouts_match, Vertex},
  };

  #[test]
  fn matrix_instance_stride() {
    // 16 floats of matrix followed by 3 of colour, no padding
    assert_eq!(MatrixInstance::desc().array_stride, 76);
    assert_eq!(MatrixInstance::ATTRIBS[4].offset, 64);
  }

  #[test]
  fn layouts_follow_contract() {
    assert!(layouts_match(
      Variant::InstancedOffset,
      &[Vertex::desc(), OffsetInstance::desc()]
    ));
    assert!(layouts_match(
      Variant::InstancedMatrix,
      &[Vertex::desc(), MatrixInstance::desc()]
    ));
    assert!(layouts_match(Variant::HardcodedTriangle, &[]));
    assert!(!layouts_match(
      Variant::InstancedMatrix,
      &[Vertex::desc(), OffsetInstance::desc()]
    ));
  }

  #[test]
  fn matrix_columns_are_contiguous() {
    let m = Matrix4::new_translation(&Vector3::new(3.0, 4.0, 5.0));
    let instance = MatrixInstance::new(m, [0.5, 0.0, 0.0]);
    let floats: &[f32] = bytemuck::cast_slice(std::slice::from_ref(&instance));
    // fourth column carries the translation
    assert_eq!(&floats[12..16], &[3.0, 4.0, 5.0, 1.0]);
    assert_eq!(&floats[16..19], &[0.5, 0.0, 0.0]);
  }
}
