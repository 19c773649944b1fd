use tracing::instrument;
use wgpu::include_wgsl;

use crate::{
  exts::state::DeviceTrait,
  instance::{MatrixInstance, OffsetInstance},
  variant::Variant,
  vertex::{SpriteVertex, Vertex},
};

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Depth test shared by every pipeline. The flat variants all sit at z = 0,
/// so equal depths still pass and draw in submission order.
pub fn depth_stencil_state() -> wgpu::DepthStencilState {
  wgpu::DepthStencilState {
    format: DEPTH_FORMAT,
    depth_write_enabled: true,
    depth_compare: wgpu::CompareFunction::LessEqual,
    stencil: wgpu::StencilState::default(),
    bias: wgpu::DepthBiasState::default(),
  }
}

/// Depth target the size of the surface.
pub fn depth_texture_descriptor(width: u32, height: u32) -> wgpu::TextureDescriptor<'static> {
  wgpu::TextureDescriptor {
    label: Some("depth_texture"),
    size: wgpu::Extent3d {
      width: width.max(1),
      height: height.max(1),
      depth_or_array_layers: 1,
    },
    mip_level_count: 1,
    sample_count: 1,
    dimension: wgpu::TextureDimension::D2,
    format: DEPTH_FORMAT,
    usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
  }
}

pub fn create_depth_view<T: DeviceTrait>(device: &T, width: u32, height: u32) -> wgpu::TextureView {
  device
    .get_device()
    .create_texture(&depth_texture_descriptor(width, height))
    .create_view(&wgpu::TextureViewDescriptor::default())
}

/// Framebuffer size in pixels, read by the sprite shader to turn pixel
/// sizes into clip-space extents.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ViewportUniform {
  size: [f32; 2],
  _pad: [f32; 2],
}
impl ViewportUniform {
  pub fn new(width: u32, height: u32) -> Self {
    Self {
      size: [width.max(1) as f32, height.max(1) as f32],
      _pad: [0.0; 2],
    }
  }
}

pub fn shader_source(variant: Variant) -> wgpu::ShaderModuleDescriptor<'static> {
  match variant {
    Variant::InstancedOffset => include_wgsl!("../assets/instanced_offset.wgsl"),
    Variant::PointSprite => include_wgsl!("../assets/point_sprite.wgsl"),
    Variant::HardcodedTriangle => include_wgsl!("../assets/hardcoded_triangle.wgsl"),
    Variant::InstancedMatrix => include_wgsl!("../assets/instanced_matrix.wgsl"),
  }
}

/// Vertex buffers in slot order.
pub fn buffer_layouts<'a>(variant: Variant) -> Vec<wgpu::VertexBufferLayout<'a>> {
  match variant {
    Variant::InstancedOffset => vec![Vertex::desc(), OffsetInstance::desc()],
    Variant::PointSprite => vec![SpriteVertex::desc()],
    Variant::HardcodedTriangle => vec![],
    Variant::InstancedMatrix => vec![Vertex::desc(), MatrixInstance::desc()],
  }
}

/// One render pipeline per variant plus the viewport layout the sprite
/// pipeline binds at group 0.
pub struct Pipelines {
  pub viewport_layout: wgpu::BindGroupLayout,
  pipelines: Vec<(Variant, wgpu::RenderPipeline)>,
}

impl Pipelines {
  pub fn new<T: DeviceTrait>(device: &T, format: wgpu::TextureFormat) -> Self {
    let viewport_layout = device.create_bind_group_layout(
      "viewport_bind_group_layout",
      &[wgpu::BindGroupLayoutEntry {
        binding: 0,
        visibility: wgpu::ShaderStages::VERTEX,
        ty: wgpu::BindingType::Buffer {
          ty: wgpu::BufferBindingType::Uniform,
          has_dynamic_offset: false,
          min_binding_size: None,
        },
        count: None,
      }],
    );
    let sprite_layouts = [&viewport_layout];
    let pipelines = Variant::ALL
      .iter()
      .map(|&variant| {
        let bind_group_layouts: &[&wgpu::BindGroupLayout] = if variant == Variant::PointSprite {
          &sprite_layouts
        } else {
          &[]
        };
        let pipeline = create_pipeline(device, variant, format, bind_group_layouts);
        (variant, pipeline)
      })
      .collect();
    Self {
      viewport_layout,
      pipelines,
    }
  }

  pub fn get(&self, variant: Variant) -> Option<&wgpu::RenderPipeline> {
    self
      .pipelines
      .iter()
      .find(|(v, _)| *v == variant)
      .map(|(_, p)| p)
  }
}

#[instrument(skip(device, bind_group_layouts))]
fn create_pipeline<T: DeviceTrait>(
  device: &T,
  variant: Variant,
  format: wgpu::TextureFormat,
  bind_group_layouts: &[&wgpu::BindGroupLayout],
) -> wgpu::RenderPipeline {
  debug!("creating pipeline");
  let shader = device.create_shader_module(shader_source(variant));
  let layout = device.create_pipeline_layout(
    &format!("{variant} Pipeline Layout"),
    bind_group_layouts,
    &[],
  );
  let buffers = buffer_layouts(variant);
  device.create_render_pipeline(
    &format!("{variant} Pipeline"),
    Some(&layout),
    wgpu::VertexState {
      module: &shader,
      entry_point: "vs_main",
      buffers: &buffers,
    },
    wgpu::PrimitiveState {
      topology: wgpu::PrimitiveTopology::TriangleList,
      strip_index_format: None,
      front_face: wgpu::FrontFace::Ccw,
      // no camera, so winding depends on whatever the instance matrix does
      cull_mode: None,
      polygon_mode: wgpu::PolygonMode::Fill,
      unclipped_depth: false,
      conservative: false,
    },
    Some(depth_stencil_state()),
    wgpu::MultisampleState {
      count: 1,
      mask: !0,
      alpha_to_coverage_enabled: false,
    },
    wgpu::FragmentState {
      module: &shader,
      entry_point: "fs_main",
      targets: &[Some(wgpu::ColorTargetState {
        format,
        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
        write_mask: wgpu::ColorWrites::ALL,
      })],
    },
    None,
  )
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    transform::{TRIANGLE, TRIANGLE_COLOURS},
    vertex::layouts_match,
  };

  #[test]
  fn every_variant_binds_its_contract() {
    for variant in Variant::ALL {
      assert!(
        layouts_match(variant, &buffer_layouts(variant)),
        "{variant} layouts disagree with its bindings"
      );
    }
  }

  fn wgsl(variant: Variant) -> String {
    match shader_source(variant).source {
      wgpu::ShaderSource::Wgsl(source) => source.into_owned(),
      #[allow(unreachable_patterns)]
      _ => panic!("{variant} is not WGSL"),
    }
  }

  fn parse(variant: Variant) -> naga::Module {
    let module = naga::front::wgsl::parse_str(&wgsl(variant))
      .unwrap_or_else(|e| panic!("{variant}: {e:?}"));
    naga::valid::Validator::new(
      naga::valid::ValidationFlags::all(),
      naga::valid::Capabilities::empty(),
    )
    .validate(&module)
    .unwrap_or_else(|e| panic!("{variant}: {e:?}"));
    module
  }

  fn vertex_format(inner: &naga::TypeInner) -> Option<wgpu::VertexFormat> {
    use naga::{ScalarKind::Float, TypeInner, VectorSize};
    match *inner {
      TypeInner::Scalar { kind: Float, width: 4 } => Some(wgpu::VertexFormat::Float32),
      TypeInner::Vector {
        size,
        kind: Float,
        width: 4,
      } => Some(match size {
        VectorSize::Bi => wgpu::VertexFormat::Float32x2,
        VectorSize::Tri => wgpu::VertexFormat::Float32x3,
        VectorSize::Quad => wgpu::VertexFormat::Float32x4,
      }),
      _ => None,
    }
  }

  /// `@location` inputs of `vs_main`, struct members flattened, by location.
  fn vertex_inputs(module: &naga::Module) -> Vec<(u32, Option<wgpu::VertexFormat>)> {
    let entry = module
      .entry_points
      .iter()
      .find(|e| e.name == "vs_main" && e.stage == naga::ShaderStage::Vertex)
      .expect("vs_main");
    let mut inputs = Vec::new();
    let mut push = |binding: &Option<naga::Binding>, ty: naga::Handle<naga::Type>| {
      if let Some(naga::Binding::Location { location, .. }) = binding {
        inputs.push((*location, vertex_format(&module.types[ty].inner)));
      }
    };
    for arg in &entry.function.arguments {
      match &module.types[arg.ty].inner {
        naga::TypeInner::Struct { members, .. } => {
          for member in members {
            push(&member.binding, member.ty);
          }
        }
        _ => push(&arg.binding, arg.ty),
      }
    }
    inputs.sort_by_key(|(location, _)| *location);
    inputs
  }

  /// Every `<ty>(a, b, ..)` constructor with literal arguments, in source order.
  fn literals(source: &str, ty: &str) -> Vec<Vec<f32>> {
    source
      .split(&format!("{ty}("))
      .skip(1)
      .filter_map(|rest| {
        let args = &rest[..rest.find(')')?];
        args
          .split(',')
          .map(|a| a.trim().parse::<f32>().ok())
          .collect::<Option<Vec<_>>>()
      })
      .collect()
  }

  #[test]
  fn shaders_validate() {
    for variant in Variant::ALL {
      let module = parse(variant);
      for (name, stage) in [
        ("vs_main", naga::ShaderStage::Vertex),
        ("fs_main", naga::ShaderStage::Fragment),
      ] {
        assert!(
          module
            .entry_points
            .iter()
            .any(|e| e.name == name && e.stage == stage),
          "{variant} has no {name}"
        );
      }
    }
  }

  #[test]
  fn shader_inputs_follow_bindings() {
    for variant in Variant::ALL {
      let mut expected: Vec<_> = variant
        .bindings()
        .iter()
        .map(|b| (b.location, Some(b.format)))
        .collect();
      expected.sort_by_key(|(location, _)| *location);
      assert_eq!(vertex_inputs(&parse(variant)), expected, "{variant}");
    }
  }

  #[test]
  fn triangle_shader_uses_the_constant_table() {
    let source = wgsl(Variant::HardcodedTriangle);
    let corners: Vec<_> = TRIANGLE.iter().map(|c| vec![c.x, c.y]).collect();
    assert_eq!(literals(&source, "vec2<f32>"), corners);
    let colours: Vec<_> = TRIANGLE_COLOURS
      .iter()
      .map(|c| vec![c.x, c.y, c.z])
      .collect();
    assert_eq!(literals(&source, "vec3<f32>"), colours);
  }

  #[test]
  fn sprite_shader_expands_a_quad() {
    let corners: Vec<_> = SpriteVertex::QUAD_CORNERS
      .iter()
      .map(|c| c.to_vec())
      .collect();
    assert_eq!(corners.len() as u32, SpriteVertex::QUAD_VERTICES);
    assert_eq!(literals(&wgsl(Variant::PointSprite), "vec2<f32>"), corners);
  }

  #[test]
  fn depth_target_follows_surface() {
    let desc = depth_texture_descriptor(800, 0);
    assert_eq!(desc.size.width, 800);
    assert_eq!(desc.size.height, 1);
    assert_eq!(desc.format, DEPTH_FORMAT);
    let state = depth_stencil_state();
    assert!(state.depth_write_enabled);
    assert_eq!(state.format, DEPTH_FORMAT);
    assert_eq!(state.depth_compare, wgpu::CompareFunction::LessEqual);
  }

  #[test]
  fn viewport_never_divides_by_zero() {
    let v = ViewportUniform::new(0, 600);
    assert_eq!(v.size, [1.0, 600.0]);
    assert_eq!(std::mem::size_of::<ViewportUniform>(), 16);
  }
}
