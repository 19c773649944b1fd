use std::f32::consts::TAU;

use na::{Matrix4, Rotation3, Vector3, Vector4};

use crate::{
  buffer::GpuBuffer,
  config::Config,
  exts::state::DeviceTrait,
  instance::{MatrixInstance, OffsetInstance},
  instance_set::{Handle, InstanceSet},
  mesh::Mesh,
  pipeline::{Pipelines, ViewportUniform},
  transform,
  variant::Variant,
  vertex::SpriteVertex,
};

/// `grid * grid` offsets tiling clip space [-1, 1]², coloured by cell.
pub fn offset_grid(grid: u32) -> Vec<OffsetInstance> {
  let cell = 2.0 / grid.max(1) as f32;
  (0..grid)
    .flat_map(|y| (0..grid).map(move |x| (x, y)))
    .map(|(x, y)| OffsetInstance {
      position_offset: Vector3::new(
        -1.0 + (x as f32 + 0.5) * cell,
        -1.0 + (y as f32 + 0.5) * cell,
        0.0,
      ),
      colour: Vector3::new(x as f32 / grid as f32, y as f32 / grid as f32, 0.5),
    })
    .collect()
}

/// Quad sized to leave a gap between neighbouring grid cells.
pub fn grid_cell_mesh(grid: u32) -> Mesh {
  Mesh::quad(2.0 / grid.max(1) as f32 * 0.8)
}

/// Points on a ring of radius 0.7, sizes cycling through 1x..2.5x `size`.
pub fn sprite_ring(count: u32, size: f32) -> Vec<SpriteVertex> {
  (0..count)
    .map(|i| {
      let angle = TAU * i as f32 / count as f32;
      let (sin, cos) = angle.sin_cos();
      SpriteVertex {
        position: Vector4::new(0.7 * cos, 0.7 * sin, 0.0, 1.0),
        size: size * (1.0 + (i % 4) as f32 * 0.5),
        colour: Vector4::new(0.5 + 0.5 * cos, 0.5 + 0.5 * sin, 1.0 - 0.5 * cos.abs(), 1.0),
      }
    })
    .collect()
}

/// Where a matrix instance sits and how fast it spins.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Placement {
  pub translation: Vector3<f32>,
  pub scale: f32,
  /// radians per second
  pub spin: f32,
  pub angle: f32,
}

impl Placement {
  pub fn model_matrix(&self) -> Matrix4<f32> {
    Matrix4::new_translation(&self.translation)
      * Rotation3::from_euler_angles(self.angle * 0.5, self.angle, 0.0).to_homogeneous()
      * Matrix4::new_scaling(self.scale)
  }
}

/// 3x3 spheres; z = 0.5 keeps every vertex inside wgpu's [0, 1] clip depth.
pub fn sphere_placements() -> Vec<(Placement, [f32; 3])> {
  let mut out = Vec::with_capacity(9);
  for row in 0..3 {
    for column in 0..3 {
      let i = row * 3 + column;
      out.push((
        Placement {
          translation: Vector3::new(-0.6 + 0.6 * column as f32, -0.6 + 0.6 * row as f32, 0.5),
          scale: 0.2,
          spin: 0.5 + 0.25 * i as f32,
          angle: 0.0,
        },
        [
          0.3 + 0.2 * column as f32,
          0.3 + 0.2 * row as f32,
          0.8 - 0.1 * i as f32,
        ],
      ));
    }
  }
  out
}

pub struct MeshBuffers {
  vertex: GpuBuffer,
  index: GpuBuffer,
  index_count: u32,
}

impl MeshBuffers {
  fn new<T: DeviceTrait>(device: &T, queue: &wgpu::Queue, label: &str, mesh: &Mesh) -> Self {
    Self {
      vertex: GpuBuffer::with_contents(
        device,
        queue,
        &format!("{label} Vertex Buffer"),
        wgpu::BufferUsages::VERTEX,
        bytemuck::cast_slice(&mesh.vertices),
      ),
      index: GpuBuffer::with_contents(
        device,
        queue,
        &format!("{label} Index Buffer"),
        wgpu::BufferUsages::INDEX,
        bytemuck::cast_slice(&mesh.indices),
      ),
      index_count: mesh.indices.len() as u32,
    }
  }
}

/// Vertex and instance data for every variant.
pub struct Scene {
  cell: MeshBuffers,
  offset_instances: GpuBuffer,
  offset_count: u32,

  sprites: GpuBuffer,
  sprite_count: u32,
  viewport_buffer: wgpu::Buffer,
  viewport_bind_group: wgpu::BindGroup,

  sphere: MeshBuffers,
  spheres: InstanceSet<MatrixInstance>,
  placements: Vec<(Handle, Placement)>,
  sphere_instances: GpuBuffer,
  alternate_hidden: bool,
}

impl Scene {
  pub fn new<T: DeviceTrait>(
    device: &T,
    queue: &wgpu::Queue,
    pipelines: &Pipelines,
    config: &Config,
    surface_size: (u32, u32),
  ) -> Self {
    let offsets = offset_grid(config.grid);
    let cell = MeshBuffers::new(device, queue, "Grid Cell", &grid_cell_mesh(config.grid));
    let offset_instances = GpuBuffer::with_contents(
      device,
      queue,
      "Offset Instance Buffer",
      wgpu::BufferUsages::VERTEX,
      bytemuck::cast_slice(&offsets),
    );

    let ring = sprite_ring(config.sprite_count, config.sprite_size);
    let sprites = GpuBuffer::with_contents(
      device,
      queue,
      "Sprite Buffer",
      wgpu::BufferUsages::VERTEX,
      bytemuck::cast_slice(&ring),
    );
    let viewport = ViewportUniform::new(surface_size.0, surface_size.1);
    let viewport_buffer = device.create_buffer_init(
      "Viewport Buffer",
      bytemuck::cast_slice(&[viewport]),
      wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    );
    let viewport_bind_group = device.create_bind_group(
      "viewport_bind_group",
      &pipelines.viewport_layout,
      &[wgpu::BindGroupEntry {
        binding: 0,
        resource: viewport_buffer.as_entire_binding(),
      }],
    );

    let sphere = MeshBuffers::new(
      device,
      queue,
      "Sphere",
      &Mesh::sphere(config.sphere_refinements),
    );
    let mut spheres = InstanceSet::new();
    let placements = sphere_placements()
      .into_iter()
      .map(|(placement, colour)| {
        let handle =
          spheres.insert_visibly(MatrixInstance::new(placement.model_matrix(), colour));
        (handle, placement)
      })
      .collect();
    let sphere_instances = GpuBuffer::with_contents(
      device,
      queue,
      "Sphere Instance Buffer",
      wgpu::BufferUsages::VERTEX,
      bytemuck::cast_slice(spheres.visible()),
    );

    info!(
      offsets = offsets.len(),
      sprites = ring.len(),
      spheres = spheres.len(),
      "scene ready"
    );
    Self {
      cell,
      offset_instances,
      offset_count: offsets.len() as u32,
      sprites,
      sprite_count: ring.len() as u32,
      viewport_buffer,
      viewport_bind_group,
      sphere,
      spheres,
      placements,
      sphere_instances,
      alternate_hidden: false,
    }
  }

  pub fn resize(&self, queue: &wgpu::Queue, width: u32, height: u32) {
    queue.write_buffer(
      &self.viewport_buffer,
      0,
      bytemuck::cast_slice(&[ViewportUniform::new(width, height)]),
    );
  }

  /// Hides every other sphere, or shows them again.
  pub fn toggle_alternate(&mut self) {
    self.alternate_hidden = !self.alternate_hidden;
    for (i, (handle, _)) in self.placements.iter().enumerate() {
      if i % 2 == 0 {
        continue;
      }
      let result = if self.alternate_hidden {
        self.spheres.make_invisible(*handle)
      } else {
        self.spheres.make_visible(*handle)
      };
      if let Err(e) = result {
        warn!("{e}");
      }
    }
    debug!(visible = self.spheres.visible_len(), "toggled spheres");
  }

  /// Spins the spheres by `delta` seconds and re-uploads the visible ones.
  pub fn update<T: DeviceTrait>(&mut self, device: &T, queue: &wgpu::Queue, delta: f32) {
    for (handle, placement) in &mut self.placements {
      placement.angle = (placement.angle + placement.spin * delta) % TAU;
      if let Some(instance) = self.spheres.get_mut(*handle) {
        instance.model_matrix = placement.model_matrix();
      }
    }
    self
      .sphere_instances
      .fill(device, queue, bytemuck::cast_slice(self.spheres.visible()));
  }
}

pub trait DrawVariant<'a> {
  fn draw_variant(&mut self, scene: &'a Scene, pipelines: &'a Pipelines, variant: Variant);
  fn draw_mesh_instanced(&mut self, mesh: &'a MeshBuffers, instances: &'a GpuBuffer, count: u32);
}

impl<'a, 'b> DrawVariant<'b> for wgpu::RenderPass<'a>
where
  'b: 'a,
{
  fn draw_variant(&mut self, scene: &'b Scene, pipelines: &'b Pipelines, variant: Variant) {
    let pipeline = match pipelines.get(variant) {
      Some(pipeline) => pipeline,
      None => return,
    };
    self.set_pipeline(pipeline);
    match variant {
      Variant::InstancedOffset => {
        self.draw_mesh_instanced(&scene.cell, &scene.offset_instances, scene.offset_count)
      }
      Variant::PointSprite => {
        if scene.sprite_count > 0 {
          self.set_bind_group(0, &scene.viewport_bind_group, &[]);
          self.set_vertex_buffer(0, scene.sprites.slice());
          self.draw(0..SpriteVertex::QUAD_VERTICES, 0..scene.sprite_count);
        }
      }
      Variant::HardcodedTriangle => self.draw(0..transform::TRIANGLE.len() as u32, 0..1),
      Variant::InstancedMatrix => self.draw_mesh_instanced(
        &scene.sphere,
        &scene.sphere_instances,
        scene.spheres.visible_len() as u32,
      ),
    }
  }

  fn draw_mesh_instanced(&mut self, mesh: &'b MeshBuffers, instances: &'b GpuBuffer, count: u32) {
    if count == 0 || mesh.index_count == 0 {
      return;
    }
    self.set_vertex_buffer(0, mesh.vertex.slice());
    self.set_vertex_buffer(1, instances.slice());
    self.set_index_buffer(mesh.index.slice(), wgpu::IndexFormat::Uint32);
    self.draw_indexed(0..mesh.index_count, 0, 0..count);
  }
}
