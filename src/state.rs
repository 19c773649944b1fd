use color_eyre::eyre::{eyre, Result};
use colored::Colorize;
use wgpu::Backends;
use winit::{
  event::{VirtualKeyCode, WindowEvent},
  window::Window,
};

use crate::{
  config::Config,
  input,
  pipeline::{self, Pipelines},
  scene::{DrawVariant, Scene},
  time,
  variant::Variant,
};

/// Seconds between two switches while Space or V is held.
const SWITCH_COOLDOWN: f32 = 0.3;

pub struct State {
  surface: wgpu::Surface,
  device: wgpu::Device,
  queue: wgpu::Queue,
  config: wgpu::SurfaceConfiguration,
  pub size: winit::dpi::PhysicalSize<u32>,
  depth_view: wgpu::TextureView,

  pipelines: Pipelines,
  scene: Scene,
  variant: Variant,
  clear_color: wgpu::Color,
}

impl State {
  // Creating some of the wgpu types requires async code
  pub async fn new(window: &Window, settings: &Config) -> Result<Self> {
    let size = window.inner_size();
    // instance is a handle to gpu
    let instance = wgpu::Instance::new(Backends::all());
    let surface = unsafe { instance.create_surface(window) };
    let adapter = instance
      .request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::default(),
        force_fallback_adapter: false,
        compatible_surface: Some(&surface),
      })
      .await
      .ok_or_else(|| eyre!("no suitable graphics adapter"))?;
    info!(adapter = ?adapter.get_info().name, "adapter selected");
    let (device, queue) = adapter
      .request_device(
        &wgpu::DeviceDescriptor {
          label: None,
          features: wgpu::Features::empty(),
          limits: wgpu::Limits::default(),
        },
        None,
      )
      .await?;
    let format = *surface
      .get_supported_formats(&adapter)
      .first()
      .ok_or_else(|| eyre!("surface is incompatible with the adapter"))?;
    let config = wgpu::SurfaceConfiguration {
      usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
      format,
      width: size.width.max(1),
      height: size.height.max(1),
      present_mode: settings.present_mode.into(),
    };
    surface.configure(&device, &config);
    let depth_view = pipeline::create_depth_view(&device, config.width, config.height);

    let pipelines = Pipelines::new(&device, config.format);
    let scene = Scene::new(
      &device,
      &queue,
      &pipelines,
      settings,
      (config.width, config.height),
    );
    let [r, g, b] = settings.clear_color;

    info!("showing {}", settings.variant.name().bold());
    Ok(Self {
      surface,
      device,
      queue,
      config,
      size,
      depth_view,
      pipelines,
      scene,
      variant: settings.variant,
      clear_color: wgpu::Color { r, g, b, a: 1.0 },
    })
  }

  pub fn variant(&self) -> Variant {
    self.variant
  }

  pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
    if new_size.width > 0 && new_size.height > 0 {
      self.size = new_size;
      self.config.width = new_size.width;
      self.config.height = new_size.height;
      self.surface.configure(&self.device, &self.config);
      // 深度纹理需要和 surface 一样大
      self.depth_view =
        pipeline::create_depth_view(&self.device, new_size.width, new_size.height);
      self
        .scene
        .resize(&self.queue, new_size.width, new_size.height);
    };
  }

  /// Records key state; the keys are acted on in `update`. Returns true when
  /// the event was consumed.
  pub fn input(&mut self, event: &WindowEvent) -> bool {
    if let WindowEvent::KeyboardInput { input: key, .. } = event {
      input::handle_keyboard(key);
    }
    false
  }

  pub fn update(&mut self) {
    time::update();
    if input::get_key_with_cooldown(VirtualKeyCode::Space, SWITCH_COOLDOWN) {
      self.variant = self.variant.next();
      info!("switched to {}", self.variant.name().bold());
    }
    if input::get_key_with_cooldown(VirtualKeyCode::V, SWITCH_COOLDOWN) {
      self.scene.toggle_alternate();
    }
    if self.variant == Variant::InstancedMatrix {
      self
        .scene
        .update(&self.device, &self.queue, time::get_delta());
    }
  }

  pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
    let output = self.surface.get_current_texture()?;
    let view = output
      .texture
      .create_view(&wgpu::TextureViewDescriptor::default());
    let mut encoder = self
      .device
      .create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("Render Encoder"),
      });

    let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
      label: Some("Render Pass"),
      color_attachments: &[Some(wgpu::RenderPassColorAttachment {
        view: &view,
        resolve_target: None,
        ops: wgpu::Operations {
          load: wgpu::LoadOp::Clear(self.clear_color),
          store: true,
        },
      })],
      depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
        view: &self.depth_view,
        depth_ops: Some(wgpu::Operations {
          load: wgpu::LoadOp::Clear(1.0),
          store: true,
        }),
        stencil_ops: None,
      }),
    });
    render_pass.draw_variant(&self.scene, &self.pipelines, self.variant);
    drop(render_pass);

    // submit 方法能传入任何实现了 IntoIter 的参数
    self.queue.submit(std::iter::once(encoder.finish()));
    output.present();

    Ok(())
  }
}
