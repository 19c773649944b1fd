#[macro_use]
extern crate tracing;

pub mod buffer;
pub mod config;
pub mod ext;
pub mod exts {
  pub mod state;
}
pub mod input;
pub mod instance;
pub mod instance_set;
pub mod log;
pub mod mesh;
pub mod pipeline;
pub mod scene;
pub mod state;
pub mod time;
pub mod transform;
pub mod variant;
pub mod vertex;
