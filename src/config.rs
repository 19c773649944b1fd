use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

use crate::variant::Variant;

pub const CONFIG_ENV: &str = "VERTEX_VARIANTS_CONFIG";
pub const VARIANT_ENV: &str = "VERTEX_VARIANTS_VARIANT";

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config {path}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
  #[error("failed to parse config")]
  Parse(#[from] toml::de::Error),
  #[error("unknown variant `{0}`")]
  UnknownVariant(String),
  #[error("`{field}` is out of range: {value}")]
  OutOfRange { field: &'static str, value: String },
}

pub const MAX_GRID: u32 = 1024;
pub const MAX_SPRITES: u32 = 1 << 20;
/// 20 * 4^8 triangles, about 16 MiB of indices
pub const MAX_SPHERE_REFINEMENTS: u32 = 8;
pub const MAX_SPRITE_SIZE: f32 = 4096.0;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresentMode {
  Fifo,
  Immediate,
  Mailbox,
}

impl From<PresentMode> for wgpu::PresentMode {
  fn from(mode: PresentMode) -> Self {
    match mode {
      PresentMode::Fifo => wgpu::PresentMode::Fifo,
      PresentMode::Immediate => wgpu::PresentMode::Immediate,
      PresentMode::Mailbox => wgpu::PresentMode::Mailbox,
    }
  }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
  /// variant shown at startup
  pub variant: Variant,
  pub clear_color: [f64; 3],
  pub present_mode: PresentMode,
  /// instances per side of the offset grid
  pub grid: u32,
  pub sprite_count: u32,
  /// base sprite size in pixels
  pub sprite_size: f32,
  pub sphere_refinements: u32,
}

impl Default for Config {
  fn default() -> Self {
    Config {
      variant: Variant::InstancedOffset,
      clear_color: [0.1, 0.2, 0.3],
      present_mode: PresentMode::Fifo,
      grid: 10,
      sprite_count: 64,
      sprite_size: 12.0,
      sphere_refinements: 3,
    }
  }
}

impl Config {
  pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
    let config: Config = toml::from_str(text)?;
    config.validate()?;
    Ok(config)
  }

  /// Rejects values that would ask the device for oversized buffers.
  pub fn validate(&self) -> Result<(), ConfigError> {
    fn out_of_range(field: &'static str, value: impl ToString) -> ConfigError {
      ConfigError::OutOfRange {
        field,
        value: value.to_string(),
      }
    }
    if self.grid > MAX_GRID {
      return Err(out_of_range("grid", self.grid));
    }
    if self.sprite_count > MAX_SPRITES {
      return Err(out_of_range("sprite_count", self.sprite_count));
    }
    if !(self.sprite_size > 0.0 && self.sprite_size <= MAX_SPRITE_SIZE) {
      return Err(out_of_range("sprite_size", self.sprite_size));
    }
    if self.sphere_refinements > MAX_SPHERE_REFINEMENTS {
      return Err(out_of_range("sphere_refinements", self.sphere_refinements));
    }
    if let Some(c) = self.clear_color.iter().find(|c| !c.is_finite()) {
      return Err(out_of_range("clear_color", c));
    }
    Ok(())
  }

  #[instrument]
  pub async fn load(path: &Path) -> Result<Self, ConfigError> {
    debug!("loading config {}", path.display());
    let text = tokio::fs::read_to_string(path)
      .await
      .map_err(|source| ConfigError::Io {
        path: path.to_owned(),
        source,
      })?;
    Self::from_toml_str(&text)
  }

  /// Reads the file named by `VERTEX_VARIANTS_CONFIG` (defaults when unset),
  /// then applies `VERTEX_VARIANTS_VARIANT`.
  pub async fn from_env() -> Result<Self, ConfigError> {
    let mut config = match std::env::var_os(CONFIG_ENV) {
      Some(path) => Self::load(Path::new(&path)).await?,
      None => Self::default(),
    };
    config.override_variant(std::env::var(VARIANT_ENV).ok().as_deref());
    Ok(config)
  }

  /// A bad name is logged and the current variant kept.
  pub fn override_variant(&mut self, name: Option<&str>) {
    match name.map(str::parse::<Variant>) {
      Some(Ok(variant)) => self.variant = variant,
      Some(Err(e)) => warn!("ignoring {VARIANT_ENV}: {e}"),
      None => {}
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_is_default() {
    assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
  }

  #[test]
  fn partial_overrides() {
    let config = Config::from_toml_str(
      r#"
        variant = "instanced-matrix"
        present_mode = "mailbox"
        grid = 4
      "#,
    )
    .unwrap();
    assert_eq!(config.variant, Variant::InstancedMatrix);
    assert_eq!(config.present_mode, PresentMode::Mailbox);
    assert_eq!(config.grid, 4);
    assert_eq!(config.sprite_count, Config::default().sprite_count);
  }

  #[test]
  fn rejects_bad_values() {
    assert!(matches!(
      Config::from_toml_str(r#"variant = "geometry""#),
      Err(ConfigError::Parse(_))
    ));
    assert!(matches!(
      Config::from_toml_str("grid = -1"),
      Err(ConfigError::Parse(_))
    ));
  }

  #[test]
  fn rejects_out_of_range() {
    for text in [
      "grid = 10000",
      "sprite_count = 2000000",
      "sprite_size = 0.0",
      "sprite_size = -3.0",
      "sprite_size = nan",
      "sprite_size = inf",
      "sphere_refinements = 12",
      "clear_color = [0.0, nan, 0.0]",
    ] {
      assert!(
        matches!(
          Config::from_toml_str(text),
          Err(ConfigError::OutOfRange { .. })
        ),
        "{text} was accepted"
      );
    }
    let err = Config::from_toml_str("sphere_refinements = 12\ngrid = 4").unwrap_err();
    assert!(
      matches!(err, ConfigError::OutOfRange { field: "sphere_refinements", .. }),
      "{err}"
    );
  }

  #[test]
  fn accepts_limits() {
    let config = Config::from_toml_str(
      r#"
        grid = 1024
        sprite_count = 0
        sprite_size = 4096.0
        sphere_refinements = 8
      "#,
    )
    .unwrap();
    assert_eq!(config.grid, MAX_GRID);
    assert!(Config::default().validate().is_ok());
  }

  #[test]
  fn bad_variant_override_keeps_loaded_values() {
    let mut config = Config::from_toml_str("grid = 4\nvariant = \"point-sprite\"").unwrap();
    config.override_variant(Some("geometry"));
    assert_eq!(config.variant, Variant::PointSprite);
    assert_eq!(config.grid, 4);
    config.override_variant(None);
    assert_eq!(config.variant, Variant::PointSprite);
    config.override_variant(Some("instanced-matrix"));
    assert_eq!(config.variant, Variant::InstancedMatrix);
    assert_eq!(config.grid, 4);
  }

  #[tokio::test]
  async fn load_reports_missing_file() {
    let err = Config::load(Path::new("/nonexistent/vertex-variants.toml"))
      .await
      .unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
  }
}
