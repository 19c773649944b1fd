use std::{fmt, str::FromStr};

use serde::Deserialize;

use crate::config::ConfigError;

/// The four vertex-transform techniques this crate can draw.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Variant {
  /// position + per-instance offset, no projection
  InstancedOffset,
  /// clip position, point size and colour taken straight from the vertex
  PointSprite,
  /// three constant corners selected by vertex index
  HardcodedTriangle,
  /// per-instance model matrix applied to the position
  InstancedMatrix,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Step {
  Vertex,
  Instance,
}

/// One entry of the attribute contract a host must satisfy for a variant.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AttributeBinding {
  pub location: u32,
  pub name: &'static str,
  pub format: wgpu::VertexFormat,
  pub step: Step,
}

const fn binding(
  location: u32,
  name: &'static str,
  format: wgpu::VertexFormat,
  step: Step,
) -> AttributeBinding {
  AttributeBinding {
    location,
    name,
    format,
    step,
  }
}

use wgpu::VertexFormat::{Float32, Float32x3, Float32x4};

const OFFSET_BINDINGS: &[AttributeBinding] = &[
  binding(0, "position", Float32x3, Step::Vertex),
  binding(1, "position_offset", Float32x3, Step::Instance),
  binding(2, "colour", Float32x3, Step::Instance),
];

// one point per instance, see `vertex::SpriteVertex`
const SPRITE_BINDINGS: &[AttributeBinding] = &[
  binding(0, "position", Float32x4, Step::Instance),
  binding(1, "size", Float32, Step::Instance),
  binding(2, "colour", Float32x4, Step::Instance),
];

const MATRIX_BINDINGS: &[AttributeBinding] = &[
  binding(0, "position", Float32x3, Step::Vertex),
  binding(1, "model_matrix.x", Float32x4, Step::Instance),
  binding(2, "model_matrix.y", Float32x4, Step::Instance),
  binding(3, "model_matrix.z", Float32x4, Step::Instance),
  binding(4, "model_matrix.w", Float32x4, Step::Instance),
  binding(5, "colour", Float32x3, Step::Instance),
];

impl Variant {
  pub const ALL: [Variant; 4] = [
    Variant::InstancedOffset,
    Variant::PointSprite,
    Variant::HardcodedTriangle,
    Variant::InstancedMatrix,
  ];

  pub fn name(self) -> &'static str {
    match self {
      Variant::InstancedOffset => "instanced-offset",
      Variant::PointSprite => "point-sprite",
      Variant::HardcodedTriangle => "hardcoded-triangle",
      Variant::InstancedMatrix => "instanced-matrix",
    }
  }

  /// Cycles through [`Variant::ALL`], wrapping at the end.
  pub fn next(self) -> Variant {
    let index = Self::ALL.iter().position(|v| *v == self).unwrap_or(0);
    Self::ALL[(index + 1) % Self::ALL.len()]
  }

  pub fn bindings(self) -> &'static [AttributeBinding] {
    match self {
      Variant::InstancedOffset => OFFSET_BINDINGS,
      Variant::PointSprite => SPRITE_BINDINGS,
      Variant::HardcodedTriangle => &[],
      Variant::InstancedMatrix => MATRIX_BINDINGS,
    }
  }
}

impl fmt::Display for Variant {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

impl FromStr for Variant {
  type Err = ConfigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::ALL
      .iter()
      .copied()
      .find(|v| v.name().eq_ignore_ascii_case(s.trim()))
      .ok_or_else(|| ConfigError::UnknownVariant(s.to_owned()))
  }
}

#[test]
fn test_cycle_visits_every_variant() {
  let mut v = Variant::InstancedOffset;
  let mut seen = vec![v];
  for _ in 0..3 {
    v = v.next();
    seen.push(v);
  }
  assert_eq!(seen, Variant::ALL.to_vec());
  assert_eq!(v.next(), Variant::InstancedOffset);
}

#[test]
fn test_parse_names() {
  for v in Variant::ALL {
    assert_eq!(v.to_string().parse::<Variant>().unwrap(), v);
  }
  assert_eq!(
    " Point-Sprite ".parse::<Variant>().unwrap(),
    Variant::PointSprite
  );
  assert!(matches!(
    "fragment".parse::<Variant>(),
    Err(ConfigError::UnknownVariant(_))
  ));
}

#[test]
fn test_matrix_colour_sits_at_location_5() {
  let colour = Variant::InstancedMatrix
    .bindings()
    .iter()
    .find(|b| b.name == "colour")
    .unwrap();
  assert_eq!(colour.location, 5);
  assert_eq!(colour.format, Float32x3);
  assert!(Variant::HardcodedTriangle.bindings().is_empty());
}
