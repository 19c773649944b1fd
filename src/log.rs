use std::str::FromStr;

use color_eyre::eyre::Result;
use tracing_error::ErrorLayer;
use tracing_subscriber::{
  filter::LevelFilter, fmt, fmt::time::LocalTime, layer::SubscriberExt, util::SubscriberInitExt,
  Layer,
};

pub const LOG_ENV: &str = "VERTEX_VARIANTS_LOG";

/// Level from `VERTEX_VARIANTS_LOG`, `info` when unset or unparsable.
pub fn level_from_env() -> LevelFilter {
  std::env::var(LOG_ENV)
    .ok()
    .and_then(|v| LevelFilter::from_str(&v).ok())
    .unwrap_or(LevelFilter::INFO)
}

pub fn init() -> Result<()> {
  color_eyre::install()?;

  cfg_if::cfg_if! {
    if #[cfg(feature = "no-color")] {
      colored::control::set_override(false);
    }
  }

  let fmt_layer = fmt::layer()
    .with_target(true)
    .with_timer(LocalTime::rfc_3339())
    .with_filter(level_from_env());

  tracing_subscriber::registry()
    .with(fmt_layer)
    .with(ErrorLayer::default())
    .try_init()?;
  Ok(())
}
