use dashmap::DashMap;
use once_cell::sync::Lazy;
use winit::event::{ElementState, KeyboardInput, VirtualKeyCode as Keycode};

use crate::time;

static KEYMAP: Lazy<DashMap<Keycode, bool>> = Lazy::new(DashMap::new);
static COOLDOWN_MAP: Lazy<DashMap<Keycode, f32>> = Lazy::new(DashMap::new);

pub fn get_key(keycode: Keycode) -> bool {
  KEYMAP.get(&keycode).map(|pair| *pair).unwrap_or(false)
}

/// True while `keycode` is held, at most once every `cooltime` seconds.
pub fn get_key_with_cooldown(keycode: Keycode, cooltime: f32) -> bool {
  get_key(keycode) && cooldown_elapsed(keycode, time::get_now(), cooltime)
}

fn cooldown_elapsed(keycode: Keycode, now: f32, cooltime: f32) -> bool {
  let mut last = COOLDOWN_MAP.entry(keycode).or_insert(f32::NEG_INFINITY);
  if now - *last > cooltime {
    *last = now;
    true
  } else {
    false
  }
}

pub fn handle_keyboard(input: &KeyboardInput) {
  if let Some(keycode) = input.virtual_keycode {
    KEYMAP.insert(keycode, input.state == ElementState::Pressed);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[allow(deprecated)]
  fn key(keycode: Keycode, state: ElementState) -> KeyboardInput {
    KeyboardInput {
      scancode: 0,
      state,
      virtual_keycode: Some(keycode),
      modifiers: Default::default(),
    }
  }

  #[test]
  fn press_and_release() {
    assert!(!get_key(Keycode::F1));
    handle_keyboard(&key(Keycode::F1, ElementState::Pressed));
    assert!(get_key(Keycode::F1));
    handle_keyboard(&key(Keycode::F1, ElementState::Released));
    assert!(!get_key(Keycode::F1));
  }

  #[test]
  fn key_repeat_fires_once_per_cooldown() {
    // the OS keeps sending Pressed while the key is held
    for _ in 0..5 {
      handle_keyboard(&key(Keycode::V, ElementState::Pressed));
    }
    assert!(get_key_with_cooldown(Keycode::V, 60.0));
    handle_keyboard(&key(Keycode::V, ElementState::Pressed));
    assert!(!get_key_with_cooldown(Keycode::V, 60.0));
    handle_keyboard(&key(Keycode::V, ElementState::Released));
    assert!(!get_key_with_cooldown(Keycode::V, 0.0));
  }

  #[test]
  fn cooldown_blocks_repeats() {
    assert!(cooldown_elapsed(Keycode::F2, 10.0, 0.5));
    assert!(!cooldown_elapsed(Keycode::F2, 10.2, 0.5));
    assert!(cooldown_elapsed(Keycode::F2, 10.6, 0.5));
  }
}
