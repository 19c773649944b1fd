use std::{
  sync::{Mutex, MutexGuard},
  time::{Duration, Instant},
};

use once_cell::sync::Lazy;

static PREVIOUS_TIME: Lazy<Mutex<Instant>> = Lazy::new(|| Mutex::new(Instant::now()));
static DELTA_TIME: Lazy<Mutex<Duration>> = Lazy::new(|| Mutex::new(Duration::from_millis(1)));
static START: Lazy<Instant> = Lazy::new(Instant::now);

// the guarded values are plain copies, a poisoned lock is still usable
fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
  m.lock().unwrap_or_else(|e| e.into_inner())
}

/// Call once per frame.
pub fn update() {
  let mut previous_guard = lock(&PREVIOUS_TIME);
  let now = Instant::now();
  let delta = now.duration_since(*previous_guard);
  *previous_guard = now;
  *lock(&DELTA_TIME) = delta;
}

/// Seconds between the last two `update` calls.
pub fn get_delta() -> f32 {
  lock(&DELTA_TIME).as_secs_f32()
}

/// Seconds since first use.
pub fn get_now() -> f32 {
  START.elapsed().as_secs_f32()
}

#[test]
fn test_now_is_monotonic() {
  let a = get_now();
  update();
  let b = get_now();
  assert!(b >= a);
  assert!(get_delta() >= 0.0);
}
