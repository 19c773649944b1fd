use std::collections::HashMap;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InstanceError {
  #[error("invalid instance handle {0}")]
  InvalidHandle(Handle),
}

pub type Handle = usize;

/// Per-instance records addressed by stable handles.
///
/// Storage stays dense and the visible instances always occupy the prefix
/// `0..first_invisible`, so that prefix can be uploaded as-is as the instance
/// buffer and drawn with `0..visible_len()` instances.
pub struct InstanceSet<I> {
  instances: Vec<I>,
  handles: Vec<Handle>,
  handle_to_index: HashMap<Handle, usize>,
  first_invisible: usize,
  next_handle: Handle,
}

impl<I> Default for InstanceSet<I> {
  fn default() -> Self {
    Self {
      instances: Vec::new(),
      handles: Vec::new(),
      handle_to_index: HashMap::new(),
      first_invisible: 0,
      next_handle: 0,
    }
  }
}

impl<I: bytemuck::Pod> InstanceSet<I> {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.instances.len()
  }

  pub fn is_empty(&self) -> bool {
    self.instances.is_empty()
  }

  pub fn visible_len(&self) -> usize {
    self.first_invisible
  }

  /// The visible prefix, ready for upload.
  pub fn visible(&self) -> &[I] {
    &self.instances[..self.first_invisible]
  }

  fn index_of(&self, handle: Handle) -> Result<usize, InstanceError> {
    self
      .handle_to_index
      .get(&handle)
      .copied()
      .ok_or(InstanceError::InvalidHandle(handle))
  }

  pub fn get(&self, handle: Handle) -> Option<&I> {
    let index = *self.handle_to_index.get(&handle)?;
    self.instances.get(index)
  }

  pub fn get_mut(&mut self, handle: Handle) -> Option<&mut I> {
    let index = *self.handle_to_index.get(&handle)?;
    self.instances.get_mut(index)
  }

  /// Inserts an invisible instance.
  pub fn insert(&mut self, instance: I) -> Handle {
    let handle = self.next_handle;
    self.next_handle += 1;

    self.handle_to_index.insert(handle, self.instances.len());
    self.instances.push(instance);
    self.handles.push(handle);
    handle
  }

  pub fn insert_visibly(&mut self, instance: I) -> Handle {
    let handle = self.insert(instance);
    let index = self.instances.len() - 1;
    self.swap_by_index(index, self.first_invisible);
    self.first_invisible += 1;
    handle
  }

  fn swap_by_index(&mut self, a: usize, b: usize) {
    if a == b {
      return;
    }
    self.instances.swap(a, b);
    self.handles.swap(a, b);
    self.handle_to_index.insert(self.handles[a], a);
    self.handle_to_index.insert(self.handles[b], b);
  }

  pub fn swap_by_handle(&mut self, a: Handle, b: Handle) -> Result<(), InstanceError> {
    let index_a = self.index_of(a)?;
    let index_b = self.index_of(b)?;
    self.swap_by_index(index_a, index_b);
    Ok(())
  }

  pub fn is_visible(&self, handle: Handle) -> Result<bool, InstanceError> {
    Ok(self.index_of(handle)? < self.first_invisible)
  }

  pub fn make_visible(&mut self, handle: Handle) -> Result<(), InstanceError> {
    let index = self.index_of(handle)?;
    if index < self.first_invisible {
      return Ok(());
    }
    self.swap_by_index(index, self.first_invisible);
    self.first_invisible += 1;
    Ok(())
  }

  pub fn make_invisible(&mut self, handle: Handle) -> Result<(), InstanceError> {
    let index = self.index_of(handle)?;
    if index >= self.first_invisible {
      return Ok(());
    }
    self.swap_by_index(index, self.first_invisible - 1);
    self.first_invisible -= 1;
    Ok(())
  }

  pub fn remove(&mut self, handle: Handle) -> Result<I, InstanceError> {
    self.make_invisible(handle)?;
    let index = self.index_of(handle)?;
    let last = self.instances.len() - 1;
    self.swap_by_index(index, last);

    self.handles.pop();
    self.handle_to_index.remove(&handle);
    self
      .instances
      .pop()
      .ok_or(InstanceError::InvalidHandle(handle))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn check_invariants(set: &InstanceSet<u32>) {
    assert_eq!(set.instances.len(), set.handles.len());
    assert_eq!(set.handle_to_index.len(), set.handles.len());
    assert!(set.first_invisible <= set.len());
    for (index, handle) in set.handles.iter().enumerate() {
      assert_eq!(set.handle_to_index[handle], index);
    }
  }

  #[test]
  fn visible_prefix() {
    let mut set = InstanceSet::new();
    let a = set.insert(1u32);
    let b = set.insert_visibly(2);
    let c = set.insert_visibly(3);
    check_invariants(&set);

    assert_eq!(set.visible_len(), 2);
    assert!(!set.is_visible(a).unwrap());
    assert!(set.is_visible(b).unwrap());
    let mut visible = set.visible().to_vec();
    visible.sort();
    assert_eq!(visible, vec![2, 3]);

    set.make_invisible(b).unwrap();
    set.make_visible(a).unwrap();
    check_invariants(&set);
    let mut visible = set.visible().to_vec();
    visible.sort();
    assert_eq!(visible, vec![1, 3]);
    assert_eq!(set.get(c), Some(&3));
  }

  #[test]
  fn visibility_changes_are_idempotent() {
    let mut set = InstanceSet::new();
    let a = set.insert_visibly(7u32);
    set.make_visible(a).unwrap();
    set.make_visible(a).unwrap();
    assert_eq!(set.visible_len(), 1);
    set.make_invisible(a).unwrap();
    set.make_invisible(a).unwrap();
    assert_eq!(set.visible_len(), 0);
    check_invariants(&set);
  }

  #[test]
  fn remove_keeps_storage_dense() {
    let mut set = InstanceSet::new();
    let handles: Vec<_> = (0..6u32)
      .map(|i| {
        if i % 2 == 0 {
          set.insert_visibly(i)
        } else {
          set.insert(i)
        }
      })
      .collect();
    assert_eq!(set.remove(handles[2]).unwrap(), 2);
    assert_eq!(set.remove(handles[3]).unwrap(), 3);
    check_invariants(&set);
    assert_eq!(set.len(), 4);
    assert_eq!(set.visible_len(), 2);
    assert_eq!(set.get(handles[2]), None);
    assert_eq!(set.get(handles[4]), Some(&4));
    assert_eq!(
      set.remove(handles[2]),
      Err(InstanceError::InvalidHandle(handles[2]))
    );
  }

  #[test]
  fn handles_are_not_reused() {
    let mut set = InstanceSet::new();
    let a = set.insert(0u32);
    set.remove(a).unwrap();
    let b = set.insert(1);
    assert_ne!(a, b);
    assert!(set.is_visible(a).is_err());
  }

  #[test]
  fn swap_and_mutate() {
    let mut set = InstanceSet::new();
    let a = set.insert_visibly(10u32);
    let b = set.insert_visibly(20);
    set.swap_by_handle(a, b).unwrap();
    check_invariants(&set);
    assert_eq!(set.visible(), &[20, 10]);
    *set.get_mut(a).unwrap() += 1;
    assert_eq!(set.get(a), Some(&11));
    assert_eq!(
      set.swap_by_handle(a, 99),
      Err(InstanceError::InvalidHandle(99))
    );
  }
}
