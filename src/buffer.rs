use crate::exts::state::DeviceTrait;

const MIN_CAPACITY: wgpu::BufferAddress = 64;

/// Bytes to allocate for `len` bytes of data: never zero, a multiple of
/// `COPY_BUFFER_ALIGNMENT`, and rounded up to a power of two so repeated
/// growth is amortised.
pub fn capacity_for(len: wgpu::BufferAddress) -> wgpu::BufferAddress {
  let len = len.max(MIN_CAPACITY);
  let aligned = wgpu::util::align_to(len, wgpu::COPY_BUFFER_ALIGNMENT);
  aligned.next_power_of_two()
}

/// A vertex, index or instance buffer that regrows when refilled with more
/// data than it was created for.
pub struct GpuBuffer {
  label: String,
  usage: wgpu::BufferUsages,
  capacity: wgpu::BufferAddress,
  len: wgpu::BufferAddress,
  pub buffer: wgpu::Buffer,
}

impl GpuBuffer {
  pub fn new<T: DeviceTrait>(device: &T, label: &str, usage: wgpu::BufferUsages) -> Self {
    let usage = usage | wgpu::BufferUsages::COPY_DST;
    let capacity = capacity_for(0);
    GpuBuffer {
      label: label.to_owned(),
      usage,
      capacity,
      len: 0,
      buffer: device.create_buffer(label, capacity, usage),
    }
  }

  pub fn with_contents<T: DeviceTrait>(
    device: &T,
    queue: &wgpu::Queue,
    label: &str,
    usage: wgpu::BufferUsages,
    contents: &[u8],
  ) -> Self {
    let mut buffer = Self::new(device, label, usage);
    buffer.fill(device, queue, contents);
    buffer
  }

  pub fn slice(&self) -> wgpu::BufferSlice<'_> {
    self.buffer.slice(..self.len.max(wgpu::COPY_BUFFER_ALIGNMENT))
  }

  /// `contents.len()` must be a multiple of `COPY_BUFFER_ALIGNMENT`.
  pub fn fill<T: DeviceTrait>(&mut self, device: &T, queue: &wgpu::Queue, contents: &[u8]) {
    let len = contents.len() as wgpu::BufferAddress;
    if len > self.capacity {
      let capacity = capacity_for(len);
      debug!(
        "growing {} from {} to {} bytes",
        self.label, self.capacity, capacity
      );
      self.buffer.destroy();
      self.buffer = device.create_buffer(&self.label, capacity, self.usage);
      self.capacity = capacity;
    }
    if len > 0 {
      queue.write_buffer(&self.buffer, 0, contents);
    }
    self.len = len;
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn capacity_is_never_zero() {
    assert_eq!(capacity_for(0), 64);
    assert_eq!(capacity_for(4), 64);
  }

  #[test]
  fn capacity_grows_by_powers_of_two() {
    assert_eq!(capacity_for(65), 128);
    assert_eq!(capacity_for(76 * 9), 1024);
    let c = capacity_for(1001);
    assert!(c >= 1001);
    assert_eq!(c % wgpu::COPY_BUFFER_ALIGNMENT, 0);
  }
}
