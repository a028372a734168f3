//! Growable GPU buffers.
//!
//! Buffers grow 2x when data exceeds capacity and never shrink (GPU buffers
//! cannot be resized in place). [`DrawUniforms`] builds on this to pack one
//! uniform block per draw call at the device's dynamic-offset alignment.

/// A GPU buffer that can grow dynamically.
pub struct DynamicBuffer {
    buffer: wgpu::Buffer,
    capacity: usize, // bytes
    len: usize,      // bytes
    usage: wgpu::BufferUsages,
    label: String,
}

/// Capacity after growing `current` to hold `needed` bytes: 2x, at least
/// 1 KiB more than before.
fn grown_capacity(current: usize, needed: usize) -> usize {
    (needed * 2).max(current + 1024)
}

impl DynamicBuffer {
    /// Buffer with the given initial byte capacity.
    pub fn new(
        device: &wgpu::Device,
        label: &str,
        initial_capacity: usize,
        usage: wgpu::BufferUsages,
    ) -> Self {
        let capacity = initial_capacity.max(64);
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: capacity as u64,
            usage: usage | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self {
            buffer,
            capacity,
            len: 0,
            usage,
            label: label.to_owned(),
        }
    }

    /// Write raw bytes to buffer, growing if necessary.
    ///
    /// Returns `true` if buffer was reallocated (bind groups need recreation).
    pub fn write_bytes(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        data: &[u8],
    ) -> bool {
        let needed = data.len();
        let reallocated = if needed > self.capacity {
            let new_capacity = grown_capacity(self.capacity, needed);
            self.buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(&self.label),
                size: new_capacity as u64,
                usage: self.usage | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            self.capacity = new_capacity;
            true
        } else {
            false
        };

        if needed > 0 {
            queue.write_buffer(&self.buffer, 0, data);
        }
        self.len = needed;
        reallocated
    }

    /// The underlying buffer.
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    /// Bytes written by the last write.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the last write was empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Allocated bytes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Round `size` up to a multiple of `alignment` (a power of two).
pub fn align_to(size: usize, alignment: usize) -> usize {
    (size + alignment - 1) & !(alignment - 1)
}

/// Pack `items` into one byte vector, each starting at a multiple of
/// `stride`.
fn pack_strided<T: bytemuck::Pod>(items: &[T], stride: usize) -> Vec<u8> {
    let mut bytes = vec![0_u8; items.len() * stride];
    for (slot, item) in bytes.chunks_exact_mut(stride).zip(items) {
        let src = bytemuck::bytes_of(item);
        slot[..src.len()].copy_from_slice(src);
    }
    bytes
}

/// One uniform block per draw, addressed with dynamic offsets.
pub struct DrawUniforms<T> {
    inner: DynamicBuffer,
    stride: usize,
    count: usize,
    _marker: std::marker::PhantomData<T>,
}

impl<T: bytemuck::Pod> DrawUniforms<T> {
    /// Room for `initial_slots` blocks before the first reallocation.
    pub fn new(device: &wgpu::Device, label: &str, initial_slots: usize) -> Self {
        let alignment =
            device.limits().min_uniform_buffer_offset_alignment as usize;
        let stride = align_to(size_of::<T>(), alignment.max(1));
        Self {
            inner: DynamicBuffer::new(
                device,
                label,
                stride * initial_slots.max(1),
                wgpu::BufferUsages::UNIFORM,
            ),
            stride,
            count: 0,
            _marker: std::marker::PhantomData,
        }
    }

    /// Upload `items`, one per slot.
    ///
    /// Returns `true` if buffer was reallocated (bind groups need recreation).
    pub fn write(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        items: &[T],
    ) -> bool {
        self.count = items.len();
        self.inner
            .write_bytes(device, queue, &pack_strided(items, self.stride))
    }

    /// Dynamic offset of slot `index`.
    pub fn offset(&self, index: usize) -> u32 {
        (index * self.stride) as u32
    }

    /// Size of one block, for the binding.
    pub fn binding_size(&self) -> wgpu::BufferSize {
        wgpu::BufferSize::new(size_of::<T>() as u64)
            .unwrap_or(wgpu::BufferSize::MIN)
    }

    /// The underlying buffer.
    pub fn buffer(&self) -> &wgpu::Buffer {
        self.inner.buffer()
    }

    /// Blocks written by the last write.
    pub fn count(&self) -> usize {
        self.count
    }
}
