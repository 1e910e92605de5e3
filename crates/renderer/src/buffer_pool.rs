//! Thread-local buffer pools for the render pipeline.
//!
//! Rendering never exposes a reusable surface: every call returns a fresh
//! buffer. The pooling below is purely an allocation detail. Each thread
//! keeps one RGBA slot and one f32 slot; taking a buffer leaves behind a
//! fresh allocation sized for the next render of similar dimensions, so
//! repeated renders of similarly sized layers skip the allocator.

use std::cell::RefCell;

/// Common solar raster sizes for pre-allocated buffers
const GRID_256: usize = 256 * 256;
const GRID_512: usize = 512 * 512;
const GRID_1024: usize = 1024 * 1024;

// Thread-local pixel buffer (RGBA, 4 bytes per pixel)
thread_local! {
    static PIXEL_BUFFER: RefCell<Vec<u8>> = RefCell::new(Vec::with_capacity(GRID_256 * 4));
}

// Thread-local sample buffer (f32 per pixel) for derived grids such as
// shaded-hour counts
thread_local! {
    static SAMPLE_BUFFER: RefCell<Vec<f32>> = RefCell::new(Vec::with_capacity(GRID_256));
}

/// Fill an RGBA buffer and take ownership of it.
///
/// The buffer starts zeroed, and zero alpha means transparent, so an
/// untouched region is a valid transparent image. The thread-local slot is
/// left holding a fresh allocation sized for the next render of similar
/// dimensions.
#[inline]
pub fn take_pixel_buffer<F>(width: usize, height: usize, f: F) -> Vec<u8>
where
    F: FnOnce(&mut [u8]),
{
    PIXEL_BUFFER.with(|buf| {
        let mut buf = buf.borrow_mut();
        let size = width * height * 4;

        buf.resize(size, 0);
        buf.fill(0);

        f(&mut buf[..size]);

        std::mem::replace(&mut *buf, Vec::with_capacity(optimal_capacity(size)))
    })
}

/// Fill an f32 buffer and take ownership of it.
#[inline]
pub fn take_sample_buffer<F>(width: usize, height: usize, f: F) -> Vec<f32>
where
    F: FnOnce(&mut [f32]),
{
    SAMPLE_BUFFER.with(|buf| {
        let mut buf = buf.borrow_mut();
        let size = width * height;

        buf.resize(size, 0.0);
        buf.fill(0.0);

        f(&mut buf[..size]);

        std::mem::replace(&mut *buf, Vec::with_capacity(optimal_capacity(size)))
    })
}

/// Round a requested size up to a common raster tier so the replacement
/// allocation covers the next similarly sized render.
#[inline]
fn optimal_capacity(size: usize) -> usize {
    if size <= GRID_256 {
        GRID_256
    } else if size <= GRID_512 {
        GRID_512
    } else if size <= GRID_1024 {
        GRID_1024
    } else {
        size.next_power_of_two()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_buffer_cleared_between_uses() {
        let dirty = take_pixel_buffer(16, 16, |buf| buf.fill(255));
        assert_eq!(dirty.len(), 16 * 16 * 4);

        let clean = take_pixel_buffer(16, 16, |_| {});
        assert!(clean.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_pixel_buffer_resizes() {
        assert_eq!(take_pixel_buffer(8, 8, |_| {}).len(), 8 * 8 * 4);
        assert_eq!(take_pixel_buffer(64, 64, |_| {}).len(), 64 * 64 * 4);
        assert_eq!(take_pixel_buffer(8, 8, |_| {}).len(), 8 * 8 * 4);
    }

    #[test]
    fn test_take_pixel_buffer_returns_exact_size() {
        let v = take_pixel_buffer(10, 5, |buf| {
            buf[3] = 42;
        });
        assert_eq!(v.len(), 10 * 5 * 4);
        assert_eq!(v[3], 42);
        assert_eq!(v[0], 0);
    }

    #[test]
    fn test_take_sample_buffer() {
        let v = take_sample_buffer(4, 4, |buf| {
            buf[0] = 3.5;
        });
        assert_eq!(v.len(), 16);
        assert_eq!(v[0], 3.5);
        assert_eq!(v[15], 0.0);
    }

    #[test]
    fn test_optimal_capacity_tiers() {
        assert_eq!(optimal_capacity(100), GRID_256);
        assert_eq!(optimal_capacity(GRID_256 + 1), GRID_512);
        assert_eq!(optimal_capacity(GRID_512 + 1), GRID_1024);
        assert_eq!(optimal_capacity(GRID_1024 + 1), (GRID_1024 + 1).next_power_of_two());
    }
}
