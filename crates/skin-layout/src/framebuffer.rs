//! Framebuffers backing skin displays.
//!
//! The layout engine only decides the size and depth of a display's
//! framebuffer; allocating one is delegated to a [`FramebufferFactory`]
//! supplied by whoever owns the emulated screen.

use crate::geometry::Size;
use log::debug;
use std::fmt;

/// A framebuffer owned by a skin display. Dropping it releases it.
pub trait Framebuffer: fmt::Debug {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    /// Bits per pixel.
    fn bpp(&self) -> u32;

    fn size(&self) -> Size {
        Size::new(self.width() as i32, self.height() as i32)
    }
}

pub trait FramebufferFactory {
    /// Allocate a framebuffer, or `None` if the request cannot be served.
    fn create_framebuffer(
        &mut self,
        width: u32,
        height: u32,
        bpp: u32,
    ) -> Option<Box<dyn Framebuffer>>;
}

/// Largest buffer [`MemoryFramebufferFactory`] agrees to allocate.
pub const MAX_FRAMEBUFFER_BYTES: usize = 256 << 20;

/// A plain in-memory framebuffer.
#[derive(Debug, Clone)]
pub struct MemoryFramebuffer {
    width: u32,
    height: u32,
    bpp: u32,
    pixels: Vec<u8>,
}

impl MemoryFramebuffer {
    pub fn new(width: u32, height: u32, bpp: u32) -> Self {
        let pitch = (width as usize * bpp as usize).div_ceil(8);
        Self {
            width,
            height,
            bpp,
            pixels: vec![0; pitch * height as usize],
        }
    }

    /// Bytes per row.
    pub fn pitch(&self) -> usize {
        (self.width as usize * self.bpp as usize).div_ceil(8)
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }
}

impl Framebuffer for MemoryFramebuffer {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn bpp(&self) -> u32 {
        self.bpp
    }
}

/// Factory producing [`MemoryFramebuffer`]s, recording every request.
#[derive(Debug, Default)]
pub struct MemoryFramebufferFactory {
    created: Vec<(u32, u32, u32)>,
}

impl MemoryFramebufferFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(width, height, bpp)` of every framebuffer created so far.
    pub fn created(&self) -> &[(u32, u32, u32)] {
        &self.created
    }
}

impl FramebufferFactory for MemoryFramebufferFactory {
    fn create_framebuffer(
        &mut self,
        width: u32,
        height: u32,
        bpp: u32,
    ) -> Option<Box<dyn Framebuffer>> {
        if width == 0 || height == 0 || !matches!(bpp, 16 | 32) {
            return None;
        }
        let bytes = (width as usize)
            .checked_mul(bpp as usize / 8)
            .and_then(|pitch| pitch.checked_mul(height as usize))
            .filter(|&bytes| bytes <= MAX_FRAMEBUFFER_BYTES)?;
        debug!("Allocating {width}x{height}x{bpp} framebuffer ({bytes} bytes)");
        self.created.push((width, height, bpp));
        Some(Box::new(MemoryFramebuffer::new(width, height, bpp)))
    }
}
