//! Device skin layouts for the emulator window.
//!
//! A skin description names the parts of a device (a background bitmap, the
//! emulated display and the hardware buttons) and the layouts that place them
//! on a canvas. [`SkinFile::load`] builds the parts, the authored portrait
//! layout, and the three layouts derived from it by rotating every part,
//! button and image a quarter turn at a time.

pub mod file;
pub mod framebuffer;
pub mod geometry;
pub mod image;
pub mod keycode;
pub mod layout;
pub mod part;
pub mod source;

pub use file::{OnionPlacement, PlacedButton, PlacedDisplay, SkinFile};
pub use framebuffer::{Framebuffer, FramebufferFactory, MemoryFramebuffer, MemoryFramebufferFactory};
pub use geometry::{BoundingBox, Pos, Rect, Rotation, Size};
pub use crate::image::{Blend, ImageDesc, ImageStore, ImageStoreConfig, ImageStoreStats, SkinImage};
pub use keycode::KeyCode;
pub use layout::{Layout, LayoutEvent, LayoutId, Location, Onion};
pub use part::{Background, Button, Display, FramebufferSlot, Part, PartId};
pub use source::{HardwareDefaults, LcdConfig, NetworkHints, ResolvedSkin, SkinOrigin, resolve_skin};

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SkinError {
    #[error("IO error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: skin_config::ParseError,
    },

    #[error("Skin part '{0}' has no background, display or buttons")]
    EmptyPart(String),

    #[error("Layout '{0}' does not place any known part")]
    EmptyLayout(String),

    #[error("Skin file has no '{0}' section")]
    MissingSection(&'static str),

    #[error("Skin file defines no parts")]
    NoParts,

    #[error("Invalid skin version: {0}")]
    InvalidVersion(i32),

    #[error("Failed to rotate images of '{0}'")]
    ImageRotation(String),

    #[error("Unknown skin name '{0}'")]
    UnknownSkin(String),
}

/// Knobs for building a skin.
#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    /// Display depth used when a display does not give `bpp`.
    pub default_bpp: u32,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self { default_bpp: 16 }
    }
}

/// State shared by the part and layout builders during one load.
pub(crate) struct BuildContext<'a> {
    pub store: &'a mut ImageStore,
    pub basepath: &'a Path,
    pub framebuffers: Option<&'a mut dyn FramebufferFactory>,
    pub options: &'a LoadOptions,
}
