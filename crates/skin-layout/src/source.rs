//! Locating a skin by name and reading the LCD and network hints it carries.

use crate::framebuffer::FramebufferFactory;
use crate::image::ImageStore;
use crate::{LoadOptions, SkinError, SkinFile};
use log::{debug, warn};
use serde::Serialize;
use skin_config::{ConfigNode, NodeBuilder};
use std::fs;
use std::path::{Path, PathBuf};

/// Shorthand skin names and the display size they stand for.
const SKIN_ALIASES: &[(&str, &str)] = &[
    ("QVGA-L", "320x240"),
    ("QVGA-P", "240x320"),
    ("HVGA-L", "480x320"),
    ("HVGA-P", "320x480"),
    ("QVGA", "320x240"),
    ("HVGA", "320x480"),
];

const MAGIC_SKIN_BPP: u32 = 16;

/// LCD properties of the emulated device when the skin does not override them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HardwareDefaults {
    pub lcd_width: i32,
    pub lcd_height: i32,
    pub lcd_depth: u32,
}

impl Default for HardwareDefaults {
    fn default() -> Self {
        Self {
            lcd_width: 320,
            lcd_height: 480,
            lcd_depth: 16,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkinOrigin {
    /// Loaded from `<skin dir>/<name>/layout`.
    Directory,
    /// Synthesized from a `WxH[xBPP]` name.
    Magic { width: i32, height: i32, bpp: u32 },
    /// The display-only skin used when nothing else is available.
    BuiltIn,
}

/// A skin description ready to be loaded.
#[derive(Debug, Clone)]
pub struct ResolvedSkin {
    pub name: String,
    pub config: ConfigNode,
    /// Base path images are resolved against; `:` for embedded resources.
    pub basepath: PathBuf,
    pub origin: SkinOrigin,
}

impl ResolvedSkin {
    fn built_in(hw: &HardwareDefaults) -> Self {
        Self {
            name: "<builtin>".to_string(),
            config: display_only_config(hw.lcd_width, hw.lcd_height, hw.lcd_depth),
            basepath: PathBuf::from(":"),
            origin: SkinOrigin::BuiltIn,
        }
    }

    pub fn lcd(&self, hw: &HardwareDefaults) -> LcdConfig {
        LcdConfig::from_config(&self.config, hw)
    }

    pub fn network(&self) -> Option<NetworkHints> {
        NetworkHints::from_config(&self.config)
    }

    pub fn load<'a>(
        &'a self,
        store: &'a mut ImageStore,
        framebuffers: Option<&'a mut dyn FramebufferFactory>,
        options: &'a LoadOptions,
    ) -> Result<SkinFile, SkinError> {
        SkinFile::load(&self.config, &self.basepath, store, framebuffers, options)
    }
}

fn display_only_config(width: i32, height: i32, bpp: u32) -> ConfigNode {
    NodeBuilder::root()
        .block(
            NodeBuilder::node("display")
                .entry("width", width)
                .entry("height", height)
                .entry("bpp", bpp),
        )
        .build()
}

/// Parse `WxH` or `WxHxBPP` the way `atoi` would read each field.
fn parse_magic(name: &str) -> Option<(i32, i32, u32)> {
    fn leading_number(s: &str) -> Option<i64> {
        let digits = s.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            return None;
        }
        s[..digits].parse().ok()
    }

    let width = leading_number(name)?;
    let (_, rest) = name.split_once('x')?;
    let height = leading_number(rest)?;
    let bpp = rest
        .split_once('x')
        .and_then(|(_, b)| leading_number(b))
        .map_or(MAGIC_SKIN_BPP, |b| b as u32);
    Some((width as i32, height as i32, bpp))
}

/// Find the skin `skin_name`.
///
/// A directory `<skin_dir>/<skin_name>` wins. Otherwise aliases such as
/// `HVGA` are expanded and sizes like `480x800` produce a display-only skin.
/// Without a name, or when the layout file cannot be read, the built-in
/// display-only skin sized from `hw` is used.
pub fn resolve_skin(
    skin_dir: Option<&Path>,
    skin_name: Option<&str>,
    hw: &HardwareDefaults,
) -> Result<ResolvedSkin, SkinError> {
    let Some(mut name) = skin_name else {
        return Ok(ResolvedSkin::built_in(hw));
    };

    let has_dir = skin_dir.is_some_and(|dir| dir.join(name).exists());
    if !has_dir {
        if let Some(dir) = skin_dir {
            debug!("There is no '{name}' skin in '{}'", dir.display());
        }
        if let Some((_, alias)) = SKIN_ALIASES
            .iter()
            .find(|(alias, _)| alias.eq_ignore_ascii_case(name))
        {
            debug!("Skin name '{name}' aliased to '{alias}'");
            name = *alias;
        }
    }

    if !has_dir && let Some((width, height, bpp)) = parse_magic(name) {
        debug!("Found magic skin width={width} height={height} bpp={bpp}");
        return Ok(ResolvedSkin {
            name: name.to_string(),
            config: display_only_config(width, height, bpp),
            basepath: PathBuf::from(":"),
            origin: SkinOrigin::Magic { width, height, bpp },
        });
    }

    let Some(dir) = skin_dir else {
        return Err(SkinError::UnknownSkin(name.to_string()));
    };

    let basepath = dir.join(name);
    let layout = basepath.join("layout");
    debug!("Trying to load skin file '{}'", layout.display());
    let text = match fs::read_to_string(&layout) {
        Ok(text) => text,
        Err(e) => {
            warn!(
                "Could not load skin file '{}', using built-in one: {e}",
                layout.display()
            );
            return Ok(ResolvedSkin::built_in(hw));
        }
    };
    let config = skin_config::parse(&text).map_err(|source| SkinError::Parse {
        path: layout,
        source,
    })?;

    Ok(ResolvedSkin {
        name: name.to_string(),
        config,
        basepath,
        origin: SkinOrigin::Directory,
    })
}

/// Framebuffer geometry the skin asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LcdConfig {
    pub width: i32,
    pub height: i32,
    pub depth: u32,
}

impl LcdConfig {
    /// Read the LCD size from `display` (single-part skins) or
    /// `parts.device.display` (multi-part skins), falling back to `hw`.
    pub fn from_config(root: &ConfigNode, hw: &HardwareDefaults) -> Self {
        let fallback = Self {
            width: hw.lcd_width,
            height: hw.lcd_height,
            depth: hw.lcd_depth,
        };
        let Some(node) = root
            .find("display")
            .or_else(|| root.find_path("parts.device.display"))
        else {
            return fallback;
        };

        let mut width = node.int("width", hw.lcd_width);
        let height = node.int("height", hw.lcd_height);
        let mut depth = node.int("bpp", hw.lcd_depth as i32);

        if width <= 0 || height <= 0 {
            debug!("Ignoring invalid skin LCD dimensions ({width}x{height}x{depth})");
            return fallback;
        }
        if width & 1 != 0 {
            width = width.saturating_add(1) & !1;
            debug!("Adjusting LCD dimensions to ({width}x{height})");
        }
        if depth != 16 && depth != 32 {
            depth = 16;
            debug!("Adjusting LCD bit depth to {depth}");
        }

        Self {
            width,
            height,
            depth: depth as u32,
        }
    }
}

/// Default network speed and latency a skin may suggest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NetworkHints {
    pub speed: Option<String>,
    pub delay: Option<String>,
}

impl NetworkHints {
    pub fn from_config(root: &ConfigNode) -> Option<Self> {
        let node = root.find("network")?;
        Some(Self {
            speed: node.str("speed").map(str::to_string),
            delay: node.str("delay").map(str::to_string),
        })
    }
}
