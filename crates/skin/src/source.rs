use anyhow::{Context, Result};
use clap::Args;
use skin_layout::{
    HardwareDefaults, ImageStore, ImageStoreConfig, LoadOptions, MemoryFramebufferFactory,
    ResolvedSkin, SkinFile, resolve_skin,
};
use std::path::PathBuf;

/// Where to find the skin and what hardware it runs on.
#[derive(Args, Debug, Clone)]
pub struct SkinArgs {
    /// Skin name, alias (HVGA, QVGA-L, ...) or display size such as 480x800
    #[arg(short, long, value_name = "NAME")]
    pub skin: Option<String>,

    /// Directory holding one sub-directory per skin
    #[arg(long, value_name = "DIR", value_hint = clap::ValueHint::DirPath)]
    pub skin_dir: Option<PathBuf>,

    /// Hardware LCD width used when the skin does not set one
    #[arg(long, default_value_t = HardwareDefaults::default().lcd_width)]
    pub lcd_width: i32,

    /// Hardware LCD height used when the skin does not set one
    #[arg(long, default_value_t = HardwareDefaults::default().lcd_height)]
    pub lcd_height: i32,

    /// Hardware LCD depth used when the skin does not set one
    #[arg(long, default_value_t = HardwareDefaults::default().lcd_depth)]
    pub lcd_depth: u32,

    /// Display depth for skin displays without `bpp`
    #[arg(long, default_value_t = LoadOptions::default().default_bpp)]
    pub default_bpp: u32,

    /// Pixels the image cache keeps before evicting unused images
    #[arg(long, default_value_t = ImageStoreConfig::default().pixel_budget)]
    pub pixel_budget: usize,
}

/// A loaded skin together with the stores that back it.
pub struct LoadedSkin {
    pub resolved: ResolvedSkin,
    pub file: SkinFile,
    pub store: ImageStore,
    pub framebuffers: MemoryFramebufferFactory,
}

impl SkinArgs {
    pub fn hardware(&self) -> HardwareDefaults {
        HardwareDefaults {
            lcd_width: self.lcd_width,
            lcd_height: self.lcd_height,
            lcd_depth: self.lcd_depth,
        }
    }

    pub fn resolve(&self) -> Result<ResolvedSkin> {
        let skin = resolve_skin(
            self.skin_dir.as_deref(),
            self.skin.as_deref(),
            &self.hardware(),
        )?;
        log::debug!("Resolved skin '{}' ({:?})", skin.name, skin.origin);
        Ok(skin)
    }

    pub fn load(&self) -> Result<LoadedSkin> {
        let resolved = self.resolve()?;
        let mut store = ImageStore::new(ImageStoreConfig {
            pixel_budget: self.pixel_budget,
        });
        let mut framebuffers = MemoryFramebufferFactory::new();
        let options = LoadOptions {
            default_bpp: self.default_bpp,
        };

        let file = resolved
            .load(&mut store, Some(&mut framebuffers), &options)
            .with_context(|| format!("Failed to load skin '{}'", resolved.name))?;

        Ok(LoadedSkin {
            resolved,
            file,
            store,
            framebuffers,
        })
    }
}
