use crate::source::{LoadedSkin, SkinArgs};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use comfy_table::Table;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use serde::Serialize;
use skin_layout::{ImageStoreStats, LayoutEvent, PlacedDisplay, Rect, Rotation, Size, SkinOrigin};

#[derive(Args, Debug)]
#[command(about = "Show the parts and layouts of a skin")]
pub struct InfoArgs {
    #[command(flatten)]
    pub skin: SkinArgs,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value = "human")]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

#[derive(Debug, Serialize)]
struct SkinInfo<'a> {
    name: &'a str,
    origin: &'a SkinOrigin,
    version: i32,
    parts: Vec<PartInfo<'a>>,
    layouts: Vec<LayoutInfo<'a>>,
    framebuffers: Vec<FramebufferInfo>,
    images: ImageStoreStats,
}

#[derive(Debug, Serialize)]
struct PartInfo<'a> {
    name: &'a str,
    rect: Rect,
    background: Option<String>,
    display: Option<Rect>,
    buttons: usize,
    derived_from: Option<usize>,
}

#[derive(Debug, Serialize)]
struct LayoutInfo<'a> {
    name: &'a str,
    size: Size,
    color: String,
    orientation: Rotation,
    dpad_rotation: Rotation,
    event: LayoutEvent,
    display: Option<PlacedDisplay>,
    has_onion: bool,
}

#[derive(Debug, Serialize)]
struct FramebufferInfo {
    width: u32,
    height: u32,
    bpp: u32,
}

pub fn execute(args: InfoArgs) -> Result<()> {
    let loaded = args.skin.load()?;
    let info = collect(&loaded);

    match args.format {
        OutputFormat::Human => print_human_readable(&info),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&info)?),
    }
    Ok(())
}

fn collect(loaded: &LoadedSkin) -> SkinInfo<'_> {
    let file = &loaded.file;

    let parts = file
        .parts()
        .iter()
        .map(|part| PartInfo {
            name: &part.name,
            rect: part.rect,
            background: part
                .background
                .as_ref()
                .and_then(|bg| bg.image.desc())
                .map(|desc| desc.to_string()),
            display: part.display().map(|d| d.rect),
            buttons: part.buttons.len(),
            derived_from: part.derived_from().map(|id| id.0),
        })
        .collect();

    let layouts = file
        .layout_ids()
        .filter_map(|id| Some((id, file.layout(id)?)))
        .map(|(id, layout)| LayoutInfo {
            name: &layout.name,
            size: layout.size,
            color: format!("#{:08x}", layout.color),
            orientation: layout.orientation,
            dpad_rotation: file.layout_dpad_rotation(id),
            event: layout.event,
            display: file.placed_display(id),
            has_onion: layout.onion.is_some(),
        })
        .collect();

    let framebuffers = loaded
        .framebuffers
        .created()
        .iter()
        .map(|&(width, height, bpp)| FramebufferInfo { width, height, bpp })
        .collect();

    SkinInfo {
        name: &loaded.resolved.name,
        origin: &loaded.resolved.origin,
        version: file.version(),
        parts,
        layouts,
        framebuffers,
        images: loaded.store.stats(),
    }
}

fn origin_label(origin: &SkinOrigin) -> String {
    match origin {
        SkinOrigin::Directory => "directory".to_string(),
        SkinOrigin::Magic { width, height, bpp } => format!("generated {width}x{height}x{bpp}"),
        SkinOrigin::BuiltIn => "built-in".to_string(),
    }
}

fn print_human_readable(info: &SkinInfo<'_>) {
    println!("{}", "Skin".blue().bold());
    println!("Name: {}", info.name.bold());
    println!("Source: {}", origin_label(info.origin));
    println!("Version: {}", info.version);
    println!();

    println!("{} ({})", "Parts".blue().bold(), info.parts.len());
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["#", "Name", "Rect", "Background", "Display", "Buttons", "From"]);
    for (index, part) in info.parts.iter().enumerate() {
        table.add_row(vec![
            index.to_string(),
            part.name.to_string(),
            part.rect.to_string(),
            part.background.clone().unwrap_or_else(|| "-".to_string()),
            part.display.map_or_else(|| "-".to_string(), |r| r.to_string()),
            part.buttons.to_string(),
            part.derived_from.map_or_else(|| "-".to_string(), |i| i.to_string()),
        ]);
    }
    println!("{table}");
    println!();

    println!("{} ({})", "Layouts".blue().bold(), info.layouts.len());
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        "#",
        "Name",
        "Size",
        "Orientation",
        "D-pad",
        "Display",
        "Event",
    ]);
    for (index, layout) in info.layouts.iter().enumerate() {
        let display = layout.display.as_ref().map_or_else(
            || "-".to_string(),
            |d| format!("{} @{}", d.rect, d.rotation),
        );
        let event = format!(
            "{}:{}:{}",
            layout.event.kind, layout.event.code, layout.event.value
        );
        table.add_row(vec![
            index.to_string(),
            layout.name.to_string(),
            layout.size.to_string(),
            layout.orientation.to_string(),
            layout.dpad_rotation.to_string(),
            display,
            event,
        ]);
    }
    println!("{table}");
    println!();

    for fb in &info.framebuffers {
        println!("Framebuffer: {}x{} {} bpp", fb.width, fb.height, fb.bpp);
    }
    println!(
        "{}",
        format!(
            "Images: {} decoded, {} derived, {} cached ({} px)",
            info.images.decodes,
            info.images.derivations,
            info.images.entries,
            info.images.total_pixels
        )
        .dimmed()
    );
}
