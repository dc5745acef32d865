use crate::info::OutputFormat;
use crate::source::SkinArgs;
use anyhow::{Result, bail};
use clap::Args;
use comfy_table::Table;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use skin_layout::{LayoutId, PlacedButton, Pos, Rotation, SkinFile};

#[derive(Args, Debug)]
#[command(about = "List the buttons of a layout, or find the one under a point")]
pub struct ButtonsArgs {
    #[command(flatten)]
    pub skin: SkinArgs,

    /// Layout name (defaults to the first layout)
    #[arg(short, long, conflicts_with = "orientation")]
    pub layout: Option<String>,

    /// Pick the layout by orientation in degrees (0, 90, 180 or 270)
    #[arg(long, value_parser = parse_orientation)]
    pub orientation: Option<Rotation>,

    /// Only report the topmost button under this point, as X,Y
    #[arg(long, value_name = "X,Y", value_parser = parse_pos)]
    pub at: Option<Pos>,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value = "human")]
    pub format: OutputFormat,
}

fn parse_orientation(s: &str) -> Result<Rotation, String> {
    let degrees: u32 = s.trim_end_matches('°').parse().map_err(|e| format!("{e}"))?;
    Rotation::ALL
        .into_iter()
        .find(|r| r.degrees() == degrees)
        .ok_or_else(|| format!("'{s}' is not a multiple of 90 below 360"))
}

fn parse_pos(s: &str) -> Result<Pos, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got '{s}'"))?;
    let x = x.trim().parse().map_err(|e| format!("bad x '{x}': {e}"))?;
    let y = y.trim().parse().map_err(|e| format!("bad y '{y}': {e}"))?;
    Ok(Pos::new(x, y))
}

fn select_layout(file: &SkinFile, args: &ButtonsArgs) -> Result<LayoutId> {
    if let Some(orientation) = args.orientation {
        return match file.layout_by_orientation(orientation) {
            Some(id) => Ok(id),
            None => bail!("No layout with orientation {orientation}"),
        };
    }
    Ok(match &args.layout {
        Some(name) => file.layout_by_name(name),
        None => file.first_layout(),
    })
}

pub fn execute(args: ButtonsArgs) -> Result<()> {
    let loaded = args.skin.load()?;
    let file = &loaded.file;
    let id = select_layout(file, &args)?;
    let layout_name = file.layout(id).map(|l| l.name.as_str()).unwrap_or_default();
    log::debug!("Using layout #{} '{layout_name}'", id.0);

    let buttons = match args.at {
        Some(pos) => file.button_at(id, pos).into_iter().collect(),
        None => file.placed_buttons(id),
    };

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&buttons)?),
        OutputFormat::Human => {
            if buttons.is_empty() {
                println!("No buttons found");
            } else {
                print_table(file, &buttons);
            }
        }
    }
    Ok(())
}

fn print_table(file: &SkinFile, buttons: &[PlacedButton]) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec!["Button", "Key", "Code", "Rect", "Part"]);
    for button in buttons {
        let part = file
            .part(button.part)
            .map(|p| p.name.clone())
            .unwrap_or_default();
        table.add_row(vec![
            button.name.clone(),
            button.keycode.to_string(),
            button.keycode.0.to_string(),
            button.rect.to_string(),
            part,
        ]);
    }
    println!("{table}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orientation_values() {
        assert_eq!(parse_orientation("90"), Ok(Rotation::Deg90));
        assert_eq!(parse_orientation("270°"), Ok(Rotation::Deg270));
        assert!(parse_orientation("45").is_err());
        assert!(parse_orientation("left").is_err());
    }

    #[test]
    fn point_values() {
        assert_eq!(parse_pos("30,40"), Ok(Pos::new(30, 40)));
        assert_eq!(parse_pos(" -2 , 7"), Ok(Pos::new(-2, 7)));
        assert!(parse_pos("30").is_err());
        assert!(parse_pos("a,1").is_err());
    }
}
