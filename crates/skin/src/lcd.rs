use crate::info::OutputFormat;
use crate::source::SkinArgs;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use skin_layout::{LcdConfig, NetworkHints, SkinOrigin};

#[derive(Args, Debug)]
#[command(about = "Show the LCD and network settings a skin asks for")]
pub struct LcdArgs {
    #[command(flatten)]
    pub skin: SkinArgs,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value = "human")]
    pub format: OutputFormat,
}

#[derive(Debug, Serialize)]
struct LcdOutput {
    name: String,
    origin: SkinOrigin,
    lcd: LcdConfig,
    network: Option<NetworkHints>,
}

pub fn execute(args: LcdArgs) -> Result<()> {
    let hw = args.skin.hardware();
    let skin = args.skin.resolve()?;
    let output = LcdOutput {
        lcd: skin.lcd(&hw),
        network: skin.network(),
        name: skin.name,
        origin: skin.origin,
    };

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&output)?),
        OutputFormat::Human => {
            println!("{} {}", "Skin".blue().bold(), output.name.bold());
            println!(
                "LCD: {}x{} {} bpp",
                output.lcd.width, output.lcd.height, output.lcd.depth
            );
            if let Some(network) = &output.network {
                println!(
                    "Network speed: {}",
                    network.speed.as_deref().unwrap_or("-")
                );
                println!(
                    "Network delay: {}",
                    network.delay.as_deref().unwrap_or("-")
                );
            }
        }
    }
    Ok(())
}
