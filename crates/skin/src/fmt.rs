use anyhow::{Context, Result};
use clap::Args;
use skin_config::formatter::format_tree;
use std::fs;
use std::path::PathBuf;

#[derive(Args, Debug)]
#[command(about = "Print a skin layout file in canonical form")]
pub struct FmtArgs {
    /// Layout file, or a skin directory holding one
    #[arg(value_name = "PATH", value_hint = clap::ValueHint::AnyPath)]
    pub path: PathBuf,

    /// Rewrite the file in place instead of printing it
    #[arg(short, long)]
    pub write: bool,

    /// Exit with an error if the file is not already formatted
    #[arg(long, conflicts_with = "write")]
    pub check: bool,

    /// Print the parsed tree as JSON
    #[arg(long, conflicts_with_all = ["write", "check"])]
    pub json: bool,
}

pub fn execute(args: FmtArgs) -> Result<()> {
    let path = if args.path.is_dir() {
        args.path.join("layout")
    } else {
        args.path.clone()
    };

    let text =
        fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    let root = skin_config::parse(&text)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&root)?);
        return Ok(());
    }

    let formatted = format_tree(&root);
    if args.check {
        if formatted != text {
            anyhow::bail!("{} is not formatted", path.display());
        }
    } else if args.write {
        if formatted != text {
            fs::write(&path, &formatted)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            log::info!("Formatted {}", path.display());
        }
    } else {
        print!("{formatted}");
    }
    Ok(())
}
