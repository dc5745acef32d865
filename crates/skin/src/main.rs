use clap::{Parser, Subcommand};
use colored::Colorize;
use env_logger::Env;

mod buttons;
mod fmt;
mod info;
mod lcd;
mod source;

#[derive(Parser)]
#[command(name = "skin")]
#[command(about = "Inspect emulator device skins", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short = 'd', long = "debug", global = true, hide = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the parts and layouts of a skin
    #[command(alias = "i")]
    Info(info::InfoArgs),

    /// List the buttons of a layout, or find the one under a point
    #[command(alias = "b")]
    Buttons(buttons::ButtonsArgs),

    /// Show the LCD and network settings a skin asks for
    Lcd(lcd::LcdArgs),

    /// Print a skin layout file in canonical form
    Fmt(fmt::FmtArgs),
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {e}", "Error:".red());
        for cause in e.chain().skip(1) {
            eprintln!("  {cause}");
        }
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Default level depends on --debug, RUST_LOG overrides it
    let env = if cli.debug {
        Env::default().default_filter_or("debug")
    } else {
        Env::default().default_filter_or("error")
    };
    env_logger::Builder::from_env(env).init();

    match cli.command {
        Commands::Info(args) => info::execute(args),
        Commands::Buttons(args) => buttons::execute(args),
        Commands::Lcd(args) => lcd::execute(args),
        Commands::Fmt(args) => fmt::execute(args),
    }
}
