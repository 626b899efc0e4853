mod cli;

use clap::Parser;
use osdetect::ui::{self, Level, emit};

use crate::cli::Cli;

fn main() {
    let cli = Cli::parse();

    ui::set_debug_mode(cli.debug);
    ui::init(cli.output.into(), !cli.no_color);

    match cli::dispatch(&cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            emit(Level::Error, "cli.error", &format!("Error: {e:#}"), None);
            std::process::exit(1);
        }
    }
}
