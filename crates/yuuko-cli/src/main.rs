use std::process::ExitCode;

use clap::Parser;
use yuuko_cli::Cli;

fn main() -> ExitCode {
    if let Err(e) = color_eyre::install() {
        eprintln!("[yuuko] color-eyre: {e}");
    }

    let cli = Cli::parse();
    yuuko_cli::init_logging(cli.verbose);

    match yuuko_cli::run(&cli) {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(e) => {
            println!("[ERRO] {e:#}");
            ExitCode::FAILURE
        }
    }
}
