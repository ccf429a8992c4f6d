mod args;

use std::fs::File;
use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;

use args::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let source = match File::open(&cli.input_filename) {
        Ok(file) => file,
        Err(e) => {
            println!("Error: could not open {}: {e}", cli.input_filename.display());
            return ExitCode::FAILURE;
        }
    };

    let instructions = match word_as::assemble(source) {
        Ok(instructions) => instructions,
        Err(message) => {
            println!("{message}");
            return ExitCode::FAILURE;
        }
    };

    let stdout = io::stdout();
    if let Err(e) = word_bp::render(&instructions, stdout.lock()) {
        println!("Error: failed to write blueprint: {e}");
        return ExitCode::FAILURE;
    }
    let _ = io::stdout().flush();

    ExitCode::SUCCESS
}
