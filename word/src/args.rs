use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about = "Assemble a source program into a blueprint")]
pub struct Cli {
    /// Path to the assembly source file.
    pub input_filename: PathBuf,
}
