use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// A .jar archive or a bare .class file to load
    pub path: PathBuf,

    #[arg(long)]
    /// Run this method from the first loaded class after loading
    pub entry: Option<String>,

    #[arg(long("arg"))]
    /// Integer arguments for --entry, one flag per argument
    pub args: Vec<i32>,

    #[arg(long)]
    /// Log every step the machine takes
    pub verbose: bool,
}
