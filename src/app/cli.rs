use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Read a comprexxion project description and select the files to bundle"
)]
pub struct Cli {
    /// Configuration file to read
    #[arg(short = 'c', long = "config", default_value = "comprexxion.txt")]
    pub config: PathBuf,

    /// Print the parsed configuration, structure tree included
    #[arg(long)]
    pub print: bool,

    /// List every selected path, one per line
    #[arg(long, conflicts_with = "print")]
    pub list: bool,

    /// Skip ~/.config/comprexxion/defaults.toml
    #[arg(long)]
    pub no_user_defaults: bool,
}
