use std::path::PathBuf;

use clap::Parser;

use crate::generators::Format;

#[derive(Debug, Parser)]
#[clap(version, about)]
pub struct Cli {
    #[clap(
        value_parser,
        required_unless_present = "list_wools",
        help = "The YIN files or URLs of the modules to wrap"
    )]
    pub inputs: Vec<String>,

    #[clap(short = 'p', long = "path", help = "A directory to search for imported modules")]
    pub search_paths: Vec<PathBuf>,

    #[clap(short, long, help = "The wool to wrap with [default: depends on the format]")]
    pub wool: Option<String>,

    #[clap(short, long, value_enum, default_value = "tree")]
    pub format: Format,

    #[clap(short, long, help = "Write one file per module into this directory instead of stdout")]
    pub output_path: Option<PathBuf>,

    #[clap(short, long, help = "A TOML configuration file")]
    pub config: Option<PathBuf>,

    #[clap(long, help = "Print the registered wools and exit")]
    pub list_wools: bool,

    #[clap(long, help = "A tracing filter directive, e.g. `debug` or `knit_wrapper=trace`")]
    pub log_level: Option<String>,
}
