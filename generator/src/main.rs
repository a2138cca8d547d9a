mod cli;
mod config;
mod error;
mod generators;
#[cfg(test)]
mod test_util;
mod wools;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use knit_wrapper::Module;
use knit_yang::{ModuleResolver, SearchPathResolver};

use cli::Cli;
use config::Config;
use error::Error;

fn init_logging(directive: Option<&str>) {
    let filter = match directive {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("knit=info")),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Reads a module from a file, or fetches it if `input` is a URL.
fn read_input(input: &str) -> Result<String, Error> {
    if input.starts_with("http://") || input.starts_with("https://") {
        tracing::debug!("fetching {input}");
        reqwest::blocking::get(input)
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.text())
            .map_err(|source| Error::Fetch {
                url: input.to_string(),
                source,
            })
    } else {
        std::fs::read_to_string(input).map_err(|source| Error::Read {
            path: PathBuf::from(input),
            source,
        })
    }
}

fn write_output(output_path: Option<&Path>, file_name: &str, text: &str) -> Result<(), Error> {
    let Some(directory) = output_path else {
        print!("{text}");
        return Ok(());
    };

    let path = directory.join(file_name);
    std::fs::create_dir_all(directory)
        .and_then(|()| std::fs::write(&path, text))
        .map_err(|source| Error::Write {
            path: path.clone(),
            source,
        })?;
    tracing::info!("wrote {}", path.display());
    Ok(())
}

fn run(cli: Cli) -> Result<(), Error> {
    let config = match cli.config.as_deref() {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    }
    .merge(&cli);

    let registry = wools::registry()?;
    if cli.list_wools {
        for name in registry.names() {
            println!("{name}");
        }
        return Ok(());
    }

    let wool_name = cli.wool.as_deref().unwrap_or(cli.format.default_wool());
    let wool = wools::select(&registry, wool_name, &config.type_patterns)?;

    let modules = cli
        .inputs
        .iter()
        .map(|input| read_input(input))
        .collect::<Result<Vec<_>, _>>()?;
    let module_resolvers =
        [Box::new(SearchPathResolver::new(config.search_paths.clone())) as Box<dyn ModuleResolver>];
    let schema = knit_yang::read_schema(&modules, &module_resolvers)?;

    for module in Module::wrap_all(&schema, &wool) {
        let text = cli.format.generate(&module, &wool);
        let file_name = cli.format.file_name(module.name());
        write_output(config.output_path.as_deref(), &file_name, &text)?;
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let causes: Vec<String> =
                std::iter::successors(Some(&error as &dyn std::error::Error), |e| e.source())
                    .map(ToString::to_string)
                    .collect();
            tracing::error!("{}", causes.join(": "));
            ExitCode::FAILURE
        }
    }
}
