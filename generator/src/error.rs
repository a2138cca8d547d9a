use std::io;
use std::path::PathBuf;

use knit_wrapper::WoolError;
use knit_yang::YangError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to fetch {url}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("invalid configuration in {path}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error(transparent)]
    Schema(#[from] YangError),
    #[error(transparent)]
    Wool(#[from] WoolError),
}
