#[cfg(feature = "generator-rust")]
pub(crate) mod rust;
mod tree;

use clap::ValueEnum;
use knit_wrapper::{Module, Wool};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Format {
    #[cfg(feature = "generator-rust")]
    Rust,
    Tree,
}

impl Format {
    /// The wool used when none is chosen explicitly.
    pub fn default_wool(&self) -> &'static str {
        match *self {
            #[cfg(feature = "generator-rust")]
            Self::Rust => crate::wools::RUST_WOOL,
            Self::Tree => knit_wrapper::wool::DEFAULT_WOOL,
        }
    }

    /// The output file of `module`. Rust files are named like the module paths of imports.
    pub fn file_name(&self, module: &str) -> String {
        match *self {
            #[cfg(feature = "generator-rust")]
            Self::Rust => format!("{}.rs", module.replace(['-', '.'], "_")),
            Self::Tree => format!("{module}.txt"),
        }
    }

    pub fn generate(&self, module: &Module, wool: &Wool) -> String {
        match *self {
            #[cfg(feature = "generator-rust")]
            Self::Rust => rust::generate(module, wool),
            Self::Tree => tree::generate(module),
        }
    }
}
