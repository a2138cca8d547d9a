//! The wools the binary knows about, and the wool a run wraps with.

use std::sync::Arc;

use knit_wrapper::{Wool, WoolBuilder, WoolError, WoolRegistry};

use crate::config::TypePatternConfig;

#[cfg(feature = "generator-rust")]
pub const RUST_WOOL: &str = "rust";

#[cfg(feature = "generator-rust")]
const RUST_TYPES: [(&str, &str); 14] = [
    ("int8", "i8"),
    ("int16", "i16"),
    ("int32", "i32"),
    ("int64", "i64"),
    ("uint8", "u8"),
    ("uint16", "u16"),
    ("uint32", "u32"),
    ("uint64", "u64"),
    ("decimal64", "f64"),
    ("boolean", "bool"),
    ("binary", "Vec<u8>"),
    ("empty", "()"),
    ("bits", "Vec<String>"),
    ("string|identityref|instance-identifier|leafref", "String"),
];

#[cfg(feature = "generator-rust")]
fn rust_wool(parent: Arc<Wool>) -> Result<Wool, WoolError> {
    RUST_TYPES
        .iter()
        .fold(WoolBuilder::new(RUST_WOOL, parent), |builder, (pattern, data_type)| {
            builder.type_pattern(*pattern, *data_type)
        })
        .naming(crate::generators::rust::RustNaming)
        .build()
}

pub fn registry() -> Result<WoolRegistry, WoolError> {
    #[allow(unused_mut)]
    let mut registry = WoolRegistry::new();
    #[cfg(feature = "generator-rust")]
    registry.register(rust_wool(registry.default_wool())?)?;
    Ok(registry)
}

/// The registered wool `name`, derived once more if the configuration adds type patterns.
pub fn select(
    registry: &WoolRegistry,
    name: &str,
    type_patterns: &[TypePatternConfig],
) -> Result<Arc<Wool>, WoolError> {
    let wool = registry
        .get(name)
        .ok_or_else(|| WoolError::Unknown(name.to_string()))?;
    if type_patterns.is_empty() {
        return Ok(wool);
    }

    let name = format!("{}+config", wool.name());
    let wool = type_patterns
        .iter()
        .fold(WoolBuilder::new(name, wool), |builder, pattern| {
            builder.type_pattern(pattern.pattern.as_str(), pattern.name.as_str())
        })
        .build()?;
    Ok(Arc::new(wool))
}
