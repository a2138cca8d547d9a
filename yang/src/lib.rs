//! YANG schema input: reads YIN modules into a statement arena and cross-references them.

pub mod builtins;
pub mod error;
pub mod import;
pub mod schema;
pub mod statement;

mod context;
mod reader;
mod resolve;

pub use context::SchemaContext;
pub use error::YangError;
pub use import::{Import, ImportError, ModuleResolver, SearchPathResolver};
pub use schema::Schema;
pub use statement::{Statement, StatementTable, StmtRef};

/// Reads and resolves a self-contained set of YIN modules.
pub fn read_schema<S: AsRef<str>>(
    modules: &[S],
    module_resolvers: &[Box<dyn ModuleResolver>],
) -> Result<Schema, YangError> {
    let mut context = SchemaContext::new(module_resolvers);
    for module in modules {
        context.add_module(module.as_ref())?;
    }
    context.resolve()
}
