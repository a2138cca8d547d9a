use thiserror::Error;

use crate::import::ImportError;

#[derive(Debug, Error)]
pub enum YangError {
    #[error("malformed XML: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("root element <{0}> is not a YIN module")]
    NotAModule(String),
    #[error("`{keyword}` statement in module {module} is missing its argument")]
    MissingArgument { keyword: String, module: String },
    #[error("module {0} is loaded twice")]
    DuplicateModule(String),
    #[error("failed to import module {name}: {source}")]
    Import {
        name: String,
        #[source]
        source: ImportError,
    },
    #[error("prefix {prefix:?} is not declared in module {module}")]
    UnknownPrefix { prefix: String, module: String },
    #[error("grouping {name:?} used in module {module} is not defined")]
    UnknownGrouping { name: String, module: String },
    #[error("augment target {path:?} in module {module} does not exist")]
    AugmentTarget { path: String, module: String },
    #[error("`{keyword}` statements are not supported (module {module})")]
    Unsupported { keyword: String, module: String },
}
