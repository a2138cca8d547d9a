use std::path::PathBuf;

use thiserror::Error;

use crate::statement::{StatementTable, StmtRef};

/// An `import` statement of a module; this is a dependency on another module, not a schema node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Import {
    pub module: String,
    pub prefix: Option<String>,
    pub revision: Option<String>,
}

impl Import {
    pub const KEYWORD: &'static str = "import";

    pub fn from_statement(table: &StatementTable, import: StmtRef) -> Self {
        assert_eq!(table.get(import).keyword, Self::KEYWORD);

        Import {
            module: table.get(import).name().to_string(),
            prefix: table.search_arg(import, "prefix").map(Into::into),
            revision: table.search_arg(import, "revision-date").map(Into::into),
        }
    }

    /// The imports of `module`, in declaration order.
    pub fn of_module(table: &StatementTable, module: StmtRef) -> Vec<Self> {
        table
            .search(module, Self::KEYWORD)
            .map(|import| Self::from_statement(table, import))
            .collect()
    }
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("the resolver does not support the import")]
    UnsupportedImport,
    #[error("the module could not be found")]
    NotFound,
    #[error("the module failed to load")]
    Io(#[from] std::io::Error),
}

/// Supplies the YIN source text of imported modules.
pub trait ModuleResolver {
    fn resolve_module(&self, import: &Import) -> Result<String, ImportError>;
}

/// Looks up `<module>@<revision>.yin`, then `<module>.yin`, in a list of directories.
#[derive(Clone, Debug, Default)]
pub struct SearchPathResolver {
    pub dirs: Vec<PathBuf>,
}

impl SearchPathResolver {
    pub fn new(dirs: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            dirs: dirs.into_iter().collect(),
        }
    }

    fn candidates(&self, import: &Import) -> Vec<PathBuf> {
        let mut names = Vec::new();
        if let Some(revision) = import.revision.as_ref() {
            names.push(format!("{}@{}.yin", import.module, revision));
        }
        names.push(format!("{}.yin", import.module));

        self.dirs
            .iter()
            .flat_map(|dir| names.iter().map(move |name| dir.join(name)))
            .collect()
    }
}

impl ModuleResolver for SearchPathResolver {
    fn resolve_module(&self, import: &Import) -> Result<String, ImportError> {
        for path in self.candidates(import) {
            if path.is_file() {
                tracing::debug!("resolved import {} to {}", import.module, path.display());
                return Ok(std::fs::read_to_string(path)?);
            }
        }
        Err(ImportError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn import(module: &str, revision: Option<&str>) -> Import {
        Import {
            module: module.into(),
            prefix: None,
            revision: revision.map(Into::into),
        }
    }

    #[test]
    fn search_path_prefers_revisioned_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("types.yin"), "plain").unwrap();
        std::fs::write(dir.path().join("types@2024-01-01.yin"), "dated").unwrap();

        let resolver = SearchPathResolver::new([dir.path().to_path_buf()]);
        let text = resolver
            .resolve_module(&import("types", Some("2024-01-01")))
            .unwrap();
        assert_eq!(text, "dated");
        let text = resolver.resolve_module(&import("types", None)).unwrap();
        assert_eq!(text, "plain");
    }

    #[test]
    fn search_path_reports_missing_module() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = SearchPathResolver::new([dir.path().to_path_buf()]);
        let err = resolver.resolve_module(&import("absent", None)).unwrap_err();
        assert!(matches!(err, ImportError::NotFound));
    }
}
