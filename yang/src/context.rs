use std::collections::HashSet;

use indexmap::IndexMap;

use crate::error::YangError;
use crate::import::{Import, ImportError, ModuleResolver};
use crate::reader::read_module;
use crate::resolve::Resolver;
use crate::schema::Schema;
use crate::statement::{StatementTable, StmtRef};

/// Collects modules, loads their imports and finally cross-references everything into a
/// [`Schema`].
pub struct SchemaContext<'a> {
    table: StatementTable,
    modules: IndexMap<String, StmtRef>,

    module_resolvers: &'a [Box<dyn ModuleResolver>],
    attempted_imports: HashSet<String>,
}

impl<'a> SchemaContext<'a> {
    pub fn new(module_resolvers: &'a [Box<dyn ModuleResolver>]) -> Self {
        Self {
            table: StatementTable::new(),
            modules: IndexMap::new(),
            module_resolvers,
            attempted_imports: HashSet::new(),
        }
    }

    /// Reads a YIN module. Its imports are loaded by [`Self::resolve()`], so modules may be added
    /// in any order.
    pub fn add_module(&mut self, text: &str) -> Result<StmtRef, YangError> {
        let module = read_module(&mut self.table, text)?;
        let name = self.table.get(module).name().to_string();
        if self.modules.contains_key(&name) {
            return Err(YangError::DuplicateModule(name));
        }
        self.modules.insert(name, module);
        Ok(module)
    }

    pub fn contains_module(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    fn resolve_import(&mut self, import: &Import) -> Result<(), YangError> {
        // Every module name is only attempted once
        if self.modules.contains_key(&import.module)
            || !self.attempted_imports.insert(import.module.clone())
        {
            return Ok(());
        }

        let mut last_error = ImportError::UnsupportedImport;
        for resolver in self.module_resolvers {
            match resolver.resolve_module(import) {
                Ok(text) => {
                    let module = self.add_module(&text)?;
                    let loaded = self.table.get(module).name();
                    if loaded != import.module {
                        tracing::warn!(
                            "import of {} loaded a module named {loaded}",
                            import.module
                        );
                    }
                    return Ok(());
                }
                Err(ImportError::UnsupportedImport) => continue,
                Err(err) => last_error = err,
            }
        }

        Err(YangError::Import {
            name: import.module.clone(),
            source: last_error,
        })
    }

    /// Loads missing imports transitively, then resolves groupings, typedefs, effective children,
    /// augments and leafref targets.
    pub fn resolve(mut self) -> Result<Schema, YangError> {
        // Newly loaded modules are appended, so this also visits their imports
        let mut next = 0;
        while next < self.modules.len() {
            let module = self.modules[next];
            for import in Import::of_module(&self.table, module) {
                self.resolve_import(&import)?;
            }
            next += 1;
        }

        Resolver::new(&mut self.table, &self.modules).resolve()?;
        Ok(Schema::new(self.table, self.modules))
    }
}
