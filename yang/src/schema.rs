use indexmap::IndexMap;

use crate::statement::{Statement, StatementTable, StmtRef};

/// A set of loaded and fully cross-referenced modules.
///
/// This is read-only: every `i_*` attribute has been filled in by [`crate::SchemaContext`].
#[derive(Clone, Debug)]
pub struct Schema {
    table: StatementTable,
    modules: IndexMap<String, StmtRef>,
}

impl Schema {
    pub(crate) fn new(table: StatementTable, modules: IndexMap<String, StmtRef>) -> Self {
        Self { table, modules }
    }

    pub fn table(&self) -> &StatementTable {
        &self.table
    }

    pub fn get(&self, ref_: StmtRef) -> &Statement {
        self.table.get(ref_)
    }

    pub fn module(&self, name: &str) -> Option<StmtRef> {
        self.modules.get(name).copied()
    }

    /// Modules in load order: explicitly added modules first, then their imports.
    pub fn modules(&self) -> impl Iterator<Item = (&str, StmtRef)> {
        self.modules.iter().map(|(name, ref_)| (name.as_str(), *ref_))
    }
}
