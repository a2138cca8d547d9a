use std::fmt;
use std::num::{NonZeroU32, NonZeroUsize};

/// A reference to a [`Statement`] stored in a [`StatementTable`]
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StmtRef(NonZeroU32);

impl StmtRef {
    fn index(self) -> usize {
        let size: NonZeroUsize = self
            .0
            .try_into()
            .expect("Could not convert statement reference to usize index");
        usize::from(size) - 1
    }

    pub fn get(self, table: &StatementTable) -> &Statement {
        table.get(self)
    }
}

impl fmt::Debug for StmtRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<Statement #{}>", self.0)
    }
}

/// One parsed YANG statement together with the cross-references attached by the resolver.
///
/// The `i_*` fields follow the conventions of classic YANG tooling: they are empty right after
/// reading and are filled in once by [`crate::SchemaContext::resolve()`].
#[derive(Clone, Debug)]
pub struct Statement {
    pub keyword: String,
    pub arg: Option<String>,
    pub parent: Option<StmtRef>,
    pub substmts: Vec<StmtRef>,
    /// Name of the module this statement was written in
    pub module: String,

    /// Effective schema children: data definitions with `uses` expanded and augments applied
    pub i_children: Vec<StmtRef>,
    /// The node whose `i_children` contain this statement
    pub i_schema_parent: Option<StmtRef>,
    /// For `uses`: the referenced grouping
    pub i_grouping: Option<StmtRef>,
    /// For `type`: the referenced typedef, if the type is not a builtin
    pub i_typedef: Option<StmtRef>,
    /// For children injected by an augmentation: the `augment` statement
    pub i_augment: Option<StmtRef>,
    /// For `type leafref`: the leaf the path points to
    pub i_target_node: Option<StmtRef>,
    /// For statements instantiated from a grouping: the original statement
    pub i_orig: Option<StmtRef>,
}

impl Statement {
    pub fn new(keyword: impl Into<String>, arg: Option<String>, module: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            arg,
            parent: None,
            substmts: Vec::new(),
            module: module.into(),
            i_children: Vec::new(),
            i_schema_parent: None,
            i_grouping: None,
            i_typedef: None,
            i_augment: None,
            i_target_node: None,
            i_orig: None,
        }
    }

    /// The argument, or the keyword for statements that never carry one (`input`, `output`).
    pub fn name(&self) -> &str {
        self.arg.as_deref().unwrap_or(&self.keyword)
    }

    /// The argument without a `prefix:` qualifier.
    pub fn local_name(&self) -> &str {
        split_prefix(self.name()).1
    }
}

/// Splits `prefix:name` into its parts; names without a prefix yield `None`.
pub fn split_prefix(name: &str) -> (Option<&str>, &str) {
    match name.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, name),
    }
}

/// Arena holding every statement of every loaded module, including grouping instantiations.
#[derive(Clone, Debug, Default)]
pub struct StatementTable {
    statements: Vec<Statement>,
}

impl StatementTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, ref_: StmtRef) -> &Statement {
        self.statements
            .get(ref_.index())
            .expect("Invalid statement reference (out-of-bounds)")
    }

    pub(crate) fn get_mut(&mut self, ref_: StmtRef) -> &mut Statement {
        self.statements
            .get_mut(ref_.index())
            .expect("Invalid statement reference (out-of-bounds)")
    }

    /// Appends `statement` as the last substatement of `parent` (or as a root if `None`).
    pub(crate) fn create(&mut self, parent: Option<StmtRef>, mut statement: Statement) -> StmtRef {
        statement.parent = parent;
        self.statements.push(statement);

        // We use the size for the ref's ID, which is non-zero after the push
        let size = NonZeroUsize::new(self.statements.len()).unwrap();
        let id: NonZeroU32 = size.try_into().expect("ID did not fit into 32-bit integer");
        let ref_ = StmtRef(id);

        if let Some(parent) = parent {
            self.get_mut(parent).substmts.push(ref_);
        }
        ref_
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// All references in creation order.
    pub fn refs(&self) -> impl Iterator<Item = StmtRef> {
        (1..=self.statements.len()).map(|id| {
            let id = u32::try_from(id).expect("ID did not fit into 32-bit integer");
            StmtRef(NonZeroU32::new(id).unwrap())
        })
    }

    /// Literal substatements of `ref_` with the given keyword.
    pub fn search<'a>(
        &'a self,
        ref_: StmtRef,
        keyword: &'a str,
    ) -> impl Iterator<Item = StmtRef> + 'a {
        self.get(ref_)
            .substmts
            .iter()
            .copied()
            .filter(move |sub| self.get(*sub).keyword == keyword)
    }

    pub fn search_one(&self, ref_: StmtRef, keyword: &str) -> Option<StmtRef> {
        self.search(ref_, keyword).next()
    }

    /// Argument of the first substatement with the given keyword.
    pub fn search_arg(&self, ref_: StmtRef, keyword: &str) -> Option<&str> {
        self.search_one(ref_, keyword)
            .and_then(|sub| self.get(sub).arg.as_deref())
    }

    /// The lexical root (module statement) of `ref_`.
    pub fn top(&self, mut ref_: StmtRef) -> StmtRef {
        while let Some(parent) = self.get(ref_).parent {
            ref_ = parent;
        }
        ref_
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn module_with_leaf() -> (StatementTable, StmtRef, StmtRef) {
        let mut table = StatementTable::new();
        let module = table.create(None, Statement::new("module", Some("m".into()), "m"));
        let container = table.create(
            Some(module),
            Statement::new("container", Some("c".into()), "m"),
        );
        let leaf = table.create(Some(container), Statement::new("leaf", Some("x".into()), "m"));
        table.create(Some(leaf), Statement::new("type", Some("string".into()), "m"));
        (table, module, leaf)
    }

    #[test]
    fn create_links_parent_and_substatements() {
        let (table, module, leaf) = module_with_leaf();
        let container = table.get(leaf).parent.unwrap();
        assert_eq!(table.get(module).substmts, vec![container]);
        assert_eq!(table.top(leaf), module);
        assert_eq!(table.search_arg(leaf, "type"), Some("string"));
        assert_eq!(table.refs().count(), table.len());
    }

    #[test]
    fn argumentless_statements_are_named_by_keyword() {
        let input = Statement::new("input", None, "m");
        assert_eq!(input.name(), "input");
        let typed = Statement::new("type", Some("ex:counter".into()), "m");
        assert_eq!(typed.local_name(), "counter");
        assert_eq!(split_prefix("ex:counter"), (Some("ex"), "counter"));
    }
}
