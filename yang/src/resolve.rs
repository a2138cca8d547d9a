use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;

use crate::builtins::{is_builtin_type, is_core_keyword, is_data_definition, is_schema_node};
use crate::error::YangError;
use crate::import::Import;
use crate::statement::{split_prefix, Statement, StatementTable, StmtRef};

/// Statements that end up in `i_children`: data definitions and any extension statement.
fn is_child_keyword(keyword: &str) -> bool {
    is_data_definition(keyword) || !is_core_keyword(keyword)
}

fn is_transparent(keyword: &str) -> bool {
    matches!(keyword, "choice" | "case")
}

/// Removes `[...]` predicates from a leafref path.
fn strip_predicates(path: &str) -> String {
    let mut depth = 0usize;
    path.chars()
        .filter(|c| match c {
            '[' => {
                depth += 1;
                false
            }
            ']' => {
                depth = depth.saturating_sub(1);
                false
            }
            _ => depth == 0,
        })
        .collect()
}

/// Fills in the `i_*` attributes of every statement in the table.
pub(crate) struct Resolver<'a> {
    table: &'a mut StatementTable,
    modules: &'a IndexMap<String, StmtRef>,
    /// Module name to its prefix table (own prefix and import prefixes)
    prefixes: HashMap<String, HashMap<String, String>>,
    /// Groupings whose instantiation is in progress
    expanding: HashSet<StmtRef>,
}

impl<'a> Resolver<'a> {
    pub fn new(table: &'a mut StatementTable, modules: &'a IndexMap<String, StmtRef>) -> Self {
        let mut prefixes = HashMap::new();
        for (name, module) in modules {
            let mut module_prefixes = HashMap::new();
            if let Some(prefix) = table.search_arg(*module, "prefix") {
                module_prefixes.insert(prefix.to_string(), name.clone());
            }
            for import in Import::of_module(table, *module) {
                if let Some(prefix) = import.prefix {
                    module_prefixes.insert(prefix, import.module);
                }
            }
            prefixes.insert(name.clone(), module_prefixes);
        }

        Self {
            table,
            modules,
            prefixes,
            expanding: HashSet::new(),
        }
    }

    pub fn resolve(mut self) -> Result<(), YangError> {
        let originals: Vec<StmtRef> = self.table.refs().collect();
        self.resolve_definitions(&originals)?;

        let modules = self.modules;
        for module in modules.values().copied() {
            self.populate(module);
        }

        let mut augments = Vec::new();
        for definition in originals.iter().copied() {
            let keyword = self.table.get(definition).keyword.clone();
            let top_level = self
                .table
                .get(definition)
                .parent
                .map_or(false, |parent| self.table.get(parent).keyword == "module");
            match keyword.as_str() {
                "grouping" => {
                    self.expanding.insert(definition);
                    self.populate(definition);
                    self.expanding.remove(&definition);
                }
                "augment" if top_level => {
                    self.populate(definition);
                    augments.push(definition);
                }
                _ => {}
            }
        }

        self.apply_augments(augments)?;
        self.resolve_leafrefs();
        Ok(())
    }

    fn module_for_prefix(&self, module: &str, prefix: Option<&str>) -> Option<String> {
        match prefix {
            None => Some(module.to_string()),
            Some(prefix) => self.prefixes.get(module)?.get(prefix).cloned(),
        }
    }

    /// Links `uses` to groupings and `type` to typedefs.
    fn resolve_definitions(&mut self, statements: &[StmtRef]) -> Result<(), YangError> {
        for stmt in statements.iter().copied() {
            let statement = self.table.get(stmt);
            let keyword = statement.keyword.clone();
            let name = statement.name().to_string();
            let module = statement.module.clone();

            match keyword.as_str() {
                "uses" => {
                    let grouping = self
                        .find_definition(stmt, "grouping", &name)?
                        .ok_or(YangError::UnknownGrouping { name, module })?;
                    self.table.get_mut(stmt).i_grouping = Some(grouping);
                }
                "type" if !is_builtin_type(&name) => {
                    match self.find_definition(stmt, "typedef", &name) {
                        Ok(Some(typedef)) => self.table.get_mut(stmt).i_typedef = Some(typedef),
                        Ok(None) => tracing::warn!("unknown type {name:?} in module {module}"),
                        Err(err) => tracing::warn!("{err}"),
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Prefixed names are looked up at the top level of the referenced module; unprefixed names
    /// lexically, from the innermost enclosing scope outwards.
    fn find_definition(
        &self,
        from: StmtRef,
        keyword: &str,
        name: &str,
    ) -> Result<Option<StmtRef>, YangError> {
        let module = &self.table.get(from).module;
        let (prefix, local) = split_prefix(name);

        let target = self
            .module_for_prefix(module, prefix)
            .ok_or_else(|| YangError::UnknownPrefix {
                prefix: prefix.unwrap_or_default().to_string(),
                module: module.clone(),
            })?;

        if &target != module {
            return Ok(self
                .modules
                .get(&target)
                .and_then(|top| self.find_in(*top, keyword, local)));
        }

        let mut scope = self.table.get(from).parent;
        while let Some(current) = scope {
            if let Some(found) = self.find_in(current, keyword, local) {
                return Ok(Some(found));
            }
            scope = self.table.get(current).parent;
        }
        Ok(None)
    }

    fn find_in(&self, scope: StmtRef, keyword: &str, name: &str) -> Option<StmtRef> {
        self.table
            .search(scope, keyword)
            .find(|definition| self.table.get(*definition).name() == name)
    }

    /// Computes `i_children` of a schema node and, recursively, of its children.
    fn populate(&mut self, stmt: StmtRef) {
        if !is_schema_node(&self.table.get(stmt).keyword) {
            return;
        }

        let mut children = Vec::new();
        for sub in self.table.get(stmt).substmts.clone() {
            let keyword = self.table.get(sub).keyword.as_str();
            if keyword == "uses" {
                self.expand_uses(stmt, sub, &mut children);
            } else if is_child_keyword(keyword) {
                self.populate(sub);
                children.push(self.implicit_case(stmt, sub));
            }
        }

        for child in children.iter().copied() {
            self.table.get_mut(child).i_schema_parent = Some(stmt);
        }
        self.table.get_mut(stmt).i_children = children;
    }

    /// Instantiates the grouping of `uses` under `stmt`, appending the copies to `children`.
    fn expand_uses(&mut self, stmt: StmtRef, uses: StmtRef, children: &mut Vec<StmtRef>) {
        let Some(grouping) = self.table.get(uses).i_grouping else {
            return;
        };
        if !self.expanding.insert(grouping) {
            let statement = self.table.get(uses);
            tracing::warn!(
                "recursive use of grouping {:?} in module {}, expansion cut",
                statement.name(),
                statement.module
            );
            return;
        }

        for definition in self.table.get(grouping).substmts.clone() {
            let keyword = self.table.get(definition).keyword.as_str();
            if keyword == "uses" {
                self.expand_uses(stmt, definition, children);
            } else if is_child_keyword(keyword) {
                let copy = self.instantiate(definition, None);
                self.table.get_mut(copy).parent = Some(stmt);
                self.populate(copy);
                children.push(self.implicit_case(stmt, copy));
            }
        }

        self.expanding.remove(&grouping);
    }

    /// Deep copy of `original`; the copies remember where they came from.
    fn instantiate(&mut self, original: StmtRef, parent: Option<StmtRef>) -> StmtRef {
        let source = self.table.get(original);
        let mut statement = Statement::new(
            source.keyword.clone(),
            source.arg.clone(),
            source.module.clone(),
        );
        statement.i_grouping = source.i_grouping;
        statement.i_typedef = source.i_typedef;
        statement.i_orig = Some(source.i_orig.unwrap_or(original));
        let substmts = source.substmts.clone();

        let copy = self.table.create(parent, statement);
        for sub in substmts {
            self.instantiate(sub, Some(copy));
        }
        copy
    }

    /// Choice shorthand: a data definition directly below a choice gets a case of its own name.
    fn implicit_case(&mut self, parent: StmtRef, child: StmtRef) -> StmtRef {
        let keyword = self.table.get(child).keyword.as_str();
        if self.table.get(parent).keyword != "choice"
            || keyword == "case"
            || !is_data_definition(keyword)
        {
            return child;
        }

        let source = self.table.get(child);
        let mut statement = Statement::new("case", source.arg.clone(), source.module.clone());
        statement.i_children = vec![child];
        let case = self.table.create(None, statement);
        self.table.get_mut(case).parent = Some(parent);
        self.table.get_mut(child).i_schema_parent = Some(case);
        case
    }

    fn apply_augments(&mut self, mut pending: Vec<StmtRef>) -> Result<(), YangError> {
        // Augments may target nodes added by other augments, so retry until nothing changes
        while !pending.is_empty() {
            let before = pending.len();
            let mut remaining = Vec::new();
            for augment in pending {
                match self.find_schema_node(augment) {
                    Some(target) => self.augment(augment, target),
                    None => remaining.push(augment),
                }
            }

            if remaining.len() == before {
                let statement = self.table.get(remaining[0]);
                return Err(YangError::AugmentTarget {
                    path: statement.name().to_string(),
                    module: statement.module.clone(),
                });
            }
            pending = remaining;
        }
        Ok(())
    }

    fn augment(&mut self, augment: StmtRef, target: StmtRef) {
        tracing::debug!(
            "augmenting {:?} from module {}",
            self.table.get(augment).name(),
            self.table.get(augment).module
        );
        for child in self.table.get(augment).i_children.clone() {
            let wrapped = self.implicit_case(target, child);
            for node in [child, wrapped] {
                self.table.get_mut(node).i_augment = Some(augment);
            }
            self.table.get_mut(wrapped).i_schema_parent = Some(target);
            self.table.get_mut(target).i_children.push(wrapped);
        }
    }

    /// Resolves the absolute schema node identifier of a top-level augment.
    fn find_schema_node(&self, augment: StmtRef) -> Option<StmtRef> {
        let statement = self.table.get(augment);
        let mut segments = statement.name().split('/').filter(|s| !s.is_empty());

        let first = segments.next()?;
        let (prefix, local) = split_prefix(first);
        let module = self.module_for_prefix(&statement.module, prefix)?;
        let mut node = self.find_schema_child(*self.modules.get(&module)?, local)?;
        for segment in segments {
            node = self.find_schema_child(node, split_prefix(segment).1)?;
        }
        Some(node)
    }

    fn find_schema_child(&self, node: StmtRef, name: &str) -> Option<StmtRef> {
        self.table
            .get(node)
            .i_children
            .iter()
            .copied()
            .find(|child| self.table.get(*child).name() == name)
    }

    fn resolve_leafrefs(&mut self) {
        let leafrefs: Vec<StmtRef> = self
            .table
            .refs()
            .filter(|type_| {
                let statement = self.table.get(*type_);
                statement.keyword == "type"
                    && statement.arg.as_deref() == Some("leafref")
                    && statement.parent.map_or(false, |parent| {
                        matches!(
                            self.table.get(parent).keyword.as_str(),
                            "leaf" | "leaf-list"
                        )
                    })
            })
            .collect();

        for type_ in leafrefs {
            let Some(leaf) = self.table.get(type_).parent else {
                continue;
            };
            let Some(path) = self.table.search_arg(type_, "path").map(String::from) else {
                continue;
            };
            match self.find_data_node(leaf, &path) {
                Some(target) => self.table.get_mut(type_).i_target_node = Some(target),
                None => tracing::debug!(
                    "leafref path {path:?} of {:?} does not resolve",
                    self.table.get(leaf).name()
                ),
            }
        }
    }

    /// Follows a leafref path from `leaf`. Choices and cases are not part of data paths.
    fn find_data_node(&self, leaf: StmtRef, path: &str) -> Option<StmtRef> {
        let module = &self.table.get(leaf).module;
        let path = strip_predicates(path);
        let path = path.trim();

        let mut node = if path.starts_with('/') {
            None
        } else {
            Some(leaf)
        };
        for segment in path.split('/').map(str::trim).filter(|s| !s.is_empty()) {
            if segment == ".." {
                node = Some(self.data_parent(node?)?);
                continue;
            }

            let (prefix, local) = split_prefix(segment);
            let current = match node {
                Some(current) => current,
                None => *self
                    .modules
                    .get(&self.module_for_prefix(module, prefix)?)?,
            };
            node = Some(self.find_data_child(current, local)?);
        }

        let target = node?;
        matches!(
            self.table.get(target).keyword.as_str(),
            "leaf" | "leaf-list"
        )
        .then_some(target)
    }

    fn data_parent(&self, node: StmtRef) -> Option<StmtRef> {
        let mut parent = self.table.get(node).i_schema_parent?;
        while is_transparent(&self.table.get(parent).keyword) {
            parent = self.table.get(parent).i_schema_parent?;
        }
        Some(parent)
    }

    fn find_data_child(&self, node: StmtRef, name: &str) -> Option<StmtRef> {
        for child in self.table.get(node).i_children.iter().copied() {
            let statement = self.table.get(child);
            if is_transparent(&statement.keyword) {
                if let Some(found) = self.find_data_child(child, name) {
                    return Some(found);
                }
            } else if statement.name() == name {
                return Some(child);
            }
        }
        None
    }
}
