use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use knit_yang::StmtRef;
use regex::Regex;

use crate::error::WoolError;
use crate::knitter::Knitter;
use crate::naming::{DefaultNaming, Naming};
use crate::node::NodeRef;
use crate::wrappers;

/// Wraps one statement below `parent` (`None` for the module) and returns the new node.
pub type WrapFn = fn(&mut Knitter<'_>, StmtRef, Option<NodeRef>) -> NodeRef;

pub const DEFAULT_WOOL: &str = "default";

static DEFAULT_NAMING: DefaultNaming = DefaultNaming;

/// Maps a builtin YANG type onto a data type of the target language.
#[derive(Clone, Debug)]
pub struct TypePattern {
    regex: Regex,
    pub data_type: String,
}

impl TypePattern {
    /// `pattern` has to match the whole builtin name.
    pub fn new(pattern: &str, data_type: impl Into<String>) -> Result<Self, WoolError> {
        let regex = Regex::new(&format!("^(?:{pattern})$")).map_err(|source| WoolError::Pattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self {
            regex,
            data_type: data_type.into(),
        })
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    pub fn is_match(&self, builtin: &str) -> bool {
        self.regex.is_match(builtin)
    }
}

/// A backend: wrapper constructors, type mappings and naming conventions for one target language.
///
/// Everything not set on a wool is inherited from its parent.
pub struct Wool {
    name: String,
    parent: Option<Arc<Wool>>,
    wrappers: HashMap<String, WrapFn>,
    type_patterns: Vec<TypePattern>,
    naming: Option<Box<dyn Naming>>,
}

impl Wool {
    /// The root wool, wrapping every statement kind the engine knows about.
    pub fn default_wool() -> Self {
        let table: [(&str, WrapFn); 14] = [
            ("module", wrappers::wrap_module),
            ("container", wrappers::wrap_container),
            ("grouping", wrappers::wrap_grouping),
            ("list", wrappers::wrap_list),
            ("choice", wrappers::wrap_choice),
            ("case", wrappers::wrap_case),
            ("rpc", wrappers::wrap_rpc),
            ("input", wrappers::wrap_input),
            ("output", wrappers::wrap_output),
            ("notification", wrappers::wrap_notification),
            ("leaf", wrappers::wrap_leaf),
            ("leaf-list", wrappers::wrap_leaf_list),
            ("typedef", wrappers::wrap_typedef),
            ("enum", wrappers::wrap_enum),
        ];

        Self {
            name: DEFAULT_WOOL.to_string(),
            parent: None,
            wrappers: table
                .into_iter()
                .map(|(keyword, wrap)| (keyword.to_string(), wrap))
                .collect(),
            type_patterns: Vec::new(),
            naming: Some(Box::new(DefaultNaming)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&Arc<Wool>> {
        self.parent.as_ref()
    }

    /// This wool followed by its ancestors.
    fn lineage(&self) -> impl Iterator<Item = &Wool> {
        std::iter::successors(Some(self), |wool| wool.parent.as_deref())
    }

    pub fn lookup(&self, keyword: &str) -> Option<WrapFn> {
        self.lineage()
            .find_map(|wool| wool.wrappers.get(keyword).copied())
    }

    /// Every keyword this wool can wrap, including inherited ones.
    pub fn keywords(&self) -> Vec<&str> {
        let mut keywords: Vec<&str> = self
            .lineage()
            .flat_map(|wool| wool.wrappers.keys().map(String::as_str))
            .collect();
        keywords.sort_unstable();
        keywords.dedup();
        keywords
    }

    /// Own patterns are tried before inherited ones; the first match wins.
    pub fn data_type_for(&self, builtin: &str) -> Option<&str> {
        self.lineage()
            .flat_map(|wool| wool.type_patterns.iter())
            .find(|pattern| pattern.is_match(builtin))
            .map(|pattern| pattern.data_type.as_str())
    }

    pub fn naming(&self) -> &dyn Naming {
        self.lineage()
            .find_map(|wool| wool.naming.as_deref())
            .unwrap_or(&DEFAULT_NAMING)
    }
}

impl fmt::Debug for Wool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wool")
            .field("name", &self.name)
            .field("parent", &self.parent.as_ref().map(|p| p.name()))
            .field("type_patterns", &self.type_patterns)
            .finish_non_exhaustive()
    }
}

/// Derives a new [`Wool`] from a parent.
pub struct WoolBuilder {
    name: String,
    parent: Arc<Wool>,
    wrappers: HashMap<String, WrapFn>,
    type_patterns: Vec<(String, String)>,
    naming: Option<Box<dyn Naming>>,
}

impl WoolBuilder {
    pub fn new(name: impl Into<String>, parent: Arc<Wool>) -> Self {
        Self {
            name: name.into(),
            parent,
            wrappers: HashMap::new(),
            type_patterns: Vec::new(),
            naming: None,
        }
    }

    pub fn wrapper(mut self, keyword: impl Into<String>, wrap: WrapFn) -> Self {
        self.wrappers.insert(keyword.into(), wrap);
        self
    }

    pub fn type_pattern(mut self, pattern: impl Into<String>, data_type: impl Into<String>) -> Self {
        self.type_patterns.push((pattern.into(), data_type.into()));
        self
    }

    pub fn naming(mut self, naming: impl Naming + 'static) -> Self {
        self.naming = Some(Box::new(naming));
        self
    }

    pub fn build(self) -> Result<Wool, WoolError> {
        let type_patterns = self
            .type_patterns
            .iter()
            .map(|(pattern, data_type)| TypePattern::new(pattern, data_type.as_str()))
            .collect::<Result<_, _>>()?;

        Ok(Wool {
            name: self.name,
            parent: Some(self.parent),
            wrappers: self.wrappers,
            type_patterns,
            naming: self.naming,
        })
    }
}

/// Named wools; names are case-insensitive.
#[derive(Debug)]
pub struct WoolRegistry {
    wools: IndexMap<String, Arc<Wool>>,
}

impl Default for WoolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl WoolRegistry {
    pub fn new() -> Self {
        let mut wools = IndexMap::new();
        wools.insert(DEFAULT_WOOL.to_string(), Arc::new(Wool::default_wool()));
        Self { wools }
    }

    pub fn default_wool(&self) -> Arc<Wool> {
        Arc::clone(&self.wools[DEFAULT_WOOL])
    }

    pub fn get(&self, name: &str) -> Option<Arc<Wool>> {
        self.wools.get(&name.to_lowercase()).cloned()
    }

    /// A builder for a wool deriving from the registered wool `parent`.
    pub fn derive(&self, name: &str, parent: &str) -> Result<WoolBuilder, WoolError> {
        let parent = self
            .get(parent)
            .ok_or_else(|| WoolError::UnknownParent(parent.to_string()))?;
        Ok(WoolBuilder::new(name, parent))
    }

    pub fn register(&mut self, wool: Wool) -> Result<Arc<Wool>, WoolError> {
        let key = wool.name.to_lowercase();
        if self.wools.contains_key(&key) {
            return Err(WoolError::Duplicate(wool.name));
        }
        if let Some(parent) = wool.parent.as_ref() {
            let registered = self.get(parent.name());
            if !registered.map_or(false, |r| Arc::ptr_eq(&r, parent)) {
                return Err(WoolError::UnknownParent(parent.name.clone()));
            }
        }

        tracing::debug!("registered wool {:?}", wool.name);
        let wool = Arc::new(wool);
        self.wools.insert(key, Arc::clone(&wool));
        Ok(wool)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.wools.values().map(|wool| wool.name())
    }
}
