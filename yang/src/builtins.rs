use std::collections::{HashMap, HashSet};

use lazy_static::lazy_static;

/// The YIN namespace (RFC 7950, §13)
pub const YIN_NAMESPACE: &str = "urn:ietf:params:xml:ns:yang:yin:1";

/// How a statement's argument is encoded in YIN: the attribute/element name, and whether it is
/// a child element (`true`) rather than an attribute.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct YinArgument {
    pub name: &'static str,
    pub yin_element: bool,
}

const fn attr(name: &'static str) -> Option<YinArgument> {
    Some(YinArgument {
        name,
        yin_element: false,
    })
}

const fn elem(name: &'static str) -> Option<YinArgument> {
    Some(YinArgument {
        name,
        yin_element: true,
    })
}

lazy_static! {
    /// The built-in YANG types (RFC 7950, §4.2.4)
    pub static ref BUILTIN_TYPES: HashSet<&'static str> = [
        "binary",
        "bits",
        "boolean",
        "decimal64",
        "empty",
        "enumeration",
        "identityref",
        "instance-identifier",
        "int8",
        "int16",
        "int32",
        "int64",
        "leafref",
        "string",
        "uint8",
        "uint16",
        "uint32",
        "uint64",
        "union",
    ]
    .into_iter()
    .collect();

    /// Every core YANG keyword with its YIN argument mapping (RFC 7950, §13.1)
    pub static ref YIN_ARGUMENTS: HashMap<&'static str, Option<YinArgument>> = [
        ("action", attr("name")),
        ("anydata", attr("name")),
        ("anyxml", attr("name")),
        ("argument", attr("name")),
        ("augment", attr("target-node")),
        ("base", attr("name")),
        ("belongs-to", attr("module")),
        ("bit", attr("name")),
        ("case", attr("name")),
        ("choice", attr("name")),
        ("config", attr("value")),
        ("contact", elem("text")),
        ("container", attr("name")),
        ("default", attr("value")),
        ("description", elem("text")),
        ("deviate", attr("value")),
        ("deviation", attr("target-node")),
        ("enum", attr("name")),
        ("error-app-tag", attr("value")),
        ("error-message", elem("value")),
        ("extension", attr("name")),
        ("feature", attr("name")),
        ("fraction-digits", attr("value")),
        ("grouping", attr("name")),
        ("identity", attr("name")),
        ("if-feature", attr("name")),
        ("import", attr("module")),
        ("include", attr("module")),
        ("input", None),
        ("key", attr("value")),
        ("leaf", attr("name")),
        ("leaf-list", attr("name")),
        ("length", attr("value")),
        ("list", attr("name")),
        ("mandatory", attr("value")),
        ("max-elements", attr("value")),
        ("min-elements", attr("value")),
        ("modifier", attr("value")),
        ("module", attr("name")),
        ("must", attr("condition")),
        ("namespace", attr("uri")),
        ("notification", attr("name")),
        ("ordered-by", attr("value")),
        ("organization", elem("text")),
        ("output", None),
        ("path", attr("value")),
        ("pattern", attr("value")),
        ("position", attr("value")),
        ("prefix", attr("value")),
        ("presence", attr("value")),
        ("range", attr("value")),
        ("reference", elem("text")),
        ("refine", attr("target-node")),
        ("require-instance", attr("value")),
        ("revision", attr("date")),
        ("revision-date", attr("date")),
        ("rpc", attr("name")),
        ("status", attr("value")),
        ("submodule", attr("name")),
        ("type", attr("name")),
        ("typedef", attr("name")),
        ("unique", attr("tag")),
        ("units", attr("name")),
        ("uses", attr("name")),
        ("value", attr("value")),
        ("when", attr("condition")),
        ("yang-version", attr("value")),
        ("yin-element", attr("value")),
    ]
    .into_iter()
    .collect();
}

/// Keywords of statements that define schema nodes and therefore appear among the effective
/// children of their parent.
pub const DATA_DEFINITION_KEYWORDS: &[&str] = &[
    "action",
    "anydata",
    "anyxml",
    "case",
    "choice",
    "container",
    "input",
    "leaf",
    "leaf-list",
    "list",
    "notification",
    "output",
    "rpc",
];

/// Keywords of statements whose own effective children get computed.
pub const SCHEMA_NODE_KEYWORDS: &[&str] = &[
    "action",
    "augment",
    "case",
    "choice",
    "container",
    "grouping",
    "input",
    "list",
    "module",
    "notification",
    "output",
    "rpc",
];

pub fn is_builtin_type(name: &str) -> bool {
    BUILTIN_TYPES.contains(name)
}

/// Whether `keyword` is part of core YANG (as opposed to an extension or vendor statement).
pub fn is_core_keyword(keyword: &str) -> bool {
    YIN_ARGUMENTS.contains_key(keyword)
}

pub fn is_data_definition(keyword: &str) -> bool {
    DATA_DEFINITION_KEYWORDS.contains(&keyword)
}

pub fn is_schema_node(keyword: &str) -> bool {
    SCHEMA_NODE_KEYWORDS.contains(&keyword)
}
