use roxmltree::Node;

use crate::builtins::{YinArgument, YIN_ARGUMENTS, YIN_NAMESPACE};
use crate::error::YangError;
use crate::statement::{Statement, StatementTable, StmtRef};

/// Statements that would pull in submodules; these are rejected.
const UNSUPPORTED_KEYWORDS: &[&str] = &["submodule", "include"];

/// Reads one YIN document into `table` and returns the reference of its `module` statement.
pub fn read_module(table: &mut StatementTable, text: &str) -> Result<StmtRef, YangError> {
    let document = roxmltree::Document::parse(text)?;
    let root = document.root_element();

    let keyword = root.tag_name().name();
    if root.tag_name().namespace() != Some(YIN_NAMESPACE) || keyword != "module" {
        if UNSUPPORTED_KEYWORDS.contains(&keyword) {
            return Err(YangError::Unsupported {
                keyword: keyword.to_string(),
                module: root.attribute("name").unwrap_or_default().to_string(),
            });
        }
        return Err(YangError::NotAModule(keyword.to_string()));
    }

    let name = root
        .attribute("name")
        .ok_or_else(|| YangError::MissingArgument {
            keyword: "module".into(),
            module: String::new(),
        })?
        .to_string();

    tracing::debug!("reading module {name}");
    map_from_yin(table, None, root, &name)
}

fn map_from_yin(
    table: &mut StatementTable,
    parent: Option<StmtRef>,
    node: Node,
    module: &str,
) -> Result<StmtRef, YangError> {
    let (keyword, argument) = if node.tag_name().namespace() == Some(YIN_NAMESPACE) {
        let keyword = node.tag_name().name();
        if UNSUPPORTED_KEYWORDS.contains(&keyword) {
            return Err(YangError::Unsupported {
                keyword: keyword.to_string(),
                module: module.to_string(),
            });
        }
        match YIN_ARGUMENTS.get(keyword) {
            Some(argument) => (keyword.to_string(), *argument),
            // Core namespace but not a keyword we know; treat it like an extension
            None => (keyword.to_string(), None),
        }
    } else {
        (extension_keyword(node), None)
    };

    let arg = match argument {
        Some(YinArgument {
            name,
            yin_element: false,
        }) => Some(
            node.attribute(name)
                .ok_or_else(|| missing_argument(&keyword, module))?
                .to_string(),
        ),
        Some(YinArgument {
            name,
            yin_element: true,
        }) => Some(
            argument_element(node, name)
                .map(element_text)
                .ok_or_else(|| missing_argument(&keyword, module))?,
        ),
        None if YIN_ARGUMENTS.contains_key(keyword.as_str()) => None,
        None => node.attributes().next().map(|attr| attr.value().to_string()),
    };

    let self_ref = table.create(parent, Statement::new(keyword, arg, module));

    for child in node.children().filter(|c| c.is_element()) {
        if let Some(YinArgument {
            name,
            yin_element: true,
        }) = argument
        {
            if is_yin_element(child, name) {
                continue;
            }
        }
        map_from_yin(table, Some(self_ref), child, module)?;
    }

    Ok(self_ref)
}

/// Extension statements are named `prefix:keyword` after the namespace prefix in scope.
fn extension_keyword(node: Node) -> String {
    let local = node.tag_name().name();
    match node
        .tag_name()
        .namespace()
        .and_then(|ns| node.lookup_prefix(ns))
    {
        Some(prefix) if !prefix.is_empty() => format!("{prefix}:{local}"),
        _ => local.to_string(),
    }
}

fn is_yin_element(node: Node, name: &str) -> bool {
    node.tag_name().namespace() == Some(YIN_NAMESPACE) && node.tag_name().name() == name
}

fn argument_element<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|child| is_yin_element(*child, name))
}

/// All text below `node`, markup stripped.
fn element_text(node: Node) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}

fn missing_argument(keyword: &str, module: &str) -> YangError {
    YangError::MissingArgument {
        keyword: keyword.to_string(),
        module: module.to_string(),
    }
}
