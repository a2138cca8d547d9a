//! Wraps resolved YANG schemas into node graphs that code generators can walk.

pub mod error;
pub mod grouponder;
pub mod knitter;
pub mod module;
pub mod naming;
pub mod node;
pub mod typonder;
pub mod view;
pub mod wool;
pub mod wrappers;

#[cfg(test)]
mod test_util;

pub use error::WoolError;
pub use knitter::Knitter;
pub use module::Module;
pub use naming::{DefaultNaming, Naming};
pub use node::{Grouponder, Node, NodeKind, NodeRef, TypeClass, Typonder, UnionMember};
pub use view::ModuleView;
pub use wool::{TypePattern, Wool, WoolBuilder, WoolRegistry, WrapFn};
