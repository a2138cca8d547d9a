use knit_wrapper::{Module, Wool};

pub fn yin(name: &str, body: &str) -> String {
    format!(
        r#"<module name="{name}" xmlns="urn:ietf:params:xml:ns:yang:yin:1">
             <namespace uri="urn:example:{name}"/>
             <prefix value="{name}"/>{body}</module>"#
    )
}

/// Loads `modules` and wraps the one named `name`.
pub fn wrap(modules: &[String], name: &str, wool: &Wool) -> Module {
    let schema = knit_yang::read_schema(modules, &[]).unwrap();
    Module::wrap(&schema, wool, schema.module(name).unwrap())
}
