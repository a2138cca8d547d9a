pub fn convert<F: NamingConvention, T: NamingConvention>(source: &str) -> String {
    T::concatenate(&F::split(source))
}

pub trait NamingConvention {
    fn split(name: &str) -> Vec<&str>;
    fn concatenate(words: &[&str]) -> String;
}

fn push_capitalized(result: &mut String, word: &str) {
    let mut chars = word.chars();
    if let Some(first) = chars.next() {
        first.to_uppercase().for_each(|c| result.push(c));
    }
    chars
        .flat_map(|c| c.to_lowercase())
        .for_each(|c| result.push(c));
}

/// YANG identifiers: `interface-name`, also tolerating `.` and `_` as separators.
pub struct KebabCase;

impl NamingConvention for KebabCase {
    fn split(name: &str) -> Vec<&str> {
        name.split(['-', '.', '_'])
            .filter(|word| !word.is_empty())
            .collect()
    }

    fn concatenate(words: &[&str]) -> String {
        words
            .iter()
            .map(|w| w.to_lowercase())
            .collect::<Vec<_>>()
            .join("-")
    }
}

pub struct CamelCase;

impl NamingConvention for CamelCase {
    fn split(name: &str) -> Vec<&str> {
        let mut words = vec![];
        let mut start = 0;
        for (index, c) in name.char_indices().skip(1) {
            if c.is_uppercase() {
                words.push(&name[start..index]);
                start = index;
            }
        }
        if start < name.len() {
            words.push(&name[start..]);
        }
        words
    }

    fn concatenate(words: &[&str]) -> String {
        let Some((first, rest)) = words.split_first() else {
            return String::new();
        };
        let mut result = first.to_lowercase();
        for word in rest {
            push_capitalized(&mut result, word);
        }
        result
    }
}

pub struct PascalCase;

impl NamingConvention for PascalCase {
    fn split(name: &str) -> Vec<&str> {
        CamelCase::split(name)
    }

    fn concatenate(words: &[&str]) -> String {
        let mut result = String::new();
        for word in words {
            push_capitalized(&mut result, word);
        }
        result
    }
}

pub struct ScreamingSnakeCase;

impl NamingConvention for ScreamingSnakeCase {
    fn split(name: &str) -> Vec<&str> {
        name.split('_').filter(|word| !word.is_empty()).collect()
    }

    fn concatenate(words: &[&str]) -> String {
        words
            .iter()
            .map(|w| w.to_uppercase())
            .collect::<Vec<_>>()
            .join("_")
    }
}

/// Naming conventions of a wool's target language.
///
/// Every method receives the YANG identifier (or module name) as written in the schema.
pub trait Naming {
    fn class_name(&self, yang_name: &str) -> String {
        convert::<KebabCase, PascalCase>(yang_name)
    }

    fn variable_name(&self, yang_name: &str) -> String {
        convert::<KebabCase, CamelCase>(yang_name)
    }

    /// Enum values may start with a digit, which most languages do not allow for identifiers.
    fn enum_variant_name(&self, yang_name: &str) -> String {
        let name = convert::<KebabCase, ScreamingSnakeCase>(yang_name);
        if name.starts_with(|c: char| c.is_ascii_digit()) {
            format!("_{name}")
        } else {
            name
        }
    }

    /// Name of an enumeration or union declared inline by a leaf. `parent` is the class name of
    /// the enclosing node, absent for top-level leaves.
    fn inline_type_name(&self, _parent: Option<&str>, yang_name: &str) -> String {
        self.class_name(yang_name)
    }

    /// Reference to a class named `class_name` generated from `module`.
    fn import_path(&self, module: &str, class_name: &str) -> String {
        format!("{}.{class_name}", module.to_lowercase().replace('-', "."))
    }
}

pub struct DefaultNaming;

impl Naming for DefaultNaming {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camel_case_splits_correctly() {
        let source = "helloWorld";
        let words = CamelCase::split(source);
        assert_eq!(words, vec!["hello", "World"]);
    }

    #[test]
    fn camel_case_split_single_letter() {
        assert_eq!(CamelCase::split("i"), vec!["i"]);
        assert_eq!(CamelCase::split("inI"), vec!["in", "I"]);
        assert!(CamelCase::split("").is_empty());
    }

    #[test]
    fn kebab_case_splits_yang_identifiers() {
        assert_eq!(
            KebabCase::split("ipv4-address.v2"),
            vec!["ipv4", "address", "v2"]
        );
        assert_eq!(KebabCase::split("--odd--"), vec!["odd"]);
    }

    #[test]
    fn default_naming_follows_conventions() {
        let naming = DefaultNaming;
        assert_eq!(naming.class_name("interface-state"), "InterfaceState");
        assert_eq!(naming.variable_name("admin-status"), "adminStatus");
        assert_eq!(naming.enum_variant_name("not-present"), "NOT_PRESENT");
        assert_eq!(naming.enum_variant_name("10g"), "_10G");
        assert_eq!(
            naming.import_path("ietf-interfaces", "Interface"),
            "ietf.interfaces.Interface"
        );
    }

    #[test]
    fn pascal_case_concat_works() {
        let name = PascalCase::concatenate(&["HElLo", "wOrLd"]);
        assert_eq!(name, "HelloWorld")
    }
}
