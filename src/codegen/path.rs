use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("static identifier regex")
});

/// Expression text reaching the value currently being validated.
///
/// Immutable: descending into a property or element yields a new path, so
/// the caller's path is untouched when the recursion returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPath {
    text: String,
    element_depth: usize, // `every` binders already in scope
}

impl AccessPath {
    pub fn root(variable: impl Into<String>) -> Self {
        Self {
            text: variable.into(),
            element_depth: 0,
        }
    }

    /// `path.name`, or `path["name"]` when `name` is not an identifier.
    pub fn property(&self, name: &str) -> Self {
        let text = if is_identifier(name) {
            format!("{}.{name}", self.text)
        } else {
            format!("{}[{}]", self.text, quote_string(name))
        };
        Self { text, element_depth: self.element_depth }
    }

    pub fn index(&self, index: usize) -> Self {
        Self {
            text: format!("{}[{index}]", self.text),
            element_depth: self.element_depth,
        }
    }

    /// Fresh variable bound by an `every` callback nested inside this path.
    pub fn bind_element(&self) -> Self {
        let text = match self.element_depth {
            0 => "element".to_owned(),
            depth => format!("element{depth}"),
        };
        Self { text, element_depth: self.element_depth + 1 }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn element_depth(&self) -> usize {
        self.element_depth
    }
}

impl fmt::Display for AccessPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

pub fn is_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}

/// Double-quoted string literal with JSON escaping, valid in JS source.
pub fn quote_string(value: &str) -> String {
    serde_json::Value::from(value).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn properties_and_indices_nest() {
        let root = AccessPath::root("v");
        assert_eq!(root.property("b").index(1).as_str(), "v.b[1]");
        // the parent path is untouched
        assert_eq!(root.as_str(), "v");
    }

    #[test]
    fn non_identifier_properties_use_brackets() {
        let root = AccessPath::root("v");
        assert_eq!(root.property("content-type").as_str(), r#"v["content-type"]"#);
        assert_eq!(root.property("1st").as_str(), r#"v["1st"]"#);
        assert_eq!(root.property("say \"hi\"").as_str(), r#"v["say \"hi\""]"#);
        assert_eq!(root.property("$ref").as_str(), "v.$ref");
    }

    #[test]
    fn element_binders_are_fresh_per_depth() {
        let outer = AccessPath::root("value").bind_element();
        let inner = outer.property("items").bind_element();
        assert_eq!(outer.as_str(), "element");
        assert_eq!(inner.as_str(), "element1");
        assert_eq!(inner.element_depth(), 2);
    }
}
