//! `%{name}` interpolation for resolved translations
//!
//! Templates use the same placeholder syntax as Rails-style translation
//! strings:
//!
//! ```
//! use json_translate::interpolate::{Params, render};
//!
//! let params = Params::new().with("where", "Wonderland");
//! assert_eq!(render("Alice in %{where}", &params), "Alice in Wonderland");
//! assert_eq!(render("Alice in %{where}", &Params::new()), "Alice in %{where}");
//! ```

use std::collections::BTreeMap;
use std::fmt::Display;
use std::sync::LazyLock;

use regex::{Captures, Regex};

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"%%|%\{(\w+)\}").expect("placeholder pattern is valid")
});

/// Named interpolation arguments passed along with a read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(BTreeMap<String, String>);

impl Params {
    pub fn new() -> Self {
        Params(BTreeMap::new())
    }

    pub fn with(mut self, name: &str, value: impl Display) -> Self {
        self.0.insert(name.to_string(), value.to_string());
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Display) -> &mut Self {
        self.0.insert(name.to_string(), value.to_string());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: AsRef<str>, V: Display> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (name, value) in iter {
            params.insert(name.as_ref(), value);
        }
        params
    }
}

/// Substitute `%{name}` placeholders in `template`.
///
/// With no params the template comes back untouched. Otherwise every
/// placeholder with a matching param is replaced in a single pass, unknown
/// names are left as written and `%%` collapses to a literal `%`.
pub fn render(template: &str, params: &Params) -> String {
    if params.is_empty() {
        return template.to_string();
    }

    PLACEHOLDER
        .replace_all(template, |caps: &Captures| match caps.get(1) {
            None => "%".to_string(),
            Some(name) => match params.get(name.as_str()) {
                Some(value) => value.to_string(),
                None => {
                    tracing::trace!(placeholder = name.as_str(), "missing interpolation argument");
                    caps[0].to_string()
                }
            },
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_substitutes_named_values() {
        let params = Params::new().with("where", "Wonderland");
        assert_eq!(render("Alice in %{where}", &params), "Alice in Wonderland");
    }

    #[test]
    fn test_render_without_params_is_verbatim() {
        assert_eq!(render("Alice in %{where}", &Params::new()), "Alice in %{where}");
        assert_eq!(render("100%% sure", &Params::new()), "100%% sure");
    }

    #[test]
    fn test_render_leaves_missing_placeholders() {
        let params = Params::new().with("who", "Alice");
        assert_eq!(
            render("%{who} in %{where}", &params),
            "Alice in %{where}"
        );
    }

    #[test]
    fn test_render_single_pass() {
        let params = Params::new().with("a", "%{b}").with("b", "nested");
        assert_eq!(render("[%{a}]", &params), "[%{b}]");
    }

    #[test]
    fn test_render_escape_and_numbers() {
        let params: Params = [("count", 3)].into_iter().collect();
        assert_eq!(render("%{count} items, 100%% done", &params), "3 items, 100% done");
    }
}
