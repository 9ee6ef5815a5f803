//! Accessor name routing
//!
//! Translated fields are reached through synthesized accessor names:
//!
//! | name                   | meaning                                   |
//! |------------------------|-------------------------------------------|
//! | `title`                | read in the current locale                |
//! | `title_fr`             | read in `fr`                              |
//! | `title=`               | write in the current locale               |
//! | `title_fr=`            | write in `fr`                             |
//! | `title_translations`   | read the whole translation map            |
//! | `title_translations=`  | replace the whole translation map         |
//!
//! The table is built once from the schema declarations. Names that do not
//! belong to a declared field are rejected with
//! [`TranslateError::MethodNotFound`], never guessed at.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Result, TranslateError};
use crate::schema::TranslatableField;

/// Locale suffix accepted on fields without a locale restriction:
/// `fr`, `pt_br`, `zh_hant_tw`.
static LOCALE_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z]{2,3}(?:_[a-z0-9]{2,8})*$").expect("locale suffix pattern is valid")
});

/// Suffix appended to a field name for the attribute that stores its map.
pub const TRANSLATIONS_SUFFIX: &str = "_translations";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// The provider's current locale.
    Ambient,
    Locale(String),
    /// The whole translation map.
    Translations,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Read,
    Write,
}

/// A routed accessor call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accessor {
    pub field: String,
    pub target: Target,
    pub direction: Direction,
}

impl Accessor {
    fn new(field: &str, target: Target, direction: Direction) -> Self {
        Accessor {
            field: field.to_string(),
            target,
            direction,
        }
    }
}

/// Accessor suffix for a locale code: `pt-BR` becomes `pt_br`.
pub fn locale_suffix(locale: &str) -> String {
    locale.replace('-', "_").to_ascii_lowercase()
}

#[derive(Debug, Clone)]
pub struct AccessorRouter {
    receiver: String,
    table: HashMap<String, Accessor>,
    names: Vec<String>,
    // Every field with whether it accepts arbitrary locale suffixes,
    // longest name first so `meta_title_en` belongs to `meta_title` and
    // never to `meta`.
    prefixes: Vec<(String, bool)>,
}

impl AccessorRouter {
    pub fn new(receiver: &str, fields: &[TranslatableField]) -> Self {
        let mut router = AccessorRouter {
            receiver: receiver.to_string(),
            table: HashMap::new(),
            names: Vec::new(),
            prefixes: Vec::new(),
        };

        for field in fields {
            let name = field.name();
            router.add(name.to_string(), Accessor::new(name, Target::Ambient, Direction::Read));
            router.add(
                format!("{}=", name),
                Accessor::new(name, Target::Ambient, Direction::Write),
            );
            let storage = field.storage_attribute();
            router.add(
                storage.to_string(),
                Accessor::new(name, Target::Translations, Direction::Read),
            );
            router.add(
                format!("{}=", storage),
                Accessor::new(name, Target::Translations, Direction::Write),
            );

            if field.is_restricted() {
                for locale in field.locales() {
                    let method = format!("{}_{}", name, locale_suffix(locale));
                    router.add(
                        method.clone(),
                        Accessor::new(name, Target::Locale(locale.clone()), Direction::Read),
                    );
                    router.add(
                        format!("{}=", method),
                        Accessor::new(name, Target::Locale(locale.clone()), Direction::Write),
                    );
                }
            }
            router
                .prefixes
                .push((name.to_string(), !field.is_restricted()));
        }

        router
            .prefixes
            .sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        router
    }

    fn add(&mut self, method: String, accessor: Accessor) {
        if self.table.insert(method.clone(), accessor).is_none() {
            self.names.push(method);
        }
    }

    /// Every fixed accessor name, in declaration order.
    ///
    /// Fields without a locale restriction also accept `field_<locale>` for
    /// any well-formed locale suffix; those names cannot be listed.
    pub fn accessor_names(&self) -> &[String] {
        &self.names
    }

    pub fn route(&self, method: &str) -> Result<Accessor> {
        self.lookup(method).ok_or_else(|| {
            tracing::trace!(receiver = self.receiver.as_str(), method, "no translated accessor");
            TranslateError::method_not_found(&self.receiver, method)
        })
    }

    pub fn responds_to(&self, method: &str) -> bool {
        self.lookup(method).is_some()
    }

    fn lookup(&self, method: &str) -> Option<Accessor> {
        if let Some(accessor) = self.table.get(method) {
            return Some(accessor.clone());
        }

        let (base, direction) = match method.strip_suffix('=') {
            Some(base) => (base, Direction::Write),
            None => (method, Direction::Read),
        };

        // The longest declared field owns the name. A restricted owner only
        // answers the fixed names already in the table.
        let (field, suffix, open) = self.prefixes.iter().find_map(|(field, open)| {
            let suffix = base.strip_prefix(field.as_str())?.strip_prefix('_')?;
            Some((field, suffix, *open))
        })?;

        if !open || !LOCALE_SUFFIX.is_match(suffix) {
            return None;
        }
        Some(Accessor::new(
            field,
            Target::Locale(suffix.replace('_', "-")),
            direction,
        ))
    }
}
