//! Translated field declarations for a record type
//!
//! ```
//! use json_translate::schema::{Schema, TranslatesOptions};
//!
//! let schema = Schema::builder("PostDetailed")
//!     .translates("title", TranslatesOptions::new().with_locales(&["en", "fr"]))
//!     .translates("comment", TranslatesOptions::new().with_locales(&["en", "fr"]))
//!     .build();
//!
//! assert!(schema.translates());
//! assert_eq!(
//!     schema.permitted_translated_attributes(),
//!     vec!["title_en", "title_fr", "comment_en", "comment_fr"]
//! );
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, TranslateError};
use crate::locale::LocaleProvider;
use crate::router::{AccessorRouter, TRANSLATIONS_SUFFIX, locale_suffix};

/// Options accepted by a `translates` declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatesOptions {
    /// Fallback policy for this field when the record has no explicit state.
    /// `None` defers to the locale provider.
    pub fallback: Option<bool>,
    /// Locales that get dedicated accessors. Empty means any locale.
    pub locales: Vec<String>,
}

impl TranslatesOptions {
    pub fn new() -> Self {
        TranslatesOptions::default()
    }

    pub fn with_fallback(mut self, enabled: bool) -> Self {
        self.fallback = Some(enabled);
        self
    }

    pub fn with_locales(mut self, locales: &[&str]) -> Self {
        self.locales = locales.iter().map(|l| l.to_string()).collect();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatableField {
    name: String,
    storage_attribute: String,
    locales: Vec<String>,
    fallback: Option<bool>,
}

impl TranslatableField {
    pub fn new(name: &str, options: TranslatesOptions) -> Self {
        let mut locales: Vec<String> = Vec::with_capacity(options.locales.len());
        for locale in options.locales {
            if !locales.iter().any(|l| l.eq_ignore_ascii_case(&locale)) {
                locales.push(locale);
            }
        }

        TranslatableField {
            name: name.to_string(),
            storage_attribute: format!("{}{}", name, TRANSLATIONS_SUFFIX),
            locales,
            fallback: options.fallback,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attribute holding the locale map, e.g. `title_translations`.
    pub fn storage_attribute(&self) -> &str {
        &self.storage_attribute
    }

    pub fn locales(&self) -> &[String] {
        &self.locales
    }

    pub fn fallback(&self) -> Option<bool> {
        self.fallback
    }

    pub fn is_restricted(&self) -> bool {
        !self.locales.is_empty()
    }

    /// Accessor name for one locale: `title` + `pt-BR` gives `title_pt_br`.
    pub fn locale_accessor(&self, locale: &str) -> String {
        format!("{}_{}", self.name, locale_suffix(locale))
    }
}

/// Declarations for one record type.
///
/// Built once and shared between records through an `Arc`. The accessor
/// table derived here is the only source of legal accessor names.
#[derive(Debug)]
pub struct Schema {
    name: String,
    fields: Vec<TranslatableField>,
    router: AccessorRouter,
}

pub struct SchemaBuilder {
    name: String,
    fields: Vec<TranslatableField>,
}

impl SchemaBuilder {
    /// Declare a translated field. Declaring the same field again replaces
    /// the earlier options and keeps its position.
    pub fn translates(mut self, field: &str, options: TranslatesOptions) -> Self {
        let field = TranslatableField::new(field, options);
        match self.fields.iter_mut().find(|f| f.name == field.name) {
            Some(existing) => *existing = field,
            None => self.fields.push(field),
        }
        self
    }

    pub fn build(self) -> Arc<Schema> {
        let router = AccessorRouter::new(&self.name, &self.fields);
        tracing::debug!(
            model = self.name.as_str(),
            fields = self.fields.len(),
            "declared translated fields"
        );
        Arc::new(Schema {
            name: self.name,
            fields: self.fields,
            router,
        })
    }
}

impl Schema {
    pub fn builder(name: &str) -> SchemaBuilder {
        SchemaBuilder {
            name: name.to_string(),
            fields: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the type declares any translated field.
    pub fn translates(&self) -> bool {
        !self.fields.is_empty()
    }

    pub fn fields(&self) -> &[TranslatableField] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&TranslatableField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn translated_attribute_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// `field_locale` for every declared field and locale, fields first, in
    /// declaration order. Fields without a locale list contribute nothing.
    pub fn permitted_translated_attributes(&self) -> Vec<String> {
        self.fields
            .iter()
            .flat_map(|field| field.locales.iter().map(|l| field.locale_accessor(l)))
            .collect()
    }

    pub fn router(&self) -> &AccessorRouter {
        &self.router
    }

    pub fn accessor_names(&self) -> &[String] {
        self.router.accessor_names()
    }

    pub fn responds_to(&self, method: &str) -> bool {
        self.router.responds_to(method)
    }

    /// Filter matching records whose `field` map holds `value` for the
    /// provider's current locale.
    pub fn with_translation(
        &self,
        i18n: &impl LocaleProvider,
        field: &str,
        value: &str,
    ) -> Result<TranslationPredicate> {
        self.with_translation_in(field, value, i18n.current_locale())
    }

    /// Same as [`Schema::with_translation`] with an explicit locale.
    pub fn with_translation_in(
        &self,
        field: &str,
        value: &str,
        locale: &str,
    ) -> Result<TranslationPredicate> {
        let field = self.field(field).ok_or_else(|| {
            TranslateError::method_not_found(&self.name, &format!("with_{}_translation", field))
        })?;
        Ok(TranslationPredicate {
            storage_attribute: field.storage_attribute.clone(),
            locale: locale.to_string(),
            value: value.to_string(),
        })
    }
}

/// "The map in `storage_attribute` has `value` under `locale`."
///
/// The query layer decides how to evaluate it: [`containment`] and [`sql`]
/// target a JSONB `@>` operator, [`matches`] checks a stored row directly.
///
/// [`containment`]: TranslationPredicate::containment
/// [`sql`]: TranslationPredicate::sql
/// [`matches`]: TranslationPredicate::matches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationPredicate {
    storage_attribute: String,
    locale: String,
    value: String,
}

impl TranslationPredicate {
    pub fn storage_attribute(&self) -> &str {
        &self.storage_attribute
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// JSON document the stored map must contain: `{"en": "value"}`.
    pub fn containment(&self) -> Value {
        let mut map = Map::new();
        map.insert(self.locale.clone(), Value::String(self.value.clone()));
        Value::Object(map)
    }

    /// SQL condition with one positional parameter bound to [`Self::bind_value`].
    pub fn sql(&self) -> String {
        format!(
            "\"{}\" @> $1::jsonb",
            self.storage_attribute.replace('"', "\"\"")
        )
    }

    pub fn bind_value(&self) -> String {
        self.containment().to_string()
    }

    /// Evaluate against a stored row (a JSON object of attributes).
    pub fn matches(&self, row: &Value) -> bool {
        row.get(&self.storage_attribute)
            .and_then(Value::as_object)
            .is_some_and(|map| {
                map.iter().any(|(locale, text)| {
                    locale.eq_ignore_ascii_case(&self.locale)
                        && text.as_str() == Some(self.value.as_str())
                })
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::StaticLocale;
    use serde_json::json;

    fn post_detailed() -> Arc<Schema> {
        Schema::builder("PostDetailed")
            .translates("title", TranslatesOptions::new().with_locales(&["en", "fr"]))
            .translates("comment", TranslatesOptions::new().with_locales(&["en", "fr"]))
            .build()
    }

    #[test]
    fn test_translates() {
        assert!(post_detailed().translates());
        assert!(!Schema::builder("Plain").build().translates());
    }

    #[test]
    fn test_permitted_translated_attributes() {
        assert_eq!(
            post_detailed().permitted_translated_attributes(),
            vec!["title_en", "title_fr", "comment_en", "comment_fr"]
        );
    }

    #[test]
    fn test_permitted_attributes_skip_open_fields() {
        let schema = Schema::builder("Post")
            .translates("title", TranslatesOptions::new())
            .translates("body", TranslatesOptions::new().with_locales(&["zh-Hant", "en"]))
            .build();
        assert_eq!(
            schema.permitted_translated_attributes(),
            vec!["body_zh_hant", "body_en"]
        );
        assert_eq!(schema.translated_attribute_names(), vec!["title", "body"]);
    }

    #[test]
    fn test_redeclaring_replaces_options() {
        let schema = Schema::builder("Post")
            .translates("title", TranslatesOptions::new().with_locales(&["en"]))
            .translates("comment", TranslatesOptions::new())
            .translates("title", TranslatesOptions::new().with_fallback(false))
            .build();
        assert_eq!(schema.translated_attribute_names(), vec!["title", "comment"]);
        let title = schema.field("title").unwrap();
        assert!(!title.is_restricted());
        assert_eq!(title.fallback(), Some(false));
    }

    #[test]
    fn test_duplicate_locales_are_dropped() {
        let field = TranslatableField::new(
            "title",
            TranslatesOptions::new().with_locales(&["en", "EN", "fr"]),
        );
        assert_eq!(field.locales(), ["en", "fr"]);
        assert_eq!(field.storage_attribute(), "title_translations");
    }

    #[test]
    fn test_with_translation_uses_current_locale() {
        let schema = post_detailed();
        let i18n = StaticLocale::new("en");
        let predicate = schema
            .with_translation(&i18n, "title", "Alice in Wonderland")
            .unwrap();

        assert_eq!(predicate.locale(), "en");
        assert_eq!(predicate.containment(), json!({"en": "Alice in Wonderland"}));
        assert_eq!(predicate.sql(), r#""title_translations" @> $1::jsonb"#);
        assert_eq!(predicate.bind_value(), r#"{"en":"Alice in Wonderland"}"#);

        assert!(predicate.matches(&json!({
            "title_translations": {"en": "Alice in Wonderland", "fr": "Alice au pays des merveilles"}
        })));
        assert!(!predicate.matches(&json!({
            "title_translations": {"fr": "Alice in Wonderland"}
        })));
        assert!(!predicate.matches(&json!({"comment_translations": {"en": "Alice in Wonderland"}})));
    }

    #[test]
    fn test_with_translation_unknown_field() {
        let err = post_detailed()
            .with_translation_in("other", "x", "en")
            .unwrap_err();
        assert!(err.is_method_not_found());
    }

    #[test]
    fn test_options_deserialize() {
        let options: TranslatesOptions =
            serde_json::from_str(r#"{"fallback": false, "locales": ["en", "fr"]}"#).unwrap();
        assert_eq!(
            options,
            TranslatesOptions::new().with_fallback(false).with_locales(&["en", "fr"])
        );
        let options: TranslatesOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, TranslatesOptions::new());
    }
}
