use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, TranslateError, json_kind};

/// Translations of one field, keyed by locale code.
///
/// Keys compare ASCII case-insensitively, so `"en-US"` and `"en-us"` address
/// the same entry. The spelling used by the first write is kept. An empty
/// string is a stored value; only a missing key means "not translated".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TranslationMap(BTreeMap<String, String>);

impl TranslationMap {
    pub fn new() -> Self {
        TranslationMap(BTreeMap::new())
    }

    pub fn with_translation(mut self, locale: &str, value: &str) -> Self {
        self.insert(locale, value);
        self
    }

    fn key_for(&self, locale: &str) -> Option<&String> {
        if let Some((key, _)) = self.0.get_key_value(locale) {
            return Some(key);
        }
        self.0.keys().find(|key| key.eq_ignore_ascii_case(locale))
    }

    pub fn get(&self, locale: &str) -> Option<&str> {
        self.key_for(locale)
            .and_then(|key| self.0.get(key))
            .map(String::as_str)
    }

    pub fn contains_locale(&self, locale: &str) -> bool {
        self.key_for(locale).is_some()
    }

    /// Insert or overwrite; returns the previous value for the locale.
    pub fn insert(&mut self, locale: &str, value: &str) -> Option<String> {
        let key = self
            .key_for(locale)
            .cloned()
            .unwrap_or_else(|| locale.to_string());
        self.0.insert(key, value.to_string())
    }

    pub fn remove(&mut self, locale: &str) -> Option<String> {
        let key = self.key_for(locale).cloned()?;
        self.0.remove(&key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Build a map from a JSON value, rejecting anything that is not an
    /// object of strings. Nothing is coerced.
    pub fn from_json(attribute: &str, value: &Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| TranslateError::TypeMismatch {
            attribute: attribute.to_string(),
            expected: "object of strings",
            found: json_kind(value),
        })?;

        let mut map = TranslationMap::new();
        for (locale, translation) in object {
            let text = translation
                .as_str()
                .ok_or_else(|| TranslateError::TypeMismatch {
                    attribute: format!("{}.{}", attribute, locale),
                    expected: "string",
                    found: json_kind(translation),
                })?;
            map.insert(locale, text);
        }
        Ok(map)
    }

    pub fn to_json(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect(),
        )
    }
}

impl<K: AsRef<str>, V: AsRef<str>> FromIterator<(K, V)> for TranslationMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = TranslationMap::new();
        for (locale, value) in iter {
            map.insert(locale.as_ref(), value.as_ref());
        }
        map
    }
}

/// Backing storage for one translatable field of one record.
///
/// Tracks whether its map changed since the last `clear_changes`, which the
/// persistence layer uses to decide what to write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationStore {
    map: TranslationMap,
    changed: bool,
}

impl TranslationStore {
    pub fn new() -> Self {
        TranslationStore::default()
    }

    pub fn from_map(map: TranslationMap) -> Self {
        TranslationStore {
            map,
            changed: false,
        }
    }

    pub fn get(&self, locale: &str) -> Option<&str> {
        self.map.get(locale)
    }

    pub fn set(&mut self, locale: &str, value: &str) {
        if self.map.insert(locale, value).as_deref() != Some(value) {
            self.changed = true;
        }
    }

    pub fn remove(&mut self, locale: &str) {
        if self.map.remove(locale).is_some() {
            self.changed = true;
        }
    }

    pub fn map(&self) -> &TranslationMap {
        &self.map
    }

    pub fn replace(&mut self, map: TranslationMap) {
        if self.map != map {
            self.map = map;
            self.changed = true;
        }
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub fn clear_changes(&mut self) {
        self.changed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_case_insensitive_keys() {
        let mut map = TranslationMap::new().with_translation("en-US", "Color");
        assert_eq!(map.get("en-us"), Some("Color"));

        map.insert("EN-us", "Colour");
        assert_eq!(map.len(), 1);
        assert_eq!(map.locales().collect::<Vec<_>>(), vec!["en-US"]);
        assert_eq!(map.get("en-US"), Some("Colour"));
    }

    #[test]
    fn test_blank_is_present() {
        let map = TranslationMap::new().with_translation("fr", "");
        assert!(map.contains_locale("fr"));
        assert_eq!(map.get("fr"), Some(""));
        assert_eq!(map.get("de"), None);
    }

    #[test]
    fn test_remove_deletes_key() {
        let mut store = TranslationStore::from_map(
            TranslationMap::new()
                .with_translation("en", "Title")
                .with_translation("fr", "Titre"),
        );
        store.remove("fr");
        assert!(!store.map().contains_locale("fr"));
        assert!(store.is_changed());
    }

    #[test]
    fn test_set_marks_changed_only_on_difference() {
        let mut store =
            TranslationStore::from_map(TranslationMap::new().with_translation("en", "Title"));
        store.set("en", "Title");
        assert!(!store.is_changed());

        store.set("fr", "Titre");
        assert!(store.is_changed());
        store.clear_changes();

        store.replace(store.map().clone());
        assert!(!store.is_changed());
        store.replace(TranslationMap::new());
        assert!(store.is_changed());
        assert!(store.map().is_empty());
    }

    #[test]
    fn test_from_json() {
        let map =
            TranslationMap::from_json("title_translations", &json!({"en": "A", "fr": "B"})).unwrap();
        assert_eq!(map.get("fr"), Some("B"));
        assert_eq!(map.to_json(), json!({"en": "A", "fr": "B"}));

        let err = TranslationMap::from_json("title_translations", &json!("A")).unwrap_err();
        assert!(matches!(
            err,
            TranslateError::TypeMismatch { found: "string", .. }
        ));

        let err =
            TranslationMap::from_json("title_translations", &json!({"en": 1})).unwrap_err();
        assert!(matches!(
            err,
            TranslateError::TypeMismatch { expected: "string", found: "number", .. }
        ));
    }

    #[test]
    fn test_serde_is_plain_object() {
        let map: TranslationMap = [("en", "English Title"), ("fr", "Titre français")]
            .into_iter()
            .collect();
        let text = serde_json::to_string(&map).unwrap();
        assert_eq!(text, r#"{"en":"English Title","fr":"Titre français"}"#);
        let back: TranslationMap = serde_json::from_str(&text).unwrap();
        assert_eq!(back, map);
    }
}
