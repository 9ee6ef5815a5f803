//! Ambient locale collaborators
//!
//! The resolution engine never looks up a global locale. Every read receives
//! a [`LocaleProvider`] that answers three questions: which locale is current,
//! which chain of locales to try for a given locale, and whether fallback is
//! on when nothing more specific says otherwise.
//!
//! [`StaticLocale`] is a plain in-memory provider. Its optional
//! [`SimpleFallbacks`] backend builds chains the way Rails' I18n fallbacks do:
//! the requested locale and its parents, then any explicit mapping, then the
//! default locale and its parents.

use std::collections::HashMap;

use icu_locale::Locale;

pub trait LocaleProvider {
    /// The locale used by accessors without a locale suffix.
    fn current_locale(&self) -> &str;

    /// Ordered locales to try for `locale`, starting with `locale` itself.
    ///
    /// `None` means no fallback backend is installed; readers then only
    /// consider the requested locale.
    fn fallback_chain(&self, locale: &str) -> Option<Vec<String>>;

    /// Policy used when neither the record nor the field decides.
    fn fallback_default(&self) -> bool {
        true
    }
}

impl<T: LocaleProvider + ?Sized> LocaleProvider for &T {
    fn current_locale(&self) -> &str {
        (**self).current_locale()
    }

    fn fallback_chain(&self, locale: &str) -> Option<Vec<String>> {
        (**self).fallback_chain(locale)
    }

    fn fallback_default(&self) -> bool {
        (**self).fallback_default()
    }
}

/// `locale` followed by its less specific parents.
///
/// `zh-Hant-TW` yields `[zh-Hant-TW, zh-Hant, zh]`, `en-US` yields
/// `[en-US, en]`. Tags ICU cannot parse are truncated at `-` boundaries.
pub fn locale_ancestors(locale: &str) -> Vec<String> {
    let mut chain = vec![locale.to_string()];

    match locale.parse::<Locale>() {
        Ok(parsed) => {
            let id = &parsed.id;
            let language = id.language.as_str();
            if let (Some(script), Some(_)) = (id.script, id.region) {
                push_unique(&mut chain, &format!("{}-{}", language, script.as_str()));
            }
            push_unique(&mut chain, language);
        }
        Err(_) => {
            let mut rest = locale;
            while let Some(index) = rest.rfind(['-', '_']) {
                rest = &rest[..index];
                if !rest.is_empty() {
                    push_unique(&mut chain, rest);
                }
            }
        }
    }

    chain
}

fn push_unique(chain: &mut Vec<String>, locale: &str) {
    if !chain.iter().any(|l| l.eq_ignore_ascii_case(locale)) {
        chain.push(locale.to_string());
    }
}

/// Fallback chain backend keyed on a default locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleFallbacks {
    defaults: Vec<String>,
    mappings: HashMap<String, Vec<String>>,
}

impl SimpleFallbacks {
    pub fn new(default_locale: &str) -> Self {
        SimpleFallbacks {
            defaults: vec![default_locale.to_string()],
            mappings: HashMap::new(),
        }
    }

    /// Replace the locales appended to every chain.
    pub fn with_defaults(&mut self, defaults: &[&str]) -> &mut Self {
        self.defaults = defaults.iter().map(|d| d.to_string()).collect();
        self
    }

    /// Try `fallbacks` right after `locale` (and before the defaults).
    pub fn with_mapping(&mut self, locale: &str, fallbacks: &[&str]) -> &mut Self {
        self.mappings.insert(
            locale.to_ascii_lowercase(),
            fallbacks.iter().map(|f| f.to_string()).collect(),
        );
        self
    }

    pub fn chain(&self, locale: &str) -> Vec<String> {
        let mut chain = Vec::new();

        for tag in locale_ancestors(locale) {
            push_unique(&mut chain, &tag);
            if let Some(mapped) = self.mappings.get(&tag.to_ascii_lowercase()) {
                for fallback in mapped {
                    for ancestor in locale_ancestors(fallback) {
                        push_unique(&mut chain, &ancestor);
                    }
                }
            }
        }

        for default in &self.defaults {
            for ancestor in locale_ancestors(default) {
                push_unique(&mut chain, &ancestor);
            }
        }

        chain
    }
}

/// In-memory ambient locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticLocale {
    locale: String,
    fallbacks: Option<SimpleFallbacks>,
    fallback_default: bool,
}

impl StaticLocale {
    pub fn new(locale: &str) -> Self {
        StaticLocale {
            locale: locale.to_string(),
            fallbacks: None,
            fallback_default: true,
        }
    }

    pub fn with_locale(&mut self, locale: &str) -> &mut Self {
        self.locale = locale.to_string();
        self
    }

    pub fn with_fallbacks(&mut self, fallbacks: SimpleFallbacks) -> &mut Self {
        self.fallbacks = Some(fallbacks);
        self
    }

    pub fn without_fallbacks(&mut self) -> &mut Self {
        self.fallbacks = None;
        self
    }

    pub fn with_fallback_default(&mut self, enabled: bool) -> &mut Self {
        self.fallback_default = enabled;
        self
    }

    pub fn fallbacks(&self) -> Option<&SimpleFallbacks> {
        self.fallbacks.as_ref()
    }
}

impl Default for StaticLocale {
    fn default() -> Self {
        StaticLocale::new("en")
    }
}

impl LocaleProvider for StaticLocale {
    fn current_locale(&self) -> &str {
        &self.locale
    }

    fn fallback_chain(&self, locale: &str) -> Option<Vec<String>> {
        self.fallbacks.as_ref().map(|f| f.chain(locale))
    }

    fn fallback_default(&self) -> bool {
        self.fallback_default
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locale_ancestors() {
        assert_eq!(locale_ancestors("fr"), vec!["fr"]);
        assert_eq!(locale_ancestors("en-US"), vec!["en-US", "en"]);
        assert_eq!(
            locale_ancestors("zh-Hant-TW"),
            vec!["zh-Hant-TW", "zh-Hant", "zh"]
        );
    }

    #[test]
    fn test_locale_ancestors_unparseable() {
        assert_eq!(
            locale_ancestors("not a-locale"),
            vec!["not a-locale", "not a"]
        );
    }

    #[test]
    fn test_chain_appends_default_locale() {
        let fallbacks = SimpleFallbacks::new("en-US");
        assert_eq!(fallbacks.chain("fr"), vec!["fr", "en-US", "en"]);
        assert_eq!(fallbacks.chain("en"), vec!["en", "en-US"]);
        assert_eq!(fallbacks.chain("de-AT"), vec!["de-AT", "de", "en-US", "en"]);
    }

    #[test]
    fn test_chain_with_mapping() {
        let mut fallbacks = SimpleFallbacks::new("en");
        fallbacks.with_mapping("ca", &["es-ES"]);
        assert_eq!(fallbacks.chain("ca"), vec!["ca", "es-ES", "es", "en"]);
    }

    #[test]
    fn test_static_locale() {
        let mut i18n = StaticLocale::new("en");
        assert_eq!(i18n.current_locale(), "en");
        assert_eq!(i18n.fallback_chain("fr"), None);
        assert!(i18n.fallback_default());

        i18n.with_locale("fr")
            .with_fallbacks(SimpleFallbacks::new("en-US"))
            .with_fallback_default(false);
        assert_eq!(i18n.current_locale(), "fr");
        assert_eq!(
            i18n.fallback_chain("fr"),
            Some(vec!["fr".to_string(), "en-US".to_string(), "en".to_string()])
        );
        assert!(!i18n.fallback_default());
    }
}
