use crate::store::TranslationStore;

/// Pick the translation to show for `requested`.
///
/// With fallback disabled the stored value for `requested` is returned as is,
/// including an empty string. With fallback enabled each locale of `chain` is
/// tried in order and absent or blank values are skipped. An empty chain
/// means "only the requested locale".
pub fn resolve<'a>(
    store: &'a TranslationStore,
    requested: &str,
    chain: &[String],
    fallback_enabled: bool,
) -> Option<&'a str> {
    if !fallback_enabled {
        return store.get(requested);
    }

    if chain.is_empty() {
        return store.get(requested).filter(|value| !value.is_empty());
    }

    for candidate in chain {
        match store.get(candidate) {
            Some(value) if !value.is_empty() => {
                if !candidate.eq_ignore_ascii_case(requested) {
                    tracing::debug!(
                        requested,
                        fallback = candidate.as_str(),
                        "using translation from fallback locale"
                    );
                }
                return Some(value);
            }
            Some(_) => tracing::trace!(locale = candidate.as_str(), "skipping blank translation"),
            None => {}
        }
    }

    tracing::trace!(
        requested,
        chain = %chain.join(" -> "),
        "no translation in any fallback locale"
    );
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::TranslationMap;

    fn store(pairs: &[(&str, &str)]) -> TranslationStore {
        TranslationStore::from_map(pairs.iter().copied().collect::<TranslationMap>())
    }

    fn chain(locales: &[&str]) -> Vec<String> {
        locales.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn test_disabled_returns_exact_value() {
        let s = store(&[("en", "English Title"), ("fr", "")]);
        let c = chain(&["fr", "en"]);
        assert_eq!(resolve(&s, "fr", &c, false), Some(""));
        assert_eq!(resolve(&s, "de", &c, false), None);
        assert_eq!(resolve(&s, "en", &c, false), Some("English Title"));
    }

    #[test]
    fn test_fallback_walks_chain() {
        let s = store(&[("en", "X")]);
        assert_eq!(resolve(&s, "fr", &chain(&["fr", "en-US", "en"]), true), Some("X"));
    }

    #[test]
    fn test_fallback_skips_blank() {
        let s = store(&[("en", "X"), ("fr", "")]);
        assert_eq!(resolve(&s, "fr", &chain(&["fr", "en"]), true), Some("X"));
    }

    #[test]
    fn test_fallback_prefers_requested() {
        let s = store(&[("en", "English"), ("fr", "Français")]);
        assert_eq!(resolve(&s, "fr", &chain(&["fr", "en"]), true), Some("Français"));
    }

    #[test]
    fn test_exhausted_chain() {
        let s = store(&[("de", "Deutsch"), ("fr", "")]);
        assert_eq!(resolve(&s, "fr", &chain(&["fr", "en"]), true), None);
    }

    #[test]
    fn test_empty_chain_uses_requested_only() {
        let s = store(&[("en", "X"), ("fr", "")]);
        assert_eq!(resolve(&s, "en", &[], true), Some("X"));
        assert_eq!(resolve(&s, "fr", &[], true), None);
        assert_eq!(resolve(&s, "de", &[], true), None);
    }
}
