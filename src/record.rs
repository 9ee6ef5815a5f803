//! Records with translated fields
//!
//! A [`Record`] holds one [`TranslationStore`] per field declared on its
//! [`Schema`] and answers the synthesized accessors listed in
//! [`crate::router`]. Every call that depends on the ambient locale takes a
//! [`LocaleProvider`].
//!
//! ```
//! use json_translate::{Params, Record, Schema, SimpleFallbacks, StaticLocale, TranslatesOptions};
//! use serde_json::json;
//!
//! let schema = Schema::builder("Post")
//!     .translates("title", TranslatesOptions::new())
//!     .build();
//! let mut i18n = StaticLocale::new("fr");
//! i18n.with_fallbacks(SimpleFallbacks::new("en"));
//!
//! let mut post = Record::new(schema);
//! post.write(&i18n, "title_en=", json!("Alice in %{where}")).unwrap();
//!
//! let params = Params::new().with("where", "Wonderland");
//! assert_eq!(
//!     post.read(&i18n, "title", &params).unwrap().as_deref(),
//!     Some("Alice in Wonderland")
//! );
//! ```

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::{Result, TranslateError, json_kind};
use crate::fallback::{FallbackState, FallbackToggle, HasFallbackToggle};
use crate::interpolate::{Params, render};
use crate::locale::LocaleProvider;
use crate::repository::Repository;
use crate::resolver::resolve;
use crate::router::{Accessor, Direction, Target};
use crate::schema::{Schema, TranslatableField, TranslationPredicate};
use crate::store::{TranslationMap, TranslationStore};

#[derive(Debug, Clone)]
pub struct Record {
    schema: Arc<Schema>,
    id: Option<u64>,
    // Parallel to `schema.fields()`.
    stores: Vec<TranslationStore>,
    fallback: FallbackToggle,
}

impl Record {
    pub fn new(schema: Arc<Schema>) -> Self {
        let stores = vec![TranslationStore::new(); schema.fields().len()];
        Record {
            schema,
            id: None,
            stores,
            fallback: FallbackToggle::new(),
        }
    }

    /// New unsaved record with `attributes` assigned through the setters.
    pub fn build(
        schema: Arc<Schema>,
        i18n: &impl LocaleProvider,
        attributes: &Value,
    ) -> Result<Self> {
        let mut record = Record::new(schema);
        record.assign_attributes(i18n, attributes)?;
        Ok(record)
    }

    /// Build and save in one step.
    pub fn create(
        schema: Arc<Schema>,
        i18n: &impl LocaleProvider,
        attributes: &Value,
        repo: &mut impl Repository,
    ) -> Result<Self> {
        let mut record = Record::build(schema, i18n, attributes)?;
        record.save(repo)?;
        Ok(record)
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn id(&self) -> Option<u64> {
        self.id
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    fn field_index(&self, field: &str) -> Result<usize> {
        self.schema
            .fields()
            .iter()
            .position(|f| f.name() == field)
            .ok_or_else(|| TranslateError::method_not_found(self.schema.name(), field))
    }

    fn field_at(&self, index: usize) -> &TranslatableField {
        &self.schema.fields()[index]
    }

    pub fn responds_to(&self, method: &str) -> bool {
        self.schema.responds_to(method)
    }

    // ---------------------------------------------------------------
    // Dynamic accessors
    // ---------------------------------------------------------------

    /// Call a getter by name.
    ///
    /// Text accessors return a JSON string or `null`, `*_translations`
    /// returns the map as an object. Setter names (ending in `=`) are not
    /// getters and fail like any unknown name.
    pub fn call(&self, i18n: &impl LocaleProvider, method: &str, params: &Params) -> Result<Value> {
        let accessor = self.schema.router().route(method)?;
        if accessor.direction != Direction::Read {
            return Err(TranslateError::method_not_found(self.schema.name(), method));
        }

        let Accessor { field, target, .. } = accessor;
        match target {
            Target::Ambient => Ok(self.translate(i18n, &field, None, params)?.into()),
            Target::Locale(locale) => {
                Ok(self.translate(i18n, &field, Some(&locale), params)?.into())
            }
            Target::Translations => Ok(self.translations(&field)?.to_json()),
        }
    }

    /// Call a text getter by name.
    pub fn read(
        &self,
        i18n: &impl LocaleProvider,
        method: &str,
        params: &Params,
    ) -> Result<Option<String>> {
        match self.call(i18n, method, params)? {
            Value::String(text) => Ok(Some(text)),
            Value::Null => Ok(None),
            other => Err(TranslateError::TypeMismatch {
                attribute: method.to_string(),
                expected: "string",
                found: json_kind(&other),
            }),
        }
    }

    /// Call a setter by name, e.g. `title_fr=`.
    ///
    /// Locale setters take a string, or `null` to delete the translation.
    /// The bare `title=` setter also accepts an object of strings, which
    /// replaces the whole map, as does `title_translations=`.
    pub fn write(&mut self, i18n: &impl LocaleProvider, method: &str, value: Value) -> Result<()> {
        let accessor = self.schema.router().route(method)?;
        if accessor.direction != Direction::Write {
            return Err(TranslateError::method_not_found(self.schema.name(), method));
        }

        let index = self.field_index(&accessor.field)?;
        match (accessor.target, value) {
            (Target::Translations, Value::Null) => {
                self.stores[index].replace(TranslationMap::new());
            }
            (Target::Translations | Target::Ambient, value @ Value::Object(_)) => {
                let storage = self.field_at(index).storage_attribute().to_string();
                let map = TranslationMap::from_json(&storage, &value)?;
                self.stores[index].replace(map);
            }
            (Target::Translations, other) => {
                return Err(TranslateError::TypeMismatch {
                    attribute: method.to_string(),
                    expected: "object of strings",
                    found: json_kind(&other),
                });
            }
            (Target::Ambient, value) => {
                let locale = i18n.current_locale().to_string();
                self.write_locale(index, method, &locale, value)?;
            }
            (Target::Locale(locale), value) => {
                self.write_locale(index, method, &locale, value)?;
            }
        }
        Ok(())
    }

    fn write_locale(&mut self, index: usize, method: &str, locale: &str, value: Value) -> Result<()> {
        match value {
            Value::String(text) => self.stores[index].set(locale, &text),
            Value::Null => self.stores[index].remove(locale),
            other => {
                return Err(TranslateError::TypeMismatch {
                    attribute: method.to_string(),
                    expected: "string",
                    found: json_kind(&other),
                });
            }
        }
        Ok(())
    }

    /// Mass assignment: each key of `attributes` names a setter without its
    /// trailing `=`. Whole-map keys (`title_translations`) are applied
    /// before per-locale keys so the latter refine the former.
    ///
    /// The assignment is all or nothing: if any value is rejected the
    /// translations are left as they were before the call.
    pub fn assign_attributes(&mut self, i18n: &impl LocaleProvider, attributes: &Value) -> Result<()> {
        let object = attributes
            .as_object()
            .ok_or_else(|| TranslateError::TypeMismatch {
                attribute: self.schema.name().to_string(),
                expected: "object",
                found: json_kind(attributes),
            })?;

        let mut calls = Vec::with_capacity(object.len());
        for (name, value) in object {
            let method = format!("{}=", name);
            let accessor = self.schema.router().route(&method)?;
            calls.push((accessor.target == Target::Translations, method, value));
        }
        calls.sort_by_key(|(whole_map, _, _)| !*whole_map);

        let snapshot = self.stores.clone();
        for (_, method, value) in calls {
            if let Err(err) = self.write(i18n, &method, value.clone()) {
                self.stores = snapshot;
                return Err(err);
            }
        }
        Ok(())
    }

    // ---------------------------------------------------------------
    // Typed accessors
    // ---------------------------------------------------------------

    /// Resolve `field` in `locale` (or the current locale), walking the
    /// fallback chain when fallback is in effect, then interpolate `params`.
    pub fn translate(
        &self,
        i18n: &impl LocaleProvider,
        field: &str,
        locale: Option<&str>,
        params: &Params,
    ) -> Result<Option<String>> {
        let index = self.field_index(field)?;
        let locale = locale.unwrap_or_else(|| i18n.current_locale());
        let enabled = self.effective_fallback(i18n, index);
        let chain = if enabled {
            i18n.fallback_chain(locale).unwrap_or_default()
        } else {
            Vec::new()
        };

        Ok(resolve(&self.stores[index], locale, &chain, enabled).map(|text| render(text, params)))
    }

    /// Store `value` for `field` in `locale` (or the current locale).
    pub fn set_translation(
        &mut self,
        i18n: &impl LocaleProvider,
        field: &str,
        locale: Option<&str>,
        value: &str,
    ) -> Result<()> {
        let index = self.field_index(field)?;
        let locale = locale.unwrap_or_else(|| i18n.current_locale());
        self.stores[index].set(locale, value);
        Ok(())
    }

    pub fn translations(&self, field: &str) -> Result<&TranslationMap> {
        let index = self.field_index(field)?;
        Ok(self.stores[index].map())
    }

    pub fn set_translations(&mut self, field: &str, map: TranslationMap) -> Result<()> {
        let index = self.field_index(field)?;
        self.stores[index].replace(map);
        Ok(())
    }

    // ---------------------------------------------------------------
    // Fallback switch
    // ---------------------------------------------------------------

    pub fn enable_fallback(&mut self) {
        self.fallback.enable();
    }

    pub fn disable_fallback(&mut self) {
        self.fallback.disable();
    }

    pub fn fallback_state(&self) -> FallbackState {
        self.fallback.state()
    }

    /// Whether reads of `field` currently use the fallback chain.
    pub fn fallback_enabled(&self, i18n: &impl LocaleProvider, field: &str) -> Result<bool> {
        let index = self.field_index(field)?;
        Ok(self.effective_fallback(i18n, index))
    }

    fn effective_fallback(&self, i18n: &impl LocaleProvider, index: usize) -> bool {
        let policy = self
            .field_at(index)
            .fallback()
            .unwrap_or_else(|| i18n.fallback_default());
        self.fallback.is_enabled(policy)
    }

    // ---------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------

    pub fn is_changed(&self) -> bool {
        self.stores.iter().any(TranslationStore::is_changed)
    }

    /// Storage attributes modified since the last save or reload.
    pub fn changed_attributes(&self) -> Vec<&str> {
        self.schema
            .fields()
            .iter()
            .zip(&self.stores)
            .filter(|(_, store)| store.is_changed())
            .map(|(field, _)| field.storage_attribute())
            .collect()
    }

    /// Attributes as stored: `{"title_translations": {...}, ...}`.
    pub fn to_row(&self) -> Value {
        self.row_of(|_| true)
    }

    fn row_of(&self, include: impl Fn(&TranslationStore) -> bool) -> Value {
        let mut row = Map::new();
        for (field, store) in self.schema.fields().iter().zip(&self.stores) {
            if include(store) {
                row.insert(field.storage_attribute().to_string(), store.map().to_json());
            }
        }
        Value::Object(row)
    }

    /// Replace every store with the maps found in `row`. Missing or `null`
    /// attributes load as empty maps.
    pub fn load_row(&mut self, row: &Value) -> Result<()> {
        let mut stores = Vec::with_capacity(self.stores.len());
        for field in self.schema.fields() {
            let map = match row.get(field.storage_attribute()) {
                None | Some(Value::Null) => TranslationMap::new(),
                Some(value) => TranslationMap::from_json(field.storage_attribute(), value)?,
            };
            stores.push(TranslationStore::from_map(map));
        }
        self.stores = stores;
        Ok(())
    }

    /// Insert a new record or write the changed attributes of a saved one.
    pub fn save(&mut self, repo: &mut impl Repository) -> Result<u64> {
        let id = match self.id {
            None => {
                let id = repo.insert(self.schema.name(), self.to_row())?;
                self.id = Some(id);
                id
            }
            Some(id) => {
                if self.is_changed() {
                    repo.update(self.schema.name(), id, self.row_of(TranslationStore::is_changed))?;
                }
                id
            }
        };

        for store in &mut self.stores {
            store.clear_changes();
        }
        Ok(id)
    }

    /// Discard local state and read the saved row again.
    pub fn reload(&mut self, repo: &impl Repository) -> Result<()> {
        let id = self.id.ok_or_else(|| TranslateError::NotPersisted {
            model: self.schema.name().to_string(),
        })?;
        let row = repo.find(self.schema.name(), id)?;
        self.load_row(&row)
    }

    pub fn find(schema: Arc<Schema>, repo: &impl Repository, id: u64) -> Result<Self> {
        let row = repo.find(schema.name(), id)?;
        Record::from_row(schema, id, &row)
    }

    /// The most recently inserted record, if any.
    pub fn last(schema: Arc<Schema>, repo: &impl Repository) -> Result<Option<Self>> {
        match repo.last(schema.name())? {
            Some((id, row)) => Ok(Some(Record::from_row(schema, id, &row)?)),
            None => Ok(None),
        }
    }

    /// Records matching `predicate`, in id order.
    pub fn filter(
        schema: Arc<Schema>,
        repo: &impl Repository,
        predicate: &TranslationPredicate,
    ) -> Result<Vec<Self>> {
        repo.filter(schema.name(), predicate)?
            .into_iter()
            .map(|(id, row)| Record::from_row(Arc::clone(&schema), id, &row))
            .collect()
    }

    fn from_row(schema: Arc<Schema>, id: u64, row: &Value) -> Result<Self> {
        let mut record = Record::new(schema);
        record.load_row(row)?;
        record.id = Some(id);
        Ok(record)
    }
}

impl HasFallbackToggle for Record {
    fn fallback_toggle(&self) -> &FallbackToggle {
        &self.fallback
    }

    fn fallback_toggle_mut(&mut self) -> &mut FallbackToggle {
        &mut self.fallback
    }
}
