//! Locale-aware accessors for records that keep all translations of a field
//! in one JSON attribute.
//!
//! A field declared with `translates("title", ..)` is stored as
//! `title_translations`, a map from locale code to text, and read or written
//! through synthesized accessors: `title`, `title_fr`, `title=`,
//! `title_fr=`. Reads walk the fallback chain supplied by a
//! [`LocaleProvider`], skipping blank values, and then interpolate
//! `%{name}` placeholders.
//!
//! ```
//! use json_translate::{Params, Record, Schema, SimpleFallbacks, StaticLocale, TranslatesOptions};
//! use serde_json::json;
//!
//! let schema = Schema::builder("Post")
//!     .translates("title", TranslatesOptions::new())
//!     .build();
//!
//! let mut i18n = StaticLocale::new("fr");
//! i18n.with_fallbacks(SimpleFallbacks::new("en-US"));
//!
//! let post = Record::build(
//!     schema,
//!     &i18n,
//!     &json!({ "title_translations": { "en": "English Title", "fr": "" } }),
//! )
//! .unwrap();
//!
//! assert_eq!(
//!     post.read(&i18n, "title", &Params::new()).unwrap().as_deref(),
//!     Some("English Title")
//! );
//! assert!(post.read(&i18n, "other_fr", &Params::new()).unwrap_err().is_method_not_found());
//! ```

pub mod error;
pub mod fallback;
pub mod interpolate;
pub mod loader;
pub mod locale;
pub mod record;
pub mod repository;
pub mod resolver;
pub mod router;
pub mod schema;
pub mod store;


pub use error::{Result, TranslateError};
pub use fallback::{FallbackScope, FallbackState, FallbackToggle, HasFallbackToggle};
pub use interpolate::{Params, render};
pub use loader::{FieldConfig, SchemaConfig, load_schema_from_file, load_schemas_from_dir};
pub use locale::{LocaleProvider, SimpleFallbacks, StaticLocale, locale_ancestors};
pub use record::Record;
pub use repository::{MemoryRepository, Repository};
pub use resolver::resolve;
pub use router::{Accessor, AccessorRouter, Direction, Target};
pub use schema::{Schema, SchemaBuilder, TranslatableField, TranslatesOptions, TranslationPredicate};
pub use store::{TranslationMap, TranslationStore};
