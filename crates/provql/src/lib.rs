//! Filter-string grammar and query-predicate translation for provenance
//! stores.
//!
//! This crate implements the small domain-specific language API clients use
//! to express query predicates as a single string, e.g.
//! `node_type ILIKE '%Calc%' & mtime >= 2018-02-01`, and translates it into
//! the filter mapping the backing query builder consumes.
//!
//! The pipeline is pure and synchronous: each call is a function of its
//! input string, holds no shared state and performs no I/O, so it is safe
//! to invoke concurrently without locking.
//!
//! # Example
//!
//! ```
//! use provql_rs::filter::translate_filter;
//! use provql_rs::schema::{EntityKind, FieldSet};
//!
//! let fields = FieldSet::for_entity(EntityKind::Node);
//! let map = translate_filter("node_type ILIKE '%Calc%' & mtime >= 2018-02-01", Some(&fields))
//!     .unwrap();
//! assert_eq!(map.len(), 2);
//! ```

pub mod config;
pub mod filter;
pub mod registry;
pub mod schema;

pub use config::{ApiConfig, ConfigError};
pub use filter::{
    parse_filter, translate_filter, FilterError, FilterParser, PredicateMap, FILTER_GRAMMAR,
};
pub use registry::{PluginError, PluginRegistry, RegistryError, Resolver};
pub use schema::{EntityKind, FieldSet};
