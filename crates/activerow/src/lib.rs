//! # activerow
//!
//! A small relational-data-access layer: a fluent query builder, a SQL
//! compiler for an ANSI-ish subset, runtime schema introspection, and an
//! active-record row abstraction with dirty tracking and schema-driven field
//! validation.
//!
//! ## Features
//!
//! - **Fluent builder**: chainable where/having/between/nested predicates
//!   with a positional binding list that always matches placeholder order
//! - **Pure compiler**: builder state in, SQL text plus flat bindings out
//! - **Runtime schemas**: tables describe themselves through one
//!   introspection call; columns become typed descriptors
//! - **Minimal writes**: rows track which columns changed and `save()` emits
//!   an UPDATE over exactly those
//! - **Injected execution**: all I/O goes through the [`Executor`] trait —
//!   connections, drivers and retries live outside this crate
//!
//! ## Usage
//!
//! ```ignore
//! use activerow::{OrmConfig, Table};
//!
//! let table = Table::load(&client, "users").await?;
//! let adults = table
//!     .select(["name", "email"])
//!     .where_clause("age", ">", 18)
//!     .order_by("name", "asc")
//!     .limit(20)
//!     .find_all(&client)
//!     .await?;
//!
//! if let Some(mut row) = table.find_by_pk(&client, 7).await? {
//!     row.set("name", "renamed");
//!     row.save(&client).await?; // UPDATE touches only `name`
//! }
//! ```

pub mod config;
pub mod error;
pub mod executor;
pub mod qb;
pub mod row;
pub mod schema;
pub mod table;
pub mod validate;
pub mod value;

pub use config::OrmConfig;
pub use error::{OrmError, OrmResult};
pub use executor::{Executor, Record, WriteOutcome};
pub use qb::{QueryBuilder, QueryCompiler, WriteStatement};
pub use row::Row;
pub use schema::{FieldDescriptor, SchemaCache, TableSchema};
pub use table::Table;
pub use value::{FieldValue, Value};
