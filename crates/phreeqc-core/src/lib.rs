//! # phreeqc-core
//!
//! Variant values and live selected-output indexing for the **PHREEQC**
//! geochemical engine.
//!
//! PHREEQC reports results through a "selected output" grid whose cells are
//! tagged scalars (empty, error code, integer, float or string). This crate
//! models one such scalar as [`Var`] and puts a NumPy-style indexer,
//! [`Phreeqc`], over the grid: integer and slice keys on each axis, with the
//! grid's shape queried from the engine on every access.
//!
//! ## Quick start
//!
//! ```rust
//! use phreeqc_core::{MemoryEngine, Phreeqc, Selection, Var};
//!
//! let headings = ["cb", "H", "O", "Ca", "Cl", "K", "N", "Na"];
//! let table = Phreeqc::new(MemoryEngine::from_rows(vec![
//!     headings.iter().map(|h| Var::from(*h)).collect(),
//! ]));
//!
//! assert_eq!(table.shape().unwrap(), (1, 8));
//! assert_eq!(table.get((0, 0)).unwrap(), Selection::Scalar("cb".into()));
//! assert_eq!(
//!     table.get((0, 5..)).unwrap(),
//!     Selection::List(vec!["K".into(), "N".into(), "Na".into()])
//! );
//! ```
//!
//! ## Modules
//!
//! - [`var`] — `Var`, its kinds, `VResult` codes and the C `VAR` layout
//! - [`index`] — `Slice`, `AxisKey` and `TableIndex` keys
//! - [`engine`] — the `Engine` trait every backend implements
//! - [`memory`] — an in-memory engine for offline tables and tests
//! - [`table`] — the `Phreeqc` accessor and its `Selection` results
//! - [`config`] — database file resolution
//! - [`error`] — error types
//! - `ffi` — the IPhreeqc C library engine (feature `iphreeqc`)

pub mod config;
pub mod engine;
pub mod error;
#[cfg(feature = "iphreeqc")]
pub mod ffi;
pub mod index;
pub mod memory;
pub mod table;
pub mod var;

pub use config::DatabaseConfig;
pub use engine::Engine;
pub use error::{Axis, PhreeqcError};
#[cfg(feature = "iphreeqc")]
pub use ffi::IPhreeqc;
pub use index::{AxisKey, Slice, TableIndex};
pub use memory::MemoryEngine;
pub use table::{Phreeqc, Selection};
pub use var::{RawVar, VResult, Var, VarKind};
