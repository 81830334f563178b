//! The selected-output accessor.
//!
//! [`Phreeqc`] owns an [`Engine`] and one reusable [`Var`] buffer. Indexing
//! resolves each axis key against the table shape queried at that moment,
//! asks the engine to fill the buffer for every addressed cell, and reduces
//! the collected values by how many positions each axis produced:
//!
//! | row key | column key | result |
//! |---------|------------|--------|
//! | int     | int        | [`Selection::Scalar`] |
//! | int     | slice      | [`Selection::List`] |
//! | slice   | int        | [`Selection::List`] |
//! | slice   | slice      | [`Selection::Table`] (row-major) |
//!
//! A slice that happens to select exactly one position reduces like an
//! integer key.

use std::path::Path;
use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use tracing::{debug, trace};

use crate::config::DatabaseConfig;
use crate::engine::Engine;
use crate::error::Result;
use crate::index::TableIndex;
use crate::var::Var;

/// The result of indexing a table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Selection {
    Scalar(Var),
    List(Vec<Var>),
    Table(Vec<Vec<Var>>),
}

impl Selection {
    /// Reduce per-row cell values by the number of row and column positions.
    fn reduce(mut rows: Vec<Vec<Var>>, columns: usize) -> Selection {
        if rows.len() == 1 {
            let row = rows.pop().unwrap_or_default();
            return Self::reduce_row(row, columns);
        }
        if columns == 1 {
            Selection::List(rows.into_iter().flatten().collect())
        } else {
            Selection::Table(rows)
        }
    }

    fn reduce_row(mut row: Vec<Var>, columns: usize) -> Selection {
        if columns == 1 {
            Selection::Scalar(row.pop().unwrap_or_default())
        } else {
            Selection::List(row)
        }
    }

    pub fn as_scalar(&self) -> Option<&Var> {
        match self {
            Selection::Scalar(var) => Some(var),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Var]> {
        match self {
            Selection::List(vars) => Some(vars),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&[Vec<Var>]> {
        match self {
            Selection::Table(rows) => Some(rows),
            _ => None,
        }
    }
}

impl From<Var> for Selection {
    fn from(var: Var) -> Self {
        Selection::Scalar(var)
    }
}

/// A PHREEQC engine with NumPy-style access to its selected output.
#[derive(Debug)]
pub struct Phreeqc<E: Engine> {
    engine: E,
    /// Shared cell buffer. Held for a whole traversal so concurrent readers
    /// never see each other's cells.
    var: Mutex<Var>,
}

impl<E: Engine> Phreeqc<E> {
    pub fn new(engine: E) -> Self {
        Phreeqc {
            engine,
            var: Mutex::new(Var::new()),
        }
    }

    /// Wrap `engine` and load the database named by `config`.
    pub fn with_database(engine: E, config: &DatabaseConfig) -> Result<Self> {
        let mut phreeqc = Phreeqc::new(engine);
        phreeqc.load_database(config.path())?;
        Ok(phreeqc)
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn into_engine(self) -> E {
        self.engine
    }

    pub fn load_database(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading database");
        self.engine.load_database(path)
    }

    pub fn run_string(&mut self, input: &str) -> Result<()> {
        debug!(bytes = input.len(), "running input");
        self.engine.run_string(input)
    }

    pub fn error_string(&self) -> String {
        self.engine.error_string()
    }

    pub fn selected_output_row_count(&self) -> Result<usize> {
        self.engine.selected_output_row_count()
    }

    pub fn selected_output_column_count(&self) -> Result<usize> {
        self.engine.selected_output_column_count()
    }

    pub fn component_count(&self) -> Result<usize> {
        self.engine.component_count()
    }

    pub fn component(&self, n: usize) -> Result<String> {
        self.engine.component(n)
    }

    /// All component names, in engine order.
    pub fn components(&self) -> Result<Vec<String>> {
        (0..self.component_count()?)
            .map(|n| self.component(n))
            .collect()
    }

    /// `(rows, columns)` of the selected output, queried on every call.
    pub fn shape(&self) -> Result<(usize, usize)> {
        Ok((
            self.selected_output_row_count()?,
            self.selected_output_column_count()?,
        ))
    }

    /// Read a single cell into a fresh value, bypassing the shared buffer.
    pub fn fetch(&self, row: i64, col: i64) -> Result<Var> {
        let mut var = Var::new();
        self.engine.get_value(row, col, &mut var)?;
        Ok(var)
    }

    /// The heading row (row 0) across all columns.
    pub fn headings(&self) -> Result<Vec<Var>> {
        match self.get(TableIndex::new(0, ..))? {
            Selection::Scalar(var) => Ok(vec![var]),
            Selection::List(vars) => Ok(vars),
            Selection::Table(_) => Ok(Vec::new()),
        }
    }

    /// Index the selected output.
    ///
    /// `index` is a row key or a (row, column) pair; each key is an integer
    /// or a slice. Slices resolve against the current shape. Integer keys go
    /// to the engine unchecked, so an out-of-range cell reads as whatever the
    /// engine writes (IPhreeqc: an error-kind value).
    ///
    /// ```
    /// use phreeqc_core::{MemoryEngine, Phreeqc, Selection, Var};
    ///
    /// let table = Phreeqc::new(MemoryEngine::from_rows(vec![
    ///     vec!["cb".into(), "H".into(), "O".into()],
    ///     vec![0.0.into(), 111.0.into(), 55.5.into()],
    /// ]));
    /// assert_eq!(table.get((0, 0)).unwrap(), Selection::Scalar(Var::from("cb")));
    /// assert_eq!(
    ///     table.get((0, 1..)).unwrap(),
    ///     Selection::List(vec![Var::from("H"), Var::from("O")])
    /// );
    /// ```
    pub fn get(&self, index: impl Into<TableIndex>) -> Result<Selection> {
        let index = index.into();
        let (row_count, column_count) = self.shape()?;
        let rows = index.row.positions(row_count)?;
        let columns = index.column.positions(column_count)?;
        trace!(
            %index,
            rows = rows.len(),
            columns = columns.len(),
            "indexing selected output"
        );

        let mut var = self.var.lock().unwrap_or_else(PoisonError::into_inner);
        let mut collected = Vec::with_capacity(rows.len());
        for &row in &rows {
            let mut values = Vec::with_capacity(columns.len());
            for &col in &columns {
                self.engine.get_value(row, col, &mut *var)?;
                values.push(var.clone());
            }
            collected.push(values);
        }
        drop(var);

        Ok(Selection::reduce(collected, columns.len()))
    }
}

impl<E: Engine + Default> Default for Phreeqc<E> {
    fn default() -> Self {
        Phreeqc::new(E::default())
    }
}
