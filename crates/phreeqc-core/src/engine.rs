//! The foreign engine contract.
//!
//! [`Engine`] lists every engine operation the accessor and its hosts use.
//! There is no catch-all forwarding: anything a host needs from the engine
//! is a method here.

use std::path::Path;

use crate::error::Result;
use crate::var::Var;

/// A PHREEQC engine instance holding one selected-output result set.
pub trait Engine {
    /// Load a thermodynamic database. The path is passed through unparsed.
    fn load_database(&mut self, path: &Path) -> Result<()>;

    /// Run a PHREEQC input script.
    fn run_string(&mut self, input: &str) -> Result<()>;

    /// The text of the engine's most recent errors.
    fn error_string(&self) -> String;

    /// Rows in the current selected output, including the heading row.
    fn selected_output_row_count(&self) -> Result<usize>;

    fn selected_output_column_count(&self) -> Result<usize>;

    /// Write the cell at (`row`, `col`) into `out`, replacing its contents.
    ///
    /// Positions are not validated by callers; an engine reports an
    /// out-of-range cell however it chooses, typically as
    /// `Var::Error(VResult::InvalidRow)` or `Var::Error(VResult::InvalidCol)`.
    fn get_value(&self, row: i64, col: i64, out: &mut Var) -> Result<()>;

    /// Number of components (elements) in the last run.
    fn component_count(&self) -> Result<usize>;

    /// The `n`-th component name, in the engine's alphabetical order.
    fn component(&self, n: usize) -> Result<String>;
}

impl<E: Engine + ?Sized> Engine for Box<E> {
    fn load_database(&mut self, path: &Path) -> Result<()> {
        (**self).load_database(path)
    }

    fn run_string(&mut self, input: &str) -> Result<()> {
        (**self).run_string(input)
    }

    fn error_string(&self) -> String {
        (**self).error_string()
    }

    fn selected_output_row_count(&self) -> Result<usize> {
        (**self).selected_output_row_count()
    }

    fn selected_output_column_count(&self) -> Result<usize> {
        (**self).selected_output_column_count()
    }

    fn get_value(&self, row: i64, col: i64, out: &mut Var) -> Result<()> {
        (**self).get_value(row, col, out)
    }

    fn component_count(&self) -> Result<usize> {
        (**self).component_count()
    }

    fn component(&self, n: usize) -> Result<String> {
        (**self).component(n)
    }
}
