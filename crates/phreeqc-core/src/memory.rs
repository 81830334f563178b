//! An engine whose selected output lives in memory.
//!
//! Used for offline tables (the CLI's JSON input, Python's
//! `Phreeqc.from_rows`) and in tests. Cell reads behave like IPhreeqc's:
//! an out-of-range position reads as `VR_INVALIDROW` / `VR_INVALIDCOL`
//! rather than failing the call.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::engine::Engine;
use crate::error::{PhreeqcError, Result};
use crate::var::{VResult, Var};

/// JSON accepted by [`MemoryEngine::from_json`]: either a bare array of
/// rows or an object with `rows` and optional `components`.
#[derive(Deserialize)]
#[serde(untagged)]
enum TableDocument {
    Rows(Vec<Vec<Value>>),
    Full {
        rows: Vec<Vec<Value>>,
        #[serde(default)]
        components: Vec<String>,
    },
}

#[derive(Debug, Default)]
pub struct MemoryEngine {
    rows: Vec<Vec<Var>>,
    components: Vec<String>,
    database: Option<PathBuf>,
    last_error: String,
    fetches: AtomicUsize,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// An engine whose selected output is `rows`. Row 0 is conventionally
    /// the heading row. Short rows read as empty in the missing columns.
    pub fn from_rows(rows: Vec<Vec<Var>>) -> Self {
        MemoryEngine {
            rows,
            ..Self::default()
        }
    }

    pub fn with_components<S: Into<String>>(
        mut self,
        components: impl IntoIterator<Item = S>,
    ) -> Self {
        self.components = components.into_iter().map(Into::into).collect();
        self
    }

    /// Parse a JSON table. Every cell must be a JSON scalar other than a bool.
    pub fn from_json(json: &str) -> Result<Self> {
        let (rows, components) = match serde_json::from_str::<TableDocument>(json)? {
            TableDocument::Rows(rows) => (rows, Vec::new()),
            TableDocument::Full { rows, components } => (rows, components),
        };
        let rows = rows
            .iter()
            .map(|row| row.iter().map(Var::try_from).collect::<Result<Vec<_>>>())
            .collect::<Result<Vec<_>>>()?;
        Ok(MemoryEngine::from_rows(rows).with_components(components))
    }

    /// Read and parse a JSON table file; see [`MemoryEngine::from_json`].
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "reading table file");
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// Replace the selected output, as a new run would.
    pub fn set_rows(&mut self, rows: Vec<Vec<Var>>) {
        self.rows = rows;
    }

    pub fn push_row(&mut self, row: Vec<Var>) {
        self.rows.push(row);
    }

    /// The path passed to the last successful [`Engine::load_database`].
    pub fn database(&self) -> Option<&Path> {
        self.database.as_deref()
    }

    /// How many cell reads this engine has served.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }

    fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }
}

impl Engine for MemoryEngine {
    fn load_database(&mut self, path: &Path) -> Result<()> {
        debug!(path = %path.display(), "recording database for in-memory engine");
        self.database = Some(path.to_path_buf());
        Ok(())
    }

    fn run_string(&mut self, _input: &str) -> Result<()> {
        self.last_error = "the in-memory engine cannot run PHREEQC input".to_string();
        Err(PhreeqcError::Engine(self.last_error.clone()))
    }

    fn error_string(&self) -> String {
        self.last_error.clone()
    }

    fn selected_output_row_count(&self) -> Result<usize> {
        Ok(self.rows.len())
    }

    fn selected_output_column_count(&self) -> Result<usize> {
        Ok(self.column_count())
    }

    fn get_value(&self, row: i64, col: i64, out: &mut Var) -> Result<()> {
        self.fetches.fetch_add(1, Ordering::Relaxed);

        let Some(cells) = usize::try_from(row).ok().and_then(|r| self.rows.get(r)) else {
            out.assign(VResult::InvalidRow);
            return Ok(());
        };
        match usize::try_from(col) {
            Ok(c) if c < self.column_count() => {
                out.assign(cells.get(c).cloned().unwrap_or_default());
            }
            _ => out.assign(VResult::InvalidCol),
        }
        Ok(())
    }

    fn component_count(&self) -> Result<usize> {
        Ok(self.components.len())
    }

    fn component(&self, n: usize) -> Result<String> {
        self.components.get(n).cloned().ok_or_else(|| {
            PhreeqcError::Engine(format!(
                "component {} out of range ({} components)",
                n,
                self.components.len()
            ))
        })
    }
}
