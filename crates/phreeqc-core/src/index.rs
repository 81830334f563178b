//! Index keys for the two-axis selected-output table.
//!
//! A [`TableIndex`] is a (row, column) pair of [`AxisKey`]s. Each key is a
//! single position or a [`Slice`] with Python slicing semantics, resolved
//! against the live length of its axis at lookup time. Rust callers usually
//! build indices from integers, ranges and tuples:
//!
//! ```
//! use phreeqc_core::{AxisKey, Slice, TableIndex};
//!
//! assert_eq!(TableIndex::from(2), TableIndex::row(2));
//! assert_eq!(
//!     TableIndex::from((0, 1..4)),
//!     TableIndex::new(AxisKey::Index(0), AxisKey::Slice(Slice::range(1, 4)))
//! );
//! assert_eq!("0,5:".parse::<TableIndex>().unwrap(), TableIndex::from((0, 5..)));
//! ```

use std::fmt;
use std::ops::{Range, RangeFrom, RangeFull, RangeTo};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Axis, PhreeqcError, Result};

/// A `start:stop:step` slice. Absent fields take the direction-dependent
/// defaults Python uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Slice {
    pub start: Option<i64>,
    pub stop: Option<i64>,
    pub step: Option<i64>,
}

impl Slice {
    /// The slice covering a whole axis (`:`).
    pub const fn full() -> Self {
        Slice {
            start: None,
            stop: None,
            step: None,
        }
    }

    pub const fn new(start: Option<i64>, stop: Option<i64>, step: Option<i64>) -> Self {
        Slice { start, stop, step }
    }

    /// `start..stop` with unit step.
    pub const fn range(start: i64, stop: i64) -> Self {
        Slice::new(Some(start), Some(stop), None)
    }

    /// Resolve to concrete `(start, stop, step)` for an axis of `len` items.
    ///
    /// Negative bounds count from the end, out-of-range bounds clamp, and a
    /// negative step walks backwards with `-1` as the "before first" stop.
    pub fn indices(&self, len: usize) -> Result<(i64, i64, i64)> {
        let step = self.step.unwrap_or(1);
        if step == 0 {
            return Err(PhreeqcError::ZeroStep);
        }
        let len = i64::try_from(len).unwrap_or(i64::MAX);
        let (lower, upper) = if step < 0 { (-1, len - 1) } else { (0, len) };
        let clamp = |bound: i64| {
            if bound < 0 {
                bound.saturating_add(len).max(lower)
            } else {
                bound.min(upper)
            }
        };
        let (default_start, default_stop) = if step < 0 {
            (upper, lower)
        } else {
            (lower, upper)
        };
        let start = self.start.map_or(default_start, clamp);
        let stop = self.stop.map_or(default_stop, clamp);
        Ok((start, stop, step))
    }

    /// The ordered positions this slice selects from an axis of `len` items.
    pub fn positions(&self, len: usize) -> Result<Vec<i64>> {
        let (start, stop, step) = self.indices(len)?;
        let mut positions = Vec::new();
        let mut i = start;
        while (step > 0 && i < stop) || (step < 0 && i > stop) {
            positions.push(i);
            i = match i.checked_add(step) {
                Some(next) => next,
                None => break,
            };
        }
        Ok(positions)
    }

    /// Parse `start:stop` or `start:stop:step`; empty fields are absent.
    fn parse(text: &str, axis: Axis) -> Result<Self> {
        let fields: Vec<&str> = text.split(':').collect();
        if fields.len() > 3 {
            return Err(PhreeqcError::IndexType { axis });
        }
        let field = |n: usize| -> Result<Option<i64>> {
            match fields.get(n).map(|f| f.trim()) {
                None | Some("") => Ok(None),
                Some(f) => f
                    .parse::<i64>()
                    .map(Some)
                    .map_err(|_| PhreeqcError::IndexType { axis }),
            }
        };
        Ok(Slice::new(field(0)?, field(1)?, field(2)?))
    }
}

impl fmt::Display for Slice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(start) = self.start {
            write!(f, "{}", start)?;
        }
        f.write_str(":")?;
        if let Some(stop) = self.stop {
            write!(f, "{}", stop)?;
        }
        if let Some(step) = self.step {
            write!(f, ":{}", step)?;
        }
        Ok(())
    }
}

/// One axis of a table index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AxisKey {
    /// A single position, handed to the engine as is.
    Index(i64),
    Slice(Slice),
}

impl AxisKey {
    /// The positions this key selects on an axis of `len` items.
    ///
    /// Single positions are not checked against `len`; the engine decides
    /// what an out-of-range cell reads as.
    pub fn positions(&self, len: usize) -> Result<Vec<i64>> {
        match self {
            AxisKey::Index(i) => Ok(vec![*i]),
            AxisKey::Slice(slice) => slice.positions(len),
        }
    }

    /// Parse an integer or a slice expression for the given axis.
    pub fn parse(text: &str, axis: Axis) -> Result<Self> {
        let text = text.trim();
        if text.contains(':') {
            return Slice::parse(text, axis).map(AxisKey::Slice);
        }
        text.parse::<i64>()
            .map(AxisKey::Index)
            .map_err(|_| PhreeqcError::IndexType { axis })
    }
}

impl fmt::Display for AxisKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AxisKey::Index(i) => write!(f, "{}", i),
            AxisKey::Slice(slice) => write!(f, "{}", slice),
        }
    }
}

impl Default for AxisKey {
    fn default() -> Self {
        AxisKey::Slice(Slice::full())
    }
}

/// A (row, column) key pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableIndex {
    pub row: AxisKey,
    pub column: AxisKey,
}

impl TableIndex {
    pub fn new(row: impl Into<AxisKey>, column: impl Into<AxisKey>) -> Self {
        TableIndex {
            row: row.into(),
            column: column.into(),
        }
    }

    /// Address rows only; the column axis is the full slice.
    pub fn row(row: impl Into<AxisKey>) -> Self {
        TableIndex::new(row, AxisKey::default())
    }

    /// Build from one or two keys, padding a missing column with `:`.
    pub fn from_keys(keys: Vec<AxisKey>) -> Result<Self> {
        let mut keys = keys.into_iter();
        match (keys.next(), keys.next(), keys.len()) {
            (None, _, _) => Ok(TableIndex::new(AxisKey::default(), AxisKey::default())),
            (Some(row), None, _) => Ok(TableIndex::row(row)),
            (Some(row), Some(column), 0) => Ok(TableIndex::new(row, column)),
            (Some(_), Some(_), rest) => Err(PhreeqcError::TooManyIndices(rest + 2)),
        }
    }
}

impl FromStr for TableIndex {
    type Err = PhreeqcError;

    /// Parse `row` or `row,column`, e.g. `"2"`, `"0,1:4"`, `"::-1,0"`.
    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(',').collect();
        if parts.len() > 2 {
            return Err(PhreeqcError::TooManyIndices(parts.len()));
        }
        let mut keys = Vec::with_capacity(parts.len());
        for (part, axis) in parts.iter().zip([Axis::Row, Axis::Column]) {
            keys.push(AxisKey::parse(part, axis)?);
        }
        TableIndex::from_keys(keys)
    }
}

impl fmt::Display for TableIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.row, self.column)
    }
}

impl<R: Into<AxisKey>, C: Into<AxisKey>> From<(R, C)> for TableIndex {
    fn from((row, column): (R, C)) -> Self {
        TableIndex::new(row, column)
    }
}

impl From<AxisKey> for TableIndex {
    fn from(row: AxisKey) -> Self {
        TableIndex::row(row)
    }
}

impl From<Slice> for AxisKey {
    fn from(slice: Slice) -> Self {
        AxisKey::Slice(slice)
    }
}

impl From<RangeFull> for AxisKey {
    fn from(_: RangeFull) -> Self {
        AxisKey::Slice(Slice::full())
    }
}

macro_rules! integer_axis_keys {
    ($($t:ty),* $(,)?) => {
        $(
            impl From<$t> for AxisKey {
                fn from(i: $t) -> Self {
                    AxisKey::Index(i as i64)
                }
            }

            impl From<Range<$t>> for AxisKey {
                fn from(r: Range<$t>) -> Self {
                    AxisKey::Slice(Slice::range(r.start as i64, r.end as i64))
                }
            }

            impl From<RangeFrom<$t>> for AxisKey {
                fn from(r: RangeFrom<$t>) -> Self {
                    AxisKey::Slice(Slice::new(Some(r.start as i64), None, None))
                }
            }

            impl From<RangeTo<$t>> for AxisKey {
                fn from(r: RangeTo<$t>) -> Self {
                    AxisKey::Slice(Slice::new(None, Some(r.end as i64), None))
                }
            }
        )*
    };
}

integer_axis_keys!(i32, i64, usize);

macro_rules! row_only_indices {
    ($($t:ty),* $(,)?) => {
        $(
            impl From<$t> for TableIndex {
                fn from(row: $t) -> Self {
                    TableIndex::row(row)
                }
            }
        )*
    };
}

row_only_indices!(
    i32,
    i64,
    usize,
    Slice,
    RangeFull,
    Range<i32>,
    Range<i64>,
    Range<usize>,
    RangeFrom<i32>,
    RangeFrom<i64>,
    RangeFrom<usize>,
    RangeTo<i32>,
    RangeTo<i64>,
    RangeTo<usize>,
);
