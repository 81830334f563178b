//! The engine's tagged scalar value.
//!
//! PHREEQC hands every selected-output cell back as a `VAR`: a kind tag plus
//! a C union holding a `long`, a `double`, a heap string or a result code.
//! [`Var`] is the owned Rust form of that value. Because the `String`
//! variant owns its buffer, replacing the variant drops the old text; the
//! only place a manual release still happens is [`RawVar`], at the FFI
//! boundary, where the engine's own `VarClear` frees the C string.
//!
//! Statically typed values convert through `From` (`Var::from(42)`,
//! `Var::from("cb")`); dynamically typed ones (JSON here, Python objects in
//! the binding crate) go through `TryFrom` and fail with
//! [`PhreeqcError::TypeMismatch`] when no kind fits.

use std::ffi::{c_char, c_int, c_long, CStr};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{PhreeqcError, Result};

/// The active tag of a [`Var`], numbered as the engine's `VAR_TYPE`.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VarKind {
    #[serde(rename = "TT_EMPTY")]
    Empty = 0,
    #[serde(rename = "TT_ERROR")]
    Error = 1,
    #[serde(rename = "TT_LONG")]
    Long = 2,
    #[serde(rename = "TT_DOUBLE")]
    Double = 3,
    #[serde(rename = "TT_STRING")]
    String = 4,
}

impl VarKind {
    /// The engine's name for this kind (`TT_EMPTY`, `TT_LONG`, ...).
    pub fn name(self) -> &'static str {
        match self {
            VarKind::Empty => "TT_EMPTY",
            VarKind::Error => "TT_ERROR",
            VarKind::Long => "TT_LONG",
            VarKind::Double => "TT_DOUBLE",
            VarKind::String => "TT_STRING",
        }
    }
}

impl TryFrom<i32> for VarKind {
    type Error = PhreeqcError;

    fn try_from(tag: i32) -> Result<Self> {
        match tag {
            0 => Ok(VarKind::Empty),
            1 => Ok(VarKind::Error),
            2 => Ok(VarKind::Long),
            3 => Ok(VarKind::Double),
            4 => Ok(VarKind::String),
            other => Err(PhreeqcError::InvalidState(format!(
                "unknown variant kind tag {}",
                other
            ))),
        }
    }
}

impl fmt::Display for VarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Status codes the engine stores in an error-kind variant (`VRESULT`).
///
/// These are carried as opaque values; nothing in this crate acts on them.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VResult {
    #[serde(rename = "VR_OK")]
    Ok = 0,
    #[serde(rename = "VR_OUTOFMEMORY")]
    OutOfMemory = -1,
    #[serde(rename = "VR_BADVARTYPE")]
    BadVarType = -2,
    #[serde(rename = "VR_INVALIDARG")]
    InvalidArg = -3,
    #[serde(rename = "VR_INVALIDROW")]
    InvalidRow = -4,
    #[serde(rename = "VR_INVALIDCOL")]
    InvalidCol = -5,
}

impl VResult {
    pub const ALL: [VResult; 6] = [
        VResult::Ok,
        VResult::OutOfMemory,
        VResult::BadVarType,
        VResult::InvalidArg,
        VResult::InvalidRow,
        VResult::InvalidCol,
    ];

    /// The numeric code as the engine reports it.
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn name(self) -> &'static str {
        match self {
            VResult::Ok => "VR_OK",
            VResult::OutOfMemory => "VR_OUTOFMEMORY",
            VResult::BadVarType => "VR_BADVARTYPE",
            VResult::InvalidArg => "VR_INVALIDARG",
            VResult::InvalidRow => "VR_INVALIDROW",
            VResult::InvalidCol => "VR_INVALIDCOL",
        }
    }
}

impl TryFrom<i32> for VResult {
    type Error = PhreeqcError;

    fn try_from(code: i32) -> Result<Self> {
        VResult::ALL
            .into_iter()
            .find(|v| v.code() == code)
            .ok_or_else(|| PhreeqcError::InvalidState(format!("unknown result code {}", code)))
    }
}

impl fmt::Display for VResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One engine scalar. Exactly one payload is live, selected by the variant.
///
/// Serializes as the bare scalar: `null`, the error code name, a number or a
/// string.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum Var {
    #[default]
    Empty,
    Error(VResult),
    Long(i64),
    Double(f64),
    String(String),
}

impl Var {
    /// A fresh, empty value.
    pub fn new() -> Self {
        Var::Empty
    }

    /// A value initialized through [`Var::assign`].
    pub fn with_value(value: impl Into<Var>) -> Self {
        let mut var = Var::new();
        var.assign(value);
        var
    }

    /// Replace the current payload. A previously held string is dropped here.
    pub fn assign(&mut self, value: impl Into<Var>) {
        *self = value.into();
    }

    pub fn kind(&self) -> VarKind {
        match self {
            Var::Empty => VarKind::Empty,
            Var::Error(_) => VarKind::Error,
            Var::Long(_) => VarKind::Long,
            Var::Double(_) => VarKind::Double,
            Var::String(_) => VarKind::String,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Var::Empty)
    }

    pub fn as_long(&self) -> Option<i64> {
        match self {
            Var::Long(l) => Some(*l),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            Var::Double(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Var::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_error(&self) -> Option<VResult> {
        match self {
            Var::Error(code) => Some(*code),
            _ => None,
        }
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Var::Empty => Ok(()),
            Var::Error(code) => write!(f, "{}", code),
            Var::Long(l) => write!(f, "{}", l),
            Var::Double(d) => write!(f, "{}", d),
            Var::String(s) => f.write_str(s),
        }
    }
}

impl From<VResult> for Var {
    fn from(code: VResult) -> Self {
        Var::Error(code)
    }
}

impl From<i64> for Var {
    fn from(value: i64) -> Self {
        Var::Long(value)
    }
}

impl From<i32> for Var {
    fn from(value: i32) -> Self {
        Var::Long(value.into())
    }
}

impl From<u32> for Var {
    fn from(value: u32) -> Self {
        Var::Long(value.into())
    }
}

impl From<f64> for Var {
    fn from(value: f64) -> Self {
        Var::Double(value)
    }
}

impl From<f32> for Var {
    fn from(value: f32) -> Self {
        Var::Double(value.into())
    }
}

impl From<&str> for Var {
    fn from(value: &str) -> Self {
        Var::String(value.to_string())
    }
}

impl From<String> for Var {
    fn from(value: String) -> Self {
        Var::String(value)
    }
}

impl From<()> for Var {
    fn from(_: ()) -> Self {
        Var::Empty
    }
}

impl<T: Into<Var>> From<Option<T>> for Var {
    fn from(value: Option<T>) -> Self {
        value.map_or(Var::Empty, Into::into)
    }
}

/// JSON scalars map onto kinds: integers before floats, then strings, then
/// `null`. Booleans, arrays and objects have no kind.
impl TryFrom<&Value> for Var {
    type Error = PhreeqcError;

    fn try_from(value: &Value) -> Result<Self> {
        match value {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Var::Long(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(Var::Double(f))
                } else {
                    Err(PhreeqcError::TypeMismatch(format!("number {}", n)))
                }
            }
            Value::String(s) => Ok(Var::String(s.clone())),
            Value::Null => Ok(Var::Empty),
            Value::Bool(b) => Err(PhreeqcError::TypeMismatch(format!("bool {}", b))),
            Value::Array(_) => Err(PhreeqcError::TypeMismatch("array".to_string())),
            Value::Object(_) => Err(PhreeqcError::TypeMismatch("object".to_string())),
        }
    }
}

impl TryFrom<Value> for Var {
    type Error = PhreeqcError;

    fn try_from(value: Value) -> Result<Self> {
        Var::try_from(&value)
    }
}

/// Payload union of the engine's C `VAR`.
#[repr(C)]
#[derive(Clone, Copy)]
pub union RawVarPayload {
    pub l_val: c_long,
    pub d_val: f64,
    pub s_val: *mut c_char,
    pub vresult: c_int,
}

/// Layout-compatible mirror of the engine's C `VAR` struct.
///
/// Only the engine allocates the string payload; a `RawVar` that the engine
/// filled must be released with the engine's `VarClear` after decoding.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct RawVar {
    pub kind: c_int,
    pub payload: RawVarPayload,
}

impl RawVar {
    /// An empty variant, equivalent to the engine's `VarInit`.
    pub const fn empty() -> Self {
        RawVar {
            kind: VarKind::Empty as c_int,
            payload: RawVarPayload { d_val: 0.0 },
        }
    }

    /// Copy the raw value into an owned [`Var`].
    ///
    /// Fails with [`PhreeqcError::InvalidState`] when the tag or the stored
    /// result code is unknown. A null string pointer decodes as `""`.
    ///
    /// # Safety
    ///
    /// The payload field selected by `kind` must be initialized, and for the
    /// string kind `s_val` must be null or point at a NUL-terminated buffer
    /// that stays alive for the duration of the call.
    pub unsafe fn decode(&self) -> Result<Var> {
        let var = match VarKind::try_from(self.kind)? {
            VarKind::Empty => Var::Empty,
            VarKind::Error => Var::Error(VResult::try_from(self.payload.vresult)?),
            VarKind::Long => Var::Long(self.payload.l_val.into()),
            VarKind::Double => Var::Double(self.payload.d_val),
            VarKind::String => {
                let ptr = self.payload.s_val;
                if ptr.is_null() {
                    Var::String(String::new())
                } else {
                    Var::String(CStr::from_ptr(ptr).to_string_lossy().into_owned())
                }
            }
        };
        Ok(var)
    }
}

impl Default for RawVar {
    fn default() -> Self {
        RawVar::empty()
    }
}
