//! IPhreeqc C library engine. Enabled with the `iphreeqc` feature.

use std::ffi::{c_char, c_int, CStr, CString};
use std::path::Path;

use tracing::{debug, warn};

use crate::engine::Engine;
use crate::error::{PhreeqcError, Result};
use crate::var::{RawVar, Var};

#[link(name = "IPhreeqc")]
extern "C" {
    fn CreateIPhreeqc() -> c_int;
    fn DestroyIPhreeqc(id: c_int) -> c_int;
    fn LoadDatabase(id: c_int, filename: *const c_char) -> c_int;
    fn RunString(id: c_int, input: *const c_char) -> c_int;
    fn GetErrorString(id: c_int) -> *const c_char;
    fn GetSelectedOutputRowCount(id: c_int) -> c_int;
    fn GetSelectedOutputColumnCount(id: c_int) -> c_int;
    fn GetSelectedOutputValue(id: c_int, row: c_int, col: c_int, var: *mut RawVar) -> c_int;
    fn GetComponentCount(id: c_int) -> c_int;
    fn GetComponent(id: c_int, n: c_int) -> *const c_char;
    fn VarInit(var: *mut RawVar);
    fn VarClear(var: *mut RawVar) -> c_int;
}

/// `IPQ_RESULT` codes returned by instance-level calls.
fn ipq_result_name(code: c_int) -> &'static str {
    match code {
        0 => "IPQ_OK",
        -1 => "IPQ_OUTOFMEMORY",
        -2 => "IPQ_BADVARTYPE",
        -3 => "IPQ_INVALIDARG",
        -4 => "IPQ_INVALIDROW",
        -5 => "IPQ_INVALIDCOL",
        -6 => "IPQ_BADINSTANCE",
        _ => "IPQ_UNKNOWN",
    }
}

/// One IPhreeqc instance, destroyed on drop.
#[derive(Debug)]
pub struct IPhreeqc {
    id: c_int,
}

impl IPhreeqc {
    pub fn new() -> Result<Self> {
        // SAFETY: CreateIPhreeqc has no preconditions.
        let id = unsafe { CreateIPhreeqc() };
        if id < 0 {
            return Err(PhreeqcError::Engine(format!(
                "CreateIPhreeqc failed: {}",
                ipq_result_name(id)
            )));
        }
        debug!(id, "created IPhreeqc instance");
        Ok(IPhreeqc { id })
    }

    fn count(&self, what: &str, count: c_int) -> Result<usize> {
        usize::try_from(count).map_err(|_| {
            PhreeqcError::Engine(format!("{} failed: {}", what, ipq_result_name(count)))
        })
    }

    /// Turn an error count from LoadDatabase/RunString into a result.
    fn check_errors(&self, what: &str, errors: c_int) -> Result<()> {
        if errors == 0 {
            return Ok(());
        }
        let message = self.error_string();
        warn!(id = self.id, errors, "{} reported errors", what);
        Err(PhreeqcError::Engine(format!(
            "{} reported {} error(s): {}",
            what,
            errors,
            message.trim_end()
        )))
    }

    fn c_string(text: &str) -> Result<CString> {
        CString::new(text).map_err(|e| PhreeqcError::Engine(format!("interior NUL in input: {}", e)))
    }
}

impl Drop for IPhreeqc {
    fn drop(&mut self) {
        // SAFETY: `id` came from CreateIPhreeqc and is destroyed exactly once.
        unsafe {
            DestroyIPhreeqc(self.id);
        }
    }
}

impl Engine for IPhreeqc {
    fn load_database(&mut self, path: &Path) -> Result<()> {
        debug!(id = self.id, path = %path.display(), "loading database");
        let filename = Self::c_string(&path.to_string_lossy())?;
        // SAFETY: `filename` is a valid NUL-terminated string for the call.
        let errors = unsafe { LoadDatabase(self.id, filename.as_ptr()) };
        self.check_errors("LoadDatabase", errors)
    }

    fn run_string(&mut self, input: &str) -> Result<()> {
        debug!(id = self.id, bytes = input.len(), "running input");
        let input = Self::c_string(input)?;
        // SAFETY: `input` is a valid NUL-terminated string for the call.
        let errors = unsafe { RunString(self.id, input.as_ptr()) };
        self.check_errors("RunString", errors)
    }

    fn error_string(&self) -> String {
        // SAFETY: the engine returns null or a string it owns until the next call.
        unsafe {
            let ptr = GetErrorString(self.id);
            if ptr.is_null() {
                String::new()
            } else {
                CStr::from_ptr(ptr).to_string_lossy().into_owned()
            }
        }
    }

    fn selected_output_row_count(&self) -> Result<usize> {
        // SAFETY: plain query on a live instance.
        let count = unsafe { GetSelectedOutputRowCount(self.id) };
        self.count("GetSelectedOutputRowCount", count)
    }

    fn selected_output_column_count(&self) -> Result<usize> {
        // SAFETY: plain query on a live instance.
        let count = unsafe { GetSelectedOutputColumnCount(self.id) };
        self.count("GetSelectedOutputColumnCount", count)
    }

    /// Out-of-range positions come back as an error-kind value, not as `Err`.
    fn get_value(&self, row: i64, col: i64, out: &mut Var) -> Result<()> {
        let row = c_int::try_from(row).unwrap_or(c_int::MIN);
        let col = c_int::try_from(col).unwrap_or(c_int::MIN);
        let mut raw = RawVar::empty();
        // SAFETY: `raw` is initialized by VarInit, filled by the engine with a
        // payload matching its tag, decoded while the string buffer is alive,
        // and released by VarClear exactly once.
        let decoded = unsafe {
            VarInit(&mut raw);
            GetSelectedOutputValue(self.id, row, col, &mut raw);
            let decoded = raw.decode();
            VarClear(&mut raw);
            decoded
        };
        out.assign(decoded?);
        Ok(())
    }

    fn component_count(&self) -> Result<usize> {
        // SAFETY: plain query on a live instance.
        let count = unsafe { GetComponentCount(self.id) };
        self.count("GetComponentCount", count)
    }

    fn component(&self, n: usize) -> Result<String> {
        let index = c_int::try_from(n)
            .map_err(|_| PhreeqcError::Engine(format!("component index {} too large", n)))?;
        // SAFETY: the engine returns null or a string it owns.
        unsafe {
            let ptr = GetComponent(self.id, index);
            if ptr.is_null() {
                Err(PhreeqcError::Engine(format!("no component at index {}", n)))
            } else {
                Ok(CStr::from_ptr(ptr).to_string_lossy().into_owned())
            }
        }
    }
}
