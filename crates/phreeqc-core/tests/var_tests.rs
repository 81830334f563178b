//! Tests for `Var`: construction, assignment across kinds, raw `VAR`
//! decoding and JSON conversion.

use std::ffi::{c_int, CString};

use phreeqc_core::var::RawVarPayload;
use phreeqc_core::{PhreeqcError, RawVar, VResult, Var, VarKind};
use serde_json::json;

// ============================================================================
// Construction and round trips
// ============================================================================

#[test]
fn new_var_is_empty() {
    let var = Var::new();
    assert_eq!(var.kind(), VarKind::Empty);
    assert!(var.is_empty());
    assert_eq!(var, Var::default());
}

#[test]
fn long_round_trip() {
    let var = Var::with_value(42);
    assert_eq!(var.kind(), VarKind::Long);
    assert_eq!(var.as_long(), Some(42));
}

#[test]
fn double_round_trip() {
    let var = Var::with_value(3.1415926);
    assert_eq!(var.kind(), VarKind::Double);
    let value = var.as_double().expect("should hold a double");
    assert!((value - 3.1415926).abs() < 1e-12);
}

#[test]
fn string_round_trip() {
    let var = Var::with_value("Hello World");
    assert_eq!(var.kind(), VarKind::String);
    assert_eq!(var.as_str(), Some("Hello World"));
}

#[test]
fn error_round_trip() {
    let var = Var::with_value(VResult::OutOfMemory);
    assert_eq!(var.kind(), VarKind::Error);
    assert_eq!(var.as_error(), Some(VResult::OutOfMemory));
}

#[test]
fn none_is_empty() {
    let var = Var::with_value(None::<i64>);
    assert!(var.is_empty());
    assert_eq!(Var::from(()), Var::Empty);
}

#[test]
fn some_assigns_inner_value() {
    assert_eq!(Var::from(Some(7)), Var::Long(7));
    assert_eq!(Var::from(Some("K")), Var::String("K".to_string()));
}

#[test]
fn integers_never_become_doubles() {
    assert_eq!(Var::from(1i32).kind(), VarKind::Long);
    assert_eq!(Var::from(1u32).kind(), VarKind::Long);
    assert_eq!(Var::from(1i64).kind(), VarKind::Long);
    assert_eq!(Var::from(1.0f32).kind(), VarKind::Double);
}

// ============================================================================
// Reassignment
// ============================================================================

#[test]
fn string_then_long_reads_long() {
    let mut var = Var::with_value("Hello World");
    var.assign(42);
    assert_eq!(var, Var::Long(42));
    assert_eq!(var.as_str(), None, "no stale string after reassignment");
}

#[test]
fn string_then_every_kind() {
    let replacements = [
        Var::Empty,
        Var::Error(VResult::InvalidRow),
        Var::Long(-3),
        Var::Double(0.5),
        Var::String("Na".to_string()),
    ];
    for replacement in replacements {
        let mut var = Var::with_value("Cl");
        var.assign(replacement.clone());
        assert_eq!(var, replacement);
    }
}

#[test]
fn reassignment_is_repeatable() {
    let mut var = Var::new();
    for i in 0..100 {
        var.assign(format!("row {}", i));
        var.assign(i);
    }
    assert_eq!(var, Var::Long(99));
}

// ============================================================================
// Display and serialization
// ============================================================================

#[test]
fn display_shows_bare_scalar() {
    assert_eq!(Var::Empty.to_string(), "");
    assert_eq!(Var::Long(5).to_string(), "5");
    assert_eq!(Var::Double(0.25).to_string(), "0.25");
    assert_eq!(Var::from("Ca").to_string(), "Ca");
    assert_eq!(Var::from(VResult::InvalidCol).to_string(), "VR_INVALIDCOL");
}

#[test]
fn serializes_as_bare_scalar() {
    let row = vec![
        Var::Empty,
        Var::Long(3),
        Var::Double(1.5),
        Var::from("H"),
        Var::Error(VResult::BadVarType),
    ];
    assert_eq!(
        serde_json::to_value(&row).unwrap(),
        json!([null, 3, 1.5, "H", "VR_BADVARTYPE"])
    );
}

#[test]
fn kind_and_code_names() {
    assert_eq!(VarKind::Double.to_string(), "TT_DOUBLE");
    assert_eq!(VResult::Ok.name(), "VR_OK");
    assert_eq!(VResult::InvalidCol.code(), -5);
}

// ============================================================================
// Dynamic conversion from JSON
// ============================================================================

#[test]
fn json_scalars_convert() {
    assert_eq!(Var::try_from(json!(42)).unwrap(), Var::Long(42));
    assert_eq!(Var::try_from(json!(2.5)).unwrap(), Var::Double(2.5));
    assert_eq!(Var::try_from(json!("O")).unwrap(), Var::from("O"));
    assert_eq!(Var::try_from(json!(null)).unwrap(), Var::Empty);
}

#[test]
fn json_integer_checked_before_float() {
    assert_eq!(Var::try_from(json!(-7)).unwrap().kind(), VarKind::Long);
    assert_eq!(Var::try_from(json!(-7.0)).unwrap().kind(), VarKind::Double);
}

#[test]
fn json_non_scalars_are_type_mismatch() {
    for value in [json!(true), json!([1, 2]), json!({"a": 1})] {
        let err = Var::try_from(&value).unwrap_err();
        assert!(
            matches!(err, PhreeqcError::TypeMismatch(_)),
            "{} should be rejected, got {:?}",
            value,
            err
        );
    }
}

// ============================================================================
// Raw C VAR decoding
// ============================================================================

fn raw(kind: VarKind, payload: RawVarPayload) -> RawVar {
    RawVar {
        kind: kind as c_int,
        payload,
    }
}

#[test]
fn raw_empty_decodes() {
    let var = unsafe { RawVar::empty().decode() }.unwrap();
    assert_eq!(var, Var::Empty);
}

#[test]
fn raw_scalars_decode() {
    let long = raw(VarKind::Long, RawVarPayload { l_val: 42 });
    let double = raw(VarKind::Double, RawVarPayload { d_val: 55.5 });
    let error = raw(
        VarKind::Error,
        RawVarPayload {
            vresult: VResult::InvalidRow.code(),
        },
    );
    unsafe {
        assert_eq!(long.decode().unwrap(), Var::Long(42));
        assert_eq!(double.decode().unwrap(), Var::Double(55.5));
        assert_eq!(error.decode().unwrap(), Var::Error(VResult::InvalidRow));
    }
}

#[test]
fn raw_string_is_copied() {
    let text = CString::new("Hello World").unwrap();
    let var = raw(
        VarKind::String,
        RawVarPayload {
            s_val: text.as_ptr() as *mut _,
        },
    );
    let decoded = unsafe { var.decode() }.unwrap();
    drop(text);
    assert_eq!(decoded, Var::from("Hello World"));
}

#[test]
fn raw_null_string_decodes_empty_text() {
    let var = raw(
        VarKind::String,
        RawVarPayload {
            s_val: std::ptr::null_mut(),
        },
    );
    assert_eq!(unsafe { var.decode() }.unwrap(), Var::from(""));
}

#[test]
fn raw_unknown_kind_is_invalid_state() {
    let var = RawVar {
        kind: 9,
        payload: RawVarPayload { l_val: 0 },
    };
    let err = unsafe { var.decode() }.unwrap_err();
    assert!(matches!(err, PhreeqcError::InvalidState(_)), "got {:?}", err);
}

#[test]
fn raw_unknown_result_code_is_invalid_state() {
    let var = raw(VarKind::Error, RawVarPayload { vresult: 17 });
    let err = unsafe { var.decode() }.unwrap_err();
    assert!(matches!(err, PhreeqcError::InvalidState(_)), "got {:?}", err);
}

#[test]
fn kind_tags_match_engine_numbering() {
    for (tag, kind) in [
        (0, VarKind::Empty),
        (1, VarKind::Error),
        (2, VarKind::Long),
        (3, VarKind::Double),
        (4, VarKind::String),
    ] {
        assert_eq!(VarKind::try_from(tag).unwrap(), kind);
    }
    assert!(VarKind::try_from(5).is_err());
}
