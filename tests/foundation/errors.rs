//! Integration tests for error codes

use latent_foundation::{Error, ErrorContext, ErrorKind, ValueKind};

#[test]
fn every_kind_has_a_stable_code() {
    let cases = [
        (Error::syntax("expected ';'", "}", 1), "E_SYNTAX"),
        (Error::decode("bad", 3), "E_LC_DECODE"),
        (Error::handle_not_found("t", "ast:00"), "E_LS_NOT_FOUND"),
        (Error::unknown_table("t"), "E_LS_UNKNOWN_TABLE"),
        (Error::new(ErrorKind::Alias("x".into())), "E_LS_ALIAS"),
        (Error::new(ErrorKind::Scope("x".into())), "E_LS_SCOPE"),
        (Error::type_mismatch(ValueKind::Map, ValueKind::Int), "E_LS_TYPE"),
        (
            Error::new(ErrorKind::DuplicateAlias {
                name: "t".into(),
                line: 2,
            }),
            "E_LS_DUPLICATE_ALIAS",
        ),
        (
            Error::new(ErrorKind::UndeclaredTable {
                name: "t".into(),
                line: 2,
            }),
            "E_LS_UNDECLARED_TABLE",
        ),
        (
            Error::new(ErrorKind::MissingActiveTable {
                op: "collapse".into(),
                line: 2,
            }),
            "E_LS_MISSING_ACTIVE_TABLE",
        ),
        (
            Error::new(ErrorKind::OrderingViolation {
                name: "t".into(),
                line: 2,
            }),
            "E_LS_ORDERING",
        ),
    ];
    for (err, code) in cases {
        assert_eq!(err.code(), code, "{err}");
    }
}

#[test]
fn compile_errors_carry_lines() {
    assert_eq!(Error::syntax("x", "y", 9).kind.line(), Some(9));
    assert_eq!(Error::decode("x", 9).kind.line(), None);
}

#[test]
fn decode_error_message_names_offset() {
    let msg = Error::decode("trailing input", 12).to_string();
    assert!(msg.contains("12"), "{msg}");
}

#[test]
fn context_is_attached() {
    let err = Error::unknown_table("t").with_context(ErrorContext::new().with_source("p"));
    assert_eq!(err.context.and_then(|c| c.source).as_deref(), Some("p"));
}
