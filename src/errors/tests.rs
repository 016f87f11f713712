//! Unit tests for error handling.
//!
//! This module contains tests for error types and error reporting.

use crate::errors::errors::{Error, ErrorImpl, ErrorPhase, ErrorTip};
use crate::Position;
use std::rc::Rc;

fn position(line: u32, column: u32) -> Position {
    Position::new(line, column, Rc::new("test.eb".to_string()))
}

#[test]
fn test_error_creation() {
    let error = Error::new(
        ErrorImpl::UnrecognisedToken {
            token: "@".to_string(),
        },
        position(1, 10),
    );

    assert_eq!(error.get_error_name(), "UnrecognisedToken");
    assert_eq!(error.phase(), ErrorPhase::Lex);
}

#[test]
fn test_error_position() {
    let error = Error::new(
        ErrorImpl::UnexpectedToken {
            token: "identifier".to_string(),
        },
        position(4, 2),
    );

    assert_eq!(error.get_position().line, 4);
    assert_eq!(error.get_position().column, 2);
    assert_eq!(error.to_string(), "test.eb:4:2: unexpected token: \"identifier\"");
}

#[test]
fn test_type_mismatch_error() {
    let error = Error::new(
        ErrorImpl::TypeMatchError {
            expected: "I32".to_string(),
            received: "Bool".to_string(),
        },
        position(1, 1),
    );

    assert_eq!(error.get_error_name(), "TypeMatchError");
    assert_eq!(error.phase(), ErrorPhase::Type);

    match error.get_tip() {
        ErrorTip::Suggestion(tip) => assert!(tip.contains("I32") && tip.contains("Bool")),
        ErrorTip::None => panic!("expected a suggestion"),
    }
}

#[test]
fn test_control_flow_messages() {
    let error = Error::new(ErrorImpl::ExpectedReturnAfterIf, position(1, 1));
    assert_eq!(error.get_message(), "Expected return after if");
    assert_eq!(error.phase(), ErrorPhase::ControlFlow);

    let error = Error::new(ErrorImpl::NoLoopToBreak, position(1, 1));
    assert_eq!(error.get_message(), "No loop to break out of");
}

#[test]
fn test_resolution_phase() {
    let error = Error::new(
        ErrorImpl::CircularDependency {
            module: "a".to_string(),
        },
        position(1, 1),
    );

    assert_eq!(error.phase(), ErrorPhase::Resolve);
    assert!(matches!(error.get_tip(), ErrorTip::None));
}
