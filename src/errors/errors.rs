use std::fmt::Display;

use thiserror::Error;

use crate::Position;

#[derive(Debug, Clone)]
pub struct Error {
    internal_error: ErrorImpl,
    position: Position,
}

/// Compilation phase an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPhase {
    Lex,
    Parse,
    Resolve,
    Type,
    ControlFlow,
    Io,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        Error {
            internal_error: error_impl,
            position,
        }
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn get_impl(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn get_message(&self) -> String {
        self.internal_error.to_string()
    }

    pub fn phase(&self) -> ErrorPhase {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. }
            | ErrorImpl::InvalidIntegralSuffix { .. }
            | ErrorImpl::InvalidFloatSuffix { .. }
            | ErrorImpl::IntegerOutOfRange { .. }
            | ErrorImpl::InvalidFloat { .. }
            | ErrorImpl::UnterminatedComment
            | ErrorImpl::UnknownDirective { .. }
            | ErrorImpl::MissingDirectiveValue { .. } => ErrorPhase::Lex,

            ErrorImpl::UnexpectedToken { .. }
            | ErrorImpl::UnexpectedTokenDetailed { .. }
            | ErrorImpl::ExpectedNamedArgument
            | ErrorImpl::InvalidModuleName { .. } => ErrorPhase::Parse,

            ErrorImpl::VariableNotDeclared { .. }
            | ErrorImpl::UnknownFunction { .. }
            | ErrorImpl::UnknownModule { .. }
            | ErrorImpl::UnknownType { .. }
            | ErrorImpl::UnknownMember { .. }
            | ErrorImpl::UnknownNamedParameter { .. }
            | ErrorImpl::FunctionAlreadyDeclared { .. }
            | ErrorImpl::GlobalAlreadyDeclared { .. }
            | ErrorImpl::StructAlreadyDeclared { .. }
            | ErrorImpl::PrivateAccess { .. }
            | ErrorImpl::CircularDependency { .. } => ErrorPhase::Resolve,

            ErrorImpl::TypeMatchError { .. }
            | ErrorImpl::NoMatchingOverload { .. }
            | ErrorImpl::AmbiguousCall { .. }
            | ErrorImpl::UndeterminedType
            | ErrorImpl::ExpectedConstantExpression
            | ErrorImpl::AssignToParameter { .. }
            | ErrorImpl::AssignToConstant { .. } => ErrorPhase::Type,

            ErrorImpl::UnreachableCode
            | ErrorImpl::UnreachableAfterIf
            | ErrorImpl::ExpectedReturn
            | ErrorImpl::ExpectedReturnAfterIf
            | ErrorImpl::NoLoopToBreak
            | ErrorImpl::NoLoopToContinue
            | ErrorImpl::DroppingIfWithoutElse
            | ErrorImpl::ExpectedDrop => ErrorPhase::ControlFlow,

            ErrorImpl::FileReadError { .. } | ErrorImpl::ArtifactError { .. } => ErrorPhase::Io,
        }
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => "UnrecognisedToken",
            ErrorImpl::InvalidIntegralSuffix { .. } => "InvalidIntegralSuffix",
            ErrorImpl::InvalidFloatSuffix { .. } => "InvalidFloatSuffix",
            ErrorImpl::IntegerOutOfRange { .. } => "IntegerOutOfRange",
            ErrorImpl::InvalidFloat { .. } => "InvalidFloat",
            ErrorImpl::UnterminatedComment => "UnterminatedComment",
            ErrorImpl::UnknownDirective { .. } => "UnknownDirective",
            ErrorImpl::MissingDirectiveValue { .. } => "MissingDirectiveValue",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::UnexpectedTokenDetailed { .. } => "UnexpectedTokenDetailed",
            ErrorImpl::ExpectedNamedArgument => "ExpectedNamedArgument",
            ErrorImpl::InvalidModuleName { .. } => "InvalidModuleName",
            ErrorImpl::VariableNotDeclared { .. } => "VariableNotDeclared",
            ErrorImpl::UnknownFunction { .. } => "UnknownFunction",
            ErrorImpl::UnknownModule { .. } => "UnknownModule",
            ErrorImpl::UnknownType { .. } => "UnknownType",
            ErrorImpl::UnknownMember { .. } => "UnknownMember",
            ErrorImpl::UnknownNamedParameter { .. } => "UnknownNamedParameter",
            ErrorImpl::FunctionAlreadyDeclared { .. } => "FunctionAlreadyDeclared",
            ErrorImpl::GlobalAlreadyDeclared { .. } => "GlobalAlreadyDeclared",
            ErrorImpl::StructAlreadyDeclared { .. } => "StructAlreadyDeclared",
            ErrorImpl::PrivateAccess { .. } => "PrivateAccess",
            ErrorImpl::CircularDependency { .. } => "CircularDependency",
            ErrorImpl::TypeMatchError { .. } => "TypeMatchError",
            ErrorImpl::NoMatchingOverload { .. } => "NoMatchingOverload",
            ErrorImpl::AmbiguousCall { .. } => "AmbiguousCall",
            ErrorImpl::UndeterminedType => "UndeterminedType",
            ErrorImpl::ExpectedConstantExpression => "ExpectedConstantExpression",
            ErrorImpl::AssignToParameter { .. } => "AssignToParameter",
            ErrorImpl::AssignToConstant { .. } => "AssignToConstant",
            ErrorImpl::UnreachableCode => "UnreachableCode",
            ErrorImpl::UnreachableAfterIf => "UnreachableAfterIf",
            ErrorImpl::ExpectedReturn => "ExpectedReturn",
            ErrorImpl::ExpectedReturnAfterIf => "ExpectedReturnAfterIf",
            ErrorImpl::NoLoopToBreak => "NoLoopToBreak",
            ErrorImpl::NoLoopToContinue => "NoLoopToContinue",
            ErrorImpl::DroppingIfWithoutElse => "DroppingIfWithoutElse",
            ErrorImpl::ExpectedDrop => "ExpectedDrop",
            ErrorImpl::FileReadError { .. } => "FileReadError",
            ErrorImpl::ArtifactError { .. } => "ArtifactError",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => ErrorTip::None,
            ErrorImpl::InvalidIntegralSuffix { suffix } => ErrorTip::Suggestion(format!(
                "`{}` is not an integer suffix, expected one of i8 i16 i32 i64 i u8 u16 u32 u64 u",
                suffix
            )),
            ErrorImpl::InvalidFloatSuffix { suffix } => ErrorTip::Suggestion(format!(
                "`{}` is not a float suffix, expected one of f32 f64 f",
                suffix
            )),
            ErrorImpl::IntegerOutOfRange { literal } => ErrorTip::Suggestion(format!(
                "Invalid number: `{}`, is it above the limit of its type?",
                literal
            )),
            ErrorImpl::UnexpectedToken { token } => ErrorTip::Suggestion(format!(
                "Unexpected token: `{}`, did you miss a newline or `;`?",
                token
            )),
            ErrorImpl::UnexpectedTokenDetailed { token, message } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`, {}", token, message))
            }
            ErrorImpl::ExpectedNamedArgument => ErrorTip::Suggestion(String::from(
                "Once an argument is named, every following argument must be named too",
            )),
            ErrorImpl::VariableNotDeclared { variable } => {
                ErrorTip::Suggestion(format!("Variable `{}` not declared", variable))
            }
            ErrorImpl::UnknownFunction { function, arity } => ErrorTip::Suggestion(format!(
                "No function `{}` taking {} positional arguments is visible here",
                function, arity
            )),
            ErrorImpl::PrivateAccess { name } => ErrorTip::Suggestion(format!(
                "Mark `{}` as `pub` to use it from another module",
                name
            )),
            ErrorImpl::NoMatchingOverload { function, arguments } => ErrorTip::Suggestion(
                format!("No overload of `{}` accepts ({})", function, arguments),
            ),
            ErrorImpl::AmbiguousCall { function } => ErrorTip::Suggestion(format!(
                "Several overloads of `{}` match equally well, add a type annotation or suffix",
                function
            )),
            ErrorImpl::UndeterminedType => ErrorTip::Suggestion(String::from(
                "Add a type annotation so the type can be determined",
            )),
            ErrorImpl::TypeMatchError { expected, received } => ErrorTip::Suggestion(format!(
                "Expected type `{}`, received `{}`",
                expected, received
            )),
            ErrorImpl::ExpectedReturnAfterIf => ErrorTip::Suggestion(String::from(
                "Add an `else` branch that returns a value",
            )),
            ErrorImpl::DroppingIfWithoutElse => ErrorTip::Suggestion(String::from(
                "An `if` used as a value needs an `else` branch",
            )),
            _ => ErrorTip::None,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.position, self.internal_error)
    }
}

impl std::error::Error for Error {}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    // Lexing
    #[error("unrecognised token: {token:?}")]
    UnrecognisedToken { token: String },
    #[error("Invalid integral suffix {suffix:?}")]
    InvalidIntegralSuffix { suffix: String },
    #[error("Invalid fp suffix {suffix:?}")]
    InvalidFloatSuffix { suffix: String },
    #[error("Out of integer range: {literal:?}")]
    IntegerOutOfRange { literal: String },
    #[error("Invalid float: {literal:?}")]
    InvalidFloat { literal: String },
    #[error("Unterminated block comment")]
    UnterminatedComment,
    #[error("unknown directive #{directive}")]
    UnknownDirective { directive: String },
    #[error("directive #{directive} needs a value")]
    MissingDirectiveValue { directive: String },

    // Parsing
    #[error("unexpected token: {token:?}")]
    UnexpectedToken { token: String },
    #[error("unexpected token ({message}): {token:?}")]
    UnexpectedTokenDetailed { token: String, message: String },
    #[error("Must be named parameters to the end")]
    ExpectedNamedArgument,
    #[error("{name:?} is not a valid module name")]
    InvalidModuleName { name: String },

    // Resolution
    #[error("variable {variable:?} not declared")]
    VariableNotDeclared { variable: String },
    #[error("no function {function:?} with {arity} arguments")]
    UnknownFunction { function: String, arity: usize },
    #[error("Module could not be found: {module:?}")]
    UnknownModule { module: String },
    #[error("unknown type {type_} found")]
    UnknownType { type_: String },
    #[error("type {type_} has no member {member:?}")]
    UnknownMember { member: String, type_: String },
    #[error("function {function:?} has no named parameter {name:?}")]
    UnknownNamedParameter { function: String, name: String },
    #[error("function {function:?} already declared")]
    FunctionAlreadyDeclared { function: String },
    #[error("global {global:?} already declared")]
    GlobalAlreadyDeclared { global: String },
    #[error("struct {name:?} already declared")]
    StructAlreadyDeclared { name: String },
    #[error("{name:?} is not public")]
    PrivateAccess { name: String },
    #[error("Circular dependency on module {module:?}")]
    CircularDependency { module: String },

    // Types
    #[error("types do not match: expected {expected}, received {received}")]
    TypeMatchError { expected: String, received: String },
    #[error("no matching overload for {function:?} with arguments ({arguments})")]
    NoMatchingOverload { function: String, arguments: String },
    #[error("ambiguous call to {function:?}")]
    AmbiguousCall { function: String },
    #[error("Type could not be determined")]
    UndeterminedType,
    #[error("Expected constant expression")]
    ExpectedConstantExpression,
    #[error("cannot assign to parameter {variable:?}")]
    AssignToParameter { variable: String },
    #[error("cannot assign to constant {variable:?}")]
    AssignToConstant { variable: String },

    // Control flow
    #[error("Unreachable code")]
    UnreachableCode,
    #[error("Unreachable code after if")]
    UnreachableAfterIf,
    #[error("Expected return")]
    ExpectedReturn,
    #[error("Expected return after if")]
    ExpectedReturnAfterIf,
    #[error("No loop to break out of")]
    NoLoopToBreak,
    #[error("No loop to continue")]
    NoLoopToContinue,
    #[error("dropping if must have an else")]
    DroppingIfWithoutElse,
    #[error("expected drop from block")]
    ExpectedDrop,

    // Files
    #[error("could not read {path:?}: {message}")]
    FileReadError { path: String, message: String },
    #[error("invalid build artifact: {message}")]
    ArtifactError { message: String },
}
