//! Compile-time evaluation of global initialisers and named-parameter defaults.
//!
//! Only literals and built-in operators may appear. Integers are evaluated in
//! `i128` and checked against the target type once the result is converted.

use crate::{
    ast::{
        expressions::{Expr, Literal, TokKind},
        types::{Prim, Type, Value},
    },
    errors::errors::ErrorImpl,
};

fn not_constant() -> ErrorImpl {
    ErrorImpl::ExpectedConstantExpression
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Bool(_) => "Bool",
        Value::Int(_) => "integer literal",
        Value::Float(_) => "float literal",
        Value::Struct(_) => "struct",
    }
}

/// Evaluates `expr` to a value, without a target type yet.
pub fn eval(expr: &Expr) -> Result<Value, ErrorImpl> {
    let mut stack: Vec<Value> = vec![];

    for tok in &expr.toks {
        let value = match &tok.kind {
            TokKind::Literal(Literal::Bool(value)) => Value::Bool(*value),
            TokKind::Literal(Literal::Int(value)) => Value::Int(*value as i128),
            TokKind::Literal(Literal::Float(value)) => Value::Float(*value),
            TokKind::Call(call) if call.is_operator && call.arity == 1 => {
                let operand = stack.pop().ok_or_else(not_constant)?;
                eval_unary(&call.name, operand)?
            }
            TokKind::Call(call) if call.is_operator && call.arity == 2 => {
                let right = stack.pop().ok_or_else(not_constant)?;
                let left = stack.pop().ok_or_else(not_constant)?;
                eval_binary(&call.name, left, right)?
            }
            _ => return Err(not_constant()),
        };

        stack.push(value);
    }

    match (stack.pop(), stack.is_empty()) {
        (Some(value), true) => Ok(value),
        _ => Err(not_constant()),
    }
}

fn eval_unary(op: &str, operand: Value) -> Result<Value, ErrorImpl> {
    Ok(match (op, operand) {
        ("!", Value::Bool(value)) => Value::Bool(!value),
        ("-", Value::Int(value)) => Value::Int(-value),
        ("-", Value::Float(value)) => Value::Float(-value),
        ("/", Value::Int(value)) => Value::Int(1i128.checked_div(value).ok_or_else(not_constant)?),
        ("/", Value::Float(value)) => Value::Float(1.0 / value),
        _ => return Err(not_constant()),
    })
}

fn eval_binary(op: &str, left: Value, right: Value) -> Result<Value, ErrorImpl> {
    match (left, right) {
        (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(match op {
            "==" => a == b,
            "!=" | "^" => a != b,
            "&&" | "&" => a && b,
            "||" | "|" => a || b,
            _ => return Err(not_constant()),
        })),
        (Value::Int(a), Value::Int(b)) => eval_int(op, a, b),
        (Value::Float(a), Value::Float(b)) => eval_float(op, a, b),
        (Value::Int(a), Value::Float(b)) => eval_float(op, a as f64, b),
        (Value::Float(a), Value::Int(b)) => eval_float(op, a, b as f64),
        _ => Err(not_constant()),
    }
}

fn eval_int(op: &str, a: i128, b: i128) -> Result<Value, ErrorImpl> {
    let int = |value: Option<i128>| value.map(Value::Int).ok_or_else(not_constant);

    match op {
        "+" => int(a.checked_add(b)),
        "-" => int(a.checked_sub(b)),
        "*" => int(a.checked_mul(b)),
        "/" => int(a.checked_div(b)),
        "%" => int(a.checked_rem(b)),
        "&" => Ok(Value::Int(a & b)),
        "|" => Ok(Value::Int(a | b)),
        "^" => Ok(Value::Int(a ^ b)),
        "<<" => int(u32::try_from(b).ok().and_then(|shift| a.checked_shl(shift))),
        ">>" => int(u32::try_from(b).ok().and_then(|shift| a.checked_shr(shift))),
        "==" => Ok(Value::Bool(a == b)),
        "!=" => Ok(Value::Bool(a != b)),
        "<" => Ok(Value::Bool(a < b)),
        "<=" => Ok(Value::Bool(a <= b)),
        ">" => Ok(Value::Bool(a > b)),
        ">=" => Ok(Value::Bool(a >= b)),
        _ => Err(not_constant()),
    }
}

fn eval_float(op: &str, a: f64, b: f64) -> Result<Value, ErrorImpl> {
    Ok(match op {
        "+" => Value::Float(a + b),
        "-" => Value::Float(a - b),
        "*" => Value::Float(a * b),
        "/" => Value::Float(a / b),
        "%" => Value::Float(a % b),
        "==" => Value::Bool(a == b),
        "!=" => Value::Bool(a != b),
        "<" => Value::Bool(a < b),
        "<=" => Value::Bool(a <= b),
        ">" => Value::Bool(a > b),
        ">=" => Value::Bool(a >= b),
        _ => return Err(not_constant()),
    })
}

/// Whether `value` is representable in the integer type `prim`.
pub fn fits(value: i128, prim: Prim) -> bool {
    let width = prim.width();
    if prim.is_signed() {
        let max = (1i128 << (width - 1)) - 1;
        value >= -max - 1 && value <= max
    } else {
        value >= 0 && value < (1i128 << width)
    }
}

/// Type a constant gets when nothing was declared.
pub fn default_type(value: &Value) -> Type {
    match value {
        Value::Bool(_) => Type::bool(),
        Value::Float(_) => Type::from(Prim::F64),
        _ => Type::from(Prim::I32),
    }
}

/// Converts an evaluated constant to the declared type.
pub fn convert(value: Value, ty: &Type) -> Result<Value, ErrorImpl> {
    let mismatch = |value: &Value| ErrorImpl::TypeMatchError {
        expected: ty.to_string(),
        received: type_name(value).to_string(),
    };

    let Some(prim) = ty.prim() else {
        return Err(mismatch(&value));
    };

    match value {
        Value::Bool(_) if prim == Prim::Bool => Ok(value),
        Value::Int(int) if prim.is_int() => {
            if fits(int, prim) {
                Ok(value)
            } else {
                Err(ErrorImpl::IntegerOutOfRange {
                    literal: int.to_string(),
                })
            }
        }
        Value::Int(int) if prim.is_float() => Ok(Value::Float(int as f64)),
        Value::Float(_) if prim.is_float() => Ok(value),
        other => Err(mismatch(&other)),
    }
}

/// Evaluates `expr` and converts it to `ty`, or to its default type.
pub fn eval_as(expr: &Expr, ty: Option<&Type>) -> Result<(Value, Type), ErrorImpl> {
    let value = eval(expr)?;
    let ty = ty.cloned().unwrap_or_else(|| default_type(&value));
    let value = convert(value, &ty)?;

    Ok((value, ty))
}
