//! Runtime semantics of the binary operators. The bound operator record
//! picks the arithmetic domain; `any` operands re-run the choice against the
//! live values, where a string beats a double beats an int.

use crate::error::RuntimeError;
use crate::ops::{BinOp, BinaryOperator};
use crate::symbol::Type;
use crate::value::Value;

use super::Result;

pub fn apply(op: &BinaryOperator, lhs: Value, rhs: Value) -> Result<Value> {
  match op.op {
    BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div => arithmetic(op, lhs, rhs),
    BinOp::Eq => Ok(Value::Bool(equals(&lhs, &rhs))),
    BinOp::Neq => Ok(Value::Bool(!equals(&lhs, &rhs))),
    BinOp::Less | BinOp::LessEq | BinOp::More | BinOp::MoreEq => compare(op.op, lhs, rhs),
    BinOp::And | BinOp::Or => logical(op.op, lhs, rhs),
  }
}

fn arithmetic(op: &BinaryOperator, lhs: Value, rhs: Value) -> Result<Value> {
  match &op.result {
    Type::String => Ok(Value::str(format!("{lhs}{rhs}"))),
    Type::Double => double_arithmetic(op.op, number(&lhs)?, number(&rhs)?),
    Type::Int => int_arithmetic(op.op, int(&lhs)?, int(&rhs)?),
    Type::Any => {
      let string = matches!(lhs, Value::Str(_)) || matches!(rhs, Value::Str(_));
      let double = matches!(lhs, Value::Double(_)) || matches!(rhs, Value::Double(_));
      if string && op.op == BinOp::Add {
        Ok(Value::str(format!("{lhs}{rhs}")))
      } else if let (Value::Int(l), Value::Int(r)) = (&lhs, &rhs) {
        int_arithmetic(op.op, *l, *r)
      } else if double {
        double_arithmetic(op.op, number(&lhs)?, number(&rhs)?)
      } else {
        Err(RuntimeError::new(format!(
          "binary operator `{}` is not defined for {} and {}",
          op.op.name(),
          lhs.type_name(),
          rhs.type_name()
        )))
      }
    }
    _ => Err(RuntimeError::new(format!(
      "binary operator `{}` is not defined for {} and {}",
      op.op.name(),
      lhs.type_name(),
      rhs.type_name()
    ))),
  }
}

fn int_arithmetic(op: BinOp, lhs: i64, rhs: i64) -> Result<Value> {
  let v = match op {
    BinOp::Add => lhs.wrapping_add(rhs),
    BinOp::Sub => lhs.wrapping_sub(rhs),
    BinOp::Mul => lhs.wrapping_mul(rhs),
    BinOp::Div => {
      if rhs == 0 {
        return Err(RuntimeError::new("division by zero"));
      }
      lhs.wrapping_div(rhs)
    }
    _ => unreachable!("not an arithmetic operator"),
  };
  Ok(Value::Int(v))
}

fn double_arithmetic(op: BinOp, lhs: f64, rhs: f64) -> Result<Value> {
  let v = match op {
    BinOp::Add => lhs + rhs,
    BinOp::Sub => lhs - rhs,
    BinOp::Mul => lhs * rhs,
    BinOp::Div => lhs / rhs,
    _ => unreachable!("not an arithmetic operator"),
  };
  Ok(Value::Double(v))
}

/// Numbers compare with an epsilon tolerance; everything else structurally.
pub fn equals(lhs: &Value, rhs: &Value) -> bool {
  match (lhs.as_number(), rhs.as_number()) {
    (Some(l), Some(r)) => (l - r).abs() < f64::EPSILON,
    _ => lhs == rhs,
  }
}

fn compare(op: BinOp, lhs: Value, rhs: Value) -> Result<Value> {
  let l = number(&lhs)?;
  let r = number(&rhs)?;
  let v = match op {
    BinOp::Less => l < r,
    BinOp::LessEq => l <= r,
    BinOp::More => l > r,
    BinOp::MoreEq => l >= r,
    _ => unreachable!("not a comparison operator"),
  };
  Ok(Value::Bool(v))
}

fn logical(op: BinOp, lhs: Value, rhs: Value) -> Result<Value> {
  let l = truthy(&lhs)?;
  let r = truthy(&rhs)?;
  let v = match op {
    BinOp::And => l && r,
    BinOp::Or => l || r,
    _ => unreachable!("not a logical operator"),
  };
  Ok(Value::Bool(v))
}

fn number(v: &Value) -> Result<f64> {
  v.as_number()
    .ok_or_else(|| RuntimeError::new(format!("expected a number, got {}", v.type_name())))
}

fn int(v: &Value) -> Result<i64> {
  v.as_int()
    .ok_or_else(|| RuntimeError::new(format!("expected an int, got {}", v.type_name())))
}

fn truthy(v: &Value) -> Result<bool> {
  v.to_bool()
    .ok_or_else(|| RuntimeError::new(format!("expected a boolean, got {}", v.type_name())))
}
