//! The operator and conversion tables. All type casework for operators
//! lives here; the binder only asks questions.

use syntax::ast;

use crate::symbol::Type;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
  Add,
  Sub,
  Mul,
  Div,
  Eq,
  Neq,
  Less,
  LessEq,
  More,
  MoreEq,
  And,
  Or,
}

impl BinOp {
  pub fn name(&self) -> &'static str {
    match self {
      BinOp::Add => "+",
      BinOp::Sub => "-",
      BinOp::Mul => "*",
      BinOp::Div => "/",
      BinOp::Eq => "==",
      BinOp::Neq => "!=",
      BinOp::Less => "<",
      BinOp::LessEq => "<=",
      BinOp::More => ">",
      BinOp::MoreEq => ">=",
      BinOp::And => "&&",
      BinOp::Or => "||",
    }
  }
}

impl From<ast::BinaryOp> for BinOp {
  fn from(op: ast::BinaryOp) -> Self {
    match op {
      ast::BinaryOp::Add => BinOp::Add,
      ast::BinaryOp::Sub => BinOp::Sub,
      ast::BinaryOp::Mul => BinOp::Mul,
      ast::BinaryOp::Div => BinOp::Div,
      ast::BinaryOp::Eq => BinOp::Eq,
      ast::BinaryOp::Neq => BinOp::Neq,
      ast::BinaryOp::Less => BinOp::Less,
      ast::BinaryOp::LessEq => BinOp::LessEq,
      ast::BinaryOp::More => BinOp::More,
      ast::BinaryOp::MoreEq => BinOp::MoreEq,
      ast::BinaryOp::And => BinOp::And,
      ast::BinaryOp::Or => BinOp::Or,
    }
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnOp {
  Identity,
  Negate,
  Not,
  Inc,
  Dec,
}

impl UnOp {
  pub fn name(&self) -> &'static str {
    match self {
      UnOp::Identity => "+",
      UnOp::Negate => "-",
      UnOp::Not => "!",
      UnOp::Inc => "++",
      UnOp::Dec => "--",
    }
  }
}

/// A binary operator resolved against its operand types.
#[derive(Clone, Debug)]
pub struct BinaryOperator {
  pub op: BinOp,
  pub left: Type,
  pub right: Type,
  pub result: Type,
}

/// A unary operator resolved against its operand type.
#[derive(Clone, Debug)]
pub struct UnaryOperator {
  pub op: UnOp,
  pub operand: Type,
  pub result: Type,
}

/// Resolve a binary operator for `(left, right)`, or `None` if the operator
/// is not defined for those types.
///
/// An `error` operand resolves to an `error` result without complaint, so a
/// single bad subexpression does not cascade into follow-up diagnostics.
pub fn bind_binary(op: BinOp, left: &Type, right: &Type) -> Option<BinaryOperator> {
  if left.contains_error() || right.contains_error() {
    return Some(operator(op, left, right, Type::Error));
  }

  let result = match op {
    BinOp::And | BinOp::Or => {
      if !matches!(left, Type::Bool | Type::Any) || !matches!(right, Type::Bool | Type::Any) {
        return None;
      }
      Type::Bool
    }
    BinOp::Eq | BinOp::Neq => {
      let same = left == right;
      let numeric = left.is_numeric() && right.is_numeric();
      if !same && !numeric && !left.is_any() && !right.is_any() {
        return None;
      }
      Type::Bool
    }
    BinOp::Less | BinOp::LessEq | BinOp::More | BinOp::MoreEq => {
      let numeric = left.is_numeric() && right.is_numeric();
      if !numeric && !left.is_any() && !right.is_any() {
        return None;
      }
      Type::Bool
    }
    // `+` with a string on either side concatenates
    BinOp::Add if matches!(left, Type::String) || matches!(right, Type::String) => Type::String,
    BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div => {
      if left.is_numeric() && right.is_numeric() {
        if matches!(left, Type::Double) || matches!(right, Type::Double) {
          Type::Double
        } else {
          Type::Int
        }
      } else if left.is_any() || right.is_any() {
        Type::Any
      } else {
        return None;
      }
    }
  };

  Some(operator(op, left, right, result))
}

fn operator(op: BinOp, left: &Type, right: &Type, result: Type) -> BinaryOperator {
  BinaryOperator {
    op,
    left: left.clone(),
    right: right.clone(),
    result,
  }
}

/// Resolve a unary operator for `operand`, or `None` if undefined.
pub fn bind_unary(op: UnOp, operand: &Type) -> Option<UnaryOperator> {
  if operand.contains_error() {
    return Some(UnaryOperator {
      op,
      operand: operand.clone(),
      result: Type::Error,
    });
  }

  let defined = match op {
    UnOp::Identity | UnOp::Negate | UnOp::Inc | UnOp::Dec => {
      operand.is_numeric() || operand.is_any()
    }
    UnOp::Not => matches!(operand, Type::Bool | Type::Any),
  };

  defined.then(|| UnaryOperator {
    op,
    operand: operand.clone(),
    result: operand.clone(),
  })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Conversion {
  Identity,
  Implicit,
  /// Only available through the `typename(expr)` call form.
  Explicit,
}

/// Whether a value of type `from` converts to `to`, and how.
pub fn classify(from: &Type, to: &Type) -> Option<Conversion> {
  if from.contains_error() || to.contains_error() {
    return Some(Conversion::Identity);
  }
  if from == to {
    return Some(Conversion::Identity);
  }
  if matches!(from, Type::Void) || matches!(to, Type::Void) {
    return None;
  }
  if from.is_any() || to.is_any() {
    return Some(Conversion::Implicit);
  }
  match (from, to) {
    (Type::Int | Type::Double, Type::Bool) => Some(Conversion::Implicit),
    (Type::Int, Type::Double) => Some(Conversion::Implicit),
    (Type::String, Type::Int) => Some(Conversion::Explicit),
    // gradual array conversion: an `any` element type on either side defers
    // the element check to runtime use sites
    (Type::Array(from), Type::Array(to)) if gradual(from, to) => Some(Conversion::Implicit),
    _ => None,
  }
}

fn gradual(from: &Type, to: &Type) -> bool {
  from.is_any()
    || to.is_any()
    || match (from, to) {
      (Type::Array(from), Type::Array(to)) => gradual(from, to),
      _ => false,
    }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn arithmetic_widens_to_double_iff_a_double_operand() {
    for op in [BinOp::Add, BinOp::Sub, BinOp::Mul, BinOp::Div] {
      let int = bind_binary(op, &Type::Int, &Type::Int).unwrap();
      assert_eq!(int.result, Type::Int);
      let left = bind_binary(op, &Type::Double, &Type::Int).unwrap();
      assert_eq!(left.result, Type::Double);
      let right = bind_binary(op, &Type::Int, &Type::Double).unwrap();
      assert_eq!(right.result, Type::Double);
      let both = bind_binary(op, &Type::Double, &Type::Double).unwrap();
      assert_eq!(both.result, Type::Double);
    }
  }

  #[test]
  fn string_concatenation_wins_over_arithmetic() {
    let op = bind_binary(BinOp::Add, &Type::String, &Type::Int).unwrap();
    assert_eq!(op.result, Type::String);
    let op = bind_binary(BinOp::Add, &Type::Double, &Type::String).unwrap();
    assert_eq!(op.result, Type::String);
    // but only `+` concatenates
    assert!(bind_binary(BinOp::Sub, &Type::String, &Type::Int).is_none());
  }

  #[test]
  fn any_defers_arithmetic_to_runtime() {
    let op = bind_binary(BinOp::Mul, &Type::Any, &Type::Int).unwrap();
    assert_eq!(op.result, Type::Any);
    let op = bind_binary(BinOp::Eq, &Type::Any, &Type::String).unwrap();
    assert_eq!(op.result, Type::Bool);
  }

  #[test]
  fn equality_requires_compatible_operands() {
    assert_eq!(
      bind_binary(BinOp::Eq, &Type::String, &Type::String).unwrap().result,
      Type::Bool
    );
    assert_eq!(
      bind_binary(BinOp::Neq, &Type::Int, &Type::Double).unwrap().result,
      Type::Bool
    );
    assert!(bind_binary(BinOp::Eq, &Type::String, &Type::Int).is_none());
    assert!(bind_binary(BinOp::Less, &Type::String, &Type::String).is_none());
  }

  #[test]
  fn logic_is_bool_or_any_only() {
    assert!(bind_binary(BinOp::And, &Type::Bool, &Type::Bool).is_some());
    assert!(bind_binary(BinOp::Or, &Type::Any, &Type::Bool).is_some());
    assert!(bind_binary(BinOp::And, &Type::Int, &Type::Bool).is_none());
  }

  #[test]
  fn unary_table() {
    assert!(bind_unary(UnOp::Negate, &Type::Int).is_some());
    assert!(bind_unary(UnOp::Negate, &Type::String).is_none());
    assert!(bind_unary(UnOp::Not, &Type::Bool).is_some());
    assert!(bind_unary(UnOp::Not, &Type::Int).is_none());
    assert!(bind_unary(UnOp::Inc, &Type::Any).is_some());
    assert!(bind_unary(UnOp::Dec, &Type::Bool).is_none());
  }

  #[test]
  fn conversion_table() {
    use Conversion::*;
    assert_eq!(classify(&Type::Int, &Type::Int), Some(Identity));
    assert_eq!(classify(&Type::Int, &Type::Any), Some(Implicit));
    assert_eq!(classify(&Type::Any, &Type::Int), Some(Implicit));
    assert_eq!(classify(&Type::Int, &Type::Double), Some(Implicit));
    assert_eq!(classify(&Type::Double, &Type::Bool), Some(Implicit));
    assert_eq!(classify(&Type::String, &Type::Int), Some(Explicit));
    assert_eq!(classify(&Type::Double, &Type::Int), None);
    assert_eq!(classify(&Type::Int, &Type::String), None);
    assert_eq!(classify(&Type::Void, &Type::Any), None);
  }

  #[test]
  fn array_conversions_are_gradual() {
    let int_array = Type::parse("int[]").unwrap();
    let any_array = Type::parse("any[]").unwrap();
    let double_array = Type::parse("double[]").unwrap();
    assert_eq!(classify(&any_array, &int_array), Some(Conversion::Implicit));
    assert_eq!(classify(&int_array, &any_array), Some(Conversion::Implicit));
    assert_eq!(classify(&int_array, &double_array), None);
    assert_eq!(
      classify(&Type::parse("any[][]").unwrap(), &Type::parse("int[][]").unwrap()),
      Some(Conversion::Implicit)
    );
  }
}
