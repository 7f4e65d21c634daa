use std::cell::RefCell;
use std::fmt::{Debug, Display};
use std::rc::Rc;

/// A runtime value.
///
/// Lists are shared handles: every copy of a `List` value aliases the same
/// storage, so writing through one alias is visible through all of them.
#[derive(Clone)]
pub enum Value {
  Int(i64),
  Double(f64),
  Bool(bool),
  Str(Rc<str>),
  List(Rc<RefCell<Vec<Value>>>),
}

impl Value {
  pub fn str(s: impl Into<Rc<str>>) -> Self {
    Value::Str(s.into())
  }

  pub fn list(items: Vec<Value>) -> Self {
    Value::List(Rc::new(RefCell::new(items)))
  }

  pub fn type_name(&self) -> &'static str {
    match self {
      Value::Int(_) => "int",
      Value::Double(_) => "double",
      Value::Bool(_) => "bool",
      Value::Str(_) => "string",
      Value::List(_) => "array",
    }
  }

  pub fn as_int(&self) -> Option<i64> {
    match self {
      Value::Int(v) => Some(*v),
      _ => None,
    }
  }

  /// Numeric view of the value, widening ints.
  pub fn as_number(&self) -> Option<f64> {
    match self {
      Value::Int(v) => Some(*v as f64),
      Value::Double(v) => Some(*v),
      _ => None,
    }
  }

  /// Boolean view of the value; numbers coerce by `!= 0`.
  pub fn to_bool(&self) -> Option<bool> {
    match self {
      Value::Bool(v) => Some(*v),
      Value::Int(v) => Some(*v != 0),
      Value::Double(v) => Some(*v != 0.0),
      _ => None,
    }
  }
}

impl PartialEq for Value {
  fn eq(&self, other: &Self) -> bool {
    match (self, other) {
      (Value::Int(a), Value::Int(b)) => a == b,
      (Value::Double(a), Value::Double(b)) => a == b,
      (Value::Bool(a), Value::Bool(b)) => a == b,
      (Value::Str(a), Value::Str(b)) => a == b,
      (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow(),
      _ => false,
    }
  }
}

impl From<i64> for Value {
  fn from(value: i64) -> Self {
    Value::Int(value)
  }
}

impl From<f64> for Value {
  fn from(value: f64) -> Self {
    Value::Double(value)
  }
}

impl From<bool> for Value {
  fn from(value: bool) -> Self {
    Value::Bool(value)
  }
}

impl From<&str> for Value {
  fn from(value: &str) -> Self {
    Value::str(value)
  }
}

impl From<String> for Value {
  fn from(value: String) -> Self {
    Value::str(value)
  }
}

impl Display for Value {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Value::Int(v) => write!(f, "{v}"),
      Value::Double(v) => write!(f, "{v}"),
      Value::Bool(v) => write!(f, "{v}"),
      Value::Str(v) => write!(f, "{v}"),
      Value::List(items) => {
        write!(f, "[")?;
        for (i, item) in items.borrow().iter().enumerate() {
          if i > 0 {
            write!(f, ", ")?;
          }
          write!(f, "{item}")?;
        }
        write!(f, "]")
      }
    }
  }
}

impl Debug for Value {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Value::Int(v) => f.debug_tuple("Int").field(v).finish(),
      Value::Double(v) => f.debug_tuple("Double").field(v).finish(),
      Value::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
      Value::Str(v) => f.debug_tuple("Str").field(v).finish(),
      Value::List(items) => f.debug_tuple("List").field(&items.borrow()).finish(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn lists_are_shared() {
    let a = Value::list(vec![Value::Int(1), Value::Int(2)]);
    let b = a.clone();
    if let Value::List(items) = &a {
      items.borrow_mut()[0] = Value::Int(99);
    }
    assert_eq!(b.to_string(), "[99, 2]");
  }

  #[test]
  fn rendering() {
    assert_eq!(Value::Int(7).to_string(), "7");
    assert_eq!(Value::Double(1.5).to_string(), "1.5");
    assert_eq!(Value::Bool(true).to_string(), "true");
    assert_eq!(Value::str("hi").to_string(), "hi");
    let list = Value::list(vec![Value::Int(1), Value::str("x"), Value::Bool(false)]);
    assert_eq!(list.to_string(), "[1, x, false]");
  }

  #[test]
  fn structural_equality() {
    let a = Value::list(vec![Value::Int(1)]);
    let b = Value::list(vec![Value::Int(1)]);
    assert_eq!(a, b);
    let c = Value::list(vec![Value::Int(2)]);
    assert_ne!(a, c);
    assert_ne!(Value::Int(1), Value::str("1"));
  }
}
