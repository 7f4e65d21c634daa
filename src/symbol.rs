use std::fmt::{self, Display};
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::rc::Rc;

/// A type known to the binder. `Any` is the gradual-typing escape hatch:
/// operators over it defer resolution to the runtime value. `Error` is the
/// type of expressions that failed to bind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Type {
  Int,
  Double,
  Bool,
  String,
  Void,
  Any,
  Error,
  Array(Box<Type>),
}

impl Type {
  /// Parse a type identifier, including any number of `[]` suffixes:
  /// `int[][]` is an array of arrays of int.
  pub fn parse(name: &str) -> Option<Type> {
    if let Some(element) = name.strip_suffix("[]") {
      return Type::parse(element).map(|ty| Type::Array(Box::new(ty)));
    }
    let ty = match name {
      "int" => Type::Int,
      "double" => Type::Double,
      "bool" => Type::Bool,
      "string" => Type::String,
      "void" => Type::Void,
      "any" => Type::Any,
      _ => return None,
    };
    Some(ty)
  }

  pub fn is_numeric(&self) -> bool {
    matches!(self, Type::Int | Type::Double)
  }

  pub fn is_any(&self) -> bool {
    matches!(self, Type::Any)
  }

  pub fn is_error(&self) -> bool {
    matches!(self, Type::Error)
  }

  /// True for `error` and for array types wrapping it. Operators and
  /// conversions pass these through silently so one bad subexpression does
  /// not cascade into follow-up diagnostics.
  pub fn contains_error(&self) -> bool {
    match self {
      Type::Error => true,
      Type::Array(element) => element.contains_error(),
      _ => false,
    }
  }

  /// The type obtained by indexing into this one. Indexing `any` yields
  /// `any`; anything else is not indexable.
  pub fn element(&self) -> Option<Type> {
    match self {
      Type::Array(element) => Some((**element).clone()),
      Type::Any | Type::Error => Some(self.clone()),
      _ => None,
    }
  }
}

impl Display for Type {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Type::Int => f.write_str("int"),
      Type::Double => f.write_str("double"),
      Type::Bool => f.write_str("bool"),
      Type::String => f.write_str("string"),
      Type::Void => f.write_str("void"),
      Type::Any => f.write_str("any"),
      Type::Error => f.write_str("error"),
      Type::Array(element) => write!(f, "{element}[]"),
    }
  }
}

#[derive(Clone, Debug)]
pub struct Param {
  pub name: String,
  pub ty: Type,
}

#[derive(Debug)]
pub struct FunctionSymbol {
  pub name: String,
  pub params: Vec<Param>,
  pub ret: Type,
}

/// A shared handle to a function symbol.
///
/// Equality and hashing go by identity, not by name, so a declaration that
/// shadows another stays a distinct key in the runtime dispatch table.
#[derive(Clone, Debug)]
pub struct Function(Rc<FunctionSymbol>);

impl Function {
  pub fn new(symbol: FunctionSymbol) -> Self {
    Function(Rc::new(symbol))
  }
}

impl Deref for Function {
  type Target = FunctionSymbol;

  fn deref(&self) -> &Self::Target {
    &self.0
  }
}

impl PartialEq for Function {
  fn eq(&self, other: &Self) -> bool {
    Rc::ptr_eq(&self.0, &other.0)
  }
}

impl Eq for Function {}

impl Hash for Function {
  fn hash<H: Hasher>(&self, state: &mut H) {
    Rc::as_ptr(&self.0).hash(state);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_array_types() {
    assert_eq!(Type::parse("int"), Some(Type::Int));
    assert_eq!(
      Type::parse("int[]"),
      Some(Type::Array(Box::new(Type::Int)))
    );
    assert_eq!(
      Type::parse("string[][]"),
      Some(Type::Array(Box::new(Type::Array(Box::new(Type::String)))))
    );
    assert_eq!(Type::parse("point"), None);
    assert_eq!(Type::parse("point[]"), None);
  }

  #[test]
  fn array_type_display_round_trips() {
    let ty = Type::parse("double[][]").unwrap();
    assert_eq!(ty.to_string(), "double[][]");
    assert_eq!(Type::parse(&ty.to_string()), Some(ty));
  }

  #[test]
  fn function_equality_is_identity() {
    let make = || {
      Function::new(FunctionSymbol {
        name: "f".into(),
        params: vec![],
        ret: Type::Any,
      })
    };
    let a = make();
    let b = make();
    assert_ne!(a, b);
    assert_eq!(a, a.clone());
  }
}
