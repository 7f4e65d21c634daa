//! The host-provided built-in functions. Their symbols are created once and
//! shared between the binder (for resolution) and the evaluator (for
//! dispatch), since function symbols compare by identity.

use rand::Rng;

use crate::error::RuntimeError;
use crate::eval::{Evaluator, Result};
use crate::symbol::{Function, FunctionSymbol, Param, Type};
use crate::value::Value;

pub struct Builtin {
  pub func: Function,
  pub call: fn(&mut Evaluator, Vec<Value>) -> Result<Option<Value>>,
}

pub fn all() -> Vec<Builtin> {
  vec![
    Builtin {
      func: symbol("print", vec![param("x", Type::Any)], Type::Void),
      call: print,
    },
    Builtin {
      func: symbol("input", vec![], Type::String),
      call: input,
    },
    Builtin {
      func: symbol(
        "random",
        vec![param("min", Type::Int), param("max", Type::Int)],
        Type::Int,
      ),
      call: random,
    },
  ]
}

fn symbol(name: &str, params: Vec<Param>, ret: Type) -> Function {
  Function::new(FunctionSymbol {
    name: name.into(),
    params,
    ret,
  })
}

fn param(name: &str, ty: Type) -> Param {
  Param {
    name: name.into(),
    ty,
  }
}

fn print(eval: &mut Evaluator, args: Vec<Value>) -> Result<Option<Value>> {
  let value = &args[0];
  eval
    .print(format_args!("{value}\n"))
    .map_err(|e| RuntimeError::new(format!("print failed: {e}")))?;
  Ok(None)
}

fn input(eval: &mut Evaluator, _args: Vec<Value>) -> Result<Option<Value>> {
  let line = eval
    .read_line()
    .map_err(|e| RuntimeError::new(format!("input failed: {e}")))?;
  Ok(Some(Value::str(line)))
}

/// A uniform integer in `[min, max)`; `min == max` collapses to `min`.
fn random(eval: &mut Evaluator, args: Vec<Value>) -> Result<Option<Value>> {
  let (Some(min), Some(max)) = (args[0].as_int(), args[1].as_int()) else {
    return Err(RuntimeError::new("random expects two integers"));
  };
  if min > max {
    return Err(RuntimeError::new(format!(
      "random requires min <= max, got {min} and {max}"
    )));
  }
  let value = if min == max {
    min
  } else {
    eval.rng().gen_range(min..max)
  };
  Ok(Some(Value::Int(value)))
}
