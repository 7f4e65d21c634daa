//! The tree walker. Holds the runtime scope stack and the function dispatch
//! table; `return` unwinds through [`Flow`] and is consumed by the nearest
//! enclosing call.

mod binop;

use std::io::{self, BufRead, BufReader, Write};
use std::rc::Rc;

use indexmap::IndexMap;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::bound::*;
use crate::builtins::Builtin;
use crate::error::RuntimeError;
use crate::scope::Scope;
use crate::symbol::{Function, Type};
use crate::value::Value;

pub type Result<T, E = RuntimeError> = core::result::Result<T, E>;

/// Output sink for `print`. `Any` lets tests swap in a buffer and read the
/// captured output back out.
pub trait Stdout: Write + std::any::Any {
  fn as_any(&self) -> &dyn std::any::Any;
}

impl<T: Write + std::any::Any> Stdout for T {
  fn as_any(&self) -> &dyn std::any::Any {
    self
  }
}

/// How a statement finished: fell through, or unwound with a `return`.
pub enum Flow {
  Normal,
  Return(Option<Value>),
}

#[derive(Clone)]
pub enum Callable {
  Host(fn(&mut Evaluator, Vec<Value>) -> Result<Option<Value>>),
  User { body: Rc<BoundStmt> },
}

pub struct Evaluator {
  scope: Scope<Value>,
  functions: IndexMap<Function, Callable>,
  rng: StdRng,
  stdout: Box<dyn Stdout>,
  stdin: Box<dyn BufRead>,
}

impl Evaluator {
  pub fn new(builtins: &[Builtin]) -> Self {
    Self::with_io(
      builtins,
      Box::new(io::stdout()),
      Box::new(BufReader::new(io::stdin())),
    )
  }

  pub fn with_io(builtins: &[Builtin], stdout: Box<dyn Stdout>, stdin: Box<dyn BufRead>) -> Self {
    let mut functions = IndexMap::new();
    for b in builtins {
      functions.insert(b.func.clone(), Callable::Host(b.call));
    }
    Evaluator {
      scope: Scope::new(),
      functions,
      rng: StdRng::from_entropy(),
      stdout,
      stdin,
    }
  }

  pub fn io(&self) -> &dyn Stdout {
    &*self.stdout
  }

  pub fn seed_rng(&mut self, seed: u64) {
    self.rng = StdRng::seed_from_u64(seed);
  }

  pub(crate) fn rng(&mut self) -> &mut StdRng {
    &mut self.rng
  }

  pub(crate) fn print(&mut self, args: std::fmt::Arguments<'_>) -> io::Result<()> {
    self.stdout.write_fmt(args)
  }

  /// One line from the input source, end-of-line stripped; EOF reads empty.
  pub(crate) fn read_line(&mut self) -> io::Result<String> {
    let mut line = String::new();
    self.stdin.read_line(&mut line)?;
    while line.ends_with('\n') || line.ends_with('\r') {
      line.pop();
    }
    Ok(line)
  }

  /// Execute one top-level statement. Returns the value of a non-void
  /// expression statement so a REPL can echo it.
  pub fn run(&mut self, stmt: &BoundStmt) -> Result<Option<Value>> {
    debug_assert_eq!(self.scope.depth(), 1, "unbalanced scope stack");

    if let BoundStmt::Expr(expr) = stmt {
      if !matches!(expr.ty, Type::Void) {
        return self.eval_value(expr).map(Some);
      }
    }
    match self.eval_stmt(stmt)? {
      Flow::Return(_) => Err(RuntimeError::new("return outside function")),
      Flow::Normal => Ok(None),
    }
  }

  fn eval_stmt(&mut self, stmt: &BoundStmt) -> Result<Flow> {
    match stmt {
      BoundStmt::Block(body) => {
        self.scope.push();
        let flow = self.eval_block(body);
        self.scope.pop();
        flow
      }
      BoundStmt::VarDecl(decl) => {
        let value = match &decl.init {
          Some(init) => self.eval_value(init)?,
          None => Value::Int(0),
        };
        self.scope.declare(decl.name.clone(), value);
        Ok(Flow::Normal)
      }
      BoundStmt::Func(decl) => {
        self.scope.declare_function(decl.func.clone());
        self.functions.insert(
          decl.func.clone(),
          Callable::User {
            body: decl.body.clone(),
          },
        );
        Ok(Flow::Normal)
      }
      BoundStmt::Assign(assign) => {
        let value = self.eval_value(&assign.value)?;
        self.scope.assign(&assign.name, value);
        Ok(Flow::Normal)
      }
      BoundStmt::IndexAssign(assign) => {
        self.eval_index_assign(assign)?;
        Ok(Flow::Normal)
      }
      BoundStmt::If(v) => {
        if self.eval_cond(&v.cond)? {
          self.eval_stmt(&v.then)
        } else if let Some(otherwise) = &v.otherwise {
          self.eval_stmt(otherwise)
        } else {
          Ok(Flow::Normal)
        }
      }
      BoundStmt::While(v) => {
        while self.eval_cond(&v.cond)? {
          match self.eval_stmt(&v.body)? {
            Flow::Normal => {}
            flow => return Ok(flow),
          }
        }
        Ok(Flow::Normal)
      }
      BoundStmt::DoWhile(v) => {
        loop {
          match self.eval_stmt(&v.body)? {
            Flow::Normal => {}
            flow => return Ok(flow),
          }
          if !self.eval_cond(&v.cond)? {
            break;
          }
        }
        Ok(Flow::Normal)
      }
      BoundStmt::ForIn(v) => self.eval_for_in(v),
      BoundStmt::Return(v) => {
        let value = match &v.value {
          Some(expr) => self.eval_expr(expr)?,
          None => None,
        };
        Ok(Flow::Return(value))
      }
      BoundStmt::Expr(expr) => {
        self.eval_expr(expr)?;
        Ok(Flow::Normal)
      }
    }
  }

  fn eval_block(&mut self, body: &[BoundStmt]) -> Result<Flow> {
    for stmt in body {
      match self.eval_stmt(stmt)? {
        Flow::Normal => {}
        flow => return Ok(flow),
      }
    }
    Ok(Flow::Normal)
  }

  /// A non-boolean condition value counts as "not true".
  fn eval_cond(&mut self, cond: &BoundExpr) -> Result<bool> {
    Ok(matches!(self.eval_value(cond)?, Value::Bool(true)))
  }

  fn eval_for_in(&mut self, v: &BoundForIn) -> Result<Flow> {
    let items = match self.eval_value(&v.iter)? {
      Value::List(items) => items,
      value => {
        return Err(RuntimeError::new(format!(
          "cannot iterate over a value of type {}",
          value.type_name()
        )))
      }
    };

    let mut i = 0;
    loop {
      // element writes during iteration stay visible; the borrow must not
      // outlive one step
      let item = {
        let items = items.borrow();
        match items.get(i) {
          Some(item) => item.clone(),
          None => break,
        }
      };

      self.scope.push();
      self.scope.declare(v.item.clone(), item);
      let flow = self.eval_stmt(&v.body);
      self.scope.pop();
      match flow? {
        Flow::Normal => {}
        flow => return Ok(flow),
      }

      i += 1;
    }

    Ok(Flow::Normal)
  }

  fn eval_expr(&mut self, expr: &BoundExpr) -> Result<Option<Value>> {
    match &expr.kind {
      BoundExprKind::Int(v) => Ok(Some(Value::Int(*v))),
      BoundExprKind::Double(v) => Ok(Some(Value::Double(*v))),
      BoundExprKind::Bool(v) => Ok(Some(Value::Bool(*v))),
      BoundExprKind::Str(v) => Ok(Some(Value::str(v.as_str()))),
      BoundExprKind::Array(items) => {
        let mut values = Vec::with_capacity(items.len());
        for item in items {
          values.push(self.eval_value(item)?);
        }
        Ok(Some(Value::list(values)))
      }
      BoundExprKind::Var(name) => self.lookup(name).map(Some),
      BoundExprKind::Index(index) => self.eval_index(index).map(Some),
      BoundExprKind::Unary(unary) => self.eval_unary(unary).map(Some),
      BoundExprKind::Increment(inc) => self.eval_increment(inc).map(Some),
      BoundExprKind::Binary(binary) => {
        // both operands always evaluate; `&&`/`||` do not short-circuit
        let left = self.eval_value(&binary.left)?;
        let right = self.eval_value(&binary.right)?;
        binop::apply(&binary.op, left, right).map(Some)
      }
      BoundExprKind::Call(call) => self.eval_call(call),
      BoundExprKind::Convert(inner) => {
        let value = self.eval_value(inner)?;
        convert(value, &expr.ty).map(Some)
      }
      BoundExprKind::Error => Err(RuntimeError::new("cannot evaluate an invalid expression")),
    }
  }

  fn eval_value(&mut self, expr: &BoundExpr) -> Result<Value> {
    self
      .eval_expr(expr)?
      .ok_or_else(|| RuntimeError::new("expression did not produce a value"))
  }

  fn lookup(&self, name: &str) -> Result<Value> {
    self
      .scope
      .get(name)
      .cloned()
      .ok_or_else(|| RuntimeError::new(format!("undeclared variable `{name}`")))
  }

  fn eval_index(&mut self, index: &BoundIndex) -> Result<Value> {
    let target = self.eval_value(&index.target)?;
    let idx = self.eval_value(&index.index)?;
    let items = match target {
      Value::List(items) => items,
      value => {
        return Err(RuntimeError::new(format!(
          "a value of type {} is not indexable",
          value.type_name()
        )))
      }
    };
    let items = items.borrow();
    let slot = resolve_index(&items, &idx)?;
    Ok(items[slot].clone())
  }

  fn eval_index_assign(&mut self, assign: &BoundIndexAssign) -> Result<Value> {
    let target = self.eval_value(&assign.array)?;
    let idx = self.eval_value(&assign.index)?;
    let value = self.eval_value(&assign.value)?;
    let items = match target {
      Value::List(items) => items,
      value => {
        return Err(RuntimeError::new(format!(
          "a value of type {} is not indexable",
          value.type_name()
        )))
      }
    };
    let mut items = items.borrow_mut();
    let slot = resolve_index(&items, &idx)?;
    items[slot] = value.clone();
    Ok(value)
  }

  fn eval_unary(&mut self, unary: &BoundUnary) -> Result<Value> {
    use crate::ops::UnOp;

    let right = self.eval_value(&unary.right)?;
    match unary.op.op {
      UnOp::Identity => match right {
        Value::Int(_) | Value::Double(_) => Ok(right),
        v => Err(RuntimeError::new(format!(
          "unary `+` expects a number, got {}",
          v.type_name()
        ))),
      },
      UnOp::Negate => match right {
        Value::Int(v) => Ok(Value::Int(v.wrapping_neg())),
        Value::Double(v) => Ok(Value::Double(-v)),
        v => Err(RuntimeError::new(format!(
          "unary `-` expects a number, got {}",
          v.type_name()
        ))),
      },
      UnOp::Not => match right {
        Value::Bool(v) => Ok(Value::Bool(!v)),
        v => Err(RuntimeError::new(format!(
          "unary `!` expects a bool, got {}",
          v.type_name()
        ))),
      },
      UnOp::Inc | UnOp::Dec => unreachable!("increments evaluate through their own node"),
    }
  }

  fn eval_increment(&mut self, inc: &BoundIncrement) -> Result<Value> {
    let current = self.lookup(&inc.name)?;
    let (new, old) = match current {
      Value::Int(v) => (Value::Int(v.wrapping_add(inc.by)), Value::Int(v)),
      Value::Double(v) => (Value::Double(v + inc.by as f64), Value::Double(v)),
      v => {
        return Err(RuntimeError::new(format!(
          "cannot increment a value of type {}",
          v.type_name()
        )))
      }
    };
    self.scope.assign(&inc.name, new.clone());
    Ok(if inc.postfix { old } else { new })
  }

  fn eval_call(&mut self, call: &BoundCall) -> Result<Option<Value>> {
    // arguments evaluate left to right, before the callee is looked up
    let mut args = Vec::with_capacity(call.args.len());
    for arg in &call.args {
      args.push(self.eval_value(arg)?);
    }

    let Some(callable) = self.functions.get(&call.func).cloned() else {
      return Err(RuntimeError::new(format!(
        "undeclared function `{}`",
        call.func.name
      )));
    };

    match callable {
      Callable::Host(f) => f(self, args),
      Callable::User { body } => self.call_user(&call.func, &body, args),
    }
  }

  /// The trampoline around a user function body: fresh frame, parameters
  /// bound by position, and the `Return` flow consumed here. The frame pops
  /// on every path, including errors.
  fn call_user(&mut self, func: &Function, body: &BoundStmt, args: Vec<Value>) -> Result<Option<Value>> {
    self.scope.push();
    for (param, value) in func.params.iter().zip(args) {
      self.scope.declare(param.name.clone(), value);
    }
    let flow = self.eval_stmt(body);
    self.scope.pop();

    let value = match flow? {
      Flow::Return(value) => value,
      Flow::Normal => None,
    };
    Ok(match value {
      Some(value) => Some(value),
      None if matches!(func.ret, Type::Void) => None,
      // a body that never returns yields integer zero
      None => Some(Value::Int(0)),
    })
  }
}

/// Runtime conversions mirror the bind-time table: identity, numeric to
/// bool, int to double, and string to int with an optional hex prefix.
pub(crate) fn convert(value: Value, to: &Type) -> Result<Value> {
  match to {
    Type::Any => Ok(value),
    Type::Int => match value {
      Value::Int(_) => Ok(value),
      Value::Str(s) => parse_int(&s),
      v => Err(cannot_convert(&v, to)),
    },
    Type::Double => match value {
      Value::Double(_) => Ok(value),
      Value::Int(v) => Ok(Value::Double(v as f64)),
      v => Err(cannot_convert(&v, to)),
    },
    Type::Bool => match value {
      Value::Bool(_) => Ok(value),
      Value::Int(v) => Ok(Value::Bool(v != 0)),
      Value::Double(v) => Ok(Value::Bool(v != 0.0)),
      v => Err(cannot_convert(&v, to)),
    },
    Type::String => match value {
      Value::Str(_) => Ok(value),
      v => Err(cannot_convert(&v, to)),
    },
    // element types are not checked at runtime; `any` got us here
    Type::Array(_) => match value {
      Value::List(_) => Ok(value),
      v => Err(cannot_convert(&v, to)),
    },
    Type::Void | Type::Error => Err(cannot_convert(&value, to)),
  }
}

fn cannot_convert(value: &Value, to: &Type) -> RuntimeError {
  RuntimeError::new(format!(
    "cannot convert a value of type {} to `{to}`",
    value.type_name()
  ))
}

/// Whitespace-trimmed; `0x`/`0X` parses as base 16, everything else base 10.
fn parse_int(s: &str) -> Result<Value> {
  let t = s.trim();
  let parsed = match t.strip_prefix("0x").or_else(|| t.strip_prefix("0X")) {
    Some(hex) => i64::from_str_radix(hex, 16),
    None => t.parse::<i64>(),
  };
  parsed
    .map(Value::Int)
    .map_err(|_| RuntimeError::new(format!("cannot parse `{t}` as int")))
}

/// Negative indices count from the end; anything out of range is an error.
fn resolve_index(items: &[Value], idx: &Value) -> Result<usize> {
  let Some(i) = idx.as_int() else {
    return Err(RuntimeError::new(format!(
      "array index must be an integer, got {}",
      idx.type_name()
    )));
  };
  let len = items.len() as i64;
  let slot = if i < 0 { len + i } else { i };
  if slot < 0 || slot >= len {
    return Err(RuntimeError::new(format!(
      "index {i} out of range for array of length {len}"
    )));
  }
  Ok(slot as usize)
}
