//! Name resolution and type checking. Binding never fails outright for a
//! well formed syntax tree: every failure path records a diagnostic and
//! produces an error node in its place, and a statement with diagnostics is
//! simply not evaluated.

use std::rc::Rc;

use span::Span;
use syntax::ast;

use crate::bound::*;
use crate::builtins::Builtin;
use crate::error::Diagnostic;
use crate::ops::{self, BinOp, Conversion, UnOp};
use crate::scope::Scope;
use crate::symbol::{Function, FunctionSymbol, Param, Type};

pub struct Binder {
  scope: Scope<Type>,
  diagnostics: Vec<Diagnostic>,
}

impl Binder {
  pub fn new(builtins: &[Builtin]) -> Self {
    let mut scope = Scope::new();
    for b in builtins {
      scope.declare_function(b.func.clone());
    }
    Binder {
      scope,
      diagnostics: vec![],
    }
  }

  /// Diagnostics accumulated since the last [`Binder::take_diagnostics`].
  pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
    std::mem::take(&mut self.diagnostics)
  }

  fn error(&mut self, message: impl Into<String>, span: Span) -> BoundExpr {
    self.diagnostics.push(Diagnostic::new(message, span));
    BoundExpr::new(Type::Error, span, BoundExprKind::Error)
  }

  fn error_stmt(&mut self, message: impl Into<String>, span: Span) -> BoundStmt {
    let expr = self.error(message, span);
    BoundStmt::Expr(Box::new(expr))
  }

  pub fn bind(&mut self, stmt: &ast::Stmt) -> BoundStmt {
    match &**stmt {
      ast::StmtKind::Block(body) => {
        self.scope.push();
        let body = body.iter().map(|s| self.bind(s)).collect();
        self.scope.pop();
        BoundStmt::Block(body)
      }
      ast::StmtKind::VarDecl(decl) => self.bind_var_decl(decl),
      ast::StmtKind::Func(func) => self.bind_func(func),
      ast::StmtKind::Assign(assign) => self.bind_assign(assign),
      ast::StmtKind::If(v) => {
        let cond = self.bind_cond(&v.cond);
        let then = self.bind(&v.then);
        let otherwise = v.otherwise.as_ref().map(|s| self.bind(s));
        BoundStmt::If(Box::new(BoundIf {
          cond,
          then,
          otherwise,
        }))
      }
      ast::StmtKind::While(v) => {
        let cond = self.bind_cond(&v.cond);
        let body = self.bind(&v.body);
        BoundStmt::While(Box::new(BoundWhile { cond, body }))
      }
      ast::StmtKind::DoWhile(v) => {
        let cond = self.bind_cond(&v.cond);
        let body = self.bind(&v.body);
        BoundStmt::DoWhile(Box::new(BoundWhile { cond, body }))
      }
      ast::StmtKind::ForIn(v) => self.bind_for_in(v),
      ast::StmtKind::Return(v) => {
        // intentionally not checked against the declared return type
        let value = v.value.as_ref().map(|e| self.bind_expr(e));
        BoundStmt::Return(Box::new(BoundReturn { value }))
      }
      ast::StmtKind::Expr(e) => {
        let expr = self.bind_expr(e);
        BoundStmt::Expr(Box::new(expr))
      }
    }
  }

  fn bind_var_decl(&mut self, decl: &ast::VarDecl) -> BoundStmt {
    let name: &str = &decl.name;
    let Some(ty) = Type::parse(&decl.ty) else {
      return self.error_stmt(format!("unknown type `{}`", decl.ty), decl.ty.span);
    };
    if matches!(ty, Type::Void) {
      return self.error_stmt(
        format!("cannot declare variable `{name}` of type `void`"),
        decl.ty.span,
      );
    }
    if self.scope.declared_here(name) {
      return self.error_stmt(
        format!("variable `{name}` is already declared"),
        decl.name.span,
      );
    }

    let init = decl.init.as_ref().map(|e| {
      let value = self.bind_expr(e);
      self.convert(value, &ty, e.span)
    });

    self.scope.declare(name, ty.clone());
    BoundStmt::VarDecl(Box::new(BoundVarDecl {
      name: name.into(),
      ty,
      init,
    }))
  }

  fn bind_func(&mut self, func: &ast::Func) -> BoundStmt {
    let name: &str = &func.name;
    if self.scope.get(name).is_some()
      || self.scope.function(name).is_some()
      || Type::parse(name).is_some()
    {
      return self.error_stmt(format!("the name `{name}` is already in use"), func.name.span);
    }

    let mut params: Vec<Param> = Vec::with_capacity(func.params.len());
    for p in &func.params {
      let pname: &str = &p.name;
      if params.iter().any(|q| q.name == pname) {
        return self.error_stmt(format!("duplicate parameter `{pname}`"), p.name.span);
      }
      // a missing annotation means `any`
      let ty = match &p.ty {
        Some(ty) => match Type::parse(ty) {
          Some(ty) => ty,
          None => return self.error_stmt(format!("unknown type `{ty}`"), ty.span),
        },
        None => Type::Any,
      };
      params.push(Param {
        name: pname.into(),
        ty,
      });
    }

    let ret = match &func.ret {
      Some(ret) => match Type::parse(ret) {
        Some(ty) => ty,
        None => return self.error_stmt(format!("unknown type `{ret}`"), ret.span),
      },
      None => Type::Any,
    };

    let symbol = Function::new(FunctionSymbol {
      name: name.into(),
      params,
      ret,
    });
    // declared before the body binds, so the function can recurse
    self.scope.declare_function(symbol.clone());

    self.scope.push();
    for p in &symbol.params {
      self.scope.declare(p.name.clone(), p.ty.clone());
    }
    let body = self.bind(&func.body);
    self.scope.pop();

    BoundStmt::Func(Box::new(BoundFunc {
      func: symbol,
      body: Rc::new(body),
    }))
  }

  fn bind_assign(&mut self, assign: &ast::Assign) -> BoundStmt {
    match &*assign.target {
      ast::ExprKind::Var(name) => {
        let value = self.bind_expr(&assign.value);
        let target: &str = name;
        match self.scope.get(target).cloned() {
          Some(ty) if !ty.is_any() => {
            let value = self.convert(value, &ty, assign.value.span);
            BoundStmt::Assign(Box::new(BoundAssign {
              name: target.into(),
              value,
            }))
          }
          Some(_) => {
            let value = self.check_value(value);
            BoundStmt::Assign(Box::new(BoundAssign {
              name: target.into(),
              value,
            }))
          }
          None => {
            // first assignment to an unseen name declares it as `any`
            self.scope.declare(target, Type::Any);
            let value = self.check_value(value);
            BoundStmt::Assign(Box::new(BoundAssign {
              name: target.into(),
              value,
            }))
          }
        }
      }
      ast::ExprKind::Index(index) => {
        let root = index_root(&index.target);
        if !matches!(&**root, ast::ExprKind::Var(..)) {
          return self.error_stmt("the target of an index assignment must be a variable", root.span);
        }
        let (array, idx, element) = match self.bind_index(index) {
          Ok(parts) => parts,
          Err(error) => return BoundStmt::Expr(Box::new(error)),
        };
        let value = self.bind_expr(&assign.value);
        let value = if element.is_any() {
          self.check_value(value)
        } else {
          self.convert(value, &element, assign.value.span)
        };
        BoundStmt::IndexAssign(Box::new(BoundIndexAssign {
          array,
          index: idx,
          value,
        }))
      }
      _ => unreachable!("the parser only accepts variables and index expressions as assignment targets"),
    }
  }

  fn bind_for_in(&mut self, v: &ast::ForIn) -> BoundStmt {
    let iter = self.bind_expr(&v.iter);
    let element = match iter.ty.element() {
      Some(element) => element,
      None => {
        return self.error_stmt(
          format!("cannot iterate over a value of type `{}`", iter.ty),
          v.iter.span,
        )
      }
    };

    self.scope.push();
    self.scope.declare(v.item.to_string(), element.clone());
    let body = self.bind(&v.body);
    self.scope.pop();

    BoundStmt::ForIn(Box::new(BoundForIn {
      item: v.item.to_string(),
      ty: element,
      iter,
      body,
    }))
  }

  /// Conditions must bind to `bool`; `any` is deliberately rejected.
  fn bind_cond(&mut self, expr: &ast::Expr) -> BoundExpr {
    let cond = self.bind_expr(expr);
    if matches!(cond.ty, Type::Bool) || cond.ty.contains_error() {
      cond
    } else {
      self.error(
        format!("condition must be of type `bool`, found `{}`", cond.ty),
        expr.span,
      )
    }
  }

  pub fn bind_expr(&mut self, expr: &ast::Expr) -> BoundExpr {
    let span = expr.span;
    match &**expr {
      ast::ExprKind::Number(lexeme) => self.bind_number(lexeme, span),
      ast::ExprKind::Str(s) => BoundExpr::new(Type::String, span, BoundExprKind::Str(s.to_string())),
      ast::ExprKind::Bool(b) => BoundExpr::new(Type::Bool, span, BoundExprKind::Bool(*b)),
      ast::ExprKind::Var(name) => {
        let target: &str = name;
        match self.scope.get(target).cloned() {
          Some(ty) => BoundExpr::new(ty, span, BoundExprKind::Var(target.into())),
          None => self.error(format!("undeclared variable `{target}`"), span),
        }
      }
      ast::ExprKind::Array(items) => self.bind_array(items, span),
      ast::ExprKind::Index(index) => match self.bind_index(index) {
        Ok((target, idx, element)) => BoundExpr::new(
          element,
          span,
          BoundExprKind::Index(Box::new(BoundIndex { target, index: idx })),
        ),
        Err(error) => error,
      },
      ast::ExprKind::Binary(b) => self.bind_binary(b, span),
      ast::ExprKind::Unary(u) => match u.op {
        ast::UnaryOp::Inc => self.bind_increment(&u.right, UnOp::Inc, false, span),
        ast::UnaryOp::Dec => self.bind_increment(&u.right, UnOp::Dec, false, span),
        op => self.bind_unary(op, &u.right, span),
      },
      ast::ExprKind::Postfix(p) => {
        let op = match p.op {
          ast::PostfixOp::Inc => UnOp::Inc,
          ast::PostfixOp::Dec => UnOp::Dec,
        };
        self.bind_increment(&p.target, op, true, span)
      }
      ast::ExprKind::Call(call) => self.bind_call(call, span),
      ast::ExprKind::Paren(inner) => self.bind_expr(inner),
    }
  }

  /// Hex int, decimal int, then double, in that order.
  fn bind_number(&mut self, lexeme: &str, span: Span) -> BoundExpr {
    if let Some(hex) = lexeme.strip_prefix("0x").or_else(|| lexeme.strip_prefix("0X")) {
      return match i64::from_str_radix(hex, 16) {
        Ok(v) => BoundExpr::new(Type::Int, span, BoundExprKind::Int(v)),
        Err(_) => self.error(format!("invalid number `{lexeme}`"), span),
      };
    }
    if let Ok(v) = lexeme.parse::<i64>() {
      return BoundExpr::new(Type::Int, span, BoundExprKind::Int(v));
    }
    match lexeme.parse::<f64>() {
      Ok(v) => BoundExpr::new(Type::Double, span, BoundExprKind::Double(v)),
      Err(_) => self.error(format!("invalid number `{lexeme}`"), span),
    }
  }

  fn bind_array(&mut self, items: &[ast::Expr], span: Span) -> BoundExpr {
    let items: Vec<BoundExpr> = items
      .iter()
      .map(|e| {
        let item = self.bind_expr(e);
        self.check_value(item)
      })
      .collect();

    // arrays of one type stay typed; mixed element types fall back to any;
    // a failed element poisons the whole literal so nothing downstream
    // reports it again
    let element = if items.iter().any(|i| i.ty.contains_error()) {
      Type::Error
    } else {
      match items.first() {
        Some(first) if items.iter().all(|i| i.ty == first.ty) => first.ty.clone(),
        _ => Type::Any,
      }
    };

    BoundExpr::new(
      Type::Array(Box::new(element)),
      span,
      BoundExprKind::Array(items),
    )
  }

  fn bind_index(
    &mut self,
    index: &ast::Index,
  ) -> Result<(BoundExpr, BoundExpr, Type), BoundExpr> {
    let target = self.bind_expr(&index.target);
    let target = self.check_value(target);

    let idx = self.bind_expr(&index.index);
    let idx = self.check_value(idx);
    let idx = match &idx.ty {
      Type::Int | Type::Any => idx,
      ty if ty.contains_error() => idx,
      ty => {
        let message = format!("array index must be of type `int`, found `{ty}`");
        let span = idx.span;
        self.error(message, span)
      }
    };

    match target.ty.element() {
      Some(element) => {
        // a failed subexpression poisons the whole access
        let element = if target.ty.contains_error() || idx.ty.contains_error() {
          Type::Error
        } else {
          element
        };
        Ok((target, idx, element))
      }
      None => {
        let span = index.target.span;
        let ty = target.ty.clone();
        Err(self.error(format!("type `{ty}` is not indexable"), span))
      }
    }
  }

  fn bind_binary(&mut self, b: &ast::Binary, span: Span) -> BoundExpr {
    let left = self.bind_expr(&b.left);
    let left = self.check_value(left);
    let right = self.bind_expr(&b.right);
    let right = self.check_value(right);

    let op = BinOp::from(b.op);
    match ops::bind_binary(op, &left.ty, &right.ty) {
      Some(operator) => BoundExpr::new(
        operator.result.clone(),
        span,
        BoundExprKind::Binary(Box::new(BoundBinary {
          op: operator,
          left,
          right,
        })),
      ),
      None => self.error(
        format!(
          "binary operator `{}` is not defined for types `{}` and `{}`",
          op.name(),
          left.ty,
          right.ty
        ),
        span,
      ),
    }
  }

  fn bind_unary(&mut self, op: ast::UnaryOp, operand: &ast::Expr, span: Span) -> BoundExpr {
    let right = self.bind_expr(operand);
    let right = self.check_value(right);

    let op = match op {
      ast::UnaryOp::Plus => UnOp::Identity,
      ast::UnaryOp::Minus => UnOp::Negate,
      ast::UnaryOp::Not => UnOp::Not,
      ast::UnaryOp::Inc | ast::UnaryOp::Dec => unreachable!("increments bind separately"),
    };
    match ops::bind_unary(op, &right.ty) {
      Some(operator) => BoundExpr::new(
        operator.result.clone(),
        span,
        BoundExprKind::Unary(Box::new(BoundUnary {
          op: operator,
          right,
        })),
      ),
      None => self.error(
        format!(
          "unary operator `{}` is not defined for type `{}`",
          op.name(),
          right.ty
        ),
        span,
      ),
    }
  }

  fn bind_increment(
    &mut self,
    target: &ast::Expr,
    op: UnOp,
    postfix: bool,
    span: Span,
  ) -> BoundExpr {
    let ast::ExprKind::Var(name) = &**target else {
      unreachable!("the parser only accepts variables as increment targets");
    };
    let target_name: &str = name;
    let Some(ty) = self.scope.get(target_name).cloned() else {
      return self.error(format!("undeclared variable `{target_name}`"), span);
    };

    match ops::bind_unary(op, &ty) {
      Some(operator) => {
        let by = if matches!(op, UnOp::Inc) { 1 } else { -1 };
        BoundExpr::new(
          operator.result,
          span,
          BoundExprKind::Increment(Box::new(BoundIncrement {
            name: target_name.into(),
            by,
            postfix,
          })),
        )
      }
      None => self.error(
        format!(
          "unary operator `{}` is not defined for type `{ty}`",
          op.name()
        ),
        span,
      ),
    }
  }

  fn bind_call(&mut self, call: &ast::Call, span: Span) -> BoundExpr {
    let ast::ExprKind::Var(name) = &*call.target else {
      return self.error("this expression is not callable", call.target.span);
    };
    let target: &str = name;

    // a primitive type name in call position is an explicit conversion
    if let Some(ty) = Type::parse(target) {
      if call.args.len() != 1 {
        return self.error(
          format!("conversion to `{ty}` takes exactly one argument"),
          span,
        );
      }
      let arg = self.bind_expr(&call.args[0]);
      let arg = self.check_value(arg);
      return self.convert_explicit(arg, &ty, span);
    }

    let Some(func) = self.scope.function(target).cloned() else {
      return self.error(format!("undeclared function `{target}`"), name.span);
    };
    if call.args.len() != func.params.len() {
      return self.error(
        format!(
          "function `{target}` expects {} argument(s), found {}",
          func.params.len(),
          call.args.len()
        ),
        span,
      );
    }

    let mut args = Vec::with_capacity(call.args.len());
    for (arg, param) in call.args.iter().zip(&func.params) {
      let value = self.bind_expr(arg);
      let value = self.check_value(value);
      let value = self.convert(value, &param.ty, arg.span);
      args.push(value);
    }

    // a failed argument poisons the call
    let ty = if args.iter().any(|a| a.ty.contains_error()) {
      Type::Error
    } else {
      func.ret.clone()
    };
    BoundExpr::new(ty, span, BoundExprKind::Call(Box::new(BoundCall { func, args })))
  }

  /// Operands must produce a value; `void` calls may only stand alone.
  fn check_value(&mut self, expr: BoundExpr) -> BoundExpr {
    if matches!(expr.ty, Type::Void) {
      let span = expr.span;
      return self.error("expression does not produce a value", span);
    }
    expr
  }

  fn convert(&mut self, expr: BoundExpr, to: &Type, span: Span) -> BoundExpr {
    self.convert_inner(expr, to, span, false)
  }

  fn convert_explicit(&mut self, expr: BoundExpr, to: &Type, span: Span) -> BoundExpr {
    self.convert_inner(expr, to, span, true)
  }

  fn convert_inner(&mut self, expr: BoundExpr, to: &Type, span: Span, explicit: bool) -> BoundExpr {
    match ops::classify(&expr.ty, to) {
      Some(Conversion::Identity) => expr,
      Some(Conversion::Implicit) => {
        BoundExpr::new(to.clone(), span, BoundExprKind::Convert(Box::new(expr)))
      }
      Some(Conversion::Explicit) if explicit => {
        BoundExpr::new(to.clone(), span, BoundExprKind::Convert(Box::new(expr)))
      }
      _ => self.error(
        format!("cannot convert type `{}` to `{to}`", expr.ty),
        span,
      ),
    }
  }
}

fn index_root<'a, 'src>(expr: &'a ast::Expr<'src>) -> &'a ast::Expr<'src> {
  match &**expr {
    ast::ExprKind::Index(index) => index_root(&index.target),
    _ => expr,
  }
}

#[cfg(test)]
mod tests;
