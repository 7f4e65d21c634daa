use indoc::indoc;

use super::*;
use crate::builtins;

fn bind_src(src: &str) -> (Vec<BoundStmt>, Vec<Diagnostic>) {
  let module = syntax::parse(src).unwrap_or_else(|e| panic!("parse failed: {e} in {src:?}"));
  let mut binder = Binder::new(&builtins::all());
  let bound = module.body.iter().map(|s| binder.bind(s)).collect();
  (bound, binder.take_diagnostics())
}

fn bind_ok(src: &str) -> Vec<BoundStmt> {
  let (bound, diagnostics) = bind_src(src);
  assert!(diagnostics.is_empty(), "unexpected diagnostics: {diagnostics:?}");
  bound
}

fn bind_err(src: &str) -> Vec<String> {
  let (_, diagnostics) = bind_src(src);
  assert!(!diagnostics.is_empty(), "expected diagnostics for {src:?}");
  diagnostics.into_iter().map(|d| d.message).collect()
}

/// The type of the final statement, which must be an expression.
fn ty_of(src: &str) -> Type {
  let bound = bind_ok(src);
  match bound.last() {
    Some(BoundStmt::Expr(expr)) => expr.ty.clone(),
    _ => panic!("expected a trailing expression statement in {src:?}"),
  }
}

#[test]
fn literal_types() {
  assert_eq!(ty_of("1"), Type::Int);
  assert_eq!(ty_of("0xFF"), Type::Int);
  assert_eq!(ty_of("1.5"), Type::Double);
  assert_eq!(ty_of("true"), Type::Bool);
  assert_eq!(ty_of("\"hi\""), Type::String);
}

#[test]
fn hex_literals_bind_to_their_value() {
  let bound = bind_ok("0xFF");
  let Some(BoundStmt::Expr(expr)) = bound.last() else {
    panic!()
  };
  assert!(matches!(expr.kind, BoundExprKind::Int(255)));
}

#[test]
fn array_literal_types() {
  assert_eq!(ty_of("[1, 2]"), Type::Array(Box::new(Type::Int)));
  assert_eq!(ty_of("[1, true]"), Type::Array(Box::new(Type::Any)));
  assert_eq!(ty_of("[]"), Type::Array(Box::new(Type::Any)));
  assert_eq!(
    ty_of("[[1], [2]]"),
    Type::Array(Box::new(Type::Array(Box::new(Type::Int))))
  );
}

#[test]
fn indexing_yields_the_element_type() {
  // a bare `a[0]` statement would take the assignment path, so parenthesize
  assert_eq!(ty_of("a: int[] = [1]\n(a[0])"), Type::Int);
  assert_eq!(ty_of("x = [1]\n(x[0])"), Type::Any);
}

#[test]
fn arithmetic_types() {
  assert_eq!(ty_of("1 + 2"), Type::Int);
  assert_eq!(ty_of("1 + 2.5"), Type::Double);
  assert_eq!(ty_of("\"a\" + 1"), Type::String);
  assert_eq!(ty_of("1 < 2"), Type::Bool);
  assert_eq!(ty_of("true && false"), Type::Bool);
}

#[test]
fn declarations_type_their_variable() {
  assert_eq!(ty_of("x: int = 10\nx"), Type::Int);
  assert_eq!(ty_of("x: string[] = []\nx"), Type::Array(Box::new(Type::String)));
}

#[test]
fn initializers_widen_implicitly() {
  let bound = bind_ok("x: double = 1");
  let BoundStmt::VarDecl(decl) = &bound[0] else {
    panic!()
  };
  let init = decl.init.as_ref().unwrap();
  assert_eq!(init.ty, Type::Double);
  assert!(matches!(init.kind, BoundExprKind::Convert(_)));
}

#[test]
fn assignment_to_an_unseen_name_declares_any() {
  assert_eq!(ty_of("x = 1\nx"), Type::Any);
}

#[test]
fn assignment_converts_to_the_declared_type() {
  let bound = bind_ok("x: double = 1.0\nx = 2");
  let BoundStmt::Assign(assign) = &bound[1] else {
    panic!()
  };
  assert!(matches!(assign.value.kind, BoundExprKind::Convert(_)));

  let messages = bind_err("x: int = 1\nx = 2.5");
  assert!(messages[0].contains("cannot convert"));
}

#[test]
fn declaration_errors() {
  assert!(bind_err("x: point = 1")[0].contains("unknown type"));
  assert!(bind_err("x: void")[0].contains("void"));
  assert!(bind_err("x: int = 1\nx: int = 2")[0].contains("already declared"));
}

#[test]
fn shadowing_in_an_inner_block_is_fine() {
  bind_ok(indoc! {"
    x: int = 1
    if true:
        x: string = \"inner\"
  "});
}

#[test]
fn conditions_must_be_bool() {
  assert!(bind_err("if 1: print(1)")[0].contains("condition must be of type `bool`"));
  assert!(bind_err("while 1.5: print(1)")[0].contains("condition"));
  // `any` is rejected too
  assert!(bind_err("x = 1\nif x: print(x)")[0].contains("condition"));
}

#[test]
fn for_in_requires_an_array() {
  bind_ok("a: int[] = [1]\nfor x in a:\n    print(x)\n");
  bind_ok("a = [1]\nfor x in a:\n    print(x)\n");
  assert!(bind_err("for x in 1:\n    print(x)\n")[0].contains("cannot iterate"));
}

#[test]
fn for_in_types_the_loop_variable() {
  assert_eq!(
    ty_of(indoc! {"
      a: int[] = [1]
      y: int = 0
      for x in a:
          y = x
      y
    "}),
    Type::Int
  );
}

#[test]
fn name_resolution_errors() {
  assert!(bind_err("missing")[0].contains("undeclared variable"));
  assert!(bind_err("missing()")[0].contains("undeclared function"));
}

#[test]
fn call_arity_and_argument_types() {
  assert!(bind_err("print(1, 2)")[0].contains("expects 1 argument(s), found 2"));
  assert!(bind_err("random(\"a\", 1)")[0].contains("cannot convert"));
  bind_ok("random(1, 10)");
}

#[test]
fn calls_take_the_declared_return_type() {
  assert_eq!(
    ty_of(indoc! {"
      fn f():
          return 1
      f()
    "}),
    Type::Any
  );
  assert_eq!(
    ty_of(indoc! {"
      fn g() -> int:
          return 1
      g()
    "}),
    Type::Int
  );
}

#[test]
fn void_expressions_are_not_values() {
  assert!(bind_err("x = print(1)")[0].contains("does not produce a value"));
  assert!(bind_err("print(print(1))")[0].contains("does not produce a value"));
  assert!(bind_err("1 + print(1)")[0].contains("does not produce a value"));
}

#[test]
fn explicit_conversions() {
  assert_eq!(ty_of("int(\"42\")"), Type::Int);
  assert_eq!(ty_of("double(1)"), Type::Double);
  assert_eq!(ty_of("bool(3)"), Type::Bool);
  assert_eq!(ty_of("x = 1.5\nint(x)"), Type::Int);
  assert!(bind_err("int(1.5)")[0].contains("cannot convert"));
  // string -> int only exists in the explicit call form
  assert!(bind_err("x: int = \"42\"")[0].contains("cannot convert"));
  assert!(bind_err("int(1, 2)")[0].contains("exactly one argument"));
}

#[test]
fn operator_errors() {
  assert!(bind_err("true + 1")[0].contains("binary operator `+`"));
  assert!(bind_err("\"a\" < \"b\"")[0].contains("binary operator `<`"));
  assert!(bind_err("\"a\" == 1")[0].contains("binary operator `==`"));
  assert!(bind_err("-\"a\"")[0].contains("unary operator `-`"));
  assert!(bind_err("!1")[0].contains("unary operator `!`"));
}

#[test]
fn increments_require_numeric_variables() {
  assert_eq!(ty_of("x: int = 1\nx++"), Type::Int);
  assert_eq!(ty_of("x = 1\n++x"), Type::Any);
  assert!(bind_err("s: string = \"a\"\ns++")[0].contains("not defined for type `string`"));
}

#[test]
fn index_errors() {
  assert!(bind_err("a: int[] = [1]\nprint(a[\"x\"])")[0].contains("array index"));
  assert!(bind_err("x: int = 1\nprint(x[0])")[0].contains("not indexable"));
}

#[test]
fn index_assignment_checks_the_element_type() {
  bind_ok("a: int[] = [1]\na[0] = 2");
  assert!(bind_err("a: int[] = [1]\na[0] = \"s\"")[0].contains("cannot convert"));
}

#[test]
fn function_name_collisions() {
  assert!(bind_err("fn print(x): return x")[0].contains("already in use"));
  assert!(bind_err("x: int = 1\nfn x(): return 1")[0].contains("already in use"));
  assert!(bind_err("fn int(): return 1")[0].contains("already in use"));
}

#[test]
fn duplicate_parameters() {
  assert!(bind_err("fn f(a, a): return a")[0].contains("duplicate parameter"));
}

#[test]
fn functions_can_recurse() {
  bind_ok(indoc! {"
    fn fib(n: int) -> int:
        if n < 2:
            return n
        return fib(n - 1) + fib(n - 2)
  "});
}

#[test]
fn parameters_default_to_any() {
  bind_ok(indoc! {"
    fn greet(name):
        return \"hi \" + name
    greet(1)
    greet(\"you\")
  "});
}

#[test]
fn return_values_are_unchecked() {
  // the declared return type is not enforced against `return`
  bind_ok(indoc! {"
    fn f() -> int:
        return \"not an int\"
  "});
}

#[test]
fn one_error_node_per_diagnostic() {
  for src in [
    "missing",
    "1 + true",
    "x: point = 1",
    "print(1, 2)",
    "if 1: print(1)",
    "a: int[] = [1]\nprint(a[\"x\"])\nb: unknown = 2",
    // failed subexpressions poison their parents instead of re-reporting
    "x: int = [missing]",
    "a: int[] = [1]\nprint(a[missing] + true)",
    "fn f(x) -> int:\n    return x\nprint(f(missing) + true)",
  ] {
    let (bound, diagnostics) = bind_src(src);
    let errors: usize = bound.iter().map(count_stmt_errors).sum();
    assert_eq!(
      errors,
      diagnostics.len(),
      "error nodes and diagnostics diverge for {src:?}"
    );
  }
}

fn count_stmt_errors(stmt: &BoundStmt) -> usize {
  match stmt {
    BoundStmt::Block(body) => body.iter().map(count_stmt_errors).sum(),
    BoundStmt::VarDecl(decl) => decl.init.as_ref().map(count_expr_errors).unwrap_or(0),
    BoundStmt::Func(func) => count_stmt_errors(&func.body),
    BoundStmt::Assign(assign) => count_expr_errors(&assign.value),
    BoundStmt::IndexAssign(assign) => {
      count_expr_errors(&assign.array)
        + count_expr_errors(&assign.index)
        + count_expr_errors(&assign.value)
    }
    BoundStmt::If(v) => {
      count_expr_errors(&v.cond)
        + count_stmt_errors(&v.then)
        + v.otherwise.as_ref().map(count_stmt_errors).unwrap_or(0)
    }
    BoundStmt::While(v) | BoundStmt::DoWhile(v) => {
      count_expr_errors(&v.cond) + count_stmt_errors(&v.body)
    }
    BoundStmt::ForIn(v) => count_expr_errors(&v.iter) + count_stmt_errors(&v.body),
    BoundStmt::Return(v) => v.value.as_ref().map(count_expr_errors).unwrap_or(0),
    BoundStmt::Expr(expr) => count_expr_errors(expr),
  }
}

fn count_expr_errors(expr: &BoundExpr) -> usize {
  match &expr.kind {
    BoundExprKind::Error => 1,
    BoundExprKind::Int(_)
    | BoundExprKind::Double(_)
    | BoundExprKind::Bool(_)
    | BoundExprKind::Str(_)
    | BoundExprKind::Var(_) => 0,
    BoundExprKind::Array(items) => items.iter().map(count_expr_errors).sum(),
    BoundExprKind::Index(index) => {
      count_expr_errors(&index.target) + count_expr_errors(&index.index)
    }
    BoundExprKind::Unary(unary) => count_expr_errors(&unary.right),
    BoundExprKind::Increment(_) => 0,
    BoundExprKind::Binary(binary) => {
      count_expr_errors(&binary.left) + count_expr_errors(&binary.right)
    }
    BoundExprKind::Call(call) => call.args.iter().map(count_expr_errors).sum(),
    BoundExprKind::Convert(inner) => count_expr_errors(inner),
  }
}
