use beef::lean::Cow;
use span::{Span, Spanned};

pub type Ident<'src> = Spanned<Cow<'src, str>>;

#[cfg_attr(test, derive(Debug))]
pub struct Module<'src> {
  pub body: Vec<Stmt<'src>>,
}

impl<'src> Module<'src> {
  pub fn new() -> Self {
    Self { body: vec![] }
  }
}

impl<'src> Default for Module<'src> {
  fn default() -> Self {
    Self::new()
  }
}

pub type Stmt<'src> = Spanned<StmtKind<'src>>;

#[cfg_attr(test, derive(Debug))]
#[derive(Clone)]
pub enum StmtKind<'src> {
  Block(Vec<Stmt<'src>>),
  VarDecl(Box<VarDecl<'src>>),
  Func(Box<Func<'src>>),
  Assign(Box<Assign<'src>>),
  If(Box<If<'src>>),
  While(Box<While<'src>>),
  DoWhile(Box<While<'src>>),
  ForIn(Box<ForIn<'src>>),
  Return(Box<Return<'src>>),
  Expr(Box<Expr<'src>>),
}

/// `name: type` with the type identifier carrying one trailing `[]` pair per
/// array dimension, e.g. `int[][]`.
#[cfg_attr(test, derive(Debug))]
#[derive(Clone)]
pub struct VarDecl<'src> {
  pub name: Ident<'src>,
  pub ty: Ident<'src>,
  pub init: Option<Expr<'src>>,
}

#[cfg_attr(test, derive(Debug))]
#[derive(Clone)]
pub struct Func<'src> {
  pub name: Ident<'src>,
  pub params: Vec<Param<'src>>,
  pub ret: Option<Ident<'src>>,
  pub body: Stmt<'src>,
}

#[cfg_attr(test, derive(Debug))]
#[derive(Clone)]
pub struct Param<'src> {
  pub name: Ident<'src>,
  pub ty: Option<Ident<'src>>,
}

#[cfg_attr(test, derive(Debug))]
#[derive(Clone)]
pub struct Assign<'src> {
  pub target: Expr<'src>,
  pub value: Expr<'src>,
}

#[cfg_attr(test, derive(Debug))]
#[derive(Clone)]
pub struct If<'src> {
  pub cond: Expr<'src>,
  pub then: Stmt<'src>,
  pub otherwise: Option<Stmt<'src>>,
}

#[cfg_attr(test, derive(Debug))]
#[derive(Clone)]
pub struct While<'src> {
  pub cond: Expr<'src>,
  pub body: Stmt<'src>,
}

#[cfg_attr(test, derive(Debug))]
#[derive(Clone)]
pub struct ForIn<'src> {
  pub item: Ident<'src>,
  pub iter: Expr<'src>,
  pub body: Stmt<'src>,
}

#[cfg_attr(test, derive(Debug))]
#[derive(Clone)]
pub struct Return<'src> {
  pub value: Option<Expr<'src>>,
}

pub type Expr<'src> = Spanned<ExprKind<'src>>;

#[cfg_attr(test, derive(Debug))]
#[derive(Clone)]
pub enum ExprKind<'src> {
  /// Number literals keep their lexeme; the binder decides between hex int,
  /// decimal int and double.
  Number(Cow<'src, str>),
  Str(Cow<'src, str>),
  Bool(bool),
  Var(Ident<'src>),
  Array(Vec<Expr<'src>>),
  Index(Box<Index<'src>>),
  Binary(Box<Binary<'src>>),
  Unary(Box<Unary<'src>>),
  Postfix(Box<Postfix<'src>>),
  Call(Box<Call<'src>>),
  Paren(Box<Expr<'src>>),
}

#[cfg_attr(test, derive(Debug))]
#[derive(Clone)]
pub struct Index<'src> {
  pub target: Expr<'src>,
  pub index: Expr<'src>,
}

#[cfg_attr(test, derive(Debug))]
#[derive(Clone)]
pub struct Binary<'src> {
  pub op: BinaryOp,
  pub left: Expr<'src>,
  pub right: Expr<'src>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
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

#[cfg_attr(test, derive(Debug))]
#[derive(Clone)]
pub struct Unary<'src> {
  pub op: UnaryOp,
  pub right: Expr<'src>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
  Plus,
  Minus,
  Not,
  Inc,
  Dec,
}

/// `x++` / `x--`; the parser guarantees the target is a variable.
#[cfg_attr(test, derive(Debug))]
#[derive(Clone)]
pub struct Postfix<'src> {
  pub op: PostfixOp,
  pub target: Expr<'src>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PostfixOp {
  Inc,
  Dec,
}

#[cfg_attr(test, derive(Debug))]
#[derive(Clone)]
pub struct Call<'src> {
  pub target: Expr<'src>,
  pub args: Vec<Expr<'src>>,
}

pub fn block_stmt(s: impl Into<Span>, body: Vec<Stmt>) -> Stmt {
  Stmt::new(s, StmtKind::Block(body))
}

pub fn var_decl_stmt<'src>(
  s: impl Into<Span>,
  name: Ident<'src>,
  ty: Ident<'src>,
  init: Option<Expr<'src>>,
) -> Stmt<'src> {
  Stmt::new(s, StmtKind::VarDecl(Box::new(VarDecl { name, ty, init })))
}

pub fn func_stmt<'src>(
  s: impl Into<Span>,
  name: Ident<'src>,
  params: Vec<Param<'src>>,
  ret: Option<Ident<'src>>,
  body: Stmt<'src>,
) -> Stmt<'src> {
  Stmt::new(
    s,
    StmtKind::Func(Box::new(Func {
      name,
      params,
      ret,
      body,
    })),
  )
}

pub fn assign_stmt<'src>(target: Expr<'src>, value: Expr<'src>) -> Stmt<'src> {
  Stmt::new(
    target.span.start..value.span.end,
    StmtKind::Assign(Box::new(Assign { target, value })),
  )
}

pub fn if_stmt<'src>(
  s: impl Into<Span>,
  cond: Expr<'src>,
  then: Stmt<'src>,
  otherwise: Option<Stmt<'src>>,
) -> Stmt<'src> {
  Stmt::new(
    s,
    StmtKind::If(Box::new(If {
      cond,
      then,
      otherwise,
    })),
  )
}

pub fn while_stmt<'src>(s: impl Into<Span>, cond: Expr<'src>, body: Stmt<'src>) -> Stmt<'src> {
  Stmt::new(s, StmtKind::While(Box::new(While { cond, body })))
}

pub fn do_while_stmt<'src>(s: impl Into<Span>, cond: Expr<'src>, body: Stmt<'src>) -> Stmt<'src> {
  Stmt::new(s, StmtKind::DoWhile(Box::new(While { cond, body })))
}

pub fn for_in_stmt<'src>(
  s: impl Into<Span>,
  item: Ident<'src>,
  iter: Expr<'src>,
  body: Stmt<'src>,
) -> Stmt<'src> {
  Stmt::new(s, StmtKind::ForIn(Box::new(ForIn { item, iter, body })))
}

pub fn return_stmt(s: impl Into<Span>, value: Option<Expr>) -> Stmt {
  Stmt::new(s, StmtKind::Return(Box::new(Return { value })))
}

pub fn expr_stmt(expr: Expr) -> Stmt {
  Stmt::new(expr.span, StmtKind::Expr(Box::new(expr)))
}

pub fn expr_binary<'src>(
  s: impl Into<Span>,
  op: BinaryOp,
  left: Expr<'src>,
  right: Expr<'src>,
) -> Expr<'src> {
  Expr::new(s, ExprKind::Binary(Box::new(Binary { op, left, right })))
}

pub fn expr_unary(s: impl Into<Span>, op: UnaryOp, right: Expr) -> Expr {
  Expr::new(s, ExprKind::Unary(Box::new(Unary { op, right })))
}

pub fn expr_postfix(s: impl Into<Span>, op: PostfixOp, target: Expr) -> Expr {
  Expr::new(s, ExprKind::Postfix(Box::new(Postfix { op, target })))
}

pub fn expr_call<'src>(s: impl Into<Span>, target: Expr<'src>, args: Vec<Expr<'src>>) -> Expr<'src> {
  Expr::new(s, ExprKind::Call(Box::new(Call { target, args })))
}

pub fn expr_index<'src>(s: impl Into<Span>, target: Expr<'src>, index: Expr<'src>) -> Expr<'src> {
  Expr::new(s, ExprKind::Index(Box::new(Index { target, index })))
}

pub fn expr_array(s: impl Into<Span>, items: Vec<Expr>) -> Expr {
  Expr::new(s, ExprKind::Array(items))
}

pub fn expr_paren(s: impl Into<Span>, inner: Expr) -> Expr {
  Expr::new(s, ExprKind::Paren(Box::new(inner)))
}

pub fn expr_var(name: Ident) -> Expr {
  Expr::new(name.span, ExprKind::Var(name))
}

pub mod lit {
  use super::*;

  pub fn bool<'src>(s: impl Into<Span>, lexeme: &str) -> Expr<'src> {
    let v = match lexeme {
      "true" => true,
      "false" => false,
      _ => unreachable!("bool is only ever `true` or `false`"),
    };
    Expr::new(s, ExprKind::Bool(v))
  }

  pub fn number<'src>(s: impl Into<Span>, lexeme: Cow<'src, str>) -> Expr<'src> {
    Expr::new(s, ExprKind::Number(lexeme))
  }

  pub fn str<'src>(s: impl Into<Span>, content: Cow<'src, str>) -> Expr<'src> {
    Expr::new(s, ExprKind::Str(content))
  }
}
