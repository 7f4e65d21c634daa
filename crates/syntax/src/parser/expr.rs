use super::*;
use crate::ast::{BinaryOp, PostfixOp, UnaryOp};

impl<'src> Parser<'src> {
  pub(super) fn expr(&mut self) -> Result<ast::Expr<'src>> {
    self.binary_expr(0)
  }

  /// Precedence climbing over the binary operator table. Every operator is
  /// left-associative, so an operator of equal precedence ends the climb.
  fn binary_expr(&mut self, min: u8) -> Result<ast::Expr<'src>> {
    let mut left = self.unary_expr()?;
    while let Some((prec, op)) = binary_op(self.current().kind) {
      if prec <= min {
        break;
      }
      self.bump();
      let right = self.binary_expr(prec)?;
      left = ast::expr_binary(left.span.start..right.span.end, op, left, right);
    }
    Ok(left)
  }

  fn unary_expr(&mut self) -> Result<ast::Expr<'src>> {
    let op = match self.current().kind {
      Op_Plus => UnaryOp::Plus,
      Op_Minus => UnaryOp::Minus,
      Op_Bang => UnaryOp::Not,
      Op_PlusPlus => UnaryOp::Inc,
      Op_MinusMinus => UnaryOp::Dec,
      _ => return self.postfix_expr(),
    };
    self.bump();
    let start = self.previous().span.start;
    let right = self.unary_expr()?;
    if matches!(op, UnaryOp::Inc | UnaryOp::Dec) && !matches!(&*right, ast::ExprKind::Var(..)) {
      return Err(SyntaxError::new(
        "increment or decrement target must be a variable",
        right.span,
      ));
    }
    Ok(ast::expr_unary(start..right.span.end, op, right))
  }

  pub(super) fn postfix_expr(&mut self) -> Result<ast::Expr<'src>> {
    let mut expr = self.primary_expr()?;
    loop {
      match self.current().kind {
        Brk_ParenL => {
          let args = self.call_args()?;
          expr = ast::expr_call(expr.span.start..self.previous().span.end, expr, args);
        }
        Brk_SquareL => {
          self.bump();
          let index = self.expr()?;
          self.expect(Brk_SquareR)?;
          expr = ast::expr_index(expr.span.start..self.previous().span.end, expr, index);
        }
        Op_PlusPlus | Op_MinusMinus => {
          let op = match self.current().kind {
            Op_PlusPlus => PostfixOp::Inc,
            _ => PostfixOp::Dec,
          };
          self.bump();
          if !matches!(&*expr, ast::ExprKind::Var(..)) {
            return Err(SyntaxError::new(
              "increment or decrement target must be a variable",
              expr.span,
            ));
          }
          expr = ast::expr_postfix(expr.span.start..self.previous().span.end, op, expr);
        }
        _ => break,
      }
    }
    Ok(expr)
  }

  fn primary_expr(&mut self) -> Result<ast::Expr<'src>> {
    self.check_recursion_limit(self.current().span)?;

    if self.bump_if(Lit_Bool) {
      let token = self.previous();
      return Ok(ast::lit::bool(token.span, &token.lexeme));
    }

    if self.bump_if(Lit_Number) {
      let token = self.previous();
      return Ok(ast::lit::number(token.span, token.lexeme.clone()));
    }

    if self.bump_if(Lit_String) {
      let token = self.previous();
      return Ok(ast::lit::str(token.span, token.lexeme.clone()));
    }

    if self.current().is(Lit_Ident) {
      return Ok(ast::expr_var(self.ident()?));
    }

    if self.bump_if(Brk_SquareL) {
      let start = self.previous().span.start;
      let mut items = vec![];
      if !self.current().is(Brk_SquareR) {
        items.push(self.expr()?);
        while self.bump_if(Tok_Comma) && !self.current().is(Brk_SquareR) {
          items.push(self.expr()?);
        }
      }
      self.expect(Brk_SquareR)?;
      let end = self.previous().span.end;
      return Ok(ast::expr_array(start..end, items));
    }

    if self.bump_if(Brk_ParenL) {
      let start = self.previous().span.start;
      let inner = self.expr()?;
      self.expect(Brk_ParenR)?;
      let end = self.previous().span.end;
      return Ok(ast::expr_paren(start..end, inner));
    }

    Err(SyntaxError::new("unexpected token", self.current().span))
  }

  fn call_args(&mut self) -> Result<Vec<ast::Expr<'src>>> {
    let mut args = Vec::new();
    self.expect(Brk_ParenL)?;
    if !self.current().is(Brk_ParenR) {
      args.push(self.expr()?);
      while self.bump_if(Tok_Comma) && !self.current().is(Brk_ParenR) {
        args.push(self.expr()?);
      }
    }
    self.expect(Brk_ParenR)?;
    Ok(args)
  }
}

fn binary_op(kind: TokenKind) -> Option<(u8, BinaryOp)> {
  let v = match kind {
    Op_Star => (4, BinaryOp::Mul),
    Op_Slash => (4, BinaryOp::Div),
    Op_Plus => (3, BinaryOp::Add),
    Op_Minus => (3, BinaryOp::Sub),
    Op_EqualEqual => (2, BinaryOp::Eq),
    Op_BangEqual => (2, BinaryOp::Neq),
    Op_Less => (2, BinaryOp::Less),
    Op_LessEqual => (2, BinaryOp::LessEq),
    Op_More => (2, BinaryOp::More),
    Op_MoreEqual => (2, BinaryOp::MoreEq),
    Op_AndAnd => (1, BinaryOp::And),
    Op_PipePipe => (1, BinaryOp::Or),
    _ => return None,
  };
  Some(v)
}
