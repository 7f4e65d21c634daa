use beef::lean::Cow;

use super::*;

impl<'src> Parser<'src> {
  pub(super) fn stmt(&mut self) -> Result<ast::Stmt<'src>> {
    self.check_recursion_limit(self.current().span)?;

    let stmt = match self.current().kind {
      Tok_Indent => self.block_stmt()?,
      Kw_If => self.if_stmt()?,
      Kw_While => self.while_stmt()?,
      Kw_Do => self.do_while_stmt()?,
      Kw_For => self.for_in_stmt()?,
      Kw_Fn => self.func_stmt()?,
      Kw_Return => self.return_stmt()?,
      Lit_Ident if self.peek(1).is(Tok_Colon) => self.var_decl_stmt()?,
      Lit_Ident
        if matches!(
          self.peek(1).kind,
          Op_Equal | Op_PlusEqual | Op_MinusEqual | Brk_SquareL
        ) =>
      {
        self.assign_stmt()?
      }
      Tok_Error => {
        return Err(SyntaxError::new(
          format!("unexpected character `{}`", self.current().lexeme),
          self.current().span,
        ))
      }
      _ => self.expr_stmt()?,
    };
    self.bump_if(Tok_Newline);

    Ok(stmt)
  }

  fn block_stmt(&mut self) -> Result<ast::Stmt<'src>> {
    self.expect(Tok_Indent)?;
    let start = self.previous().span;

    let mut body = vec![];
    while !self.current().is(Tok_Dedent) && !self.current().is(Tok_Eof) {
      if self.bump_if(Tok_Newline) {
        continue;
      }
      body.push(self.stmt()?);
    }
    self.bump_if(Tok_Dedent);

    let end = self.previous().span;
    Ok(ast::block_stmt(start.join(end), body))
  }

  /// The statement after a `:`, either inline or an indented block on the
  /// next line.
  fn body(&mut self) -> Result<ast::Stmt<'src>> {
    self.bump_if(Tok_Newline);
    self.stmt()
  }

  fn var_decl_stmt(&mut self) -> Result<ast::Stmt<'src>> {
    let name = self.ident()?;
    self.expect(Tok_Colon)?;
    let ty = self.type_name()?;
    let init = if self.bump_if(Op_Equal) {
      Some(self.expr()?)
    } else {
      None
    };
    let end = self.previous().span;
    Ok(ast::var_decl_stmt(name.span.join(end), name, ty, init))
  }

  /// A type identifier with any number of `[]` suffixes. Each suffix is
  /// folded into the identifier text so the type parser can rebuild nested
  /// array types from it.
  fn type_name(&mut self) -> Result<ast::Ident<'src>> {
    let mut ty = self.ident()?;
    while self.current().is(Brk_SquareL) && self.peek(1).is(Brk_SquareR) {
      self.bump();
      self.bump();
      let end = self.previous().span;
      ty = ast::Ident::new(ty.span.join(end), Cow::from(format!("{}[]", &**ty)));
    }
    Ok(ty)
  }

  fn func_stmt(&mut self) -> Result<ast::Stmt<'src>> {
    self.expect(Kw_Fn)?;
    let start = self.previous().span;
    let name = self.ident()?;

    self.expect(Brk_ParenL)?;
    let mut params = vec![];
    if !self.current().is(Brk_ParenR) {
      params.push(self.param()?);
      while self.bump_if(Tok_Comma) && !self.current().is(Brk_ParenR) {
        params.push(self.param()?);
      }
    }
    self.expect(Brk_ParenR)?;

    let ret = if self.bump_if(Tok_Arrow) {
      Some(self.type_name()?)
    } else {
      None
    };
    self.expect(Tok_Colon)?;
    let body = self.body()?;

    let end = self.previous().span;
    Ok(ast::func_stmt(start.join(end), name, params, ret, body))
  }

  fn param(&mut self) -> Result<ast::Param<'src>> {
    let name = self.ident()?;
    let ty = if self.bump_if(Tok_Colon) {
      Some(self.type_name()?)
    } else {
      None
    };
    Ok(ast::Param { name, ty })
  }

  fn if_stmt(&mut self) -> Result<ast::Stmt<'src>> {
    self.expect(Kw_If)?;
    let start = self.previous().span;
    let cond = self.expr()?;
    self.expect(Tok_Colon)?;
    let then = self.body()?;

    let otherwise = if self.bump_if(Kw_Else) {
      self.expect(Tok_Colon)?;
      Some(self.body()?)
    } else {
      None
    };

    let end = self.previous().span;
    Ok(ast::if_stmt(start.join(end), cond, then, otherwise))
  }

  fn while_stmt(&mut self) -> Result<ast::Stmt<'src>> {
    self.expect(Kw_While)?;
    let start = self.previous().span;
    let cond = self.expr()?;
    self.expect(Tok_Colon)?;
    let body = self.body()?;
    let end = self.previous().span;
    Ok(ast::while_stmt(start.join(end), cond, body))
  }

  /// `do:` body, closed by a `while <cond>` line at the same level.
  fn do_while_stmt(&mut self) -> Result<ast::Stmt<'src>> {
    self.expect(Kw_Do)?;
    let start = self.previous().span;
    self.expect(Tok_Colon)?;
    let body = self.body()?;
    self.expect(Kw_While)?;
    let cond = self.expr()?;
    let end = self.previous().span;
    Ok(ast::do_while_stmt(start.join(end), cond, body))
  }

  fn for_in_stmt(&mut self) -> Result<ast::Stmt<'src>> {
    self.expect(Kw_For)?;
    let start = self.previous().span;
    let item = self.ident()?;
    self.expect(Kw_In)?;
    let iter = self.expr()?;
    self.expect(Tok_Colon)?;
    let body = self.body()?;
    let end = self.previous().span;
    Ok(ast::for_in_stmt(start.join(end), item, iter, body))
  }

  fn return_stmt(&mut self) -> Result<ast::Stmt<'src>> {
    self.expect(Kw_Return)?;
    let start = self.previous().span;
    let value = match self.current().kind {
      Tok_Newline | Tok_Dedent | Tok_Eof => None,
      _ => Some(self.expr()?),
    };
    let end = self.previous().span;
    Ok(ast::return_stmt(start.join(end), value))
  }

  /// The left-hand side is speculatively parsed as a postfix chain; only a
  /// plain variable or an array access may be assigned to. `+=`/`-=` desugar
  /// to an assignment of the matching binary expression.
  fn assign_stmt(&mut self) -> Result<ast::Stmt<'src>> {
    let target = self.postfix_expr()?;
    if !matches!(&*target, ast::ExprKind::Var(..) | ast::ExprKind::Index(..)) {
      return Err(SyntaxError::new("invalid assignment target", target.span));
    }

    let op = match self.current().kind {
      Op_Equal => None,
      Op_PlusEqual => Some(ast::BinaryOp::Add),
      Op_MinusEqual => Some(ast::BinaryOp::Sub),
      _ => {
        return Err(SyntaxError::new("expected `=`", self.current().span));
      }
    };
    self.bump();

    let value = self.expr()?;
    let value = match op {
      Some(op) => {
        let span = target.span.join(value.span);
        ast::expr_binary(span, op, target.clone(), value)
      }
      None => value,
    };

    Ok(ast::assign_stmt(target, value))
  }

  fn expr_stmt(&mut self) -> Result<ast::Stmt<'src>> {
    Ok(ast::expr_stmt(self.expr()?))
  }
}
