#![deny(unused_must_use)]

use span::Span;

use crate::ast;
use crate::lexer::TokenKind::*;
use crate::lexer::{lex, Token, TokenKind};
use crate::{Result, SyntaxError};

/// Tokenize and parse `src` into its top-level statements.
pub fn parse(src: &str) -> Result<ast::Module<'_>> {
  let tokens = lex(src)?;
  Parser::new(tokens).module()
}

struct Parser<'src> {
  tokens: Vec<Token<'src>>,
  pos: usize,
}

impl<'src> Parser<'src> {
  fn new(tokens: Vec<Token<'src>>) -> Self {
    Self { tokens, pos: 0 }
  }

  fn module(mut self) -> Result<ast::Module<'src>> {
    let mut module = ast::Module::new();

    while !self.current().is(Tok_Eof) {
      if self.bump_if(Tok_Newline) {
        continue;
      }
      let stmt = self.stmt()?;
      module.body.push(stmt);
    }

    Ok(module)
  }

  #[inline]
  fn current(&self) -> &Token<'src> {
    &self.tokens[self.pos]
  }

  #[inline]
  fn previous(&self) -> &Token<'src> {
    &self.tokens[self.pos.saturating_sub(1)]
  }

  #[inline]
  fn peek(&self, n: usize) -> &Token<'src> {
    self
      .tokens
      .get(self.pos + n)
      .unwrap_or_else(|| self.tokens.last().unwrap())
  }

  /// Move forward by one token, returning the previous one.
  /// The final EOF token is never consumed.
  #[inline]
  fn bump(&mut self) -> &Token<'src> {
    if !self.current().is(Tok_Eof) {
      self.pos += 1;
    }
    self.previous()
  }

  #[inline]
  fn bump_if(&mut self, kind: TokenKind) -> bool {
    if self.current().is(kind) {
      self.bump();
      true
    } else {
      false
    }
  }

  #[inline]
  fn expect(&mut self, kind: TokenKind) -> Result<()> {
    if self.bump_if(kind) {
      Ok(())
    } else {
      Err(SyntaxError::new(
        format!("expected `{}`", kind.name()),
        self.current().span,
      ))
    }
  }

  fn ident(&mut self) -> Result<ast::Ident<'src>> {
    self.expect(Lit_Ident)?;
    let token = self.previous();
    Ok(ast::Ident::new(token.span, token.lexeme.clone()))
  }
}

mod expr;
mod stmt;

impl<'src> Parser<'src> {
  // On average, a single parse method consumes between 10 and 700 bytes of
  // stack space. Assuming ~50 recursive calls per dive and 700 bytes of stack
  // space per call, a dive requires 50 * 700 = 35k bytes of stack space.
  // For future proofing, this value is rounded up to 64k bytes.
  const MINIMUM_STACK_REQUIRED: usize = 64_000;

  #[cfg(any(target_family = "wasm", not(feature = "check-recursion-limit")))]
  fn check_recursion_limit(&self, _span: Span) -> Result<()> {
    Ok(())
  }

  #[cfg(all(not(target_family = "wasm"), feature = "check-recursion-limit"))]
  fn check_recursion_limit(&self, span: Span) -> Result<()> {
    if stacker::remaining_stack()
      .map(|available| available > Self::MINIMUM_STACK_REQUIRED)
      .unwrap_or(true)
    {
      Ok(())
    } else {
      Err(SyntaxError::new("nesting limit reached", span))
    }
  }
}
