#![allow(non_camel_case_types)]

use std::borrow::Borrow;
use std::mem::discriminant;

use beef::lean::Cow;
use logos::Logos;
use span::Span;

use crate::{Result, SyntaxError};

#[derive(Clone, Debug)]
pub struct Token<'src> {
  pub kind: TokenKind,
  pub lexeme: Cow<'src, str>,
  pub span: Span,
}

impl<'src> Token<'src> {
  pub fn new(kind: TokenKind, lexeme: impl Into<Cow<'src, str>>, span: impl Into<Span>) -> Self {
    Token {
      kind,
      lexeme: lexeme.into(),
      span: span.into(),
    }
  }

  pub fn is(&self, kind: impl Borrow<TokenKind>) -> bool {
    discriminant(&self.kind) == discriminant(kind.borrow())
  }
}

/// Tokenize `src` into a flat vector ending with a single EOF token.
///
/// Lines are folded into NEWLINE/INDENT/DEDENT markers by an indent stack:
/// a tab counts as one unit of indentation, every four consecutive spaces
/// count as one unit, and a tab resets the space run. Blank lines and
/// comment-only lines never touch the stack. F-strings are desugared here
/// into a parenthesized concatenation, re-entering the scanner on every
/// interpolated slice and re-basing its spans onto the original text.
pub fn lex(src: &str) -> Result<Vec<Token<'_>>> {
  Lexer::new(src).run()
}

struct Lexer<'src> {
  src: &'src str,
  tokens: Vec<Token<'src>>,
  indent: Vec<usize>,
  pending_ws: Option<Span>,
  line_start: bool,
}

impl<'src> Lexer<'src> {
  fn new(src: &'src str) -> Self {
    Lexer {
      src,
      tokens: Vec::new(),
      indent: vec![0],
      pending_ws: None,
      line_start: true,
    }
  }

  fn run(mut self) -> Result<Vec<Token<'src>>> {
    let mut inner = TokenKind::lexer(self.src);
    while let Some(kind) = inner.next() {
      let lexeme = inner.slice();
      let span = Span::from(inner.span());

      match kind {
        TokenKind::_Tok_Whitespace => {
          if self.line_start {
            self.pending_ws = Some(span);
          }
        }
        TokenKind::_Tok_Comment => {}
        TokenKind::Tok_Newline => {
          self.tokens.push(Token::new(kind, lexeme, span));
          self.line_start = true;
          self.pending_ws = None;
        }
        TokenKind::_Tok_StrayString => {
          return Err(SyntaxError::new("unterminated string", span));
        }
        TokenKind::_Tok_StrayFString => {
          return Err(SyntaxError::new("unterminated f-string", span));
        }
        TokenKind::Lit_FString => {
          self.apply_indent(span)?;
          self.fstring(lexeme, span)?;
        }
        TokenKind::Lit_String => {
          self.apply_indent(span)?;
          let content = &lexeme[1..lexeme.len() - 1];
          self.tokens.push(Token::new(kind, content, span));
        }
        kind => {
          self.apply_indent(span)?;
          self.tokens.push(Token::new(kind, lexeme, span));
        }
      }
    }

    // close every block left open at the end of input
    let eof = Span::from(self.src.len()..self.src.len());
    while self.indent.pop().filter(|&level| level > 0).is_some() {
      self.tokens.push(Token::new(TokenKind::Tok_Dedent, "", eof));
    }
    self.tokens.push(Token::new(TokenKind::Tok_Eof, "", eof));

    Ok(self.tokens)
  }

  /// Compare the indentation of the line that `at` starts against the stack,
  /// emitting INDENT/DEDENT markers for the difference. Only the first real
  /// token of a line gets here, so blank and comment-only lines are skipped
  /// without ever reaching the stack.
  fn apply_indent(&mut self, at: Span) -> Result<()> {
    if !self.line_start {
      return Ok(());
    }
    self.line_start = false;

    let ws = self.pending_ws.take();
    let units = ws.map(|s| measure_indent(&self.src[s])).unwrap_or(0);
    let mark = Span::from(at.start..at.start);

    let top = *self.indent.last().unwrap();
    if units > top {
      for level in top + 1..=units {
        self.indent.push(level);
        self.tokens.push(Token::new(TokenKind::Tok_Indent, "", mark));
      }
    } else if units < top {
      while units < *self.indent.last().unwrap() {
        self.indent.pop();
        self.tokens.push(Token::new(TokenKind::Tok_Dedent, "", mark));
      }
      if *self.indent.last().unwrap() != units {
        return Err(SyntaxError::new("Indentation error", at));
      }
    }

    Ok(())
  }

  /// Desugar `f"a{x}b"` into the token sequence `( "a" + ( x ) + "b" )`.
  /// Chunks may be empty, so `f"{x}"` still begins with a string token.
  fn fstring(&mut self, lexeme: &'src str, span: Span) -> Result<()> {
    let body = &lexeme[2..lexeme.len() - 1];
    let base = span.start + 2;

    let open = Span::from(span.start..span.start + 2);
    let close = Span::from(span.end - 1..span.end);
    self
      .tokens
      .push(Token::new(TokenKind::Brk_ParenL, "(", open));

    let mut pos = 0;
    loop {
      let brace = body[pos..].find('{').map(|i| pos + i);
      let chunk = &body[pos..brace.unwrap_or(body.len())];
      let chunk_span = Span::from(base + pos..base + pos + chunk.len());
      if pos > 0 {
        let join = Span::from(chunk_span.start..chunk_span.start);
        self.tokens.push(Token::new(TokenKind::Op_Plus, "+", join));
      }
      self
        .tokens
        .push(Token::new(TokenKind::Lit_String, chunk, chunk_span));

      let Some(brace) = brace else { break };
      let end = match body[brace..].find('}') {
        Some(i) => brace + i,
        None => {
          let at = Span::from(base + brace..base + brace + 1);
          return Err(SyntaxError::new("unterminated expression in f-string", at));
        }
      };

      let mark = Span::from(base + brace..base + brace + 1);
      self.tokens.push(Token::new(TokenKind::Op_Plus, "+", mark));
      self
        .tokens
        .push(Token::new(TokenKind::Brk_ParenL, "(", mark));
      self.expr_tokens(&body[brace + 1..end], base + brace + 1)?;
      let mark = Span::from(base + end..base + end + 1);
      self
        .tokens
        .push(Token::new(TokenKind::Brk_ParenR, ")", mark));

      pos = end + 1;
    }

    self
      .tokens
      .push(Token::new(TokenKind::Brk_ParenR, ")", close));

    Ok(())
  }

  /// Re-tokenize one interpolated expression slice. Layout never applies
  /// here; an f-string cannot span lines.
  fn expr_tokens(&mut self, src: &'src str, offset: usize) -> Result<()> {
    let mut inner = TokenKind::lexer(src);
    while let Some(kind) = inner.next() {
      let lexeme = inner.slice();
      let span = Span::from(offset + inner.span().start..offset + inner.span().end);

      match kind {
        TokenKind::_Tok_Whitespace | TokenKind::_Tok_Comment | TokenKind::Tok_Newline => continue,
        TokenKind::_Tok_StrayString => {
          return Err(SyntaxError::new("unterminated string", span));
        }
        TokenKind::_Tok_StrayFString => {
          return Err(SyntaxError::new("unterminated f-string", span));
        }
        TokenKind::Lit_FString => self.fstring(lexeme, span)?,
        TokenKind::Lit_String => {
          let content = &lexeme[1..lexeme.len() - 1];
          self.tokens.push(Token::new(kind, content, span));
        }
        kind => self.tokens.push(Token::new(kind, lexeme, span)),
      }
    }

    Ok(())
  }
}

fn measure_indent(s: &str) -> usize {
  let mut units = 0;
  let mut spaces = 0;
  for c in s.chars() {
    match c {
      '\t' => {
        units += 1;
        spaces = 0;
      }
      ' ' => {
        spaces += 1;
        if spaces == 4 {
          units += 1;
          spaces = 0;
        }
      }
      _ => {}
    }
  }
  units
}

// When adding a token, if it is matched using `token` directive only,
// then it should also be added to `name` below.
#[derive(Clone, Copy, Debug, Logos, PartialEq)]
pub enum TokenKind {
  // Keywords
  #[token("if")]
  Kw_If,
  #[token("else")]
  Kw_Else,
  #[token("do")]
  Kw_Do,
  #[token("while")]
  Kw_While,
  #[token("for")]
  Kw_For,
  #[token("in")]
  Kw_In,
  #[token("fn")]
  Kw_Fn,
  #[token("return")]
  Kw_Return,

  // Brackets
  #[token("(")]
  Brk_ParenL,
  #[token(")")]
  Brk_ParenR,
  #[token("[")]
  Brk_SquareL,
  #[token("]")]
  Brk_SquareR,

  // Misc characters
  #[token(",")]
  Tok_Comma,
  #[token(":")]
  Tok_Colon,
  #[token("->")]
  Tok_Arrow,

  // Equals operators
  #[token("=")]
  Op_Equal,
  #[token("==")]
  Op_EqualEqual,
  #[token("!=")]
  Op_BangEqual,
  #[token("+=")]
  Op_PlusEqual,
  #[token("-=")]
  Op_MinusEqual,

  // Operators
  #[token("+")]
  Op_Plus,
  #[token("-")]
  Op_Minus,
  #[token("*")]
  Op_Star,
  #[token("/")]
  Op_Slash,
  #[token("++")]
  Op_PlusPlus,
  #[token("--")]
  Op_MinusMinus,
  #[token("!")]
  Op_Bang,
  #[token(">")]
  Op_More,
  #[token(">=")]
  Op_MoreEqual,
  #[token("<")]
  Op_Less,
  #[token("<=")]
  Op_LessEqual,
  #[token("&&")]
  Op_AndAnd,
  #[token("||")]
  Op_PipePipe,

  // Literals
  /// `0`, `1.5`, `0xFF`, etc.
  #[regex(r"0[xX][0-9a-fA-F]+")]
  #[regex(r"[0-9]+(\.[0-9]+)?")]
  Lit_Number,
  /// `true` or `false`
  #[token("true")]
  #[token("false")]
  Lit_Bool,
  #[regex(r#""[^"\r\n]*""#)]
  Lit_String,
  /// `f"a{expr}b"`, desugared before the parser ever sees it
  #[regex(r#"f"[^"\r\n]*""#)]
  Lit_FString,
  /// `a`, `b_c`, `__x0`, etc.
  #[regex("[a-zA-Z_][a-zA-Z0-9_]*")]
  Lit_Ident,

  // Layout
  Tok_Indent,
  Tok_Dedent,
  #[regex(r"\r?\n")]
  Tok_Newline,

  #[doc(hidden)]
  #[regex(r"[ \t]+")]
  _Tok_Whitespace,
  #[doc(hidden)]
  #[regex(r"#[^\n]*")]
  _Tok_Comment,
  #[doc(hidden)]
  #[regex(r#""[^"\r\n]*"#)]
  _Tok_StrayString,
  #[doc(hidden)]
  #[regex(r#"f"[^"\r\n]*"#)]
  _Tok_StrayFString,

  /// Stray characters survive as tokens; the parser reports them.
  #[error]
  Tok_Error,
  Tok_Eof,
}

impl TokenKind {
  pub fn name(&self) -> &'static str {
    match self {
      TokenKind::Kw_If => "if",
      TokenKind::Kw_Else => "else",
      TokenKind::Kw_Do => "do",
      TokenKind::Kw_While => "while",
      TokenKind::Kw_For => "for",
      TokenKind::Kw_In => "in",
      TokenKind::Kw_Fn => "fn",
      TokenKind::Kw_Return => "return",
      TokenKind::Brk_ParenL => "(",
      TokenKind::Brk_ParenR => ")",
      TokenKind::Brk_SquareL => "[",
      TokenKind::Brk_SquareR => "]",
      TokenKind::Tok_Comma => ",",
      TokenKind::Tok_Colon => ":",
      TokenKind::Tok_Arrow => "->",
      TokenKind::Op_Equal => "=",
      TokenKind::Op_EqualEqual => "==",
      TokenKind::Op_BangEqual => "!=",
      TokenKind::Op_PlusEqual => "+=",
      TokenKind::Op_MinusEqual => "-=",
      TokenKind::Op_Plus => "+",
      TokenKind::Op_Minus => "-",
      TokenKind::Op_Star => "*",
      TokenKind::Op_Slash => "/",
      TokenKind::Op_PlusPlus => "++",
      TokenKind::Op_MinusMinus => "--",
      TokenKind::Op_Bang => "!",
      TokenKind::Op_More => ">",
      TokenKind::Op_MoreEqual => ">=",
      TokenKind::Op_Less => "<",
      TokenKind::Op_LessEqual => "<=",
      TokenKind::Op_AndAnd => "&&",
      TokenKind::Op_PipePipe => "||",
      TokenKind::Lit_Number => "number",
      TokenKind::Lit_Bool => "bool",
      TokenKind::Lit_String => "string",
      TokenKind::Lit_FString => "f-string",
      TokenKind::Lit_Ident => "identifier",
      TokenKind::Tok_Indent => "<indent>",
      TokenKind::Tok_Dedent => "<dedent>",
      TokenKind::Tok_Newline => "<newline>",
      TokenKind::_Tok_Whitespace => "<whitespace>",
      TokenKind::_Tok_Comment => "<comment>",
      TokenKind::_Tok_StrayString => "<string>",
      TokenKind::_Tok_StrayFString => "<f-string>",
      TokenKind::Tok_Error => "<error>",
      TokenKind::Tok_Eof => "<eof>",
    }
  }
}

#[cfg(test)]
mod tests;
