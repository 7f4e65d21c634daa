use indoc::indoc;

use super::TokenKind::*;
use super::*;

fn kinds(src: &str) -> Vec<TokenKind> {
  lex(src).unwrap().into_iter().map(|t| t.kind).collect()
}

fn count(src: &str, kind: TokenKind) -> usize {
  kinds(src).into_iter().filter(|k| *k == kind).count()
}

#[test]
fn empty_input_is_just_eof() {
  assert_eq!(kinds(""), vec![Tok_Eof]);
}

#[test]
fn newline_only_input() {
  assert_eq!(kinds("\n\n"), vec![Tok_Newline, Tok_Newline, Tok_Eof]);
}

#[test]
fn basic_tokens() {
  assert_eq!(
    kinds("x = 1 + 2"),
    vec![Lit_Ident, Op_Equal, Lit_Number, Op_Plus, Lit_Number, Tok_Eof]
  );
}

#[test]
fn operators_match_greedily() {
  assert_eq!(
    kinds("== = ++ + >= > != ! -> -"),
    vec![
      Op_EqualEqual,
      Op_Equal,
      Op_PlusPlus,
      Op_Plus,
      Op_MoreEqual,
      Op_More,
      Op_BangEqual,
      Op_Bang,
      Tok_Arrow,
      Op_Minus,
      Tok_Eof
    ]
  );
}

#[test]
fn keywords_versus_identifiers() {
  assert_eq!(
    kinds("if iff in int fn fnord do done"),
    vec![
      Kw_If, Lit_Ident, Kw_In, Lit_Ident, Kw_Fn, Lit_Ident, Kw_Do, Lit_Ident, Tok_Eof
    ]
  );
}

#[test]
fn numbers() {
  let tokens = lex("0xFF 0x1a 123 1.5 0").unwrap();
  let lexemes: Vec<&str> = tokens
    .iter()
    .filter(|t| t.is(Lit_Number))
    .map(|t| t.lexeme.as_ref())
    .collect();
  assert_eq!(lexemes, vec!["0xFF", "0x1a", "123", "1.5", "0"]);
}

#[test]
fn comments_are_skipped() {
  assert_eq!(
    kinds("x = 1 # the rest is ignored = + -\ny = 2"),
    vec![
      Lit_Ident, Op_Equal, Lit_Number, Tok_Newline, Lit_Ident, Op_Equal, Lit_Number, Tok_Eof
    ]
  );
}

#[test]
fn indentation_produces_matched_markers() {
  let src = indoc! {"
    if x:
        y = 1
    z = 2
  "};
  assert_eq!(
    kinds(src),
    vec![
      Kw_If, Lit_Ident, Tok_Colon, Tok_Newline, Tok_Indent, Lit_Ident, Op_Equal, Lit_Number,
      Tok_Newline, Tok_Dedent, Lit_Ident, Op_Equal, Lit_Number, Tok_Newline, Tok_Eof
    ]
  );
}

#[test]
fn dedents_drain_at_eof() {
  let src = "if x:\n    if y:\n        z = 1";
  let kinds = kinds(src);
  assert_eq!(count(src, Tok_Indent), 2);
  assert_eq!(count(src, Tok_Dedent), 2);
  // both dedents sit right before the eof
  assert_eq!(&kinds[kinds.len() - 3..], &[Tok_Dedent, Tok_Dedent, Tok_Eof]);
}

#[test]
fn net_indentation_is_zero() {
  for src in [
    "",
    "x = 1",
    "if a:\n    b = 1\n",
    "if a:\n    if b:\n            c = 1\n",
    "if a:\n\tb = 1\nc = 2\n",
  ] {
    assert_eq!(count(src, Tok_Indent), count(src, Tok_Dedent), "in {src:?}");
  }
}

#[test]
fn a_tab_is_one_unit() {
  assert_eq!(kinds("if x:\n\ty = 1\n"), kinds("if x:\n    y = 1\n"));
}

#[test]
fn a_tab_resets_the_space_run() {
  // two spaces, a tab, two more spaces: the partial runs are ignored
  let src = "if x:\n  \t  y = 1\n";
  assert_eq!(count(src, Tok_Indent), 1);
}

#[test]
fn short_space_runs_do_not_indent() {
  let src = "if x:\n   y = 1\n";
  assert_eq!(count(src, Tok_Indent), 0);
}

#[test]
fn eight_spaces_are_two_units() {
  let src = "if x:\n        y = 1\n";
  assert_eq!(count(src, Tok_Indent), 2);
  assert_eq!(count(src, Tok_Dedent), 2);
}

#[test]
fn blank_and_comment_lines_keep_the_block_open() {
  let src = indoc! {"
    if x:
        y = 1

    # a comment at column zero
        z = 2
  "};
  assert_eq!(count(src, Tok_Indent), 1);
  assert_eq!(count(src, Tok_Dedent), 1);
}

#[test]
fn crlf_newlines() {
  assert_eq!(
    kinds("x = 1\r\ny = 2\r\n"),
    vec![
      Lit_Ident, Op_Equal, Lit_Number, Tok_Newline, Lit_Ident, Op_Equal, Lit_Number, Tok_Newline,
      Tok_Eof
    ]
  );
}

#[test]
fn string_lexemes_drop_the_quotes() {
  let src = r#"x = "hello""#;
  let tokens = lex(src).unwrap();
  let s = tokens.iter().find(|t| t.is(Lit_String)).unwrap();
  assert_eq!(s.lexeme.as_ref(), "hello");
  assert_eq!(&src[s.span], "\"hello\"");
}

#[test]
fn unterminated_string_is_fatal() {
  let err = lex("x = \"oops").unwrap_err();
  assert_eq!(err.message.as_ref(), "unterminated string");
  let err = lex("x = f\"oops").unwrap_err();
  assert_eq!(err.message.as_ref(), "unterminated f-string");
}

#[test]
fn stray_characters_become_error_tokens() {
  assert!(kinds("x = @").contains(&Tok_Error));
}

#[test]
fn fstring_desugars_to_concatenation() {
  assert_eq!(
    kinds(r#"f"a{x}b""#),
    vec![
      Brk_ParenL, Lit_String, Op_Plus, Brk_ParenL, Lit_Ident, Brk_ParenR, Op_Plus, Lit_String,
      Brk_ParenR, Tok_Eof
    ]
  );
}

#[test]
fn fstring_with_only_an_interpolation_still_emits_strings() {
  let tokens = lex(r#"f"{x}""#).unwrap();
  let strings: Vec<&str> = tokens
    .iter()
    .filter(|t| t.is(Lit_String))
    .map(|t| t.lexeme.as_ref())
    .collect();
  assert_eq!(strings, vec!["", ""]);
}

#[test]
fn fstring_interpolation_spans_are_rebased() {
  let src = r#"x = f"hi {name}!""#;
  let tokens = lex(src).unwrap();
  let ident = tokens
    .iter()
    .filter(|t| t.is(Lit_Ident))
    .nth(1)
    .unwrap();
  assert_eq!(ident.lexeme.as_ref(), "name");
  assert_eq!(&src[ident.span], "name");
}

#[test]
fn fstring_interpolations_relex_whole_expressions() {
  assert_eq!(
    kinds(r#"f"{a + b(1)}""#),
    vec![
      Brk_ParenL, Lit_String, Op_Plus, Brk_ParenL, Lit_Ident, Op_Plus, Lit_Ident, Brk_ParenL,
      Lit_Number, Brk_ParenR, Brk_ParenR, Op_Plus, Lit_String, Brk_ParenR, Tok_Eof
    ]
  );
}

#[test]
fn unclosed_interpolation_is_fatal() {
  let err = lex(r#"f"a{x""#).unwrap_err();
  assert_eq!(err.message.as_ref(), "unterminated expression in f-string");
}

#[test]
fn lexemes_respect_original_offsets() {
  let src = indoc! {r#"
    fn add(a, b):
        # sum
        return a + b
    x = add(1, 2"extra")
  "#};
  for token in lex(src).unwrap() {
    match token.kind {
      Tok_Indent | Tok_Dedent | Tok_Eof => assert!(token.span.is_empty()),
      Lit_String => assert_eq!(&src[token.span], format!("\"{}\"", token.lexeme)),
      _ => assert_eq!(&src[token.span], token.lexeme.as_ref()),
    }
  }
}
