//! Integration tests for the lexer

use latent_language::{TokenKind, tokenize};

fn kinds(source: &str) -> Vec<TokenKind> {
    tokenize(source).into_iter().map(|t| t.kind).collect()
}

#[test]
fn program_header() {
    assert_eq!(
        kinds("program p { }"),
        vec![
            TokenKind::Keyword,
            TokenKind::Ident,
            TokenKind::Symbol,
            TokenKind::Symbol,
            TokenKind::Eof
        ]
    );
}

#[test]
fn latent_comparison_operators() {
    let ops: Vec<String> = tokenize("a ~= b !~= c")
        .into_iter()
        .filter(|t| t.kind == TokenKind::Op)
        .map(|t| t.text)
        .collect();
    assert_eq!(ops, vec!["~=", "!~="]);
}

#[test]
fn wire_blob_is_verbatim() {
    let tokens = tokenize(r#"return {14:{"@0":123}};"#);
    assert_eq!(tokens[1].kind, TokenKind::Blob);
    assert_eq!(tokens[1].text, r#"{14:{"@0":123}}"#);
}

#[test]
fn lexer_never_fails() {
    for source in ["\u{0}", "\"", "/*", "{1:", "§§§", "ls.", "1.", "@@@"] {
        let tokens = tokenize(source);
        assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof), "{source:?}");
    }
}

#[test]
fn lines_are_tracked_for_errors() {
    let tokens = tokenize("program p {\n  block m() {\n    oops\n  }\n}");
    let oops = tokens.iter().find(|t| t.text == "oops").unwrap();
    assert_eq!(oops.line(), 3);
}
