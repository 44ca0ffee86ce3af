// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use anyhow::Result;
use constraint_miner::unstable::*;

fn tokens(text: &str) -> Result<Vec<(TokenKind, String)>> {
    let source = Source::from_contents("<lexer>".to_string(), text.to_string())?;
    let mut lexer = Lexer::new(&source);
    let mut tokens = vec![];
    loop {
        let tok = lexer.next_token()?;
        if tok.0 == TokenKind::Eof {
            break;
        }
        tokens.push((tok.0.clone(), tok.1.text().to_string()));
    }
    Ok(tokens)
}

#[test]
fn symbols_and_identifiers() -> Result<()> {
    let toks = tokens("a.b <= 10 && !c != d || e >= f")?;
    let texts: Vec<&str> = toks.iter().map(|(_, t)| t.as_str()).collect();
    assert_eq!(
        texts,
        vec!["a.b", "<=", "10", "&&", "!", "c", "!=", "d", "||", "e", ">=", "f"]
    );
    assert_eq!(toks[0].0, TokenKind::Ident);
    assert_eq!(toks[2].0, TokenKind::Number);
    Ok(())
}

#[test]
fn comments_are_skipped() -> Result<()> {
    let toks = tokens("a # hash comment\n// slash comment\nb")?;
    let texts: Vec<&str> = toks.iter().map(|(_, t)| t.as_str()).collect();
    assert_eq!(texts, vec!["a", "b"]);
    Ok(())
}

#[test]
fn strings_and_numbers() -> Result<()> {
    let toks = tokens(r#""a\"b" 1.5e3 `raw\n`"#)?;
    assert_eq!(toks[0], (TokenKind::String, r#"a\"b"#.to_string()));
    assert_eq!(toks[1], (TokenKind::Number, "1.5e3".to_string()));
    assert_eq!(toks[2], (TokenKind::RawString, r"raw\n".to_string()));
    Ok(())
}

#[test]
fn errors_carry_location() {
    let err = match tokens("a &\nb") {
        Ok(_) => panic!("single `&` must not lex"),
        Err(e) => e.to_string(),
    };
    assert!(err.contains("<lexer>:1:"), "{err}");
    assert!(err.contains("expecting `&&`"), "{err}");

    let err = match tokens("address. street") {
        Ok(_) => panic!("dangling `.` must not lex"),
        Err(e) => e.to_string(),
    };
    assert!(err.contains("must be followed by a member name"), "{err}");
}
