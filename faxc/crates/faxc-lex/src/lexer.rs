//! The lexer proper.
//!
//! Grounded on `original_source/src/lexer/lexer.py`: maximal-munch
//! chunk scanning over a `(start, end)` window, one physical line at a
//! time, with `combineEscapedLines` run first to fuse backslash
//! continuations and `parseFloats` run last to fuse `123` `.` `45` into
//! one numeric token. Reproduces the reference's match priority
//! (symbol, then keyword/number/identifier/label on a flushed chunk)
//! and its contextual handling of `#include`, block/line comments,
//! quoted runs, the contextual minus sign, and label colons.

use crate::error::{LexError, Result};
use crate::token::{Token, TokenKind};

/// Tokenizes a complete source file into a token stream ending in an
/// end-of-file sentinel.
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut in_comment = false;

    for line in combine_escaped_lines(source) {
        in_comment = tokenize_line(&line, in_comment, &mut tokens)?;
    }

    tokens.push(Token::plain(TokenKind::Eof));
    Ok(fuse_floats(tokens))
}

/// Joins lines ending in `\` with the line that follows, and strips
/// tab characters (matching the reference's blanket `replace("\t", "")`).
fn combine_escaped_lines(source: &str) -> Vec<String> {
    let raw: Vec<String> = source.lines().map(|l| l.replace('\t', "")).collect();
    let mut combined: Vec<String> = Vec::with_capacity(raw.len());

    let mut pending: Option<String> = None;
    for line in raw {
        let joined = match pending.take() {
            Some(prefix) => prefix + &line,
            None => line,
        };

        if let Some(stripped) = joined.strip_suffix('\\') {
            pending = Some(stripped.to_string());
        } else {
            combined.push(joined);
        }
    }
    if let Some(last) = pending {
        combined.push(last);
    }

    combined
}

/// Tokenizes a single (already escape-joined) physical line. Returns
/// the updated "inside a /* */ comment" flag.
fn tokenize_line(line: &str, mut in_comment: bool, out: &mut Vec<Token>) -> Result<bool> {
    let chars: Vec<char> = line.chars().collect();
    let len = chars.len();

    let mut start = 0usize;
    let mut end = 0usize;

    while end < len {
        let symbol = match_symbol(&chars, end);
        let next_symbol = match_symbol(&chars, end + 1);

        // `#include` must stand alone on its line.
        if symbol == Some(TokenKind::Pound) {
            let rest: String = chars[start..].iter().collect();
            if rest.len() >= 8 && &rest[1..8.min(rest.len())] == "include" {
                out.push(parse_include(&rest)?);
                return Ok(false);
            }
        }

        if in_comment {
            if symbol == Some(TokenKind::Star) && next_symbol == Some(TokenKind::Slash) {
                in_comment = false;
                start = end + 2;
                end = start;
            } else {
                start += 1;
                end = start;
            }
            continue;
        }

        if symbol == Some(TokenKind::Slash) && next_symbol == Some(TokenKind::Star) {
            in_comment = true;
            if start != end {
                out.push(tokenize_chunk(&chunk(&chars, start, end))?);
            }
            start = end + 1;
            end = start;
            continue;
        }

        if symbol == Some(TokenKind::Slash) && next_symbol == Some(TokenKind::Slash) {
            break;
        }

        if chars[end].is_whitespace() {
            if start != end {
                out.push(tokenize_chunk(&chunk(&chars, start, end))?);
            }
            start = end + 1;
            end = start;
            continue;
        }

        if symbol == Some(TokenKind::DoubleQuote) || symbol == Some(TokenKind::Quote) {
            let delimiter = chars[start];
            let (token, new_end) = parse_quote(&chars, start, delimiter)?;
            out.push(token);
            start = new_end;
            end = start;
            continue;
        }

        if symbol == Some(TokenKind::Minus) {
            if start != end {
                out.push(tokenize_chunk(&chunk(&chars, start, end))?);
            }
            let mut tmp = end + 1;
            let mut digits = String::new();
            while tmp < len && chars[tmp].is_ascii_digit() {
                digits.push(chars[tmp]);
                tmp += 1;
            }
            start = tmp;
            end = start;

            if !digits.is_empty() {
                out.push(Token::new(TokenKind::Number, format!("-{digits}")));
            } else {
                out.push(Token::plain(TokenKind::Minus));
            }
            continue;
        }

        if symbol == Some(TokenKind::Colon) {
            let text = chunk(&chars, start, end);
            if match_number(&text).is_none() && !text.is_empty() {
                out.push(Token::new(TokenKind::Label, text));
                start = end + 1;
                end = start;
                continue;
            }
        }

        if let Some(sym) = symbol {
            if start != end {
                out.push(tokenize_chunk(&chunk(&chars, start, end))?);
            }
            out.push(Token::plain(sym));

            start = end + sym.desc().chars().count();
            end = start;
            continue;
        }

        end += 1;
    }

    if start != end {
        out.push(tokenize_chunk(&chunk(&chars, start, end))?);
    }

    Ok(in_comment)
}

fn chunk(chars: &[char], start: usize, end: usize) -> String {
    chars[start..end].iter().collect()
}

fn parse_quote(chars: &[char], start: usize, delimiter: char) -> Result<(Token, usize)> {
    let mut contents = String::new();
    let mut i = start + 1;
    loop {
        if i >= chars.len() {
            return Err(LexError::UnterminatedQuote);
        }
        if chars[i] == delimiter {
            return Ok((Token::new(TokenKind::String, contents), i + 1));
        }
        contents.push(chars[i]);
        i += 1;
    }
}

fn parse_include(rest: &str) -> Result<Token> {
    let opened = rest
        .find(['<', '"'])
        .ok_or_else(|| LexError::MalformedInclude(rest.to_string()))?;
    let after = &rest[opened + 1..];
    let closed = after
        .find(['>', '"'])
        .ok_or_else(|| LexError::MalformedInclude(rest.to_string()))?;
    Ok(Token::new(TokenKind::Filename, after[..closed].to_string()))
}

fn tokenize_chunk(text: &str) -> Result<Token> {
    if let Some(kw) = match_keyword(text) {
        return Ok(Token::new(kw, text));
    }
    if match_number(text).is_some() {
        return Ok(Token::new(TokenKind::Number, text));
    }
    if match_identifier(text) {
        return Ok(Token::new(TokenKind::Identifier, text));
    }
    Err(LexError::UnrecognizedChunk(text.to_string()))
}

/// Returns the symbol whose spelling matches `chars` starting at
/// `start`, trying longest spellings first (see
/// [`TokenKind::SYMBOLS`]).
fn match_symbol(chars: &[char], start: usize) -> Option<TokenKind> {
    'outer: for &sym in TokenKind::SYMBOLS {
        let rep = sym.desc();
        for (i, c) in rep.chars().enumerate() {
            match chars.get(start + i) {
                Some(&actual) if actual == c => continue,
                _ => continue 'outer,
            }
        }
        return Some(sym);
    }
    None
}

fn match_keyword(text: &str) -> Option<TokenKind> {
    TokenKind::KEYWORDS.iter().copied().find(|k| k.desc() == text)
}

fn match_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

fn match_number(text: &str) -> Option<&str> {
    if !text.is_empty() && text.chars().all(|c| c.is_ascii_digit()) {
        Some(text)
    } else {
        None
    }
}

/// Fuses `<number> . <number>` token triples into a single float
/// literal, matching `parseFloats`.
fn fuse_floats(tokens: Vec<Token>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        if tokens[i].kind == TokenKind::Number
            && tokens.get(i + 1).map(|t| t.kind) == Some(TokenKind::Period)
            && tokens.get(i + 2).map(|t| t.kind) == Some(TokenKind::Number)
        {
            let fused = format!("{}.{}", tokens[i].content, tokens[i + 2].content);
            out.push(Token::new(TokenKind::Number, fused));
            i += 3;
        } else {
            out.push(tokens[i].clone());
            i += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize(src).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn tokenizes_a_minimal_function() {
        let toks = tokenize("int main(){return 2+2;}").unwrap();
        let kinds: Vec<TokenKind> = toks.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Int,
                TokenKind::Identifier,
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::LBrace,
                TokenKind::Return,
                TokenKind::Number,
                TokenKind::Plus,
                TokenKind::Number,
                TokenKind::Semicolon,
                TokenKind::RBrace,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn negative_number_is_one_token_but_subtraction_is_not() {
        let toks = tokenize("a-1").unwrap();
        assert_eq!(toks[0].kind, TokenKind::Identifier);
        assert_eq!(toks[1].content, "-1");
        assert_eq!(toks[1].kind, TokenKind::Number);

        let toks2 = tokenize("a - 1").unwrap();
        assert_eq!(toks2[1].kind, TokenKind::Minus);
    }

    #[test]
    fn longest_match_wins_for_compound_operators() {
        assert_eq!(kinds("a<=b")[1], TokenKind::LtEq);
        assert_eq!(kinds("a<b")[1], TokenKind::Lt);
        assert_eq!(kinds("a==b")[1], TokenKind::EqEq);
        assert_eq!(kinds("a=b")[1], TokenKind::Eq);
    }

    #[test]
    fn strips_line_and_block_comments() {
        let toks = tokenize("int a; // trailing\nint b;\n/* skip\nthis */int c;").unwrap();
        let idents: Vec<&str> = toks
            .iter()
            .filter(|t| t.kind == TokenKind::Identifier)
            .map(|t| t.content.as_str())
            .collect();
        assert_eq!(idents, vec!["a", "b", "c"]);
    }

    #[test]
    fn recognizes_include_and_skips_rest_of_line() {
        let toks = tokenize("#include <stdio.h>\nint main(){return 0;}").unwrap();
        assert_eq!(toks[0].kind, TokenKind::Filename);
        assert_eq!(toks[0].content, "stdio.h");
    }

    #[test]
    fn fuses_decimal_point_literal() {
        let toks = tokenize("1.5").unwrap();
        assert_eq!(toks[0].kind, TokenKind::Number);
        assert_eq!(toks[0].content, "1.5");
    }

    #[test]
    fn label_colon_emits_label_token() {
        let toks = tokenize("even: return 1;").unwrap();
        assert_eq!(toks[0].kind, TokenKind::Label);
        assert_eq!(toks[0].content, "even");
    }

    #[test]
    fn unterminated_quote_is_fatal() {
        let err = tokenize("\"abc").unwrap_err();
        assert_eq!(err, LexError::UnterminatedQuote);
    }

    #[test]
    fn unrecognized_chunk_is_fatal() {
        let err = tokenize("@@@").unwrap_err();
        assert!(matches!(err, LexError::UnrecognizedChunk(_)));
    }

    #[test]
    fn backslash_continuation_joins_lines() {
        let toks = tokenize("int \\\nmain(){return 0;}").unwrap();
        assert_eq!(toks[0].kind, TokenKind::Int);
        assert_eq!(toks[1].kind, TokenKind::Identifier);
        assert_eq!(toks[1].content, "main");
    }
}
