//! Tokenizer for the type notation.

use crate::error::SyntaxError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    OpenParen,
    CloseParen,
    LessThan,
    GreaterThan,
    Comma,
    Ampersand,
    Arrow,
    Exclamation,
    Hash,
    /// `?N`
    Variable(u32),
    Identifier(String),
    EndOfInput,
}

impl Token {
    /// Human-readable form for "expected X, found Y" messages.
    pub fn describe(&self) -> String {
        match self {
            Token::OpenParen => "'('".to_string(),
            Token::CloseParen => "')'".to_string(),
            Token::LessThan => "'<'".to_string(),
            Token::GreaterThan => "'>'".to_string(),
            Token::Comma => "','".to_string(),
            Token::Ampersand => "'&'".to_string(),
            Token::Arrow => "'->'".to_string(),
            Token::Exclamation => "'!'".to_string(),
            Token::Hash => "'#'".to_string(),
            Token::Variable(n) => format!("'?{}'", n),
            Token::Identifier(name) => format!("'{}'", name),
            Token::EndOfInput => "end of input".to_string(),
        }
    }
}

/// A token with its byte range in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenInfo {
    pub token: Token,
    pub start: usize,
    pub end: usize,
}

/// Split `text` into tokens. The result always ends with `EndOfInput`.
pub fn tokenize(text: &str) -> Result<Vec<TokenInfo>, SyntaxError> {
    let mut scanner = Scanner { text, pos: 0 };
    let mut tokens = Vec::new();
    loop {
        let info = scanner.scan()?;
        let done = info.token == Token::EndOfInput;
        tokens.push(info);
        if done {
            return Ok(tokens);
        }
    }
}

struct Scanner<'a> {
    text: &'a str,
    pos: usize,
}

impl Scanner<'_> {
    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if !ch.is_whitespace() {
                break;
            }
            self.pos += ch.len_utf8();
        }
    }

    fn scan(&mut self) -> Result<TokenInfo, SyntaxError> {
        self.skip_whitespace();
        let start = self.pos;
        let Some(ch) = self.bump() else {
            return Ok(TokenInfo {
                token: Token::EndOfInput,
                start,
                end: start,
            });
        };
        let token = match ch {
            '(' => Token::OpenParen,
            ')' => Token::CloseParen,
            '<' => Token::LessThan,
            '>' => Token::GreaterThan,
            ',' => Token::Comma,
            '&' => Token::Ampersand,
            '!' => Token::Exclamation,
            '#' => Token::Hash,
            '-' if self.peek() == Some('>') => {
                self.pos += 1;
                Token::Arrow
            }
            '?' => self.scan_variable(start)?,
            c if is_identifier_start(c) => {
                while self.peek().is_some_and(is_identifier_part) {
                    self.bump();
                }
                Token::Identifier(self.text[start..self.pos].to_string())
            }
            other => {
                return Err(SyntaxError::UnexpectedChar {
                    ch: other,
                    span: (start, other.len_utf8()).into(),
                })
            }
        };
        Ok(TokenInfo {
            token,
            start,
            end: self.pos,
        })
    }

    fn scan_variable(&mut self, start: usize) -> Result<Token, SyntaxError> {
        let digits_start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        let digits = &self.text[digits_start..self.pos];
        digits
            .parse::<u32>()
            .map(Token::Variable)
            .map_err(|_| SyntaxError::InvalidVariable {
                text: self.text[start..self.pos].to_string(),
                span: (start, self.pos - start).into(),
            })
    }
}

fn is_identifier_start(ch: char) -> bool {
    ch == '_' || ch.is_ascii_alphabetic() || (ch as u32 > 0x7F && unicode_xid::UnicodeXID::is_xid_start(ch))
}

fn is_identifier_part(ch: char) -> bool {
    ch == '_' || ch.is_ascii_alphanumeric() || (ch as u32 > 0x7F && unicode_xid::UnicodeXID::is_xid_continue(ch))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<Token> {
        tokenize(text).unwrap().into_iter().map(|t| t.token).collect()
    }

    #[test]
    fn test_scan_function_type() {
        assert_eq!(
            kinds("(inout ?3) -> Array<Int>"),
            vec![
                Token::OpenParen,
                Token::Identifier("inout".into()),
                Token::Variable(3),
                Token::CloseParen,
                Token::Arrow,
                Token::Identifier("Array".into()),
                Token::LessThan,
                Token::Identifier("Int".into()),
                Token::GreaterThan,
                Token::EndOfInput,
            ]
        );
    }

    #[test]
    fn test_scan_unicode_identifier() {
        assert_eq!(
            kinds("Größe"),
            vec![Token::Identifier("Größe".into()), Token::EndOfInput]
        );
    }

    #[test]
    fn test_token_offsets() {
        let tokens = tokenize("  Int , ?12").unwrap();
        assert_eq!((tokens[0].start, tokens[0].end), (2, 5));
        assert_eq!((tokens[2].start, tokens[2].end), (8, 11));
    }

    #[test]
    fn test_variable_needs_digits() {
        assert!(matches!(
            tokenize("?x"),
            Err(SyntaxError::InvalidVariable { .. })
        ));
    }

    #[test]
    fn test_stray_character() {
        assert!(matches!(
            tokenize("Int % Bool"),
            Err(SyntaxError::UnexpectedChar { ch: '%', .. })
        ));
    }
}
