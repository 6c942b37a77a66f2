//! Recursive-descent parser for the type notation.

use crate::error::SyntaxError;
use crate::scanner::{tokenize, Token, TokenInfo};
use miette::SourceSpan;
use tyre_core::{Name, NameTable};
use tyre_types::{Convention, LiteralKind, Parameter, Type, TypeVar};

/// Parses one type from its textual notation.
pub struct TypeParser<'a> {
    tokens: Vec<TokenInfo>,
    pos: usize,
    names: &'a NameTable,
    /// Identifiers that denote generic parameters rather than nominal types.
    params: &'a [Name],
}

struct ParenItem {
    convention: Option<(Convention, SourceSpan)>,
    ty: Type,
}

impl<'a> TypeParser<'a> {
    pub fn new(text: &str, names: &'a NameTable) -> Result<Self, SyntaxError> {
        Ok(Self {
            tokens: tokenize(text)?,
            pos: 0,
            names,
            params: &[],
        })
    }

    pub fn with_params(mut self, params: &'a [Name]) -> Self {
        self.params = params;
        self
    }

    /// Parse a complete type; trailing input is an error.
    pub fn parse(mut self) -> Result<Type, SyntaxError> {
        let ty = self.parse_type()?;
        self.expect(&Token::EndOfInput, "end of input")?;
        Ok(ty)
    }

    // ========================================================================
    // Token access
    // ========================================================================

    fn current(&self) -> &TokenInfo {
        let last = self.tokens.len() - 1;
        &self.tokens[self.pos.min(last)]
    }

    fn lookahead(&self, n: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + n).min(last)].token
    }

    fn at(&self, token: &Token) -> bool {
        &self.current().token == token
    }

    fn advance(&mut self) -> TokenInfo {
        let info = self.current().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        info
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.at(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn span_of(info: &TokenInfo) -> SourceSpan {
        (info.start, info.end - info.start).into()
    }

    fn unexpected(&self, expected: &str) -> SyntaxError {
        let info = self.current();
        SyntaxError::UnexpectedToken {
            expected: expected.to_string(),
            found: info.token.describe(),
            span: Self::span_of(info),
        }
    }

    fn expect(&mut self, token: &Token, expected: &str) -> Result<TokenInfo, SyntaxError> {
        if self.at(token) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn expect_identifier(&mut self, expected: &str) -> Result<(String, TokenInfo), SyntaxError> {
        match &self.current().token {
            Token::Identifier(name) => {
                let name = name.clone();
                Ok((name, self.advance()))
            }
            _ => Err(self.unexpected(expected)),
        }
    }

    fn starts_type(token: &Token) -> bool {
        matches!(
            token,
            Token::OpenParen
                | Token::Variable(_)
                | Token::Hash
                | Token::Exclamation
                | Token::Identifier(_)
        )
    }

    // ========================================================================
    // Grammar
    // ========================================================================

    fn parse_type(&mut self) -> Result<Type, SyntaxError> {
        match self.current().token.clone() {
            Token::OpenParen => self.parse_parenthesized(),
            Token::Variable(index) => {
                self.advance();
                Ok(Type::Var(TypeVar(index)))
            }
            Token::Hash => {
                self.advance();
                let (keyword, info) = self.expect_identifier("a literal kind")?;
                LiteralKind::from_keyword(&keyword)
                    .map(Type::Literal)
                    .ok_or(SyntaxError::UnknownLiteralKind {
                        keyword,
                        span: Self::span_of(&info),
                    })
            }
            Token::Exclamation => {
                self.advance();
                Ok(Type::Error)
            }
            Token::Identifier(name) => match name.as_str() {
                "_" => {
                    self.advance();
                    Ok(Type::Unresolved)
                }
                "any" => self.parse_existential(),
                keyword
                    if Convention::from_keyword(keyword).is_some()
                        && Self::starts_type(self.lookahead(1)) =>
                {
                    Err(SyntaxError::MisplacedConvention {
                        keyword: keyword.to_string(),
                        span: Self::span_of(self.current()),
                    })
                }
                _ => self.parse_nominal(),
            },
            _ => Err(self.unexpected("a type")),
        }
    }

    fn parse_existential(&mut self) -> Result<Type, SyntaxError> {
        self.advance();
        let mut traits = Vec::new();
        if let Token::Identifier(_) = self.current().token {
            let (first, _) = self.expect_identifier("a trait name")?;
            traits.push(self.names.intern(&first));
            while self.eat(&Token::Ampersand) {
                let (next, _) = self.expect_identifier("a trait name")?;
                traits.push(self.names.intern(&next));
            }
        }
        Ok(Type::existential(traits))
    }

    fn parse_nominal(&mut self) -> Result<Type, SyntaxError> {
        let (text, info) = self.expect_identifier("a type name")?;
        let name = self.names.intern(&text);
        let is_param = self.params.contains(&name);
        if !self.at(&Token::LessThan) {
            return Ok(if is_param { Type::Param(name) } else { Type::nominal(name) });
        }
        if is_param {
            return Err(SyntaxError::ParameterWithArguments {
                name: text,
                span: Self::span_of(&info),
            });
        }
        self.advance();
        let mut args = vec![self.parse_type()?];
        while self.eat(&Token::Comma) {
            args.push(self.parse_type()?);
        }
        self.expect(&Token::GreaterThan, "',' or '>'")?;
        Ok(Type::generic(name, args))
    }

    fn parse_convention(&mut self) -> Option<(Convention, SourceSpan)> {
        let Token::Identifier(keyword) = &self.current().token else {
            return None;
        };
        let convention = Convention::from_keyword(keyword)?;
        if !Self::starts_type(self.lookahead(1)) {
            return None;
        }
        let info = self.advance();
        Some((convention, Self::span_of(&info)))
    }

    /// `()`, `(T)`, `(T,)`, `(T, U)` or a function type `(..) -> R`.
    fn parse_parenthesized(&mut self) -> Result<Type, SyntaxError> {
        self.advance();
        let mut items = Vec::new();
        let mut trailing_comma = false;
        if !self.at(&Token::CloseParen) {
            loop {
                let convention = self.parse_convention();
                let ty = self.parse_type()?;
                items.push(ParenItem { convention, ty });
                if !self.eat(&Token::Comma) {
                    break;
                }
                if self.at(&Token::CloseParen) {
                    trailing_comma = true;
                    break;
                }
            }
        }
        self.expect(&Token::CloseParen, "',' or ')'")?;

        if self.eat(&Token::Arrow) {
            let ret = self.parse_type()?;
            let params = items
                .into_iter()
                .map(|item| {
                    let convention = item.convention.map_or(Convention::Let, |(c, _)| c);
                    Parameter::new(convention, item.ty)
                })
                .collect();
            return Ok(Type::function_with(params, ret));
        }

        if let Some((convention, span)) = items.iter().find_map(|item| item.convention) {
            return Err(SyntaxError::MisplacedConvention {
                keyword: convention.keyword().to_string(),
                span,
            });
        }
        if items.len() == 1 && !trailing_comma {
            return Ok(items.remove(0).ty);
        }
        Ok(Type::Tuple(items.into_iter().map(|item| item.ty).collect()))
    }
}

/// Parse `text` as a type. Every identifier names a nominal type.
pub fn parse_type(text: &str, names: &NameTable) -> Result<Type, SyntaxError> {
    TypeParser::new(text, names)?.parse()
}

/// Parse `text` as a type in which the identifiers in `params` denote
/// generic parameters.
pub fn parse_type_with_params(
    text: &str,
    names: &NameTable,
    params: &[Name],
) -> Result<Type, SyntaxError> {
    TypeParser::new(text, names)?.with_params(params).parse()
}
