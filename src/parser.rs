use crate::ast::{Block, FlonDocument, FlonValue, FlonValueKind, Member, TypeTag};
use crate::error::{FlonError, LexerError, ParserError};
use crate::lexer::{Lexer, Token, TokenType};
use miette::NamedSource;
use std::sync::Arc;

/// A recursive descent parser for the FLON language.
#[derive(Debug)]
pub struct Parser<'a> {
    source: Arc<NamedSource<String>>,
    tokens: Vec<Token>,
    position: usize,
    source_text: &'a str,
    // Key path from the enclosing block's `@` path down to the member
    // currently being parsed, for type-mismatch reporting.
    path_stack: Vec<String>,
}

impl<'a> Parser<'a> {
    pub fn new(source_text: &'a str) -> Result<Self, FlonError> {
        Self::new_with_name(source_text, "source.flon".to_string())
    }

    pub fn new_with_name(source_text: &'a str, name: String) -> Result<Self, FlonError> {
        let source = Arc::new(NamedSource::new(name, source_text.to_string()));
        let mut lexer = Lexer::new(source_text);
        let mut tokens = Vec::new();
        for token in lexer.lex() {
            match token.ttype {
                TokenType::Whitespace => {}
                TokenType::Unknown(character) => {
                    return Err(LexerError::UnexpectedCharacter {
                        src: (*source).clone(),
                        span: (token.pos_start, token.pos_end - token.pos_start).into(),
                        character,
                    }
                    .into());
                }
                TokenType::UnterminatedString => {
                    return Err(LexerError::UnterminatedString {
                        src: (*source).clone(),
                        span: (token.pos_start, token.pos_end - token.pos_start).into(),
                    }
                    .into());
                }
                _ => tokens.push(token),
            }
        }

        Ok(Self {
            source,
            tokens,
            position: 0,
            source_text,
            path_stack: Vec::new(),
        })
    }

    // === Main Parsing Methods ===

    /// Document ::= Block*
    pub fn parse_document(&mut self) -> Result<FlonDocument, FlonError> {
        let mut blocks = Vec::new();
        while !self.check(TokenType::Eof) {
            blocks.push(self.parse_block()?);
        }
        self.expect(TokenType::Eof)?;
        Ok(FlonDocument { blocks })
    }

    /// Block ::= "@" Identifier { "/" Identifier } Object
    fn parse_block(&mut self) -> Result<Block, FlonError> {
        self.expect(TokenType::At)?;
        let mut path = vec![self.parse_identifier("a root name after '@'")?];
        while self.match_token(TokenType::Slash) {
            path.push(self.parse_identifier("a path segment after '/'")?);
        }

        self.path_stack = path.clone();
        let body = self.parse_object()?;
        self.path_stack.clear();

        Ok(Block { path, body })
    }

    /// Object ::= "(" Member* ")"
    fn parse_object(&mut self) -> Result<FlonValue, FlonError> {
        let start_token = self.current_token()?.clone();
        self.expect(TokenType::LParen)?;
        let mut members: Vec<Member> = Vec::new();
        while !self.check(TokenType::RParen) {
            let member = self.parse_member()?;
            // A re-declared key overwrites in place; the first occurrence
            // fixes the member's position among its siblings.
            if let Some(existing) = members.iter_mut().find(|m| m.key == member.key) {
                *existing = member;
            } else {
                members.push(member);
            }
        }
        let end_token = self.current_token()?.clone();
        self.expect(TokenType::RParen)?;
        Ok(FlonValue {
            kind: FlonValueKind::Object(members),
            pos_start: start_token.pos_start,
            pos_end: end_token.pos_end,
        })
    }

    /// List ::= "[" [ Value { "," Value } [ "," ] ] "]"
    fn parse_list(&mut self) -> Result<FlonValue, FlonError> {
        let start_token = self.current_token()?.clone();
        self.expect(TokenType::LBracket)?;
        let mut values = Vec::new();
        if !self.check(TokenType::RBracket) {
            loop {
                values.push(self.parse_value()?);
                if !self.match_token(TokenType::Comma) {
                    break;
                }
                if self.check(TokenType::RBracket) {
                    break; // Allow trailing comma
                }
            }
        }
        let end_token = self.current_token()?.clone();
        self.expect(TokenType::RBracket)?;
        Ok(FlonValue {
            kind: FlonValueKind::List(values),
            pos_start: start_token.pos_start,
            pos_end: end_token.pos_end,
        })
    }

    /// Member ::= Key ":" [ Type ":" ] Value
    fn parse_member(&mut self) -> Result<Member, FlonError> {
        let key = self.parse_key()?;
        self.expect(TokenType::Colon)?;

        self.path_stack.push(key.clone());
        let declared = self.parse_optional_type_tag()?;
        let value = self.parse_value()?;
        let value = match declared {
            Some(tag) => self.check_declared_type(tag, value)?,
            None => value,
        };
        self.path_stack.pop();

        Ok(Member {
            key,
            declared,
            value,
        })
    }

    /// Value ::= String | Int | Float | Bool | Object | List
    fn parse_value(&mut self) -> Result<FlonValue, FlonError> {
        let start_token = self.current_token()?.clone();

        match &start_token.ttype {
            TokenType::LParen => self.parse_object(),
            TokenType::LBracket => self.parse_list(),
            TokenType::String(s) => {
                self.advance();
                Ok(FlonValue {
                    kind: FlonValueKind::String(s.clone()),
                    pos_start: start_token.pos_start,
                    pos_end: start_token.pos_end,
                })
            }
            TokenType::Int(n) => {
                self.advance();
                Ok(FlonValue {
                    kind: FlonValueKind::Int(*n),
                    pos_start: start_token.pos_start,
                    pos_end: start_token.pos_end,
                })
            }
            TokenType::Float(f) => {
                self.advance();
                Ok(FlonValue {
                    kind: FlonValueKind::Float(*f),
                    pos_start: start_token.pos_start,
                    pos_end: start_token.pos_end,
                })
            }
            TokenType::True => {
                self.advance();
                Ok(FlonValue {
                    kind: FlonValueKind::Bool(true),
                    pos_start: start_token.pos_start,
                    pos_end: start_token.pos_end,
                })
            }
            TokenType::False => {
                self.advance();
                Ok(FlonValue {
                    kind: FlonValueKind::Bool(false),
                    pos_start: start_token.pos_start,
                    pos_end: start_token.pos_end,
                })
            }
            _ => self.err_unexpected("a value"),
        }
    }

    // === Grammar Sub-Rules ===

    /// Key ::= Identifier | String
    ///
    /// The quoted form is required for keys that collide with reserved
    /// words or contain non-identifier characters.
    fn parse_key(&mut self) -> Result<String, FlonError> {
        let token = self.current_token()?;
        match &token.ttype {
            TokenType::Identifier(s) | TokenType::String(s) => {
                let key = s.clone();
                self.advance();
                Ok(key)
            }
            _ => self.err_unexpected("an identifier or string for a member key"),
        }
    }

    fn parse_identifier(&mut self, expected: &str) -> Result<String, FlonError> {
        let token = self.current_token()?;
        if let TokenType::Identifier(s) = &token.ttype {
            let name = s.clone();
            self.advance();
            Ok(name)
        } else {
            self.err_unexpected(expected)
        }
    }

    /// Type ::= "int" | "float" | "bool" | "string" | "object" | "list"
    ///
    /// Only consumed when followed by a colon; otherwise the member has no
    /// declared tag and the value's syntax determines its type.
    fn parse_optional_type_tag(&mut self) -> Result<Option<TypeTag>, FlonError> {
        let token = self.current_token()?.clone();
        let tag = match &token.ttype {
            TokenType::Type(tag) => *tag,
            TokenType::Identifier(word) if self.peek_is(TokenType::Colon) => {
                return Err(ParserError::InvalidTypeTag {
                    src: (*self.source).clone(),
                    span: (token.pos_start, token.pos_end - token.pos_start).into(),
                    word: word.clone(),
                }
                .into());
            }
            _ => return Ok(None),
        };
        self.advance();
        self.expect(TokenType::Colon)?;
        Ok(Some(tag))
    }

    /// Validates a declared tag against the parsed value's shape. An integer
    /// literal under a `float:` tag widens to f64; everything else must
    /// match exactly.
    fn check_declared_type(
        &self,
        declared: TypeTag,
        value: FlonValue,
    ) -> Result<FlonValue, FlonError> {
        match (declared, &value.kind) {
            (TypeTag::Int, FlonValueKind::Int(_))
            | (TypeTag::Float, FlonValueKind::Float(_))
            | (TypeTag::Bool, FlonValueKind::Bool(_))
            | (TypeTag::String, FlonValueKind::String(_))
            | (TypeTag::Object, FlonValueKind::Object(_))
            | (TypeTag::List, FlonValueKind::List(_)) => Ok(value),
            (TypeTag::Float, FlonValueKind::Int(n)) => Ok(FlonValue {
                kind: FlonValueKind::Float(*n as f64),
                pos_start: value.pos_start,
                pos_end: value.pos_end,
            }),
            _ => Err(ParserError::TypeMismatch {
                src: (*self.source).clone(),
                span: (value.pos_start, value.pos_end - value.pos_start).into(),
                path: self.path_stack.join("/"),
                declared,
                found: value.tag(),
            }
            .into()),
        }
    }

    // === Tokenizer Helper Methods ===

    fn current_token(&self) -> Result<&Token, FlonError> {
        self.tokens.get(self.position).ok_or_else(|| {
            let pos = self.source_text.len().saturating_sub(1);
            ParserError::UnexpectedEof {
                src: (*self.source).clone(),
                span: (pos, 0).into(),
            }
            .into()
        })
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }

    fn expect(&mut self, expected: TokenType) -> Result<(), FlonError> {
        let token = self.current_token()?.clone();
        if std::mem::discriminant(&token.ttype) == std::mem::discriminant(&expected) {
            self.advance();
            Ok(())
        } else {
            self.err_unexpected(&format!("{:?}", expected))
        }
    }

    fn match_token(&mut self, ttype: TokenType) -> bool {
        if self.check(ttype) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn check(&self, ttype: TokenType) -> bool {
        if let Ok(token) = self.current_token() {
            std::mem::discriminant(&token.ttype) == std::mem::discriminant(&ttype)
        } else {
            false
        }
    }

    fn peek_is(&self, ttype: TokenType) -> bool {
        if let Some(token) = self.tokens.get(self.position + 1) {
            std::mem::discriminant(&token.ttype) == std::mem::discriminant(&ttype)
        } else {
            false
        }
    }

    fn err_unexpected<T>(&self, expected: &str) -> Result<T, FlonError> {
        let token = self.current_token()?;
        Err(ParserError::UnexpectedToken {
            src: (*self.source).clone(),
            span: (token.pos_start, token.pos_end - token.pos_start).into(),
            expected: expected.to_string(),
        }
        .into())
    }
}
