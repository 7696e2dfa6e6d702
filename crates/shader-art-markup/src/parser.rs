use crate::ast::{Attribute, Document, Element, Node};
use crate::error::ParseError;
use crate::lexer::{Lexer, Token, TokenWithPos};

/// Elements that never have content or an end tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

// ── Parser ────────────────────────────────────────────────────────────────

pub struct Parser {
    tokens: Vec<TokenWithPos>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<TokenWithPos>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn current_pos(&self) -> (usize, usize) {
        self.tokens
            .get(self.pos)
            .map(|t| (t.line, t.col))
            .or_else(|| self.tokens.last().map(|t| (t.line, t.col)))
            .unwrap_or((1, 1))
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).map(|t| &t.token).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens.get(self.pos)
            .map(|t| t.token.clone())
            .unwrap_or(Token::Eof);
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn err(&self, msg: impl Into<String>) -> ParseError {
        let (line, col) = self.current_pos();
        ParseError::syntax(msg, line, col)
    }

    fn eof(&self, msg: impl Into<String>) -> ParseError {
        let (line, col) = self.current_pos();
        ParseError::eof(msg, line, col)
    }

    fn expect_token(&mut self, expected: &Token) -> Result<(), ParseError> {
        if self.peek() == expected {
            self.advance();
            Ok(())
        } else {
            Err(self.err(format!("expected {:?}, got {:?}", expected, self.peek())))
        }
    }

    // ── Document ──────────────────────────────────────────────────────────

    pub fn parse_document(&mut self) -> Result<Document, ParseError> {
        let nodes = self.parse_content(None)?;
        Ok(Document { nodes })
    }

    // ── Content ───────────────────────────────────────────────────────────

    /// Parse nodes until the end tag of `parent` (consumed) or end of input.
    fn parse_content(&mut self, parent: Option<&str>) -> Result<Vec<Node>, ParseError> {
        let mut nodes = Vec::new();
        loop {
            match self.peek() {
                Token::Eof => {
                    if let Some(tag) = parent {
                        return Err(self.eof(format!("unclosed <{tag}> element")));
                    }
                    break;
                }
                Token::Text(_) => {
                    if let Token::Text(text) = self.advance() {
                        if !text.trim().is_empty() {
                            nodes.push(Node::Text(text));
                        }
                    }
                }
                Token::OpenTag(_) => nodes.push(Node::Element(self.parse_element()?)),
                Token::CloseTag(name) => {
                    if parent != Some(name.as_str()) {
                        return Err(self.err(format!("unexpected end tag </{name}>")));
                    }
                    self.advance();
                    self.expect_token(&Token::TagEnd)?;
                    break;
                }
                tok => return Err(self.err(format!("unexpected {:?} outside a tag", tok))),
            }
        }
        Ok(nodes)
    }

    // ── Element ───────────────────────────────────────────────────────────

    fn parse_element(&mut self) -> Result<Element, ParseError> {
        let tag = match self.advance() {
            Token::OpenTag(name) => name,
            tok => return Err(self.err(format!("expected a tag, got {:?}", tok))),
        };
        let mut element = Element::new(tag);

        loop {
            match self.advance() {
                Token::AttrName(name) => {
                    let value = if self.peek() == &Token::Eq {
                        self.advance();
                        match self.advance() {
                            Token::Str(v) => v,
                            tok => return Err(self.err(format!("expected an attribute value, got {:?}", tok))),
                        }
                    } else {
                        String::new()
                    };
                    if !element.has_attr(&name) {
                        element.attrs.push(Attribute { name, value });
                    }
                }
                Token::SelfClose => return Ok(element),
                Token::TagEnd => break,
                tok => {
                    return Err(self.err(format!(
                        "unexpected {:?} in <{}>; expected an attribute, '>' or '/>'",
                        tok, element.tag
                    )));
                }
            }
        }

        if VOID_ELEMENTS.contains(&element.tag.as_str()) {
            return Ok(element);
        }
        let tag = element.tag.clone();
        element.children = self.parse_content(Some(&tag))?;
        Ok(element)
    }
}

// ── Public parse entry point ──────────────────────────────────────────────

/// Parse a markup source string into a [`Document`].
pub fn parse_str(src: &str) -> Result<Document, ParseError> {
    let tokens = Lexer::new(src).tokenize()?;
    Parser::new(tokens).parse_document()
}
