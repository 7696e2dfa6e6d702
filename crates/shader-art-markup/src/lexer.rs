use crate::error::ParseError;

// ── Token ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// `<name`, the start of an opening tag.
    OpenTag(String),
    /// `</name`, the start of an end tag.
    CloseTag(String),
    /// Attribute name inside a tag.
    AttrName(String),
    /// `=` between an attribute name and its value.
    Eq,
    /// Attribute value, quoted or bare, with entities decoded.
    Str(String),
    /// `>`
    TagEnd,
    /// `/>`
    SelfClose,
    /// Character data between tags, with entities decoded.
    /// Raw-text elements (`script`, `style`) are passed through untouched.
    Text(String),
    // Sentinel
    Eof,
}

/// A token together with the 1-based position where it starts.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenWithPos {
    pub token: Token,
    pub line: usize,
    pub col: usize,
}

/// Elements whose content is never tokenized as markup.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

// ── Lexer ─────────────────────────────────────────────────────────────────

pub struct Lexer<'s> {
    src: &'s str,
    pos: usize,
    line: usize,
    col: usize,
    /// Inside `<...>`: attribute names, `=`, values.
    in_tag: bool,
    /// Last token was `=`, so the next word is a value rather than a name.
    expect_value: bool,
    /// Raw-text element whose opening tag is being lexed.
    pending_raw: Option<String>,
    /// Raw-text element whose body comes next.
    raw: Option<String>,
}

impl<'s> Lexer<'s> {
    pub fn new(src: &'s str) -> Self {
        Self {
            src,
            pos: 0,
            line: 1,
            col: 1,
            in_tag: false,
            expect_value: false,
            pending_raw: None,
            raw: None,
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<TokenWithPos>, ParseError> {
        let mut tokens = Vec::new();
        loop {
            let (line, col, token) = self.next_token()?;
            let eof = token == Token::Eof;
            tokens.push(TokenWithPos { token, line, col });
            if eof {
                break;
            }
        }
        Ok(tokens)
    }

    fn rest(&self) -> &'s str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.rest().chars().next()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn advance_by(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }

    fn err(&self, msg: impl Into<String>) -> ParseError {
        ParseError::syntax(msg, self.line, self.col)
    }

    fn eof(&self, msg: impl Into<String>) -> ParseError {
        ParseError::eof(msg, self.line, self.col)
    }

    fn next_token(&mut self) -> Result<(usize, usize, Token), ParseError> {
        if self.in_tag {
            return self.next_in_tag();
        }
        if let Some(tag) = self.raw.take() {
            let (line, col) = (self.line, self.col);
            let text = self.lex_raw_text(&tag)?;
            if !text.is_empty() {
                return Ok((line, col, Token::Text(text)));
            }
        }
        loop {
            let (line, col) = (self.line, self.col);
            let Some(ch) = self.peek() else {
                return Ok((line, col, Token::Eof));
            };
            if ch != '<' {
                return Ok((line, col, Token::Text(self.lex_text())));
            }
            if self.rest().starts_with("<!--") {
                self.skip_comment()?;
                continue;
            }
            if self.rest().starts_with("<!") || self.rest().starts_with("<?") {
                self.skip_declaration()?;
                continue;
            }
            if self.rest().starts_with("</") {
                self.advance_by(2);
                let name = self.lex_name();
                if name.is_empty() {
                    return Err(self.err("expected a tag name after '</'"));
                }
                self.in_tag = true;
                return Ok((line, col, Token::CloseTag(name)));
            }
            if matches!(self.peek_nth(1), Some(c) if c.is_ascii_alphabetic()) {
                self.advance(); // consume `<`
                let name = self.lex_name();
                if RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
                    self.pending_raw = Some(name.clone());
                }
                self.in_tag = true;
                return Ok((line, col, Token::OpenTag(name)));
            }
            // A lone `<` that does not start a tag is plain text.
            return Ok((line, col, Token::Text(self.lex_text())));
        }
    }

    fn next_in_tag(&mut self) -> Result<(usize, usize, Token), ParseError> {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.advance();
        }
        let (line, col) = (self.line, self.col);
        let Some(ch) = self.peek() else {
            return Err(self.eof("unterminated tag"));
        };

        if self.expect_value {
            self.expect_value = false;
            return match ch {
                '"' | '\'' => self.lex_quoted(ch).map(|s| (line, col, Token::Str(s))),
                '>' => Err(self.err("expected an attribute value, got '>'")),
                _ => Ok((line, col, Token::Str(self.lex_bare_value()))),
            };
        }

        match ch {
            '>' => {
                self.advance();
                self.in_tag = false;
                self.raw = self.pending_raw.take();
                Ok((line, col, Token::TagEnd))
            }
            '/' if self.peek_nth(1) == Some('>') => {
                self.advance_by(2);
                self.in_tag = false;
                self.pending_raw = None;
                Ok((line, col, Token::SelfClose))
            }
            '=' => {
                self.advance();
                self.expect_value = true;
                Ok((line, col, Token::Eq))
            }
            c if is_name_char(c) => Ok((line, col, Token::AttrName(self.lex_name()))),
            other => Err(self.err(format!("unexpected character {:?} inside tag", other))),
        }
    }

    /// Tag and attribute names are ASCII case-insensitive and stored lowercase.
    fn lex_name(&mut self) -> String {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if is_name_char(c)) {
            self.advance();
        }
        self.src[start..self.pos].to_ascii_lowercase()
    }

    fn lex_quoted(&mut self, quote: char) -> Result<String, ParseError> {
        self.advance(); // consume opening quote
        let start = self.pos;
        loop {
            match self.advance() {
                None => return Err(self.eof("unterminated attribute value")),
                Some(c) if c == quote => break,
                Some(_) => {}
            }
        }
        let raw = &self.src[start..self.pos - quote.len_utf8()];
        Ok(decode_entities(raw))
    }

    fn lex_bare_value(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_whitespace() || c == '>' || self.rest().starts_with("/>") {
                break;
            }
            self.advance();
        }
        decode_entities(&self.src[start..self.pos])
    }

    fn lex_text(&mut self) -> String {
        let start = self.pos;
        // The first character is consumed unconditionally so a stray `<`
        // always makes progress.
        self.advance();
        while matches!(self.peek(), Some(c) if c != '<') {
            self.advance();
        }
        decode_entities(&self.src[start..self.pos])
    }

    fn lex_raw_text(&mut self, tag: &str) -> Result<String, ParseError> {
        let start = self.pos;
        let close = format!("</{tag}");
        loop {
            // Byte comparison: the body may hold multi-byte characters that
            // straddle `close.len()`.
            let rest = self.rest().as_bytes();
            if rest.get(..close.len()).is_some_and(|head| head.eq_ignore_ascii_case(close.as_bytes())) {
                break;
            }
            if self.advance().is_none() {
                return Err(self.eof(format!("unterminated <{tag}> element")));
            }
        }
        Ok(self.src[start..self.pos].to_string())
    }

    fn skip_comment(&mut self) -> Result<(), ParseError> {
        self.advance_by(4); // consume `<!--`
        loop {
            if self.rest().starts_with("-->") {
                self.advance_by(3);
                return Ok(());
            }
            if self.advance().is_none() {
                return Err(self.eof("unterminated comment"));
            }
        }
    }

    fn skip_declaration(&mut self) -> Result<(), ParseError> {
        loop {
            match self.advance() {
                Some('>') => return Ok(()),
                Some(_) => {}
                None => return Err(self.eof("unterminated declaration")),
            }
        }
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.')
}

/// Replaces the predefined XML entities and numeric character references.
/// Unknown entities are kept verbatim.
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest.find(';').and_then(|semi| {
            let entity = &rest[1..semi];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => {
                    let code = if let Some(hex) = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
                        u32::from_str_radix(hex, 16).ok()
                    } else if let Some(dec) = entity.strip_prefix('#') {
                        dec.parse::<u32>().ok()
                    } else {
                        None
                    };
                    code.and_then(char::from_u32)
                }
            };
            ch.map(|c| (c, semi))
        });
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
