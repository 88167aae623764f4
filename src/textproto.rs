//! Minimal protocol-buffer text-format reader.
//!
//! Family metadata ships as `METADATA.pb` files in the protobuf text encoding:
//!
//! ```text
//! name: "Alegreya Sans"
//! license: "OFL"
//! fonts {
//!   style: "normal"
//!   weight: 100
//! }
//! subsets: "latin"
//! axes { tag: "wght" min_value: 100.0 max_value: 900.0 }
//! ```
//!
//! This module parses that syntax into a schema-less [`Message`] tree. It does
//! not know any field names; [`metadata`](crate::metadata) maps the tree onto
//! the fixed record shape. Supported syntax:
//!
//! - scalar fields `name: value` with strings (single/double quoted, adjacent
//!   literals concatenated, C-style escapes), numbers, and identifiers
//! - nested messages `name { ... }`, `name: { ... }`, `name < ... >`
//! - list shorthand `name: [a, b]`
//! - optional `,` / `;` field separators and `#` line comments
//! - extension names `[pkg.ext] { ... }` (kept as the bracketed name)

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TextProtoError {
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },
}

/// A scalar leaf value. Numbers keep their source text so the caller decides
/// the numeric type.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Str(String),
    Number(String),
    Ident(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(Scalar),
    Message(Message),
}

/// An ordered list of `(field name, value)` pairs. Repeated fields appear
/// once per occurrence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Message {
    fields: Vec<(String, Value)>,
}

impl Message {
    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }

    /// Last occurrence of a field; for singular fields the last value wins.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Every occurrence of a repeated field, in source order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Value> + 'a {
        self.fields
            .iter()
            .filter(move |(n, _)| n == name)
            .map(|(_, v)| v)
    }
}

/// Parse a complete text-format document.
pub fn parse(text: &str) -> Result<Message, TextProtoError> {
    let mut parser = Parser {
        lexer: Lexer::new(text),
        peeked: None,
        depth: 0,
    };
    let message = parser.parse_fields(None)?;
    Ok(message)
}

// ---------------------------------------------------------------------------
// Lexer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Str(String),
    Number(String),
    Punct(u8),
    Eof,
}

struct Lexer<'a> {
    bytes: &'a [u8],
    pos: usize,
    line: usize,
}

impl<'a> Lexer<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            bytes: text.as_bytes(),
            pos: 0,
            line: 1,
        }
    }

    fn error(&self, message: impl Into<String>) -> TextProtoError {
        TextProtoError::Syntax {
            line: self.line,
            message: message.into(),
        }
    }

    fn peek_byte(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek_byte()?;
        self.pos += 1;
        if b == b'\n' {
            self.line += 1;
        }
        Some(b)
    }

    fn skip_trivia(&mut self) {
        while let Some(b) = self.peek_byte() {
            match b {
                b' ' | b'\t' | b'\r' | b'\n' => {
                    self.bump();
                }
                b'#' => {
                    while let Some(c) = self.bump() {
                        if c == b'\n' {
                            break;
                        }
                    }
                }
                _ => break,
            }
        }
    }

    fn next_token(&mut self) -> Result<Token, TextProtoError> {
        self.skip_trivia();
        let Some(b) = self.peek_byte() else {
            return Ok(Token::Eof);
        };
        match b {
            b'"' | b'\'' => self.lex_string(b),
            b'0'..=b'9' => Ok(self.lex_number()),
            b'.' if self
                .bytes
                .get(self.pos + 1)
                .is_some_and(|c| c.is_ascii_digit()) =>
            {
                Ok(self.lex_number())
            }
            b'A'..=b'Z' | b'a'..=b'z' | b'_' => Ok(self.lex_ident()),
            b'{' | b'}' | b'<' | b'>' | b'[' | b']' | b':' | b',' | b';' | b'-' | b'.' | b'/' => {
                self.bump();
                Ok(Token::Punct(b))
            }
            other => Err(self.error(format!("unexpected character {:?}", other as char))),
        }
    }

    fn lex_ident(&mut self) -> Token {
        let start = self.pos;
        while self
            .peek_byte()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == b'_')
        {
            self.bump();
        }
        Token::Ident(String::from_utf8_lossy(&self.bytes[start..self.pos]).into_owned())
    }

    fn lex_number(&mut self) -> Token {
        let start = self.pos;
        let mut prev = 0u8;
        while let Some(c) = self.peek_byte() {
            let exponent_sign = (c == b'+' || c == b'-') && (prev == b'e' || prev == b'E');
            if c.is_ascii_alphanumeric() || c == b'.' || exponent_sign {
                prev = c;
                self.bump();
            } else {
                break;
            }
        }
        Token::Number(String::from_utf8_lossy(&self.bytes[start..self.pos]).into_owned())
    }

    fn lex_string(&mut self, quote: u8) -> Result<Token, TextProtoError> {
        self.bump();
        let mut buf: Vec<u8> = Vec::new();
        loop {
            let Some(b) = self.bump() else {
                return Err(self.error("unterminated string"));
            };
            match b {
                b'\n' => return Err(self.error("newline in string literal")),
                b'\\' => self.lex_escape(&mut buf)?,
                c if c == quote => break,
                c => buf.push(c),
            }
        }
        String::from_utf8(buf)
            .map(Token::Str)
            .map_err(|_| self.error("string literal is not valid UTF-8"))
    }

    fn lex_escape(&mut self, buf: &mut Vec<u8>) -> Result<(), TextProtoError> {
        let Some(c) = self.bump() else {
            return Err(self.error("unterminated escape sequence"));
        };
        match c {
            b'n' => buf.push(b'\n'),
            b'r' => buf.push(b'\r'),
            b't' => buf.push(b'\t'),
            b'a' => buf.push(0x07),
            b'b' => buf.push(0x08),
            b'f' => buf.push(0x0C),
            b'v' => buf.push(0x0B),
            b'\\' | b'\'' | b'"' | b'?' => buf.push(c),
            b'0'..=b'7' => {
                let mut value = u32::from(c - b'0');
                for _ in 0..2 {
                    match self.peek_byte() {
                        Some(d @ b'0'..=b'7') => {
                            self.bump();
                            value = value * 8 + u32::from(d - b'0');
                        }
                        _ => break,
                    }
                }
                let byte = u8::try_from(value).map_err(|_| self.error("octal escape out of range"))?;
                buf.push(byte);
            }
            b'x' => {
                let value = self.lex_hex_digits(1, 2)?;
                // At most two hex digits, always fits in a byte
                buf.push(value as u8);
            }
            b'u' | b'U' => {
                let digits = if c == b'u' { 4 } else { 8 };
                let value = self.lex_hex_digits(digits, digits)?;
                let ch = char::from_u32(value)
                    .ok_or_else(|| self.error(format!("invalid code point U+{value:X}")))?;
                let mut tmp = [0u8; 4];
                buf.extend_from_slice(ch.encode_utf8(&mut tmp).as_bytes());
            }
            other => {
                return Err(self.error(format!("unknown escape \\{}", other as char)));
            }
        }
        Ok(())
    }

    fn lex_hex_digits(&mut self, min: usize, max: usize) -> Result<u32, TextProtoError> {
        let mut value = 0u32;
        let mut count = 0;
        while count < max {
            match self.peek_byte().and_then(|c| (c as char).to_digit(16)) {
                Some(d) => {
                    self.bump();
                    value = value * 16 + d;
                    count += 1;
                }
                None => break,
            }
        }
        if count < min {
            return Err(self.error("malformed hex escape"));
        }
        Ok(value)
    }
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Deepest message nesting accepted before parsing gives up.
pub const MAX_DEPTH: usize = 100;

struct Parser<'a> {
    lexer: Lexer<'a>,
    peeked: Option<Token>,
    depth: usize,
}

impl Parser<'_> {
    fn peek(&mut self) -> Result<&Token, TextProtoError> {
        if self.peeked.is_none() {
            self.peeked = Some(self.lexer.next_token()?);
        }
        Ok(self.peeked.get_or_insert(Token::Eof))
    }

    fn next(&mut self) -> Result<Token, TextProtoError> {
        match self.peeked.take() {
            Some(tok) => Ok(tok),
            None => self.lexer.next_token(),
        }
    }

    fn expect_punct(&mut self, punct: u8) -> Result<(), TextProtoError> {
        match self.next()? {
            Token::Punct(p) if p == punct => Ok(()),
            other => Err(self.lexer.error(format!(
                "expected '{}', found {}",
                punct as char,
                describe(&other)
            ))),
        }
    }

    /// Parse a nested message body after its opening bracket.
    fn parse_nested(&mut self, open: u8) -> Result<Message, TextProtoError> {
        if self.depth >= MAX_DEPTH {
            return Err(self
                .lexer
                .error(format!("nesting too deep (limit {MAX_DEPTH})")));
        }
        self.depth += 1;
        let nested = self.parse_fields(Some(closing(open)));
        self.depth -= 1;
        nested
    }

    /// Parse fields until `close` (or end of input at top level).
    fn parse_fields(&mut self, close: Option<u8>) -> Result<Message, TextProtoError> {
        let mut message = Message::default();
        loop {
            match (self.peek()?.clone(), close) {
                (Token::Eof, None) => break,
                (Token::Eof, Some(c)) => {
                    return Err(self
                        .lexer
                        .error(format!("unexpected end of input, expected '{}'", c as char)));
                }
                (Token::Punct(p), Some(c)) if p == c => {
                    self.next()?;
                    break;
                }
                _ => {}
            }
            let name = self.parse_field_name()?;
            self.parse_field_value(&name, &mut message)?;
            if matches!(self.peek()?, Token::Punct(b',') | Token::Punct(b';')) {
                self.next()?;
            }
        }
        Ok(message)
    }

    fn parse_field_name(&mut self) -> Result<String, TextProtoError> {
        match self.next()? {
            Token::Ident(name) => Ok(name),
            Token::Punct(b'[') => {
                let mut name = String::from("[");
                loop {
                    match self.next()? {
                        Token::Punct(b']') => break,
                        Token::Ident(part) => name.push_str(&part),
                        Token::Punct(p @ (b'.' | b'/')) => name.push(p as char),
                        other => {
                            return Err(self.lexer.error(format!(
                                "unexpected {} in extension name",
                                describe(&other)
                            )));
                        }
                    }
                }
                name.push(']');
                Ok(name)
            }
            other => Err(self
                .lexer
                .error(format!("expected field name, found {}", describe(&other)))),
        }
    }

    fn parse_field_value(&mut self, name: &str, out: &mut Message) -> Result<(), TextProtoError> {
        let has_colon = matches!(self.peek()?, Token::Punct(b':'));
        if has_colon {
            self.next()?;
        }
        match self.peek()?.clone() {
            Token::Punct(open @ (b'{' | b'<')) => {
                self.next()?;
                let nested = self.parse_nested(open)?;
                out.fields.push((name.to_string(), Value::Message(nested)));
            }
            Token::Punct(b'[') if has_colon => {
                self.next()?;
                if matches!(self.peek()?, Token::Punct(b']')) {
                    self.next()?;
                    return Ok(());
                }
                loop {
                    let value = self.parse_list_element()?;
                    out.fields.push((name.to_string(), value));
                    match self.next()? {
                        Token::Punct(b',') => continue,
                        Token::Punct(b']') => break,
                        other => {
                            return Err(self.lexer.error(format!(
                                "expected ',' or ']' in list, found {}",
                                describe(&other)
                            )));
                        }
                    }
                }
            }
            _ if has_colon => {
                let scalar = self.parse_scalar()?;
                out.fields.push((name.to_string(), Value::Scalar(scalar)));
            }
            other => {
                return Err(self.lexer.error(format!(
                    "expected ':' or '{{' after field '{name}', found {}",
                    describe(&other)
                )));
            }
        }
        Ok(())
    }

    fn parse_list_element(&mut self) -> Result<Value, TextProtoError> {
        let open = match self.peek()? {
            Token::Punct(p @ (b'{' | b'<')) => Some(*p),
            _ => None,
        };
        if let Some(open) = open {
            self.next()?;
            return Ok(Value::Message(self.parse_nested(open)?));
        }
        Ok(Value::Scalar(self.parse_scalar()?))
    }

    fn parse_scalar(&mut self) -> Result<Scalar, TextProtoError> {
        match self.next()? {
            Token::Str(mut s) => {
                // Adjacent string literals concatenate
                while matches!(self.peek()?, Token::Str(_)) {
                    if let Token::Str(more) = self.next()? {
                        s.push_str(&more);
                    }
                }
                Ok(Scalar::Str(s))
            }
            Token::Number(n) => Ok(Scalar::Number(n)),
            Token::Ident(id) => Ok(Scalar::Ident(id)),
            Token::Punct(b'-') => match self.next()? {
                Token::Number(n) => Ok(Scalar::Number(format!("-{n}"))),
                Token::Ident(id) => Ok(Scalar::Ident(format!("-{id}"))),
                other => Err(self
                    .lexer
                    .error(format!("expected number after '-', found {}", describe(&other)))),
            },
            other => Err(self
                .lexer
                .error(format!("expected value, found {}", describe(&other)))),
        }
    }
}

fn closing(open: u8) -> u8 {
    if open == b'{' { b'}' } else { b'>' }
}

fn describe(token: &Token) -> String {
    match token {
        Token::Ident(s) => format!("identifier '{s}'"),
        Token::Str(_) => "string".to_string(),
        Token::Number(n) => format!("number '{n}'"),
        Token::Punct(p) => format!("'{}'", *p as char),
        Token::Eof => "end of input".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn str_field<'a>(msg: &'a Message, name: &str) -> Option<&'a str> {
        match msg.get(name)? {
            Value::Scalar(Scalar::Str(s)) => Some(s),
            _ => None,
        }
    }

    #[test]
    fn parses_scalars_and_nested_messages() {
        let text = r#"
name: "Alegreya Sans"
license: "OFL"
category: "SANS_SERIF"
fonts {
  name: "Alegreya Sans"
  style: "normal"
  weight: 100
}
fonts {
  style: "italic"
  weight: 100
}
"#;
        let msg = parse(text).unwrap();
        assert_eq!(str_field(&msg, "name"), Some("Alegreya Sans"));
        assert_eq!(msg.get_all("fonts").count(), 2);
        let Some(Value::Message(first)) = msg.get_all("fonts").next() else {
            panic!("fonts is not a message");
        };
        assert_eq!(
            first.get("weight"),
            Some(&Value::Scalar(Scalar::Number("100".into())))
        );
    }

    #[test]
    fn repeated_scalars_keep_source_order() {
        let msg = parse("subsets: \"menu\"\nsubsets: \"latin\"\nsubsets: \"greek\"").unwrap();
        let subsets: Vec<&Value> = msg.get_all("subsets").collect();
        assert_eq!(
            subsets,
            vec![
                &Value::Scalar(Scalar::Str("menu".into())),
                &Value::Scalar(Scalar::Str("latin".into())),
                &Value::Scalar(Scalar::Str("greek".into())),
            ]
        );
    }

    #[test]
    fn comments_separators_and_angle_brackets() {
        let text = "# header comment\naxes < tag: 'wght'; min_value: 100.0, max_value: 9e2 > # trailing\n";
        let msg = parse(text).unwrap();
        let Some(Value::Message(axis)) = msg.get("axes") else {
            panic!("axes missing");
        };
        assert_eq!(str_field(axis, "tag"), Some("wght"));
        assert_eq!(
            axis.get("max_value"),
            Some(&Value::Scalar(Scalar::Number("9e2".into())))
        );
    }

    #[test]
    fn colon_before_brace_is_accepted() {
        let msg = parse("source: { repository_url: \"https://example.com\" }").unwrap();
        assert!(matches!(msg.get("source"), Some(Value::Message(_))));
    }

    #[test]
    fn list_shorthand_expands_to_repeated_fields() {
        let msg = parse("subsets: [\"latin\", \"latin-ext\"]\nempty: []").unwrap();
        assert_eq!(msg.get_all("subsets").count(), 2);
        assert!(msg.get("empty").is_none());
    }

    #[test]
    fn string_escapes_and_concatenation() {
        let msg = parse(r#"copyright: "Copyright \"A\"\n" 'and \303\251' "é""#).unwrap();
        assert_eq!(str_field(&msg, "copyright"), Some("Copyright \"A\"\nand éé"));
    }

    #[test]
    fn raw_utf8_is_preserved() {
        let msg = parse("designer: \"Huerta Tipográfica\"").unwrap();
        assert_eq!(str_field(&msg, "designer"), Some("Huerta Tipográfica"));
    }

    #[test]
    fn negative_numbers_and_identifiers() {
        let msg = parse("offset: -12.5\nkind: SANS_SERIF\nflag: true").unwrap();
        assert_eq!(
            msg.get("offset"),
            Some(&Value::Scalar(Scalar::Number("-12.5".into())))
        );
        assert_eq!(
            msg.get("kind"),
            Some(&Value::Scalar(Scalar::Ident("SANS_SERIF".into())))
        );
    }

    #[test]
    fn extension_field_names() {
        let msg = parse("[google.fonts.ext] { x: 1 }").unwrap();
        assert!(matches!(msg.get("[google.fonts.ext]"), Some(Value::Message(_))));
    }

    #[test]
    fn last_singular_value_wins() {
        let msg = parse("name: \"A\"\nname: \"B\"").unwrap();
        assert_eq!(str_field(&msg, "name"), Some("B"));
    }

    #[test]
    fn unterminated_message_is_error_with_line() {
        let err = parse("name: \"x\"\nfonts {\n  weight: 400\n").unwrap_err();
        let TextProtoError::Syntax { line, message } = err;
        assert_eq!(line, 4);
        assert!(message.contains("expected '}'"), "{message}");
    }

    #[test]
    fn missing_colon_before_scalar_is_error() {
        assert!(parse("name \"x\"").is_err());
    }

    #[test]
    fn unterminated_string_is_error() {
        assert!(parse("name: \"abc").is_err());
    }

    #[test]
    fn empty_document_is_empty_message() {
        assert!(parse("  # nothing here\n").unwrap().fields().is_empty());
    }

    #[test]
    fn nesting_up_to_limit_is_accepted() {
        let text = format!("{}{}", "a { ".repeat(MAX_DEPTH), "} ".repeat(MAX_DEPTH));
        let mut msg = parse(&text).unwrap();
        for _ in 0..MAX_DEPTH {
            msg = match msg.get("a") {
                Some(Value::Message(inner)) => inner.clone(),
                other => panic!("expected nested message, got {other:?}"),
            };
        }
        assert!(msg.fields().is_empty());
    }

    #[test]
    fn excessive_nesting_is_syntax_error() {
        let err = parse(&"a {".repeat(200_000)).unwrap_err();
        let TextProtoError::Syntax { line, message } = err;
        assert_eq!(line, 1);
        assert!(message.contains("nesting too deep"), "{message}");
    }

    #[test]
    fn excessive_list_nesting_is_syntax_error() {
        let text = format!("a: [{}", "{ b: [".repeat(MAX_DEPTH + 1));
        let TextProtoError::Syntax { message, .. } = parse(&text).unwrap_err();
        assert!(message.contains("nesting too deep"), "{message}");
    }
}
