//! Shared grammar for RFC 4512 schema definition strings.
//!
//! Every definition kind reads its string through a [`DefinitionReader`], which
//! knows how to pull OIDs, quoted descriptive strings and the parenthesized list
//! forms of both. The `render_*` helpers produce the inverse canonical form.

use super::element::Extensions;
use crate::error::{DecodeError, DecodeResult};

/// Cursor over a single parenthesized definition string.
#[derive(Debug)]
pub(crate) struct DefinitionReader {
    chars: Vec<char>,
    pos: usize,
}

impl DefinitionReader {
    /// Position the reader just after the opening parenthesis.
    pub(crate) fn new(definition: &str) -> DecodeResult<Self> {
        let chars: Vec<char> = definition.chars().collect();
        let mut reader = Self { chars, pos: 0 };
        reader.skip_spaces();
        match reader.peek() {
            Some('(') => {
                reader.pos += 1;
                Ok(reader)
            }
            Some(c) => Err(reader.error(format!(
                "definition must start with an opening parenthesis, found '{c}'"
            ))),
            None => Err(reader.error("definition is empty")),
        }
    }

    pub(crate) fn error(&self, message: impl Into<String>) -> DecodeError {
        DecodeError::new(self.pos, message)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    pub(crate) fn skip_spaces(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    /// Read the next keyword, or `None` once the closing parenthesis is reached.
    ///
    /// Anything other than whitespace after the closing parenthesis is an error.
    pub(crate) fn next_keyword(&mut self) -> DecodeResult<Option<String>> {
        self.skip_spaces();
        match self.peek() {
            None => Err(self.error("definition is missing its closing parenthesis")),
            Some(')') => {
                self.pos += 1;
                self.skip_spaces();
                if self.pos < self.chars.len() {
                    return Err(self.error("unexpected content after closing parenthesis"));
                }
                Ok(None)
            }
            Some(_) => {
                let start = self.pos;
                while matches!(self.peek(), Some(c) if !c.is_whitespace() && c != ')') {
                    self.pos += 1;
                }
                let token: String = self.chars[start..self.pos].iter().collect();
                Ok(Some(token))
            }
        }
    }

    /// Read a numeric OID or descriptor, optionally wrapped in single quotes.
    pub(crate) fn read_oid(&mut self) -> DecodeResult<String> {
        self.skip_spaces();
        let start = self.pos;
        while matches!(self.peek(), Some(c) if !c.is_whitespace() && c != '$' && c != ')') {
            self.pos += 1;
        }
        let raw: String = self.chars[start..self.pos].iter().collect();

        let token = if raw.len() >= 2 && raw.starts_with('\'') && raw.ends_with('\'') {
            &raw[1..raw.len() - 1]
        } else {
            raw.as_str()
        };

        if token.is_empty() {
            return Err(DecodeError::new(start, "expected an OID or descriptor"));
        }
        if let Some(bad) = token
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '{' | '}')))
        {
            return Err(DecodeError::new(
                start,
                format!("illegal character '{bad}' in OID or descriptor '{raw}'"),
            ));
        }
        Ok(token.to_string())
    }

    /// Read either one OID or a `$`-separated list of them in parentheses.
    pub(crate) fn read_oids(&mut self) -> DecodeResult<Vec<String>> {
        self.skip_spaces();
        if self.peek() != Some('(') {
            return Ok(vec![self.read_oid()?]);
        }
        self.pos += 1;

        let mut oids = Vec::new();
        loop {
            self.skip_spaces();
            if self.peek() == Some(')') && oids.is_empty() {
                return Err(self.error("empty OID list"));
            }
            oids.push(self.read_oid()?);
            self.skip_spaces();
            match self.peek() {
                Some('$') => self.pos += 1,
                Some(')') => {
                    self.pos += 1;
                    return Ok(oids);
                }
                Some(c) => {
                    return Err(self.error(format!("expected '$' or ')' in OID list, found '{c}'")));
                }
                None => return Err(self.error("unterminated OID list")),
            }
        }
    }

    /// Read one quoted descriptive string, decoding `\xx` escapes.
    pub(crate) fn read_qdstring(&mut self) -> DecodeResult<String> {
        self.skip_spaces();
        if self.peek() != Some('\'') {
            return Err(self.error("expected a quoted string"));
        }
        let start = self.pos;
        self.pos += 1;

        let mut value = String::new();
        let mut escaped: Vec<u8> = Vec::new();
        loop {
            let Some(c) = self.peek() else {
                return Err(DecodeError::new(start, "unterminated quoted string"));
            };
            self.pos += 1;
            match c {
                '\'' => break,
                '\\' => escaped.push(self.read_hex_byte()?),
                other => {
                    flush_escaped(&mut escaped, &mut value);
                    value.push(other);
                }
            }
        }
        flush_escaped(&mut escaped, &mut value);

        if value.is_empty() {
            return Err(DecodeError::new(start, "empty quoted string"));
        }
        match self.peek() {
            Some(c) if c.is_whitespace() || c == ')' => Ok(value),
            Some(c) => Err(self.error(format!(
                "expected a space or ')' after quoted string, found '{c}'"
            ))),
            None => Err(self.error("definition ends after a quoted string")),
        }
    }

    fn read_hex_byte(&mut self) -> DecodeResult<u8> {
        let digits: Option<(u32, u32)> = match (self.chars.get(self.pos), self.chars.get(self.pos + 1)) {
            (Some(h), Some(l)) => h.to_digit(16).zip(l.to_digit(16)),
            _ => None,
        };
        match digits {
            Some((high, low)) => {
                self.pos += 2;
                Ok((high * 16 + low) as u8)
            }
            None => Err(self.error("backslash must be followed by two hex digits")),
        }
    }

    /// Read either one quoted string or a parenthesized, space-separated list.
    pub(crate) fn read_qdstrings(&mut self) -> DecodeResult<Vec<String>> {
        self.skip_spaces();
        if self.peek() != Some('(') {
            return Ok(vec![self.read_qdstring()?]);
        }
        self.pos += 1;

        let mut values = Vec::new();
        loop {
            self.skip_spaces();
            match self.peek() {
                Some(')') => {
                    self.pos += 1;
                    break;
                }
                Some('\'') => values.push(self.read_qdstring()?),
                Some(c) => {
                    return Err(self.error(format!("expected a quoted string in list, found '{c}'")));
                }
                None => return Err(self.error("unterminated quoted string list")),
            }
        }
        if values.is_empty() {
            return Err(self.error("empty quoted string list"));
        }
        Ok(values)
    }

    /// Read a DIT structure rule ID.
    pub(crate) fn read_rule_id(&mut self) -> DecodeResult<u32> {
        self.skip_spaces();
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.pos += 1;
        }
        let digits: String = self.chars[start..self.pos].iter().collect();
        match self.peek() {
            Some(c) if !c.is_whitespace() && c != ')' => {
                return Err(self.error(format!("illegal character '{c}' in rule ID")));
            }
            _ => {}
        }
        digits
            .parse()
            .map_err(|_| DecodeError::new(start, "expected an integer rule ID"))
    }

    /// Read one rule ID or a parenthesized, space-separated list of them.
    pub(crate) fn read_rule_ids(&mut self) -> DecodeResult<Vec<u32>> {
        self.skip_spaces();
        if self.peek() != Some('(') {
            return Ok(vec![self.read_rule_id()?]);
        }
        self.pos += 1;

        let mut ids = Vec::new();
        loop {
            self.skip_spaces();
            match self.peek() {
                Some(')') => {
                    self.pos += 1;
                    break;
                }
                Some(_) => ids.push(self.read_rule_id()?),
                None => return Err(self.error("unterminated rule ID list")),
            }
        }
        if ids.is_empty() {
            return Err(self.error("empty rule ID list"));
        }
        Ok(ids)
    }
}

fn flush_escaped(escaped: &mut Vec<u8>, value: &mut String) {
    if escaped.is_empty() {
        return;
    }
    match std::str::from_utf8(escaped) {
        Ok(decoded) => value.push_str(decoded),
        Err(_) => value.extend(escaped.iter().map(|b| char::from(*b))),
    }
    escaped.clear();
}

/// Store a keyword's value, rejecting a second occurrence of the same keyword.
pub(crate) fn set_once<T>(
    slot: &mut Option<T>,
    value: T,
    keyword: &str,
    reader: &DefinitionReader,
) -> DecodeResult<()> {
    if slot.is_some() {
        return Err(reader.error(format!("multiple {keyword} elements")));
    }
    *slot = Some(value);
    Ok(())
}

/// Set a flag keyword, rejecting a second occurrence.
pub(crate) fn set_flag(flag: &mut bool, keyword: &str, reader: &DefinitionReader) -> DecodeResult<()> {
    if *flag {
        return Err(reader.error(format!("multiple {keyword} elements")));
    }
    *flag = true;
    Ok(())
}

/// Read the values of an `X-` extension keyword into the extension map.
pub(crate) fn read_extension(
    reader: &mut DefinitionReader,
    keyword: &str,
    extensions: &mut Extensions,
) -> DecodeResult<()> {
    let values = reader.read_qdstrings()?;
    if extensions.get(keyword).is_some() {
        return Err(reader.error(format!("multiple {keyword} elements")));
    }
    extensions.insert(keyword, values);
    Ok(())
}

/// Append `value` with every byte outside printable ASCII, `\` and `'` hex-escaped.
pub fn escape_qdstring(value: &str, out: &mut String) {
    let mut buf = [0u8; 4];
    for c in value.chars() {
        if (' '..='~').contains(&c) && c != '\\' && c != '\'' {
            out.push(c);
        } else {
            for byte in c.encode_utf8(&mut buf).bytes() {
                out.push_str(&format!("\\{byte:02x}"));
            }
        }
    }
}

pub(crate) fn render_qdstrings(out: &mut String, keyword: &str, values: &[String]) {
    match values {
        [] => {}
        [single] => {
            out.push_str(&format!(" {keyword} '"));
            escape_qdstring(single, out);
            out.push('\'');
        }
        many => {
            out.push_str(&format!(" {keyword} ("));
            for value in many {
                out.push_str(" '");
                escape_qdstring(value, out);
                out.push('\'');
            }
            out.push_str(" )");
        }
    }
}

pub(crate) fn render_qdstring(out: &mut String, keyword: &str, value: Option<&str>) {
    if let Some(value) = value {
        out.push_str(&format!(" {keyword} '"));
        escape_qdstring(value, out);
        out.push('\'');
    }
}

pub(crate) fn render_oids(out: &mut String, keyword: &str, values: &[String]) {
    match values {
        [] => {}
        [single] => out.push_str(&format!(" {keyword} {single}")),
        many => out.push_str(&format!(" {keyword} ( {} )", many.join(" $ "))),
    }
}

pub(crate) fn render_oid(out: &mut String, keyword: &str, value: Option<&str>) {
    if let Some(value) = value {
        out.push_str(&format!(" {keyword} {value}"));
    }
}

pub(crate) fn render_flag(out: &mut String, keyword: &str, set: bool) {
    if set {
        out.push(' ');
        out.push_str(keyword);
    }
}

pub(crate) fn render_extensions(out: &mut String, extensions: &Extensions) {
    for (name, values) in extensions.iter() {
        render_qdstrings(out, name, values);
    }
}
