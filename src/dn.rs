//! Distinguished name parsing (RFC 4514).
//!
//! The validator only needs the attribute/value pairs of an entry's leftmost RDN,
//! but the parser handles complete DNs: multi-valued RDNs joined with `+`,
//! backslash escapes of special characters, `\XX` hex byte escapes and
//! `#`-prefixed hex BER values.

use crate::error::{DnError, DnResult};
use std::fmt;

/// One `attribute=value` pair of an RDN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeValueAssertion {
    attribute: String,
    value: Vec<u8>,
}

impl AttributeValueAssertion {
    pub fn new(attribute: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }

    pub fn value_string(&self) -> String {
        String::from_utf8_lossy(&self.value).into_owned()
    }
}

/// A relative distinguished name with one or more components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rdn {
    components: Vec<AttributeValueAssertion>,
}

impl Rdn {
    pub fn components(&self) -> &[AttributeValueAssertion] {
        &self.components
    }

    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.components.iter().map(AttributeValueAssertion::attribute)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute_names().any(|a| a.eq_ignore_ascii_case(name))
    }

    /// Values of the components naming `attribute`.
    pub fn values_for<'a>(&'a self, attribute: &'a str) -> impl Iterator<Item = &'a [u8]> + 'a {
        self.components
            .iter()
            .filter(move |c| c.attribute.eq_ignore_ascii_case(attribute))
            .map(|c| c.value.as_slice())
    }

    /// Components with lower-cased attribute names and case-folded, whitespace
    /// collapsed values, sorted so that component order does not matter.
    pub fn normalized(&self) -> String {
        let mut parts: Vec<String> = self
            .components
            .iter()
            .map(|c| {
                let value = String::from_utf8_lossy(&c.value);
                let folded = value.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
                let mut out = c.attribute.to_ascii_lowercase();
                out.push('=');
                escape_value(folded.as_bytes(), &mut out);
                out
            })
            .collect();
        parts.sort();
        parts.join("+")
    }
}

impl fmt::Display for Rdn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, component) in self.components.iter().enumerate() {
            if i > 0 {
                f.write_str("+")?;
            }
            let mut value = String::new();
            escape_value(&component.value, &mut value);
            write!(f, "{}={}", component.attribute, value)?;
        }
        Ok(())
    }
}

/// A parsed distinguished name. The null DN has no RDNs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dn {
    rdns: Vec<Rdn>,
}

impl Dn {
    pub fn parse(dn: &str) -> DnResult<Self> {
        DnParser::new(dn).parse()
    }

    pub fn rdns(&self) -> &[Rdn] {
        &self.rdns
    }

    /// The leftmost RDN, or `None` for the null DN.
    pub fn rdn(&self) -> Option<&Rdn> {
        self.rdns.first()
    }

    /// The DN with its leftmost RDN removed.
    pub fn parent(&self) -> Option<Dn> {
        (!self.rdns.is_empty()).then(|| Dn {
            rdns: self.rdns[1..].to_vec(),
        })
    }

    pub fn is_null(&self) -> bool {
        self.rdns.is_empty()
    }

    /// Canonical form used for DN equality matching.
    pub fn normalized(&self) -> String {
        self.rdns
            .iter()
            .map(Rdn::normalized)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Display for Dn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, rdn) in self.rdns.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{rdn}")?;
        }
        Ok(())
    }
}

impl std::str::FromStr for Dn {
    type Err = DnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Parse only the leftmost RDN of a DN.
pub fn parse_rdn(dn: &str) -> DnResult<Option<Rdn>> {
    Ok(Dn::parse(dn)?.rdns.into_iter().next())
}

fn escape_value(value: &[u8], out: &mut String) {
    let text = String::from_utf8_lossy(value);
    let last = text.chars().count().saturating_sub(1);
    for (i, c) in text.chars().enumerate() {
        let leading = i == 0 && (c == ' ' || c == '#');
        let trailing = i == last && c == ' ';
        if leading || trailing || matches!(c, '"' | '+' | ',' | ';' | '<' | '>' | '\\' | '=') {
            out.push('\\');
            out.push(c);
        } else if c == '\0' {
            out.push_str("\\00");
        } else {
            out.push(c);
        }
    }
}

struct DnParser<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> DnParser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
        }
    }

    fn fail(&self, reason: impl Into<String>) -> DnError {
        DnError::Malformed {
            dn: self.input.to_string(),
            reason: reason.into(),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_spaces(&mut self) {
        while self.peek() == Some(b' ') {
            self.pos += 1;
        }
    }

    fn parse(mut self) -> DnResult<Dn> {
        self.skip_spaces();
        if self.peek().is_none() {
            return Ok(Dn::default());
        }

        let mut rdns = Vec::new();
        let mut components = Vec::new();
        loop {
            components.push(self.read_component()?);
            self.skip_spaces();
            match self.peek() {
                None => {
                    rdns.push(Rdn {
                        components: std::mem::take(&mut components),
                    });
                    return Ok(Dn { rdns });
                }
                Some(b'+') => self.pos += 1,
                Some(b',') | Some(b';') => {
                    self.pos += 1;
                    rdns.push(Rdn {
                        components: std::mem::take(&mut components),
                    });
                }
                Some(other) => {
                    return Err(self.fail(format!(
                        "unexpected character '{}' at position {}",
                        char::from(other),
                        self.pos
                    )));
                }
            }
        }
    }

    fn read_component(&mut self) -> DnResult<AttributeValueAssertion> {
        let attribute = self.read_attribute_type()?;
        self.skip_spaces();
        if self.peek() != Some(b'=') {
            return Err(self.fail(format!("attribute '{attribute}' is not followed by '='")));
        }
        self.pos += 1;
        self.skip_spaces();
        let value = if self.peek() == Some(b'#') {
            self.pos += 1;
            self.read_hex_value()?
        } else {
            self.read_string_value()?
        };
        Ok(AttributeValueAssertion { attribute, value })
    }

    fn read_attribute_type(&mut self) -> DnResult<String> {
        self.skip_spaces();
        let start = self.pos;
        while matches!(self.peek(), Some(b) if b.is_ascii_alphanumeric() || b == b'-' || b == b'.') {
            self.pos += 1;
        }
        let name = &self.input[start..self.pos];
        let Some(first) = name.bytes().next() else {
            return Err(self.fail(format!("expected an attribute type at position {start}")));
        };

        let valid = if first.is_ascii_digit() {
            name.split('.')
                .all(|arc| !arc.is_empty() && arc.bytes().all(|b| b.is_ascii_digit()))
        } else {
            first.is_ascii_alphabetic() && !name.contains('.')
        };
        if !valid {
            return Err(self.fail(format!("'{name}' is not a valid attribute type")));
        }
        Ok(name.to_string())
    }

    fn read_hex_value(&mut self) -> DnResult<Vec<u8>> {
        let mut value = Vec::new();
        while let Some(high) = self.peek() {
            if matches!(high, b',' | b'+' | b';' | b' ') {
                break;
            }
            let low = self
                .bytes
                .get(self.pos + 1)
                .copied()
                .ok_or_else(|| self.fail("odd number of hex digits in '#' value"))?;
            value.push(self.hex_pair(high, low)?);
            self.pos += 2;
        }
        if value.is_empty() {
            return Err(self.fail("empty '#' hex value"));
        }
        Ok(value)
    }

    fn hex_pair(&self, high: u8, low: u8) -> DnResult<u8> {
        let digit = |b: u8| char::from(b).to_digit(16);
        match (digit(high), digit(low)) {
            (Some(h), Some(l)) => Ok((h * 16 + l) as u8),
            _ => Err(self.fail(format!("invalid hex escape at position {}", self.pos))),
        }
    }

    fn read_string_value(&mut self) -> DnResult<Vec<u8>> {
        let mut value = Vec::new();
        // Length of the value up to its last significant byte; unescaped trailing spaces are dropped.
        let mut significant = 0;
        while let Some(b) = self.peek() {
            match b {
                b',' | b'+' | b';' => break,
                b'\\' => {
                    self.pos += 1;
                    let Some(next) = self.peek() else {
                        return Err(self.fail("DN ends with an incomplete escape"));
                    };
                    if b" \"#+,;<=>\\".contains(&next) {
                        value.push(next);
                        self.pos += 1;
                    } else {
                        let low = self
                            .bytes
                            .get(self.pos + 1)
                            .copied()
                            .ok_or_else(|| self.fail("DN ends with an incomplete hex escape"))?;
                        value.push(self.hex_pair(next, low)?);
                        self.pos += 2;
                    }
                    significant = value.len();
                }
                b'"' | b'<' | b'>' => {
                    return Err(self.fail(format!(
                        "unescaped '{}' at position {}",
                        char::from(b),
                        self.pos
                    )));
                }
                b' ' => {
                    value.push(b);
                    self.pos += 1;
                }
                _ => {
                    value.push(b);
                    self.pos += 1;
                    significant = value.len();
                }
            }
        }
        value.truncate(significant);
        Ok(value)
    }
}
