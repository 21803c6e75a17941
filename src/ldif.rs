//! A compact LDIF content reader (RFC 2849).
//!
//! Supports comments, folded lines, base64 values (`attr:: ...`), an optional
//! leading `version: 1` line and blank-line separated records. Change records and
//! URL values (`attr:< ...`) are rejected.

use crate::entry::{Attribute, Entry};
use crate::error::{LdifError, LdifResult};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use std::io::BufRead;

/// Read every entry from LDIF text.
pub fn parse_entries(input: &str) -> LdifResult<Vec<Entry>> {
    read_entries(input.as_bytes())
}

/// Read every entry from a buffered reader.
pub fn read_entries(reader: impl BufRead) -> LdifResult<Vec<Entry>> {
    let mut entries = Vec::new();
    let mut record: Vec<(usize, String)> = Vec::new();
    let mut first_record = true;

    for (index, line) in unfold(reader)? {
        if line.is_empty() {
            if !record.is_empty() {
                if let Some(entry) = parse_record(&record, first_record)? {
                    entries.push(entry);
                }
                first_record = false;
                record.clear();
            }
            continue;
        }
        record.push((index, line));
    }
    if !record.is_empty() {
        if let Some(entry) = parse_record(&record, first_record)? {
            entries.push(entry);
        }
    }
    Ok(entries)
}

/// Join continuation lines and drop comments. Returns `(line number, text)`
/// pairs; an empty text marks a record separator.
fn unfold(reader: impl BufRead) -> LdifResult<Vec<(usize, String)>> {
    let mut lines: Vec<(usize, String)> = Vec::new();
    let mut in_comment = false;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.strip_suffix('\r').unwrap_or(&line);
        let number = index + 1;

        if let Some(continuation) = line.strip_prefix(' ') {
            if in_comment {
                continue;
            }
            match lines.last_mut() {
                Some((_, previous)) if !previous.is_empty() => previous.push_str(continuation),
                _ => {
                    return Err(LdifError::Malformed {
                        line: number,
                        message: "continuation line without a preceding line".to_string(),
                    });
                }
            }
            continue;
        }

        in_comment = line.starts_with('#');
        if in_comment {
            continue;
        }
        if line.trim().is_empty() {
            lines.push((number, String::new()));
        } else {
            lines.push((number, line.to_string()));
        }
    }
    Ok(lines)
}

fn parse_record(record: &[(usize, String)], first_record: bool) -> LdifResult<Option<Entry>> {
    let mut lines = record.iter();
    let Some((mut number, mut line)) = lines.next().map(|(n, l)| (*n, l)) else {
        return Ok(None);
    };

    if first_record {
        let (name, value) = split_line(number, line)?;
        if name.eq_ignore_ascii_case("version") {
            if String::from_utf8_lossy(&value).trim() != "1" {
                return Err(LdifError::Malformed {
                    line: number,
                    message: "unsupported LDIF version".to_string(),
                });
            }
            match lines.next() {
                Some((n, l)) => {
                    number = *n;
                    line = l;
                }
                None => return Ok(None),
            }
        }
    }

    let (name, dn) = split_line(number, line)?;
    if !name.eq_ignore_ascii_case("dn") {
        return Err(LdifError::Malformed {
            line: number,
            message: format!("expected a 'dn:' line but found '{name}'"),
        });
    }
    let mut entry = Entry::new(String::from_utf8_lossy(&dn).into_owned());

    for (number, line) in lines {
        let (name, value) = split_line(*number, line)?;
        if name.eq_ignore_ascii_case("changetype") {
            return Err(LdifError::Malformed {
                line: *number,
                message: "change records are not supported".to_string(),
            });
        }
        entry.add_attribute(Attribute::new(name, [value]));
    }
    Ok(Some(entry))
}

/// Split `name: value`, `name:: base64` into the name and the decoded value.
fn split_line(number: usize, line: &str) -> LdifResult<(String, Vec<u8>)> {
    let Some((name, rest)) = line.split_once(':') else {
        return Err(LdifError::Malformed {
            line: number,
            message: format!("line '{line}' has no ':' separator"),
        });
    };
    if name.is_empty() {
        return Err(LdifError::Malformed {
            line: number,
            message: "missing attribute name".to_string(),
        });
    }

    let value = if let Some(encoded) = rest.strip_prefix(':') {
        STANDARD
            .decode(encoded.trim())
            .map_err(|source| LdifError::Base64 {
                line: number,
                source,
            })?
    } else if rest.starts_with('<') {
        return Err(LdifError::Malformed {
            line: number,
            message: "URL values are not supported".to_string(),
        });
    } else {
        rest.trim_start_matches(' ').as_bytes().to_vec()
    };
    Ok((name.trim().to_string(), value))
}
