//! The standard equality matching rules of RFC 4517.

use super::MatchingRule;
use crate::dn::Dn;
use crate::error::{MatchingRuleError, MatchingRuleResult};
use chrono::{FixedOffset, NaiveDate, TimeZone, Utc};

pub const CASE_IGNORE_MATCH_OID: &str = "2.5.13.2";
pub const CASE_EXACT_MATCH_OID: &str = "2.5.13.5";
pub const CASE_IGNORE_IA5_MATCH_OID: &str = "1.3.6.1.4.1.1466.109.114.2";
pub const CASE_EXACT_IA5_MATCH_OID: &str = "1.3.6.1.4.1.1466.109.114.1";
pub const OCTET_STRING_MATCH_OID: &str = "2.5.13.17";
pub const INTEGER_MATCH_OID: &str = "2.5.13.14";
pub const BOOLEAN_MATCH_OID: &str = "2.5.13.13";
pub const NUMERIC_STRING_MATCH_OID: &str = "2.5.13.8";
pub const DISTINGUISHED_NAME_MATCH_OID: &str = "2.5.13.1";
pub const GENERALIZED_TIME_MATCH_OID: &str = "2.5.13.27";
pub const OBJECT_IDENTIFIER_MATCH_OID: &str = "2.5.13.0";
pub const TELEPHONE_NUMBER_MATCH_OID: &str = "2.5.13.20";

type Normalizer = fn(&[u8]) -> Result<Vec<u8>, String>;

/// A matching rule defined by an OID, its names and a normalization function.
#[derive(Debug, Clone, Copy)]
pub struct StandardMatchingRule {
    oid: &'static str,
    names: &'static [&'static str],
    normalizer: Normalizer,
}

impl StandardMatchingRule {
    pub const fn new(oid: &'static str, names: &'static [&'static str], normalizer: Normalizer) -> Self {
        Self {
            oid,
            names,
            normalizer,
        }
    }
}

impl MatchingRule for StandardMatchingRule {
    fn oid(&self) -> &str {
        self.oid
    }

    fn names(&self) -> &[&str] {
        self.names
    }

    fn normalize(&self, value: &[u8]) -> MatchingRuleResult<Vec<u8>> {
        (self.normalizer)(value).map_err(|reason| MatchingRuleError::InvalidValue {
            rule: self.name_or_oid().to_string(),
            reason,
        })
    }
}

pub const CASE_IGNORE_MATCH: StandardMatchingRule =
    StandardMatchingRule::new(CASE_IGNORE_MATCH_OID, &["caseIgnoreMatch"], case_ignore);
pub const CASE_EXACT_MATCH: StandardMatchingRule =
    StandardMatchingRule::new(CASE_EXACT_MATCH_OID, &["caseExactMatch"], case_exact);
pub const CASE_IGNORE_IA5_MATCH: StandardMatchingRule =
    StandardMatchingRule::new(CASE_IGNORE_IA5_MATCH_OID, &["caseIgnoreIA5Match"], case_ignore_ia5);
pub const CASE_EXACT_IA5_MATCH: StandardMatchingRule =
    StandardMatchingRule::new(CASE_EXACT_IA5_MATCH_OID, &["caseExactIA5Match"], case_exact_ia5);
pub const OCTET_STRING_MATCH: StandardMatchingRule =
    StandardMatchingRule::new(OCTET_STRING_MATCH_OID, &["octetStringMatch"], octet_string);
pub const INTEGER_MATCH: StandardMatchingRule =
    StandardMatchingRule::new(INTEGER_MATCH_OID, &["integerMatch"], integer);
pub const BOOLEAN_MATCH: StandardMatchingRule =
    StandardMatchingRule::new(BOOLEAN_MATCH_OID, &["booleanMatch"], boolean);
pub const NUMERIC_STRING_MATCH: StandardMatchingRule =
    StandardMatchingRule::new(NUMERIC_STRING_MATCH_OID, &["numericStringMatch"], numeric_string);
pub const DISTINGUISHED_NAME_MATCH: StandardMatchingRule = StandardMatchingRule::new(
    DISTINGUISHED_NAME_MATCH_OID,
    &["distinguishedNameMatch"],
    distinguished_name,
);
pub const GENERALIZED_TIME_MATCH: StandardMatchingRule = StandardMatchingRule::new(
    GENERALIZED_TIME_MATCH_OID,
    &["generalizedTimeMatch"],
    generalized_time,
);
pub const OBJECT_IDENTIFIER_MATCH: StandardMatchingRule = StandardMatchingRule::new(
    OBJECT_IDENTIFIER_MATCH_OID,
    &["objectIdentifierMatch"],
    object_identifier,
);
pub const TELEPHONE_NUMBER_MATCH: StandardMatchingRule = StandardMatchingRule::new(
    TELEPHONE_NUMBER_MATCH_OID,
    &["telephoneNumberMatch"],
    telephone_number,
);

fn utf8(value: &[u8]) -> Result<&str, String> {
    std::str::from_utf8(value).map_err(|_| "the value is not valid UTF-8".to_string())
}

fn non_empty(value: &[u8]) -> Result<(), String> {
    if value.is_empty() {
        Err("the value is empty".to_string())
    } else {
        Ok(())
    }
}

fn collapse_spaces(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn require_ia5(value: &[u8]) -> Result<(), String> {
    match value.iter().position(|b| !b.is_ascii()) {
        Some(index) => Err(format!("byte {index} is not an IA5 character")),
        None => Ok(()),
    }
}

fn case_ignore(value: &[u8]) -> Result<Vec<u8>, String> {
    non_empty(value)?;
    Ok(collapse_spaces(utf8(value)?).to_lowercase().into_bytes())
}

fn case_exact(value: &[u8]) -> Result<Vec<u8>, String> {
    non_empty(value)?;
    Ok(collapse_spaces(utf8(value)?).into_bytes())
}

fn case_ignore_ia5(value: &[u8]) -> Result<Vec<u8>, String> {
    require_ia5(value)?;
    Ok(collapse_spaces(utf8(value)?).to_ascii_lowercase().into_bytes())
}

fn case_exact_ia5(value: &[u8]) -> Result<Vec<u8>, String> {
    require_ia5(value)?;
    Ok(collapse_spaces(utf8(value)?).into_bytes())
}

fn octet_string(value: &[u8]) -> Result<Vec<u8>, String> {
    Ok(value.to_vec())
}

fn integer(value: &[u8]) -> Result<Vec<u8>, String> {
    let text = utf8(value)?;
    let digits = text.strip_prefix('-').unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("'{text}' is not an integer"));
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return Err(format!("'{text}' has a leading zero"));
    }
    if text == "-0" {
        return Err("negative zero is not a valid integer".to_string());
    }
    Ok(value.to_vec())
}

fn boolean(value: &[u8]) -> Result<Vec<u8>, String> {
    let text = utf8(value)?;
    if text.eq_ignore_ascii_case("TRUE") {
        Ok(b"TRUE".to_vec())
    } else if text.eq_ignore_ascii_case("FALSE") {
        Ok(b"FALSE".to_vec())
    } else {
        Err(format!("'{text}' is neither TRUE nor FALSE"))
    }
}

fn numeric_string(value: &[u8]) -> Result<Vec<u8>, String> {
    non_empty(value)?;
    if let Some(bad) = value.iter().find(|b| !(b.is_ascii_digit() || **b == b' ')) {
        return Err(format!("'{}' is not allowed in a numeric string", char::from(*bad)));
    }
    Ok(value.iter().copied().filter(|b| *b != b' ').collect())
}

fn distinguished_name(value: &[u8]) -> Result<Vec<u8>, String> {
    let dn = Dn::parse(utf8(value)?).map_err(|e| e.to_string())?;
    Ok(dn.normalized().into_bytes())
}

fn object_identifier(value: &[u8]) -> Result<Vec<u8>, String> {
    let text = utf8(value)?.trim();
    let Some(first) = text.bytes().next() else {
        return Err("the value is empty".to_string());
    };
    let valid = if first.is_ascii_digit() {
        text.split('.')
            .all(|arc| !arc.is_empty() && arc.bytes().all(|b| b.is_ascii_digit()))
    } else {
        first.is_ascii_alphabetic() && text.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
    };
    if !valid {
        return Err(format!("'{text}' is not a numeric OID or descriptor"));
    }
    Ok(text.to_ascii_lowercase().into_bytes())
}

fn telephone_number(value: &[u8]) -> Result<Vec<u8>, String> {
    non_empty(value)?;
    let text = utf8(value)?;
    let normalized: String = text.chars().filter(|c| *c != ' ' && *c != '-').collect();
    if normalized.is_empty() {
        return Err(format!("'{text}' does not contain a telephone number"));
    }
    Ok(normalized.into_bytes())
}

/// Normalize a generalized time to UTC with millisecond precision,
/// `YYYYMMDDHHMMSS.fffZ`.
fn generalized_time(value: &[u8]) -> Result<Vec<u8>, String> {
    let text = utf8(value)?;
    let invalid = |why: &str| format!("'{text}' is not a valid generalized time: {why}");

    let digits_end = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    let digits = &text[..digits_end];
    if !matches!(digits.len(), 10 | 12 | 14) {
        return Err(invalid("expected YYYYMMDDHH[MM[SS]]"));
    }
    let field = |range: std::ops::Range<usize>| -> Result<u32, String> {
        digits
            .get(range)
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| invalid("non-numeric field"))
    };
    let year = field(0..4)? as i32;
    let (month, day, hour) = (field(4..6)?, field(6..8)?, field(8..10)?);
    let minute = if digits.len() >= 12 { field(10..12)? } else { 0 };
    let second = if digits.len() == 14 { field(12..14)? } else { 0 };

    let mut rest = &text[digits_end..];
    let mut fraction_ms: i64 = 0;
    if let Some(stripped) = rest.strip_prefix(['.', ',']) {
        let end = stripped
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(stripped.len());
        if end == 0 {
            return Err(invalid("empty fraction"));
        }
        let fraction: f64 = format!("0.{}", &stripped[..end])
            .parse()
            .map_err(|_| invalid("bad fraction"))?;
        let unit_ms = match digits.len() {
            10 => 3_600_000.0,
            12 => 60_000.0,
            _ => 1_000.0,
        };
        fraction_ms = (fraction * unit_ms).round() as i64;
        rest = &stripped[end..];
    }

    let offset_seconds = match rest {
        "Z" => 0,
        zone if zone.len() == 5 || zone.len() == 3 => {
            let sign = match zone.as_bytes()[0] {
                b'+' => 1,
                b'-' => -1,
                _ => return Err(invalid("bad time zone")),
            };
            let hours: i32 = zone[1..3].parse().map_err(|_| invalid("bad time zone"))?;
            let minutes: i32 = if zone.len() == 5 {
                zone[3..5].parse().map_err(|_| invalid("bad time zone"))?
            } else {
                0
            };
            if hours > 23 || minutes > 59 {
                return Err(invalid("bad time zone"));
            }
            sign * (hours * 3600 + minutes * 60)
        }
        _ => return Err(invalid("missing or bad time zone")),
    };

    let offset = FixedOffset::east_opt(offset_seconds).ok_or_else(|| invalid("bad time zone"))?;
    // A leap second (60) is folded onto the last representable second.
    let local = NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, second.min(59)))
        .ok_or_else(|| invalid("field out of range"))?;
    let instant = offset
        .from_local_datetime(&local)
        .single()
        .ok_or_else(|| invalid("ambiguous local time"))?
        .with_timezone(&Utc)
        + chrono::Duration::milliseconds(fraction_ms);

    Ok(instant.format("%Y%m%d%H%M%S%.3fZ").to_string().into_bytes())
}
