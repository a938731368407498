//! Reader for PHP `serialize()` output, as stored in attachment metadata.
//!
//! Supports the scalar, string and array forms WordPress writes for
//! `_wp_attachment_metadata`. Objects and references are rejected.

use nom::branch::alt;
use nom::bytes::complete::{tag, take, take_till};
use nom::character::complete::{char, digit1, one_of};
use nom::combinator::{map, map_res, opt, recognize};
use nom::multi::count;
use nom::sequence::{delimited, pair, terminated};
use nom::IResult;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum PhpValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// Ordered key/value entries.
    Array(Vec<(PhpKey, PhpValue)>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhpKey {
    Int(i64),
    String(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhpParseError {
    #[error("malformed serialized value at byte {offset}")]
    Malformed { offset: usize },
    #[error("unexpected trailing data at byte {offset}")]
    TrailingData { offset: usize },
}

impl PhpValue {
    /// Looks up an array entry by key; integer keys match their decimal text.
    pub fn get(&self, key: &str) -> Option<&PhpValue> {
        let Self::Array(entries) = self else {
            return None;
        };
        entries
            .iter()
            .find(|(entry_key, _)| match entry_key {
                PhpKey::String(value) => value == key,
                PhpKey::Int(value) => value.to_string() == key,
            })
            .map(|(_, value)| value)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }
}

/// Parses one serialized value; trailing whitespace is allowed.
pub fn unserialize(input: &str) -> Result<PhpValue, PhpParseError> {
    let bytes = input.as_bytes();
    match value(bytes) {
        Ok((rest, parsed)) => {
            if rest.iter().all(u8::is_ascii_whitespace) {
                Ok(parsed)
            } else {
                Err(PhpParseError::TrailingData {
                    offset: bytes.len() - rest.len(),
                })
            }
        }
        Err(nom::Err::Error(err)) | Err(nom::Err::Failure(err)) => Err(PhpParseError::Malformed {
            offset: bytes.len() - err.input.len(),
        }),
        Err(nom::Err::Incomplete(_)) => Err(PhpParseError::Malformed {
            offset: bytes.len(),
        }),
    }
}

fn value(input: &[u8]) -> IResult<&[u8], PhpValue> {
    alt((null, boolean, integer, float, string, array))(input)
}

fn null(input: &[u8]) -> IResult<&[u8], PhpValue> {
    map(tag("N;"), |_| PhpValue::Null)(input)
}

fn boolean(input: &[u8]) -> IResult<&[u8], PhpValue> {
    map(
        delimited(tag("b:"), one_of("01"), char(';')),
        |flag| PhpValue::Bool(flag == '1'),
    )(input)
}

fn integer(input: &[u8]) -> IResult<&[u8], PhpValue> {
    map(delimited(tag("i:"), signed, char(';')), PhpValue::Int)(input)
}

fn float(input: &[u8]) -> IResult<&[u8], PhpValue> {
    map_res(
        delimited(tag("d:"), take_till(|b| b == b';'), char(';')),
        |digits: &[u8]| {
            std::str::from_utf8(digits)
                .unwrap_or_default()
                .parse::<f64>()
                .map(PhpValue::Float)
        },
    )(input)
}

fn string(input: &[u8]) -> IResult<&[u8], PhpValue> {
    map(string_body, PhpValue::String)(input)
}

/// `s:<byte length>:"<bytes>";`
fn string_body(input: &[u8]) -> IResult<&[u8], String> {
    let (input, len) = delimited(tag("s:"), length, tag(":\""))(input)?;
    let (input, bytes) = terminated(take(len), tag("\";"))(input)?;
    Ok((input, String::from_utf8_lossy(bytes).into_owned()))
}

/// `a:<count>:{<key><value>...}`
fn array(input: &[u8]) -> IResult<&[u8], PhpValue> {
    let (input, len) = delimited(tag("a:"), length, tag(":{"))(input)?;
    let (input, entries) = terminated(count(pair(key, value), len), char('}'))(input)?;
    Ok((input, PhpValue::Array(entries)))
}

fn key(input: &[u8]) -> IResult<&[u8], PhpKey> {
    alt((
        map(delimited(tag("i:"), signed, char(';')), PhpKey::Int),
        map(string_body, PhpKey::String),
    ))(input)
}

fn length(input: &[u8]) -> IResult<&[u8], usize> {
    map_res(digit1, |digits: &[u8]| {
        std::str::from_utf8(digits).unwrap_or_default().parse::<usize>()
    })(input)
}

fn signed(input: &[u8]) -> IResult<&[u8], i64> {
    map_res(
        recognize(pair(opt(one_of("+-")), digit1)),
        |digits: &[u8]| std::str::from_utf8(digits).unwrap_or_default().parse::<i64>(),
    )(input)
}
