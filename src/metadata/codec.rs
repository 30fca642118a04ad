//! Key grammar for per-record metadata
//!
//! A record metadata entry is stored in the Parquet footer as
//! `"{record_id}:{property}" -> value`. Both parts are percent-escaped
//! (`%` as `%25`, `:` as `%3A`) so the key always splits at its first `:`.
//! A record id whose escaped text equals a reserved namespace (`morphpack`,
//! `ARROW`, `_dtype`) gets its first character percent-encoded as well, so
//! record keys never shadow format keys.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::error::MetadataKeyError;
use super::value::{DType, MetaValue};
use crate::record::RecordId;
use crate::schema::{DTYPE_PREFIX, RESERVED_NAMESPACES};

/// Percent-escape `%` and `:`
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '%' => out.push_str("%25"),
            ':' => out.push_str("%3A"),
            _ => out.push(c),
        }
    }
    out
}

/// Reverse [`escape`], accepting any `%XX` sequence.
pub fn unescape(text: &str) -> Result<String, String> {
    if !text.contains('%') {
        return Ok(text.to_string());
    }
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes
                .get(i + 1..i + 3)
                .and_then(|h| std::str::from_utf8(h).ok())
                .and_then(|h| u8::from_str_radix(h, 16).ok())
                .ok_or_else(|| format!("invalid escape at byte {}", i))?;
            out.push(hex);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).map_err(|_| "escape sequence is not valid UTF-8".to_string())
}

fn escape_record(record: &str) -> String {
    let escaped = escape(record);
    if RESERVED_NAMESPACES.contains(&escaped.as_str()) {
        // Reserved namespaces all start with an ASCII character
        let (first, rest) = escaped.split_at(1);
        format!("%{:02X}{}", first.as_bytes()[0], rest)
    } else {
        escaped
    }
}

/// True if `key` belongs to a reserved namespace rather than to a record.
pub fn is_reserved_key(key: &str) -> bool {
    key.split_once(':')
        .map(|(namespace, _)| RESERVED_NAMESPACES.contains(&namespace))
        .unwrap_or(false)
}

/// Footer key for a record property.
pub fn encode_key(record: &RecordId, property: &str) -> String {
    format!("{}:{}", escape_record(&record.to_string()), escape(property))
}

/// Split a footer key into the record id text and the property name.
///
/// The record id is returned as text; interpreting it requires the table's
/// declared id type.
pub fn decode_key(key: &str) -> Result<(String, String), MetadataKeyError> {
    let malformed = |reason: String| MetadataKeyError::Malformed {
        key: key.to_string(),
        reason,
    };
    if is_reserved_key(key) {
        return Err(malformed("key belongs to a reserved namespace".to_string()));
    }
    let (record, property) = key
        .split_once(':')
        .ok_or_else(|| malformed("missing ':' separator".to_string()))?;
    let record = unescape(record).map_err(malformed)?;
    let property = unescape(property).map_err(malformed)?;
    if property.is_empty() {
        return Err(MetadataKeyError::EmptyProperty { record });
    }
    Ok((record, property))
}

/// Footer key holding the type hint of a property
pub fn dtype_key(property: &str) -> String {
    format!("{}{}", DTYPE_PREFIX, escape(property))
}

/// Encode one entry into a footer key/value pair.
///
/// Byte values are base64 encoded; the caller is responsible for recording
/// a `bytes` type hint for the property.
pub fn encode_entry(record: &RecordId, property: &str, value: &MetaValue) -> (String, String) {
    let value = match value {
        MetaValue::Str(s) => s.clone(),
        MetaValue::Bytes(b) => STANDARD.encode(b),
    };
    (encode_key(record, property), value)
}

/// Encode a value that is neither text nor bytes using the caller's
/// stringification. The codec never guesses a representation.
pub fn encode_with<T, F>(record: &RecordId, property: &str, value: &T, stringify: F) -> (String, String)
where
    F: Fn(&T) -> String,
{
    encode_entry(record, property, &MetaValue::Str(stringify(value)))
}

/// Decode one footer key/value pair.
///
/// `dtype` is the hint recorded for the property, if any; a `bytes` hint
/// turns the base64 text back into bytes.
pub fn decode_entry(
    key: &str,
    value: &str,
    dtype: Option<DType>,
) -> Result<(String, String, MetaValue), MetadataKeyError> {
    let (record, property) = decode_key(key)?;
    let value = match dtype {
        Some(DType::Bytes) => MetaValue::Bytes(STANDARD.decode(value).map_err(|e| {
            MetadataKeyError::InvalidValue {
                key: key.to_string(),
                reason: format!("invalid base64: {}", e),
            }
        })?),
        _ => MetaValue::Str(value.to_string()),
    };
    Ok((record, property, value))
}
