use std::collections::{BTreeMap, HashMap, HashSet};

use log::warn;

use super::codec::{decode_entry, dtype_key, encode_entry, encode_key, is_reserved_key, unescape};
use super::error::MetadataKeyError;
use super::value::{DType, MetaValue, TypedValue};
use crate::record::{IdType, RecordId};
use crate::schema::DTYPE_PREFIX;

/// Per-record key/value metadata of a collection.
///
/// Inserting the same `(record, property)` twice keeps the last value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordMetadata {
    entries: BTreeMap<RecordId, BTreeMap<String, MetaValue>>,
    dtypes: BTreeMap<String, DType>,
}

/// Result of decoding footer metadata
#[derive(Debug, Clone, Default)]
pub struct DecodedMetadata {
    /// Entries that could be decoded, including flagged ones
    pub metadata: RecordMetadata,
    /// Problems found while decoding
    pub issues: Vec<MetadataKeyError>,
    /// Raw key/value pairs that could not be decoded at all
    pub unparsed: BTreeMap<String, String>,
}

impl RecordMetadata {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property, returning the value it replaces.
    ///
    /// Byte values give the property a `bytes` type hint. Overwriting the
    /// last byte value of a property with text drops that hint again.
    pub fn insert(
        &mut self,
        record: impl Into<RecordId>,
        property: impl Into<String>,
        value: impl Into<MetaValue>,
    ) -> Option<MetaValue> {
        let property = property.into();
        let value = value.into();
        let is_bytes = value.is_bytes();
        let previous = self
            .entries
            .entry(record.into())
            .or_default()
            .insert(property.clone(), value);

        if is_bytes {
            self.dtypes.insert(property, DType::Bytes);
        } else if previous.as_ref().is_some_and(MetaValue::is_bytes)
            && self.dtype(&property) == Some(DType::Bytes)
            && !self.has_bytes(&property)
        {
            self.dtypes.remove(&property);
        }
        previous
    }

    fn has_bytes(&self, property: &str) -> bool {
        self.entries
            .values()
            .any(|p| p.get(property).is_some_and(MetaValue::is_bytes))
    }

    /// Set a property from a value the caller knows how to stringify.
    pub fn insert_with<T, F>(&mut self, record: impl Into<RecordId>, property: impl Into<String>, value: &T, stringify: F)
    where
        F: Fn(&T) -> String,
    {
        self.insert(record, property, MetaValue::Str(stringify(value)));
    }

    /// Set an integer property and its `int` type hint
    pub fn set_int(&mut self, record: impl Into<RecordId>, property: &str, value: i64) {
        self.insert(record, property, value.to_string());
        self.set_dtype(property, DType::Int);
    }

    /// Set a float property and its `float` type hint
    pub fn set_float(&mut self, record: impl Into<RecordId>, property: &str, value: f64) {
        self.insert(record, property, value.to_string());
        self.set_dtype(property, DType::Float);
    }

    /// Set a boolean property and its `bool` type hint
    pub fn set_bool(&mut self, record: impl Into<RecordId>, property: &str, value: bool) {
        self.insert(record, property, value.to_string());
        self.set_dtype(property, DType::Bool);
    }

    /// Record a type hint for a property
    pub fn set_dtype(&mut self, property: impl Into<String>, dtype: DType) {
        self.dtypes.insert(property.into(), dtype);
    }

    /// Type hint of a property
    pub fn dtype(&self, property: &str) -> Option<DType> {
        self.dtypes.get(property).copied()
    }

    /// Raw value of a property
    pub fn get(&self, record: &RecordId, property: &str) -> Option<&MetaValue> {
        self.entries.get(record).and_then(|p| p.get(property))
    }

    /// Value interpreted through the property's type hint.
    pub fn get_typed(&self, record: &RecordId, property: &str) -> Result<Option<TypedValue>, MetadataKeyError> {
        let Some(value) = self.get(record, property) else {
            return Ok(None);
        };
        TypedValue::from_raw(value, self.dtype(property))
            .map(Some)
            .map_err(|reason| MetadataKeyError::InvalidValue {
                key: encode_key(record, property),
                reason,
            })
    }

    /// All properties of a record
    pub fn properties(&self, record: &RecordId) -> Option<&BTreeMap<String, MetaValue>> {
        self.entries.get(record)
    }

    /// Records that carry metadata
    pub fn records(&self) -> impl Iterator<Item = &RecordId> {
        self.entries.keys()
    }

    /// Number of `(record, property)` entries
    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    /// True if no entries are stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the store keyed by ids of `id_type`.
    ///
    /// Each record id is coerced through its text form, so `"12345"` and
    /// `12345` name the same record in an integer collection. Ids that
    /// cannot be coerced are kept as they are. When two ids collapse onto
    /// one record their properties merge, and the id that sorts later wins
    /// a clash.
    pub fn with_id_type(&self, id_type: IdType) -> RecordMetadata {
        let mut entries: BTreeMap<RecordId, BTreeMap<String, MetaValue>> = BTreeMap::new();
        for (record, properties) in &self.entries {
            let id = record.coerce(id_type).unwrap_or_else(|| record.clone());
            entries
                .entry(id)
                .or_default()
                .extend(properties.iter().map(|(p, v)| (p.clone(), v.clone())));
        }
        RecordMetadata {
            entries,
            dtypes: self.dtypes.clone(),
        }
    }

    /// Drop the metadata of every record not in `keep`.
    pub fn retain_records(&mut self, keep: &HashSet<RecordId>) {
        self.entries.retain(|id, _| keep.contains(id));
    }

    /// Check the store against the records of a collection.
    ///
    /// Returns every problem: entries for unknown records, empty property
    /// names, properties mixing byte and string values, and values that do
    /// not parse under their type hint.
    pub fn validate(&self, known: &HashSet<RecordId>) -> Vec<MetadataKeyError> {
        let mut errors = Vec::new();
        let mut kinds: HashMap<&str, (bool, bool)> = HashMap::new();

        for (record, properties) in &self.entries {
            if !known.contains(record) {
                errors.push(MetadataKeyError::UnknownRecord {
                    key: properties
                        .keys()
                        .next()
                        .map(|p| encode_key(record, p))
                        .unwrap_or_default(),
                    record: record.to_string(),
                });
            }
            for (property, value) in properties {
                if property.is_empty() {
                    errors.push(MetadataKeyError::EmptyProperty {
                        record: record.to_string(),
                    });
                    continue;
                }
                let seen = kinds.entry(property.as_str()).or_default();
                if value.is_bytes() {
                    seen.1 = true;
                } else {
                    seen.0 = true;
                    if let Err(reason) = TypedValue::from_raw(value, self.dtype(property)) {
                        if self.dtype(property) != Some(DType::Bytes) {
                            errors.push(MetadataKeyError::InvalidValue {
                                key: encode_key(record, property),
                                reason,
                            });
                        }
                    }
                }
            }
        }

        let mut mixed: Vec<&str> = kinds
            .iter()
            .filter(|(property, (text, bytes))| {
                let bytes_hint = self.dtype(property) == Some(DType::Bytes);
                (*text && *bytes) || (*text && bytes_hint) || (*bytes && !bytes_hint)
            })
            .map(|(property, _)| *property)
            .collect();
        mixed.sort_unstable();
        errors.extend(mixed.into_iter().map(|property| MetadataKeyError::MixedValueKinds {
            property: property.to_string(),
        }));

        errors
    }

    /// Encode the store as footer key/value pairs.
    ///
    /// Type hints come first, followed by the record entries.
    pub fn to_key_values(&self) -> Vec<(String, String)> {
        let mut kv: Vec<(String, String)> = self
            .dtypes
            .iter()
            .map(|(property, dtype)| (dtype_key(property), dtype.as_str().to_string()))
            .collect();
        for (record, properties) in &self.entries {
            for (property, value) in properties {
                kv.push(encode_entry(record, property, value));
            }
        }
        kv
    }

    /// Decode record metadata from footer key/value pairs.
    ///
    /// Keys in reserved namespaces are skipped. When `known` is given,
    /// entries for records outside it are flagged but kept. Nothing here is
    /// fatal; problems are returned in [`DecodedMetadata::issues`].
    pub fn from_key_values<'a, I>(pairs: I, id_type: IdType, known: Option<&HashSet<RecordId>>) -> DecodedMetadata
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let pairs: Vec<(&str, &str)> = pairs.into_iter().collect();
        let mut decoded = DecodedMetadata::default();

        for (key, value) in &pairs {
            let Some(property) = key.strip_prefix(DTYPE_PREFIX) else {
                continue;
            };
            match (unescape(property), DType::parse(value)) {
                (Ok(property), Some(dtype)) => decoded.metadata.set_dtype(property, dtype),
                _ => {
                    decoded.issues.push(MetadataKeyError::InvalidValue {
                        key: key.to_string(),
                        reason: format!("unknown type hint '{}'", value),
                    });
                    decoded.unparsed.insert(key.to_string(), value.to_string());
                }
            }
        }

        for (key, value) in &pairs {
            if is_reserved_key(key) {
                continue;
            }
            let dtype = key
                .split_once(':')
                .and_then(|(_, p)| unescape(p).ok())
                .and_then(|p| decoded.metadata.dtype(&p));
            let (record_text, property, value) = match decode_entry(key, value, dtype) {
                Ok(entry) => entry,
                Err(issue) => {
                    decoded.issues.push(issue);
                    decoded.unparsed.insert(key.to_string(), value.to_string());
                    continue;
                }
            };
            let Some(record) = RecordId::parse_as(&record_text, id_type) else {
                decoded.issues.push(MetadataKeyError::Malformed {
                    key: key.to_string(),
                    reason: format!("'{}' is not a valid {} record id", record_text, id_type),
                });
                decoded.unparsed.insert(key.to_string(), value_text(&value));
                continue;
            };
            if known.is_some_and(|k| !k.contains(&record)) {
                decoded.issues.push(MetadataKeyError::UnknownRecord {
                    key: key.to_string(),
                    record: record_text,
                });
            }
            decoded.metadata.insert(record, property, value);
        }

        for issue in &decoded.issues {
            warn!("Metadata: {}", issue);
        }
        decoded
    }
}

fn value_text(value: &MetaValue) -> String {
    match value {
        MetaValue::Str(s) => s.clone(),
        MetaValue::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
    }
}
