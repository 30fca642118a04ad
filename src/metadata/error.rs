use std::fmt;

/// Problems with record metadata keys and values.
///
/// Fatal when packing; when unpacking they are collected as warnings and the
/// affected entries are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MetadataKeyError {
    /// Key does not follow the `{record_id}:{property}` grammar
    #[error("malformed metadata key '{key}': {reason}")]
    Malformed {
        /// Offending key
        key: String,
        /// Why it could not be decoded
        reason: String,
    },

    /// Key references a record that is not in the collection
    #[error("metadata key '{key}' references unknown record '{record}'")]
    UnknownRecord {
        /// Offending key
        key: String,
        /// Record id as written in the key
        record: String,
    },

    /// Property name is empty
    #[error("metadata entry for record '{record}' has an empty property name")]
    EmptyProperty {
        /// Record id
        record: String,
    },

    /// Property holds both string and byte values
    #[error("property '{property}' mixes string and byte values")]
    MixedValueKinds {
        /// Property name
        property: String,
    },

    /// Value does not match the declared type hint
    #[error("invalid value for '{key}': {reason}")]
    InvalidValue {
        /// Offending key
        key: String,
        /// Why the value was rejected
        reason: String,
    },
}

/// Every metadata problem found in one validation pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataKeyErrors(pub Vec<MetadataKeyError>);

impl fmt::Display for MetadataKeyErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} metadata error(s): ", self.0.len())?;
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for MetadataKeyErrors {}
