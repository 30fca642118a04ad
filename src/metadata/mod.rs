//! # Per-record metadata
//!
//! Arbitrary key/value metadata attached to individual records of a packed
//! table. Parquet footers only hold a flat string dictionary, so entries are
//! stored as `"{record_id}:{property}" -> value` pairs next to the format keys
//! (see [`codec`] for the escaping rules).
//!
//! The codec is type-agnostic: values are text or bytes at rest, and the
//! logical type cannot be recovered from the container alone. Optional
//! `_dtype:{property}` hints let [`RecordMetadata::get_typed`] recover ints,
//! floats, and booleans.
//!
//! ```
//! use morphpack::metadata::{MetaValue, RecordMetadata};
//! use morphpack::record::RecordId;
//!
//! let mut metadata = RecordMetadata::new();
//! metadata.insert(12345, "name", "Humpty");
//! metadata.insert(67890, "name", "Dumpty");
//!
//! let kv = metadata.to_key_values();
//! assert!(kv.contains(&("12345:name".to_string(), "Humpty".to_string())));
//! assert_eq!(
//!     metadata.get(&RecordId::Int(67890), "name"),
//!     Some(&MetaValue::from("Dumpty"))
//! );
//! ```

pub mod codec;
mod error;
mod store;
mod value;


pub use codec::{decode_entry, decode_key, encode_entry, encode_key, encode_with};
pub use error::{MetadataKeyError, MetadataKeyErrors};
pub use store::{DecodedMetadata, RecordMetadata};
pub use value::{DType, MetaValue, TypedValue};
