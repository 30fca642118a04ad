//! Packing profiles.
//!
//! A profile picks one of the [`WriterConfig`] presets so users never have
//! to touch Parquet settings directly.

use std::fmt;
use std::str::FromStr;

use morphpack::writer::WriterConfig;

/// Packing profiles for common use cases.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Profile {
    /// Snappy, small row groups
    Fast,

    /// ZSTD, 100,000-row groups (default)
    #[default]
    Balanced,

    /// ZSTD level 22, large row groups
    MaxCompression,
}

impl Profile {
    /// Writer preset for this profile
    pub fn writer_config(&self) -> WriterConfig {
        match self {
            Profile::Fast => WriterConfig::fast_write(),
            Profile::Balanced => WriterConfig::balanced(),
            Profile::MaxCompression => WriterConfig::max_compression(),
        }
    }

    /// Returns all available profile names.
    pub fn variants() -> &'static [&'static str] {
        &["fast", "balanced", "max-compression"]
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Profile::Fast => write!(f, "fast"),
            Profile::Balanced => write!(f, "balanced"),
            Profile::MaxCompression => write!(f, "max-compression"),
        }
    }
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fast" => Ok(Profile::Fast),
            "balanced" | "default" => Ok(Profile::Balanced),
            "max-compression" | "maxcompression" | "max" => Ok(Profile::MaxCompression),
            _ => Err(format!(
                "Unknown profile '{}'. Valid options: {}",
                s,
                Profile::variants().join(", ")
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use morphpack::writer::CompressionType;

    #[test]
    fn test_profile_presets() {
        assert_eq!(Profile::default(), Profile::Balanced);
        assert_eq!(Profile::Fast.writer_config().compression, CompressionType::Snappy);
        assert_eq!(Profile::Fast.writer_config().row_group_size, 50_000);
        assert_eq!(
            Profile::MaxCompression.writer_config().compression,
            CompressionType::Zstd(22)
        );
    }

    #[test]
    fn test_profile_from_str() {
        assert_eq!(Profile::from_str("fast").unwrap(), Profile::Fast);
        assert_eq!(Profile::from_str("BALANCED").unwrap(), Profile::Balanced);
        assert_eq!(Profile::from_str("max").unwrap(), Profile::MaxCompression);
        assert!(Profile::from_str("invalid").is_err());
    }
}
