//! Versioned JSON serialization of engines.
//!
//! Rules are stored as text and function terms as formulas; parsed trees and
//! variable bindings are rebuilt by [`VersionedEngine::into_engine`].

use serde::{Deserialize, Serialize};

use crate::engine::Engine;
use crate::error::FuzzyResult;

/// Current serialization format version
pub const FORMAT_VERSION: &str = "1.0.0";

/// Versioned wrapper for Engine serialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionedEngine {
    /// Format version (semver)
    pub version: String,
    /// Creation timestamp (ISO 8601)
    pub created_at: Option<String>,
    /// Optional metadata
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
    /// The engine
    pub engine: Engine,
}

impl VersionedEngine {
    /// Create a new versioned engine
    pub fn new(engine: Engine) -> Self {
        VersionedEngine {
            version: FORMAT_VERSION.to_string(),
            created_at: Some(chrono::Utc::now().to_rfc3339()),
            metadata: None,
            engine,
        }
    }

    /// Create with custom metadata
    pub fn with_metadata(
        engine: Engine,
        metadata: serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        VersionedEngine {
            metadata: Some(metadata),
            ..Self::new(engine)
        }
    }

    /// Serialize to pretty JSON
    pub fn to_json_pretty(&self) -> FuzzyResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Serialize to compact JSON
    pub fn to_json_compact(&self) -> FuzzyResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize from JSON
    pub fn from_json(json: &str) -> FuzzyResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Whether this was written by a compatible format version (same major).
    pub fn is_compatible(&self) -> bool {
        let major = |version: &str| version.split('.').next().map(str::to_string);
        major(&self.version) == major(FORMAT_VERSION)
    }

    /// Unwrap the engine and load its rules and formulas.
    pub fn into_engine(self) -> FuzzyResult<Engine> {
        let mut engine = self.engine;
        engine.load()?;
        Ok(engine)
    }
}

/// Serde helpers for scalars that may be NaN or infinite, which JSON
/// numbers cannot hold. Non-finite values are written as `"nan"`, `"inf"`
/// and `"-inf"`; both numbers and those strings are accepted on input.
pub(crate) mod scalar {
    use std::fmt;

    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else if value.is_nan() {
            serializer.serialize_str("nan")
        } else if *value > 0.0 {
            serializer.serialize_str("inf")
        } else {
            serializer.serialize_str("-inf")
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        deserializer.deserialize_any(ScalarVisitor)
    }

    struct ScalarVisitor;

    impl<'de> Visitor<'de> for ScalarVisitor {
        type Value = f64;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a number, \"nan\", \"inf\" or \"-inf\"")
        }

        fn visit_f64<E: de::Error>(self, value: f64) -> Result<f64, E> {
            Ok(value)
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<f64, E> {
            Ok(value as f64)
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<f64, E> {
            Ok(value as f64)
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<f64, E> {
            match value {
                "nan" => Ok(f64::NAN),
                "inf" => Ok(f64::INFINITY),
                "-inf" => Ok(f64::NEG_INFINITY),
                _ => Err(E::invalid_value(de::Unexpected::Str(value), &self)),
            }
        }

        fn visit_unit<E: de::Error>(self) -> Result<f64, E> {
            Ok(f64::NAN)
        }
    }
}
