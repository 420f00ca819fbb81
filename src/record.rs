//! Canonical size records shared by every normalizer.
//!
//! Each normalizer emits `(identifier, SizeRecord)` pairs. The aggregator folds
//! them into a [`SizeTable`], which is what ends up in the snapshot artifact:
//!
//! ```json
//! {
//!   "docs.landing": { "parsed": 2300, "gzip": -1 },
//!   "docs:chunk:shared": { "parsed": 3000, "gzip": -1, "tally": 2 }
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One artifact identifier and its measured sizes.
pub type SizeEntry = (String, SizeRecord);

/// Identifier-to-record table, ordered by identifier.
pub type SizeTable = BTreeMap<String, SizeRecord>;

/// Sizes of a single build artifact or synthetic aggregate.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct SizeRecord {
    /// Uncompressed size in bytes.
    pub parsed: u64,

    /// Compressed size in bytes, `None` when the source does not measure it.
    /// Stored as `-1` in the artifact.
    #[serde(with = "gzip_sentinel")]
    pub gzip: Option<u64>,

    /// Number of artifacts folded into this record. Only set on aggregates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tally: Option<u64>,
}

impl SizeRecord {
    /// Record with both sizes known.
    #[must_use]
    pub const fn new(parsed: u64, gzip: u64) -> Self {
        Self {
            parsed,
            gzip: Some(gzip),
            tally: None,
        }
    }

    /// Record from a source that only reports the uncompressed size.
    #[must_use]
    pub const fn parsed_only(parsed: u64) -> Self {
        Self {
            parsed,
            gzip: None,
            tally: None,
        }
    }

    /// Synthetic record summing `tally` anonymous artifacts.
    #[must_use]
    pub const fn aggregate(parsed: u64, tally: u64) -> Self {
        Self {
            parsed,
            gzip: None,
            tally: Some(tally),
        }
    }
}

/// `Option<u64>` <-> `-1`-or-non-negative integer.
mod gzip_sentinel {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    const UNKNOWN: i64 = -1;

    #[allow(clippy::ref_option)]
    pub(super) fn serialize<S: Serializer>(
        value: &Option<u64>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(bytes) => serializer.serialize_u64(*bytes),
            None => serializer.serialize_i64(UNKNOWN),
        }
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<u64>, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        match raw {
            UNKNOWN => Ok(None),
            bytes if bytes >= 0 => Ok(u64::try_from(bytes).ok()),
            other => Err(D::Error::custom(format!(
                "gzip must be -1 or a non-negative byte count, got {other}"
            ))),
        }
    }
}
