//! Document id encoding.
//!
//! A search index commonly merges rows from several sources, but each
//! source only knows its own primary keys. Document ids are made globally
//! unique by interleaving: with `n` indices, the index at offset `k` maps
//! primary key `pk` to `pk * n + k`. The arithmetic runs inside the
//! database, so the scheme mainly produces SQL expressions; the host-side
//! [`DocumentIdScheme::encode`] and [`DocumentIdScheme::decode`] mirror
//! them exactly.
//!
//! Changing either the index count or an offset invalidates every document
//! id emitted before.

use crate::error::{ConfigResult, ConfigurationError};

/// Placeholder the indexer substitutes with a document id at query time.
pub const DOCUMENT_ID_PLACEHOLDER: &str = "$id";

/// Interleaving parameters of one index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentIdScheme {
    total_indexes: u32,
    offset: u32,
}

impl DocumentIdScheme {
    /// Creates a scheme for the index at `offset` among `total_indexes`.
    ///
    /// Ids stay unique across indices only while every index sharing
    /// `total_indexes` uses a distinct offset in `[0, total_indexes)`. That
    /// is a property of the whole configuration and is checked there; a
    /// single scheme only needs a non-zero index count.
    pub fn new(total_indexes: u32, offset: u32) -> ConfigResult<Self> {
        if total_indexes == 0 {
            return Err(ConfigurationError::NoIndices);
        }
        Ok(Self {
            total_indexes,
            offset,
        })
    }

    /// Number of interleaved indices.
    pub fn total_indexes(&self) -> u32 {
        self.total_indexes
    }

    /// Offset of this index.
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Maps a primary key to its document id, `None` on overflow.
    pub fn encode(&self, primary_key: u64) -> Option<u64> {
        primary_key
            .checked_mul(u64::from(self.total_indexes))?
            .checked_add(u64::from(self.offset))
    }

    /// Maps a document id back to its primary key.
    ///
    /// Returns `None` for ids this index never produces.
    pub fn decode(&self, document_id: u64) -> Option<u64> {
        let shifted = document_id.checked_sub(u64::from(self.offset))?;
        let total = u64::from(self.total_indexes);
        if shifted % total != 0 {
            return None;
        }
        Some(shifted / total)
    }

    /// SELECT-list expression computing the document id per row.
    pub fn encode_expression(&self, quoted_primary_key: &str, quoted_alias: &str) -> String {
        format!(
            "{} * {} + {} AS {}",
            quoted_primary_key, self.total_indexes, self.offset, quoted_alias
        )
    }

    /// Expression recovering the primary key from [`DOCUMENT_ID_PLACEHOLDER`].
    pub fn decode_expression(&self) -> String {
        format!(
            "({} - {}) / {}",
            DOCUMENT_ID_PLACEHOLDER, self.offset, self.total_indexes
        )
    }
}
