//! Sold-set: the client-side cache of claimed bricks.
//!
//! The external brick store is authoritative; this is a best-effort mirror
//! fed by an initial load and by realtime change notifications. Entries are
//! only ever inserted or updated, never removed, and every merge is an
//! idempotent upsert keyed by brick index, so replayed notifications are
//! harmless.
//!
//! Realtime payloads arrive as loosely-typed JSON rows. They are validated
//! into a [`BrickChange`] at the boundary ([`BrickChange::from_record`])
//! before anything touches the set.

#[cfg(test)]
#[path = "sold_test.rs"]
mod sold_test;

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::consts::DEFAULT_BRICK_COLOR;
use crate::grid::Grid;

/// Status value the store uses for claimed bricks.
pub const SOLD_STATUS: &str = "sold";

/// Optional social links attached to a brick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLinks {
    #[serde(default)]
    pub facebook_url: Option<String>,
    #[serde(default)]
    pub instagram_url: Option<String>,
    #[serde(default)]
    pub youtube_url: Option<String>,
    #[serde(default)]
    pub tiktok_url: Option<String>,
    #[serde(default)]
    pub x_url: Option<String>,
}

impl SocialLinks {
    /// Non-empty links paired with a display label, in a stable order.
    #[must_use]
    pub fn labeled(&self) -> Vec<(&'static str, &str)> {
        [
            ("Facebook", self.facebook_url.as_deref()),
            ("Instagram", self.instagram_url.as_deref()),
            ("YouTube", self.youtube_url.as_deref()),
            ("TikTok", self.tiktok_url.as_deref()),
            ("X", self.x_url.as_deref()),
        ]
        .into_iter()
        .filter_map(|(label, url)| url.map(str::trim).filter(|u| !u.is_empty()).map(|u| (label, u)))
        .collect()
    }
}

/// Everything the store keeps about a claimed brick, apart from its index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrickFields {
    /// Store row id.
    #[serde(default)]
    pub id: Option<i64>,
    /// CSS color. Missing or empty falls back to [`DEFAULT_BRICK_COLOR`].
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(flatten)]
    pub links: SocialLinks,
    #[serde(default)]
    pub owner_id: Option<Uuid>,
}

impl BrickFields {
    /// Fill color to paint, with the default applied.
    #[must_use]
    pub fn color(&self) -> &str {
        self.color
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_BRICK_COLOR)
    }
}

/// A claimed brick as returned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrickRecord {
    pub brick_index: u32,
    #[serde(flatten)]
    pub fields: BrickFields,
}

/// The renderer's view of a sold brick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoldBrick<'a> {
    pub index: u32,
    pub color: &'a str,
}

/// Which kind of store event produced a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Insert,
    Update,
}

/// A validated realtime change for one brick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrickChange {
    pub kind: ChangeKind,
    pub index: u32,
    pub fields: BrickFields,
}

/// Reasons a realtime row is rejected at the boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChangeError {
    #[error("change record is not a JSON object")]
    NotAnObject,
    #[error("change record has no valid brick_index")]
    MissingIndex,
    #[error("change record fields are malformed: {0}")]
    Malformed(String),
}

impl BrickChange {
    /// Validate a raw store row into a change.
    ///
    /// Rows carrying a `status` other than `"sold"` are not claims and yield
    /// `Ok(None)`; they are skipped rather than treated as errors.
    ///
    /// # Errors
    ///
    /// Returns [`ChangeError`] when the row is not an object, lacks a usable
    /// `brick_index`, or has fields of the wrong type.
    pub fn from_record(kind: ChangeKind, record: &serde_json::Value) -> Result<Option<Self>, ChangeError> {
        let Some(row) = record.as_object() else {
            return Err(ChangeError::NotAnObject);
        };
        if let Some(status) = row.get("status").and_then(serde_json::Value::as_str) {
            if status != SOLD_STATUS {
                return Ok(None);
            }
        }
        let index = match row.get("brick_index").and_then(serde_json::Value::as_u64).map(u32::try_from) {
            Some(Ok(index)) => index,
            _ => return Err(ChangeError::MissingIndex),
        };
        let fields =
            BrickFields::deserialize(record).map_err(|e| ChangeError::Malformed(e.to_string()))?;
        Ok(Some(Self { kind, index, fields }))
    }

    /// Treat a store record (e.g. a purchase result) as an insert.
    #[must_use]
    pub fn insert(record: BrickRecord) -> Self {
        Self { kind: ChangeKind::Insert, index: record.brick_index, fields: record.fields }
    }
}

/// Result of merging one change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Merge {
    /// The index was new.
    Inserted,
    /// The index existed and its fields changed.
    Updated,
    /// The index existed with identical fields.
    Unchanged,
    /// The index lies outside the grid; nothing was stored.
    OutOfRange,
}

impl Merge {
    /// Whether the merge altered what is painted or shown.
    #[must_use]
    pub fn changed(self) -> bool {
        matches!(self, Self::Inserted | Self::Updated)
    }
}

/// Sparse set of claimed bricks keyed by index.
#[derive(Debug, Clone, Default)]
pub struct SoldSet {
    grid: Grid,
    bricks: BTreeMap<u32, BrickFields>,
}

impl SoldSet {
    #[must_use]
    pub fn new(grid: Grid) -> Self {
        Self { grid, bricks: BTreeMap::new() }
    }

    #[must_use]
    pub fn grid(&self) -> Grid {
        self.grid
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bricks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bricks.is_empty()
    }

    #[must_use]
    pub fn contains(&self, index: u32) -> bool {
        self.bricks.contains_key(&index)
    }

    #[must_use]
    pub fn get(&self, index: u32) -> Option<&BrickFields> {
        self.bricks.get(&index)
    }

    /// Full record for an index, if claimed.
    #[must_use]
    pub fn record(&self, index: u32) -> Option<BrickRecord> {
        self.bricks.get(&index).map(|fields| BrickRecord { brick_index: index, fields: fields.clone() })
    }

    /// Claimed bricks in index order.
    pub fn iter(&self) -> impl Iterator<Item = SoldBrick<'_>> {
        self.bricks.iter().map(|(&index, fields)| SoldBrick { index, color: fields.color() })
    }

    /// Claimed bricks whose index lies in `span`, in index order.
    pub fn span(&self, span: RangeInclusive<u32>) -> impl Iterator<Item = SoldBrick<'_>> {
        self.bricks.range(span).map(|(&index, fields)| SoldBrick { index, color: fields.color() })
    }

    /// Full records in index order.
    pub fn records(&self) -> impl Iterator<Item = BrickRecord> + '_ {
        self.bricks.iter().map(|(&index, fields)| BrickRecord { brick_index: index, fields: fields.clone() })
    }

    /// Idempotent upsert of one change.
    pub fn apply(&mut self, change: BrickChange) -> Merge {
        if !self.grid.contains_index(change.index) {
            return Merge::OutOfRange;
        }
        match self.bricks.entry(change.index) {
            Entry::Vacant(slot) => {
                slot.insert(change.fields);
                Merge::Inserted
            }
            Entry::Occupied(mut slot) => {
                if *slot.get() == change.fields {
                    Merge::Unchanged
                } else {
                    slot.insert(change.fields);
                    Merge::Updated
                }
            }
        }
    }

    /// Merge a batch of records from a full load. Existing entries are kept.
    ///
    /// Returns whether anything changed.
    pub fn load_snapshot(&mut self, records: impl IntoIterator<Item = BrickRecord>) -> bool {
        let mut changed = false;
        for record in records {
            changed |= self.apply(BrickChange::insert(record)).changed();
        }
        changed
    }

    /// Indices owned by `owner`, in index order.
    #[must_use]
    pub fn owned_by(&self, owner: Uuid) -> Vec<u32> {
        self.bricks
            .iter()
            .filter(|(_, fields)| fields.owner_id == Some(owner))
            .map(|(&index, _)| index)
            .collect()
    }
}
