use std::cmp::Ordering;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::OffsetDateTime;

use crate::asset::IconAssetRef;

/// One folder that currently has (or last had) a custom icon.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IconApplicationRecord {
    #[serde(default)]
    pub id: u64,
    pub folder_path: String,
    #[serde(default)]
    pub source_icon_name: String,
    #[serde(default)]
    pub is_built_in: bool,
    pub icon_path: IconAssetRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_icon_path: Option<String>,
    #[serde(default)]
    pub applied_at: String,
    /// Copies left behind by records this one replaced.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub superseded_icon_paths: Vec<IconAssetRef>,
}

impl IconApplicationRecord {
    #[must_use]
    pub fn applied_at_time(&self) -> Option<OffsetDateTime> {
        OffsetDateTime::parse(&self.applied_at, &Rfc3339).ok()
    }
}

/// Input to a record write; paths are given in their real, local form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewApplication {
    pub folder_path: String,
    pub source_icon_name: String,
    pub is_built_in: bool,
    pub icon_path: String,
    pub original_icon_path: Option<String>,
    pub applied_at: String,
}

/// Persisted shape of `icon-manager-db.json`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreDocument {
    #[serde(default)]
    pub icon_applications: IndexMap<String, IconApplicationRecord>,
    #[serde(default)]
    pub last_id: u64,
}

impl StoreDocument {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Raises `last_id` to the highest stored id so ids are never handed
    /// out twice. Returns `true` when it had to move.
    pub fn reconcile_last_id(&mut self) -> bool {
        let highest = self
            .icon_applications
            .values()
            .map(|record| record.id)
            .max()
            .unwrap_or(0);
        if highest > self.last_id {
            self.last_id = highest;
            true
        } else {
            false
        }
    }

    pub fn next_id(&mut self) -> u64 {
        self.last_id += 1;
        self.last_id
    }

    /// Inserts `record` under its folder path, returning the record it
    /// replaced. A replaced entry moves to the end of the map.
    pub fn upsert(&mut self, record: IconApplicationRecord) -> Option<IconApplicationRecord> {
        let previous = self.icon_applications.shift_remove(&record.folder_path);
        self.icon_applications.insert(record.folder_path.clone(), record);
        previous
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&IconApplicationRecord> {
        self.icon_applications.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<IconApplicationRecord> {
        self.icon_applications.shift_remove(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.icon_applications.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.icon_applications.is_empty()
    }
}

/// Most recent first. Stable, so equal timestamps keep their input order;
/// unparseable timestamps go last.
pub fn sort_newest_first(records: &mut [IconApplicationRecord]) {
    records.sort_by(|a, b| match (a.applied_at_time(), b.applied_at_time()) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

/// ISO-8601 UTC timestamp with millisecond precision, e.g.
/// `2024-05-01T12:30:45.123Z`.
pub fn iso_timestamp(at: OffsetDateTime) -> Result<String, time::error::Format> {
    let format = format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
    );
    at.to_offset(time::UtcOffset::UTC).format(&format)
}

pub fn now_timestamp() -> Result<String, time::error::Format> {
    iso_timestamp(OffsetDateTime::now_utc())
}
