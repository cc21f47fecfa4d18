use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::Deserialize;

use crate::week::ResolvedWeek;

/// One published file of a release week.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub name: String,
    pub download_url: String,
    pub size: u64,
}

/// Files of one release week, in the order the API returned them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetListing {
    pub week: ResolvedWeek,
    pub files: Vec<FileEntry>,
}

impl DatasetListing {
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&FileEntry> {
        self.files.get(index)
    }

    pub fn find(&self, name: &str) -> Option<&FileEntry> {
        self.files.iter().find(|f| f.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FileEntry> {
        self.files.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitStatus {
    pub limit: u64,
    pub remaining: u64,
    pub reset_at: DateTime<Utc>,
}

/// A release week as listed in a year's catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetSummary {
    pub date: NaiveDate,
    pub title: String,
    pub path: String,
}

/// Element of the `GET /repos/{owner}/{repo}/contents/{path}` array.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ContentItem {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub size: u64,
}

impl ContentItem {
    pub fn is_dir(&self) -> bool {
        self.kind == "dir"
    }

    fn is_readme(&self) -> bool {
        self.name.to_ascii_lowercase().starts_with("readme")
    }

    /// Release files only. READMEs document the week and are reached through
    /// the readme page, so they never take a download index.
    pub fn into_file_entry(self) -> Option<FileEntry> {
        if self.kind != "file" || self.is_readme() {
            return None;
        }
        let download_url = self.download_url?;
        Some(FileEntry {
            name: self.name,
            download_url,
            size: self.size,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RateLimitResponse {
    pub resources: RateLimitResources,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RateLimitResources {
    pub core: RateLimitCore,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RateLimitCore {
    pub limit: u64,
    pub remaining: u64,
    pub reset: i64,
}

impl RateLimitResponse {
    pub fn into_status(self) -> Option<RateLimitStatus> {
        let core = self.resources.core;
        let reset_at = Utc.timestamp_opt(core.reset, 0).single()?;
        Some(RateLimitStatus {
            limit: core.limit,
            remaining: core.remaining,
            reset_at,
        })
    }
}
