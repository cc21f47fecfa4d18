use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::info;

use crate::client::Client;
use crate::error::{Error, Result};
use crate::model::{DatasetListing, FileEntry};

/// Keyword that selects every file of a listing.
pub const ALL: &str = "All";

/// One file of a listing, by exact name or zero-based position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Name(String),
    Index(usize),
}

const NAME_PREFIX: &str = "name:";

impl From<&str> for Selector {
    /// Digits are an index, anything else is a file name. A `name:` prefix
    /// forces a name, for files whose name is all digits.
    fn from(s: &str) -> Self {
        if let Some(name) = s.strip_prefix(NAME_PREFIX) {
            return Selector::Name(name.to_string());
        }
        match s.parse::<usize>() {
            Ok(i) if s.bytes().all(|b| b.is_ascii_digit()) => Selector::Index(i),
            _ => Selector::Name(s.to_string()),
        }
    }
}

impl FromStr for Selector {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Selector::from(s))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Name(name) => write!(f, "{name:?}"),
            Selector::Index(i) => write!(f, "index {i}"),
        }
    }
}

/// Which files of a listing to download. Names and indices never mix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    All,
    Names(Vec<String>),
    Indices(Vec<usize>),
}

impl Selection {
    /// Build a selection from individual selectors, rejecting mixed kinds.
    pub fn from_selectors(selectors: Vec<Selector>) -> Result<Self> {
        let Some(first) = selectors.first() else {
            return Err(Error::InvalidSelection("no files selected".into()));
        };
        match first {
            Selector::Name(_) => selectors
                .into_iter()
                .map(|s| match s {
                    Selector::Name(name) => Ok(name),
                    Selector::Index(i) => Err(mixed(i)),
                })
                .collect::<Result<Vec<_>>>()
                .map(Selection::Names),
            Selector::Index(_) => selectors
                .into_iter()
                .map(|s| match s {
                    Selector::Index(i) => Ok(i),
                    Selector::Name(name) => Err(mixed(name)),
                })
                .collect::<Result<Vec<_>>>()
                .map(Selection::Indices),
        }
    }

    /// Parse command-line tokens: nothing or a lone `All` selects everything.
    pub fn parse_args<S: AsRef<str>>(tokens: &[S]) -> Result<Self> {
        match tokens {
            [] => Ok(Selection::All),
            [only] if only.as_ref() == ALL => Ok(Selection::All),
            _ if tokens.iter().any(|t| t.as_ref() == ALL) => Err(Error::InvalidSelection(
                format!("{ALL} cannot be combined with other selectors"),
            )),
            _ => {
                let selectors = tokens.iter().map(|t| Selector::from(t.as_ref())).collect();
                Self::from_selectors(selectors)
            }
        }
    }

    fn selectors(&self, listing: &DatasetListing) -> Vec<Selector> {
        match self {
            Selection::All => (0..listing.len()).map(Selector::Index).collect(),
            Selection::Names(names) => names.iter().cloned().map(Selector::Name).collect(),
            Selection::Indices(ix) => ix.iter().copied().map(Selector::Index).collect(),
        }
    }
}

fn mixed(offender: impl fmt::Display) -> Error {
    Error::InvalidSelection(format!(
        "cannot mix file names and indices (offending selector: {offender})"
    ))
}

fn lookup<'a>(listing: &'a DatasetListing, selector: &Selector) -> Result<&'a FileEntry> {
    let found = match selector {
        Selector::Name(name) => listing.find(name),
        Selector::Index(i) => listing.get(*i),
    };
    found.ok_or_else(|| Error::FileNotFound(selector.to_string()))
}

impl Client {
    /// Download the selected files of `listing` into `dest_dir`, in selection
    /// order, returning the paths written.
    ///
    /// Stops at the first selector that does not match or the first failed
    /// transfer; files written before that stay on disk.
    pub fn download(
        &self,
        listing: &DatasetListing,
        selection: &Selection,
        dest_dir: &Path,
    ) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(dest_dir)?;

        let mut written = Vec::new();
        for selector in selection.selectors(listing) {
            let entry = lookup(listing, &selector)?;
            written.push(self.fetch_to_dir(entry, dest_dir)?);
        }
        Ok(written)
    }

    pub fn download_file(
        &self,
        listing: &DatasetListing,
        selector: &Selector,
        dest_dir: &Path,
    ) -> Result<PathBuf> {
        let entry = lookup(listing, selector)?;
        fs::create_dir_all(dest_dir)?;
        self.fetch_to_dir(entry, dest_dir)
    }

    fn fetch_to_dir(&self, entry: &FileEntry, dest_dir: &Path) -> Result<PathBuf> {
        let failed = |reason: String| Error::DownloadFailed {
            name: entry.name.clone(),
            reason,
        };

        if !is_plain_file_name(&entry.name) {
            return Err(failed("refusing to write outside the destination directory".into()));
        }
        let target = dest_dir.join(&entry.name);

        let mut resp = self
            .http()
            .get(&entry.download_url)
            .send()
            .map_err(|e| failed(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(failed(format!("HTTP {}", resp.status().as_u16())));
        }

        let mut out = BufWriter::new(File::create(&target)?);
        let bytes = resp.copy_to(&mut out).map_err(|e| failed(e.to_string()))?;
        out.flush()?;

        info!(name = %entry.name, path = %target.display(), bytes, "downloaded");
        Ok(target)
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && Path::new(name).file_name().is_some_and(|f| f == name)
}
