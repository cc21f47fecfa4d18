#![forbid(unsafe_code)]

//! Client for the weekly dataset releases of the TidyTuesday project.
//!
//! Releases live in the `rfordatascience/tidytuesday` GitHub repository under
//! `data/<year>/<YYYY-MM-DD>`, one directory per Tuesday. This crate resolves a
//! week (from a date, or from a year and week number) to that directory, lists
//! the published files through the GitHub contents API, and downloads them.
//!
//! **Quick start**
//! ```no_run
//! use std::path::Path;
//!
//! use tidytuesday::{Client, Selection, SystemClock, WeekQuery, parse_date, resolve};
//!
//! let client = Client::default_client()?;
//! let week = resolve(WeekQuery::date(parse_date("2025-03-10")?), &SystemClock)?;
//! assert_eq!(week.path(), "data/2025/2025-03-04");
//!
//! let listing = client.load_metadata(&week)?;
//! for path in client.download(&listing, &Selection::All, Path::new("."))? {
//!     println!("{}", path.display());
//! }
//! # Ok::<(), tidytuesday::Error>(())
//! ```
//!
//! Notes:
//! - Every call hits the network; nothing is cached.
//! - Without a token GitHub allows 60 API requests per hour; check with
//!   [`Client::rate_limit`].

pub mod cli;
mod client;
mod date;
mod download;
mod error;
mod model;
mod readme;
mod sources;
mod url_builder;
mod week;

pub use crate::client::{Client, ClientOptions};
pub use crate::date::{Clock, FixedClock, SystemClock, last_tuesday, parse_date, week_start};
pub use crate::download::{ALL, Selection, Selector};
pub use crate::error::{Error, Result};
pub use crate::model::{DatasetListing, DatasetSummary, FileEntry, RateLimitStatus};
pub use crate::readme::{SystemBrowser, UrlOpener};
pub use crate::week::{ResolvedWeek, WeekQuery, resolve};
