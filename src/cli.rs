//! Command-line surface: argument definitions and the dispatcher.

use std::io::Write;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use tracing::info;

use crate::client::{Client, ClientOptions};
use crate::date::{Clock, last_tuesday, parse_date};
use crate::download::{Selection, Selector};
use crate::error::{Error, Result};
use crate::model::{DatasetListing, DatasetSummary};
use crate::readme::UrlOpener;
use crate::sources::{GITHUB_API_URL, GITHUB_RAW_URL, GITHUB_WEB_URL};
use crate::week::{ResolvedWeek, WeekQuery, resolve};

#[derive(Debug, Parser)]
#[command(
    name = "tidytuesday",
    version,
    about = "Discover and download weekly TidyTuesday datasets from GitHub"
)]
pub struct Cli {
    /// GitHub token; raises the API quota from the unauthenticated default.
    #[arg(long, global = true, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    #[arg(long, global = true, env = "TIDYTUESDAY_API_URL", default_value = GITHUB_API_URL)]
    pub api_url: String,

    #[arg(long, global = true, env = "TIDYTUESDAY_RAW_URL", default_value = GITHUB_RAW_URL)]
    pub raw_url: String,

    #[arg(long, global = true, env = "TIDYTUESDAY_WEB_URL", default_value = GITHUB_WEB_URL)]
    pub web_url: String,

    /// Directory downloaded files are written to.
    #[arg(short, long, global = true, env = "TIDYTUESDAY_DEST", default_value = ".")]
    pub dest: PathBuf,

    /// More log output on stderr (-v info, -vv debug).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the most recent Tuesday on or before a date (default: today).
    #[command(alias = "last_tuesday")]
    LastTuesday { date: Option<String> },

    /// List every year and its release weeks.
    #[command(alias = "tt_available")]
    TtAvailable,

    /// List the release weeks of one year.
    #[command(alias = "tt_datasets")]
    TtDatasets { year: i32 },

    /// Show the files of a release week: <DATE> or <YEAR> <WEEK>.
    #[command(alias = "tt_load_gh")]
    TtLoadGh {
        date_or_year: String,
        week: Option<u32>,
    },

    /// Download one file of a release week by name or zero-based index.
    #[command(alias = "tt_download_file")]
    TtDownloadFile {
        #[command(flatten)]
        target: WeekArgs,
        file: String,
    },

    /// Download `All` or the named files of a release week.
    #[command(alias = "tt_download")]
    TtDownload {
        #[command(flatten)]
        target: WeekArgs,
        files: Vec<String>,
    },

    /// Resolve a week and download its files: <DATE> [FILES..] or <YEAR> <WEEK> [FILES..].
    #[command(alias = "tt_load")]
    TtLoad {
        date_or_year: String,
        rest: Vec<String>,
    },

    /// Open the documentation page of a release week in the browser.
    Readme {
        #[command(flatten)]
        target: WeekArgs,
    },

    /// Report the remaining GitHub API quota.
    #[command(alias = "rate-limit-check", alias = "rate_limit_check")]
    RateLimit,

    /// Download every file of the week containing a date.
    #[command(alias = "get_date")]
    GetDate { date: String },

    /// Download every file of week N of a year.
    #[command(alias = "get_week")]
    GetWeek { year: i32, week: u32 },
}

/// Week targeting for commands that act on one release.
///
/// Without any of these the most recent Tuesday is used.
#[derive(Debug, Clone, Default, Args)]
pub struct WeekArgs {
    /// Any date inside the release week (YYYY-MM-DD).
    #[arg(long)]
    pub date: Option<String>,

    #[arg(long)]
    pub year: Option<i32>,

    /// 1-based week number, counted in seven-day steps from Jan 1.
    #[arg(long)]
    pub week: Option<u32>,
}

impl WeekArgs {
    fn resolve(&self, clock: &dyn Clock) -> Result<ResolvedWeek> {
        let date = self.date.as_deref().map(parse_date).transpose()?;
        let query = match (date, self.year, self.week) {
            (None, None, None) => WeekQuery::date(clock.today()),
            (date, year, week) => WeekQuery { date, year, week },
        };
        resolve(query, clock)
    }
}

/// First positional of `tt-load-gh`/`tt-load`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOrYear {
    Date(NaiveDate),
    Year(i32),
}

pub fn parse_date_or_year(s: &str) -> Result<DateOrYear> {
    let trimmed = s.trim();
    if trimmed.contains('-') {
        return parse_date(trimmed).map(DateOrYear::Date);
    }
    trimmed
        .parse::<i32>()
        .map(DateOrYear::Year)
        .map_err(|_| Error::InvalidDateFormat(trimmed.to_string()))
}

impl Cli {
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            api_url: self.api_url.clone(),
            raw_url: self.raw_url.clone(),
            web_url: self.web_url.clone(),
            token: self.token.clone(),
            ..ClientOptions::default()
        }
    }
}

/// Execute one parsed command, writing results to `out`.
pub fn run(cli: &Cli, clock: &dyn Clock, opener: &dyn UrlOpener, out: &mut dyn Write) -> Result<()> {
    let client = || Client::new(cli.client_options());

    match &cli.command {
        Commands::LastTuesday { date } => {
            let reference = match date {
                Some(d) => parse_date(d)?,
                None => clock.today(),
            };
            writeln!(out, "{}", last_tuesday(reference))?;
        }

        Commands::TtAvailable => {
            let catalog = client()?.tt_available()?;
            writeln!(out, "Available TidyTuesday datasets:")?;
            for (year, weeks) in &catalog {
                writeln!(out, "\n{year}:")?;
                for summary in weeks {
                    writeln!(out, "  {}", summary_line(summary))?;
                }
            }
        }

        Commands::TtDatasets { year } => {
            let weeks = client()?.tt_datasets(*year)?;
            writeln!(out, "TidyTuesday datasets for {year}:")?;
            for summary in &weeks {
                writeln!(out, "{}", summary_line(summary))?;
            }
        }

        Commands::TtLoadGh { date_or_year, week } => {
            let week = resolve_positional(date_or_year, *week, clock)?;
            let listing = client()?.load_metadata(&week)?;
            print_listing(&listing, out)?;
        }

        Commands::TtDownloadFile { target, file } => {
            let week = target.resolve(clock)?;
            let client = client()?;
            let listing = client.load_metadata(&week)?;
            let path = client.download_file(&listing, &Selector::from(file.as_str()), &cli.dest)?;
            writeln!(out, "{}", path.display())?;
        }

        Commands::TtDownload { target, files } => {
            let selection = Selection::parse_args(files.as_slice())?;
            let week = target.resolve(clock)?;
            fetch_week(cli, &week, &selection, out)?;
        }

        Commands::TtLoad { date_or_year, rest } => {
            let (week, files) = match parse_date_or_year(date_or_year)? {
                DateOrYear::Date(date) => (resolve(WeekQuery::date(date), clock)?, &rest[..]),
                DateOrYear::Year(year) => {
                    let (week_arg, files) = rest.split_first().ok_or_else(|| {
                        Error::InvalidArguments(format!("a week number is required after year {year}"))
                    })?;
                    let week_num = parse_week_number(week_arg)?;
                    (resolve(WeekQuery::year_week(year, week_num), clock)?, files)
                }
            };
            let selection = Selection::parse_args(files)?;
            fetch_week(cli, &week, &selection, out)?;
        }

        Commands::Readme { target } => {
            let week = target.resolve(clock)?;
            let url = client()?.open_readme(&week, opener);
            writeln!(out, "Opened {url}")?;
        }

        Commands::RateLimit => {
            let status = client()?.rate_limit()?;
            writeln!(out, "Requests remaining: {}/{}", status.remaining, status.limit)?;
            writeln!(out, "Resets at: {}", status.reset_at.to_rfc3339())?;
        }

        Commands::GetDate { date } => {
            let week = resolve(WeekQuery::date(parse_date(date)?), clock)?;
            fetch_week(cli, &week, &Selection::All, out)?;
        }

        Commands::GetWeek { year, week } => {
            let week = resolve(WeekQuery::year_week(*year, *week), clock)?;
            fetch_week(cli, &week, &Selection::All, out)?;
        }
    }

    Ok(())
}

fn resolve_positional(date_or_year: &str, week: Option<u32>, clock: &dyn Clock) -> Result<ResolvedWeek> {
    let query = match (parse_date_or_year(date_or_year)?, week) {
        (DateOrYear::Date(_), Some(_)) => {
            return Err(Error::InvalidArguments(
                "a week number only applies to a year, not a date".into(),
            ));
        }
        (DateOrYear::Date(date), None) => WeekQuery::date(date),
        (DateOrYear::Year(year), week) => WeekQuery {
            year: Some(year),
            week,
            ..WeekQuery::default()
        },
    };
    resolve(query, clock)
}

fn parse_week_number(s: &str) -> Result<u32> {
    s.trim()
        .parse()
        .map_err(|_| Error::InvalidArguments(format!("week must be a positive integer, got {s:?}")))
}

fn fetch_week(cli: &Cli, week: &ResolvedWeek, selection: &Selection, out: &mut dyn Write) -> Result<()> {
    let client = Client::new(cli.client_options())?;
    let listing = client.load_metadata(week)?;
    info!(week = %week, dest = %cli.dest.display(), "downloading");
    for path in client.download(&listing, selection, &cli.dest)? {
        writeln!(out, "{}", path.display())?;
    }
    Ok(())
}

fn summary_line(summary: &DatasetSummary) -> String {
    format!("{} - {}", summary.date, summary.title)
}

fn print_listing(listing: &DatasetListing, out: &mut dyn Write) -> Result<()> {
    writeln!(out, "Week {} ({})", listing.week, listing.week.path())?;
    if listing.is_empty() {
        writeln!(out, "  (no files)")?;
    }
    for (i, file) in listing.iter().enumerate() {
        writeln!(out, "{i:>3}  {}  {}", file.name, human_size(file.size))?;
    }
    Ok(())
}

fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}
