use std::collections::BTreeMap;

use chrono::{NaiveDate, TimeZone, Utc};
use reqwest::StatusCode;
use reqwest::blocking::{Client as HttpClient, Response};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use tracing::{debug, info};
use url::Url;

use crate::date::parse_date;
use crate::error::{Error, Result};
use crate::model::{ContentItem, DatasetListing, DatasetSummary, FileEntry, RateLimitResponse, RateLimitStatus};
use crate::sources::{
    DEFAULT_BRANCH, DEFAULT_OWNER, DEFAULT_REPO, GITHUB_API_URL, GITHUB_RAW_URL, GITHUB_WEB_URL,
    LEGACY_BRANCH,
};
use crate::url_builder::{
    RepoCoordinates, contents_url, rate_limit_url, readme_page_url, year_readme_raw_url,
};
use crate::week::ResolvedWeek;

const GITHUB_JSON: &str = "application/vnd.github+json";
const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";
const RATE_LIMIT_RESET: &str = "x-ratelimit-reset";

#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub api_url: String,
    pub raw_url: String,
    pub web_url: String,
    pub owner: String,
    pub repo: String,
    pub branch: String,
    /// Personal access token; unauthenticated quota applies without one.
    pub token: Option<String>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            api_url: GITHUB_API_URL.to_string(),
            raw_url: GITHUB_RAW_URL.to_string(),
            web_url: GITHUB_WEB_URL.to_string(),
            owner: DEFAULT_OWNER.to_string(),
            repo: DEFAULT_REPO.to_string(),
            branch: DEFAULT_BRANCH.to_string(),
            token: None,
        }
    }
}

/// Blocking client for the dataset repository. Every call goes to the
/// network; nothing is cached between calls.
#[derive(Debug, Clone)]
pub struct Client {
    opts: ClientOptions,
    http: HttpClient,
}

impl Client {
    pub fn new(opts: ClientOptions) -> Result<Self> {
        for (label, base) in [
            ("api url", &opts.api_url),
            ("raw url", &opts.raw_url),
            ("web url", &opts.web_url),
        ] {
            if !matches!(Url::parse(base)?.scheme(), "http" | "https") {
                return Err(Error::InvalidArguments(format!(
                    "{label} must be an http(s) URL, got {base}"
                )));
            }
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("tidytuesday-rs/", env!("CARGO_PKG_VERSION"))),
        );
        if let Some(token) = opts.token.as_deref().filter(|t| !t.is_empty()) {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| Error::InvalidArguments("token contains invalid characters".into()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = HttpClient::builder().default_headers(headers).build()?;

        Ok(Self { opts, http })
    }

    /// Client against the public GitHub endpoints.
    pub fn default_client() -> Result<Self> {
        Self::new(ClientOptions::default())
    }

    pub fn options(&self) -> &ClientOptions {
        &self.opts
    }

    pub(crate) fn http(&self) -> &HttpClient {
        &self.http
    }

    fn repo(&self) -> RepoCoordinates<'_> {
        RepoCoordinates {
            owner: &self.opts.owner,
            repo: &self.opts.repo,
            branch: &self.opts.branch,
        }
    }

    /// Files published under `path`, in API order. Directories are skipped.
    pub fn list_path(&self, path: &str) -> Result<Vec<FileEntry>> {
        let items = self.get_contents(path)?;
        Ok(items
            .into_iter()
            .filter_map(ContentItem::into_file_entry)
            .collect())
    }

    pub fn load_metadata(&self, week: &ResolvedWeek) -> Result<DatasetListing> {
        let files = self.list_path(week.path())?;
        info!(week = %week, files = files.len(), "loaded release listing");
        Ok(DatasetListing {
            week: week.clone(),
            files,
        })
    }

    pub fn rate_limit(&self) -> Result<RateLimitStatus> {
        let url = rate_limit_url(&self.opts.api_url);
        debug!(%url, "GET");
        let resp = self.http.get(&url).header(ACCEPT, GITHUB_JSON).send()?;
        if !resp.status().is_success() {
            return Err(api_error(resp, None));
        }
        let body: RateLimitResponse = resp.json()?;
        body.into_status().ok_or_else(|| Error::UpstreamError {
            status: Some(StatusCode::OK.as_u16()),
            body: "rate limit reset timestamp out of range".into(),
        })
    }

    /// Browser-facing page documenting a release week.
    pub fn readme_url(&self, week: &ResolvedWeek) -> String {
        readme_page_url(&self.opts.web_url, &self.repo(), week.path())
    }

    /// Release weeks of `year`, sorted by date.
    ///
    /// Weeks come from the directory listing; titles come from the year's
    /// `readme.md` table when it can be fetched, `Unknown` otherwise.
    pub fn tt_datasets(&self, year: i32) -> Result<Vec<DatasetSummary>> {
        let items = self.get_contents(&format!("data/{year}"))?;
        let mut weeks: Vec<NaiveDate> = items
            .iter()
            .filter(|item| item.is_dir())
            .filter_map(|item| parse_date(&item.name).ok())
            .collect();
        weeks.sort();

        let titles = self.year_titles(year);
        Ok(weeks
            .into_iter()
            .map(|date| DatasetSummary {
                date,
                title: titles
                    .get(&date)
                    .cloned()
                    .unwrap_or_else(|| "Unknown".to_string()),
                path: format!("data/{year}/{date}"),
            })
            .collect())
    }

    /// Every year directory under `data/` with its release weeks, ascending.
    pub fn tt_available(&self) -> Result<Vec<(i32, Vec<DatasetSummary>)>> {
        let items = self.get_contents("data")?;
        let mut years: Vec<i32> = items
            .iter()
            .filter(|item| item.is_dir() && item.name.len() == 4)
            .filter_map(|item| item.name.parse().ok())
            .collect();
        years.sort_unstable();

        let mut out = Vec::with_capacity(years.len());
        for year in years {
            out.push((year, self.tt_datasets(year)?));
        }
        Ok(out)
    }

    fn get_contents(&self, path: &str) -> Result<Vec<ContentItem>> {
        let url = contents_url(&self.opts.api_url, &self.repo(), path);
        debug!(%url, "GET");
        let resp = self.http.get(&url).header(ACCEPT, GITHUB_JSON).send()?;
        if !resp.status().is_success() {
            return Err(api_error(resp, Some(path)));
        }
        Ok(resp.json()?)
    }

    fn year_titles(&self, year: i32) -> BTreeMap<NaiveDate, String> {
        let primary = self.repo();
        if let Some(md) = self.fetch_year_readme(&primary, year) {
            return parse_year_readme(&md);
        }
        if primary.branch == LEGACY_BRANCH {
            return BTreeMap::new();
        }
        let legacy = RepoCoordinates {
            branch: LEGACY_BRANCH,
            ..primary
        };
        self.fetch_year_readme(&legacy, year)
            .map(|md| parse_year_readme(&md))
            .unwrap_or_default()
    }

    fn fetch_year_readme(&self, repo: &RepoCoordinates<'_>, year: i32) -> Option<String> {
        let url = year_readme_raw_url(&self.opts.raw_url, repo, year);
        debug!(%url, "GET");
        let resp = match self.http.get(&url).send() {
            Ok(resp) if resp.status().is_success() => resp,
            Ok(resp) => {
                debug!(status = resp.status().as_u16(), "year readme unavailable");
                return None;
            }
            Err(e) => {
                debug!(error = %e, "year readme unavailable");
                return None;
            }
        };
        resp.text()
            .inspect_err(|e| debug!(error = %e, "year readme unreadable"))
            .ok()
    }
}

/// Map a failed API response onto the error kinds callers act on.
///
/// `not_found_path` is the repository path that a 404 refers to; without it a
/// 404 is reported as a plain upstream error.
fn api_error(resp: Response, not_found_path: Option<&str>) -> Error {
    let status = resp.status();

    if status == StatusCode::NOT_FOUND {
        if let Some(path) = not_found_path {
            return Error::DatasetNotFound {
                path: path.to_string(),
            };
        }
    }

    if matches!(status, StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS) {
        if let Some(reset_at) = exhausted_quota_reset(resp.headers()) {
            return Error::RateLimited { reset_at };
        }
    }

    Error::UpstreamError {
        status: Some(status.as_u16()),
        body: resp.text().unwrap_or_default(),
    }
}

fn exhausted_quota_reset(headers: &HeaderMap) -> Option<chrono::DateTime<Utc>> {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
    if header(RATE_LIMIT_REMAINING)?.trim() != "0" {
        return None;
    }
    let reset: i64 = header(RATE_LIMIT_RESET)?.trim().parse().ok()?;
    Utc.timestamp_opt(reset, 0).single()
}

/// Extract `date -> title` from the markdown table of a year's readme.
///
/// Rows look like `| 3 | [2025-01-14](2025/2025-01-14/readme.md) | Title | ... |`.
pub(crate) fn parse_year_readme(markdown: &str) -> BTreeMap<NaiveDate, String> {
    let mut out = BTreeMap::new();
    for line in markdown.lines() {
        let line = line.trim();
        if !line.starts_with('|') {
            continue;
        }
        let cells: Vec<&str> = line.trim_matches('|').split('|').map(str::trim).collect();
        if cells.len() < 3 {
            continue;
        }
        let Some(date) = find_iso_date(cells[1]) else {
            continue;
        };
        let title = strip_markdown_links(cells[2]);
        if !title.is_empty() {
            out.entry(date).or_insert(title);
        }
    }
    out
}

fn find_iso_date(cell: &str) -> Option<NaiveDate> {
    cell.split(|c: char| !(c.is_ascii_digit() || c == '-'))
        .find_map(|token| parse_date(token).ok())
}

fn strip_markdown_links(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(open) = rest.find('[') {
        let Some(mid) = rest[open..].find("](").map(|i| open + i) else {
            break;
        };
        let Some(close) = rest[mid..].find(')').map(|i| mid + i) else {
            break;
        };
        out.push_str(&rest[..open]);
        out.push_str(&rest[open + 1..mid]);
        rest = &rest[close + 1..];
    }
    out.push_str(rest);
    out.replace('`', "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_http_base_urls() {
        let opts = ClientOptions {
            api_url: "ftp://example.org".into(),
            ..ClientOptions::default()
        };
        assert!(matches!(Client::new(opts), Err(Error::InvalidArguments(_))));

        let opts = ClientOptions {
            web_url: "not a url".into(),
            ..ClientOptions::default()
        };
        assert!(matches!(Client::new(opts), Err(Error::Url(_))));
    }

    #[test]
    fn readme_url_targets_week_directory() {
        let client = Client::default_client().unwrap();
        let week = ResolvedWeek::containing(parse_date("2025-03-10").unwrap());
        assert_eq!(
            client.readme_url(&week),
            "https://github.com/rfordatascience/tidytuesday/tree/main/data/2025/2025-03-04"
        );
    }

    #[test]
    fn exhausted_quota_requires_zero_remaining() {
        let mut headers = HeaderMap::new();
        headers.insert(RATE_LIMIT_REMAINING, HeaderValue::from_static("0"));
        headers.insert(RATE_LIMIT_RESET, HeaderValue::from_static("1700000000"));
        assert_eq!(
            exhausted_quota_reset(&headers).map(|t| t.timestamp()),
            Some(1_700_000_000)
        );

        headers.insert(RATE_LIMIT_REMAINING, HeaderValue::from_static("12"));
        assert_eq!(exhausted_quota_reset(&headers), None);
    }

    #[test]
    fn parses_titles_from_year_readme_table() {
        let md = "\
# TidyTuesday 2025

| Week | Date | Data | Source | Article |
| :---: | :---: | :--- | :--- | :--- |
| 1 | `2025-01-07` | Bring your own data from 2024! | NA | NA |
| 2 | [2025-01-14](2025/2025-01-14/readme.md) | [posit::conf talks](2025/2025-01-14/readme.md) | [posit](https://posit.co) | NA |
| 3 | 2025-01-21 | | NA | NA |
";
        let titles = parse_year_readme(md);
        assert_eq!(titles.len(), 2);
        assert_eq!(
            titles[&parse_date("2025-01-07").unwrap()],
            "Bring your own data from 2024!"
        );
        assert_eq!(
            titles[&parse_date("2025-01-14").unwrap()],
            "posit::conf talks"
        );
    }

    #[test]
    fn strips_links_and_keeps_surrounding_text() {
        assert_eq!(
            strip_markdown_links("Data from [here](x) and [there](y)."),
            "Data from here and there."
        );
        assert_eq!(strip_markdown_links("[unterminated"), "[unterminated");
    }
}
