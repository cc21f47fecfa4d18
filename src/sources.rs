/// Default endpoints and repository coordinates of the TidyTuesday project.
///
/// Any of the base URLs can be replaced by an `http(s)` URL of a mirror.
pub const GITHUB_API_URL: &str = "https://api.github.com";
pub const GITHUB_RAW_URL: &str = "https://raw.githubusercontent.com";
pub const GITHUB_WEB_URL: &str = "https://github.com";

pub const DEFAULT_OWNER: &str = "rfordatascience";
pub const DEFAULT_REPO: &str = "tidytuesday";
pub const DEFAULT_BRANCH: &str = "main";
/// Older years of the repository are still published under the legacy branch.
pub const LEGACY_BRANCH: &str = "master";
