/// Repository location used to build every URL the client touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoCoordinates<'a> {
    pub owner: &'a str,
    pub repo: &'a str,
    pub branch: &'a str,
}

pub fn contents_url(api_url: &str, repo: &RepoCoordinates<'_>, path: &str) -> String {
    format!(
        "{}/repos/{}/{}/contents/{}",
        trim_base(api_url),
        repo.owner,
        repo.repo,
        trim_path(path)
    )
}

pub fn rate_limit_url(api_url: &str) -> String {
    format!("{}/rate_limit", trim_base(api_url))
}

/// Human-facing page for a release directory; GitHub renders its README.
pub fn readme_page_url(web_url: &str, repo: &RepoCoordinates<'_>, path: &str) -> String {
    format!(
        "{}/{}/{}/tree/{}/{}",
        trim_base(web_url),
        repo.owner,
        repo.repo,
        repo.branch,
        trim_path(path)
    )
}

/// Raw markdown of the per-year index (`data/<year>/readme.md`).
pub fn year_readme_raw_url(raw_url: &str, repo: &RepoCoordinates<'_>, year: i32) -> String {
    format!(
        "{}/{}/{}/{}/data/{year}/readme.md",
        trim_base(raw_url),
        repo.owner,
        repo.repo,
        repo.branch
    )
}

fn trim_base(base: &str) -> &str {
    base.trim_end_matches('/')
}

fn trim_path(path: &str) -> &str {
    path.trim_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPO: RepoCoordinates<'static> = RepoCoordinates {
        owner: "rfordatascience",
        repo: "tidytuesday",
        branch: "main",
    };

    #[test]
    fn contents_url_for_week_path() {
        assert_eq!(
            contents_url("https://api.github.com", &REPO, "data/2025/2025-03-04"),
            "https://api.github.com/repos/rfordatascience/tidytuesday/contents/data/2025/2025-03-04"
        );
    }

    #[test]
    fn trailing_and_leading_slashes_are_normalized() {
        assert_eq!(
            contents_url("http://127.0.0.1:9000/", &REPO, "/data/"),
            "http://127.0.0.1:9000/repos/rfordatascience/tidytuesday/contents/data"
        );
        assert_eq!(rate_limit_url("https://api.github.com/"), "https://api.github.com/rate_limit");
    }

    #[test]
    fn readme_page_points_at_branch_tree() {
        assert_eq!(
            readme_page_url("https://github.com", &REPO, "data/2025/2025-03-04"),
            "https://github.com/rfordatascience/tidytuesday/tree/main/data/2025/2025-03-04"
        );
    }

    #[test]
    fn year_readme_uses_raw_host() {
        assert_eq!(
            year_readme_raw_url("https://raw.githubusercontent.com", &REPO, 2024),
            "https://raw.githubusercontent.com/rfordatascience/tidytuesday/main/data/2024/readme.md"
        );
    }
}
