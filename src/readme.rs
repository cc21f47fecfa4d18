use std::io;

use tracing::{debug, warn};

use crate::client::Client;
use crate::week::ResolvedWeek;

/// Something that can show a URL to the user.
pub trait UrlOpener {
    fn open(&self, url: &str) -> io::Result<()>;
}

/// Opens URLs in the platform's default browser.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemBrowser;

impl UrlOpener for SystemBrowser {
    fn open(&self, url: &str) -> io::Result<()> {
        webbrowser::open(url)
    }
}

impl Client {
    /// Open the documentation page of `week` and return its URL.
    ///
    /// Launch failures are logged and otherwise ignored.
    pub fn open_readme(&self, week: &ResolvedWeek, opener: &dyn UrlOpener) -> String {
        let url = self.readme_url(week);
        debug!(%url, "opening readme");
        if let Err(e) = opener.open(&url) {
            warn!(%url, error = %e, "could not launch browser");
        }
        url
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::date::parse_date;

    #[derive(Default)]
    struct Recorder {
        opened: RefCell<Vec<String>>,
        fail: bool,
    }

    impl UrlOpener for Recorder {
        fn open(&self, url: &str) -> io::Result<()> {
            self.opened.borrow_mut().push(url.to_string());
            if self.fail {
                Err(io::Error::other("no display"))
            } else {
                Ok(())
            }
        }
    }

    fn week() -> ResolvedWeek {
        ResolvedWeek::containing(parse_date("2025-03-10").unwrap())
    }

    #[test]
    fn opens_week_page_once() {
        let client = Client::default_client().unwrap();
        let recorder = Recorder::default();
        let url = client.open_readme(&week(), &recorder);
        assert_eq!(
            url,
            "https://github.com/rfordatascience/tidytuesday/tree/main/data/2025/2025-03-04"
        );
        assert_eq!(*recorder.opened.borrow(), vec![url]);
    }

    #[test]
    fn launch_failure_is_not_an_error() {
        let client = Client::default_client().unwrap();
        let recorder = Recorder {
            fail: true,
            ..Recorder::default()
        };
        let url = client.open_readme(&week(), &recorder);
        assert_eq!(recorder.opened.borrow().len(), 1);
        assert!(url.ends_with("2025-03-04"));
    }
}
