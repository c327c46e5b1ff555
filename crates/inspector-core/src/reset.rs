use std::time::Duration;

use tracing::{info, warn};

use crate::config::{OverlayConfig, site_domain};
use crate::host::{PageLocation, PageReloader, Sleeper, StatusSink};
use crate::storage::StorageError;

const EXPIRED: &str = "expires=Thu, 01 Jan 1970 00:00:00 GMT";

/// Browser-side site data the reset wipes.
pub trait SiteDataHost {
    fn clear_local_storage(&self) -> Result<(), StorageError>;
    fn clear_session_storage(&self) -> Result<(), StorageError>;
    /// The serialized `document.cookie` value.
    fn cookie_header(&self) -> Result<String, StorageError>;
    fn write_cookie(&self, directive: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResetError {
    #[error("site data reset is not allowed on {hostname}")]
    Denied { hostname: String },
    #[error("failed to clear site data: {0}")]
    ClearFailed(#[from] StorageError),
}

/// Wipes storage and cookies on an allow-listed site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteDataReset {
    allowed_domains: Vec<String>,
    feedback_window: Duration,
}

impl SiteDataReset {
    pub fn new(allowed_domains: Vec<String>, feedback_window: Duration) -> Self {
        Self {
            allowed_domains,
            feedback_window,
        }
    }

    #[must_use]
    pub fn from_config(config: &OverlayConfig) -> Self {
        Self::new(config.reset_allowed_domains.clone(), config.clear_feedback())
    }

    /// Substring match of the hostname against the allow-list.
    #[must_use]
    pub fn is_allowed(&self, hostname: &str) -> bool {
        self.allowed_domains
            .iter()
            .map(|domain| domain.trim())
            .any(|domain| !domain.is_empty() && hostname.contains(domain))
    }

    pub fn execute<H: SiteDataHost + ?Sized>(
        &self,
        host: &H,
        location: &PageLocation,
    ) -> Result<(), ResetError> {
        if !self.is_allowed(&location.hostname) {
            return Err(ResetError::Denied {
                hostname: location.hostname.clone(),
            });
        }

        host.clear_local_storage()?;
        host.clear_session_storage()?;
        let header = host.cookie_header()?;
        for name in cookie_names(&header) {
            for directive in expiry_directives(name, location) {
                host.write_cookie(&directive)?;
            }
        }
        Ok(())
    }
}

/// Cookie names in a `name=value; other=value` header.
#[must_use]
pub fn cookie_names(header: &str) -> Vec<&str> {
    header
        .split(';')
        .map(|pair| pair.split_once('=').map_or(pair, |(name, _)| name).trim())
        .filter(|name| !name.is_empty())
        .collect()
}

/// Expiry writes for one cookie: the root path and the current path, each
/// with and without the parent-domain attribute.
#[must_use]
pub fn expiry_directives(name: &str, location: &PageLocation) -> Vec<String> {
    let domain = site_domain(&location.hostname);
    let mut paths = vec!["/"];
    if !location.pathname.is_empty() && location.pathname != "/" {
        paths.push(location.pathname.as_str());
    }

    let mut directives = Vec::with_capacity(paths.len() * 2);
    for path in paths {
        directives.push(format!("{name}=;{EXPIRED};path={path}"));
        if !domain.is_empty() {
            directives.push(format!("{name}=;{EXPIRED};path={path};domain=.{domain}"));
        }
    }
    directives
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearDataLabel {
    Idle,
    Cleared,
    Failed,
    WrongDomain,
}

impl ClearDataLabel {
    #[must_use]
    pub fn for_outcome(outcome: &Result<(), ResetError>) -> Self {
        match outcome {
            Ok(()) => Self::Cleared,
            Err(ResetError::Denied { .. }) => Self::WrongDomain,
            Err(ResetError::ClearFailed(_)) => Self::Failed,
        }
    }

    #[must_use]
    pub fn text(self) -> &'static str {
        match self {
            Self::Idle => "🧹 Clear site data",
            Self::Cleared => "✅ Deleted!",
            Self::Failed => "❌ Error!",
            Self::WrongDomain => "❌ Wrong domain!",
        }
    }

    #[must_use]
    pub fn background(self) -> &'static str {
        match self {
            Self::Idle => "#333",
            Self::Cleared => "limegreen",
            Self::Failed | Self::WrongDomain => "crimson",
        }
    }
}

/// Runs the reset behind the clear-data button. The outcome is shown for
/// the feedback window and the page is reloaded whatever it was.
pub async fn run_clear_data<H, K, Z, R>(
    reset: &SiteDataReset,
    host: &H,
    location: &PageLocation,
    sink: &K,
    sleeper: &Z,
    reloader: &R,
) -> Result<(), ResetError>
where
    H: SiteDataHost + ?Sized,
    K: StatusSink<ClearDataLabel> + ?Sized,
    Z: Sleeper + ?Sized,
    R: PageReloader + ?Sized,
{
    let outcome = reset.execute(host, location);
    match &outcome {
        Ok(()) => info!(hostname = %location.hostname, "site data cleared"),
        Err(error) => warn!(%error, "site data reset did not complete"),
    }
    sink.show(&ClearDataLabel::for_outcome(&outcome));
    sleeper.sleep(reset.feedback_window).await;
    reloader.reload();
    outcome
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use async_trait::async_trait;

    use super::*;

    #[derive(Default)]
    struct FakeSite {
        cookies: String,
        fail_session: bool,
        cleared: RefCell<Vec<&'static str>>,
        writes: RefCell<Vec<String>>,
    }

    impl SiteDataHost for FakeSite {
        fn clear_local_storage(&self) -> Result<(), StorageError> {
            self.cleared.borrow_mut().push("local");
            Ok(())
        }

        fn clear_session_storage(&self) -> Result<(), StorageError> {
            if self.fail_session {
                return Err(StorageError::Clear);
            }
            self.cleared.borrow_mut().push("session");
            Ok(())
        }

        fn cookie_header(&self) -> Result<String, StorageError> {
            Ok(self.cookies.clone())
        }

        fn write_cookie(&self, directive: &str) -> Result<(), StorageError> {
            self.writes.borrow_mut().push(directive.to_string());
            Ok(())
        }
    }

    #[derive(Default)]
    struct Button(RefCell<Vec<ClearDataLabel>>);

    impl StatusSink<ClearDataLabel> for Button {
        fn show(&self, status: &ClearDataLabel) {
            self.0.borrow_mut().push(*status);
        }
    }

    #[derive(Default)]
    struct Clock(RefCell<Vec<Duration>>);

    #[async_trait(?Send)]
    impl Sleeper for Clock {
        async fn sleep(&self, duration: Duration) {
            self.0.borrow_mut().push(duration);
        }
    }

    #[derive(Default)]
    struct Reloads(Cell<u32>);

    impl PageReloader for Reloads {
        fn reload(&self) {
            self.0.set(self.0.get() + 1);
        }
    }

    fn reset() -> SiteDataReset {
        SiteDataReset::from_config(&OverlayConfig::default())
    }

    #[test]
    fn parses_cookie_names() {
        assert_eq!(
            cookie_names("a=1; b=2;c ; =orphan; ;d=x=y"),
            ["a", "b", "c", "d"]
        );
        assert!(cookie_names("").is_empty());
    }

    #[test]
    fn expires_each_cookie_on_root_and_current_path() {
        let location = PageLocation::new("www.get-honey.ai", "/chat");
        assert_eq!(
            expiry_directives("sid", &location),
            [
                "sid=;expires=Thu, 01 Jan 1970 00:00:00 GMT;path=/",
                "sid=;expires=Thu, 01 Jan 1970 00:00:00 GMT;path=/;domain=.get-honey.ai",
                "sid=;expires=Thu, 01 Jan 1970 00:00:00 GMT;path=/chat",
                "sid=;expires=Thu, 01 Jan 1970 00:00:00 GMT;path=/chat;domain=.get-honey.ai",
            ]
        );
        assert_eq!(
            expiry_directives("sid", &PageLocation::new("get-honey.ai", "/")).len(),
            2
        );
    }

    #[test]
    fn allowed_site_is_wiped() {
        let site = FakeSite {
            cookies: "sid=1; theme=dark".to_string(),
            ..FakeSite::default()
        };
        let location = PageLocation::new("get-honey.online", "/");

        assert_eq!(reset().execute(&site, &location), Ok(()));
        assert_eq!(*site.cleared.borrow(), ["local", "session"]);
        assert_eq!(site.writes.borrow().len(), 4);
        assert!(site.writes.borrow()[2].starts_with("theme=;"));
    }

    #[test]
    fn foreign_domain_is_denied_but_still_reloads() {
        let site = FakeSite {
            cookies: "sid=1".to_string(),
            ..FakeSite::default()
        };
        let button = Button::default();
        let clock = Clock::default();
        let reloads = Reloads::default();
        let location = PageLocation::new("evil.example.com", "/");

        let outcome = pollster::block_on(run_clear_data(
            &reset(),
            &site,
            &location,
            &button,
            &clock,
            &reloads,
        ));

        assert_eq!(
            outcome,
            Err(ResetError::Denied {
                hostname: "evil.example.com".to_string()
            })
        );
        assert!(site.cleared.borrow().is_empty());
        assert!(site.writes.borrow().is_empty());
        assert_eq!(*button.0.borrow(), [ClearDataLabel::WrongDomain]);
        assert_eq!(*clock.0.borrow(), [Duration::from_millis(1_200)]);
        assert_eq!(reloads.0.get(), 1);
    }

    #[test]
    fn partial_failure_reports_and_reloads() {
        let site = FakeSite {
            fail_session: true,
            ..FakeSite::default()
        };
        let button = Button::default();
        let reloads = Reloads::default();

        let outcome = pollster::block_on(run_clear_data(
            &reset(),
            &site,
            &PageLocation::new("get-honey.ai", "/"),
            &button,
            &Clock::default(),
            &reloads,
        ));

        assert_eq!(outcome, Err(ResetError::ClearFailed(StorageError::Clear)));
        assert_eq!(*button.0.borrow(), [ClearDataLabel::Failed]);
        assert_eq!(ClearDataLabel::Failed.text(), "❌ Error!");
        assert_eq!(reloads.0.get(), 1);
    }
}
