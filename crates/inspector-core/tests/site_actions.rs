use std::cell::{Cell, RefCell};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use inspector_core::{
    ActivationControl, ActivationError, ActivationState, ClearDataLabel, HttpTransport, JsonReply,
    JsonRequest, OverlayConfig, PageLocation, PageReloader, RemoteActivationClient, SiteDataHost,
    SiteDataReset, Sleeper, StatusSink, StorageError, TransportError, run_clear_data,
};

const OPERATOR_CONFIG: &str = r#"{
    "clearFeedbackMs": 800,
    "resetAllowedDomains": ["staging.example.com"],
    "activation": {
        "apiBaseOverride": "https://admin.example.com/",
        "credentials": {"email": "ops@example.com", "password": "secret"},
        "products": {"staging.example.com": "prod-staging"}
    }
}"#;

struct Log<T>(RefCell<Vec<T>>);

impl<T> Default for Log<T> {
    fn default() -> Self {
        Self(RefCell::new(Vec::new()))
    }
}

impl<T: Clone> StatusSink<T> for Log<T> {
    fn show(&self, status: &T) {
        self.0.borrow_mut().push(status.clone());
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
struct AdminApi {
    seen: RefCell<Vec<JsonRequest>>,
}

#[async_trait(?Send)]
impl HttpTransport for AdminApi {
    async fn post_json(&self, request: JsonRequest) -> Result<JsonReply, TransportError> {
        let reply = if request.url.ends_with("/Authenticate/login") {
            JsonReply {
                status: 200,
                body: r#"{"accessToken":"abc"}"#.to_string(),
            }
        } else {
            JsonReply {
                status: 403,
                body: String::new(),
            }
        };
        self.seen.borrow_mut().push(request);
        Ok(reply)
    }
}

#[derive(Default)]
struct Browser {
    cookies: String,
    cleared: Cell<u32>,
    writes: RefCell<Vec<String>>,
    reloads: Cell<u32>,
}

impl SiteDataHost for Browser {
    fn clear_local_storage(&self) -> Result<(), StorageError> {
        self.cleared.set(self.cleared.get() + 1);
        Ok(())
    }

    fn clear_session_storage(&self) -> Result<(), StorageError> {
        self.cleared.set(self.cleared.get() + 1);
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

impl PageReloader for Browser {
    fn reload(&self) {
        self.reloads.set(self.reloads.get() + 1);
    }
}

#[test]
fn operator_config_drives_activation_endpoints_and_failure_window() -> Result<()> {
    let config = OverlayConfig::from_json(OPERATOR_CONFIG)?;
    let api = AdminApi::default();
    let button = Log::<ActivationState>::default();
    let clock = Clock::default();
    let control = ActivationControl::new(
        RemoteActivationClient::new(&api, config.activation.clone()),
        &button,
        &clock,
        config.activation_failure(),
    );

    assert!(pollster::block_on(control.trigger("staging.example.com", "u9")));

    let seen = api.seen.borrow();
    assert_eq!(seen[0].url, "https://admin.example.com/Authenticate/login");
    assert_eq!(
        seen[1].url,
        "https://admin.example.com/Payments/admin-set-free-subscription"
    );
    assert_eq!(
        *button.0.borrow(),
        [
            ActivationState::Pending,
            ActivationState::Failed(ActivationError::ActivationFailed { status: 403 }),
            ActivationState::Idle,
        ]
    );
    assert_eq!(*clock.0.borrow(), [Duration::from_millis(5_000)]);
    Ok(())
}

#[test]
fn operator_allow_list_scopes_the_reset() -> Result<()> {
    let config = OverlayConfig::from_json(OPERATOR_CONFIG)?;
    let reset = SiteDataReset::from_config(&config);
    let browser = Browser {
        cookies: "a=1; b=2".to_string(),
        ..Browser::default()
    };
    let button = Log::<ClearDataLabel>::default();
    let clock = Clock::default();

    pollster::block_on(run_clear_data(
        &reset,
        &browser,
        &PageLocation::new("staging.example.com", "/app"),
        &button,
        &clock,
        &browser,
    ))?;
    assert_eq!(browser.cleared.get(), 2);
    assert_eq!(browser.writes.borrow().len(), 8);

    let denied = pollster::block_on(run_clear_data(
        &reset,
        &browser,
        &PageLocation::new("get-honey.ai", "/"),
        &button,
        &clock,
        &browser,
    ));
    assert!(denied.is_err());
    assert_eq!(browser.cleared.get(), 2);

    assert_eq!(
        *button.0.borrow(),
        [ClearDataLabel::Cleared, ClearDataLabel::WrongDomain]
    );
    assert_eq!(*clock.0.borrow(), [Duration::from_millis(800); 2]);
    assert_eq!(browser.reloads.get(), 2);
    Ok(())
}
