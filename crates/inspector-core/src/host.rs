use std::time::Duration;

use async_trait::async_trait;

/// Timer seam. The browser implementation wraps `gloo-timers`; tests record
/// the requested durations and return immediately.
#[async_trait(?Send)]
pub trait Sleeper {
    async fn sleep(&self, duration: Duration);
}

#[async_trait(?Send)]
impl<T: Sleeper + ?Sized> Sleeper for &T {
    async fn sleep(&self, duration: Duration) {
        (**self).sleep(duration).await;
    }
}

/// Reports whether the host document has finished loading.
pub trait DocumentReadiness {
    fn is_fully_loaded(&self) -> bool;
}

pub trait PageReloader {
    fn reload(&self);
}

impl<T: PageReloader + ?Sized> PageReloader for &T {
    fn reload(&self) {
        (**self).reload();
    }
}

/// Something on screen that renders a status value, usually a button label.
pub trait StatusSink<S> {
    fn show(&self, status: &S);
}

impl<S, T: StatusSink<S> + ?Sized> StatusSink<S> for &T {
    fn show(&self, status: &S) {
        (**self).show(status);
    }
}

/// The parts of the page URL the destructive actions are scoped by.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageLocation {
    pub hostname: String,
    pub pathname: String,
}

impl PageLocation {
    pub fn new(hostname: impl Into<String>, pathname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            pathname: pathname.into(),
        }
    }
}
