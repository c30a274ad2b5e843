//! Progress notification for long-running lookups.
//!
//! Notifications are informational only. Nothing in the resolver depends on
//! whether they were shown.

use serde::{Deserialize, Serialize};
use std::io::Write;
use std::sync::Mutex;
use tracing::info;

pub trait Notifier: Send + Sync {
    fn open(&self, title: &str, message: &str);
    fn update(&self, percent: u8, message: &str);
    fn close(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotificationMethod {
    /// A single progress line on stderr
    Progress,
    #[default]
    Log,
    Off,
}

pub fn notifier_for(method: NotificationMethod) -> Box<dyn Notifier> {
    match method {
        NotificationMethod::Progress => Box::new(ProgressNotifier::default()),
        NotificationMethod::Log => Box::new(LogNotifier::default()),
        NotificationMethod::Off => Box::new(NullNotifier),
    }
}

pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn open(&self, _title: &str, _message: &str) {}
    fn update(&self, _percent: u8, _message: &str) {}
    fn close(&self) {}
}

#[derive(Default)]
pub struct LogNotifier {
    title: Mutex<String>,
}

impl Notifier for LogNotifier {
    fn open(&self, title: &str, message: &str) {
        if let Ok(mut current) = self.title.lock() {
            *current = title.to_string();
        }
        info!("{}: {}", title, message);
    }

    fn update(&self, percent: u8, message: &str) {
        let title = self.title.lock().map(|t| t.clone()).unwrap_or_default();
        info!("{} [{}%]: {}", title, percent, message);
    }

    fn close(&self) {
        let title = self.title.lock().map(|t| t.clone()).unwrap_or_default();
        info!("{}: Done", title);
    }
}

#[derive(Default)]
pub struct ProgressNotifier {
    title: Mutex<String>,
}

impl Notifier for ProgressNotifier {
    fn open(&self, title: &str, message: &str) {
        if let Ok(mut current) = self.title.lock() {
            *current = title.to_string();
        }
        eprint!("\r{}: {}", title, message);
        let _ = std::io::stderr().flush();
    }

    fn update(&self, percent: u8, message: &str) {
        let title = self.title.lock().map(|t| t.clone()).unwrap_or_default();
        eprint!("\r{} {:>3}% {}", title, percent, message);
        let _ = std::io::stderr().flush();
    }

    fn close(&self) {
        eprintln!();
    }
}
