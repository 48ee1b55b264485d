// Fast IP Change - User Notifications
// Copyright (C) 2026 Fast IP Change contributors
// SPDX-License-Identifier: MIT

//! User notifications for apply outcomes.

use std::io::Write;

use tracing::debug;

/// Delivers a short outcome message to the operator.
pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, message: &str, success: bool);
}

/// Prints notifications to the terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, title: &str, message: &str, success: bool) {
        let marker = if success { "OK" } else { "ERROR" };
        let mut stdout = std::io::stdout().lock();
        // A closed stdout must not take the handler down with it
        if writeln!(stdout, "[{marker}] {title}: {message}").is_err() {
            debug!("Notification dropped: {}: {}", title, message);
        }
    }
}

/// Discards every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn notify(&self, title: &str, message: &str, _success: bool) {
        debug!("Notification suppressed: {}: {}", title, message);
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::Notifier;

    /// Records every notification for assertions.
    #[derive(Default)]
    pub struct RecordingNotifier {
        pub sent: Mutex<Vec<(String, String, bool)>>,
    }

    impl RecordingNotifier {
        pub fn sent(&self) -> Vec<(String, String, bool)> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, title: &str, message: &str, success: bool) {
            self.sent
                .lock()
                .unwrap()
                .push((title.to_string(), message.to_string(), success));
        }
    }
}
