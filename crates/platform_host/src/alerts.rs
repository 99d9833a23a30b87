//! User-facing alert and load-progress service contracts.

use std::{cell::RefCell, rc::Rc};

/// Host service that surfaces blocking alerts and application load progress.
pub trait AlertPresenter {
    /// Shows a blocking error alert.
    fn show_error(&self, message: &str);

    /// Shows a blocking informational alert.
    fn show_alert(&self, message: &str);

    /// Shows a progress indicator titled `title`.
    fn progress_started(&self, title: &str);

    /// Updates the progress indicator.
    fn progress_updated(&self, percent: u8, message: &str);

    /// Dismisses the progress indicator.
    fn progress_finished(&self);
}

#[derive(Debug, Clone, Copy, Default)]
/// Alert presenter for headless hosts.
pub struct NoopAlertPresenter;

impl AlertPresenter for NoopAlertPresenter {
    fn show_error(&self, _message: &str) {}

    fn show_alert(&self, _message: &str) {}

    fn progress_started(&self, _title: &str) {}

    fn progress_updated(&self, _percent: u8, _message: &str) {}

    fn progress_finished(&self) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One presentation recorded by [`MemoryAlertPresenter`].
pub enum AlertRecord {
    /// An error alert.
    Error(String),
    /// An informational alert.
    Alert(String),
    /// Progress indicator shown.
    ProgressStarted(String),
    /// Progress indicator updated.
    ProgressUpdated(u8, String),
    /// Progress indicator dismissed.
    ProgressFinished,
}

#[derive(Debug, Clone, Default)]
/// Recording presenter. Clones share the same record list.
pub struct MemoryAlertPresenter {
    records: Rc<RefCell<Vec<AlertRecord>>>,
}

impl MemoryAlertPresenter {
    /// Returns every presentation in order.
    pub fn records(&self) -> Vec<AlertRecord> {
        self.records.borrow().clone()
    }

    /// Returns only the error alert messages.
    pub fn errors(&self) -> Vec<String> {
        self.records
            .borrow()
            .iter()
            .filter_map(|record| match record {
                AlertRecord::Error(message) => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    /// Returns whether a progress indicator is still showing.
    pub fn progress_visible(&self) -> bool {
        let mut visible = false;
        for record in self.records.borrow().iter() {
            match record {
                AlertRecord::ProgressStarted(_) => visible = true,
                AlertRecord::ProgressFinished => visible = false,
                _ => {}
            }
        }
        visible
    }

    fn push(&self, record: AlertRecord) {
        self.records.borrow_mut().push(record);
    }
}

impl AlertPresenter for MemoryAlertPresenter {
    fn show_error(&self, message: &str) {
        self.push(AlertRecord::Error(message.to_string()));
    }

    fn show_alert(&self, message: &str) {
        self.push(AlertRecord::Alert(message.to_string()));
    }

    fn progress_started(&self, title: &str) {
        self.push(AlertRecord::ProgressStarted(title.to_string()));
    }

    fn progress_updated(&self, percent: u8, message: &str) {
        self.push(AlertRecord::ProgressUpdated(percent, message.to_string()));
    }

    fn progress_finished(&self) {
        self.push(AlertRecord::ProgressFinished);
    }
}
