use std::sync::{Arc, Mutex, MutexGuard};

use uuid::Uuid;

/// A short message to flash at the user. Each toast gets a fresh id so a
/// repeated text still counts as a new toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastItem {
    pub id: Uuid,
    pub value: String,
}

impl ToastItem {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Default)]
struct AlertInner {
    toast: Option<ToastItem>,
    loading: bool,
}

/// Toast and loading-indicator state shared by every view-model.
#[derive(Debug, Clone, Default)]
pub struct AlertState {
    inner: Arc<Mutex<AlertInner>>,
}

impl AlertState {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, AlertInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn set_toast(&self, toast: Option<ToastItem>) {
        self.lock().toast = toast;
    }

    pub fn show_toast(&self, value: impl Into<String>) -> ToastItem {
        let toast = ToastItem::new(value);
        self.set_toast(Some(toast.clone()));
        toast
    }

    pub fn toast(&self) -> Option<ToastItem> {
        self.lock().toast.clone()
    }

    pub fn show_loader(&self) {
        self.lock().loading = true;
    }

    pub fn hide_loader(&self) {
        self.lock().loading = false;
    }

    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }
}
