use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MainScreen {
    #[default]
    Login,
    Home,
}

/// Which top-level screen is showing.
#[derive(Debug, Clone, Default)]
pub struct Navigation {
    screen: Arc<Mutex<MainScreen>>,
}

impl Navigation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_main_screen(&self, screen: MainScreen) {
        *self.screen.lock().unwrap_or_else(|p| p.into_inner()) = screen;
    }

    pub fn main_screen(&self) -> MainScreen {
        *self.screen.lock().unwrap_or_else(|p| p.into_inner())
    }
}
