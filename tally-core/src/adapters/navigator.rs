//! In-process navigator
//!
//! Tracks the current route for clients without a browser history. The
//! CLI moves it explicitly before each command and reads it afterwards to
//! find out whether a request forced a redirect to login.

use std::sync::Mutex;

use crate::domain::Route;
use crate::ports::Navigator;

#[derive(Debug)]
pub struct MemoryNavigator {
    state: Mutex<NavigatorState>,
}

#[derive(Debug)]
struct NavigatorState {
    current: Route,
    redirects: Vec<Route>,
}

impl MemoryNavigator {
    pub fn new(start: Route) -> Self {
        Self {
            state: Mutex::new(NavigatorState {
                current: start,
                redirects: Vec::new(),
            }),
        }
    }

    /// Move to a route without recording a redirect
    pub fn visit(&self, route: Route) {
        if let Ok(mut state) = self.state.lock() {
            state.current = route;
        }
    }

    /// Redirects issued so far, oldest first
    pub fn redirects(&self) -> Vec<Route> {
        self.state
            .lock()
            .map(|s| s.redirects.clone())
            .unwrap_or_default()
    }
}

impl Default for MemoryNavigator {
    fn default() -> Self {
        Self::new(Route::Home)
    }
}

impl Navigator for MemoryNavigator {
    fn current(&self) -> Route {
        self.state.lock().map(|s| s.current).unwrap_or(Route::Home)
    }

    fn redirect(&self, route: Route) {
        if let Ok(mut state) = self.state.lock() {
            state.current = route;
            state.redirects.push(route);
        }
    }
}
