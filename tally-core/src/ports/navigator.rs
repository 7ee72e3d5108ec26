//! Navigation port

use crate::domain::Route;

/// Where the client currently is, and how to send it elsewhere
pub trait Navigator: Send + Sync {
    fn current(&self) -> Route;

    fn redirect(&self, route: Route);
}
