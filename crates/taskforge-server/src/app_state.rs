use std::sync::Arc;

use taskforge_core::traits::{ProjectStore, TaskStore};
use taskforge_mcp::Dispatcher;

use crate::session::SessionManager;

/// Shared application state with injected dependencies.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub sessions: SessionManager,
    pub projects: Arc<dyn ProjectStore>,
    pub tasks: Arc<dyn TaskStore>,
}
