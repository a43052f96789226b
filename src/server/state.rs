use std::sync::Arc;

use crate::chef::Chef;

/// Shared, read-only server state. The chef owns the one provider client for the process.
pub struct State {
    pub chef: Chef,
}

impl State {
    pub fn new(chef: Chef) -> Arc<Self> {
        Arc::new(Self { chef })
    }
}
