//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::{BalanceService, RejectHandler};
use crate::config::Settings;

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    pub balance: BalanceService,
}

impl ServiceContainer {
    pub fn new(settings: Settings) -> Self {
        let settings = Arc::new(settings);
        let balance = BalanceService::new(Arc::clone(&settings));

        Self { settings, balance }
    }

    /// Route rejected input lines to `handler` as they are read.
    pub fn with_reject_handler(mut self, handler: RejectHandler) -> Self {
        self.balance = self.balance.with_reject_handler(handler);
        self
    }
}
