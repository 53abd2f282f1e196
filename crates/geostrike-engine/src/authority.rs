//! Write-through to the authoritative store.
//!
//! Every mutation is fire-and-forget: local state has already advanced
//! optimistically, so a failure is logged and dropped. Local and remote state
//! may drift until the next full profile refresh.

use log::{debug, warn};

use geostrike_core::error::{ApiError, ApiResult};

use crate::collaborators::AuthoritativeStore;

/// The authoritative store plus the session's auth token.
pub struct Authority {
    store: Box<dyn AuthoritativeStore>,
    token: Option<String>,
}

impl Authority {
    pub fn new(store: Box<dyn AuthoritativeStore>) -> Self {
        Self { store, token: None }
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token.filter(|t| !t.is_empty());
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn set_health(&mut self, value: i32) -> bool {
        self.submit("setHealth", |store, token| store.set_health(token, value))
    }

    pub fn remove_health(&mut self, amount: i32) -> bool {
        self.submit("removeHealth", |store, token| store.remove_health(token, amount))
    }

    pub fn add_health(&mut self, amount: i32) -> bool {
        self.submit("addHealth", |store, token| store.add_health(token, amount))
    }

    pub fn set_alive(&mut self, alive: bool) -> bool {
        self.submit("setAlive", |store, token| store.set_alive(token, alive))
    }

    pub fn add_currency(&mut self, amount: u32) -> bool {
        self.submit("addCurrency", |store, token| store.add_currency(token, amount))
    }

    pub fn add_inventory_item(&mut self, item_name: &str, category: &str) -> bool {
        self.submit("addInventoryItem", |store, token| {
            store.add_inventory_item(token, item_name, category)
        })
    }

    /// Entity removal is not scoped to a player, so it needs no token.
    pub fn consume_entity(&mut self, entity_id: &str) -> bool {
        log_outcome("consumeEntity", self.store.consume_entity(entity_id))
    }

    /// Run one token-scoped write. Returns whether it was accepted.
    fn submit(
        &mut self,
        operation: &'static str,
        call: impl FnOnce(&mut dyn AuthoritativeStore, &str) -> ApiResult<()>,
    ) -> bool {
        let Some(token) = self.token.as_deref() else {
            warn!("{}", ApiError::MissingToken { operation });
            return false;
        };
        log_outcome(operation, call(self.store.as_mut(), token))
    }
}

fn log_outcome(operation: &'static str, result: ApiResult<()>) -> bool {
    match result {
        Ok(()) => {
            debug!("{operation} accepted");
            true
        }
        Err(e) => {
            warn!("{operation} failed: {e}");
            false
        }
    }
}
