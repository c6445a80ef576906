use tracing::debug;

use crate::config::{BLUE_KEY, RED_KEY};
use crate::types::PlayerAction;

/// Exact match on the lowercase keys; `'A'` and `'L'` map to nothing.
pub fn action_for_key(key: char) -> Option<PlayerAction> {
    match key {
        k if k == RED_KEY => Some(PlayerAction::RedPress),
        k if k == BLUE_KEY => Some(PlayerAction::BluePress),
        _ => None,
    }
}

/// Keyboard subscription that only exists while a game is being played.
#[derive(Clone, Debug, Default)]
pub struct InputListener {
    attached: bool,
}

impl InputListener {
    pub fn attach(&mut self) {
        if !self.attached {
            debug!("input listener attached");
        }
        self.attached = true;
    }

    pub fn detach(&mut self) {
        if self.attached {
            debug!("input listener detached");
        }
        self.attached = false;
    }

    pub fn is_attached(&self) -> bool { self.attached }

    /// At most one action per key event; nothing while detached.
    pub fn dispatch(&self, key: char) -> Option<PlayerAction> {
        if !self.attached { return None; }
        action_for_key(key)
    }
}
