use bevy::prelude::*;
use crate::types::{Outcome, Player};

#[derive(Event, Clone, Copy, Debug)]
pub struct UnlockCue;

#[derive(Event, Clone, Copy, Debug)]
pub struct GrabCue {
    pub player: Player,
    pub reaction_ms: u64,
}

#[derive(Event, Clone, Copy, Debug)]
pub struct EarlyPressCue {
    pub player: Player,
}

#[derive(Event, Clone, Copy, Debug)]
pub struct GameOverCue {
    pub outcome: Outcome,
}
