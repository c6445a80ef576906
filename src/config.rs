use crate::types::RoundTarget;

/// Bounds of the random unlock delay, half-open: `[min, max)`.
#[derive(Debug, Clone)]
pub struct TimingConfig {
    pub unlock_delay_min_ms: u64,
    pub unlock_delay_max_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            unlock_delay_min_ms: 2000,
            unlock_delay_max_ms: 5000,
        }
    }
}

pub const RED_KEY: char = 'a';
pub const BLUE_KEY: char = 'l';

/// Background loop level when not muted.
pub const DEFAULT_LOOP_VOLUME: f32 = 0.5;

#[derive(Debug, Clone)]
#[cfg_attr(feature = "bevy", derive(bevy::prelude::Resource))]
pub struct HeistSettings {
    pub rounds: RoundTarget,
    /// Fixed seed for the unlock delays; entropy when `None`.
    pub seed: Option<u64>,
    /// Variant with sound cues. When off, early presses are silently ignored.
    pub audio: bool,
    pub muted: bool,
    pub loop_volume: f32,
    pub timing: TimingConfig,
}

impl Default for HeistSettings {
    fn default() -> Self {
        Self {
            rounds: RoundTarget::default(),
            seed: None,
            audio: true,
            muted: false,
            loop_volume: DEFAULT_LOOP_VOLUME,
            timing: TimingConfig::default(),
        }
    }
}
