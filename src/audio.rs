use crate::config::DEFAULT_LOOP_VOLUME;
use crate::types::Cue;

/// Sound playback as seen by the game. Every call is fire-and-forget.
pub trait AudioCues {
    fn play_cue(&mut self, cue: Cue);
    fn start_loop(&mut self, volume: f32);
    fn set_loop_volume(&mut self, volume: f32);
    fn stop_loop(&mut self);
}

/// No sound at all.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl AudioCues for Silent {
    fn play_cue(&mut self, _cue: Cue) {}
    fn start_loop(&mut self, _volume: f32) {}
    fn set_loop_volume(&mut self, _volume: f32) {}
    fn stop_loop(&mut self) {}
}

#[derive(Debug, Clone, PartialEq)]
pub enum AudioCall {
    Cue(Cue),
    StartLoop(f32),
    LoopVolume(f32),
    StopLoop,
}

/// Keeps every call in order, for assertions.
#[derive(Debug, Default, Clone)]
pub struct RecordingCues {
    pub calls: Vec<AudioCall>,
}

impl RecordingCues {
    pub fn count(&self, cue: Cue) -> usize {
        self.calls.iter().filter(|c| **c == AudioCall::Cue(cue)).count()
    }
}

impl AudioCues for RecordingCues {
    fn play_cue(&mut self, cue: Cue) { self.calls.push(AudioCall::Cue(cue)); }
    fn start_loop(&mut self, volume: f32) { self.calls.push(AudioCall::StartLoop(volume)); }
    fn set_loop_volume(&mut self, volume: f32) { self.calls.push(AudioCall::LoopVolume(volume)); }
    fn stop_loop(&mut self) { self.calls.push(AudioCall::StopLoop); }
}

/// Mute flag plus the level the background loop plays at when unmuted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioMix {
    pub muted: bool,
    pub level: f32,
}

impl Default for AudioMix {
    fn default() -> Self { Self { muted: false, level: DEFAULT_LOOP_VOLUME } }
}

impl AudioMix {
    pub fn loop_volume(&self) -> f32 { if self.muted { 0.0 } else { self.level } }

    pub fn toggle_mute<A: AudioCues + ?Sized>(&mut self, cues: &mut A) {
        self.muted = !self.muted;
        cues.set_loop_volume(self.loop_volume());
    }
}
