use tracing::{debug, info};

use crate::audio::{AudioCues, AudioMix};
use crate::config::TimingConfig;
use crate::error::HeistError;
use crate::input::InputListener;
use crate::rng::{DelaySource, UniformDelay};
use crate::timer::{RoundTimer, TimerToken};
use crate::types::*;

/// Owns the whole game: session, round gate, timer and input subscription.
/// Time is passed in as milliseconds so the machine can run without a clock.
#[derive(Clone, Debug)]
pub struct GameMachine<D: DelaySource = UniformDelay> {
    screen: Screen,
    session: Session,
    round: RoundState,
    timer: RoundTimer,
    input: InputListener,
    delays: D,
    mix: AudioMix,
    records: Vec<RoundRecord>,
    round_delay_ms: u64,
    unlock_due_ms: u64,
    early_presses: u32,
}

impl GameMachine<UniformDelay> {
    pub fn with_timing(cfg: &TimingConfig, seed: Option<u64>) -> Self {
        Self::new(UniformDelay::new(cfg, seed))
    }
}

impl<D: DelaySource> GameMachine<D> {
    pub fn new(delays: D) -> Self {
        Self {
            screen: Screen::Menu,
            session: Session::default(),
            round: RoundState::locked(),
            timer: RoundTimer::new(),
            input: InputListener::default(),
            delays,
            mix: AudioMix::default(),
            records: Vec::with_capacity(10),
            round_delay_ms: 0,
            unlock_due_ms: 0,
            early_presses: 0,
        }
    }

    pub fn screen(&self) -> Screen { self.screen }
    pub fn session(&self) -> &Session { &self.session }
    pub fn round(&self) -> &RoundState { &self.round }
    pub fn records(&self) -> &[RoundRecord] { &self.records }
    pub fn mix(&self) -> AudioMix { self.mix }
    pub fn seed(&self) -> Option<u64> { self.delays.seed() }
    pub fn is_listening(&self) -> bool { self.input.is_attached() }
    pub fn pending_unlock_at_ms(&self) -> Option<u64> { self.timer.fires_at_ms() }

    /// Winner, once the game is over.
    pub fn outcome(&self) -> Option<Outcome> {
        (self.screen == Screen::GameOver).then(|| self.session.outcome())
    }

    pub fn set_mix(&mut self, mix: AudioMix) { self.mix = mix; }

    /// Only honoured on the menu.
    pub fn select_rounds(&mut self, target: RoundTarget) -> bool {
        if self.screen != Screen::Menu { return false; }
        self.session.round_target = target;
        true
    }

    pub fn select_rounds_count(&mut self, rounds: u32) -> Result<bool, HeistError> {
        let target = RoundTarget::try_from(rounds)?;
        Ok(self.select_rounds(target))
    }

    pub fn start<A: AudioCues + ?Sized>(&mut self, now_ms: u64, cues: &mut A) -> bool {
        if self.screen != Screen::Menu { return false; }
        self.session = Session { started: true, ..Session::new(self.session.round_target) };
        self.records.clear();
        self.screen = Screen::Playing;
        self.input.attach();
        cues.start_loop(self.mix.loop_volume());
        info!(rounds = self.session.round_target.get(), seed = ?self.delays.seed(), "game started");
        self.enter_round(now_ms);
        true
    }

    fn enter_round(&mut self, now_ms: u64) {
        self.round = RoundState::locked();
        self.early_presses = 0;
        self.round_delay_ms = self.delays.next_delay_ms();
        self.unlock_due_ms = now_ms + self.round_delay_ms;
        self.timer.arm(now_ms, self.round_delay_ms);
        debug!(
            round = self.session.current_round + 1,
            delay_ms = self.round_delay_ms,
            "round armed"
        );
    }

    /// Polls the round timer. Returns true on the frame the diamond unlocks.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        match self.timer.poll(now_ms) {
            Some(token) => self.on_timer_fired(token, now_ms),
            None => false,
        }
    }

    /// Applies a timer firing. Stale tokens from a cancelled or replaced
    /// arming are dropped, and nothing unlocks before the round's deadline.
    fn on_timer_fired(&mut self, token: TimerToken, now_ms: u64) -> bool {
        if self.screen != Screen::Playing || !self.timer.is_current(token) || self.round.unlocked {
            debug!(?token, "stale timer firing ignored");
            return false;
        }
        if now_ms < self.unlock_due_ms {
            debug!(?token, due_ms = self.unlock_due_ms, at_ms = now_ms, "early timer firing ignored");
            return false;
        }
        self.round.unlock(now_ms);
        debug!(round = self.session.current_round + 1, at_ms = now_ms, "diamond unlocked");
        true
    }

    /// Raw key from the keyboard. Unmapped keys and keys outside play do nothing.
    pub fn key<A: AudioCues + ?Sized>(&mut self, key: char, now_ms: u64, cues: &mut A) -> PressResult {
        match self.input.dispatch(key) {
            Some(action) => self.press(action, now_ms, cues),
            None => PressResult::Ignored,
        }
    }

    pub fn press<A: AudioCues + ?Sized>(&mut self, action: PlayerAction, now_ms: u64, cues: &mut A) -> PressResult {
        if !self.input.is_attached() || self.screen != Screen::Playing {
            return PressResult::Ignored;
        }
        let player = action.player();
        let Some(unlocked_at) = self.round.unlocked_at_ms.filter(|_| self.round.unlocked) else {
            self.early_presses += 1;
            cues.play_cue(Cue::Fail);
            debug!(%player, "press before unlock");
            return PressResult::TooEarly { player };
        };

        let reaction_ms = now_ms.saturating_sub(unlocked_at);
        *self.session.score_mut(player) += 1;
        self.session.current_round += 1;
        self.round = RoundState::locked();
        self.timer.cancel();
        self.records.push(RoundRecord {
            round: self.session.current_round,
            delay_ms: self.round_delay_ms,
            winner: player,
            reaction_ms,
            early_presses: self.early_presses,
        });
        cues.play_cue(Cue::Grab);
        debug!(%player, reaction_ms, red = self.session.red_score, blue = self.session.blue_score, "diamond grabbed");

        if self.session.is_finished() {
            self.finish(cues);
        } else {
            self.enter_round(now_ms);
        }
        PressResult::Accepted { player, reaction_ms }
    }

    fn finish<A: AudioCues + ?Sized>(&mut self, cues: &mut A) {
        self.session.over = true;
        self.screen = Screen::GameOver;
        self.input.detach();
        self.timer.cancel();
        cues.play_cue(Cue::Win);
        info!(
            outcome = %self.session.outcome(),
            red = self.session.red_score,
            blue = self.session.blue_score,
            "game over"
        );
    }

    /// Back to a clean menu from any screen. The round selection and the
    /// mute setting are kept.
    pub fn restart<A: AudioCues + ?Sized>(&mut self, cues: &mut A) {
        self.teardown(cues);
        self.session = Session::new(self.session.round_target);
        self.round = RoundState::locked();
        self.records.clear();
        self.round_delay_ms = 0;
        self.unlock_due_ms = 0;
        self.early_presses = 0;
        self.screen = Screen::Menu;
        info!("back to menu");
    }

    /// Cancels the pending unlock, drops the keyboard subscription and stops
    /// the background loop.
    pub fn teardown<A: AudioCues + ?Sized>(&mut self, cues: &mut A) {
        self.timer.cancel();
        self.input.detach();
        cues.stop_loop();
    }

    pub fn toggle_mute<A: AudioCues + ?Sized>(&mut self, cues: &mut A) {
        self.mix.toggle_mute(cues);
        debug!(muted = self.mix.muted, "mute toggled");
    }
}
