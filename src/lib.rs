mod config;
mod error;
mod types;
mod rng;
mod timer;
mod input;
mod audio;
mod state_machine;
mod logging;

#[cfg(feature = "bevy")]
mod events;
#[cfg(feature = "bevy")]
mod hud;
#[cfg(feature = "bevy")]
mod plugin;
#[cfg(feature = "bevy")]
mod visuals;

pub use config::*;
pub use error::*;
pub use types::*;
pub use rng::*;
pub use timer::*;
pub use input::*;
pub use audio::*;
pub use state_machine::*;
pub use logging::*;

#[cfg(feature = "bevy")]
pub use events::*;
#[cfg(feature = "bevy")]
pub use plugin::*;

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: u64 = 2500;

    fn dm(target: RoundTarget) -> GameMachine<ScriptedDelay> {
        let mut dm = GameMachine::new(ScriptedDelay::constant(DELAY));
        dm.select_rounds(target);
        dm
    }

    /// Fresh game started at t=0.
    fn started(target: RoundTarget, cues: &mut RecordingCues) -> GameMachine<ScriptedDelay> {
        let mut dm = dm(target);
        assert!(dm.start(0, cues));
        dm
    }

    fn unlock(dm: &mut GameMachine<ScriptedDelay>) -> u64 {
        let at = dm.pending_unlock_at_ms().expect("timer armed");
        assert!(dm.tick(at));
        at
    }

    #[test]
    fn winner_by_strict_comparison() {
        assert_eq!(Outcome::from_scores(3, 5).to_string(), "Blue wins");
        assert_eq!(Outcome::from_scores(4, 4).to_string(), "Tie");
        assert_eq!(Outcome::from_scores(5, 2).to_string(), "Red wins");
    }

    #[test]
    fn round_target_only_accepts_fixed_set() {
        for n in [3, 5, 7, 10] {
            assert_eq!(RoundTarget::try_from(n).unwrap().get(), n);
        }
        assert!(matches!(RoundTarget::try_from(4), Err(HeistError::InvalidRoundTarget(4))));
        assert!("11".parse::<RoundTarget>().is_err());
        assert!("ten".parse::<RoundTarget>().is_err());
        assert_eq!("7".parse::<RoundTarget>().unwrap(), RoundTarget::Seven);
        assert_eq!(RoundTarget::Ten.next(), RoundTarget::Three);
        assert_eq!(RoundTarget::Three.prev(), RoundTarget::Ten);
    }

    #[test]
    fn start_resets_session_and_arms_timer() {
        let mut cues = RecordingCues::default();
        let dm = started(RoundTarget::Five, &mut cues);
        assert_eq!(dm.screen(), Screen::Playing);
        let s = dm.session();
        assert!(s.started && !s.over);
        assert_eq!((s.current_round, s.red_score, s.blue_score), (0, 0, 0));
        assert!(!dm.round().unlocked);
        assert_eq!(dm.pending_unlock_at_ms(), Some(DELAY));
        assert!(dm.is_listening());
        assert_eq!(cues.calls.first(), Some(&AudioCall::StartLoop(DEFAULT_LOOP_VOLUME)));
    }

    #[test]
    fn timer_unlocks_without_changing_round() {
        let mut cues = RecordingCues::default();
        let mut dm = started(RoundTarget::Three, &mut cues);
        assert!(!dm.tick(DELAY - 1));
        assert!(dm.tick(DELAY));
        assert!(dm.round().unlocked);
        assert_eq!(dm.session().current_round, 0);
        assert!(!dm.tick(DELAY + 10));
    }

    #[test]
    fn early_press_changes_nothing() {
        let mut cues = RecordingCues::default();
        let mut dm = started(RoundTarget::Three, &mut cues);
        let before = dm.session().clone();
        for t in [10, 500, DELAY - 1] {
            assert_eq!(dm.press(PlayerAction::BluePress, t, &mut cues), PressResult::TooEarly { player: Player::Blue });
        }
        assert_eq!(dm.session(), &before);
        assert_eq!(cues.count(Cue::Fail), 3);
        assert_eq!(cues.count(Cue::Grab), 0);
    }

    #[test]
    fn silent_variant_ignores_early_press_quietly() {
        let mut dm = dm(RoundTarget::Three);
        let mut cues = Silent;
        dm.start(0, &mut cues);
        assert_eq!(dm.key('a', 100, &mut cues), PressResult::TooEarly { player: Player::Red });
        assert_eq!(dm.session().red_score, 0);
    }

    #[test]
    fn accepted_press_scores_and_rearms() {
        let mut cues = RecordingCues::default();
        let mut dm = started(RoundTarget::Five, &mut cues);
        let at = unlock(&mut dm);
        let res = dm.press(PlayerAction::RedPress, at + 180, &mut cues);
        assert_eq!(res, PressResult::Accepted { player: Player::Red, reaction_ms: 180 });
        assert_eq!(dm.session().red_score, 1);
        assert_eq!(dm.session().current_round, 1);
        assert!(!dm.round().unlocked);
        assert_eq!(dm.pending_unlock_at_ms(), Some(at + 180 + DELAY));
        assert_eq!(cues.count(Cue::Grab), 1);

        // Second press in the same round lands on the next, locked round.
        let res = dm.press(PlayerAction::BluePress, at + 190, &mut cues);
        assert_eq!(res, PressResult::TooEarly { player: Player::Blue });
        assert_eq!(dm.session().blue_score, 0);
    }

    #[test]
    fn three_round_scenario() {
        let mut cues = RecordingCues::default();
        let mut dm = started(RoundTarget::Three, &mut cues);

        let at = unlock(&mut dm);
        dm.key('a', at + 200, &mut cues);
        assert_eq!(dm.session().red_score, 1);

        let armed = dm.pending_unlock_at_ms().unwrap();
        assert_eq!(dm.key('l', armed - 1000, &mut cues), PressResult::TooEarly { player: Player::Blue });
        let at = unlock(&mut dm);
        dm.key('l', at + 150, &mut cues);
        assert_eq!(dm.session().blue_score, 1);

        let at = unlock(&mut dm);
        dm.key('a', at + 300, &mut cues);

        let s = dm.session();
        assert_eq!((s.red_score, s.blue_score, s.current_round), (2, 1, 3));
        assert!(s.over);
        assert_eq!(dm.screen(), Screen::GameOver);
        assert_eq!(dm.outcome(), Some(Outcome::RedWins));
        assert_eq!(dm.outcome().unwrap().to_string(), "Red wins");
        assert_eq!(cues.count(Cue::Win), 1);
        assert_eq!(cues.count(Cue::Fail), 1);
        assert_eq!(dm.records()[1].early_presses, 1);
    }

    #[test]
    fn finished_game_totals_match_target() {
        for target in RoundTarget::ALL {
            let mut cues = RecordingCues::default();
            let mut dm = started(target, &mut cues);
            let mut accepted = 0;
            let mut i = 0u64;
            while dm.screen() == Screen::Playing {
                let at = unlock(&mut dm);
                let action = if i % 3 == 0 { PlayerAction::BluePress } else { PlayerAction::RedPress };
                if let PressResult::Accepted { .. } = dm.press(action, at + 100 + i, &mut cues) {
                    accepted += 1;
                }
                i += 1;
            }
            let s = dm.session();
            assert_eq!(s.current_round, target.get());
            assert_eq!(s.red_score + s.blue_score, accepted);
            assert!(s.red_score + s.blue_score <= target.get());
            assert!(!dm.is_listening());
            assert_eq!(dm.pending_unlock_at_ms(), None);
        }
    }

    #[test]
    fn presses_after_game_over_are_ignored() {
        let mut cues = RecordingCues::default();
        let mut dm = started(RoundTarget::Three, &mut cues);
        for _ in 0..3 {
            let at = unlock(&mut dm);
            dm.press(PlayerAction::BluePress, at + 50, &mut cues);
        }
        let done = dm.session().clone();
        let calls = cues.calls.len();
        assert_eq!(dm.press(PlayerAction::RedPress, 999_999, &mut cues), PressResult::Ignored);
        assert_eq!(dm.key('l', 999_999, &mut cues), PressResult::Ignored);
        assert!(!dm.tick(10_000_000));
        assert_eq!(dm.session(), &done);
        assert_eq!(cues.calls.len(), calls);
        assert_eq!(dm.outcome(), Some(Outcome::BlueWins));
    }

    #[test]
    fn presses_on_menu_are_ignored() {
        let mut cues = RecordingCues::default();
        let mut dm = dm(RoundTarget::Five);
        assert_eq!(dm.key('a', 0, &mut cues), PressResult::Ignored);
        assert_eq!(dm.press(PlayerAction::RedPress, 0, &mut cues), PressResult::Ignored);
        assert!(cues.calls.is_empty());
        assert_eq!(dm.outcome(), None);
    }

    #[test]
    fn rounds_only_selectable_on_menu() {
        let mut cues = RecordingCues::default();
        let mut dm = dm(RoundTarget::Three);
        assert!(dm.select_rounds_count(10).unwrap());
        assert!(dm.select_rounds_count(6).is_err());
        assert_eq!(dm.session().round_target, RoundTarget::Ten);
        dm.start(0, &mut cues);
        assert!(!dm.select_rounds(RoundTarget::Three));
        assert_eq!(dm.session().round_target, RoundTarget::Ten);
        assert!(!dm.start(5, &mut cues));
    }

    #[test]
    fn restart_returns_to_initial_session() {
        let mut cues = RecordingCues::default();
        let mut dm = started(RoundTarget::Seven, &mut cues);
        let at = unlock(&mut dm);
        dm.press(PlayerAction::RedPress, at + 10, &mut cues);
        dm.press(PlayerAction::BluePress, at + 20, &mut cues);
        dm.restart(&mut cues);

        assert_eq!(dm.screen(), Screen::Menu);
        assert_eq!(dm.session(), &Session::new(RoundTarget::Seven));
        assert_eq!(dm.round(), &RoundState::locked());
        assert!(dm.records().is_empty());
        assert!(!dm.is_listening());
        assert_eq!(cues.calls.last(), Some(&AudioCall::StopLoop));

        // Idempotent.
        dm.restart(&mut cues);
        assert_eq!(dm.session(), &Session::new(RoundTarget::Seven));
    }

    #[test]
    fn restart_mid_round_leaves_no_stale_unlock() {
        let mut cues = RecordingCues::default();
        let mut dm = started(RoundTarget::Five, &mut cues);
        let stale_deadline = dm.pending_unlock_at_ms().unwrap();
        dm.restart(&mut cues);

        assert!(!dm.tick(stale_deadline));
        assert!(!dm.tick(stale_deadline + 60_000));
        assert_eq!(dm.session(), &Session::new(RoundTarget::Five));
        assert_eq!(dm.round(), &RoundState::locked());
        assert_eq!(dm.screen(), Screen::Menu);

        // A new game is not unlocked early by the old deadline either.
        dm.start(stale_deadline - 100, &mut cues);
        assert!(!dm.tick(stale_deadline));
        assert!(!dm.round().unlocked);
    }

    #[test]
    fn cancelled_arming_never_fires() {
        let mut cues = RecordingCues::default();
        let mut dm = started(RoundTarget::Five, &mut cues);
        dm.restart(&mut cues);
        assert!(!dm.tick(DELAY));
        dm.start(20_000, &mut cues);
        assert!(!dm.tick(20_000 + DELAY - 1));
        assert!(!dm.round().unlocked);
        assert!(dm.tick(20_000 + DELAY));
    }

    #[test]
    fn old_deadline_does_not_unlock_next_round() {
        let mut cues = RecordingCues::default();
        let mut dm = GameMachine::new(ScriptedDelay::new(vec![2500, 4000]));
        dm.select_rounds(RoundTarget::Three);
        dm.start(0, &mut cues);
        assert!(!dm.tick(1000));
        assert_eq!(dm.press(PlayerAction::BluePress, 1000, &mut cues), PressResult::TooEarly { player: Player::Blue });
        let first = unlock(&mut dm);
        assert_eq!(first, 2500);
        dm.press(PlayerAction::RedPress, 2600, &mut cues);
        assert_eq!(dm.pending_unlock_at_ms(), Some(6600));

        // Anywhere in the old window, and at the old deadline, round 2 stays locked.
        for t in [2500, 2600, 5099, 6599] {
            assert!(!dm.tick(t), "unlocked at {}", t);
            assert!(!dm.round().unlocked);
        }
        assert_eq!(dm.press(PlayerAction::BluePress, 6599, &mut cues), PressResult::TooEarly { player: Player::Blue });
        assert_eq!(dm.session().blue_score, 0);
        assert!(dm.tick(6600));
        assert_eq!(dm.round().unlocked_at_ms, Some(6600));
    }

    /// Frame order in the app: keys first, then the timer poll, both at the
    /// frame's timestamp.
    #[test]
    fn key_read_before_poll_in_deadline_frame_is_early() {
        let mut cues = RecordingCues::default();
        let mut dm = started(RoundTarget::Three, &mut cues);
        let frame = DELAY + 6;
        assert_eq!(dm.key('a', frame, &mut cues), PressResult::TooEarly { player: Player::Red });
        assert!(dm.tick(frame));
        assert_eq!(dm.session().red_score, 0);
        assert_eq!(dm.key('l', frame + 16, &mut cues), PressResult::Accepted { player: Player::Blue, reaction_ms: 16 });
    }

    #[test]
    fn no_unlock_before_deadline() {
        let mut cues = RecordingCues::default();
        let mut dm = started(RoundTarget::Three, &mut cues);
        for t in [0, 1, DELAY / 2, DELAY - 1] {
            assert!(!dm.tick(t));
            assert_eq!(dm.press(PlayerAction::RedPress, t, &mut cues), PressResult::TooEarly { player: Player::Red });
        }
        assert_eq!(dm.session().red_score, 0);
    }

    #[test]
    fn mute_toggles_loop_volume_without_touching_game() {
        let mut cues = RecordingCues::default();
        let mut dm = started(RoundTarget::Five, &mut cues);
        let before = dm.session().clone();
        dm.toggle_mute(&mut cues);
        assert_eq!(cues.calls.last(), Some(&AudioCall::LoopVolume(0.0)));
        dm.toggle_mute(&mut cues);
        assert_eq!(cues.calls.last(), Some(&AudioCall::LoopVolume(DEFAULT_LOOP_VOLUME)));
        assert_eq!(dm.session(), &before);

        dm.toggle_mute(&mut cues);
        dm.restart(&mut cues);
        assert!(dm.mix().muted);
        dm.start(0, &mut cues);
        assert_eq!(cues.calls.last(), Some(&AudioCall::StartLoop(0.0)));
    }

    #[test]
    fn random_delays_within_bounds() {
        let mut dm = GameMachine::with_timing(&TimingConfig::default(), Some(7));
        let mut cues = Silent;
        for round in 0..500u64 {
            dm.restart(&mut cues);
            let start = round * 10_000;
            dm.start(start, &mut cues);
            let at = dm.pending_unlock_at_ms().unwrap();
            assert!((start + 2000..start + 5000).contains(&at), "unlock at {} for start {}", at, start);
        }
    }

    #[test]
    fn match_log_replays() {
        let mut cues = RecordingCues::default();
        let mut dm = GameMachine::with_timing(&TimingConfig::default(), Some(0xD1A_0D));
        dm.select_rounds(RoundTarget::Five);
        dm.start(0, &mut cues);
        let mut now = 0;
        let mut i = 0;
        while dm.screen() == Screen::Playing {
            dm.press(PlayerAction::RedPress, now + 1, &mut cues);
            now = dm.pending_unlock_at_ms().unwrap();
            dm.tick(now);
            now += 120 + i * 15;
            let action = if i % 2 == 0 { PlayerAction::BluePress } else { PlayerAction::RedPress };
            dm.press(action, now, &mut cues);
            i += 1;
        }
        let log = MatchLog::from_machine(&dm).expect("finished");
        assert_eq!(log.seed, Some(0xD1A_0D));
        assert_eq!(log.rounds.len(), 5);
        assert_eq!(log.outcome, Outcome::BlueWins);
        assert_eq!(log.mean_reaction_ms(Player::Blue), Some(150));
        replay_match(&log).expect("replay matches");

        let json = log.to_json().unwrap();
        let back = MatchLog::from_json(&json).unwrap();
        assert_eq!(back, log);
        assert!(matches!(MatchLog::from_json("{\"seed\": 1"), Err(HeistError::Serialization(_))));

        let mut tampered = log.clone();
        tampered.red_score += 1;
        assert!(matches!(replay_match(&tampered), Err(HeistError::ReplayMismatch { .. })));
    }

    #[test]
    fn match_log_needs_finished_game() {
        let mut cues = Silent;
        let mut dm = dm(RoundTarget::Three);
        dm.start(0, &mut cues);
        assert!(matches!(MatchLog::from_machine(&dm), Err(HeistError::UnfinishedMatch)));
    }
}
