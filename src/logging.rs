use serde::{Deserialize, Serialize};

use crate::audio::Silent;
use crate::error::HeistError;
use crate::rng::{DelaySource, ScriptedDelay};
use crate::state_machine::GameMachine;
use crate::types::*;

/// Everything needed to re-run a finished game.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MatchLog {
    pub seed: Option<u64>,
    pub round_target: RoundTarget,
    pub rounds: Vec<RoundRecord>,
    pub red_score: u32,
    pub blue_score: u32,
    pub outcome: Outcome,
}

impl MatchLog {
    pub fn from_machine<D: DelaySource>(dm: &GameMachine<D>) -> Result<Self, HeistError> {
        let outcome = dm.outcome().ok_or(HeistError::UnfinishedMatch)?;
        let s = dm.session();
        Ok(Self {
            seed: dm.seed(),
            round_target: s.round_target,
            rounds: dm.records().to_vec(),
            red_score: s.red_score,
            blue_score: s.blue_score,
            outcome,
        })
    }

    pub fn to_json(&self) -> Result<String, HeistError> { Ok(serde_json::to_string(self)?) }
    pub fn from_json(s: &str) -> Result<Self, HeistError> { Ok(serde_json::from_str(s)?) }

    pub fn mean_reaction_ms(&self, player: Player) -> Option<u64> {
        let times: Vec<u64> = self.rounds.iter().filter(|r| r.winner == player).map(|r| r.reaction_ms).collect();
        if times.is_empty() { return None; }
        Some(times.iter().sum::<u64>() / times.len() as u64)
    }
}

/// Feeds the recorded rounds through a fresh machine and checks it lands on
/// the same scores and outcome.
pub fn replay_match(log: &MatchLog) -> Result<(), HeistError> {
    let delays: Vec<u64> = log.rounds.iter().map(|r| r.delay_ms).collect();
    let mut dm = GameMachine::new(ScriptedDelay::new(delays));
    let mut cues = Silent;
    dm.select_rounds(log.round_target);

    let mut now = 0;
    dm.start(now, &mut cues);
    for r in &log.rounds {
        for _ in 0..r.early_presses {
            dm.press(PlayerAction::RedPress, now, &mut cues);
        }
        now += r.delay_ms;
        dm.tick(now);
        now += r.reaction_ms;
        dm.press(r.winner.action(), now, &mut cues);
    }

    let s = dm.session();
    let actual = s.outcome();
    if dm.outcome().is_none() || actual != log.outcome || s.red_score != log.red_score || s.blue_score != log.blue_score {
        return Err(HeistError::ReplayMismatch {
            expected: log.outcome,
            actual,
            expected_red: log.red_score,
            expected_blue: log.blue_score,
            actual_red: s.red_score,
            actual_blue: s.blue_score,
        });
    }
    Ok(())
}
