use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::HeistError;

#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Player { Red, Blue }

#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PlayerAction { RedPress, BluePress }

impl PlayerAction {
    pub fn player(self) -> Player {
        match self {
            PlayerAction::RedPress => Player::Red,
            PlayerAction::BluePress => Player::Blue,
        }
    }
}

impl Player {
    pub fn action(self) -> PlayerAction {
        match self {
            Player::Red => PlayerAction::RedPress,
            Player::Blue => PlayerAction::BluePress,
        }
    }
}

/// Which screen the game is showing. Doubles as the Bevy app state.
#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "bevy", derive(bevy::prelude::States))]
pub enum Screen {
    #[default]
    Menu,
    Playing,
    GameOver,
}

#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Outcome { RedWins, BlueWins, Tie }

impl Outcome {
    pub fn from_scores(red: u32, blue: u32) -> Self {
        if red > blue { Outcome::RedWins }
        else if blue > red { Outcome::BlueWins }
        else { Outcome::Tie }
    }

    pub fn winner(self) -> Option<Player> {
        match self {
            Outcome::RedWins => Some(Player::Red),
            Outcome::BlueWins => Some(Player::Blue),
            Outcome::Tie => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Outcome::RedWins => "Red wins",
            Outcome::BlueWins => "Blue wins",
            Outcome::Tie => "Tie",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Player::Red => "Red",
            Player::Blue => "Blue",
        };
        write!(f, "{}", s)
    }
}

/// One-shot sound cues. The background loop is driven separately.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Cue { Grab, Fail, Win }

/// Number of rounds in a game. Only these four values are selectable.
#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum RoundTarget {
    Three,
    #[default]
    Five,
    Seven,
    Ten,
}

impl RoundTarget {
    pub const ALL: [RoundTarget; 4] = [RoundTarget::Three, RoundTarget::Five, RoundTarget::Seven, RoundTarget::Ten];

    pub fn get(self) -> u32 {
        match self {
            RoundTarget::Three => 3,
            RoundTarget::Five => 5,
            RoundTarget::Seven => 7,
            RoundTarget::Ten => 10,
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    /// Next option in the selector, wrapping around.
    pub fn next(self) -> Self { Self::ALL[(self.index() + 1) % Self::ALL.len()] }

    pub fn prev(self) -> Self { Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()] }
}

impl TryFrom<u32> for RoundTarget {
    type Error = HeistError;

    fn try_from(n: u32) -> Result<Self, Self::Error> {
        match n {
            3 => Ok(RoundTarget::Three),
            5 => Ok(RoundTarget::Five),
            7 => Ok(RoundTarget::Seven),
            10 => Ok(RoundTarget::Ten),
            other => Err(HeistError::InvalidRoundTarget(other)),
        }
    }
}

impl FromStr for RoundTarget {
    type Err = HeistError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let n: u32 = s.trim().parse().map_err(|_| HeistError::UnparsableRoundTarget(s.to_string()))?;
        RoundTarget::try_from(n)
    }
}

impl fmt::Display for RoundTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub round_target: RoundTarget,
    pub current_round: u32,
    pub red_score: u32,
    pub blue_score: u32,
    pub started: bool,
    pub over: bool,
}

impl Session {
    pub fn new(round_target: RoundTarget) -> Self {
        Self { round_target, current_round: 0, red_score: 0, blue_score: 0, started: false, over: false }
    }

    pub fn is_finished(&self) -> bool { self.current_round >= self.round_target.get() }

    pub fn score(&self, player: Player) -> u32 {
        match player {
            Player::Red => self.red_score,
            Player::Blue => self.blue_score,
        }
    }

    pub(crate) fn score_mut(&mut self, player: Player) -> &mut u32 {
        match player {
            Player::Red => &mut self.red_score,
            Player::Blue => &mut self.blue_score,
        }
    }

    pub fn outcome(&self) -> Outcome { Outcome::from_scores(self.red_score, self.blue_score) }
}

impl Default for Session {
    fn default() -> Self { Self::new(RoundTarget::default()) }
}

/// Per-round reaction gate.
#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoundState {
    pub unlocked: bool,
    pub unlocked_at_ms: Option<u64>,
}

impl RoundState {
    pub fn locked() -> Self { Self::default() }

    pub(crate) fn unlock(&mut self, now_ms: u64) {
        self.unlocked = true;
        self.unlocked_at_ms = Some(now_ms);
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoundRecord {
    /// 1-based round number.
    pub round: u32,
    pub delay_ms: u64,
    pub winner: Player,
    pub reaction_ms: u64,
    pub early_presses: u32,
}

/// What a key press did to the game.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PressResult {
    Accepted { player: Player, reaction_ms: u64 },
    TooEarly { player: Player },
    Ignored,
}
