//! Transition rules and the neighbor tally they consume

use super::grid::CellState;
use crate::error::{AutomatonError, Result};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Per-state count of a cell's in-bounds neighbors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeighborTally {
    counts: Vec<u32>,
}

impl NeighborTally {
    /// An all-zero tally with one entry per state
    pub fn new(states: u8) -> Self {
        Self {
            counts: vec![0; states as usize],
        }
    }

    pub fn from_counts(counts: Vec<u32>) -> Self {
        Self { counts }
    }

    /// Count one neighbor holding `state`
    pub fn record(&mut self, state: CellState) -> Result<()> {
        let states = self.counts.len();
        match self.counts.get_mut(state as usize) {
            Some(count) => {
                *count += 1;
                Ok(())
            }
            None => Err(AutomatonError::InvalidState {
                state: state.into(),
                states: states.min(u8::MAX as usize) as u8,
            }),
        }
    }

    /// Neighbors holding `state`; states beyond the tally count as zero
    pub fn count(&self, state: CellState) -> u32 {
        self.counts.get(state as usize).copied().unwrap_or(0)
    }

    /// Number of states this tally covers
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Number of neighbors counted across all states
    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.counts
    }
}

/// Computes a cell's next state from its current state and neighbor tally.
///
/// Rules are pure: the result depends only on the arguments.
pub trait TransitionRule: Send + Sync {
    fn next_state(&self, current: CellState, tally: &NeighborTally) -> CellState;

    /// Reject state counts this rule cannot operate on
    fn validate(&self, _states: u8) -> Result<()> {
        Ok(())
    }
}

impl<F> TransitionRule for F
where
    F: Fn(CellState, &NeighborTally) -> CellState + Send + Sync,
{
    fn next_state(&self, current: CellState, tally: &NeighborTally) -> CellState {
        self(current, tally)
    }
}

/// Conway's rule: born or survives on 3 live neighbors, survives on 2
pub fn game_of_life(current: CellState, tally: &NeighborTally) -> CellState {
    match (current, tally.count(1)) {
        (_, 3) | (1, 2) => 1,
        _ => 0,
    }
}

/// Cyclic succession: a cell at `k` advances to `k + 1` (mod states) when any
/// neighbor already holds `k + 1`, otherwise it keeps its state
pub fn cycle(current: CellState, tally: &NeighborTally) -> CellState {
    let states = tally.len().max(1);
    let successor = ((current as usize + 1) % states) as CellState;
    if tally.count(successor) > 0 {
        successor
    } else {
        current
    }
}

/// The standard transition rules.
///
/// Serialized as a string: `game_of_life`, `cycle`, or a rulestring like `B36/S23`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Rule {
    GameOfLife,
    Cycle,
    /// Two-state totalistic rule given by birth and survival neighbor counts
    LifeLike { birth: Vec<u32>, survival: Vec<u32> },
}

impl Rule {
    /// The `B3/S23` rule expressed as a life-like rule
    pub fn conway() -> Self {
        Rule::LifeLike {
            birth: vec![3],
            survival: vec![2, 3],
        }
    }

    /// Minimum number of states the rule reads from the tally
    pub fn min_states(&self) -> u8 {
        match self {
            Rule::GameOfLife | Rule::LifeLike { .. } => 2,
            Rule::Cycle => 1,
        }
    }
}

impl TransitionRule for Rule {
    fn next_state(&self, current: CellState, tally: &NeighborTally) -> CellState {
        match self {
            Rule::GameOfLife => game_of_life(current, tally),
            Rule::Cycle => cycle(current, tally),
            Rule::LifeLike { birth, survival } => {
                let live = tally.count(1);
                let counts = if current == 1 { survival } else { birth };
                CellState::from(counts.contains(&live))
            }
        }
    }

    fn validate(&self, states: u8) -> Result<()> {
        if states < self.min_states() {
            return Err(AutomatonError::config(format!(
                "Rule {} needs at least {} states, got {}",
                self,
                self.min_states(),
                states
            )));
        }
        if matches!(self, Rule::LifeLike { .. }) && states != 2 {
            return Err(AutomatonError::config(format!(
                "Rule {} is two-state only, got {} states",
                self, states
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::GameOfLife => write!(f, "game_of_life"),
            Rule::Cycle => write!(f, "cycle"),
            Rule::LifeLike { birth, survival } => {
                write!(f, "B{}/S{}", birth.iter().join(""), survival.iter().join(""))
            }
        }
    }
}

impl FromStr for Rule {
    type Err = AutomatonError;

    /// Parse `game_of_life`, `cycle`, or a rulestring such as `B36/S23`
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "game_of_life" | "life" | "gol" => return Ok(Rule::GameOfLife),
            "cycle" => return Ok(Rule::Cycle),
            _ => {}
        }

        let invalid = || AutomatonError::config(format!("Invalid rulestring: {}", s));
        let (birth, survival) = s.trim().split_once('/').ok_or_else(invalid)?;
        let birth = birth
            .strip_prefix(['B', 'b'])
            .ok_or_else(invalid)?;
        let survival = survival
            .strip_prefix(['S', 's'])
            .ok_or_else(invalid)?;

        let digits = |part: &str| -> Result<Vec<u32>> {
            part.chars()
                .map(|c| c.to_digit(10).filter(|&d| d <= 8).ok_or_else(invalid))
                .collect::<Result<Vec<_>>>()
                .map(|counts| counts.into_iter().sorted().dedup().collect())
        };

        Ok(Rule::LifeLike {
            birth: digits(birth)?,
            survival: digits(survival)?,
        })
    }
}

impl TryFrom<String> for Rule {
    type Error = AutomatonError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Rule> for String {
    fn from(rule: Rule) -> Self {
        rule.to_string()
    }
}
