//! Closed option sets behind the run controls: agents, training budgets,
//! grid sizes, playback speeds, and the seed entry filter.

use core::fmt;

use crate::error::{Result, SlitherError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AgentKind {
    /// A* pathfinder. Needs no training.
    #[default]
    AStar,
    QLearning,
    Sarsa,
    Dqn,
    DoubleDqn,
}

impl AgentKind {
    /// Wire code understood by the simulation backend.
    pub fn code(self) -> &'static str {
        match self {
            AgentKind::AStar => "a*",
            AgentKind::QLearning => "q",
            AgentKind::Sarsa => "sarsa",
            AgentKind::Dqn => "dqn",
            AgentKind::DoubleDqn => "ddqn",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            AgentKind::AStar => "A* search",
            AgentKind::QLearning => "Q-learning",
            AgentKind::Sarsa => "SARSA",
            AgentKind::Dqn => "Deep Q-network",
            AgentKind::DoubleDqn => "Double DQN",
        }
    }

    pub fn parse(code: &str) -> Result<Self> {
        let code = code.trim();
        AgentKind::all()
            .iter()
            .copied()
            .find(|a| a.code().eq_ignore_ascii_case(code))
            .ok_or_else(|| SlitherError::UnknownAgent(code.to_string()))
    }

    /// Deep agents train slowly per episode, so they get the light budget set.
    pub fn is_deep(self) -> bool {
        matches!(self, AgentKind::Dqn | AgentKind::DoubleDqn)
    }

    pub fn budgets(self) -> &'static [TrainingBudget] {
        match self {
            AgentKind::AStar => &[TrainingBudget::NOT_APPLICABLE],
            a if a.is_deep() => LIGHT_BUDGETS,
            _ => HEAVY_BUDGETS,
        }
    }

    pub fn default_budget(self) -> TrainingBudget {
        self.budgets()[0]
    }

    pub fn all() -> &'static [AgentKind] {
        &[
            AgentKind::AStar,
            AgentKind::QLearning,
            AgentKind::Sarsa,
            AgentKind::Dqn,
            AgentKind::DoubleDqn,
        ]
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Training episode budget, as the label the backend expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrainingBudget(&'static str);

const LIGHT_BUDGETS: &[TrainingBudget] = &[
    TrainingBudget("100"),
    TrainingBudget("500"),
    TrainingBudget("1000"),
];

const HEAVY_BUDGETS: &[TrainingBudget] = &[
    TrainingBudget("1000"),
    TrainingBudget("10000"),
    TrainingBudget("50000"),
];

impl TrainingBudget {
    /// Sentinel sent for agents that do not train.
    pub const NOT_APPLICABLE: TrainingBudget = TrainingBudget("na");

    pub fn label(self) -> &'static str {
        self.0
    }

    pub fn is_applicable(self) -> bool {
        self != TrainingBudget::NOT_APPLICABLE
    }

    /// Human label for tables: "n/a" for the sentinel, the episode count otherwise.
    pub fn display(self) -> &'static str {
        if self.is_applicable() {
            self.0
        } else {
            "n/a"
        }
    }

    /// Resolve a label against the option set offered for `agent`.
    pub fn parse(agent: AgentKind, label: &str) -> Result<Self> {
        let label = label.trim();
        agent
            .budgets()
            .iter()
            .copied()
            .find(|b| b.0 == label)
            .ok_or_else(|| SlitherError::UnknownTraining {
                agent: agent.code(),
                label: label.to_string(),
            })
    }

    /// Keep `label` if `agent` offers it, otherwise fall back to the agent's default.
    pub fn resolve_or_default(agent: AgentKind, label: &str) -> Self {
        Self::parse(agent, label).unwrap_or_else(|_| agent.default_budget())
    }
}

/// Playable grid sizes. The stored value is the interior dimension; every
/// grid also has a one-cell wall border on each side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GridSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl GridSize {
    pub fn interior(self) -> u32 {
        match self {
            GridSize::Small => 3,
            GridSize::Medium => 6,
            GridSize::Large => 10,
        }
    }

    /// Side length including the border.
    pub fn total(self) -> u32 {
        self.interior() + 2
    }

    pub fn cell_count(self) -> u32 {
        self.total() * self.total()
    }

    /// Longest body the interior can hold.
    pub fn max_body_len(self) -> u32 {
        self.interior() * self.interior()
    }

    pub fn from_interior(n: u32) -> Result<Self> {
        GridSize::all()
            .iter()
            .copied()
            .find(|g| g.interior() == n)
            .ok_or(SlitherError::UnknownGridSize(n))
    }

    pub fn all() -> &'static [GridSize] {
        &[GridSize::Small, GridSize::Medium, GridSize::Large]
    }
}

impl fmt::Display for GridSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.total(), self.total())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Speed {
    #[default]
    X1,
    X2,
    X4,
}

impl Speed {
    pub const BASE_PERIOD_MS: u32 = 500;

    pub fn multiplier(self) -> u32 {
        match self {
            Speed::X1 => 1,
            Speed::X2 => 2,
            Speed::X4 => 4,
        }
    }

    pub fn next(self) -> Self {
        match self {
            Speed::X1 => Speed::X2,
            Speed::X2 => Speed::X4,
            Speed::X4 => Speed::X1,
        }
    }

    pub fn period_ms(self) -> u32 {
        Self::BASE_PERIOD_MS / self.multiplier()
    }

    pub fn label(self) -> &'static str {
        match self {
            Speed::X1 => "1x",
            Speed::X2 => "2x",
            Speed::X4 => "4x",
        }
    }

    pub fn from_multiplier(m: u32) -> Option<Self> {
        match m {
            1 => Some(Speed::X1),
            2 => Some(Speed::X2),
            4 => Some(Speed::X4),
            _ => None,
        }
    }
}

/// Whether `s` is an acceptable seed: empty, or an integer in `0..=999`
/// written without leading zeros.
pub fn is_valid_seed(s: &str) -> bool {
    let b = s.as_bytes();
    match b {
        [] => true,
        [b'0'] => true,
        [first, rest @ ..] => {
            rest.len() <= 2
                && (b'1'..=b'9').contains(first)
                && rest.iter().all(|c| c.is_ascii_digit())
        }
    }
}

/// Filter a seed edit: the proposed text replaces the current one only when
/// it is valid, otherwise the edit is dropped.
pub fn accept_seed_edit(current: &str, proposed: &str) -> String {
    if is_valid_seed(proposed) {
        proposed.to_string()
    } else {
        current.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_codes_round_trip_and_are_unique() {
        let mut codes: Vec<&str> = AgentKind::all().iter().map(|a| a.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), AgentKind::all().len());

        assert_eq!(AgentKind::parse("a*").unwrap(), AgentKind::AStar);
        assert_eq!(AgentKind::parse(" DQN ").unwrap(), AgentKind::Dqn);
        assert!(matches!(
            AgentKind::parse("ppo"),
            Err(SlitherError::UnknownAgent(_))
        ));
    }

    #[test]
    fn budget_sets_follow_agent_family() {
        assert_eq!(AgentKind::AStar.budgets(), &[TrainingBudget::NOT_APPLICABLE]);
        assert_eq!(AgentKind::Dqn.budgets(), LIGHT_BUDGETS);
        assert_eq!(AgentKind::DoubleDqn.budgets(), LIGHT_BUDGETS);
        assert_eq!(AgentKind::QLearning.budgets(), HEAVY_BUDGETS);
        assert_eq!(AgentKind::Sarsa.default_budget().label(), "1000");
        assert_eq!(TrainingBudget::NOT_APPLICABLE.display(), "n/a");
    }

    #[test]
    fn budget_resolution_falls_back_to_default() {
        let b = TrainingBudget::resolve_or_default(AgentKind::Dqn, "50000");
        assert_eq!(b.label(), "100");
        let b = TrainingBudget::resolve_or_default(AgentKind::QLearning, "50000");
        assert_eq!(b.label(), "50000");
        assert!(TrainingBudget::parse(AgentKind::AStar, "100").is_err());
    }

    #[test]
    fn grid_sizes_include_border() {
        assert_eq!(GridSize::Small.total(), 5);
        assert_eq!(GridSize::Small.cell_count(), 25);
        assert_eq!(GridSize::Large.max_body_len(), 100);
        assert_eq!(GridSize::from_interior(6).unwrap(), GridSize::Medium);
        assert_eq!(
            GridSize::from_interior(7),
            Err(SlitherError::UnknownGridSize(7))
        );
        assert_eq!(GridSize::Small.to_string(), "5x5");
    }

    #[test]
    fn speed_cycles_and_divides_period() {
        assert_eq!(Speed::X1.next(), Speed::X2);
        assert_eq!(Speed::X2.next(), Speed::X4);
        assert_eq!(Speed::X4.next(), Speed::X1);
        assert_eq!(Speed::X1.period_ms(), 500);
        assert_eq!(Speed::X4.period_ms(), 125);
    }

    #[test]
    fn seed_filter_accepts_only_canonical_integers() {
        for ok in ["", "0", "7", "10", "999", "120"] {
            assert!(is_valid_seed(ok), "{ok:?} should be accepted");
        }
        for bad in ["00", "01", "1000", "-1", "1a", " 1", "abc", "0 "] {
            assert!(!is_valid_seed(bad), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn seed_edits_are_dropped_when_invalid() {
        let mut seed = String::new();
        for proposed in ["4", "42", "420", "4201", "42", "042", ""] {
            seed = accept_seed_edit(&seed, proposed);
            assert!(is_valid_seed(&seed));
        }
        assert_eq!(seed, "");

        assert_eq!(accept_seed_edit("12", "12x"), "12");
        assert_eq!(accept_seed_edit("12", "123"), "123");
    }
}
