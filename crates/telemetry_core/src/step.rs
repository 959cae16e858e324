//! Per-simulation-step records and the match aggregation that holds them.

use serde::{Deserialize, Serialize};

use crate::error::MatchInfoError;
use crate::match_info::{Ball, StaticBall, StaticTeams, Teams};

/// Simulation time split into whole seconds and milliseconds,
/// as reported by the simulator clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimTime {
    pub seconds: u64,
    pub millis: u16,
}

impl SimTime {
    pub fn new(seconds: u64, millis: u16) -> Self {
        Self { seconds, millis }
    }

    /// Time as fractional seconds.
    pub fn as_secs_f64(&self) -> f64 {
        self.seconds as f64 + self.millis as f64 * 1e-3
    }
}

/// One recorded simulation step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub id: u64,
    pub time: SimTime,
    /// Wall-clock time the simulator spent computing this step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_to_calculate: Option<SimTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ball: Option<Ball>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teams: Option<Teams>,
}

impl Step {
    pub fn new(id: u64, time: SimTime) -> Self {
        Self { id, time, time_to_calculate: None, ball: None, teams: None }
    }
}

/// Match type as announced by the competition schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    KnockOut,
    RoundRobin,
    DropIn,
}

/// A recorded match: static setup plus the ordered step sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: String,
    pub match_type: MatchType,
    pub teams: StaticTeams,
    pub ball: StaticBall,
    pub steps: Vec<Step>,
}

impl Match {
    pub fn new(id: impl Into<String>, match_type: MatchType, teams: StaticTeams, ball: StaticBall) -> Self {
        Self { id: id.into(), match_type, teams, ball, steps: Vec::new() }
    }

    pub fn add_step(&mut self, step: Step) {
        self.steps.push(step);
    }

    pub fn current_step(&self) -> Result<&Step, MatchInfoError> {
        self.steps.last().ok_or(MatchInfoError::NoSteps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::match_info::{StaticTeam, TeamColor};

    fn empty_static_team(id: &str, color: TeamColor) -> StaticTeam {
        StaticTeam {
            id: id.to_string(),
            name: id.to_string(),
            color,
            player1: None,
            player2: None,
            player3: None,
            player4: None,
        }
    }

    fn test_match() -> Match {
        Match::new(
            "match_1",
            MatchType::RoundRobin,
            StaticTeams {
                team1: empty_static_team("a", TeamColor::Blue),
                team2: empty_static_team("b", TeamColor::Red),
            },
            StaticBall {
                id: "ball".to_string(),
                mass_kg: 0.5,
                texture: "plain".to_string(),
                diameter_m: 0.14,
            },
        )
    }

    #[test]
    fn test_sim_time_as_secs() {
        assert_eq!(SimTime::new(2, 500).as_secs_f64(), 2.5);
        assert_eq!(SimTime::new(0, 0).as_secs_f64(), 0.0);
    }

    #[test]
    fn test_current_step_requires_steps() {
        let mut m = test_match();
        assert!(m.current_step().is_err());

        m.add_step(Step::new(0, SimTime::new(0, 0)));
        m.add_step(Step::new(1, SimTime::new(0, 8)));
        assert_eq!(m.current_step().unwrap().id, 1);
    }
}
