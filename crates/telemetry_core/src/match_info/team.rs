//! Team rosters and colors.
//!
//! `StaticTeam` holds the fixed roster announced before kickoff;
//! `Team` holds the per-step dynamic state. Up to four player slots per
//! team may be populated; absent slots are `None`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::player::{Player, StaticPlayer};
use crate::error::MatchInfoError;

/// Per-platform metadata keyed by platform name, as loaded from the
/// additional-data JSON file.
pub type PlatformData = HashMap<String, Map<String, Value>>;

/// Team colors as defined by the game controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamColor {
    Blue,
    Red,
    Yellow,
    Black,
    White,
    Green,
    Orange,
    Purple,
    Brown,
    Gray,
}

/// Static information about a team, fixed for the whole match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticTeam {
    pub id: String,
    pub name: String,
    pub color: TeamColor,
    pub player1: Option<StaticPlayer>,
    pub player2: Option<StaticPlayer>,
    pub player3: Option<StaticPlayer>,
    pub player4: Option<StaticPlayer>,
}

impl StaticTeam {
    /// Player slots in order, 1-based slot number paired with the entry.
    pub fn player_slots(&self) -> [(u8, Option<&StaticPlayer>); 4] {
        [
            (1, self.player1.as_ref()),
            (2, self.player2.as_ref()),
            (3, self.player3.as_ref()),
            (4, self.player4.as_ref()),
        ]
    }

    fn fill_in_additional_player_data(
        &mut self,
        additional: &PlatformData,
    ) -> Result<(), MatchInfoError> {
        let players = [
            self.player1.as_mut(),
            self.player2.as_mut(),
            self.player3.as_mut(),
            self.player4.as_mut(),
        ];
        for player in players.into_iter().flatten() {
            let data = additional
                .get(&player.platform)
                .ok_or_else(|| MatchInfoError::PlatformDataNotFound(player.platform.clone()))?;
            for (key, value) in data {
                player.additional.insert(key.clone(), value.clone());
            }
        }
        Ok(())
    }
}

/// Static information about both teams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticTeams {
    pub team1: StaticTeam,
    pub team2: StaticTeam,
}

impl StaticTeams {
    pub fn get_teams(&self) -> (&StaticTeam, &StaticTeam) {
        (&self.team1, &self.team2)
    }

    pub fn get_team_by_id(&self, id: &str) -> Result<&StaticTeam, MatchInfoError> {
        [&self.team1, &self.team2]
            .into_iter()
            .find(|t| t.id == id)
            .ok_or_else(|| MatchInfoError::TeamIdNotFound(id.to_string()))
    }

    pub fn get_team_by_color(&self, color: TeamColor) -> Result<&StaticTeam, MatchInfoError> {
        [&self.team1, &self.team2]
            .into_iter()
            .find(|t| t.color == color)
            .ok_or(MatchInfoError::TeamColorNotFound(color))
    }

    pub fn blue(&self) -> Result<&StaticTeam, MatchInfoError> {
        self.get_team_by_color(TeamColor::Blue)
    }

    pub fn red(&self) -> Result<&StaticTeam, MatchInfoError> {
        self.get_team_by_color(TeamColor::Red)
    }

    /// Join per-platform metadata into every populated player slot, in
    /// place, by the player's `platform` key. A platform missing from the
    /// metadata map is an error; later keys replace earlier joined ones.
    pub fn fill_in_additional_player_data(
        &mut self,
        additional: &PlatformData,
    ) -> Result<(), MatchInfoError> {
        self.team1.fill_in_additional_player_data(additional)?;
        self.team2.fill_in_additional_player_data(additional)?;
        Ok(())
    }
}

/// Dynamic per-step team state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub player1: Option<Player>,
    pub player2: Option<Player>,
    pub player3: Option<Player>,
    pub player4: Option<Player>,
    #[serde(default)]
    pub score: u32,
    #[serde(default)]
    pub penalty_shots: u32,
    /// Bitfield: bit n set means penalty shot n was converted.
    #[serde(default)]
    pub single_shots: u32,
}

impl Team {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            player1: None,
            player2: None,
            player3: None,
            player4: None,
            score: 0,
            penalty_shots: 0,
            single_shots: 0,
        }
    }

    /// Player slots in order, 1-based slot number paired with the entry.
    pub fn player_slots(&self) -> [(u8, Option<&Player>); 4] {
        [
            (1, self.player1.as_ref()),
            (2, self.player2.as_ref()),
            (3, self.player3.as_ref()),
            (4, self.player4.as_ref()),
        ]
    }
}

/// Both teams' dynamic state in a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Teams {
    pub team1: Team,
    pub team2: Team,
}

impl Teams {
    pub fn get_team_by_id(&self, id: &str) -> Result<&Team, MatchInfoError> {
        [&self.team1, &self.team2]
            .into_iter()
            .find(|t| t.id == id)
            .ok_or_else(|| MatchInfoError::TeamIdNotFound(id.to_string()))
    }
}
