//! Teams and their rosters

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::core::types::{ActorId, TeamName};
use crate::grid::Coord;

/// Who issues a team's orders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Controller {
    #[default]
    Human,
    Ai,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Team {
    pub name: TeamName,
    pub display_name: String,
    /// Style tag for front ends
    pub tag: String,
    pub controller: Controller,
    members: Vec<ActorId>,
    /// Tiles this team has not seen yet
    pub fog: BTreeSet<Coord>,
}

impl Team {
    pub fn new(name: TeamName, display_name: impl Into<String>, controller: Controller) -> Self {
        let tag = format!("team-{}", name.as_str());
        Self {
            name,
            display_name: display_name.into(),
            tag,
            controller,
            members: Vec::new(),
            fog: BTreeSet::new(),
        }
    }

    pub fn members(&self) -> &[ActorId] {
        &self.members
    }

    pub fn contains(&self, id: ActorId) -> bool {
        self.members.contains(&id)
    }

    pub(crate) fn push(&mut self, id: ActorId) {
        if !self.contains(id) {
            self.members.push(id);
        }
    }

    pub(crate) fn remove(&mut self, id: ActorId) -> bool {
        let before = self.members.len();
        self.members.retain(|m| *m != id);
        self.members.len() != before
    }

    /// Defeated exactly when nobody is left
    pub fn is_defeated(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_ai(&self) -> bool {
        self.controller == Controller::Ai
    }

    /// Remove fog from every tile in `tiles`
    pub fn dispel_fog(&mut self, tiles: impl IntoIterator<Item = Coord>) {
        for tile in tiles {
            self.fog.remove(&tile);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership() {
        let mut team = Team::new(TeamName::allies(), "Allies", Controller::Human);
        assert!(team.is_defeated());
        team.push(ActorId(1));
        team.push(ActorId(1));
        assert_eq!(team.members(), &[ActorId(1)]);
        assert!(team.remove(ActorId(1)));
        assert!(!team.remove(ActorId(1)));
        assert!(team.is_defeated());
        assert_eq!(team.tag, "team-allies");
    }

    #[test]
    fn test_dispel_fog() {
        let mut team = Team::new(TeamName::enemies(), "Enemies", Controller::Ai);
        team.fog = [Coord::new(0, 0), Coord::new(1, 0)].into_iter().collect();
        team.dispel_fog([Coord::new(0, 0)]);
        assert_eq!(team.fog.len(), 1);
        assert!(team.is_ai());
    }
}
