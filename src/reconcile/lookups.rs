use std::collections::BTreeSet;

use crate::domain::{Player, Tournament, TournamentType};

/// Derived lookup rows shared by many entities, deduplicated before insert
#[derive(Debug, Default, PartialEq)]
pub struct LookupRows {
    pub countries: BTreeSet<String>,
    pub referees: BTreeSet<String>,
    pub tournament_types: BTreeSet<TournamentType>,
}

impl LookupRows {
    pub fn from_players<'a>(players: impl IntoIterator<Item = &'a Player>) -> Self {
        let countries = players
            .into_iter()
            .filter_map(|p| p.country.clone())
            .collect();

        Self {
            countries,
            ..Self::default()
        }
    }

    pub fn from_tournaments<'a>(tournaments: impl IntoIterator<Item = &'a Tournament>) -> Self {
        let mut rows = Self::default();
        for tournament in tournaments {
            rows.tournament_types.insert(tournament.listing.kind);
            rows.referees
                .extend(tournament.referees.iter().flatten().cloned());
        }
        rows
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty() && self.referees.is_empty() && self.tournament_types.is_empty()
    }
}
