use std::collections::HashMap;

use crate::config::{Alternative, AlternativeId, Ballot, Preference};

/// Rank given to every alternative a voter never mentioned, strictly worse
/// than any attainable rank.
pub const UNRANKED: u32 = u32::MAX;

/// A voter's rank for every alternative, 1 = most preferred. Alternatives in
/// one tie group share a rank.
pub type RankMap = HashMap<AlternativeId, u32>;

/// Derives the sincere rank map of every voter, in ballot order.
pub fn rank_all(ballots: &[Ballot], alternatives: &[Alternative]) -> Vec<RankMap> {
    ballots
        .iter()
        .map(|b| rank_ballot(b, alternatives))
        .collect()
}

fn rank_ballot(ballot: &Ballot, alternatives: &[Alternative]) -> RankMap {
    let mut ranks = RankMap::new();
    let mut position: u32 = 1;
    for pref in ballot.prefs.iter() {
        match pref {
            Preference::Single(id) => {
                ranks.insert(*id, position);
            }
            Preference::Tied(ids) => {
                for id in ids {
                    ranks.insert(*id, position);
                }
            }
        }
        // The counter advances once per unit, singleton or group.
        position += 1;
    }
    for a in alternatives.iter() {
        ranks.entry(a.id).or_insert(UNRANKED);
    }
    ranks
}
