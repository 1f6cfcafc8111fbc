mod config;
mod manipulation;
pub mod manual;
mod ranking;

use log::debug;

use std::collections::{BTreeMap, BTreeSet, VecDeque};

pub use crate::config::*;
pub use crate::manipulation::{find_minimum_coalition, find_minimum_coalition_with_cancel};
pub use crate::ranking::{rank_all, RankMap, UNRANKED};

/// Tolerance when comparing fractional tallies.
const EPSILON: f64 = 1e-9;

// **** Private structures ****

/// Working view of one ballot during a tabulation run.
///
/// Invariant: the front unit, when present, only holds active alternatives.
/// Eliminated ids are stripped after every round, so the caller's ballots are
/// never touched and repeated runs cannot observe each other's state.
struct BallotCursor {
    units: VecDeque<Vec<AlternativeId>>,
}

impl BallotCursor {
    fn new(ballot: &Ballot, active: &BTreeSet<AlternativeId>) -> BallotCursor {
        let units = ballot
            .prefs
            .iter()
            .map(|p| match p {
                Preference::Single(id) => vec![*id],
                Preference::Tied(ids) => ids.clone(),
            })
            .collect();
        let mut cursor = BallotCursor { units };
        cursor.strip_front(active);
        cursor
    }

    /// Drops inactive ids from the front unit and discards units that end up
    /// empty, until a still-valid preference sits at the front or the ballot
    /// is exhausted.
    fn strip_front(&mut self, active: &BTreeSet<AlternativeId>) {
        while let Some(front) = self.units.front_mut() {
            front.retain(|id| active.contains(id));
            if front.is_empty() {
                self.units.pop_front();
            } else {
                break;
            }
        }
    }

    fn front(&self) -> Option<&[AlternativeId]> {
        self.units.front().map(|unit| unit.as_slice())
    }
}

/// Tabulates an election under the Single Transferable Vote elimination rule.
///
/// Each round, every non-exhausted ballot contributes one vote to its front
/// preference, split equally when the front is a tie group. The alternative
/// with the lowest tally is eliminated (smallest id on a tie) and ballots
/// advance past it. The count stops when one alternative remains or when all
/// remaining alternatives hold equal tallies, which is a declared tie.
///
/// The inputs are never mutated.
pub fn tabulate(
    ballots: &[Ballot],
    alternatives: &[Alternative],
) -> Result<Tabulation, VotingError> {
    if alternatives.is_empty() {
        return Err(VotingError::EmptyElection);
    }
    let mut active: BTreeSet<AlternativeId> = alternatives.iter().map(|a| a.id).collect();
    debug!(
        "tabulate: {} ballots, {} alternatives",
        ballots.len(),
        active.len()
    );

    let mut cursors: Vec<BallotCursor> = ballots
        .iter()
        .map(|b| BallotCursor::new(b, &active))
        .collect();
    let mut rounds: Vec<RoundStats> = Vec::new();

    while active.len() > 1 {
        let round = rounds.len() as u32 + 1;
        let tally = compute_tally(&cursors, &active);
        debug!("tabulate: round {} tally: {:?}", round, tally);

        // All remaining alternatives holding the same count is a declared
        // tie and ends the count with the active set unreduced.
        if is_full_tie(&tally) {
            rounds.push(RoundStats {
                round,
                tally: tally.into_iter().collect(),
                eliminated: None,
            });
            break;
        }

        let eliminated = lowest_alternative(&tally);
        debug!("tabulate: round {} eliminates {}", round, eliminated);
        active.remove(&eliminated);
        for cursor in cursors.iter_mut() {
            cursor.strip_front(&active);
        }
        rounds.push(RoundStats {
            round,
            tally: tally.into_iter().collect(),
            eliminated: Some(eliminated),
        });
    }

    Ok(Tabulation {
        winners: active.into_iter().collect(),
        rounds,
    })
}

/// One tally entry per active alternative; exhausted ballots contribute
/// nothing, a tie group at the front splits its vote equally.
fn compute_tally(
    cursors: &[BallotCursor],
    active: &BTreeSet<AlternativeId>,
) -> BTreeMap<AlternativeId, f64> {
    let mut tally: BTreeMap<AlternativeId, f64> = active.iter().map(|id| (*id, 0.0)).collect();
    for cursor in cursors {
        if let Some(front) = cursor.front() {
            let weight = 1.0 / front.len() as f64;
            for id in front {
                if let Some(votes) = tally.get_mut(id) {
                    *votes += weight;
                }
            }
        }
    }
    tally
}

fn is_full_tie(tally: &BTreeMap<AlternativeId, f64>) -> bool {
    let mut values = tally.values();
    match values.next() {
        None => true,
        Some(first) => values.all(|v| (v - first).abs() < EPSILON),
    }
}

/// The alternative to eliminate: smallest id among those tied (within
/// epsilon) for the minimum tally.
fn lowest_alternative(tally: &BTreeMap<AlternativeId, f64>) -> AlternativeId {
    let min = tally.values().cloned().fold(f64::INFINITY, f64::min);
    let (id, _) = tally
        .iter()
        .find(|(_, votes)| (**votes - min).abs() < EPSILON)
        .expect("tally of an active set is never empty");
    *id
}
