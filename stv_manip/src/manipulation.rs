use itertools::Itertools;
use log::{debug, info};

use crate::config::{
    Alternative, AlternativeId, Ballot, Manipulation, Preference, SearchStatus, VotingError,
};
use crate::ranking::{rank_all, RankMap, UNRANKED};
use crate::tabulate;

/// Searches for the smallest coalition of voters able to force some other
/// alternative to win, while every coalition member sincerely prefers that
/// alternative to `true_winner`.
///
/// "Smallest" is defined by the enumeration order: prospective winners in
/// ascending id order, then coalition sizes from 1 to `max_size`, then
/// size-k subsets of the motivated voters in lexicographic order of voter
/// index. The first success wins.
///
/// Precondition: `true_winner` is the unique winner of the sincere
/// tabulation. The function re-checks it and reports a violation as
/// [`VotingError::SincereWinnerMismatch`]. Finding no coalition within the
/// bound is the `Ok(None)` outcome, not an error.
pub fn find_minimum_coalition(
    ballots: &[Ballot],
    alternatives: &[Alternative],
    true_winner: AlternativeId,
    max_size: usize,
) -> Result<Option<Manipulation>, VotingError> {
    let status =
        find_minimum_coalition_with_cancel(ballots, alternatives, true_winner, max_size, || false)?;
    match status {
        SearchStatus::Found(m) => Ok(Some(m)),
        _ => Ok(None),
    }
}

/// Same search as [`find_minimum_coalition`], polling `cancel` at the top of
/// every coalition-size iteration. The search is exponential in `max_size`;
/// the hook lets callers bound wall-clock time on large elections.
pub fn find_minimum_coalition_with_cancel<F>(
    ballots: &[Ballot],
    alternatives: &[Alternative],
    true_winner: AlternativeId,
    max_size: usize,
    mut cancel: F,
) -> Result<SearchStatus, VotingError>
where
    F: FnMut() -> bool,
{
    let sincere = tabulate(ballots, alternatives)?;
    if sincere.winners != [true_winner] {
        return Err(VotingError::SincereWinnerMismatch {
            claimed: true_winner,
            winners: sincere.winners,
        });
    }

    let ranks = rank_all(ballots, alternatives);

    let mut prospects: Vec<AlternativeId> = alternatives.iter().map(|a| a.id).collect();
    prospects.sort();

    for w in prospects {
        if w == true_winner {
            continue;
        }
        // Only voters who sincerely prefer w to the true winner would join a
        // coalition for w; without any, w is unreachable.
        let motivated: Vec<usize> = (0..ballots.len())
            .filter(|&voter| prefers(&ranks[voter], w, true_winner))
            .collect();
        if motivated.is_empty() {
            debug!(
                "find_minimum_coalition: no voter prefers {} over {}, skipping",
                w, true_winner
            );
            continue;
        }
        info!(
            "find_minimum_coalition: trying winner {}, {} motivated voters",
            w,
            motivated.len()
        );

        let fabricated = manipulated_ballot(w, true_winner, alternatives);

        for size in 1..=max_size {
            if cancel() {
                info!(
                    "find_minimum_coalition: cancelled at winner {}, size {}",
                    w, size
                );
                return Ok(SearchStatus::Cancelled);
            }
            debug!(
                "find_minimum_coalition: winner {}, coalitions of size {}",
                w, size
            );
            for coalition in motivated.iter().copied().combinations(size) {
                let rigged = apply_manipulation(ballots, &coalition, &fabricated);
                let outcome = tabulate(&rigged, alternatives)?;
                if outcome.winners == [w]
                    && coalition
                        .iter()
                        .all(|&voter| prefers(&ranks[voter], w, true_winner))
                {
                    info!(
                        "find_minimum_coalition: winner {} reachable with coalition {:?}",
                        w, coalition
                    );
                    return Ok(SearchStatus::Found(Manipulation {
                        winner: w,
                        size,
                        voters: coalition,
                        ballot: fabricated,
                    }));
                }
            }
        }
    }
    Ok(SearchStatus::Exhausted)
}

fn prefers(ranks: &RankMap, a: AlternativeId, b: AlternativeId) -> bool {
    let rank_a = ranks.get(&a).copied().unwrap_or(UNRANKED);
    let rank_b = ranks.get(&b).copied().unwrap_or(UNRANKED);
    rank_a < rank_b
}

/// The ballot every coalition member adopts: the prospective winner first,
/// the sincere winner last, everything else in ascending id order between
/// them. The middle order does not affect the outcome of the trials.
fn manipulated_ballot(
    winner: AlternativeId,
    true_winner: AlternativeId,
    alternatives: &[Alternative],
) -> Ballot {
    let mut middle: Vec<AlternativeId> = alternatives
        .iter()
        .map(|a| a.id)
        .filter(|id| *id != winner && *id != true_winner)
        .collect();
    middle.sort();

    let mut prefs = vec![Preference::Single(winner)];
    prefs.extend(middle.into_iter().map(Preference::Single));
    prefs.push(Preference::Single(true_winner));
    Ballot { prefs }
}

/// A fresh ballot set with the coalition's ballots replaced. The original is
/// left untouched; each trial tabulates its own copy.
fn apply_manipulation(ballots: &[Ballot], coalition: &[usize], fabricated: &Ballot) -> Vec<Ballot> {
    let mut rigged = ballots.to_vec();
    for &voter in coalition {
        rigged[voter] = fabricated.clone();
    }
    rigged
}
