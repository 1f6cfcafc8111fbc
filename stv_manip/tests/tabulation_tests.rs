//! Integration tests for the STV tabulator: determinism, tie-break policy,
//! termination, and vote conservation across rounds.

use stv_manip::*;

// -----------------------------------------------------------------------
// Helpers
// -----------------------------------------------------------------------

fn alts(n: u32) -> Vec<Alternative> {
    (1..=n)
        .map(|i| Alternative {
            id: AlternativeId(i),
            name: format!("A{}", i),
        })
        .collect()
}

/// Builds a ballot from unit slices: a one-element slice is a Single unit,
/// anything longer a Tied group.
fn b(prefs: &[&[u32]]) -> Ballot {
    Ballot {
        prefs: prefs
            .iter()
            .map(|unit| match unit.len() {
                1 => Preference::Single(AlternativeId(unit[0])),
                _ => Preference::Tied(unit.iter().map(|i| AlternativeId(*i)).collect()),
            })
            .collect(),
    }
}

fn ids(xs: &[u32]) -> Vec<AlternativeId> {
    xs.iter().map(|i| AlternativeId(*i)).collect()
}

fn round_sum(r: &RoundStats) -> f64 {
    r.tally.iter().map(|(_, v)| v).sum()
}

// -----------------------------------------------------------------------
// Properties
// -----------------------------------------------------------------------

#[test]
fn tabulation_is_deterministic() {
    let mut ballots = vec![b(&[&[1], &[2], &[3]]); 3];
    ballots.extend(vec![b(&[&[2], &[3], &[1]]); 2]);
    ballots.extend(vec![b(&[&[3], &[1], &[2]]); 2]);
    let alternatives = alts(3);

    let first = tabulate(&ballots, &alternatives).unwrap();
    let second = tabulate(&ballots, &alternatives).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.winners, ids(&[3]));
}

#[test]
fn repeated_runs_do_not_corrupt_the_ballots() {
    let ballots = vec![b(&[&[1, 2], &[3]]), b(&[&[3], &[2]])];
    let pristine = ballots.clone();
    let alternatives = alts(3);

    for _ in 0..3 {
        tabulate(&ballots, &alternatives).unwrap();
    }
    assert_eq!(ballots, pristine);
}

#[test]
fn minimum_tie_eliminates_smallest_id() {
    // 2 and 3 are tied at the bottom of round 1; 2 must go first.
    let mut ballots = vec![b(&[&[1]]); 3];
    ballots.extend(vec![b(&[&[2]]); 2]);
    ballots.extend(vec![b(&[&[3]]); 2]);

    let result = tabulate(&ballots, &alts(3)).unwrap();
    assert_eq!(result.elimination_order(), ids(&[2, 3]));
    assert_eq!(result.winners, ids(&[1]));
}

#[test]
fn terminates_within_alternative_count_rounds() {
    let mut ballots = Vec::new();
    for i in 1..=5u32 {
        for _ in 0..i {
            ballots.push(b(&[&[i]]));
        }
    }
    let result = tabulate(&ballots, &alts(5)).unwrap();
    assert!(result.rounds.len() <= 4);
    assert_eq!(result.winners, ids(&[5]));
}

#[test]
fn tallies_sum_to_live_ballots_each_round() {
    // 12 ballots. Eliminating 2 exhausts two of them; eliminating 1 then
    // exhausts [1] and both [1,2] ballots, since 2 is already gone.
    let mut ballots = vec![b(&[&[1]])];
    ballots.extend(vec![b(&[&[2]]); 2]);
    ballots.extend(vec![b(&[&[3]]); 3]);
    ballots.extend(vec![b(&[&[4]]); 4]);
    ballots.extend(vec![b(&[&[1], &[2]]); 2]);

    let result = tabulate(&ballots, &alts(4)).unwrap();
    assert_eq!(result.elimination_order(), ids(&[2, 1, 3]));
    assert_eq!(result.winners, ids(&[4]));

    let sums: Vec<f64> = result.rounds.iter().map(round_sum).collect();
    let expected = [12.0, 10.0, 7.0];
    assert_eq!(sums.len(), expected.len());
    for (got, want) in sums.iter().zip(expected.iter()) {
        assert!((got - want).abs() < 1e-9, "sums {:?}", sums);
    }
}

#[test]
fn fractional_splits_conserve_the_vote() {
    // Front groups of different widths: each ballot still contributes
    // exactly 1.0 per round. Round 1 puts 4 at the bottom with 0.5; once it
    // is gone, 1, 2 and 3 all sit at 4/3 and the count stops on a tie.
    let ballots = vec![
        b(&[&[1, 2, 3], &[4]]),
        b(&[&[1, 4]]),
        b(&[&[2]]),
        b(&[&[3], &[1]]),
    ];
    let result = tabulate(&ballots, &alts(4)).unwrap();
    assert_eq!(result.elimination_order(), ids(&[4]));
    assert_eq!(result.winners, ids(&[1, 2, 3]));
    for r in result.rounds.iter() {
        assert!((round_sum(r) - 4.0).abs() < 1e-9);
    }
}
