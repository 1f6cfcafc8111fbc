// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

/// Identifier of an alternative, as declared in the election definition.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub struct AlternativeId(pub u32);

impl Display for AlternativeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One alternative of the election. The full set is fixed once loaded.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Alternative {
    pub id: AlternativeId,
    pub name: String,
}

/// One position on a ballot: either a single alternative or a non-empty
/// group of alternatives the voter ranks equally.
///
/// A singleton `Tied` group is semantically the same as a `Single`.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum Preference {
    Single(AlternativeId),
    Tied(Vec<AlternativeId>),
}

impl Preference {
    pub fn contains(&self, id: AlternativeId) -> bool {
        match self {
            Preference::Single(x) => *x == id,
            Preference::Tied(xs) => xs.contains(&id),
        }
    }
}

impl Display for Preference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Preference::Single(id) => write!(f, "{}", id),
            Preference::Tied(ids) => {
                write!(f, "{{")?;
                for (idx, id) in ids.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", id)?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// A single voter's ballot: preference units in order, front = most
/// preferred. Invariant: no alternative appears in more than one unit.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct Ballot {
    pub prefs: Vec<Preference>,
}

impl Display for Ballot {
    /// Renders the ballot in the election-file syntax, e.g. `1,2,{4,5},3`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (idx, pref) in self.prefs.iter().enumerate() {
            if idx > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", pref)?;
        }
        Ok(())
    }
}

// ******** Output data structures *********

/// Statistics for one elimination round.
#[derive(PartialEq, Debug, Clone)]
pub struct RoundStats {
    pub round: u32,
    /// Tally of every alternative still active this round, ascending by id,
    /// taken before the elimination.
    pub tally: Vec<(AlternativeId, f64)>,
    /// The alternative removed this round. `None` on a declared tie, which
    /// ends the count.
    pub eliminated: Option<AlternativeId>,
}

/// Outcome of one tabulation run.
#[derive(PartialEq, Debug, Clone)]
pub struct Tabulation {
    /// The surviving alternatives, ascending by id. A single element in the
    /// normal case, several on a declared tie.
    pub winners: Vec<AlternativeId>,
    pub rounds: Vec<RoundStats>,
}

impl Tabulation {
    /// The alternatives removed during the run, in elimination order.
    pub fn elimination_order(&self) -> Vec<AlternativeId> {
        self.rounds.iter().filter_map(|r| r.eliminated).collect()
    }
}

/// A successful manipulation: the coalition `voters` all submit `ballot`
/// and `winner` becomes the unique winner.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Manipulation {
    pub winner: AlternativeId,
    /// Voter indices of the coalition, ascending.
    pub voters: Vec<usize>,
    pub size: usize,
    pub ballot: Ballot,
}

/// Outcome of the cancellable search entry point.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum SearchStatus {
    Found(Manipulation),
    /// Every coalition up to the size bound was tried without success.
    Exhausted,
    /// The cancellation hook fired before the search completed.
    Cancelled,
}

/// Errors that prevent the algorithms from completing.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum VotingError {
    EmptyElection,
    /// Precondition of the manipulation search: the sincere tabulation must
    /// produce the claimed unique winner.
    SincereWinnerMismatch {
        claimed: AlternativeId,
        winners: Vec<AlternativeId>,
    },
}

impl Error for VotingError {}

impl Display for VotingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VotingError::EmptyElection => write!(f, "the election has no alternatives"),
            VotingError::SincereWinnerMismatch { claimed, winners } => write!(
                f,
                "the sincere tabulation does not elect {} as unique winner (winners: {:?})",
                claimed, winners
            ),
        }
    }
}
