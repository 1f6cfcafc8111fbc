use log::{info, warn};

use snafu::{prelude::*, Snafu};

use std::collections::HashMap;
use std::fs;

use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use stv_manip::*;

use crate::args::Args;

#[derive(Debug, Snafu)]
pub enum ManipError {
    #[snafu(display("Error opening election file {path}"))]
    OpeningElection {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error opening summary file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display(""))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing summary file {path}"))]
    WritingSummary {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("The election could not be processed"))]
    Voting { source: VotingError },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type ManipResult<T> = Result<T, ManipError>;

pub mod reader {
    use super::*;
    use regex::Regex;
    use std::collections::{BTreeMap, HashSet};

    /// An election definition: the declared alternatives and one ballot per
    /// voter, ballot lines expanded by their count.
    #[derive(Eq, PartialEq, Debug, Clone)]
    pub struct ElectionData {
        pub alternatives: Vec<Alternative>,
        pub ballots: Vec<Ballot>,
    }

    pub fn read_election(path: &str) -> ManipResult<ElectionData> {
        let contents = fs::read_to_string(path).context(OpeningElectionSnafu { path })?;
        Ok(parse_election(&contents))
    }

    /// Parses the line-oriented election format.
    ///
    /// `# ALTERNATIVE NAME <id>: <name>` declares an alternative, a later
    /// declaration of the same id overriding the earlier one.
    /// `<count>: <preference-list>` expands into `count` ballots. Lines
    /// matching neither pattern are skipped; ballot-shaped lines with an
    /// invalid preference list are skipped with a warning.
    pub fn parse_election(contents: &str) -> ElectionData {
        let alternative_re =
            Regex::new(r"^# ALTERNATIVE NAME (\d+):\s*(.*)$").expect("alternative line pattern");
        let ballot_re = Regex::new(r"^(\d+)\s*:\s*(.*)$").expect("ballot line pattern");

        let mut alternatives: BTreeMap<u32, String> = BTreeMap::new();
        let mut ballots: Vec<Ballot> = Vec::new();

        for raw_line in contents.lines() {
            let line = raw_line.trim();
            if let Some(caps) = alternative_re.captures(line) {
                match caps[1].parse::<u32>() {
                    Ok(id) => {
                        alternatives.insert(id, caps[2].trim().to_string());
                    }
                    Err(_) => warn!("skipping alternative line with bad id: {}", line),
                }
                continue;
            }
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let caps = match ballot_re.captures(line) {
                Some(c) => c,
                None => continue,
            };
            let count = match caps[1].parse::<usize>() {
                Ok(c) => c,
                Err(_) => {
                    warn!("skipping ballot line with bad count: {}", line);
                    continue;
                }
            };
            match parse_preference_list(&caps[2]) {
                Some(prefs) => {
                    let ballot = Ballot { prefs };
                    for _ in 0..count {
                        ballots.push(ballot.clone());
                    }
                }
                None => warn!("skipping malformed ballot line: {}", line),
            }
        }

        ElectionData {
            alternatives: alternatives
                .into_iter()
                .map(|(id, name)| Alternative {
                    id: AlternativeId(id),
                    name,
                })
                .collect(),
            ballots,
        }
    }

    /// A preference list is a comma-separated sequence of integers and brace
    /// groups, e.g. `1,2,{4,5},3`. Returns None when the list is empty or
    /// malformed, or when an alternative appears twice.
    fn parse_preference_list(s: &str) -> Option<Vec<Preference>> {
        let mut prefs: Vec<Preference> = Vec::new();
        let mut seen: HashSet<u32> = HashSet::new();
        let mut rest = s.trim();
        if rest.is_empty() {
            return None;
        }
        loop {
            rest = rest.trim_start();
            if let Some(body) = rest.strip_prefix('{') {
                let end = body.find('}')?;
                let mut group: Vec<AlternativeId> = Vec::new();
                for part in body[..end].split(',') {
                    group.push(parse_id(part, &mut seen)?);
                }
                prefs.push(Preference::Tied(group));
                rest = &body[end + 1..];
            } else {
                let end = rest.find(',').unwrap_or(rest.len());
                prefs.push(Preference::Single(parse_id(&rest[..end], &mut seen)?));
                rest = &rest[end..];
            }
            rest = rest.trim_start();
            if rest.is_empty() {
                return Some(prefs);
            }
            rest = rest.strip_prefix(',')?;
        }
    }

    fn parse_id(token: &str, seen: &mut HashSet<u32>) -> Option<AlternativeId> {
        let id: u32 = token.trim().parse().ok()?;
        if !seen.insert(id) {
            return None;
        }
        Some(AlternativeId(id))
    }

    pub fn read_summary(path: &str) -> ManipResult<JSValue> {
        let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
        let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
        Ok(js)
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ElectionSummary {
    #[serde(rename = "numAlternatives")]
    pub num_alternatives: usize,
    #[serde(rename = "numBallots")]
    pub num_ballots: usize,
    #[serde(rename = "maxSize")]
    pub max_size: usize,
}

fn name_of(names: &HashMap<AlternativeId, String>, id: AlternativeId) -> String {
    names
        .get(&id)
        .cloned()
        .unwrap_or_else(|| format!("alternative {}", id))
}

fn round_stats_to_json(rounds: &[RoundStats], names: &HashMap<AlternativeId, String>) -> Vec<JSValue> {
    let mut l: Vec<JSValue> = Vec::new();
    for r in rounds.iter() {
        let mut tally: JSMap<String, JSValue> = JSMap::new();
        for (id, votes) in r.tally.iter() {
            tally.insert(name_of(names, *id), json!(format!("{:.6}", votes)));
        }
        let js = match r.eliminated {
            Some(id) => {
                json!({"round": r.round, "tally": tally, "eliminated": name_of(names, id)})
            }
            None => json!({"round": r.round, "tally": tally}),
        };
        l.push(js);
    }
    l
}

fn manipulation_to_json(
    record: &Option<Manipulation>,
    names: &HashMap<AlternativeId, String>,
) -> JSValue {
    match record {
        Some(m) => json!({
            "found": true,
            "winner": {"id": m.winner.0, "name": name_of(names, m.winner)},
            "size": m.size,
            "voters": m.voters,
            "ballot": m.ballot.to_string(),
        }),
        None => json!({"found": false}),
    }
}

fn build_summary_js(
    summary: &ElectionSummary,
    tabulation: &Tabulation,
    manipulation: Option<JSValue>,
    names: &HashMap<AlternativeId, String>,
) -> JSValue {
    let winners: Vec<JSValue> = tabulation
        .winners
        .iter()
        .map(|id| json!({"id": id.0, "name": name_of(names, *id)}))
        .collect();
    let mut js = json!({
        "election": summary,
        "winners": winners,
        "rounds": round_stats_to_json(&tabulation.rounds, names),
    });
    if let Some(m) = manipulation {
        js["manipulation"] = m;
    }
    js
}

pub fn run_app(args: &Args) -> ManipResult<()> {
    let mut data = reader::read_election(&args.input)?;
    if let Some(max) = args.max_voters {
        if data.ballots.len() > max {
            info!("keeping the first {} of {} ballots", max, data.ballots.len());
            data.ballots.truncate(max);
        }
    }
    info!(
        "election: {} alternatives, {} ballots",
        data.alternatives.len(),
        data.ballots.len()
    );

    let names: HashMap<AlternativeId, String> = data
        .alternatives
        .iter()
        .map(|a| (a.id, a.name.clone()))
        .collect();

    let tabulation = tabulate(&data.ballots, &data.alternatives).context(VotingSnafu {})?;
    for r in tabulation.rounds.iter() {
        let tallies: Vec<String> = r
            .tally
            .iter()
            .map(|(id, votes)| format!("{} {:.3}", name_of(&names, *id), votes))
            .collect();
        match r.eliminated {
            Some(id) => info!(
                "round {}: {} -> {} eliminated",
                r.round,
                tallies.join(", "),
                name_of(&names, id)
            ),
            None => info!(
                "round {}: {} -> tie among the remaining alternatives",
                r.round,
                tallies.join(", ")
            ),
        }
    }
    let winner_names: Vec<String> = tabulation
        .winners
        .iter()
        .map(|id| name_of(&names, *id))
        .collect();
    println!("Winner(s): {}", winner_names.join(", "));

    let manipulation_js = if args.tabulate_only {
        None
    } else if tabulation.winners.len() == 1 {
        let true_winner = tabulation.winners[0];
        let record =
            find_minimum_coalition(&data.ballots, &data.alternatives, true_winner, args.max_size)
                .context(VotingSnafu {})?;
        match record.as_ref() {
            Some(m) => {
                println!(
                    "Minimum manipulation: {} voter(s) electing {} with ballot {}",
                    m.size,
                    name_of(&names, m.winner),
                    m.ballot
                );
                println!("Coalition (voter indices): {:?}", m.voters);
            }
            None => {
                println!(
                    "No manipulating coalition of size <= {} exists",
                    args.max_size
                );
            }
        }
        Some(manipulation_to_json(&record, &names))
    } else {
        warn!("the sincere tabulation is tied, skipping the manipulation search");
        None
    };

    let summary = ElectionSummary {
        num_alternatives: data.alternatives.len(),
        num_ballots: data.ballots.len(),
        max_size: args.max_size,
    };
    let summary_js = build_summary_js(&summary, &tabulation, manipulation_js, &names);
    let pretty_js = serde_json::to_string_pretty(&summary_js).context(ParsingJsonSnafu {})?;

    match args.out.as_deref() {
        Some("stdout") => println!("{}", pretty_js),
        Some(path) => fs::write(path, &pretty_js).context(WritingSummarySnafu { path })?,
        None => {}
    }

    // The reference summary, if provided for comparison
    if let Some(reference_path) = args.reference.as_deref() {
        let reference = reader::read_summary(reference_path)?;
        let pretty_reference = serde_json::to_string_pretty(&reference).context(ParsingJsonSnafu {})?;
        if pretty_reference != pretty_js {
            warn!("Found differences with the reference summary");
            print_diff(pretty_reference.as_str(), pretty_js.as_str(), "\n");
            whatever!("Difference detected between computed summary and reference summary");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::reader::*;
    use stv_manip::*;

    const SAMPLE: &str = "\
# A center-squeeze electorate
# ALTERNATIVE NAME 1: Left
# ALTERNATIVE NAME 2: Center
# ALTERNATIVE NAME 3: Right

4: 1,2,3
3: 3,2,1
2: 2,3,1
";

    #[test]
    fn parses_alternatives_and_expands_counts() {
        let data = parse_election(SAMPLE);
        assert_eq!(data.alternatives.len(), 3);
        assert_eq!(data.alternatives[1].id, AlternativeId(2));
        assert_eq!(data.alternatives[1].name, "Center");
        assert_eq!(data.ballots.len(), 9);
        assert_eq!(format!("{}", data.ballots[0]), "1,2,3");
        assert_eq!(format!("{}", data.ballots[8]), "2,3,1");
    }

    #[test]
    fn expanded_ballots_are_independent_copies() {
        let mut data = parse_election("2: 1,2\n");
        data.ballots[0].prefs.clear();
        assert_eq!(format!("{}", data.ballots[1]), "1,2");
    }

    #[test]
    fn parses_tie_groups_and_whitespace() {
        let data = parse_election("2: 1 , {2 , 3} , 4\n");
        assert_eq!(data.ballots.len(), 2);
        assert_eq!(
            data.ballots[0].prefs,
            vec![
                Preference::Single(AlternativeId(1)),
                Preference::Tied(vec![AlternativeId(2), AlternativeId(3)]),
                Preference::Single(AlternativeId(4)),
            ]
        );
        assert_eq!(format!("{}", data.ballots[0]), "1,{2,3},4");
    }

    #[test]
    fn skips_malformed_lines() {
        let contents = "\
# ALTERNATIVE NAME 1: A
not an election line
3: 1,{2,3
2: 1,2,1
1: 1,,2
5:
1: 1,2
";
        let data = parse_election(contents);
        // Only the well-formed final ballot line survives.
        assert_eq!(data.ballots.len(), 1);
        assert_eq!(format!("{}", data.ballots[0]), "1,2");
        assert_eq!(data.alternatives.len(), 1);
    }

    #[test]
    fn later_alternative_declaration_wins() {
        let contents = "\
# ALTERNATIVE NAME 1: Old
# ALTERNATIVE NAME 1: New
";
        let data = parse_election(contents);
        assert_eq!(data.alternatives.len(), 1);
        assert_eq!(data.alternatives[0].name, "New");
    }

    #[test]
    fn zero_count_expands_to_nothing() {
        let data = parse_election("0: 1,2\n");
        assert!(data.ballots.is_empty());
    }

    #[test]
    fn end_to_end_tabulation_and_search() {
        let data = parse_election(SAMPLE);
        let tabulation = tabulate(&data.ballots, &data.alternatives).unwrap();
        assert_eq!(tabulation.winners, vec![AlternativeId(3)]);

        let record =
            find_minimum_coalition(&data.ballots, &data.alternatives, AlternativeId(3), 2)
                .unwrap()
                .expect("two left voters can rescue the center");
        assert_eq!(record.winner, AlternativeId(2));
        assert_eq!(record.voters, vec![0, 1]);
        assert_eq!(format!("{}", record.ballot), "2,1,3");
    }
}
