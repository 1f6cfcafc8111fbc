use clap::Parser;

/// Tabulates a ranked election under the Single Transferable Vote rule, then
/// searches for the smallest coalition of voters able to force a different
/// alternative to win.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The election definition file. See the library
    /// documentation for the line-oriented format.
    #[clap(short, long, value_parser)]
    pub input: String,

    /// The largest coalition size explored by the manipulation search.
    #[clap(short, long, value_parser, default_value_t = 10)]
    pub max_size: usize,

    /// If specified, only the first N ballots of the election are kept.
    #[clap(long, value_parser)]
    pub max_voters: Option<usize>,

    /// Tabulate the sincere election only, skipping the manipulation search.
    #[clap(long, takes_value = false)]
    pub tabulate_only: bool,

    /// (file path, 'stdout' or empty) If specified, the summary of the run is
    /// written in JSON format to the given location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference summary in JSON format. If provided, stvmanip
    /// checks that the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
