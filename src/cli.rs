use std::path::PathBuf;

use clap::Parser;

/// `<program> <input.csv> <output.csv>` — replays a chronologically ordered
/// stream of order actions and writes the resulting order-event stream.
#[derive(Parser, Debug)]
#[command(name = "order-book-engine")]
#[command(version, about = "A price-time priority limit-order matching engine")]
pub struct Cli {
    /// Path to the input CSV of order actions.
    pub input: PathBuf,

    /// Path to the output CSV of order events.
    pub output: PathBuf,
}
