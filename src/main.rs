use std::time::Instant;

use clap::Parser;
use order_book_engine::cli::Cli;
use order_book_engine::csv_io::{ingest_and_process, write_events};
use order_book_engine::instrument_manager::InstrumentManager;
use order_book_engine::utils::Logger;
use tracing::{error, info};

const LOG_FILE: &str = "order_book_engine.log";

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("fatal error: {e}");
            eprintln!("fatal error: {e}");
            std::process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let started = Instant::now();
    let logger = Logger::open(LOG_FILE)?;
    let mut manager = InstrumentManager::new();

    info!(input = %cli.input.display(), "starting ingestion");
    let stats = ingest_and_process(&cli.input, &mut manager, |line, reason| {
        logger.log(format!("line {line}: {reason}"));
    })?;

    let events = manager.all_events();
    write_events(&cli.output, &events)?;

    logger.log(format!(
        "processed {} lines, emitted {} events, {} errors",
        stats.lines_processed,
        events.len(),
        stats.total_errors()
    ));

    println!("orders processed: {}", stats.lines_processed);
    println!("events generated: {}", events.len());
    println!("errors: {}", stats.total_errors());
    println!("wall time: {:.3}s", started.elapsed().as_secs_f64());

    Ok(())
}
