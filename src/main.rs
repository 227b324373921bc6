//! Ed25519 Vanity Address Search CLI
//!
//! Usage:
//!   ed25519_vanity -p abc                 # Find an address starting with "abc"
//!   ed25519_vanity -p xyz -t suffix       # Find an address ending with "xyz"
//!   ed25519_vanity -p ab -s yz -n 5       # Find 5 addresses starting "ab" and ending "yz"
//!   ed25519_vanity -p sol -p Sun -i       # Either pattern, ignoring case

use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use log::{error, info, warn};

use ed25519_vanity::{Config, SearchEngine, SearchError, SearchResult, SearchSession};

/// Pause between polls when nothing was found.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

fn main() {
    let config = Config::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration error: {}", e);
        process::exit(1);
    }

    if let Err(e) = run(&config) {
        error!("{}", e);
        process::exit(1);
    }
}

fn run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let patterns = config.patterns();
    let base_seed = config.base_seed()?;
    let lanes = config.worker_count();

    // Print startup info
    println!("Ed25519 Vanity Address Search");
    println!("=============================");
    for (index, pattern) in patterns.iter().enumerate() {
        println!(
            "Pattern #{}: {} ({})",
            index,
            pattern,
            pattern.difficulty_description()
        );
    }
    println!("Lanes:      {}", lanes);
    println!("Batch size: {}", config.batch_size);
    println!("Target:     {} address(es)", config.count);
    println!();

    let engine = SearchEngine::cpu(lanes)?;
    let mut session = engine.start(base_seed, patterns)?;
    if config.count > 0 {
        session = session.with_result_cap(config.count);
    }

    // Set up ctrl-c handler
    let stop_flag = Arc::new(AtomicBool::new(false));
    ctrlc_handler(stop_flag.clone())?;

    println!("Searching... (Press Ctrl+C to stop)\n");

    let mut found = 0;
    let report_interval = Duration::from_secs(config.report_interval.max(1));
    let mut last_report = Instant::now();
    let mut batch_size = config.batch_size;

    loop {
        if stop_flag.load(Ordering::Relaxed) {
            println!("\nStopped by user.");
            break;
        }

        // Keep two batches queued so lanes never sit idle between polls
        while session.in_flight() < 2 {
            match session.dispatch_batch(batch_size, lanes) {
                Ok(_) => {}
                Err(SearchError::Executor(e)) if batch_size > 1 => {
                    batch_size /= 2;
                    warn!("{}; retrying with batch size {}", e, batch_size);
                }
                Err(e) => return Err(e.into()),
            }
        }

        let results = match session.collect() {
            Ok(results) => results,
            Err(SearchError::Executor(e)) => {
                warn!("{}", e);
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };

        if results.is_empty() {
            thread::sleep(POLL_INTERVAL);
        }

        for result in &results {
            found += 1;
            print_result(result, found);
        }

        if session.is_closed() {
            println!("\nTarget reached! Found {} address(es).", found);
            break;
        }

        if last_report.elapsed() >= report_interval {
            print_progress(&session);
            last_report = Instant::now();
        }
    }

    // Print final stats
    println!("\n--- Final Statistics ---");
    println!("Total keys evaluated: {}", format_number(session.total_evaluated()));
    println!("Total matches found:  {}", found);
    println!("Time elapsed:         {:.2}s", session.elapsed().as_secs_f64());
    println!(
        "Average speed:        {}/s",
        format_number(session.keys_per_second() as u64)
    );

    if !session.is_closed() {
        session.stop()?;
    }
    info!("search finished");

    Ok(())
}

fn print_result(result: &SearchResult, index: usize) {
    let keypair = result.keypair();
    println!("=== Match #{} ===", index);
    println!("Address:     {}", result.address);
    println!("Seed:        {}", result.seed_hex());
    println!("Keypair:     {}", keypair.keypair_base58());
    println!("Pattern:     #{}", result.matched_pattern_index);
    println!();
}

fn print_progress(session: &SearchSession) {
    let keys = session.total_evaluated();
    let rate = session.keys_per_second();
    let elapsed = session.elapsed().as_secs();

    println!(
        "[{:>4}s] Evaluated {} keys ({}/s)",
        elapsed,
        format_number(keys),
        format_number(rate as u64)
    );
}

fn format_number(n: u64) -> String {
    if n >= 1_000_000_000 {
        format!("{:.2}B", n as f64 / 1_000_000_000.0)
    } else if n >= 1_000_000 {
        format!("{:.2}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.2}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

fn ctrlc_handler(stop_flag: Arc<AtomicBool>) -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(move || {
        stop_flag.store(true, Ordering::Relaxed);
    })
}
