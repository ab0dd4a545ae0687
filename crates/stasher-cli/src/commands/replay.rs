//! Replay command
//!
//! Usage: stasher replay [--input <FILE>] [--output <FILE>] [--config <FILE>]
//!
//! Each input line is one JSON event:
//! `{"name": "sql.active_record", "payload": {...}, "sequence_id": 1, "duration": 0.4}`.
//! Events named `stasher.scope` copy their payload into the scope store.

use clap::Args;
use stasher_core::core_types::schema::EVENT_SET_SCOPE;
use stasher_core::logging_facility::{self, Profile};
use stasher_core::sink::{FileSink, LineSink, WriterSink};
use stasher_core::{
    log_op_end, log_op_error, log_op_start, RawEvent, ScopeStore, StasherConfig, StasherError,
    Subscriber,
};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// JSON-lines event file (default: stdin)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Append records to this file (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the @source value
    #[arg(long)]
    pub source: Option<String>,

    /// Use a fixed @timestamp instead of the wall clock
    #[arg(long)]
    pub timestamp: Option<String>,

    /// Diagnostic log profile (development, production, test)
    #[arg(long, default_value = "production")]
    pub log_profile: Profile,
}

/// Execute replay command
pub fn execute(args: ReplayArgs) -> Result<(), Box<dyn std::error::Error>> {
    logging_facility::init(args.log_profile);

    let started = Instant::now();
    log_op_start!("replay");

    match run(&args) {
        Ok(count) => {
            log_op_end!(
                "replay",
                duration_ms = started.elapsed().as_millis() as u64,
                events = count as u64
            );
            Ok(())
        }
        Err(err) => {
            let message = err.to_string();
            log_op_error!(
                "replay",
                err,
                duration_ms = started.elapsed().as_millis() as u64
            );
            Err(message.into())
        }
    }
}

fn run(args: &ReplayArgs) -> Result<usize, StasherError> {
    let config = load_config(args)?;

    let sink: Arc<dyn LineSink> = match &args.output {
        Some(path) => {
            let file_sink =
                FileSink::append(path).map_err(|source| StasherError::SinkWrite { source })?;
            Arc::new(file_sink)
        }
        None => Arc::new(WriterSink::new(io::stdout())),
    };
    let subscriber = Subscriber::new(&config, sink);

    match &args.input {
        Some(path) => {
            let file = File::open(path).map_err(|source| StasherError::EventRead { source })?;
            replay(&subscriber, BufReader::new(file))
        }
        None => replay(&subscriber, io::stdin().lock()),
    }
}

fn load_config(args: &ReplayArgs) -> Result<StasherConfig, StasherError> {
    let mut config = match &args.config {
        Some(path) => StasherConfig::from_path(path)?,
        None => StasherConfig::default(),
    }
    .apply_env();

    if let Some(source) = &args.source {
        config = config.with_source(source.clone());
    }
    if let Some(timestamp) = &args.timestamp {
        config = config.with_timestamp(timestamp.clone());
    }
    Ok(config)
}

/// Dispatch every event in `reader`, returning how many were read
fn replay<R: BufRead>(subscriber: &Subscriber, reader: R) -> Result<usize, StasherError> {
    let mut scope = ScopeStore::new();
    let mut count = 0;

    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| StasherError::EventRead { source })?;
        if line.trim().is_empty() {
            continue;
        }

        let event: RawEvent =
            serde_json::from_str(&line).map_err(|e| StasherError::InvalidEvent {
                line: index + 1,
                reason: e.to_string(),
            })?;
        count += 1;

        if event.name == EVENT_SET_SCOPE {
            for (key, value) in event.payload.iter() {
                scope.set(key.clone(), value.clone());
            }
            continue;
        }
        subscriber.handle_in(&mut scope, &event);
    }

    tracing::debug!(events = count, "replay finished");
    Ok(count)
}
