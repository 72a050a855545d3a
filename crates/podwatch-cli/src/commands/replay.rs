//! `podwatch replay` — Replay recorded pod events as change notifications.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, ValueEnum};
use podwatch_common::config::{InvalidEventPolicy, NotifierConfig, UpdateAction};
use podwatch_core::notifier::Notifier;
use podwatch_core::source::read_events;
use podwatch_core::transport::{ChannelTransport, LogTransport, Transport};
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc::UnboundedReceiver;

/// Arguments for the `replay` command.
#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Newline-delimited JSON event file, or `-` for stdin.
    #[arg(default_value = "-")]
    pub file: String,

    /// Path to a YAML notifier configuration file.
    #[arg(long, env = "PODWATCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Report updates with an `update` action instead of `add`.
    #[arg(long)]
    pub distinguish_updates: bool,

    /// Skip add/update notifications whose status did not change.
    #[arg(long)]
    pub suppress_unchanged: bool,

    /// What to do with a malformed event.
    #[arg(long, value_enum)]
    pub on_invalid: Option<OnInvalid>,

    /// Where change records are delivered.
    #[arg(long, value_enum, default_value_t = Sink::Stdout)]
    pub sink: Sink,
}

/// Delivery target for change records.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Sink {
    /// Write each payload as one line on stdout.
    #[default]
    Stdout,
    /// Only log payloads; nothing is written to stdout.
    Log,
}

/// Handling of malformed events.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OnInvalid {
    /// Abort the replay with an error.
    Fail,
    /// Log and continue with the next event.
    Skip,
}

impl From<OnInvalid> for InvalidEventPolicy {
    fn from(value: OnInvalid) -> Self {
        match value {
            OnInvalid::Fail => Self::Fail,
            OnInvalid::Skip => Self::Skip,
        }
    }
}

/// Counters reported at the end of a replay.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplayStats {
    /// Change records handed to the transport.
    pub emitted: usize,
    /// Updates dropped because their status was unchanged.
    pub suppressed: usize,
    /// Malformed events skipped.
    pub skipped: usize,
}

/// Executes the `replay` command.
///
/// With the stdout sink, payloads are written one per line by an async
/// delivery task while events are processed on a blocking worker. The log
/// sink only records each payload in the log.
///
/// # Errors
///
/// Returns an error if the input cannot be opened, the configuration is
/// invalid, or a contract violation occurs under the `fail` policy.
pub fn execute(args: ReplayArgs) -> anyhow::Result<()> {
    let config = resolve_config(&args)?;
    let reader = open_input(&args.file)?;

    let stats = match args.sink {
        Sink::Stdout => replay_to_stdout(reader, config)?,
        Sink::Log => {
            let mut notifier = Notifier::with_config(LogTransport, &config)?;
            replay_events(reader, &mut notifier, config.on_invalid)?
        }
    };

    tracing::info!(
        emitted = stats.emitted,
        suppressed = stats.suppressed,
        skipped = stats.skipped,
        "replay finished"
    );
    Ok(())
}

fn replay_to_stdout(
    reader: Box<dyn BufRead + Send>,
    config: NotifierConfig,
) -> anyhow::Result<ReplayStats> {
    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    runtime.block_on(async move {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let writer = tokio::spawn(deliver(rx));

        let replay = tokio::task::spawn_blocking(move || {
            let mut notifier = Notifier::with_config(ChannelTransport::new(tx), &config)?;
            replay_events(reader, &mut notifier, config.on_invalid)
        })
        .await?;

        writer.await?.context("failed to write payloads")?;
        replay
    })
}

fn resolve_config(args: &ReplayArgs) -> anyhow::Result<NotifierConfig> {
    let mut config = match &args.config {
        Some(path) => NotifierConfig::load(path)?,
        None => NotifierConfig::default(),
    };
    if args.distinguish_updates {
        config.update_action = UpdateAction::Update;
    }
    if args.suppress_unchanged {
        config.suppress_unchanged = true;
    }
    if let Some(policy) = args.on_invalid {
        config.on_invalid = policy.into();
    }
    config.validate()?;
    Ok(config)
}

fn open_input(file: &str) -> anyhow::Result<Box<dyn BufRead + Send>> {
    if file == "-" {
        return Ok(Box::new(BufReader::new(std::io::stdin())));
    }
    let handle = File::open(file).with_context(|| format!("cannot open event file: {file}"))?;
    Ok(Box::new(BufReader::new(handle)))
}

/// Feeds every event of `reader` through the notifier, in order.
fn replay_events<R: BufRead, T: Transport>(
    reader: R,
    notifier: &mut Notifier<T>,
    policy: InvalidEventPolicy,
) -> anyhow::Result<ReplayStats> {
    let mut stats = ReplayStats::default();
    for event in read_events(reader) {
        let event = match event {
            Ok(event) => event,
            Err(e) if e.is_contract_violation() && policy == InvalidEventPolicy::Skip => {
                tracing::error!(error = %e, "skipping malformed event");
                stats.skipped += 1;
                continue;
            }
            Err(e) if e.is_contract_violation() => {
                return Err(anyhow::Error::new(e).context("replay aborted on malformed event"));
            }
            Err(e) => return Err(e.into()),
        };
        match notifier.dispatch(&event)? {
            Some(_) => stats.emitted += 1,
            None => stats.suppressed += 1,
        }
    }
    Ok(stats)
}

async fn deliver(mut rx: UnboundedReceiver<Vec<u8>>) -> std::io::Result<()> {
    let mut stdout = tokio::io::stdout();
    while let Some(mut payload) = rx.recv().await {
        payload.push(b'\n');
        stdout.write_all(&payload).await?;
        stdout.flush().await?;
    }
    Ok(())
}
