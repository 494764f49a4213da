use clap::Parser;
use log_follow::{AcquirePolicy, FollowConfig, follow, poll_interval_from_secs};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio_stream::StreamExt;
use tracing_subscriber::EnvFilter;

/// Follows a file by name, not by file descriptor, like `tail -F`.
///
/// Handles file moves (rotations), deletions and truncations. Buffers on
/// newlines and strips them. Some content may be discarded during abnormal
/// events such as file rotations.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// File to follow
    #[arg(value_name = "PATH")]
    path: PathBuf,

    /// Sleep duration when waiting, in seconds
    #[arg(long, value_name = "SEC", default_value_t = 1.0)]
    sleep_time: f64,

    /// Keep retrying on end of file instead of exiting
    #[arg(long)]
    keep_trying: bool,

    /// Skip existing content and start at the end of the file
    #[arg(long)]
    from_tail: bool,

    /// Wait for the file to appear instead of failing when it is missing
    #[arg(long)]
    wait_for_file: bool,

    /// Also wake up on filesystem change notifications
    #[arg(long)]
    watch: bool,
}

impl Cli {
    fn into_config(self) -> log_follow::Result<FollowConfig> {
        let initial = if self.keep_trying || self.wait_for_file {
            AcquirePolicy::RetryForever
        } else {
            AcquirePolicy::FailFast
        };

        Ok(FollowConfig::new(self.path)
            .with_poll_interval(poll_interval_from_secs(self.sleep_time)?)
            .with_keep_trying(self.keep_trying)
            .with_from_tail(self.from_tail)
            .with_initial_acquire(initial)
            .with_wake_on_change(self.watch))
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(config: FollowConfig) -> log_follow::Result<()> {
    let mut stream = follow(config).await?;
    let stdout = std::io::stdout();

    while let Some(line) = stream.next().await {
        let line = line?;
        if writeln!(stdout.lock(), "{}", line).is_err() {
            // Reader of stdout went away
            break;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let config = match cli.into_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    tokio::select! {
        result = run(config) => match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                tracing::error!("{}", e);
                ExitCode::FAILURE
            }
        },
        _ = tokio::signal::ctrl_c() => ExitCode::SUCCESS,
    }
}
