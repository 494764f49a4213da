use log_follow::{FollowConfig, follow};
use tokio_stream::StreamExt;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Read a file to its end and stop
    let mut stream = follow(FollowConfig::new("fixtures/static_lines.log")).await?;

    println!("Reading log file line by line...");

    let mut count = 0;
    while let Some(line) = stream.next().await {
        count += 1;
        println!("  [{}]: {}", count, line?);
    }

    println!("--- {} lines", count);
    Ok(())
}
