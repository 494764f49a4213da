use log_follow::{FollowConfig, RecordingSink, follow_with_sink};
use std::fs::OpenOptions;
use std::io::Write;
use std::time::Duration;
use tokio_stream::StreamExt;

/// Follows a temporary file while it is appended to, rotated and truncated,
/// then prints the lines received and the diagnostics reported.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("demo.log");
    std::fs::write(&path, "started\n")?;

    let sink = RecordingSink::new();
    let config = FollowConfig::new(&path)
        .with_keep_trying(true)
        .with_poll_interval(Duration::from_millis(20));
    let mut stream = follow_with_sink(config, sink.clone()).await?;

    let writer_path = path.clone();
    let rotated_path = dir.path().join("demo.log.1");
    let writer = tokio::spawn(async move {
        let pause = || tokio::time::sleep(Duration::from_millis(100));

        pause().await;
        let mut file = OpenOptions::new().append(true).open(&writer_path)?;
        file.write_all(b"appended\nhalf a li")?;

        pause().await;
        std::fs::rename(&writer_path, &rotated_path)?;
        std::fs::write(&writer_path, "after rotation\n")?;

        pause().await;
        OpenOptions::new().write(true).open(&writer_path)?.set_len(0)?;
        // Shorter than the 15 bytes already read, so it counts as a truncation
        std::fs::write(&writer_path, "cut\n")?;
        std::io::Result::Ok(())
    });

    let mut received = 0;
    while received < 5 {
        match tokio::time::timeout(Duration::from_secs(2), stream.next()).await {
            Ok(Some(line)) => {
                received += 1;
                println!("line: {}", line?);
            }
            Ok(None) | Err(_) => break,
        }
    }
    writer.await??;

    println!("\nDiagnostics:");
    for event in sink.events() {
        println!("  {}", event);
    }

    Ok(())
}
