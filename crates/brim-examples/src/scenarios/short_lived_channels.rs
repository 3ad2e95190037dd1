use std::time::Duration;

use super::Reporter;

pub async fn run(reporter: &Reporter) -> Result<(), String> {
    let (keep_tx, _keep_rx) = brim::channel!(8);
    keep_tx
        .try_send("long-lived")
        .map_err(|e| format!("failed to prime long-lived queue: {e}"))?;

    // Every channel built here is dropped right away; snapshots stop listing
    // them and the tracked count settles back down as the sweeper catches up.
    let churn = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_millis(10));
        loop {
            ticker.tick().await;
            let (tx, rx) = brim::channel::<u64>(32);
            let _ = tx.try_send(1);
            drop((tx, rx));
        }
    });

    reporter.run().await?;
    churn.abort();
    Ok(())
}
