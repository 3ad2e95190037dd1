use std::time::Duration;

use tracing::info;

use super::Reporter;

pub async fn run(reporter: &Reporter) -> Result<(), String> {
    let (work_tx, mut work_rx) = brim::channel!(16);
    let (events_tx, mut events_rx) = brim::channel!(64);

    let stalled_receiver = tokio::spawn(async move {
        info!("work receiver started but is intentionally not draining the queue");
        tokio::time::sleep(Duration::from_secs(3600)).await;
        let _ = work_rx.recv().await;
    });

    let bounded_sender = tokio::spawn(async move {
        for i in 0_u32..16 {
            if work_tx.send(i).await.is_err() {
                return;
            }
        }
        info!("work queue is full; the 17th send waits for a receiver that never comes");
        let _ = work_tx.send(16).await;
    });

    // Produces faster than it is consumed, so the events queue fills up over
    // a few snapshots.
    let fast_producer = tokio::spawn(async move {
        let mut seq = 0_u64;
        while events_tx.send(seq).await.is_ok() {
            seq += 1;
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    });

    let slow_consumer = tokio::spawn(async move {
        while events_rx.recv().await.is_some() {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    });

    reporter.run().await?;

    for task in [stalled_receiver, bounded_sender, fast_producer, slow_consumer] {
        task.abort();
    }
    Ok(())
}
