pub mod channel_full_stall;
pub mod short_lived_channels;

use std::time::Duration;

use tracing::info;

/// Samples the process-wide tracker on a fixed interval and prints what it
/// finds.
pub(crate) struct Reporter {
    interval: Duration,
    rounds: u32,
    json: bool,
}

impl Reporter {
    pub(crate) fn new(interval: Duration, rounds: u32, json: bool) -> Self {
        Self {
            interval,
            rounds,
            json,
        }
    }

    pub(crate) async fn run(&self) -> Result<(), String> {
        let mut ticker = tokio::time::interval(self.interval);
        for round in 1..=self.rounds {
            ticker.tick().await;
            let reports = brim::sample();
            info!(
                round,
                queues = reports.len(),
                tracked = brim::Tracker::global().tracked(),
                "snapshot"
            );
            for report in &reports {
                if self.json {
                    let line = facet_json::to_string(report)
                        .map_err(|e| format!("failed to encode report: {e}"))?;
                    println!("{line}");
                } else {
                    info!(
                        call_site = %report.call_site,
                        len = report.len,
                        capacity = report.capacity,
                        full = report.level().is_full(),
                        "queue"
                    );
                }
            }
        }
        Ok(())
    }
}
