use fishtank_core::FrameTiming;
use hdrhistogram::{CreationError, Histogram};
use log::info;
use std::time::Duration;

/// Frame work times, in microseconds.
pub struct FrameStats {
    histogram: Histogram<u64>,
    overruns: u64,
}

impl FrameStats {
    pub fn new() -> Result<Self, CreationError> {
        // 1µs to 60s, 3 significant figures
        let histogram = Histogram::new_with_bounds(1, 60_000_000, 3)?;
        Ok(Self { histogram, overruns: 0 })
    }

    pub fn record(&mut self, timing: &FrameTiming) {
        let micros = u64::try_from(timing.work.as_micros()).unwrap_or(u64::MAX);
        self.histogram.saturating_record(micros.max(1));
        if timing.overran {
            self.overruns += 1;
        }
    }

    pub fn frames(&self) -> u64 {
        self.histogram.len()
    }

    pub fn overruns(&self) -> u64 {
        self.overruns
    }

    pub fn percentile(&self, quantile: f64) -> Duration {
        Duration::from_micros(self.histogram.value_at_quantile(quantile))
    }

    pub fn log_summary(&self) {
        if self.frames() == 0 {
            info!("No frames were run");
            return;
        }
        info!(
            "{} frames, work time p50 {:?}, p99 {:?}, max {:?}; {} over budget",
            self.frames(),
            self.percentile(0.5),
            self.percentile(0.99),
            Duration::from_micros(self.histogram.max()),
            self.overruns
        );
    }
}
