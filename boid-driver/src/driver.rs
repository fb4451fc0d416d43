use anyhow::{bail, Context, Result};
use boid_core::FlockSimulation;
use boid_shared::StatusReport;
use std::io::Write;
use std::time::{Duration, Instant};

use crate::snapshot::snapshot;

/// Counts ticks and turns them into a ticks-per-second figure once per second
#[derive(Debug, Clone)]
pub struct TpsCounter {
    ticks: u32,
    window_start: Instant,
    tps: f64,
}

impl TpsCounter {
    pub fn new(now: Instant) -> Self {
        Self {
            ticks: 0,
            window_start: now,
            tps: 0.0,
        }
    }

    /// Records one tick. Returns the fresh rate when a window closed.
    pub fn record(&mut self, now: Instant) -> Option<f64> {
        self.ticks += 1;
        let elapsed = now.duration_since(self.window_start);
        if elapsed.as_secs() >= 1 {
            self.tps = self.ticks as f64 / elapsed.as_secs_f64();
            self.ticks = 0;
            self.window_start = now;
            Some(self.tps)
        } else {
            None
        }
    }

    pub fn tps(&self) -> f64 {
        self.tps
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriverOptions {
    /// Ticks per second; `0` runs unpaced.
    pub tick_rate: f64,
    /// Stop after this many ticks. `None` runs until the process is killed.
    pub max_ticks: Option<u64>,
    /// Write a snapshot every n ticks, plus one of the initial state.
    pub snapshot_every: Option<u64>,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            tick_rate: 60.0,
            max_ticks: None,
            snapshot_every: None,
        }
    }
}

impl DriverOptions {
    pub fn validate(&self) -> Result<()> {
        if !self.tick_rate.is_finite() || self.tick_rate < 0.0 {
            bail!("tick rate must be finite and not negative, got {}", self.tick_rate);
        }
        if self.snapshot_every == Some(0) {
            bail!("snapshot interval must be at least 1 tick");
        }
        Ok(())
    }

    fn tick_interval(&self) -> Option<Duration> {
        if self.tick_rate > 0.0 {
            Some(Duration::from_secs_f64(1.0 / self.tick_rate))
        } else {
            None
        }
    }
}

/// Drives a [`FlockSimulation`] one tick at a time.
///
/// Snapshots go to `sink` as JSON lines and are only taken between steps.
pub struct TickDriver<W: Write> {
    simulation: FlockSimulation,
    options: DriverOptions,
    sink: W,
    tps: TpsCounter,
}

impl<W: Write> TickDriver<W> {
    pub fn new(simulation: FlockSimulation, options: DriverOptions, sink: W) -> Self {
        Self {
            simulation,
            options,
            sink,
            tps: TpsCounter::new(Instant::now()),
        }
    }

    pub fn simulation(&self) -> &FlockSimulation {
        &self.simulation
    }

    pub fn status(&self) -> StatusReport {
        StatusReport {
            boid_count: self.simulation.len(),
            tick: self.simulation.tick_count(),
            tps: self.tps.tps(),
        }
    }

    pub fn into_sink(self) -> W {
        self.sink
    }

    /// Steps once, records the tick rate and writes a snapshot when one is due.
    pub fn tick(&mut self) -> Result<()> {
        self.simulation.step().context("Simulation step failed")?;

        if let Some(tps) = self.tps.record(Instant::now()) {
            log::info!("TPS: {:.2}", tps);
        }

        if let Some(every) = self.options.snapshot_every {
            if every > 0 && self.simulation.tick_count() % every == 0 {
                self.write_snapshot()?;
            }
        }

        Ok(())
    }

    /// Runs until the tick budget is spent.
    pub fn run(&mut self) -> Result<StatusReport> {
        self.options.validate()?;

        log::info!(
            "Starting tick loop: {} boids, {} ticks/s",
            self.simulation.len(),
            self.options.tick_rate
        );

        if self.options.snapshot_every.is_some() {
            self.write_snapshot()?;
        }

        let interval = self.options.tick_interval();
        let mut next_deadline = Instant::now();

        loop {
            if let Some(max) = self.options.max_ticks {
                if self.simulation.tick_count() >= max {
                    break;
                }
            }

            self.tick()?;

            if let Some(interval) = interval {
                next_deadline += interval;
                let now = Instant::now();
                if next_deadline > now {
                    std::thread::sleep(next_deadline - now);
                } else {
                    // Behind schedule: don't try to catch up with a burst.
                    next_deadline = now;
                }
            }
        }

        self.sink.flush().context("Failed to flush snapshot output")?;

        let status = self.status();
        log::info!(
            "Stopped after {} ticks ({} boids)",
            status.tick,
            status.boid_count
        );
        Ok(status)
    }

    fn write_snapshot(&mut self) -> Result<()> {
        let snap = snapshot(&self.simulation);
        serde_json::to_writer(&mut self.sink, &snap).context("Failed to write snapshot")?;
        writeln!(self.sink).context("Failed to write snapshot")?;
        log::debug!("Snapshot written at tick {}", snap.tick);
        Ok(())
    }
}
