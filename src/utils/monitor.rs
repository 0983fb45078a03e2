#[cfg(feature = "cli")]
use std::sync::Mutex;
#[cfg(feature = "cli")]
use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

/// Resource usage of this process at one point of a retrieval run.
#[cfg(feature = "cli")]
#[derive(Debug, Clone)]
pub struct ResourceSample {
    pub cpu_percent: f32,
    pub rss_mb: u64,
    pub peak_rss_mb: u64,
    pub elapsed: Duration,
}

/// Refreshes only our own process entry, never the whole system table.
#[cfg(feature = "cli")]
struct ProcessSampler {
    system: System,
    pid: Pid,
    peak_rss_mb: u64,
}

#[cfg(feature = "cli")]
impl ProcessSampler {
    fn new() -> Option<Self> {
        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => pid,
            Err(e) => {
                tracing::warn!("Could not determine own PID, resource monitoring disabled: {}", e);
                return None;
            }
        };
        let mut sampler = Self {
            system: System::new(),
            pid,
            peak_rss_mb: 0,
        };
        // CPU usage is a delta, so prime it once
        sampler.refresh();
        Some(sampler)
    }

    fn refresh(&mut self) {
        self.system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[self.pid]),
            true,
            ProcessRefreshKind::nothing().with_cpu().with_memory(),
        );
    }

    fn sample(&mut self, started: Instant) -> Option<ResourceSample> {
        self.refresh();
        let process = self.system.process(self.pid)?;
        let rss_mb = process.memory() / 1024 / 1024;
        self.peak_rss_mb = self.peak_rss_mb.max(rss_mb);

        Some(ResourceSample {
            cpu_percent: process.cpu_usage(),
            rss_mb,
            peak_rss_mb: self.peak_rss_mb,
            elapsed: started.elapsed(),
        })
    }
}

/// Logs process CPU and memory after each retrieval step when enabled.
/// A disabled monitor holds no sysinfo state at all.
#[cfg(feature = "cli")]
pub struct SystemMonitor {
    sampler: Option<Mutex<ProcessSampler>>,
    started: Instant,
}

#[cfg(feature = "cli")]
impl SystemMonitor {
    pub fn new(enabled: bool) -> Self {
        let sampler = if enabled {
            ProcessSampler::new().map(Mutex::new)
        } else {
            None
        };
        Self {
            sampler,
            started: Instant::now(),
        }
    }

    pub fn sample(&self) -> Option<ResourceSample> {
        let mut sampler = self.sampler.as_ref()?.lock().ok()?;
        sampler.sample(self.started)
    }

    pub fn log_stats(&self, step: &str) {
        if let Some(sample) = self.sample() {
            tracing::info!(
                "{}: CPU {:.1}%, RSS {}MB (peak {}MB), {:?} elapsed",
                step,
                sample.cpu_percent,
                sample.rss_mb,
                sample.peak_rss_mb,
                sample.elapsed
            );
        }
    }

    pub fn log_final_stats(&self) {
        if let Some(sample) = self.sample() {
            tracing::info!(
                "Run finished in {:?}, peak RSS {}MB",
                sample.elapsed,
                sample.peak_rss_mb
            );
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.sampler.is_some()
    }
}

#[cfg(feature = "cli")]
impl Default for SystemMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}

// No-op when built without the cli feature
#[cfg(not(feature = "cli"))]
#[derive(Default)]
pub struct SystemMonitor;

#[cfg(not(feature = "cli"))]
impl SystemMonitor {
    pub fn new(_enabled: bool) -> Self {
        Self
    }

    pub fn log_stats(&self, _step: &str) {}

    pub fn log_final_stats(&self) {}

    pub fn is_enabled(&self) -> bool {
        false
    }
}
