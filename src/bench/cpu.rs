//! User CPU time accounting through `getrusage`

use crate::error::Result;

/// Whose CPU time to read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuScope {
    /// This process, all threads included
    Process,
    /// Terminated and waited-for child processes
    Children,
}

/// Accumulated user CPU time in seconds
#[cfg(unix)]
pub fn user_cpu_seconds(scope: CpuScope) -> Result<f64> {
    let who = match scope {
        CpuScope::Process => libc::RUSAGE_SELF,
        CpuScope::Children => libc::RUSAGE_CHILDREN,
    };

    let mut usage: libc::rusage = unsafe { std::mem::zeroed() };
    let rc = unsafe { libc::getrusage(who, &mut usage) };
    if rc != 0 {
        return Err(crate::error::AppError::benchmark(format!(
            "getrusage failed: {}",
            std::io::Error::last_os_error()
        )));
    }

    Ok(usage.ru_utime.tv_sec as f64 + usage.ru_utime.tv_usec as f64 / 1_000_000.0)
}

/// CPU accounting is not available; utilization is reported as zero
#[cfg(not(unix))]
pub fn user_cpu_seconds(_scope: CpuScope) -> Result<f64> {
    Ok(0.0)
}

/// CPU time over wall time, as a percentage of one CPU
pub fn utilization_percent(cpu_seconds: f64, wall_ms: f64) -> f64 {
    if wall_ms <= 0.0 {
        return 0.0;
    }
    (cpu_seconds * 1000.0 / wall_ms) * 100.0
}

/// CPU time consumed between two points
#[derive(Debug, Clone, Copy)]
pub struct CpuTimer {
    scope: CpuScope,
    start: f64,
}

impl CpuTimer {
    pub fn start(scope: CpuScope) -> Result<Self> {
        Ok(Self {
            scope,
            start: user_cpu_seconds(scope)?,
        })
    }

    /// Seconds consumed since `start`
    pub fn elapsed(&self) -> Result<f64> {
        Ok((user_cpu_seconds(self.scope)? - self.start).max(0.0))
    }
}
