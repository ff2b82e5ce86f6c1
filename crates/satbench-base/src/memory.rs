//! Process memory probe.

use serde::{Deserialize, Serialize};

/// Memory usage snapshot of the current process, in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryUsage {
    /// Current resident set size.
    pub rss_bytes: u64,
    /// Peak resident set size since process start.
    pub peak_rss_bytes: u64,
}

impl MemoryUsage {
    /// Reads current usage (best effort, zeros where unsupported).
    #[must_use]
    pub fn current() -> Self {
        #[cfg(target_os = "linux")]
        {
            std::fs::read_to_string("/proc/self/status")
                .map(|status| Self::from_proc_status(&status))
                .unwrap_or_default()
        }
        #[cfg(not(target_os = "linux"))]
        {
            Self::default()
        }
    }

    /// Parses the `VmRSS`/`VmHWM` lines of a `/proc/<pid>/status` dump.
    #[must_use]
    pub fn from_proc_status(status: &str) -> Self {
        let mut usage = Self::default();
        for line in status.lines() {
            let mut parts = line.split_whitespace();
            let (Some(key), Some(value)) = (parts.next(), parts.next()) else {
                continue;
            };
            let bytes = value.parse::<u64>().unwrap_or(0) * 1024;
            match key {
                "VmRSS:" => usage.rss_bytes = bytes,
                "VmHWM:" => usage.peak_rss_bytes = bytes,
                _ => {}
            }
        }
        usage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_proc_status() {
        let status = "Name:\tsatbench\nVmHWM:\t    2048 kB\nVmRSS:\t    1024 kB\n";
        let usage = MemoryUsage::from_proc_status(status);
        assert_eq!(usage.rss_bytes, 1024 * 1024);
        assert_eq!(usage.peak_rss_bytes, 2048 * 1024);
    }
}
