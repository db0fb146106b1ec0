// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Heap allocation tracking.
//!
//! Built with the `dhat-heap` feature, a running [`HeapProfiler`] lets an
//! [`AllocationProbe`] read `dhat` heap statistics around a measured region.
//! Without the feature, or with no profiler running, probes are absent and
//! results carry no allocation figures.
//!
//! `dhat` only sees allocations when `dhat::Alloc` is the global allocator,
//! which the `run_benchmarks` binary installs under the same feature. Host
//! tasks share the process, so per-call figures cover both ends of the call.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::metrics::AllocationMetrics;

static PROFILING: AtomicBool = AtomicBool::new(false);

/// Whether a heap profiler is currently running.
pub fn is_profiling() -> bool {
    PROFILING.load(Ordering::SeqCst)
}

/// Guard for the process-wide heap profiler.
///
/// The `dhat` report is written to the configured path when the guard drops.
pub struct HeapProfiler {
    #[cfg(feature = "dhat-heap")]
    _profiler: dhat::Profiler,
}

impl HeapProfiler {
    /// Start heap profiling. Returns `None` when built without `dhat-heap`.
    pub fn start(report_path: impl AsRef<Path>) -> Option<Self> {
        #[cfg(feature = "dhat-heap")]
        {
            let profiler = dhat::Profiler::builder()
                .file_name(report_path.as_ref())
                .build();
            PROFILING.store(true, Ordering::SeqCst);
            tracing::info!(report = %report_path.as_ref().display(), "Heap profiling enabled");
            Some(Self {
                _profiler: profiler,
            })
        }

        #[cfg(not(feature = "dhat-heap"))]
        {
            let _ = report_path;
            None
        }
    }
}

impl Drop for HeapProfiler {
    fn drop(&mut self) {
        PROFILING.store(false, Ordering::SeqCst);
    }
}

/// Heap statistics snapshot taken at the start of a measured region.
pub struct AllocationProbe {
    #[cfg(feature = "dhat-heap")]
    baseline: dhat::HeapStats,
}

impl AllocationProbe {
    /// Snapshot current heap totals, or `None` when no profiler is running.
    pub fn start() -> Option<Self> {
        if !is_profiling() {
            return None;
        }

        Some(Self {
            #[cfg(feature = "dhat-heap")]
            baseline: dhat::HeapStats::get(),
        })
    }

    /// Allocations since the snapshot, averaged over `operations`.
    pub fn finish(self, operations: u64) -> AllocationMetrics {
        #[cfg(feature = "dhat-heap")]
        let (blocks, bytes) = {
            let now = dhat::HeapStats::get();
            (
                now.total_blocks.saturating_sub(self.baseline.total_blocks),
                now.total_bytes.saturating_sub(self.baseline.total_bytes),
            )
        };

        #[cfg(not(feature = "dhat-heap"))]
        let (blocks, bytes) = (0, 0);

        AllocationMetrics::from_totals(blocks, bytes, operations)
    }
}

#[cfg(all(test, not(feature = "dhat-heap")))]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_without_feature() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(HeapProfiler::start(dir.path().join("dhat-heap.json")).is_none());
        assert!(!is_profiling());
        assert!(AllocationProbe::start().is_none());
    }
}
