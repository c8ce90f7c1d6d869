//! Performance Optimizer Domain Service
//!
//! Picks sequential or parallel dispatch and in-memory or streaming I/O for a
//! workload, and describes what a run cost when metrics are requested.

use std::time::Duration;

use serde::Serialize;

use crate::domain::value_objects::ComponentKind;

use super::cache::CacheStats;

/// Size of the work about to be dispatched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Workload {
    pub component_count: usize,
    pub file_count: usize,
    pub total_bytes: u64,
}

/// How components are dispatched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum Dispatch {
    Sequential,
    Parallel { workers: usize },
}

/// How file content moves to disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum IoMode {
    InMemory,
    Streaming { chunk_size: usize },
}

/// Selected execution strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExecutionPlan {
    pub dispatch: Dispatch,
    pub io: IoMode,
}

/// Optimizer thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptimizerSettings {
    /// Payloads above this many bytes stream in chunks
    pub streaming_threshold: u64,
    pub chunk_size: usize,
    /// Component counts above this go parallel
    pub parallel_threshold: usize,
    pub max_concurrency: usize,
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        Self {
            streaming_threshold: 10 * 1024 * 1024,
            chunk_size: 64 * 1024,
            parallel_threshold: 3,
            max_concurrency: 4,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PerformanceOptimizer {
    settings: OptimizerSettings,
}

impl PerformanceOptimizer {
    pub fn new(settings: OptimizerSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &OptimizerSettings {
        &self.settings
    }

    pub fn select_strategy(&self, workload: &Workload) -> ExecutionPlan {
        let io = if workload.total_bytes > self.settings.streaming_threshold {
            IoMode::Streaming {
                chunk_size: self.settings.chunk_size.max(1),
            }
        } else {
            IoMode::InMemory
        };

        let dispatch = if workload.component_count > self.settings.parallel_threshold
            && self.settings.max_concurrency > 1
        {
            Dispatch::Parallel {
                workers: self
                    .settings
                    .max_concurrency
                    .min(workload.component_count),
            }
        } else {
            Dispatch::Sequential
        };

        ExecutionPlan { dispatch, io }
    }
}

/// Wall-clock cost of one component
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentTiming {
    pub component: ComponentKind,
    pub duration_ms: u64,
    pub files: usize,
}

/// Metrics attached to a result when requested
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PerformanceReport {
    pub plan: ExecutionPlan,
    pub workload_bytes: u64,
    pub workload_files: usize,
    pub components: Vec<ComponentTiming>,
    pub total_ms: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
}

impl PerformanceReport {
    pub fn new(plan: ExecutionPlan, workload: &Workload) -> Self {
        Self {
            plan,
            workload_bytes: workload.total_bytes,
            workload_files: workload.file_count,
            components: Vec::new(),
            total_ms: 0,
            cache_hits: 0,
            cache_misses: 0,
        }
    }

    pub fn record(&mut self, component: ComponentKind, elapsed: Duration, files: usize) {
        self.components.push(ComponentTiming {
            component,
            duration_ms: elapsed.as_millis() as u64,
            files,
        });
    }

    pub fn finish(&mut self, total: Duration, cache: CacheStats) {
        self.total_ms = total.as_millis() as u64;
        self.cache_hits = cache.hits;
        self.cache_misses = cache.misses;
    }
}
