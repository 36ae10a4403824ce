//! Execution engine for running table operations with configurable parallelism.
//!
//! This module sits "above" [`crate::processing`] and provides:
//!
//! - Parallel (chunked) execution for filter/map/agg
//! - Resource limits / throttling (in-flight chunks)
//! - Real-time metrics + observer hooks for monitoring
//!
//! Results are identical to the sequential operations in [`crate::processing`]: chunk
//! outputs are concatenated (or, for aggregation, merged) in chunk order.

mod observer;
mod semaphore;

use std::ops::Range;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use rayon::ThreadPool;
use rayon::ThreadPoolBuilder;

use crate::accessor::Accessor;
use crate::error::{TableError, TableResult};
use crate::processing::aggregate::Grouping;
use crate::processing::{reduce, AggOptions, AggSpec, ReduceOp};
use crate::types::{Record, Table, Value};

pub use observer::{
    ExecutionEvent, ExecutionMetrics, ExecutionMetricsSnapshot, ExecutionObserver, StdErrExecutionObserver,
};

use semaphore::Semaphore;

/// Configuration for the [`ExecutionEngine`].
#[derive(Debug, Clone)]
pub struct ExecutionOptions {
    /// Number of worker threads used by the engine.
    ///
    /// If `None`, uses the platform's available parallelism.
    pub num_threads: Option<usize>,
    /// Number of records per chunk.
    pub chunk_size: usize,
    /// Upper bound on concurrently executing chunks.
    ///
    /// This is an additional throttle on top of `num_threads`.
    pub max_in_flight_chunks: usize,
    /// Options for [`ExecutionEngine::agg_parallel`].
    pub agg: AggOptions,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        let n = available_threads();
        Self {
            num_threads: Some(n),
            chunk_size: 4_096,
            max_in_flight_chunks: n,
            agg: AggOptions::default(),
        }
    }
}

fn available_threads() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

/// A configurable execution engine for in-memory [`Table`] pipelines.
pub struct ExecutionEngine {
    pool: ThreadPool,
    opts: ExecutionOptions,
    observer: Option<Arc<dyn ExecutionObserver>>,
    metrics: Arc<ExecutionMetrics>,
}

impl ExecutionEngine {
    /// Create a new engine with the given options.
    ///
    /// Fails with [`TableError::InvalidArgument`] if `chunk_size == 0`,
    /// `max_in_flight_chunks == 0`, or `num_threads == Some(0)`.
    pub fn new(opts: ExecutionOptions) -> TableResult<Self> {
        if opts.chunk_size == 0 {
            return Err(TableError::invalid_argument("chunk_size must be > 0"));
        }
        if opts.max_in_flight_chunks == 0 {
            return Err(TableError::invalid_argument("max_in_flight_chunks must be > 0"));
        }
        if opts.num_threads == Some(0) {
            return Err(TableError::invalid_argument("num_threads must be > 0 when set"));
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(opts.num_threads.unwrap_or_else(available_threads))
            .build()?;

        Ok(Self {
            pool,
            opts,
            observer: None,
            metrics: Arc::new(ExecutionMetrics::new()),
        })
    }

    /// Attach an observer for execution events (metrics/logging).
    pub fn with_observer(mut self, observer: Arc<dyn ExecutionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Get a handle to real-time execution metrics.
    pub fn metrics(&self) -> Arc<ExecutionMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Execute a parallel filter over the table.
    pub fn filter_parallel<F>(&self, table: &Table, predicate: F) -> Table
    where
        F: Fn(&Record) -> bool + Send + Sync,
    {
        let (start, per_chunk) = self.run_chunks(table, |records| {
            let out: Vec<Record> = records
                .iter()
                .inspect(|_| self.metrics.on_row_processed())
                .filter(|record| predicate(record))
                .cloned()
                .collect();
            (out.len(), out)
        });
        let out: Table = per_chunk.into_iter().flatten().collect();
        self.finish_run(start);
        out
    }

    /// Execute a parallel map over the table.
    pub fn map_parallel<F>(&self, table: &Table, mapper: F) -> Table
    where
        F: Fn(&Record) -> Record + Send + Sync,
    {
        let (start, per_chunk) = self.run_chunks(table, |records| {
            let out: Vec<Record> = records
                .iter()
                .inspect(|_| self.metrics.on_row_processed())
                .map(&mapper)
                .collect();
            (out.len(), out)
        });
        let out: Table = per_chunk.into_iter().flatten().collect();
        self.finish_run(start);
        out
    }

    /// Parallel [`crate::processing::agg`]: each chunk builds a partial grouping, and the
    /// partials are merged in chunk order so the output matches a sequential run.
    pub fn agg_parallel(&self, table: &Table, spec: &AggSpec) -> TableResult<Table> {
        let mut merged = Grouping::new(spec)?;
        let (start, partials) = self.run_chunks(table, |records| {
            let partial = self.partial_grouping(spec, records);
            let groups = partial.as_ref().map_or(0, Grouping::group_count);
            (groups, partial)
        });

        for partial in partials {
            if let Err(e) = partial.and_then(|p| merged.merge(p)) {
                self.fail_run(start, &e);
                return Err(e);
            }
        }

        self.emit(ExecutionEvent::AggregateFinished {
            groups: merged.group_count(),
        });
        self.finish_run(start);
        Ok(merged.finish(&self.opts.agg))
    }

    fn partial_grouping<'s>(&self, spec: &'s AggSpec, records: &[Record]) -> TableResult<Grouping<'s>> {
        let mut grouping = Grouping::new(spec)?;
        for record in records {
            self.metrics.on_row_processed();
            grouping.update(record)?;
        }
        Ok(grouping)
    }

    /// Reduce a column using the built-in reduce operation.
    ///
    /// This is sequential, but is tracked via the observer/metrics hooks.
    pub fn reduce(&self, table: &Table, accessor: &Accessor<'_, Record>, op: ReduceOp) -> TableResult<Value> {
        let start = Instant::now();
        self.metrics.begin_run();
        self.emit(ExecutionEvent::RunStarted);
        self.emit(ExecutionEvent::ReduceStarted {
            accessor: format!("{accessor:?}"),
            op,
        });

        let out = reduce(&table.records, accessor, op);
        for _ in &table.records {
            self.metrics.on_row_processed();
        }

        self.emit(ExecutionEvent::ReduceFinished {
            result: out.as_ref().ok().cloned(),
        });
        match &out {
            Ok(_) => self.finish_run(start),
            Err(e) => self.fail_run(start, e),
        }
        out
    }

    /// Run `work` over every chunk of `table` on the pool, honoring the in-flight limit.
    ///
    /// `work` returns `(output_rows, result)`; results come back in chunk order, together
    /// with the run's start time.
    fn run_chunks<T, F>(&self, table: &Table, work: F) -> (Instant, Vec<T>)
    where
        T: Send,
        F: Fn(&[Record]) -> (usize, T) + Send + Sync,
    {
        let start = Instant::now();
        self.metrics.begin_run();
        self.emit(ExecutionEvent::RunStarted);

        let sem = Semaphore::new(self.opts.max_in_flight_chunks);
        let ranges = chunk_ranges(table.row_count(), self.opts.chunk_size);

        let out = self.pool.install(|| {
            ranges
                .into_par_iter()
                .map(|range| {
                    let permit = sem.acquire();
                    if permit.waited > Duration::ZERO {
                        self.metrics.on_throttle_wait(permit.waited);
                        self.emit(ExecutionEvent::ThrottleWaited {
                            duration: permit.waited,
                        });
                    }

                    self.metrics.on_chunk_start();
                    self.emit(ExecutionEvent::ChunkStarted {
                        start_row: range.start,
                        row_count: range.len(),
                    });

                    let (output_rows, out) = work(&table.records[range]);

                    self.metrics.on_rows_emitted(output_rows);
                    self.emit(ExecutionEvent::ChunkFinished { output_rows });
                    self.metrics.on_chunk_end();
                    drop(permit);
                    out
                })
                .collect::<Vec<T>>()
        });
        (start, out)
    }

    fn finish_run(&self, start: Instant) {
        let elapsed = start.elapsed();
        self.metrics.end_run(elapsed);
        self.emit(ExecutionEvent::RunFinished {
            elapsed,
            metrics: self.metrics.snapshot(),
        });
    }

    fn fail_run(&self, start: Instant, error: &TableError) {
        self.metrics.end_run(start.elapsed());
        self.emit(ExecutionEvent::RunFailed {
            message: error.to_string(),
        });
    }

    fn emit(&self, event: ExecutionEvent) {
        if let Some(obs) = &self.observer {
            obs.on_event(&event);
        }
    }
}

fn chunk_ranges(row_count: usize, chunk_size: usize) -> Vec<Range<usize>> {
    (0..row_count)
        .step_by(chunk_size)
        .map(|start| start..(start + chunk_size).min(row_count))
        .collect()
}
