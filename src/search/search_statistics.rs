use memory_stats::memory_stats;
use std::time::Instant;
use tracing::info;

/// Search progress counters with periodic logging. The engines feed it on
/// every expansion; f-jump and best-h events are reported as one-line
/// progress events.
#[derive(Debug)]
pub struct SearchStatistics {
    /// Number of nodes expanded
    expanded_nodes: i64,
    /// Number of nodes evaluated
    evaluated_nodes: i64,
    /// Number of successor states generated
    generated_nodes: i64,
    /// Number of closed nodes that were reopened
    reopened_nodes: i64,
    /// Counters at the time of the last f-jump
    lastjump_expanded: i64,
    lastjump_evaluated: i64,
    lastjump_generated: i64,
    lastjump_reopened: i64,
    lastjump_f_value: i32,
    /// Time when the search started
    search_start_time: Instant,
    /// Time when the last log was printed, used for periodic logging
    last_log_time: Instant,
    peak_memory_kb: Option<usize>,
}

impl Default for SearchStatistics {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchStatistics {
    pub fn new() -> Self {
        info!("starting search");
        Self {
            expanded_nodes: 0,
            evaluated_nodes: 0,
            generated_nodes: 0,
            reopened_nodes: 0,
            lastjump_expanded: 0,
            lastjump_evaluated: 0,
            lastjump_generated: 0,
            lastjump_reopened: 0,
            lastjump_f_value: -1,
            search_start_time: Instant::now(),
            last_log_time: Instant::now(),
            peak_memory_kb: None,
        }
    }

    pub fn expanded(&self) -> i64 {
        self.expanded_nodes
    }

    pub fn evaluated(&self) -> i64 {
        self.evaluated_nodes
    }

    pub fn generated(&self) -> i64 {
        self.generated_nodes
    }

    pub fn reopened(&self) -> i64 {
        self.reopened_nodes
    }

    pub fn search_duration(&self) -> std::time::Duration {
        self.search_start_time.elapsed()
    }

    pub fn inc_expanded(&mut self) {
        self.expanded_nodes += 1;
        self.log_if_needed();
    }

    pub fn inc_evaluated(&mut self) {
        self.evaluated_nodes += 1;
        self.log_if_needed();
    }

    pub fn inc_generated(&mut self) {
        self.generated_nodes += 1;
        self.log_if_needed();
    }

    pub fn inc_reopened(&mut self) {
        self.reopened_nodes += 1;
        self.log_if_needed();
    }

    /// Folds another phase's counters into this one; used by the iterated
    /// engine to report totals.
    pub fn absorb(&mut self, other: &SearchStatistics) {
        self.expanded_nodes += other.expanded_nodes;
        self.evaluated_nodes += other.evaluated_nodes;
        self.generated_nodes += other.generated_nodes;
        self.reopened_nodes += other.reopened_nodes;
        self.peak_memory_kb = self.peak_memory_kb.max(other.peak_memory_kb);
    }

    /// Reports an improvement of the best known heuristic value.
    pub fn report_h_progress(&mut self, best_h_values: &[i32]) {
        info!(best_heuristic_values = ?best_h_values, expanded = self.expanded_nodes);
    }

    /// Reports a jump of the minimum f value at the front of the queue.
    pub fn report_f_jump(&mut self, f: i32) {
        if f > self.lastjump_f_value {
            self.lastjump_f_value = f;
            info!(
                f,
                evaluated = self.evaluated_nodes,
                expanded = self.expanded_nodes,
                reopened = self.reopened_nodes,
                time = self.search_start_time.elapsed().as_secs_f64(),
            );
            self.lastjump_expanded = self.expanded_nodes;
            self.lastjump_evaluated = self.evaluated_nodes;
            self.lastjump_generated = self.generated_nodes;
            self.lastjump_reopened = self.reopened_nodes;
        }
    }

    fn log_if_needed(&mut self) {
        if self.last_log_time.elapsed().as_secs() > 10 {
            self.last_log_time = Instant::now();
            self.log();
        }
    }

    fn log(&mut self) {
        let memory_kb = memory_stats().map(|usage| usage.physical_mem / 1024);
        self.peak_memory_kb = self.peak_memory_kb.max(memory_kb);
        info!(
            expanded = self.expanded_nodes,
            evaluated = self.evaluated_nodes,
            generated = self.generated_nodes,
            reopened = self.reopened_nodes,
            memory_kb = memory_kb,
        );
    }

    pub fn finalise_search(&mut self) {
        self.log();
        info!(
            expanded = self.expanded_nodes,
            evaluated = self.evaluated_nodes,
            generated = self.generated_nodes,
            reopened = self.reopened_nodes,
            expanded_until_last_jump = self.lastjump_expanded,
            evaluated_until_last_jump = self.lastjump_evaluated,
            generated_until_last_jump = self.lastjump_generated,
            reopened_until_last_jump = self.lastjump_reopened,
            peak_memory_kb = self.peak_memory_kb,
            search_duration = self.search_start_time.elapsed().as_secs_f64(),
        );
    }
}
