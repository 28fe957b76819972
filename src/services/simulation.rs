use rand::RngCore;
use thiserror::Error;

/// Raised when a single Monte Carlo run cannot deplete its work within the
/// iteration cap, e.g. zero throughput against a nonzero backlog. Always
/// fatal to the whole run set.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("work could not be depleted within {limit} periods")]
pub struct OverflowError {
    pub limit: usize,
}

pub const DEFAULT_OVERFLOW_LIMIT: usize = 10_000;

/// Strategy object for one Monte Carlo simulation.
///
/// `run` drives the model through its lifecycle: `on_simulation_start`, then
/// per run `on_run_start`, one `initial_work_items` draw, repeated
/// `throughput_for_period` draws until the work is depleted, `run_metadata`
/// and `on_run_end`, and finally `on_simulation_end`. Work items and
/// throughput may be fractional during the loop.
///
/// Per-run accumulators must be reset in `on_run_start`; runs share no other
/// state.
pub trait MonteCarloModel {
    type Metadata;

    fn on_simulation_start(&mut self, _runs: usize) {}

    fn on_run_start(&mut self, _run_number: usize) {}

    /// The remaining work at the start of a run. Probabilistic draws for the
    /// run's work size happen here.
    fn initial_work_items(&mut self, rng: &mut dyn RngCore) -> f64;

    /// Work completed in the given period. Periods are numbered from 1.
    fn throughput_for_period(&mut self, period: usize, rng: &mut dyn RngCore) -> f64;

    /// Per-run details captured after the run finished, before `on_run_end`.
    fn run_metadata(&self) -> Option<Self::Metadata> {
        None
    }

    fn on_run_end(&mut self) {}

    fn on_simulation_end(&mut self) {}
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult<M> {
    /// 0-indexed run number, in run order.
    pub run_number: usize,
    pub periods: usize,
    pub metadata: Option<M>,
}

/// Counts the periods needed to deplete one draw of the model's work.
pub fn single_run<M: MonteCarloModel>(
    model: &mut M,
    overflow_limit: usize,
    rng: &mut dyn RngCore,
) -> Result<usize, OverflowError> {
    let mut remaining = model.initial_work_items(rng);
    let mut periods = 0;

    while remaining > 0.0 {
        periods += 1;
        if periods > overflow_limit {
            return Err(OverflowError {
                limit: overflow_limit,
            });
        }
        remaining -= model.throughput_for_period(periods, rng);
    }

    Ok(periods)
}

/// Runs the model `runs` times and collects the period count of each run.
/// An overflow in any run aborts the whole set.
pub fn run<M: MonteCarloModel>(
    model: &mut M,
    runs: usize,
    overflow_limit: usize,
    rng: &mut dyn RngCore,
) -> Result<Vec<SimulationResult<M::Metadata>>, OverflowError> {
    model.on_simulation_start(runs);

    let mut results = Vec::with_capacity(runs);
    for run_number in 0..runs {
        model.on_run_start(run_number);
        let periods = single_run(model, overflow_limit, rng)?;
        let metadata = model.run_metadata();
        model.on_run_end();
        results.push(SimulationResult {
            run_number,
            periods,
            metadata,
        });
    }

    model.on_simulation_end();
    Ok(results)
}
