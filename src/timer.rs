//! The measurement primitive every benchmark goes through.
//!
//! Counter reads are ordered energy, clock, cycles before the timed loop and
//! cycles, clock, energy after it. The cycle counter always sits next to the
//! timed loop.

use std::time::Instant;

use tracing::debug;

use crate::rapl::EnergySource;
use crate::result::{Category, Measurement};
use crate::util::tsc::read_cycles;

/// Iteration counts for one timed run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Workload {
	pub iterations: u64,
	pub warmup: u64,
}

impl Workload {
	pub const fn new(iterations: u64, warmup: u64) -> Self {
		Self { iterations, warmup }
	}

	/// Divides both counts, keeping at least one timed iteration
	///
	/// A zero warm-up stays zero.
	pub fn scaled_down(&self, divisor: u64) -> Self {
		let divisor = divisor.max(1);
		Self {
			iterations: (self.iterations / divisor).max(1),
			warmup: self.warmup / divisor,
		}
	}
}

/// Times `op` and reduces the counter deltas to per-iteration averages
///
/// `op` must issue the operation under test once per call. An iteration count
/// of zero is treated as one for the division, so the averages stay finite.
pub fn measure<F>(
	name: &str,
	category: Category,
	workload: Workload,
	energy: &dyn EnergySource,
	mut op: F,
) -> Measurement
where
	F: FnMut(),
{
	for _ in 0..workload.warmup {
		op();
	}

	let energy_start = energy.read_joules();
	let start_time = Instant::now();
	let start_cycles = read_cycles();

	for _ in 0..workload.iterations {
		op();
	}

	let end_cycles = read_cycles();
	let elapsed = start_time.elapsed();
	let energy_end = energy.read_joules();

	let divisor = workload.iterations.max(1) as f64;
	let (energy_start, energy_end, energy_available) = match (energy_start, energy_end) {
		(Some(start), Some(end)) => (start, end, true),
		_ => (0.0, 0.0, false),
	};

	let measurement = Measurement {
		name: name.to_string(),
		category,
		iterations: workload.iterations,
		avg_cycles: end_cycles.saturating_sub(start_cycles) as f64 / divisor,
		avg_time_ns: elapsed.as_nanos() as f64 / divisor,
		energy_start,
		energy_end,
		energy_consumed: energy_end - energy_start,
		energy_available,
	};

	debug!(
		name,
		cycles = measurement.avg_cycles,
		ns = measurement.avg_time_ns,
		joules = measurement.energy_consumed,
		"measurement finished"
	);

	measurement
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::cell::Cell;
	use std::hint::black_box;

	use crate::rapl::UnsupportedEnergySource;

	/// Returns a fixed sequence of readings, one per call
	#[derive(Debug)]
	struct ScriptedEnergy {
		readings: Vec<Option<f64>>,
		next: Cell<usize>,
	}

	impl EnergySource for ScriptedEnergy {
		fn read_joules(&self) -> Option<f64> {
			let idx = self.next.get();
			self.next.set(idx + 1);
			self.readings.get(idx).copied().flatten()
		}

		fn describe(&self) -> String {
			"scripted".to_string()
		}
	}

	#[test]
	fn op_runs_warmup_plus_iterations_times() {
		let mut calls = 0u64;
		let m = measure("count", Category::Basic, Workload::new(100, 10), &UnsupportedEnergySource, || {
			calls += 1;
		});
		assert_eq!(calls, 110);
		assert_eq!(m.iterations, 100);
	}

	#[test]
	fn energy_delta_uses_readings_around_the_loop() {
		let energy = ScriptedEnergy {
			readings: vec![Some(10.0), Some(12.5)],
			next: Cell::new(0),
		};
		let m = measure("energy", Category::Basic, Workload::new(10, 0), &energy, || {
			black_box(1u32);
		});
		assert!(m.energy_available);
		assert_eq!(m.energy_start, 10.0);
		assert_eq!(m.energy_end, 12.5);
		assert_eq!(m.energy_consumed, 2.5);
	}

	#[test]
	fn one_missing_reading_zeroes_both_ends() {
		let energy = ScriptedEnergy {
			readings: vec![Some(10.0), None],
			next: Cell::new(0),
		};
		let m = measure("partial", Category::Basic, Workload::new(10, 0), &energy, || {
			black_box(1u32);
		});
		assert!(!m.energy_available);
		assert_eq!(m.energy_consumed, 0.0);
		assert_eq!(m.energy_start, 0.0);
	}

	#[test]
	fn zero_iterations_stay_finite() {
		let m = measure("empty", Category::Basic, Workload::new(0, 0), &UnsupportedEnergySource, || {});
		assert!(m.avg_cycles.is_finite());
		assert!(m.avg_time_ns.is_finite());
	}

	#[test]
	fn scaled_workload_keeps_one_iteration() {
		let w = Workload::new(50, 5).scaled_down(1_000);
		assert_eq!(w, Workload::new(1, 0));
		let w = Workload::new(50_000_000, 5_000_000).scaled_down(10_000);
		assert_eq!(w, Workload::new(5_000, 500));
	}

	#[test]
	fn scaled_workload_follows_configured_warmup() {
		assert_eq!(Workload::new(1_000_000, 0).scaled_down(1_000).warmup, 0);
		assert_eq!(Workload::new(1_000_000, 900_000).scaled_down(1_000), Workload::new(1_000, 900));
	}
}
