pub mod memory;
pub mod scalar;
pub mod simd;

use tracing::{error, warn};

use crate::error::Result;
use crate::rapl::EnergySource;
use crate::result::{Category, Measurement};
use crate::timer::{Workload, measure};
use crate::util::cpu::IsaFeature;

/// Shared context handed to every benchmark
#[derive(Debug, Clone, Copy)]
pub struct Harness<'a> {
	energy: &'a dyn EnergySource,
	workload: Workload,
}

impl<'a> Harness<'a> {
	pub fn new(energy: &'a dyn EnergySource, workload: Workload) -> Self {
		Self { energy, workload }
	}

	/// Iteration counts used for single-instruction benchmarks
	pub fn workload(&self) -> Workload {
		self.workload
	}

	/// Runs the measurement primitive against this harness's energy source
	pub fn time<F>(&self, name: &str, category: Category, workload: Workload, op: F) -> Measurement
	where
		F: FnMut(),
	{
		measure(name, category, workload, self.energy, op)
	}
}

/// One entry of the benchmark catalog
///
/// `run` receives its own entry back and labels the measurement with
/// `name` and `category`, so the catalog is the only place a label is spelled.
#[derive(Debug, Clone, Copy)]
pub struct Benchmark {
	pub name: &'static str,
	pub category: Category,
	pub requires: &'static [IsaFeature],
	pub run: fn(&Harness<'_>, &Benchmark) -> Result<Measurement>,
}

impl Benchmark {
	pub fn execute(&self, harness: &Harness<'_>) -> Result<Measurement> {
		(self.run)(harness, self)
	}

	/// The first required extension the running CPU lacks, if any
	pub fn missing_feature(&self) -> Option<IsaFeature> {
		self.requires.iter().copied().find(|feature| !feature.is_supported())
	}
}

/// The full suite, in execution order
pub fn catalog() -> Vec<Benchmark> {
	let mut benches = Vec::new();
	benches.extend_from_slice(scalar::ARITHMETIC);
	benches.extend_from_slice(scalar::LOGICAL);
	benches.extend_from_slice(scalar::SHIFT);
	benches.extend_from_slice(scalar::BASIC);
	benches.extend_from_slice(simd::INTEGER);
	benches.extend_from_slice(simd::FLOAT);
	benches.extend_from_slice(scalar::BIT_MANIPULATION);
	benches.extend_from_slice(memory::BENCHMARKS);
	benches.extend_from_slice(scalar::BRANCH);
	benches
}

/// Runs `benches` one after another
///
/// `on_category` fires whenever a new category starts. Benchmarks needing an
/// extension the CPU lacks are skipped, and a failing benchmark is logged and
/// left out of the results without stopping the rest.
pub fn run_suite<F>(harness: &Harness<'_>, benches: &[Benchmark], mut on_category: F) -> Vec<Measurement>
where
	F: FnMut(Category),
{
	let mut results = Vec::with_capacity(benches.len());
	let mut current = None;

	for bench in benches {
		if current != Some(bench.category) {
			on_category(bench.category);
			current = Some(bench.category);
		}

		if let Some(feature) = bench.missing_feature() {
			warn!(benchmark = bench.name, "skipped: CPU does not support {}", feature);
			continue;
		}

		match bench.execute(harness) {
			Ok(measurement) => results.push(measurement),
			Err(e) => error!(benchmark = bench.name, "benchmark aborted: {}", e),
		}
	}

	results
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::BenchError;
	use crate::rapl::UnsupportedEnergySource;

	fn failing(_: &Harness<'_>, _: &Benchmark) -> Result<Measurement> {
		Err(BenchError::Allocation { bytes: usize::MAX })
	}

	fn trivial(h: &Harness<'_>, bench: &Benchmark) -> Result<Measurement> {
		Ok(h.time(bench.name, bench.category, h.workload(), || {
			std::hint::black_box(());
		}))
	}

	#[test]
	fn catalog_names_are_unique_and_grouped() {
		let benches = catalog();
		let mut names: Vec<_> = benches.iter().map(|b| b.name).collect();
		names.sort_unstable();
		names.dedup();
		assert_eq!(names.len(), benches.len());

		// each category forms one contiguous run
		let mut seen = Vec::new();
		for bench in &benches {
			if seen.last() != Some(&bench.category) {
				assert!(!seen.contains(&bench.category), "{:?} split", bench.category);
				seen.push(bench.category);
			}
		}
		assert_eq!(seen, Category::ALL.to_vec());
	}

	#[test]
	fn failed_benchmark_does_not_stop_the_suite() {
		let benches = [
			Benchmark { name: "broken", category: Category::Memory, requires: &[], run: failing },
			Benchmark { name: "NOP", category: Category::Basic, requires: &[], run: trivial },
		];
		let harness = Harness::new(&UnsupportedEnergySource, Workload::new(10, 1));
		let mut headings = Vec::new();
		let results = run_suite(&harness, &benches, |c| headings.push(c));

		assert_eq!(results.len(), 1);
		assert_eq!(results[0].name, "NOP");
		assert_eq!(headings, vec![Category::Memory, Category::Basic]);
	}

	#[test]
	fn measurements_carry_the_catalog_label() {
		let benches = [Benchmark { name: "renamed", category: Category::Branch, requires: &[], run: trivial }];
		let harness = Harness::new(&UnsupportedEnergySource, Workload::new(10, 1));
		let results = run_suite(&harness, &benches, |_| {});

		assert_eq!(results[0].name, "renamed");
		assert_eq!(results[0].category, Category::Branch);
	}
}
