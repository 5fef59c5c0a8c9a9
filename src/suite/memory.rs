//! Memory hierarchy probes.
//!
//! Each probe owns a `u32` working set sized for one cache level and reads
//! it through volatile loads, so the timed operation is "one array element"
//! instead of "one instruction".

use std::hint::black_box;
use std::ptr;

use crate::constants::*;
use crate::error::{BenchError, Result};
use crate::result::{Category, Measurement};
use crate::suite::{Benchmark, Harness};

pub const BENCHMARKS: &[Benchmark] = &[
	load_benchmark(MemoryLevel::L1, load_l1),
	load_benchmark(MemoryLevel::L2, load_l2),
	load_benchmark(MemoryLevel::L3, load_l3),
	load_benchmark(MemoryLevel::Ram, load_ram),
	Benchmark { name: "Memory STORE (L1)", category: Category::Memory, requires: &[], run: store_l1 },
];

const fn load_benchmark(level: MemoryLevel, run: fn(&Harness<'_>, &Benchmark) -> Result<Measurement>) -> Benchmark {
	Benchmark { name: level.load_label(), category: Category::Memory, requires: &[], run }
}

/// Target level of the memory hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryLevel {
	L1,
	L2,
	L3,
	Ram,
}

impl MemoryLevel {
	pub const ALL: [MemoryLevel; 4] = [MemoryLevel::L1, MemoryLevel::L2, MemoryLevel::L3, MemoryLevel::Ram];

	/// Working-set size in bytes
	pub fn bytes(&self) -> usize {
		match self {
			MemoryLevel::L1 => L1_WORKING_SET,
			MemoryLevel::L2 => L2_WORKING_SET,
			MemoryLevel::L3 => L3_WORKING_SET,
			MemoryLevel::Ram => RAM_WORKING_SET,
		}
	}

	/// Distance between consecutive accesses, in elements
	pub fn stride(&self) -> usize {
		match self {
			MemoryLevel::Ram => RAM_STRIDE,
			_ => 1,
		}
	}

	/// Factor the instruction iteration count is divided by
	pub fn iteration_divisor(&self) -> u64 {
		match self {
			MemoryLevel::Ram => RAM_ITERATION_DIVISOR,
			_ => CACHE_ITERATION_DIVISOR,
		}
	}

	/// Benchmark name of the load probe, also the key of the cache summary
	pub const fn load_label(&self) -> &'static str {
		match self {
			MemoryLevel::L1 => "Memory LOAD (L1)",
			MemoryLevel::L2 => "Memory LOAD (L2)",
			MemoryLevel::L3 => "Memory LOAD (L3)",
			MemoryLevel::Ram => "Memory LOAD (RAM)",
		}
	}

	/// Line prefix used in the cache hierarchy summary
	pub fn summary_label(&self) -> &'static str {
		match self {
			MemoryLevel::L1 => "L1 Cache Access:",
			MemoryLevel::L2 => "L2 Cache Access:",
			MemoryLevel::L3 => "L3 Cache Access:",
			MemoryLevel::Ram => "RAM Access:     ",
		}
	}
}

/// Allocates `bytes` worth of `u32`s, each holding its own index
///
/// Allocation failure is returned instead of aborting the process.
pub fn working_set(bytes: usize) -> Result<Vec<u32>> {
	let len = (bytes / std::mem::size_of::<u32>()).max(1);
	let mut data = Vec::new();
	data.try_reserve_exact(len).map_err(|_| BenchError::Allocation { bytes })?;
	data.extend((0..len).map(|i| i as u32));
	Ok(data)
}

/// Wrap-around mask for a working set of `len` elements
///
/// Only power-of-two lengths are accepted so the timed loop never divides.
pub fn index_mask(len: usize) -> Result<usize> {
	if !len.is_power_of_two() {
		return Err(BenchError::InvalidConfig(format!(
			"working set of {} elements is not a power of two",
			len
		)));
	}
	Ok(len - 1)
}

/// Times `sum += data[(i * stride) & mask]` over a working set of `bytes`
///
/// `bytes / 4` has to be a power of two.
pub fn load(h: &Harness<'_>, label: &str, bytes: usize, stride: usize, divisor: u64) -> Result<Measurement> {
	let data = working_set(bytes)?;
	let mask = index_mask(data.len())?;
	let workload = h.workload().scaled_down(divisor);

	let mut i = 0usize;
	let mut sum = 0u32;
	let measurement = h.time(label, Category::Memory, workload, || {
		let idx = i.wrapping_mul(stride) & mask;
		// SAFETY: idx <= mask < len, so the reference is in bounds and aligned
		sum = sum.wrapping_add(unsafe { ptr::read_volatile(&data[idx]) });
		i = i.wrapping_add(1);
	});
	black_box(sum);

	Ok(measurement)
}

fn load_level(h: &Harness<'_>, bench: &Benchmark, level: MemoryLevel) -> Result<Measurement> {
	load(h, bench.name, level.bytes(), level.stride(), level.iteration_divisor())
}

fn load_l1(h: &Harness<'_>, bench: &Benchmark) -> Result<Measurement> {
	load_level(h, bench, MemoryLevel::L1)
}

fn load_l2(h: &Harness<'_>, bench: &Benchmark) -> Result<Measurement> {
	load_level(h, bench, MemoryLevel::L2)
}

fn load_l3(h: &Harness<'_>, bench: &Benchmark) -> Result<Measurement> {
	load_level(h, bench, MemoryLevel::L3)
}

fn load_ram(h: &Harness<'_>, bench: &Benchmark) -> Result<Measurement> {
	load_level(h, bench, MemoryLevel::Ram)
}

fn store_l1(h: &Harness<'_>, bench: &Benchmark) -> Result<Measurement> {
	let mut data = working_set(L1_WORKING_SET)?;
	let mask = index_mask(data.len())?;
	let workload = h.workload().scaled_down(CACHE_ITERATION_DIVISOR);

	let mut i = 0usize;
	let measurement = h.time(bench.name, bench.category, workload, || {
		let idx = i & mask;
		// SAFETY: idx <= mask < len, so the reference is in bounds and aligned
		unsafe { ptr::write_volatile(&mut data[idx], i as u32) };
		i = i.wrapping_add(1);
	});
	black_box(&data);

	Ok(measurement)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::rapl::UnsupportedEnergySource;
	use crate::timer::Workload;

	#[test]
	fn working_set_is_filled_with_indices() {
		let data = working_set(64).unwrap();
		assert_eq!(data, (0..16).collect::<Vec<u32>>());
	}

	#[test]
	fn impossible_allocation_is_reported() {
		let err = working_set(usize::MAX).unwrap_err();
		assert_eq!(err, BenchError::Allocation { bytes: usize::MAX });
	}

	#[test]
	fn levels_grow_monotonically() {
		let sizes: Vec<usize> = MemoryLevel::ALL.iter().map(MemoryLevel::bytes).collect();
		assert!(sizes.windows(2).all(|w| w[0] < w[1]));
		assert_eq!(MemoryLevel::Ram.stride(), 1024);
	}

	#[test]
	fn load_uses_scaled_iterations() {
		let harness = Harness::new(&UnsupportedEnergySource, Workload::new(100_000, 10_000));
		let m = load(&harness, "tiny", 4096, 1, 1_000).unwrap();
		assert_eq!(m.iterations, 100);
		assert!(m.avg_cycles.is_finite() && m.avg_cycles >= 0.0);
	}

	#[test]
	fn store_probe_runs() {
		let harness = Harness::new(&UnsupportedEnergySource, Workload::new(100_000, 10_000));
		let store = BENCHMARKS.iter().find(|b| b.name == "Memory STORE (L1)").unwrap();
		let m = store.execute(&harness).unwrap();
		assert_eq!(m.name, "Memory STORE (L1)");
		assert_eq!(m.iterations, 100);
	}

	#[test]
	fn every_level_has_a_maskable_working_set() {
		for level in MemoryLevel::ALL {
			let len = level.bytes() / std::mem::size_of::<u32>();
			assert_eq!(index_mask(len).unwrap(), len - 1, "{:?}", level);
		}
		assert_eq!(index_mask(L1_WORKING_SET / std::mem::size_of::<u32>()).unwrap(), 8191);
	}

	#[test]
	fn odd_working_set_is_rejected() {
		assert!(matches!(index_mask(3000), Err(BenchError::InvalidConfig(_))));
		let harness = Harness::new(&UnsupportedEnergySource, Workload::new(1_000, 0));
		assert!(load(&harness, "odd", 12_000, 1, 1).is_err());
	}

	#[test]
	fn load_probes_are_named_after_their_level() {
		let loads: Vec<&str> = BENCHMARKS.iter().map(|b| b.name).filter(|n| n.contains("LOAD")).collect();
		let labels: Vec<&str> = MemoryLevel::ALL.iter().map(MemoryLevel::load_label).collect();
		assert_eq!(loads, labels);
	}
}
