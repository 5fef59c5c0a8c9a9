use std::io::{self, Write};

use serde::Serialize;

use crate::result::{Category, Measurement, category_average};
use crate::suite::memory::MemoryLevel;

const RULE: &str = "---------------------------------------------------------------------";

/// Run metadata printed above the results
#[derive(Debug, Clone, Serialize)]
pub struct RunInfo {
	pub cpu_model: String,
	pub vendor: String,
	pub cpu: usize,
	pub iterations: u64,
	pub warmup: u64,
	pub energy_source: String,
	pub energy_available: bool,
}

/// Everything the JSON output contains
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
	#[serde(flatten)]
	pub info: &'a RunInfo,
	pub results: &'a [Measurement],
}

/// Prints the CPU banner and run parameters
pub fn write_header<W: Write>(out: &mut W, info: &RunInfo) -> io::Result<()> {
	writeln!(out, "CPU Info: {}", info.cpu_model)?;
	writeln!(out)?;
	writeln!(
		out,
		"{} CPU, measuring on cpu {}, energy: {}",
		info.vendor, info.cpu, info.energy_source
	)?;
	writeln!(out, "Testing {} iterations per instruction...", info.iterations)?;
	writeln!(out)?;
	out.flush()
}

/// Progress line printed when a category starts
pub fn write_category_start<W: Write>(out: &mut W, category: Category) -> io::Result<()> {
	writeln!(out, "Running {} Instructions...", category.heading())?;
	out.flush()
}

/// One row per measurement: label, cycles, nanoseconds, joules
pub fn write_results_table<W: Write>(out: &mut W, results: &[Measurement]) -> io::Result<()> {
	writeln!(out)?;
	writeln!(out, "Comprehensive Results:")?;
	writeln!(out, "{:<25} {:>12} {:>12} {:>12}", "Instruction", "Cycles", "Time(ns)", "Energy(J)")?;
	writeln!(out, "{}", RULE)?;

	for m in results {
		writeln!(
			out,
			"{:<25} {:>12.3} {:>12.3} {:>12.6}",
			m.name, m.avg_cycles, m.avg_time_ns, m.energy_consumed
		)?;
	}

	Ok(())
}

/// Cycles per access for each cache level, `n/a` where the probe did not run
pub fn write_cache_analysis<W: Write>(out: &mut W, results: &[Measurement]) -> io::Result<()> {
	writeln!(out)?;
	writeln!(out, "Cache Hierarchy Analysis:")?;

	for level in MemoryLevel::ALL {
		match results.iter().find(|m| m.name == level.load_label()) {
			Some(m) => writeln!(out, "{} {:.3} cycles", level.summary_label(), m.avg_cycles)?,
			None => writeln!(out, "{} n/a", level.summary_label())?,
		}
	}

	Ok(())
}

/// Average cycles per instruction group; memory is covered by the cache analysis
pub fn write_category_summary<W: Write>(out: &mut W, results: &[Measurement]) -> io::Result<()> {
	writeln!(out)?;
	writeln!(out, "Instruction Categories Performance:")?;

	for category in Category::ALL.into_iter().filter(|c| *c != Category::Memory) {
		if let Some(avg) = category_average(results, category) {
			writeln!(out, "{} Avg: {:.3} cycles", category.summary_label(), avg)?;
		}
	}

	Ok(())
}

pub fn write_notes<W: Write>(out: &mut W, energy_available: bool) -> io::Result<()> {
	writeln!(out)?;
	writeln!(out, "Notes:")?;
	writeln!(out, "- Energy measurement requires MSR access (run as root)")?;
	if !energy_available {
		writeln!(out, "- Energy counters were not readable during this run, energy reads 0")?;
	}
	writeln!(out, "- Results may vary depending on system load and frequency scaling")?;
	writeln!(out, "- Disable CPU frequency scaling for more consistent results")?;
	writeln!(out, "- Cache measurements show memory hierarchy performance")?;
	Ok(())
}

/// Full console report following the progress lines
pub fn write_report<W: Write>(out: &mut W, info: &RunInfo, results: &[Measurement]) -> io::Result<()> {
	write_results_table(out, results)?;
	write_cache_analysis(out, results)?;
	write_category_summary(out, results)?;
	write_notes(out, info.energy_available)?;
	out.flush()
}

/// Pretty-printed JSON object with run info and all measurements
pub fn write_json<W: Write>(out: &mut W, info: &RunInfo, results: &[Measurement]) -> crate::error::Result<()> {
	let report = JsonReport { info, results };
	serde_json::to_writer_pretty(&mut *out, &report)?;
	writeln!(out)?;
	out.flush()?;
	Ok(())
}
