#[cfg(not(all(target_arch = "x86_64", target_os = "linux")))]
compile_error!("instr-bench only supports x86_64 Linux");

pub mod config;
pub mod constants;
pub mod cpu_type;
pub mod display;
pub mod error;
pub mod rapl;
pub mod result;
pub mod suite;
pub mod timer;
pub mod util;

use std::io::Write;

use tracing::{info, warn};

use crate::config::{OutputFormat, SuiteConfig};
use crate::cpu_type::{CpuType, detect_cpu_type};
use crate::display::{RunInfo, write_category_start, write_header, write_json, write_report};
use crate::error::Result;
use crate::rapl::{EnergySource, UnsupportedEnergySource, create_energy_source};
use crate::result::Measurement;
use crate::suite::{Harness, catalog, run_suite};
use crate::util::cpu::{cpu_model_name, pin_current_thread};

/// Runs the full benchmark suite and writes the report to `out`
///
/// This is the main entry point. The energy source is picked from the
/// detected CPU vendor unless energy is disabled in `config`.
pub fn run<W: Write>(config: &SuiteConfig, out: &mut W) -> Result<Vec<Measurement>> {
	config.validate()?;

	let cpu_type = detect_cpu_type();
	let energy: Box<dyn EnergySource> = if config.energy_enabled {
		create_energy_source(cpu_type, config.cpu, config.energy_domain)
	} else {
		Box::new(UnsupportedEnergySource)
	};

	run_with_energy_source(config, cpu_type, energy.as_ref(), out)
}

/// Runs the suite against an explicit energy source
pub fn run_with_energy_source<W: Write>(
	config: &SuiteConfig,
	cpu_type: CpuType,
	energy: &dyn EnergySource,
	out: &mut W,
) -> Result<Vec<Measurement>> {
	match pin_current_thread(config.cpu) {
		Ok(()) => info!(cpu = config.cpu, "pinned measuring thread"),
		Err(e) => warn!(cpu = config.cpu, "failed to set thread affinity: {}", e),
	}

	let energy_available = rapl::probe(energy);
	let info = RunInfo {
		cpu_model: cpu_model_name(),
		vendor: cpu_type.to_string(),
		cpu: config.cpu,
		iterations: config.iterations,
		warmup: config.warmup,
		energy_source: energy.describe(),
		energy_available,
	};

	let harness = Harness::new(energy, config.workload());
	let benches = catalog();
	info!(benchmarks = benches.len(), iterations = config.iterations, "starting suite");

	match config.output {
		OutputFormat::Table => {
			write_header(out, &info)?;

			let mut progress_error = None;
			let results = run_suite(&harness, &benches, |category| {
				if let Err(e) = write_category_start(out, category) {
					if progress_error.is_none() {
						progress_error = Some(e);
					}
				}
			});
			if let Some(e) = progress_error {
				return Err(e.into());
			}

			write_report(out, &info, &results)?;
			Ok(results)
		},
		OutputFormat::Json => {
			let results = run_suite(&harness, &benches, |category| {
				info!(category = category.heading(), "running category");
			});
			write_json(out, &info, &results)?;
			Ok(results)
		},
	}
}
