use clap::Parser;

use crate::constants::{DEFAULT_CPU, DEFAULT_ITERATIONS, WARMUP_DIVISOR};
use crate::error::{BenchError, Result};
use crate::rapl::EnergyDomain;
use crate::timer::Workload;

/// Command-line flags; running without any reproduces the default suite
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
	/// CPU to pin the measuring thread to and read energy from
	#[arg(long, default_value_t = DEFAULT_CPU)]
	pub cpu: usize,

	/// Timed iterations per instruction
	#[arg(long, default_value_t = DEFAULT_ITERATIONS, value_parser = clap::value_parser!(u64).range(1..))]
	pub iterations: u64,

	/// Warm-up iterations per instruction [default: iterations / 10]
	#[arg(long)]
	pub warmup: Option<u64>,

	/// RAPL accumulator to sample
	#[arg(long, value_enum, default_value_t = EnergyDomain::Core)]
	pub energy_domain: EnergyDomain,

	/// Skip energy counters entirely
	#[arg(long)]
	pub no_energy: bool,

	/// Print results as JSON instead of a table
	#[arg(long)]
	pub json: bool,
}

/// How results are written to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
	#[default]
	Table,
	Json,
}

/// Runtime configuration of one suite run
#[derive(Debug, Clone, PartialEq)]
pub struct SuiteConfig {
	pub cpu: usize,
	pub iterations: u64,
	pub warmup: u64,
	pub energy_domain: EnergyDomain,
	pub energy_enabled: bool,
	pub output: OutputFormat,
}

impl Default for SuiteConfig {
	fn default() -> Self {
		Self {
			cpu: DEFAULT_CPU,
			iterations: DEFAULT_ITERATIONS,
			warmup: DEFAULT_ITERATIONS / WARMUP_DIVISOR,
			energy_domain: EnergyDomain::Core,
			energy_enabled: true,
			output: OutputFormat::Table,
		}
	}
}

impl From<Args> for SuiteConfig {
	fn from(args: Args) -> Self {
		Self {
			cpu: args.cpu,
			iterations: args.iterations,
			warmup: args.warmup.unwrap_or(args.iterations / WARMUP_DIVISOR),
			energy_domain: args.energy_domain,
			energy_enabled: !args.no_energy,
			output: if args.json { OutputFormat::Json } else { OutputFormat::Table },
		}
	}
}

impl SuiteConfig {
	/// Checks the configuration against this machine
	pub fn validate(&self) -> Result<()> {
		self.validate_against(num_cpus::get())
	}

	fn validate_against(&self, online_cpus: usize) -> Result<()> {
		if self.cpu >= online_cpus {
			return Err(BenchError::InvalidConfig(format!(
				"cpu {} does not exist, this machine has {} logical CPUs",
				self.cpu, online_cpus
			)));
		}
		if self.iterations == 0 {
			return Err(BenchError::InvalidConfig("iterations must be at least 1".to_string()));
		}
		Ok(())
	}

	pub fn workload(&self) -> Workload {
		Workload::new(self.iterations, self.warmup)
	}
}
