use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use instr_bench::config::{Args, SuiteConfig};

fn main() -> ExitCode {
	// Logs go to stderr so the report on stdout stays clean
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
		.with_writer(io::stderr)
		.init();

	let config = SuiteConfig::from(Args::parse());

	let stdout = io::stdout();
	let mut out = stdout.lock();

	match instr_bench::run(&config, &mut out) {
		Ok(_) => ExitCode::SUCCESS,
		Err(e) => {
			eprintln!("Error: {}", e);
			ExitCode::FAILURE
		},
	}
}
