pub mod amd;
pub mod intel;

use std::fmt::Debug;
use std::io;

use clap::ValueEnum;
use tracing::{debug, warn};

use crate::constants::MSR_DEVICE_HINT;
use crate::cpu_type::CpuType;
use crate::util::raw_energy_to_joules;

/// Which RAPL accumulator an energy source reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum EnergyDomain {
	/// Per-core accumulator (AMD core energy, Intel PP0)
	#[default]
	Core,
	/// Whole-package accumulator
	Package,
}

/// Best-effort source of cumulative energy readings
///
/// Implementations never fail loudly: an inaccessible register is reported as
/// `None` and the timer records it as a zero reading.
pub trait EnergySource: Debug {
	/// Reads the accumulator in joules, or `None` when it cannot be read
	fn read_joules(&self) -> Option<f64>;

	/// Short description used in the report header
	fn describe(&self) -> String;
}

/// Energy source for platforms without a supported RAPL interface
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedEnergySource;

impl EnergySource for UnsupportedEnergySource {
	fn read_joules(&self) -> Option<f64> {
		None
	}

	fn describe(&self) -> String {
		"unavailable".to_string()
	}
}

/// Reads a RAPL energy accumulator and its unit register and converts to joules
///
/// A zero raw reading or a zero unit register is treated as "no data", the
/// same as a failed read.
pub fn read_rapl_joules<R>(read: R, unit_msr: u32, energy_msr: u32) -> Option<f64>
where
	R: Fn(u32) -> io::Result<u64>,
{
	let energy_raw = read(energy_msr).ok()?;
	let unit_raw = read(unit_msr).ok()?;

	if energy_raw == 0 || unit_raw == 0 {
		return None;
	}

	Some(raw_energy_to_joules(energy_raw, unit_raw))
}

/// Factory function to create the appropriate energy source based on CPU type
pub fn create_energy_source(cpu_type: CpuType, cpu_id: usize, domain: EnergyDomain) -> Box<dyn EnergySource> {
	use crate::rapl::amd::AmdEnergySource;
	use crate::rapl::intel::IntelEnergySource;

	match cpu_type {
		CpuType::Amd => Box::new(AmdEnergySource::new(cpu_id, domain)),
		CpuType::Intel => Box::new(IntelEnergySource::new(cpu_id, domain)),
		CpuType::Unsupported => {
			debug!("no RAPL register layout for this vendor, energy disabled");
			Box::new(UnsupportedEnergySource)
		},
	}
}

/// Performs one read and warns once when the source is unusable
///
/// Returns whether energy readings are available.
pub fn probe(source: &dyn EnergySource) -> bool {
	match source.read_joules() {
		Some(joules) => {
			debug!(source = %source.describe(), joules, "energy counter readable");
			true
		},
		None => {
			warn!(
				source = %source.describe(),
				"energy counters unavailable, energy columns will read 0 ({})",
				MSR_DEVICE_HINT
			);
			false
		},
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const UNIT: u32 = 0x10;
	const ENERGY: u32 = 0x20;

	fn registers(unit: u64, energy: u64) -> impl Fn(u32) -> io::Result<u64> {
		move |reg| match reg {
			UNIT => Ok(unit),
			ENERGY => Ok(energy),
			_ => Err(io::Error::from(io::ErrorKind::NotFound)),
		}
	}

	#[test]
	fn converts_when_both_registers_read() {
		let joules = read_rapl_joules(registers(0x000A_1003, 3 * 65_536), UNIT, ENERGY);
		assert_eq!(joules, Some(3.0));
	}

	#[test]
	fn zero_readings_mean_unavailable() {
		assert_eq!(read_rapl_joules(registers(0x000A_1003, 0), UNIT, ENERGY), None);
		assert_eq!(read_rapl_joules(registers(0, 1234), UNIT, ENERGY), None);
	}

	#[test]
	fn permission_denied_degrades_to_none() {
		let denied = |_: u32| -> io::Result<u64> { Err(io::Error::from(io::ErrorKind::PermissionDenied)) };
		assert_eq!(read_rapl_joules(denied, UNIT, ENERGY), None);
	}

	#[test]
	fn unsupported_vendor_gets_null_source() {
		let source = create_energy_source(CpuType::Unsupported, 0, EnergyDomain::Core);
		assert_eq!(source.read_joules(), None);
		assert_eq!(source.describe(), "unavailable");
		assert!(!probe(source.as_ref()));
	}
}
