use crate::constants::*;
use crate::rapl::{EnergyDomain, EnergySource, read_rapl_joules};
use crate::util::msr::read_msr;

/// AMD Zen energy reading through the core and package RAPL MSRs
#[derive(Debug, Clone)]
pub struct AmdEnergySource {
	cpu_id: usize,
	domain: EnergyDomain,
}

impl AmdEnergySource {
	pub fn new(cpu_id: usize, domain: EnergyDomain) -> Self {
		Self { cpu_id, domain }
	}

	/// The accumulator register for the configured domain
	pub fn energy_register(&self) -> u32 {
		match self.domain {
			EnergyDomain::Core => AMD_ENERGY_CORE_MSR,
			EnergyDomain::Package => AMD_ENERGY_PKG_MSR,
		}
	}
}

impl EnergySource for AmdEnergySource {
	fn read_joules(&self) -> Option<f64> {
		read_rapl_joules(
			|reg| read_msr(reg, self.cpu_id),
			AMD_ENERGY_UNIT_MSR,
			self.energy_register(),
		)
	}

	fn describe(&self) -> String {
		let domain = match self.domain {
			EnergyDomain::Core => "core",
			EnergyDomain::Package => "package",
		};
		format!("AMD RAPL {} energy (cpu {}, MSR {:#X})", domain, self.cpu_id, self.energy_register())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn domain_selects_register() {
		assert_eq!(AmdEnergySource::new(0, EnergyDomain::Core).energy_register(), 0xC001_029A);
		assert_eq!(AmdEnergySource::new(0, EnergyDomain::Package).energy_register(), 0xC001_029B);
	}

	#[test]
	fn description_names_the_cpu() {
		let source = AmdEnergySource::new(3, EnergyDomain::Core);
		assert_eq!(source.describe(), "AMD RAPL core energy (cpu 3, MSR 0xC001029A)");
	}
}
