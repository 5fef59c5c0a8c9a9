use crate::constants::*;
use crate::rapl::{EnergyDomain, EnergySource, read_rapl_joules};
use crate::util::msr::read_msr;

/// Intel energy reading through MSR_PP0_ENERGY_STATUS / MSR_PKG_ENERGY_STATUS
///
/// Intel has no per-core accumulator; the core domain maps to PP0, which
/// covers all cores of the package.
#[derive(Debug, Clone)]
pub struct IntelEnergySource {
	cpu_id: usize,
	domain: EnergyDomain,
}

impl IntelEnergySource {
	pub fn new(cpu_id: usize, domain: EnergyDomain) -> Self {
		Self { cpu_id, domain }
	}

	pub fn energy_register(&self) -> u32 {
		match self.domain {
			EnergyDomain::Core => INTEL_PP0_ENERGY_MSR,
			EnergyDomain::Package => INTEL_PKG_ENERGY_MSR,
		}
	}
}

impl EnergySource for IntelEnergySource {
	fn read_joules(&self) -> Option<f64> {
		read_rapl_joules(
			|reg| read_msr(reg, self.cpu_id),
			INTEL_POWER_UNIT_MSR,
			self.energy_register(),
		)
	}

	fn describe(&self) -> String {
		let domain = match self.domain {
			EnergyDomain::Core => "PP0",
			EnergyDomain::Package => "package",
		};
		format!("Intel RAPL {} energy (cpu {}, MSR {:#X})", domain, self.cpu_id, self.energy_register())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn domain_selects_register() {
		assert_eq!(IntelEnergySource::new(0, EnergyDomain::Core).energy_register(), 0x639);
		assert_eq!(IntelEnergySource::new(0, EnergyDomain::Package).energy_register(), 0x611);
	}
}
