pub mod cpu;
pub mod msr;
pub mod tsc;

use crate::constants::{ENERGY_UNIT_MASK, ENERGY_UNIT_SHIFT};

/// Extracts the energy status unit exponent from a RAPL unit register
pub const fn energy_unit_exponent(unit_register: u64) -> u32 {
	((unit_register >> ENERGY_UNIT_SHIFT) & ENERGY_UNIT_MASK) as u32
}

/// Converts a raw energy accumulator value to joules
///
/// # Arguments
///
/// * `energy_raw` - Raw accumulator reading
/// * `unit_register` - Value of the matching power unit MSR
///
/// # Returns
///
/// Energy in joules, using unit = 2^-(energy status unit field)
pub fn raw_energy_to_joules(energy_raw: u64, unit_register: u64) -> f64 {
	let exponent = energy_unit_exponent(unit_register);
	energy_raw as f64 / f64::from(1u32 << exponent)
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn amd_default_unit_is_15_26_microjoules() {
		// Zen parts report 0x000A1003: energy status unit field = 16
		assert_eq!(energy_unit_exponent(0x000A_1003), 16);
		let joules = raw_energy_to_joules(65_536, 0x000A_1003);
		assert!((joules - 1.0).abs() < f64::EPSILON);
	}

	#[test]
	fn intel_unit_register_uses_same_field() {
		// Typical Intel MSR_RAPL_POWER_UNIT value 0x000A0E03: field = 14
		assert_eq!(energy_unit_exponent(0x000A_0E03), 14);
	}

	proptest! {
		#[test]
		fn conversion_scales_by_power_of_two(raw in 0u64..(1 << 40), exponent in 0u64..32) {
			let joules = raw_energy_to_joules(raw, exponent << 8);
			let expected = raw as f64 / 2f64.powi(exponent as i32);
			prop_assert!((joules - expected).abs() <= expected * 1e-12);
			prop_assert!(joules >= 0.0);
		}
	}
}
