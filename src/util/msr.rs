use msru::{Accessor, Msr};
use std::io;

/// Reads a value from a Model-Specific Register (MSR)
///
/// # Arguments
///
/// * `msr_address` - The address of the MSR to read
/// * `cpu_id` - The CPU ID to read the MSR from
///
/// # Returns
///
/// The value read through `/dev/cpu/<cpu_id>/msr`, or an io::Error if the
/// device is missing, access is denied or the read comes back short
pub fn read_msr(msr_address: u32, cpu_id: usize) -> io::Result<u64> {
	let cpu = u16::try_from(cpu_id)
		.map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, format!("cpu id {} out of range", cpu_id)))?;

	Msr::new(msr_address, cpu)
		.map_err(io::Error::other)?
		.read()
		.map_err(io::Error::other)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn out_of_range_cpu_is_rejected_before_touching_the_device() {
		let err = read_msr(0x10, usize::from(u16::MAX) + 1).unwrap_err();
		assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
	}
}
