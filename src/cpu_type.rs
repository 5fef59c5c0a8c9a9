use std::fmt;
use std::fs;

/// Represents CPU manufacturer types that can be detected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuType {
	/// Intel CPU architecture
	Intel,
	/// AMD CPU architecture
	Amd,
	/// Any other CPU architecture not explicitly supported
	Unsupported,
}

impl CpuType {
	/// Returns a human-readable vendor name
	pub fn as_str(&self) -> &'static str {
		match self {
			CpuType::Intel => "Intel",
			CpuType::Amd => "AMD",
			CpuType::Unsupported => "Unsupported",
		}
	}
}

impl fmt::Display for CpuType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Detects the CPU manufacturer by reading /proc/cpuinfo
pub fn detect_cpu_type() -> CpuType {
	let cpuinfo = fs::read_to_string("/proc/cpuinfo").unwrap_or_default();
	cpu_type_from_cpuinfo(&cpuinfo)
}

/// Classifies the vendor string found in a /proc/cpuinfo dump
pub fn cpu_type_from_cpuinfo(cpuinfo: &str) -> CpuType {
	if cpuinfo.contains("GenuineIntel") {
		CpuType::Intel
	} else if cpuinfo.contains("AuthenticAMD") {
		CpuType::Amd
	} else {
		CpuType::Unsupported
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn vendor_ids_are_recognised() {
		assert_eq!(cpu_type_from_cpuinfo("vendor_id\t: AuthenticAMD\n"), CpuType::Amd);
		assert_eq!(cpu_type_from_cpuinfo("vendor_id\t: GenuineIntel\n"), CpuType::Intel);
		assert_eq!(cpu_type_from_cpuinfo("vendor_id\t: CentaurHauls\n"), CpuType::Unsupported);
		assert_eq!(cpu_type_from_cpuinfo(""), CpuType::Unsupported);
	}
}
