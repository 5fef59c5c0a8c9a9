use std::fmt;
use std::fs;
use std::io;

/// Instruction set extensions a benchmark may depend on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsaFeature {
	Sse2,
	Avx,
	Avx2,
	Popcnt,
	Lzcnt,
}

impl IsaFeature {
	pub fn as_str(&self) -> &'static str {
		match self {
			IsaFeature::Sse2 => "SSE2",
			IsaFeature::Avx => "AVX",
			IsaFeature::Avx2 => "AVX2",
			IsaFeature::Popcnt => "POPCNT",
			IsaFeature::Lzcnt => "LZCNT",
		}
	}

	/// Checks the running processor through CPUID
	pub fn is_supported(&self) -> bool {
		match self {
			IsaFeature::Sse2 => is_x86_feature_detected!("sse2"),
			IsaFeature::Avx => is_x86_feature_detected!("avx"),
			IsaFeature::Avx2 => is_x86_feature_detected!("avx2"),
			IsaFeature::Popcnt => is_x86_feature_detected!("popcnt"),
			IsaFeature::Lzcnt => is_x86_feature_detected!("lzcnt"),
		}
	}
}

impl fmt::Display for IsaFeature {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Pins the calling thread to a single logical CPU
///
/// Energy is read from the per-core accumulator of `cpu_id`, so the timed loop
/// has to run on that same core for the delta to mean anything.
pub fn pin_current_thread(cpu_id: usize) -> io::Result<()> {
	if cpu_id >= libc::CPU_SETSIZE as usize {
		return Err(io::Error::new(
			io::ErrorKind::InvalidInput,
			format!("cpu {} exceeds the affinity mask size", cpu_id),
		));
	}

	// SAFETY: cpu_set_t is plain data and zero is its empty set; pthread_self is always valid
	let result = unsafe {
		let mut cpuset: libc::cpu_set_t = std::mem::zeroed();
		libc::CPU_SET(cpu_id, &mut cpuset);

		let thread_id = libc::pthread_self();
		libc::pthread_setaffinity_np(thread_id, std::mem::size_of::<libc::cpu_set_t>(), &cpuset)
	};

	if result != 0 {
		return Err(io::Error::from_raw_os_error(result));
	}
	Ok(())
}

/// Returns the processor model name from /proc/cpuinfo
pub fn cpu_model_name() -> String {
	let cpuinfo = fs::read_to_string("/proc/cpuinfo").unwrap_or_default();
	model_name_from_cpuinfo(&cpuinfo).unwrap_or_else(|| "unknown".to_string())
}

/// Extracts the first `model name` entry of a /proc/cpuinfo dump
pub fn model_name_from_cpuinfo(cpuinfo: &str) -> Option<String> {
	cpuinfo
		.lines()
		.filter_map(|line| line.split_once(':'))
		.find(|(key, _)| key.trim() == "model name")
		.map(|(_, value)| value.trim().to_string())
		.filter(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn model_name_is_taken_from_first_processor() {
		let cpuinfo = "processor\t: 0\nvendor_id\t: AuthenticAMD\nmodel name\t: AMD Ryzen 5 5600 6-Core Processor\n\n\
		               processor\t: 1\nmodel name\t: something else\n";
		assert_eq!(
			model_name_from_cpuinfo(cpuinfo).as_deref(),
			Some("AMD Ryzen 5 5600 6-Core Processor")
		);
	}

	#[test]
	fn missing_model_name() {
		assert_eq!(model_name_from_cpuinfo("processor\t: 0\n"), None);
		assert_eq!(model_name_from_cpuinfo("model name\t:   \n"), None);
	}

	#[test]
	fn pinning_rejects_cpu_beyond_mask() {
		let err = pin_current_thread(libc::CPU_SETSIZE as usize).unwrap_err();
		assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
	}

	#[test]
	fn sse2_is_baseline_on_x86_64() {
		assert!(IsaFeature::Sse2.is_supported());
	}
}
