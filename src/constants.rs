// AMD RAPL MSR addresses
pub const AMD_ENERGY_UNIT_MSR: u32 = 0xC001_0299;
pub const AMD_ENERGY_CORE_MSR: u32 = 0xC001_029A;
pub const AMD_ENERGY_PKG_MSR: u32 = 0xC001_029B;

// Intel RAPL MSR addresses
pub const INTEL_POWER_UNIT_MSR: u32 = 0x606;
pub const INTEL_PKG_ENERGY_MSR: u32 = 0x611;
pub const INTEL_PP0_ENERGY_MSR: u32 = 0x639;

/// Bits 12:8 of the unit register hold the energy status unit exponent
pub const ENERGY_UNIT_SHIFT: u32 = 8;
pub const ENERGY_UNIT_MASK: u64 = 0x1F;

// Instruction timing loop sizes
pub const DEFAULT_ITERATIONS: u64 = 50_000_000;
pub const WARMUP_DIVISOR: u64 = 10;
pub const DEFAULT_CPU: usize = 0;

// Memory hierarchy working sets (bytes)
pub const L1_WORKING_SET: usize = 32 * 1024;
pub const L2_WORKING_SET: usize = 256 * 1024;
pub const L3_WORKING_SET: usize = 8 * 1024 * 1024;
pub const RAM_WORKING_SET: usize = 64 * 1024 * 1024;

/// Element stride used to defeat the prefetcher on the RAM-sized set
pub const RAM_STRIDE: usize = 1024;

// Memory tests are slower per access, so their loops are scaled down
pub const CACHE_ITERATION_DIVISOR: u64 = 1_000;
pub const RAM_ITERATION_DIVISOR: u64 = 10_000;

pub const MSR_DEVICE_HINT: &str = "load the msr module (modprobe msr) and run as root";
