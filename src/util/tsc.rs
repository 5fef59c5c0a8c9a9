use std::arch::x86_64::_rdtsc;
use std::sync::atomic::{Ordering, compiler_fence};

/// Reads the free-running timestamp counter.
///
/// The fences only stop the compiler from moving work across the read. The
/// CPU may still reorder around `rdtsc`; no serializing instruction is issued.
#[inline(always)]
pub fn read_cycles() -> u64 {
	compiler_fence(Ordering::SeqCst);
	// SAFETY: rdtsc is available on every x86-64 processor and has no side effects
	let cycles = unsafe { _rdtsc() };
	compiler_fence(Ordering::SeqCst);
	cycles
}
