//! SSE and AVX vector instructions.
//!
//! Each iteration loads its operands from memory, runs one vector operation
//! and moves the low lane back to a general-purpose register. AVX sequences
//! end in `vzeroupper` so the upper ymm halves never leak into SSE code.

use std::arch::asm;
use std::hint::black_box;

use crate::error::Result;
use crate::result::{Category, Measurement};
use crate::suite::{Benchmark, Harness};
use crate::util::cpu::IsaFeature;

pub const INTEGER: &[Benchmark] = &[
	Benchmark {
		name: "SSE2 PADDQ",
		category: Category::SimdInteger,
		requires: &[IsaFeature::Sse2],
		run: sse2_paddq,
	},
	Benchmark {
		name: "AVX2 VPADDQ",
		category: Category::SimdInteger,
		requires: &[IsaFeature::Avx, IsaFeature::Avx2],
		run: avx2_vpaddq,
	},
];

pub const FLOAT: &[Benchmark] = &[
	Benchmark {
		name: "SSE ADDPS",
		category: Category::SimdFloat,
		requires: &[IsaFeature::Sse2],
		run: sse_addps,
	},
	Benchmark {
		name: "SSE MULPS",
		category: Category::SimdFloat,
		requires: &[IsaFeature::Sse2],
		run: sse_mulps,
	},
	Benchmark {
		name: "AVX VADDPS",
		category: Category::SimdFloat,
		requires: &[IsaFeature::Avx],
		run: avx_vaddps,
	},
	Benchmark {
		name: "AVX VMULPS",
		category: Category::SimdFloat,
		requires: &[IsaFeature::Avx],
		run: avx_vmulps,
	},
];

/// 32-byte aligned operand block, one ymm register wide
#[repr(C, align(32))]
struct Lanes<T>([T; 8]);

#[repr(C, align(32))]
struct Quads([u64; 4]);

fn sse2_paddq(h: &Harness<'_>, bench: &Benchmark) -> Result<Measurement> {
	let data = black_box(Quads([
		0x1111_1111_1111_1111,
		0x2222_2222_2222_2222,
		0x3333_3333_3333_3333,
		0x4444_4444_4444_4444,
	]));
	let src = data.0.as_ptr();

	Ok(h.time(bench.name, bench.category, h.workload(), || {
		let low: u64;
		// SAFETY: src points at four readable u64 values owned by `data`
		unsafe {
			asm!(
				"movq xmm0, qword ptr [{src}]",
				"movq xmm1, qword ptr [{src} + 8]",
				"movq xmm2, qword ptr [{src} + 16]",
				"movq xmm3, qword ptr [{src} + 24]",
				"punpcklqdq xmm0, xmm1",
				"punpcklqdq xmm2, xmm3",
				"paddq xmm0, xmm2",
				"movq {low}, xmm0",
				src = in(reg) src,
				low = out(reg) low,
				out("xmm0") _,
				out("xmm1") _,
				out("xmm2") _,
				out("xmm3") _,
				options(readonly, nostack, preserves_flags),
			);
		}
		black_box(low);
	}))
}

macro_rules! sse_packed_float {
	($fn_name:ident, $mnemonic:literal, $values:expr) => {
		fn $fn_name(h: &Harness<'_>, bench: &Benchmark) -> Result<Measurement> {
			let data = black_box(Lanes::<f32>($values));
			let src = data.0.as_ptr();

			Ok(h.time(bench.name, bench.category, h.workload(), || {
				let low: u32;
				// SAFETY: src points at eight readable f32 values owned by `data`
				unsafe {
					asm!(
						"movups xmm0, xmmword ptr [{src}]",
						"movups xmm1, xmmword ptr [{src} + 16]",
						concat!($mnemonic, " xmm0, xmm1"),
						"movd {low:e}, xmm0",
						src = in(reg) src,
						low = out(reg) low,
						out("xmm0") _,
						out("xmm1") _,
						options(readonly, nostack, preserves_flags),
					);
				}
				black_box(f32::from_bits(low));
			}))
		}
	};
}

sse_packed_float!(sse_addps, "addps", [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
sse_packed_float!(sse_mulps, "mulps", [1.1, 2.2, 3.3, 4.4, 5.5, 6.6, 7.7, 8.8]);

fn avx2_vpaddq(h: &Harness<'_>, bench: &Benchmark) -> Result<Measurement> {
	let a = black_box(Quads([
		0x1111_1111_1111_1111,
		0x2222_2222_2222_2222,
		0x3333_3333_3333_3333,
		0x4444_4444_4444_4444,
	]));
	let b = black_box(Quads([
		0x5555_5555_5555_5555,
		0x6666_6666_6666_6666,
		0x7777_7777_7777_7777,
		0x8888_8888_8888_8888,
	]));
	let (pa, pb) = (a.0.as_ptr(), b.0.as_ptr());

	Ok(h.time(bench.name, bench.category, h.workload(), || {
		let low: u64;
		// SAFETY: both pointers cover 32 readable bytes; AVX2 support is checked by the suite
		unsafe {
			asm!(
				"vmovdqu ymm0, ymmword ptr [{a}]",
				"vmovdqu ymm1, ymmword ptr [{b}]",
				"vpaddq ymm0, ymm0, ymm1",
				"vmovq {low}, xmm0",
				"vzeroupper",
				a = in(reg) pa,
				b = in(reg) pb,
				low = out(reg) low,
				out("xmm0") _,
				out("xmm1") _,
				options(readonly, nostack, preserves_flags),
			);
		}
		black_box(low);
	}))
}

macro_rules! avx_packed_float {
	($fn_name:ident, $mnemonic:literal, $a:expr, $b:expr) => {
		fn $fn_name(h: &Harness<'_>, bench: &Benchmark) -> Result<Measurement> {
			let a = black_box(Lanes::<f32>($a));
			let b = black_box(Lanes::<f32>($b));
			let (pa, pb) = (a.0.as_ptr(), b.0.as_ptr());

			Ok(h.time(bench.name, bench.category, h.workload(), || {
				let low: u32;
				// SAFETY: both pointers cover 32 readable bytes; AVX support is checked by the suite
				unsafe {
					asm!(
						"vmovups ymm0, ymmword ptr [{a}]",
						"vmovups ymm1, ymmword ptr [{b}]",
						concat!($mnemonic, " ymm0, ymm0, ymm1"),
						"vmovd {low:e}, xmm0",
						"vzeroupper",
						a = in(reg) pa,
						b = in(reg) pb,
						low = out(reg) low,
						out("xmm0") _,
						out("xmm1") _,
						options(readonly, nostack, preserves_flags),
					);
				}
				black_box(f32::from_bits(low));
			}))
		}
	};
}

avx_packed_float!(
	avx_vaddps,
	"vaddps",
	[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0],
	[8.0, 7.0, 6.0, 5.0, 4.0, 3.0, 2.0, 1.0]
);
avx_packed_float!(
	avx_vmulps,
	"vmulps",
	[1.1, 2.2, 3.3, 4.4, 5.5, 6.6, 7.7, 8.8],
	[2.0; 8]
);

#[cfg(test)]
mod tests {
	use super::*;
	use crate::rapl::UnsupportedEnergySource;
	use crate::timer::Workload;

	#[test]
	fn supported_vector_benchmarks_run() {
		let harness = Harness::new(&UnsupportedEnergySource, Workload::new(1_000, 100));

		for bench in INTEGER.iter().chain(FLOAT) {
			if bench.missing_feature().is_some() {
				continue;
			}
			let m = bench.execute(&harness).unwrap();
			assert_eq!(m.category, bench.category);
			assert!(m.avg_cycles.is_finite() && m.avg_cycles >= 0.0);
		}
	}

	#[test]
	fn operand_blocks_are_ymm_aligned() {
		assert_eq!(std::mem::align_of::<Lanes<f32>>(), 32);
		assert_eq!(std::mem::size_of::<Quads>(), 32);
	}
}
