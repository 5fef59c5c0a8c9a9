//! General-purpose register instructions.
//!
//! Every operand is laundered through `black_box` before the loop so the
//! compiler cannot fold the instruction, and every result goes back through
//! `black_box` after it.

use std::arch::asm;
use std::hint::black_box;

use crate::error::Result;
use crate::result::{Category, Measurement};
use crate::suite::{Benchmark, Harness};
use crate::util::cpu::IsaFeature;

pub const ARITHMETIC: &[Benchmark] = &[
	Benchmark { name: "ADD (32-bit)", category: Category::Arithmetic, requires: &[], run: add },
	Benchmark { name: "SUB (32-bit)", category: Category::Arithmetic, requires: &[], run: sub },
	Benchmark { name: "IMUL (32-bit)", category: Category::Arithmetic, requires: &[], run: imul },
	Benchmark { name: "DIV (32-bit)", category: Category::Arithmetic, requires: &[], run: div },
	Benchmark { name: "MUL (64-bit)", category: Category::Arithmetic, requires: &[], run: mul },
];

pub const LOGICAL: &[Benchmark] = &[
	Benchmark { name: "AND (32-bit)", category: Category::Logical, requires: &[], run: and },
	Benchmark { name: "OR (32-bit)", category: Category::Logical, requires: &[], run: or },
	Benchmark { name: "XOR (32-bit)", category: Category::Logical, requires: &[], run: xor },
];

pub const SHIFT: &[Benchmark] = &[
	Benchmark { name: "SHL (32-bit)", category: Category::Shift, requires: &[], run: shl },
	Benchmark { name: "SHR (32-bit)", category: Category::Shift, requires: &[], run: shr },
];

pub const BASIC: &[Benchmark] = &[
	Benchmark { name: "MOV (register)", category: Category::Basic, requires: &[], run: mov },
	Benchmark { name: "CMP (32-bit)", category: Category::Basic, requires: &[], run: cmp },
	Benchmark { name: "LEA (64-bit)", category: Category::Basic, requires: &[], run: lea },
];

pub const BIT_MANIPULATION: &[Benchmark] = &[
	Benchmark {
		name: "POPCNT (64-bit)",
		category: Category::BitManipulation,
		requires: &[IsaFeature::Popcnt],
		run: popcnt,
	},
	Benchmark {
		name: "LZCNT (64-bit)",
		category: Category::BitManipulation,
		requires: &[IsaFeature::Lzcnt],
		run: lzcnt,
	},
];

pub const BRANCH: &[Benchmark] = &[Benchmark {
	name: "Branch (taken)",
	category: Category::Branch,
	requires: &[],
	run: branch,
}];

/// `dst op= src` on 32-bit registers, one instruction per iteration
macro_rules! binary_op_32 {
	($fn_name:ident, $mnemonic:literal, $a:expr, $b:expr) => {
		fn $fn_name(h: &Harness<'_>, bench: &Benchmark) -> Result<Measurement> {
			let a: u32 = black_box($a);
			let b: u32 = black_box($b);
			Ok(h.time(bench.name, bench.category, h.workload(), || {
				let mut c = a;
				// SAFETY: register-only ALU instruction
				unsafe {
					asm!(
						concat!($mnemonic, " {c:e}, {b:e}"),
						c = inout(reg) c,
						b = in(reg) b,
						options(nomem, nostack),
					);
				}
				black_box(c);
			}))
		}
	};
}

binary_op_32!(add, "add", 1, 2);
binary_op_32!(sub, "sub", 100, 1);
binary_op_32!(imul, "imul", 123, 456);
binary_op_32!(and, "and", 0xAAAA_AAAA, 0x5555_5555);
binary_op_32!(or, "or", 0xAAAA_AAAA, 0x5555_5555);
binary_op_32!(xor, "xor", 0xAAAA_AAAA, 0x5555_5555);

fn div(h: &Harness<'_>, bench: &Benchmark) -> Result<Measurement> {
	let dividend: u32 = black_box(1_000_000);
	let divisor: u32 = black_box(7);
	Ok(h.time(bench.name, bench.category, h.workload(), || {
		let quotient: u32;
		// SAFETY: divisor is a non-zero constant and the quotient fits in eax
		unsafe {
			asm!(
				"xor edx, edx",
				"div {d:e}",
				d = in(reg) divisor,
				inout("eax") dividend => quotient,
				out("edx") _,
				options(nomem, nostack),
			);
		}
		black_box(quotient);
	}))
}

fn mul(h: &Harness<'_>, bench: &Benchmark) -> Result<Measurement> {
	let a: u64 = black_box(0x0123_4567_89AB_CDEF);
	let b: u64 = black_box(0x0FED_CBA9);
	Ok(h.time(bench.name, bench.category, h.workload(), || {
		let low: u64;
		let high: u64;
		// SAFETY: register-only multiply into rdx:rax
		unsafe {
			asm!(
				"mul {b}",
				b = in(reg) b,
				inout("rax") a => low,
				out("rdx") high,
				options(nomem, nostack),
			);
		}
		black_box((low, high));
	}))
}

macro_rules! shift_32 {
	($fn_name:ident, $mnemonic:literal, $a:expr) => {
		fn $fn_name(h: &Harness<'_>, bench: &Benchmark) -> Result<Measurement> {
			let a: u32 = black_box($a);
			Ok(h.time(bench.name, bench.category, h.workload(), || {
				let mut c = a;
				// SAFETY: register-only shift by an immediate
				unsafe {
					asm!(
						concat!($mnemonic, " {c:e}, 4"),
						c = inout(reg) c,
						options(nomem, nostack),
					);
				}
				black_box(c);
			}))
		}
	};
}

shift_32!(shl, "shl", 0x1234_5678);
shift_32!(shr, "shr", 0x8765_4321);

fn mov(h: &Harness<'_>, bench: &Benchmark) -> Result<Measurement> {
	let a: u32 = black_box(0x1234_5678);
	Ok(h.time(bench.name, bench.category, h.workload(), || {
		let b: u32;
		// SAFETY: register to register move
		unsafe {
			asm!(
				"mov {b:e}, {a:e}",
				a = in(reg) a,
				b = out(reg) b,
				options(nomem, nostack, preserves_flags),
			);
		}
		black_box(b);
	}))
}

fn cmp(h: &Harness<'_>, bench: &Benchmark) -> Result<Measurement> {
	let a: u32 = black_box(100);
	let b: u32 = black_box(200);
	Ok(h.time(bench.name, bench.category, h.workload(), || {
		// SAFETY: only writes flags
		unsafe {
			asm!(
				"cmp {b:e}, {a:e}",
				a = in(reg) a,
				b = in(reg) b,
				options(nomem, nostack),
			);
		}
	}))
}

fn lea(h: &Harness<'_>, bench: &Benchmark) -> Result<Measurement> {
	let base: u64 = black_box(0x1000);
	let index: u64 = black_box(0x20);
	Ok(h.time(bench.name, bench.category, h.workload(), || {
		let addr: u64;
		// SAFETY: lea only computes an address, nothing is dereferenced
		unsafe {
			asm!(
				"lea {d}, [{base} + {index} * 4 + 8]",
				base = in(reg) base,
				index = in(reg) index,
				d = out(reg) addr,
				options(nomem, nostack, preserves_flags),
			);
		}
		black_box(addr);
	}))
}

fn popcnt(h: &Harness<'_>, bench: &Benchmark) -> Result<Measurement> {
	let a: u64 = black_box(0x0123_4567_89AB_CDEF);
	Ok(h.time(bench.name, bench.category, h.workload(), || {
		let c: u64;
		// SAFETY: the suite only runs this when CPUID reports POPCNT
		unsafe {
			asm!("popcnt {c}, {a}", a = in(reg) a, c = out(reg) c, options(nomem, nostack));
		}
		black_box(c);
	}))
}

fn lzcnt(h: &Harness<'_>, bench: &Benchmark) -> Result<Measurement> {
	let a: u64 = black_box(0x0000_1234_5678_9ABC);
	Ok(h.time(bench.name, bench.category, h.workload(), || {
		let c: u64;
		// SAFETY: the suite only runs this when CPUID reports LZCNT
		unsafe {
			asm!("lzcnt {c}, {a}", a = in(reg) a, c = out(reg) c, options(nomem, nostack));
		}
		black_box(c);
	}))
}

fn branch(h: &Harness<'_>, bench: &Benchmark) -> Result<Measurement> {
	let mut counter: u32 = black_box(0);
	let measurement = h.time(bench.name, bench.category, h.workload(), || {
		// SAFETY: local forward jump, counter stays in a register
		unsafe {
			asm!(
				"cmp {c:e}, 0",
				"je 2f",
				"inc {c:e}",
				"2:",
				c = inout(reg) counter,
				options(nomem, nostack),
			);
		}
	});
	black_box(counter);
	Ok(measurement)
}
