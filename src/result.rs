use serde::Serialize;

/// Instruction groups the suite is organised in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
	Arithmetic,
	Logical,
	Shift,
	Basic,
	SimdInteger,
	SimdFloat,
	BitManipulation,
	Memory,
	Branch,
}

impl Category {
	/// All categories in suite order
	pub const ALL: [Category; 9] = [
		Category::Arithmetic,
		Category::Logical,
		Category::Shift,
		Category::Basic,
		Category::SimdInteger,
		Category::SimdFloat,
		Category::BitManipulation,
		Category::Memory,
		Category::Branch,
	];

	/// Heading used in progress lines ("Running ... Instructions...")
	pub fn heading(&self) -> &'static str {
		match self {
			Category::Arithmetic => "Basic Arithmetic",
			Category::Logical => "Logical",
			Category::Shift => "Shift",
			Category::Basic => "Basic",
			Category::SimdInteger => "SSE/AVX Integer",
			Category::SimdFloat => "SSE/AVX Float",
			Category::BitManipulation => "Bit Manipulation",
			Category::Memory => "Memory Access",
			Category::Branch => "Branch",
		}
	}

	/// Label used in the category summary
	pub fn summary_label(&self) -> &'static str {
		match self {
			Category::Logical => "Logical Operations",
			Category::Shift => "Shift Operations",
			Category::Basic => "Basic Instructions",
			other => other.heading(),
		}
	}
}

/// Per-iteration cost of one timed operation
///
/// Energy fields are joules and read exactly `0.0` when the energy source was
/// unavailable; `energy_available` tells the two cases apart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measurement {
	pub name: String,
	pub category: Category,
	pub iterations: u64,
	pub avg_cycles: f64,
	pub avg_time_ns: f64,
	pub energy_start: f64,
	pub energy_end: f64,
	pub energy_consumed: f64,
	pub energy_available: bool,
}

/// Average cycles over the measurements belonging to `category`
pub fn category_average(results: &[Measurement], category: Category) -> Option<f64> {
	let cycles: Vec<f64> = results
		.iter()
		.filter(|m| m.category == category)
		.map(|m| m.avg_cycles)
		.collect();

	if cycles.is_empty() {
		return None;
	}
	Some(cycles.iter().sum::<f64>() / cycles.len() as f64)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sample(name: &str, category: Category, avg_cycles: f64) -> Measurement {
		Measurement {
			name: name.to_string(),
			category,
			iterations: 1,
			avg_cycles,
			avg_time_ns: 0.0,
			energy_start: 0.0,
			energy_end: 0.0,
			energy_consumed: 0.0,
			energy_available: false,
		}
	}

	#[test]
	fn average_only_counts_matching_category() {
		let results = vec![
			sample("ADD", Category::Arithmetic, 1.0),
			sample("DIV", Category::Arithmetic, 11.0),
			sample("AND", Category::Logical, 100.0),
		];
		assert_eq!(category_average(&results, Category::Arithmetic), Some(6.0));
		assert_eq!(category_average(&results, Category::Logical), Some(100.0));
		assert_eq!(category_average(&results, Category::Branch), None);
	}

	#[test]
	fn vector_categories_are_named_after_the_extensions() {
		assert_eq!(Category::SimdInteger.heading(), "SSE/AVX Integer");
		assert_eq!(Category::SimdFloat.summary_label(), "SSE/AVX Float");
		assert_eq!(Category::Shift.summary_label(), "Shift Operations");
	}

	#[test]
	fn serializes_with_snake_case_category() {
		let json = serde_json::to_string(&sample("PADDQ", Category::SimdInteger, 1.5)).unwrap();
		assert!(json.contains(r#""category":"simd_integer""#));
		assert!(json.contains(r#""energy_available":false"#));
	}
}
