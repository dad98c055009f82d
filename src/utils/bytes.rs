const UNITS: [(u64, &str); 6] = [
    (1 << 60, "E"),
    (1 << 50, "P"),
    (1 << 40, "T"),
    (1 << 30, "G"),
    (1 << 20, "M"),
    (1 << 10, "K"),
];

pub struct ByteFmt;

impl ByteFmt {
    /// Human readable size with binary units and one decimal, trailing `.0` dropped:
    /// `1536 -> "1.5K"`, `3072 -> "3K"`, `512 -> "512B"`.
    pub fn format(bytes: u64) -> String {
        let (value, unit) = UNITS
            .iter()
            .find(|(threshold, _)| bytes >= *threshold)
            .map(|(threshold, unit)| (bytes as f64 / *threshold as f64, *unit))
            .unwrap_or((bytes as f64, "B"));

        let formatted = format!("{value:.1}");
        let trimmed = formatted.strip_suffix(".0").unwrap_or(&formatted);
        format!("{trimmed}{unit}")
    }
}
