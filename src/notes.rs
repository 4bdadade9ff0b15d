/// Advisory notes shown alongside the tracker.
pub const IMPORTANT_NOTES: [&str; 5] = [
    "All deadlines are for Fall 2024 admission",
    "Requirements may change; always verify on university websites",
    "Application fees are subject to change",
    "GRE scores are generally valid for 5 years",
    "TOEFL scores are generally valid for 2 years",
];

pub fn render_notes() -> String {
    IMPORTANT_NOTES
        .iter()
        .map(|note| format!("- {note}"))
        .collect::<Vec<_>>()
        .join("\n")
}
