use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Row, Table};

use crate::progress::{
    overall_progress, university_progress, ChecklistState, Requirement, UniversityField,
};
use crate::university::{ApplicationStats, UniversityRecord};

const BAR_WIDTH: usize = 20;

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn check_cell(done: bool) -> Cell {
    if done {
        Cell::new("YES").fg(Color::Green)
    } else {
        Cell::new("NO").fg(Color::Red)
    }
}

/// Text progress bar such as `[##########          ]  50%`.
pub fn render_progress_bar(ratio: f64) -> String {
    let ratio = ratio.clamp(0.0, 1.0);
    let filled = (ratio * BAR_WIDTH as f64).round() as usize;
    format!(
        "[{}{}] {:>3.0}%",
        "#".repeat(filled),
        " ".repeat(BAR_WIDTH - filled),
        ratio * 100.0
    )
}

pub fn render_university_table(records: &[UniversityRecord]) -> String {
    let mut table = new_table();
    table.set_header(vec![
        "University",
        "Category",
        "Program",
        "Deadline",
        "App Fee",
        "Program Fee",
        "Requirements",
        "Expected Qualities",
        "Application Link",
    ]);
    for r in records {
        table.add_row(vec![
            r.university.clone(),
            r.category.to_string(),
            r.program.clone(),
            r.deadlines.clone(),
            r.application_fee.clone(),
            r.program_fee.clone(),
            r.requirements.clone(),
            r.expected_qualities.clone(),
            r.apply_link.clone(),
        ]);
    }
    table.to_string()
}

pub fn render_checklist_table(state: &ChecklistState, last_updated: Option<&str>) -> String {
    let mut table = new_table();
    table.set_header(vec!["Requirement", "Key", "Done"]);
    for requirement in Requirement::ALL {
        table.add_row(Row::from(vec![
            Cell::new(requirement.label()),
            Cell::new(requirement.as_key()),
            check_cell(state.requirement(requirement)),
        ]));
    }

    let mut out = table.to_string();
    out.push_str(&format!(
        "\nOverall progress: {} Complete ({}/{})",
        render_progress_bar(overall_progress(state)),
        state.completed_requirements(),
        Requirement::ALL.len()
    ));
    push_last_saved(&mut out, last_updated);
    out
}

fn push_last_saved(out: &mut String, last_updated: Option<&str>) {
    if let Some(saved) = last_updated {
        out.push_str(&format!("\nLast saved: {saved}"));
    }
}

/// One row per record in `records`, read from `state`. Universities with no
/// entry render as not started.
pub fn render_university_progress_table(
    state: &ChecklistState,
    records: &[UniversityRecord],
    last_updated: Option<&str>,
) -> String {
    let mut table = new_table();
    let mut header = vec!["University".to_string()];
    header.extend(UniversityField::ALL.iter().map(|f| f.label().to_string()));
    header.push("Progress".to_string());
    table.set_header(header);

    for record in records {
        let progress = state
            .university(&record.university)
            .copied()
            .unwrap_or_default();
        let mut cells = vec![Cell::new(&record.university)];
        cells.extend(
            UniversityField::ALL
                .iter()
                .map(|field| check_cell(progress.get(*field))),
        );
        cells.push(Cell::new(render_progress_bar(university_progress(&progress))));
        table.add_row(Row::from(cells));
    }

    let mut out = table.to_string();
    push_last_saved(&mut out, last_updated);
    out
}

pub fn render_stats_table(stats: &ApplicationStats) -> String {
    let mut table = new_table();
    table.set_header(vec!["Metric", "Value"]);
    table.add_row(vec!["Total Universities".to_string(), stats.total.to_string()]);
    table.add_row(vec![
        "Average Application Fee".to_string(),
        stats.average_fee_label(),
    ]);
    table.add_row(vec![
        "Self Apply Count".to_string(),
        stats.self_apply_count.to_string(),
    ]);
    table.add_row(vec![
        "IDP Consultancy Count".to_string(),
        stats.idp_consultancy_count.to_string(),
    ]);
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::{render_checklist_table, render_progress_bar, render_university_progress_table};
    use crate::progress::{ChecklistState, Requirement};
    use crate::university::{load_universities, BuiltinSource};

    #[test]
    fn progress_bar_scales_and_clamps() {
        assert_eq!(render_progress_bar(0.0), format!("[{}]   0%", " ".repeat(20)));
        assert_eq!(
            render_progress_bar(0.5),
            format!("[{}{}]  50%", "#".repeat(10), " ".repeat(10))
        );
        assert_eq!(render_progress_bar(1.7), format!("[{}] 100%", "#".repeat(20)));
    }

    #[test]
    fn checklist_reports_overall_share() {
        let mut state = ChecklistState::default();
        state.set(Requirement::Gre, true);
        state.set(Requirement::Toefl, true);
        state.set(Requirement::Sop, true);
        let rendered = render_checklist_table(&state, Some("2024-11-03 09:05:07"));
        assert!(rendered.contains("Letters of Recommendation"));
        assert!(rendered.contains("50% Complete (3/6)"));
        assert!(rendered.contains("Last saved: 2024-11-03 09:05:07"));
    }

    #[test]
    fn university_progress_lists_visible_rows() {
        let records = load_universities(&BuiltinSource).unwrap();
        let mut state = ChecklistState::default();
        state.ensure_university("UC Davis").fee_paid = true;
        let rendered = render_university_progress_table(&state, &records[..3], None);
        assert!(rendered.contains("UC Davis"));
        assert!(rendered.contains(" 25%"));
        assert!(!rendered.contains("Texas A&M"));
        assert!(!rendered.contains("Last saved"));
    }

    #[test]
    fn university_progress_shows_save_time() {
        let records = load_universities(&BuiltinSource).unwrap();
        let mut state = ChecklistState::default();
        state.ensure_university("UC Davis").application_started = true;
        let rendered =
            render_university_progress_table(&state, &records[..1], Some("2024-11-03 09:05:07"));
        assert!(rendered.ends_with("Last saved: 2024-11-03 09:05:07"));
    }
}
