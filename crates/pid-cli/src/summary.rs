use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use pid_core::{PidCheck, SurveyOutcome};
use pid_model::{CompletionSummary, Coverage, PidFormatSummary};
use pid_report::{NOT_APPLICABLE, format_percent};

use crate::types::{PidCheckRow, RunResult};

pub fn print_summary(result: &RunResult) {
    println!("Data record: {}", result.record.display());
    if result.dry_run {
        println!("Dry run: no files written");
    } else {
        println!("Output: {}", result.output_dir.display());
        for path in &result.outputs {
            println!("  {}", path.display());
        }
    }
    let reconciliation = &result.reconciliation;
    println!("{}", survey_table(&reconciliation.surveys));
    println!("{}", pid_format_table(&reconciliation.pid_format));
    println!("{}", completion_table(&reconciliation.completion));
    if !reconciliation.warnings.is_empty() {
        eprintln!("Warnings:");
        for warning in &reconciliation.warnings {
            eprintln!("- {warning}");
        }
    }
}

pub fn print_check(rows: &[PidCheckRow]) {
    println!("{}", check_table(rows));
}

/// Per-survey partition and merge counts with a total row.
pub fn survey_table(surveys: &[SurveyOutcome]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Survey"),
        header_cell("Phase"),
        header_cell("Records"),
        header_cell("Valid"),
        header_cell("Invalid"),
        header_cell("Matched"),
        header_cell("Unmatched"),
        header_cell("Repeated"),
    ]);
    apply_table_style(&mut table);
    for index in 2..8 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    let mut total_records = 0usize;
    let mut total_invalid = 0usize;
    let mut total_matched = 0usize;
    for survey in surveys {
        let invalid = survey.partition.invalid();
        total_records += survey.partition.total;
        total_invalid += invalid;
        total_matched += survey.merge.matched;
        table.add_row(vec![
            Cell::new(&survey.key)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(&survey.phase_label),
            Cell::new(survey.partition.total),
            Cell::new(survey.partition.valid),
            count_cell(invalid, Color::Red),
            Cell::new(survey.merge.matched),
            count_cell(survey.merge.unmatched, Color::Yellow),
            count_cell(survey.merge.repeated, Color::Yellow),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        Cell::new(total_records).add_attribute(Attribute::Bold),
        dim_cell("-"),
        count_cell(total_invalid, Color::Red).add_attribute(Attribute::Bold),
        Cell::new(total_matched).add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
    ]);
    table
}

pub fn pid_format_table(summary: &PidFormatSummary) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Phase"),
        header_cell("Correct PIDs"),
        header_cell("Incorrect PIDs"),
        header_cell("% Incorrect"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    for row in &summary.rows {
        let percent = format_percent(row.incorrect_percent);
        let percent_cell = if percent == NOT_APPLICABLE {
            dim_cell(percent)
        } else {
            Cell::new(percent)
        };
        table.add_row(vec![
            Cell::new(&row.phase),
            Cell::new(row.correct),
            count_cell(row.incorrect, Color::Red),
            percent_cell,
        ]);
    }
    table
}

/// Task coverage (rows) against survey coverage (columns).
pub fn completion_table(summary: &CompletionSummary) -> Table {
    let mut header = vec![header_cell("Tasks")];
    header.extend(summary.column_labels().iter().map(|label| header_cell(label)));
    let mut table = Table::new();
    table.set_header(header);
    apply_table_style(&mut table);
    for index in 1..5 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for (tasks, label) in Coverage::ALL.into_iter().zip(summary.row_labels()) {
        let mut row = vec![Cell::new(label).add_attribute(Attribute::Bold)];
        row.extend(
            Coverage::ALL
                .into_iter()
                .map(|surveys| Cell::new(summary.get(tasks, surveys))),
        );
        table.add_row(row);
    }
    table
}

pub fn check_table(rows: &[PidCheckRow]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Input"),
        header_cell("Canonical"),
        header_cell("Result"),
    ]);
    apply_table_style(&mut table);
    for row in rows {
        let canonical = if row.canonical.is_empty() {
            dim_cell("-")
        } else {
            Cell::new(&row.canonical)
        };
        table.add_row(vec![
            Cell::new(format!("{:?}", row.input)),
            canonical,
            check_cell(row.check),
        ]);
    }
    table
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn check_cell(check: PidCheck) -> Cell {
    if check.is_valid() {
        Cell::new(check.label()).fg(Color::Green)
    } else {
        Cell::new(check.label()).fg(Color::Red)
    }
}

/// Zero counts are dimmed; anything else takes `color`.
fn count_cell(count: usize, color: Color) -> Cell {
    if count == 0 {
        dim_cell(count)
    } else {
        Cell::new(count).fg(color)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
