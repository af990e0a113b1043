use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::types::{DatasetSummary, RunResult};

pub fn print_summary(result: &RunResult) {
    println!("Output: {}", result.output_dir.display());
    println!(
        "Changes since: {}",
        result.watermark.format("%Y-%m-%dT%H:%M:%SZ")
    );
    println!("Countries updated: {}", result.countries);
    if result.dry_run {
        println!("Dry run: nothing published, last run date unchanged");
    }
    if result.datasets.is_empty() {
        println!("No datasets produced.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Type"),
        header_cell("Scope"),
        header_cell("Dataset"),
        header_cell("Rows"),
        header_cell("Resources"),
        header_cell("Showcase"),
        header_cell("Published"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);
    align_column(&mut table, 5, CellAlignment::Center);
    align_column(&mut table, 6, CellAlignment::Center);
    for dataset in ordered_datasets(&result.datasets) {
        table.add_row(vec![
            Cell::new(dataset.dataset_type.to_string()),
            scope_cell(&dataset.scope),
            Cell::new(&dataset.name),
            Cell::new(dataset.rows),
            Cell::new(dataset.resources),
            flag_cell(dataset.showcase),
            flag_cell(dataset.manifest.is_some()),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        Cell::new(format!("{} datasets", result.datasets.len()))
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(result.total_rows()).add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
        dim_cell("-"),
    ]);
    println!("{table}");
}

/// Compact style for listings.
pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(140);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

/// Type first, then global before countries, then ISO3.
fn ordered_datasets(datasets: &[DatasetSummary]) -> Vec<&DatasetSummary> {
    let mut ordered: Vec<&DatasetSummary> = datasets.iter().collect();
    ordered.sort_by(|a, b| {
        (a.dataset_type.to_string(), a.scope != "global", &a.scope).cmp(&(
            b.dataset_type.to_string(),
            b.scope != "global",
            &b.scope,
        ))
    });
    ordered
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn scope_cell(scope: &str) -> Cell {
    if scope == "global" {
        Cell::new(scope)
            .fg(Color::Blue)
            .add_attribute(Attribute::Bold)
    } else {
        Cell::new(scope)
    }
}

fn flag_cell(set: bool) -> Cell {
    if set {
        Cell::new("✓")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold)
    } else {
        dim_cell("-")
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
