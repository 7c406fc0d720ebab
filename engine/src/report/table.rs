// Console tables for reports, built with tabled
use tabled::{
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};

/// Renders `columns` and `rows` as a psql-style table. Columns listed in
/// `right_aligned` (by index) are right-aligned, the rest left-aligned.
pub fn render_table(columns: &[String], rows: &[Vec<String>], right_aligned: &[usize]) -> String {
    if columns.is_empty() {
        return String::new();
    }

    let mut builder = Builder::default();
    builder.push_record(columns.iter().cloned());
    for row in rows {
        builder.push_record(row.iter().cloned());
    }

    let mut table = builder.build();
    table.with(Style::psql());
    for &col in right_aligned {
        table.modify(Columns::new(col..=col), Alignment::right());
    }

    let mut rendered = table.to_string();
    rendered.push('\n');
    rendered
}
