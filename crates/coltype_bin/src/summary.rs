use std::fmt::Write as _;

use coltype::ColumnDescriptor;

/// Render parsed columns as an indented tree, one descriptor per line.
pub fn summarize(columns: &[ColumnDescriptor]) -> String {
    let mut out = String::new();
    for column in columns {
        write_column(&mut out, column, 0);
    }
    // Drop the final newline, println adds one.
    out.truncate(out.trim_end().len());
    out
}

fn write_column(out: &mut String, column: &ColumnDescriptor, indent: usize) {
    let name = if column.name().is_empty() { "-" } else { column.name() };
    let _ = write!(out, "{:indent$}{name}: {}", "", column.render_type());

    let mut flags = Vec::new();
    if column.is_fixed_length() {
        flags.push(format!("fixed {}B", column.estimated_byte_length()));
    } else {
        flags.push(format!("~{}B", column.estimated_byte_length()));
    }
    if column.is_low_cardinality() {
        flags.push("low cardinality".to_string());
    }
    if column.precision() != 0 || column.scale() != 0 {
        flags.push(format!("precision {} scale {}", column.precision(), column.scale()));
    }
    if let Some(tz) = column.time_zone() {
        flags.push(format!("tz {tz}"));
    }
    if column.is_array() {
        flags.push(format!("level {}", column.array_nesting_level()));
    }
    if column.is_enum() {
        let entries: Vec<_> = column
            .enum_constants()
            .iter()
            .map(|(label, value)| format!("{label}={value}"))
            .collect();
        flags.push(format!("enum [{}]", entries.join(", ")));
    }
    let _ = writeln!(out, " [{}]", flags.join(", "));

    for child in column.nested() {
        write_column(out, child, indent + 2);
    }
}
