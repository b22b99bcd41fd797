//! Plain-text rendering of relations.
//!
//! Relations print as aligned tables headed by their attribute names, with a
//! row-count footer. Environments print one table per binding, sorted by
//! name so the output is deterministic.
//!
//! # Examples
//!
//! ```
//! use rela_lang::{Attribute, AttributeType, Relation, Schema, Value};
//! use rela_lang::output::to_table;
//!
//! let schema = Schema::new(vec![Attribute::new("name", AttributeType::String)]).unwrap();
//! let rel = Relation::new(schema, vec![vec![Value::from("John")]]).unwrap();
//!
//! assert_eq!(to_table(&rel), "name\n----\nJohn\n(1 row)\n");
//! ```

use crate::{evaluator::Environment, relation::Relation, value::Value};

pub struct TablePrinter {
    separator: &'static str,
}

impl TablePrinter {
    pub fn new() -> Self {
        TablePrinter { separator: " | " }
    }

    pub fn print(&self, relation: &Relation) -> String {
        let header: Vec<String> = relation.schema().names().map(str::to_string).collect();
        let cells: Vec<Vec<String>> = relation
            .rows()
            .iter()
            .map(|row| row.iter().map(Value::to_string).collect())
            .collect();

        let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
        for row in &cells {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let mut out = String::new();
        out.push_str(&self.print_line(&header, &widths));
        out.push_str(
            &widths
                .iter()
                .map(|w| "-".repeat(*w))
                .collect::<Vec<_>>()
                .join("-+-"),
        );
        out.push('\n');
        for row in &cells {
            out.push_str(&self.print_line(row, &widths));
        }

        let count = relation.len();
        out.push_str(&format!(
            "({} {})\n",
            count,
            if count == 1 { "row" } else { "rows" }
        ));
        out
    }

    fn print_line(&self, cells: &[String], widths: &[usize]) -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect();
        let mut line = padded.join(self.separator).trim_end().to_string();
        line.push('\n');
        line
    }
}

impl Default for TablePrinter {
    fn default() -> Self {
        Self::new()
    }
}

/// Renders one relation as an aligned text table.
pub fn to_table(relation: &Relation) -> String {
    TablePrinter::new().print(relation)
}

/// Renders every binding in `env` whose name is in `names` (all when empty),
/// sorted by name, each table preceded by `name:`.
pub fn environment_to_tables(env: &Environment, names: &[String]) -> String {
    let mut keys: Vec<&String> = env
        .keys()
        .filter(|k| names.is_empty() || names.contains(k))
        .collect();
    keys.sort();

    let printer = TablePrinter::new();
    keys.iter()
        .map(|k| format!("{}:\n{}", k, printer.print(&env[*k])))
        .collect::<Vec<_>>()
        .join("\n")
}
