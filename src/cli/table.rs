//! Registry-driven list rendering
//!
//! One renderer serves every record type: the columns come from the
//! list-surface registry, the values from each record's `cell` accessor.

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{escape_csv, format_short_id, truncate_str};
use crate::cli::OutputFormat;
use crate::core::entity::Entity;
use crate::core::registry::{ListSpec, Tabular};
use crate::core::shortid::ShortIdIndex;

const MAX_CELL_WIDTH: usize = 28;

/// Render a list of records in the requested format.
/// `format` must already be resolved (never `Auto`).
pub fn render_list<T>(
    records: &[T],
    spec: &ListSpec,
    format: OutputFormat,
    short_ids: &ShortIdIndex,
    quiet: bool,
) -> Result<()>
where
    T: Entity + Tabular + Serialize,
{
    if records.is_empty() {
        match format {
            OutputFormat::Json => println!("[]"),
            OutputFormat::Yaml => println!("[]"),
            OutputFormat::Id | OutputFormat::Csv | OutputFormat::Md => {}
            _ => {
                println!("No records found.");
            }
        }
        return Ok(());
    }

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(records).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(&records).into_diagnostic()?;
            print!("{}", yaml);
        }
        OutputFormat::Id => {
            for record in records {
                println!("{}", record.id());
            }
        }
        OutputFormat::Csv => {
            println!("short_id,id,{}", spec.columns.join(","));
            for record in records {
                let short_id = short_ids
                    .get_short_id(&record.id().to_string())
                    .map(|n| n.to_string())
                    .unwrap_or_default();
                let cells: Vec<String> = spec
                    .columns
                    .iter()
                    .map(|c| escape_csv(&record.cell(c)))
                    .collect();
                println!("{},{},{}", short_id, record.id(), cells.join(","));
            }
        }
        OutputFormat::Md => {
            let mut builder = Builder::default();
            let mut header: Vec<String> = vec!["Short".to_string(), "ID".to_string()];
            header.extend(spec.columns.iter().map(|c| c.to_string()));
            builder.push_record(header);

            for record in records {
                let short_id = short_ids
                    .get_short_id(&record.id().to_string())
                    .map(|n| format!("@{}", n))
                    .unwrap_or_default();
                let mut row = vec![short_id, format_short_id(record.id())];
                row.extend(spec.columns.iter().map(|c| record.cell(c)));
                builder.push_record(row);
            }

            println!("{}", builder.build().with(Style::markdown()));
        }
        OutputFormat::Tsv | OutputFormat::Auto => {
            // Column widths from the widest cell, capped
            let widths: Vec<usize> = spec
                .columns
                .iter()
                .map(|c| {
                    let data_max = records
                        .iter()
                        .map(|r| r.cell(c).len())
                        .max()
                        .unwrap_or(0);
                    data_max.max(c.len()).min(MAX_CELL_WIDTH)
                })
                .collect();

            let mut header = format!("{:<6} {:<17}", style("SHORT").bold().dim(), style("ID").bold());
            for (column, width) in spec.columns.iter().zip(&widths) {
                header.push_str(&format!(
                    " {:<width$}",
                    style(column.to_uppercase()).bold(),
                    width = *width
                ));
            }
            println!("{}", header);

            let total: usize = 24 + widths.iter().map(|w| w + 1).sum::<usize>();
            println!("{}", "-".repeat(total));

            for record in records {
                let short_id = short_ids
                    .get_short_id(&record.id().to_string())
                    .map(|n| format!("@{}", n))
                    .unwrap_or_default();
                let mut row = format!(
                    "{:<6} {:<17}",
                    style(short_id).cyan(),
                    format_short_id(record.id())
                );
                for (column, width) in spec.columns.iter().zip(&widths) {
                    row.push_str(&format!(
                        " {:<width$}",
                        truncate_str(&record.cell(column), *width),
                        width = *width
                    ));
                }
                println!("{}", row);
            }

            if !quiet {
                println!();
                println!(
                    "{} record(s) found. Use {} to reference by short ID.",
                    style(records.len()).cyan(),
                    style("@N").cyan()
                );
            }
        }
    }

    Ok(())
}
