//! `qmt import` command - CSV ingestion
//!
//! Bulk creation goes through the same store save path as interactive
//! creation, so imported risks and opportunities get their scores computed.

use clap::ValueEnum;
use console::style;
use csv::ReaderBuilder;
use miette::{IntoDiagnostic, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use crate::cli::commands::utils;
use crate::cli::GlobalOpts;
use crate::core::{store, Config};
use crate::entities::{Employee, Opportunity, Risk};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ImportKind {
    Risks,
    Opportunities,
    Employees,
}

#[derive(clap::Args, Debug)]
pub struct ImportArgs {
    /// What to import
    #[arg(value_enum)]
    pub kind: ImportKind,

    /// CSV file (headers: title, likelihood, impact, ... per record type)
    pub file: PathBuf,

    /// Owning organisation for all imported records (ID, @N, or name)
    #[arg(long)]
    pub org: Option<String>,

    /// Parse and report without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Continue past rows that fail instead of stopping
    #[arg(long)]
    pub skip_errors: bool,
}

#[derive(Debug, Default)]
struct ImportStats {
    rows_processed: usize,
    created: usize,
    errors: usize,
}

pub fn run(args: ImportArgs, global: &GlobalOpts) -> Result<()> {
    let project = utils::open_project(global)?;

    let stats = match args.kind {
        ImportKind::Risks => import_risks(&project, &args, global)?,
        ImportKind::Opportunities => import_opportunities(&project, &args, global)?,
        ImportKind::Employees => import_employees(&project, &args, global)?,
    };

    println!();
    if args.dry_run {
        println!(
            "{} Dry run: {} row(s) parsed, {} would be created, {} error(s)",
            style("✓").green(),
            stats.rows_processed,
            stats.created,
            stats.errors
        );
    } else {
        println!(
            "{} Imported {} record(s) from {} row(s), {} error(s)",
            style("✓").green(),
            stats.created,
            stats.rows_processed,
            stats.errors
        );
    }
    Ok(())
}

fn open_reader(path: &PathBuf) -> Result<csv::Reader<BufReader<File>>> {
    let file = File::open(path).into_diagnostic()?;
    Ok(ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(BufReader::new(file)))
}

fn build_header_map(headers: &csv::StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.to_lowercase(), i))
        .collect()
}

fn get_field(
    record: &csv::StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Option<String> {
    header_map
        .get(name)
        .and_then(|&i| record.get(i))
        .map(|s| s.to_string())
        .filter(|s| !s.is_empty())
}

fn row_error(stats: &mut ImportStats, skip: bool, row: usize, message: String) -> Result<()> {
    eprintln!("{} Row {}: {}", style("✗").red(), row, message);
    stats.errors += 1;
    if skip {
        Ok(())
    } else {
        Err(miette::miette!("{} (row {})", message, row))
    }
}

fn import_risks(
    project: &crate::core::Project,
    args: &ImportArgs,
    global: &GlobalOpts,
) -> Result<ImportStats> {
    let mut stats = ImportStats::default();
    let config = Config::load();
    let org = match &args.org {
        Some(query) => Some(utils::resolve_organisation(project, query)?.id),
        None => None,
    };
    let default_identifier = global.as_user.clone().or_else(|| config.acting_user());

    let mut rdr = open_reader(&args.file)?;
    let headers = rdr.headers().into_diagnostic()?.clone();
    let header_map = build_header_map(&headers);

    for (row_idx, result) in rdr.records().enumerate() {
        let row_num = row_idx + 2; // 1-indexed plus header row
        stats.rows_processed += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_error(&mut stats, args.skip_errors, row_num, format!("CSV parse error: {}", e))?;
                continue;
            }
        };

        let Some(title) = get_field(&record, &header_map, "title") else {
            row_error(
                &mut stats,
                args.skip_errors,
                row_num,
                "Missing required field 'title'".to_string(),
            )?;
            continue;
        };

        let identified_by = get_field(&record, &header_map, "identified_by")
            .or_else(|| default_identifier.clone());
        let Some(identified_by) = identified_by else {
            row_error(
                &mut stats,
                args.skip_errors,
                row_num,
                "Missing 'identified_by' and no acting user configured".to_string(),
            )?;
            continue;
        };

        let mut risk = Risk::new(title, identified_by, config.author());
        risk.likelihood = get_field(&record, &header_map, "likelihood").and_then(|v| v.parse().ok());
        risk.impact = get_field(&record, &header_map, "impact").and_then(|v| v.parse().ok());
        risk.description = get_field(&record, &header_map, "description");
        if let Some(status) = get_field(&record, &header_map, "status") {
            risk.status = status;
        }
        risk.organisation = org.clone();

        if !args.dry_run {
            store::save(project, &mut risk).map_err(|e| miette::miette!("{}", e))?;
        }
        stats.created += 1;
    }

    Ok(stats)
}

fn import_opportunities(
    project: &crate::core::Project,
    args: &ImportArgs,
    global: &GlobalOpts,
) -> Result<ImportStats> {
    let mut stats = ImportStats::default();
    let config = Config::load();
    let org = match &args.org {
        Some(query) => Some(utils::resolve_organisation(project, query)?.id),
        None => None,
    };
    let default_identifier = global.as_user.clone().or_else(|| config.acting_user());

    let mut rdr = open_reader(&args.file)?;
    let headers = rdr.headers().into_diagnostic()?.clone();
    let header_map = build_header_map(&headers);

    for (row_idx, result) in rdr.records().enumerate() {
        let row_num = row_idx + 2;
        stats.rows_processed += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_error(&mut stats, args.skip_errors, row_num, format!("CSV parse error: {}", e))?;
                continue;
            }
        };

        let Some(title) = get_field(&record, &header_map, "title") else {
            row_error(
                &mut stats,
                args.skip_errors,
                row_num,
                "Missing required field 'title'".to_string(),
            )?;
            continue;
        };

        let identified_by = get_field(&record, &header_map, "identified_by")
            .or_else(|| default_identifier.clone());
        let Some(identified_by) = identified_by else {
            row_error(
                &mut stats,
                args.skip_errors,
                row_num,
                "Missing 'identified_by' and no acting user configured".to_string(),
            )?;
            continue;
        };

        let mut opp = Opportunity::new(title, identified_by, config.author());
        opp.benefit = get_field(&record, &header_map, "benefit").and_then(|v| v.parse().ok());
        opp.feasibility =
            get_field(&record, &header_map, "feasibility").and_then(|v| v.parse().ok());
        opp.description = get_field(&record, &header_map, "description");
        if let Some(status) = get_field(&record, &header_map, "status") {
            opp.status = status;
        }
        opp.organisation = org.clone();

        if !args.dry_run {
            store::save(project, &mut opp).map_err(|e| miette::miette!("{}", e))?;
        }
        stats.created += 1;
    }

    Ok(stats)
}

fn import_employees(
    project: &crate::core::Project,
    args: &ImportArgs,
    _global: &GlobalOpts,
) -> Result<ImportStats> {
    let mut stats = ImportStats::default();
    let config = Config::load();

    let org = match &args.org {
        Some(query) => utils::resolve_organisation(project, query)?.id,
        None => {
            return Err(miette::miette!(
                "--org is required when importing employees"
            ))
        }
    };

    let mut rdr = open_reader(&args.file)?;
    let headers = rdr.headers().into_diagnostic()?.clone();
    let header_map = build_header_map(&headers);

    for (row_idx, result) in rdr.records().enumerate() {
        let row_num = row_idx + 2;
        stats.rows_processed += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_error(&mut stats, args.skip_errors, row_num, format!("CSV parse error: {}", e))?;
                continue;
            }
        };

        let Some(name) = get_field(&record, &header_map, "name") else {
            row_error(
                &mut stats,
                args.skip_errors,
                row_num,
                "Missing required field 'name'".to_string(),
            )?;
            continue;
        };

        let employee_id = get_field(&record, &header_map, "employee_id");
        if let Some(ref eid) = employee_id {
            if store::ensure_unique_employee_id(project, eid, None).is_err() {
                row_error(
                    &mut stats,
                    args.skip_errors,
                    row_num,
                    format!("Duplicate employee_id '{}'", eid),
                )?;
                continue;
            }
        }

        let mut employee = Employee::new(org.clone(), name, config.author());
        employee.designation = get_field(&record, &header_map, "designation");
        employee.email = get_field(&record, &header_map, "email");
        employee.phone_number = get_field(&record, &header_map, "phone");
        employee.employee_id = employee_id;
        employee.role = get_field(&record, &header_map, "role");

        if !args.dry_run {
            store::save(project, &mut employee).map_err(|e| miette::miette!("{}", e))?;
        }
        stats.created += 1;
    }

    Ok(stats)
}
