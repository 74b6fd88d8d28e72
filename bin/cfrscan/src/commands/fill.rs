//! Spreadsheet back-fill: look up every vessel without a CFR and save an
//! updated copy of the sheet.

use anyhow::Context;
use cfrscan_core::SpreadsheetConfig;
use cfrscan_sheet::{back_fill, read_sheet, write_sheet, BatchColumns, CfrSource, FillReport};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct FillOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub sheet_index: usize,
    pub columns: BatchColumns,
}

impl FillOptions {
    /// Options from config, with any command-line overrides applied.
    pub fn resolve(
        config: &SpreadsheetConfig,
        input: PathBuf,
        output: Option<PathBuf>,
        sheet_index: Option<usize>,
        name_column: Option<String>,
        cfr_column: Option<String>,
    ) -> Self {
        let mut columns = BatchColumns::from_config(config);
        if let Some(name) = name_column {
            columns.name_column = name;
        }
        if let Some(cfr) = cfr_column {
            columns.cfr_column = cfr;
        }
        Self {
            input,
            output: output.unwrap_or_else(|| PathBuf::from(&config.output_file)),
            sheet_index: sheet_index.unwrap_or(config.sheet_index),
            columns,
        }
    }
}

pub async fn run(options: &FillOptions, source: &dyn CfrSource) -> anyhow::Result<FillReport> {
    let table = read_sheet(&options.input, options.sheet_index)
        .with_context(|| format!("reading {}", options.input.display()))?;

    let report = back_fill(&table, &options.columns, source, |i, total, item| {
        println!("Buscando CFR para el buque: {} ({}/{})", item.vessel_name, i, total);
    })
    .await?;

    write_sheet(&report.table, &options.output)
        .with_context(|| format!("writing {}", options.output.display()))?;

    println!(
        "✅ Proceso completado, archivo guardado como '{}' ({} consultados, {} encontrados)",
        options.output.display(),
        report.looked_up,
        report.found
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cfrscan_census::testing::{FakeLauncher, FakeSite};
    use cfrscan_census::{VesselLookup, NOT_FOUND_MESSAGE};
    use cfrscan_core::CensusConfig;
    use cfrscan_sheet::{Cell, Table};
    use tempfile::TempDir;

    fn write_input(path: &std::path::Path) -> Table {
        let mut table = Table::new("Buques", vec!["BUQUE".into(), "CodigoCFR".into(), "PUERTO".into()]);
        table.push_row(vec![Cell::Text("NUEVO PILAR".into()), Cell::Empty, Cell::Text("Vigo".into())]);
        table.push_row(vec![
            Cell::Text("ARGOS".into()),
            Cell::Text("ESP000000010".into()),
            Cell::Text("Cádiz".into()),
        ]);
        table.push_row(vec![Cell::Text("MARÍA".into()), Cell::Empty, Cell::Number(3.0)]);
        write_sheet(&table, path).unwrap();
        table
    }

    #[test]
    fn test_resolve_overrides() {
        let config = SpreadsheetConfig::default();
        let opts = FillOptions::resolve(&config, "in.xlsx".into(), None, None, None, Some("CFR".into()));
        assert_eq!(opts.output, PathBuf::from("archivo_actualizado.xlsx"));
        assert_eq!(opts.sheet_index, 1);
        assert_eq!(opts.columns.name_column, "BUQUE");
        assert_eq!(opts.columns.cfr_column, "CFR");
    }

    #[tokio::test]
    async fn test_run_writes_updated_copy() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("licencias.xlsx");
        let output = dir.path().join("archivo_actualizado.xlsx");
        let input_table = write_input(&input);

        let launcher = FakeLauncher::new(FakeSite::new().with_labelled_cfr("ESP000024683"));
        let stats = launcher.stats();
        let lookup = VesselLookup::new(
            launcher,
            CensusConfig {
                wait_timeout_secs: 1,
                ..CensusConfig::default()
            },
        );

        let options = FillOptions::resolve(
            &SpreadsheetConfig::default(),
            input.clone(),
            Some(output.clone()),
            Some(0),
            None,
            None,
        );

        let report = run(&options, &lookup).await.unwrap();
        assert_eq!(report.looked_up, 2);

        let written = read_sheet(&output, 0).unwrap();
        assert_eq!(written.headers, input_table.headers);
        assert_eq!(written.rows[0][1], Cell::Text("ESP000024683".into()));
        assert_eq!(written.rows[1], input_table.rows[1]);
        assert_eq!(written.rows[2][1], Cell::Text("ESP000024683".into()));
        assert_eq!(written.rows[2][2], Cell::Number(3.0));

        // input file is left as it was
        assert_eq!(read_sheet(&input, 0).unwrap(), input_table);
        assert_eq!(
            stats.lock().unwrap().searches,
            vec!["NUEVO PILAR".to_string(), "MARÍA".to_string()]
        );
    }

    #[tokio::test]
    async fn test_run_records_failures_in_cell() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("licencias.xlsx");
        let output = dir.path().join("out.xlsx");
        write_input(&input);

        let lookup = VesselLookup::new(FakeLauncher::failing(), CensusConfig::default());
        let options = FillOptions::resolve(
            &SpreadsheetConfig::default(),
            input,
            Some(output.clone()),
            Some(0),
            None,
            None,
        );

        let report = run(&options, &lookup).await.unwrap();
        assert_eq!(report.found, 0);
        let written = read_sheet(&output, 0).unwrap();
        assert_eq!(written.rows[0][1], Cell::Text(NOT_FOUND_MESSAGE.into()));
    }

    #[tokio::test]
    async fn test_run_missing_input_is_error() {
        let dir = TempDir::new().unwrap();
        let options = FillOptions::resolve(
            &SpreadsheetConfig::default(),
            dir.path().join("missing.xlsx"),
            Some(dir.path().join("out.xlsx")),
            None,
            None,
            None,
        );
        let lookup = VesselLookup::new(FakeLauncher::failing(), CensusConfig::default());
        assert!(run(&options, &lookup).await.is_err());
        assert!(!dir.path().join("out.xlsx").exists());
    }
}
