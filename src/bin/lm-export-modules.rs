//! Export LogicMonitor modules to JSON.
//!
//! Writes `<out>/<type>/index.json` plus one file per module for each
//! selected module type, then prints a summary table.

use std::process::ExitCode;

use clap::Parser;
use lmexport::cli::ExportModulesCli;
use lmexport::export::{self, ExportOptions, ModuleReport};
use lmexport::LmClient;
use tabled::{Table, Tabled};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    lmexport::init_tracing();
    let cli = ExportModulesCli::parse();

    let client = match LmClient::from_env() {
        Ok(c) => c.with_retry_policy(cli.request.retry_policy()),
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Hint: Set ACCESS_ID, ACCESS_KEY and COMPANY environment variables");
            return ExitCode::FAILURE;
        }
    };

    match run(&client, cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Returns whether every module type exported cleanly.
async fn run(client: &LmClient, cli: ExportModulesCli) -> lmexport::Result<bool> {
    let module_types = export::select_module_types(&cli.types)?;
    lmexport::output::ensure_dir(&cli.out)?;

    let options = ExportOptions {
        out_dir: cli.out,
        list: cli.request.list_options(),
    };

    let reports = export::export_modules(client, &module_types, &options).await;

    let rows: Vec<ReportRow> = reports.iter().map(ReportRow::from).collect();
    println!("{}", Table::new(rows));

    let failed = reports.iter().filter(|r| !r.is_ok()).count();
    if failed == 0 {
        println!("\nDone. Output in {}", options.out_dir.display());
    } else {
        println!(
            "\nDone; {failed} of {} module types failed. Output in {}",
            reports.len(),
            options.out_dir.display()
        );
    }
    Ok(failed == 0)
}

#[derive(Tabled)]
struct ReportRow {
    #[tabled(rename = "type")]
    module_type: String,
    endpoint: String,
    items: String,
    result: String,
}

impl From<&ModuleReport> for ReportRow {
    fn from(r: &ModuleReport) -> Self {
        let (items, result) = match &r.result {
            Ok(summary) => (
                summary.item_count.to_string(),
                format!("ok -> {}", summary.files.dir.display()),
            ),
            Err(e) => (String::new(), format!("failed: {e}")),
        };
        Self {
            module_type: r.module_type.to_string(),
            endpoint: r.module_type.endpoint().to_string(),
            items,
            result,
        }
    }
}
