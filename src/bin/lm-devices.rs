//! List LogicMonitor devices, device DataSources and their instances.
//!
//! Prints a table per step and writes each collection as JSON under the
//! output directory.

use std::process::ExitCode;

use clap::Parser;
use lmexport::cli::DevicesCli;
use lmexport::devices::{self, DeviceListingOptions};
use lmexport::LmClient;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    lmexport::init_tracing();
    let cli = DevicesCli::parse();

    let client = match LmClient::from_env() {
        Ok(c) => c.with_retry_policy(cli.request.retry_policy()),
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Hint: Set ACCESS_ID, ACCESS_KEY and COMPANY environment variables");
            return ExitCode::FAILURE;
        }
    };

    match run(&client, cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(client: &LmClient, cli: DevicesCli) -> lmexport::Result<()> {
    let options = DeviceListingOptions {
        out_dir: cli.out,
        list: cli.request.list_options(),
        device_id: cli.device_id,
        datasource_id: cli.datasource_id,
    };

    let listing = devices::list_devices(client, &options).await?;
    println!("{}", devices::render_listing(&listing, cli.json)?);
    Ok(())
}
