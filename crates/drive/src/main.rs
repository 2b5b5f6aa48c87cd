use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use upqueue_drive::listing::{format_listing, LIST_FIELDS};
use upqueue_drive::{DriveApi, DriveConfig};

/// List the contents of a Google Drive folder.
#[derive(Debug, Parser)]
#[command(name = "upqueue-drivelist", version)]
struct Args {
    /// Id of the folder to list
    #[arg(short = 'p', long, default_value = "root")]
    folder: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "upqueue_drive=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let folder_id = args.folder;

    let config = DriveConfig::from_env().context("Failed to load Drive configuration")?;
    let api = DriveApi::new(config).context("Failed to create Drive client")?;

    let folder = match api.get_file(&folder_id, LIST_FIELDS).await {
        Ok(folder) => folder,
        Err(e) if e.is_not_found() => {
            println!("upqueue-drivelist: {folder_id}: No such folder");
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => return Err(e).context("Failed to get folder"),
    };

    let children = api
        .list_children(&folder_id, LIST_FIELDS)
        .await
        .context("Failed to list files")?;

    print!("{}", format_listing(&folder, &children));
    Ok(ExitCode::SUCCESS)
}
