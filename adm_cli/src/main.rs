use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use adm_core::manager::transfer_manager::TransferManager;
use adm_core::storage::disk_storage::DiskStorage;
use adm_core::transport::http_transport::HttpTransport;
use adm_core::types::types::{Method, TransferRequest};

mod terminal_observer;
use terminal_observer::TerminalObserver;

#[derive(Parser)]
#[command(name = "adm", about = "Async Download Manager")]
struct Args {
    /// URL to fetch
    #[arg(short, long)]
    url: String,

    /// Destination path, resolved against --root
    #[arg(short, long)]
    output: String,

    /// HTTP method (GET or POST)
    #[arg(short, long, default_value = "GET")]
    method: String,

    /// Request body for POST
    #[arg(short, long)]
    data: Option<String>,

    /// Directory all destination paths resolve under
    #[arg(long, default_value = ".")]
    root: PathBuf,
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let args = Args::parse();

    let method = match args.method.to_uppercase().as_str() {
        "GET" => Method::Get,
        "POST" => Method::Post,
        other => {
            eprintln!("unsupported method: {}", other);
            std::process::exit(2);
        }
    };

    let manager = TransferManager::new(
        Arc::new(HttpTransport::new()),
        Arc::new(DiskStorage::new(args.root)),
    );

    let request = match method {
        Method::Get => TransferRequest::get(args.url.clone(), args.output),
        Method::Post => TransferRequest::post(
            args.url.clone(),
            args.output,
            args.data.unwrap_or_default().into_bytes(),
        ),
    };
    let request = request.with_observer(Arc::new(TerminalObserver::new()));

    println!("Fetching {}", args.url);
    let handle = match manager.submit(request).await {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("submit failed: {}", e);
            std::process::exit(2);
        }
    };

    // Ctrl-C requests a cooperative abort; the manager drains before exit.
    tokio::select! {
        _ = manager.wait_idle() => {}
        _ = tokio::signal::ctrl_c() => {
            eprintln!("interrupted, aborting transfer {}", handle);
            manager.abort(handle).await;
            manager.wait_idle().await;
        }
    }
}
