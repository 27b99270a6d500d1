// CLI entry point for the minesweeper session server.
//
// Starts a standalone server that game clients connect to. Each connection
// gets a private session: one board, one command loop, one countdown
// timer. See `server.rs` for the dispatcher and `session.rs` for the
// protocol engine.
//
// Usage:
//   server [OPTIONS]
//     --port <PORT>           Listen port (default: 8000)
//     --max-sessions <N>      Max concurrent sessions (default: 5)
//     --store <PATH>          Store file (default: minesweep_store.json)
//     --time <SECONDS>        Countdown start for new games (default: 1000)

use std::path::PathBuf;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use minesweep_server::server::{ServerConfig, start_server};
use minesweep_server::store::JsonFileStore;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let (config, store_path) = parse_args();

    let store = match JsonFileStore::open(&store_path) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            eprintln!("Failed to open store {}: {e}", store_path.display());
            std::process::exit(1);
        }
    };

    let (handle, addr) = match start_server(config, store) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Failed to start server: {e}");
            std::process::exit(1);
        }
    };

    println!("Minesweeper server listening on {addr}");
    println!("Press Ctrl+C to stop.");

    // The process exits on SIGINT/SIGTERM with its default disposition,
    // which tears down the accept loop and all session threads — fine for
    // a server whose only persistent state is the store file, rewritten
    // atomically per mutation. Park the main thread until then.
    let _keep = handle;
    loop {
        std::thread::park();
    }
}

/// Parse command-line arguments. Uses simple `std::env::args()` matching —
/// no clap dependency.
fn parse_args() -> (ServerConfig, PathBuf) {
    let mut config = ServerConfig::default();
    let mut store_path = PathBuf::from("minesweep_store.json");
    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "--port" => {
                i += 1;
                config.port = args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--port requires a valid port number");
                    std::process::exit(1);
                });
            }
            "--max-sessions" => {
                i += 1;
                config.max_sessions =
                    args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                        eprintln!("--max-sessions requires a valid number");
                        std::process::exit(1);
                    });
            }
            "--store" => {
                i += 1;
                store_path = args.get(i).map(PathBuf::from).unwrap_or_else(|| {
                    eprintln!("--store requires a path");
                    std::process::exit(1);
                });
            }
            "--time" => {
                i += 1;
                config.rules.starting_time =
                    args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                        eprintln!("--time requires a valid number of seconds");
                        std::process::exit(1);
                    });
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {other}");
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    (config, store_path)
}

fn print_usage() {
    println!("Usage: server [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --port <PORT>           Listen port (default: 8000)");
    println!("  --max-sessions <N>      Max concurrent sessions (default: 5)");
    println!("  --store <PATH>          Store file (default: minesweep_store.json)");
    println!("  --time <SECONDS>        Countdown start for new games (default: 1000)");
    println!("  --help, -h              Show this help");
}
