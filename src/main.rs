//! snapsolve — command-line shell around the core.
//!
//! Stands in for the desktop window/hotkey layer: reads one command per
//! line from stdin and drives the queue manager and pipeline controller.
//! No business logic lives here.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use snapsolve::capture::PrimaryMonitorCapture;
use snapsolve::llm::AnthropicSolver;
use snapsolve::{LogNotifier, PipelineController, QueueManager, ShotStore};

#[tokio::main]
async fn main() {
    // Load .env.local → .env from the project root. CARGO_MANIFEST_DIR
    // finds it regardless of the binary's working directory.
    let manifest_dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
    'env_load: for env_file in [".env.local", ".env"] {
        let path = manifest_dir.join(env_file);
        if path.exists() {
            match dotenvy::from_path(&path) {
                Ok(_) => eprintln!("[STARTUP] Loaded {}", path.display()),
                Err(e) => eprintln!("[STARTUP] Failed to load {}: {}", path.display(), e),
            }
            break 'env_load;
        }
    }

    env_logger::init();
    log::info!("snapsolve starting up");

    let store = match ShotStore::in_default_location() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Could not open screenshot store: {}", e);
            std::process::exit(1);
        }
    };
    log::info!("[STARTUP] Screenshot store at {}", store.root().display());

    let queues = Arc::new(QueueManager::new(Arc::new(PrimaryMonitorCapture), store));
    let controller = Arc::new(PipelineController::new(
        Arc::clone(&queues),
        Arc::new(AnthropicSolver::new()),
        Arc::new(LogNotifier),
    ));
    if let Ok(language) = std::env::var("SNAPSOLVE_LANGUAGE") {
        controller.set_language(language);
    }

    println!("commands: snap | run | cancel | reset | mode | list | quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        match line.trim() {
            "snap" => match queues.capture(controller.mode()).await {
                Ok(path) => println!("captured {}", path.display()),
                Err(e) => eprintln!("capture failed: {}", e),
            },
            "run" => {
                // Spawn so a long provider call doesn't block the prompt;
                // a second `run` meanwhile supersedes this one.
                let controller = Arc::clone(&controller);
                tokio::spawn(async move {
                    let outcome = controller.run().await;
                    println!("run finished: {:?}", outcome);
                });
            }
            "cancel" => controller.cancel(),
            "reset" => {
                controller.reset();
                println!("reset to intake");
            }
            "mode" => println!("mode: {:?}", controller.mode()),
            "list" => {
                let kind = controller.mode().target_queue();
                for path in queues.list(kind) {
                    println!("{}", path.display());
                }
            }
            "quit" | "exit" => break,
            "" => {}
            other => eprintln!("unknown command: {}", other),
        }
    }

    log::info!("snapsolve shutting down");
}
