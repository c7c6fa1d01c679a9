mod cli;

fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();
}

#[cfg(feature = "server")]
#[tokio::main]
async fn main() {
    init_logging();
    if let Err(err) = cli::dispatch().await {
        eprintln!("\u{001b}[31merror:\u{001b}[0m {err:?}");
        std::process::exit(1);
    }
}

#[cfg(not(feature = "server"))]
fn main() {
    init_logging();
    if let Err(err) = cli::dispatch_sync() {
        eprintln!("\u{001b}[31merror:\u{001b}[0m {err:?}");
        std::process::exit(1);
    }
}
