use daymark::cli::run_cli;
use tracing::error;

fn main() {
    if let Err(e) = run_cli() {
        // Argument errors print their own usage
        if let Some(e) = e.downcast_ref::<clap::Error>() {
            e.exit();
        }
        error!("Error running cli {e:?}");
        eprintln!("{e:#}");
        std::process::exit(1);
    }
}
