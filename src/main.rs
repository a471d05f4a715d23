use anyhow::Result;
use clap::Parser;
use routing_cycle_detector::{init_tracing_once, process_worker_main, solve, Cli, RunConfig};

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.process_worker {
        return process_worker_main(&cli.paths);
    }

    init_tracing_once(&cli.log_level);

    let Some(input_file) = cli.input_file() else {
        anyhow::bail!("an input file is required");
    };

    let config = RunConfig::new(input_file)
        .with_buckets(cli.buckets)
        .with_executor(cli.executor)
        .with_worker_limit(cli.workers)
        .with_progress(!cli.no_progress);

    match solve(&config) {
        Ok(Some(result)) => {
            println!(
                "{},{},{}",
                String::from_utf8_lossy(&result.claim_id),
                String::from_utf8_lossy(&result.status_code),
                result.cycle_length
            );
            Ok(())
        }
        Ok(None) => {
            println!("0");
            Ok(())
        }
        Err(e) => {
            eprintln!("routing-cycle-detector: {e:#}");
            std::process::exit(1);
        }
    }
}
