use clap::Parser;
use failscribe::cli::{Cli, Command, InspectFormat, load_records};
use failscribe::session::TestSession;
use failscribe::store::{FailureStore, StoreLimits};
use failscribe::{FsResult, ReportWriter};

fn main() {
    failscribe::logging::init();

    if let Err(error) = run() {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run() -> FsResult<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Clean(args) => {
            TestSession::new(&args.out).begin()?;
            println!("cleaned report directory '{}'", args.out.display());
            Ok(())
        }
        Command::Render(args) => {
            if args.exit_status == 0 {
                println!("session exited cleanly, no reports generated");
                return Ok(());
            }

            let records = load_records(&args.records)?;
            let mut store = FailureStore::with_limits(StoreLimits {
                max_failures: args.max_failures,
                max_passed: args.max_passed,
            });
            for record in records {
                store.record_failure(record);
            }

            let summary = ReportWriter::new(&args.out).write_all(&store)?;
            if summary.written.is_empty() && summary.failed.is_empty() {
                println!("no failures to report");
                return Ok(());
            }

            for path in &summary.written {
                println!("generated {}", path.display());
            }
            for failure in &summary.failed {
                eprintln!("could not write report for `{}`: {}", failure.test_name, failure.error);
            }
            println!(
                "generated {} failure reports in '{}'",
                summary.written.len(),
                args.out.display()
            );
            Ok(())
        }
        Command::Inspect(args) => {
            let records = load_records(&args.records)?;
            match args.format {
                InspectFormat::Plain => {
                    for record in &records {
                        let exception = record.exception_type.as_deref().unwrap_or("unknown");
                        println!("{} | {}", record.test_name, exception);
                    }
                    println!("{} captured failures", records.len());
                }
                InspectFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&records)?);
                }
                InspectFormat::Ndjson => {
                    for record in &records {
                        println!("{}", serde_json::to_string(record)?);
                    }
                }
            }
            Ok(())
        }
    }
}
