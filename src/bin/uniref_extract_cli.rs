use indicatif::{ProgressBar, ProgressStyle};
use std::env;
use std::path::PathBuf;
use std::process;

use uniref_extract_rs::extract_lineage;

fn spinner(color: &str, msg: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&[
                "⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏",
            ])
            .template(&format!("{{spinner:.{color}}} {{msg}}"))
            .expect("Invalid spinner template"),
    );
    bar.set_message(msg.to_string());
    bar
}

fn main() {
    env_logger::init();

    let args: Vec<PathBuf> = env::args_os().skip(1).map(PathBuf::from).collect();
    if args.len() != 5 {
        eprintln!(
            "usage: uniref-extract-rs <taxonomy-nodes> <uniref90-xml> <uniparc-fasta> <out-fasta> <out-tsv>"
        );
        process::exit(2);
    }

    let bar = spinner(
        "green",
        "Extracting bacterial and phage clusters (two passes, this can take a while)...",
    );

    match extract_lineage(&args[0], &args[1], &args[2], &args[3], &args[4]) {
        Ok(summary) => {
            bar.finish_with_message(format!(
                "Done: {} entries scanned, {} written directly, {} resolved via UniParc, {} unresolved.",
                summary.entries_seen,
                summary.direct_records,
                summary.resolved_records,
                summary.unresolved_records
            ));
            if summary.unexpected_seed_types > 0 {
                eprintln!(
                    "{} entries had unexpected seed reference types and were dropped (see warnings).",
                    summary.unexpected_seed_types
                );
            }
        }
        Err(e) => {
            bar.abandon_with_message("Extraction failed.");
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
