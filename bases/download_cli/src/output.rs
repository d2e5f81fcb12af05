// bases/download_cli/src/output.rs
use song_pipeline::{BatchQueue, BatchReport, SongOutcome};
use song_primitives::SongReference;

pub struct OutputHandler {
    verbose: bool,
}

impl OutputHandler {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    pub fn print_song_outcome(&self, reference: &SongReference, outcome: &SongOutcome) {
        match outcome {
            SongOutcome::Downloaded(path) => println!("Downloaded: {}", path.display()),
            SongOutcome::NoMatch => println!("No video found for: {}", reference),
            SongOutcome::NoMetadata => println!("No catalog metadata, skipped: {}", reference),
            SongOutcome::DryRun { filename } => println!("Would download: {}", filename),
            SongOutcome::AlreadyPresent { filename } => println!("Already present: {}", filename),
        }
    }

    pub fn print_list_written(&self, queue: &BatchQueue) {
        println!("Wrote {} tracks to {}", queue.len(), queue.path().display());
        println!(
            "Download them with: songsync --list \"{}\"",
            queue.path().display()
        );
    }

    pub fn print_batch_report(&self, report: &BatchReport) {
        println!("Settled {} songs", report.completed.len());

        if self.verbose {
            report
                .completed
                .iter()
                .for_each(|reference| println!("  done: {}", reference));
            if !report.analysed.is_empty() {
                println!("Analysed {} songs", report.analysed.len());
            }
        }

        if !report.abandoned.is_empty() {
            eprintln!(
                "Gave up on {} songs, they remain in the list:",
                report.abandoned.len()
            );
            report
                .abandoned
                .iter()
                .for_each(|reference| eprintln!("  {}", reference));
        }
    }

    pub fn print_interrupted(&self) {
        eprintln!("\nInterrupted, unfinished songs remain in the list");
    }

    pub fn print_error(&self, error: &color_eyre::Report) {
        eprintln!("Error: {}", error);

        if self.verbose {
            eprintln!("\nError details:");
            error.chain().skip(1).for_each(|cause| {
                eprintln!("  caused by: {}", cause);
            });
        }
    }
}
