use std::path::PathBuf;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use photorg_core::{CancellationToken, OrganizeControl, OrganizeOptions};

#[derive(Parser)]
#[command(
    name = "photorg",
    version,
    about = "Organize images by date taken (EXIF or file timestamp)"
)]
struct Cli {
    /// Source folder(s)
    #[arg(short, long, required = true, num_args = 1..)]
    source: Vec<PathBuf>,

    /// Destination folder
    #[arg(short, long)]
    dest: PathBuf,

    /// Folder(s) to exclude from processing
    #[arg(short, long, num_args = 1..)]
    exclude: Vec<PathBuf>,

    /// Move files instead of copying them
    #[arg(short = 'm', long = "move")]
    move_files: bool,

    /// Optimize JPEG/PNG images after organizing
    #[arg(short, long)]
    optimize: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let token = CancellationToken::new();
    {
        let token = token.clone();
        ctrlc::set_handler(move || {
            eprintln!("\nInterrupt received. Stopping gracefully...");
            token.cancel();
        })?;
    }

    let options = OrganizeOptions {
        sources: cli.source,
        dest: cli.dest,
        exclude: cli.exclude,
        move_files: cli.move_files,
        optimize: cli.optimize,
    };
    let control = OrganizeControl::new().with_cancel_token(token);

    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::with_template("{msg:<50!} [{bar:30}] {pos}/{len}")
            .expect("valid progress template")
            .progress_chars("=>-"),
    );

    let progress = {
        let bar = bar.clone();
        move |stage: &str, current: u64, total: u64, message: &str| {
            if bar.length() != Some(total) {
                bar.set_length(total);
            }
            bar.set_position(current);
            bar.set_message(format!("[{}] {}", stage, message));
        }
    };
    let stats = photorg_core::organize_with_control(&options, &control, &progress)?;
    bar.finish_and_clear();

    if stats.interrupted {
        eprintln!("Stopped processing.");
    }

    println!("\nFinal Report:");
    println!("Total folders processed: {}", stats.folders_processed);
    println!("Total files processed: {}", stats.files_processed);
    println!(
        "New files: {}, Skipped: {}, Renamed: {}",
        stats.files_new, stats.files_skipped, stats.files_renamed
    );
    println!(
        "Total size processed: {:.2} MB",
        stats.bytes_processed as f64 / (1024.0 * 1024.0)
    );
    println!("Total time taken: {:.2} seconds", stats.elapsed_secs);

    Ok(())
}
