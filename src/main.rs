//! metaguide - bionic-reading transform for EPUB and XHTML files

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use metaguide::{Mode, metaguide_dir, metaguide_document, metaguide_epub};

#[derive(Parser)]
#[command(name = "metaguide")]
#[command(version, about = "Bionic-reading transform for EPUB and XHTML files", long_about = None)]
#[command(after_help = "EXAMPLES:
    metaguide epub book.epub guided.epub      Metaguide an EPUB
    metaguide epub -r guided.epub plain.epub  Restore the original text
    metaguide dir ~/books ~/books-guided      Process a directory tree")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Metaguide an EPUB file
    Epub {
        input: PathBuf,
        output: PathBuf,
        /// Remove metaguiding instead of applying it
        #[arg(short, long)]
        remove: bool,
    },
    /// Metaguide a standalone XHTML/HTML document
    Xhtml {
        input: PathBuf,
        output: PathBuf,
        /// Remove metaguiding instead of applying it
        #[arg(short, long)]
        remove: bool,
    },
    /// Metaguide every EPUB and XHTML file found under a directory
    Dir {
        input_dir: PathBuf,
        output_dir: PathBuf,
        /// Remove metaguiding instead of applying it
        #[arg(short, long)]
        remove: bool,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> metaguide::Result<()> {
    match command {
        Command::Epub {
            input,
            output,
            remove,
        } => {
            let data = std::fs::read(&input)?;
            let transformed = metaguide_epub(&data, mode_for(remove))?;
            std::fs::write(&output, transformed)?;
        }
        Command::Xhtml {
            input,
            output,
            remove,
        } => {
            let data = std::fs::read(&input)?;
            let transformed = metaguide_document(&data, mode_for(remove));
            std::fs::write(&output, transformed)?;
        }
        Command::Dir {
            input_dir,
            output_dir,
            remove,
        } => {
            let summary = metaguide_dir(&input_dir, &output_dir, mode_for(remove))?;
            println!(
                "processed {} file(s), skipped {}, {} error(s)",
                summary.processed, summary.skipped, summary.errors
            );
        }
    }
    Ok(())
}

fn mode_for(remove: bool) -> Mode {
    if remove { Mode::Remove } else { Mode::Apply }
}
