//! Command-line front end over `easynotes_core`.
//!
//! # Responsibility
//! - Render markdown files as the preview's node outline.
//! - List notes from a database with the same filter the app uses.

mod cli;

use clap::Parser;
use cli::{CliConfig, Command};
use easynotes_core::{
    core_version, derive_preview_text, init_logging, parse_markdown, LogLevel, MarkdownNode,
    NoteRepository, RepositoryConfig,
};
use log::debug;
use std::process::ExitCode;

fn main() -> ExitCode {
    let config = CliConfig::parse();
    if let Some(log_dir) = &config.log_dir {
        if let Err(err) = init_logging(LogLevel::for_build().as_str(), log_dir) {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    }

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: CliConfig) -> Result<(), Box<dyn std::error::Error>> {
    match config.command {
        Command::Version => println!("easynotes_core version={}", core_version()),
        Command::Render { file } => {
            let source = std::fs::read_to_string(&file)
                .map_err(|err| format!("cannot read `{}`: {err}", file.display()))?;
            let mut out = String::new();
            for node in parse_markdown(&source) {
                write_outline(&mut out, &source, &node, 0);
            }
            print!("{out}");
        }
        Command::List { query } => {
            let repo = NoteRepository::open(&config.db, RepositoryConfig::default())?;
            let notes = repo.get_all_notes().filtered(query.as_deref().unwrap_or(""));
            debug!(
                "event=cli_list module=cli status=ok notes={}",
                notes.len()
            );
            for note in notes {
                let preview = derive_preview_text(&note.description).unwrap_or_default();
                println!(
                    "{}\t{}\t{}\t{preview}",
                    note.id, note.updated_time, note.name
                );
            }
        }
    }
    Ok(())
}

fn write_outline(out: &mut String, source: &str, node: &MarkdownNode, depth: usize) {
    let indent = "  ".repeat(depth);
    if node.children.is_empty() {
        out.push_str(&format!(
            "{indent}{:?} {:?}\n",
            node.kind,
            node.content.slice(source)
        ));
        return;
    }
    out.push_str(&format!("{indent}{:?}\n", node.kind));
    for child in &node.children {
        write_outline(out, source, child, depth + 1);
    }
}
