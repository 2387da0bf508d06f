// src/cli.rs
use crate::core::{Clock, ConfigManager, Database, SystemClock};
use crate::linkedin::{ProfileDocument, ProfileRecord};
use crate::search;
use crate::service::{MatchOutcome, NoteChange, ProfileService, ServiceError};
use crate::utils::{clean_text, read_file_content};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

const EXPERIENCE_PREVIEW: usize = 3;

#[derive(Parser)]
#[command(name = "workmates")]
#[command(about = "Save LinkedIn profiles and find people with shared work history")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// SQLite database holding saved profiles (defaults to the configured path)
    #[arg(long, global = true)]
    pub database_path: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Extract the profile from a saved page and store it
    Save {
        /// Address the page was captured from
        #[arg(long)]
        url: String,
        /// Rendered HTML snapshot of the page
        #[arg(long)]
        html: PathBuf,
    },
    /// Find saved people who worked at the same company at the same time
    Matches {
        #[arg(long)]
        url: String,
        #[arg(long)]
        html: PathBuf,
    },
    /// List saved profiles
    List,
    /// Show one saved profile with its notes
    Show { profile_url: String },
    /// Delete a saved profile and its notes
    Delete { profile_url: String },
    /// Search saved profiles, experience and notes
    Search { query: String },
    /// Show counts of saved profiles, companies and notes
    Stats,
    /// Manage notes attached to a profile
    Note {
        #[command(subcommand)]
        command: NoteCommand,
    },
    /// Initialize the database
    Init,
}

#[derive(Subcommand)]
pub enum NoteCommand {
    /// Attach a note to a saved profile; blank content clears its notes
    Add { profile_url: String, content: String },
    /// Replace the text of a note; blank content deletes it
    Edit {
        profile_url: String,
        id: i64,
        content: String,
    },
    /// Delete every note of a profile
    Clear { profile_url: String },
    /// Show the notes of a profile
    List { profile_url: String },
}

pub async fn handle_command(cli: Cli, config: &ConfigManager) -> Result<()> {
    let database_path = cli
        .database_path
        .clone()
        .unwrap_or_else(|| config.database_path.clone());
    let database = Database::new(&database_path).await?;
    if matches!(cli.command, Command::Init) {
        database.health_check().await?;
    }

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let service = ProfileService::new(database, clock.clone());

    match cli.command {
        Command::Save { url, html } => {
            let doc = load_document(&url, &html).await?;
            match service.save_current(&doc).await {
                Ok(profile) => {
                    println!("✓ {} has been saved!", profile.name);
                    println!("  {}", profile.profile_url);
                    println!("  {} experiences", profile.work_experience.len());
                }
                Err(ServiceError::MissingIdentity) => {
                    println!("❌ Could not extract profile name. Please try on the main profile page.");
                }
                Err(e) => return Err(e).context("An error occurred. Please try again."),
            }
        }

        Command::Matches { url, html } => {
            let doc = load_document(&url, &html).await?;
            let outcome = service
                .find_shared_history(&doc)
                .await
                .context("An error occurred. Please try again.")?;
            print_matches(&outcome, clock.as_ref());
        }

        Command::List => {
            let profiles = service.list_profiles().await?;
            if profiles.is_empty() {
                println!("No profiles saved yet.");
            }
            for profile in &profiles {
                let notes = service.notes_for(&profile.profile_url).await?;
                print_profile(profile, search::notes_preview(&notes));
            }
        }

        Command::Show { profile_url } => match service.profile(&profile_url).await? {
            Some(profile) => {
                let notes = service.notes_for(&profile.profile_url).await?;
                print_profile(&profile, search::notes_preview(&notes));
                for exp in profile.work_experience.iter().skip(EXPERIENCE_PREVIEW) {
                    println!("  • {} at {} ({})", exp.title, exp.company, exp.duration);
                }
            }
            None => println!("❌ No saved profile for {}", profile_url),
        },

        Command::Delete { profile_url } => {
            if service.delete_profile(&profile_url).await? {
                println!("✓ Deleted {} and its notes", profile_url);
            } else {
                println!("❌ No saved profile for {}", profile_url);
            }
        }

        Command::Search { query } => {
            if query.trim().chars().count() < search::MIN_QUERY_CHARS {
                println!("Enter at least {} characters to search", search::MIN_QUERY_CHARS);
                return Ok(());
            }
            let hits = service.search(&query).await?;
            if hits.is_empty() {
                println!("No matches found");
            }
            for hit in hits {
                println!("{} - {}", or_unknown(&hit.profile.name), hit.profile.current_title);
                println!("  {}", hit.profile.profile_url);
                for exp in &hit.matching_experiences {
                    println!("  • {} at {}", exp.title, exp.company);
                }
                for note in hit.matching_notes.iter().take(2) {
                    if let Some(preview) = search::notes_preview(std::slice::from_ref(note)) {
                        println!("  ✎ {}", preview.preview);
                    }
                }
            }
        }

        Command::Stats => {
            let stats = service.stats().await?;
            println!(
                "{} profiles saved | {} companies | {} notes",
                stats.profiles, stats.companies, stats.notes
            );
        }

        Command::Note { command } => match command {
            NoteCommand::Add {
                profile_url,
                content,
            } => print_note_change(service.add_note(&profile_url, &content).await?, &profile_url),
            NoteCommand::Edit {
                profile_url,
                id,
                content,
            } => print_note_change(
                service.edit_note(&profile_url, id, &content).await?,
                &profile_url,
            ),
            NoteCommand::Clear { profile_url } => {
                let removed = service.clear_notes(&profile_url).await?;
                println!("✓ Removed {} notes from {}", removed, profile_url);
            }
            NoteCommand::List { profile_url } => {
                let notes = service.notes_for(&profile_url).await?;
                if notes.is_empty() {
                    println!("No notes for {}", profile_url);
                }
                for note in notes {
                    println!(
                        "[{}] {}",
                        note.updated_at.format("%Y-%m-%d %H:%M"),
                        note.content
                    );
                }
            }
        },

        Command::Init => {
            println!("✓ Database initialized at: {}", database_path.display());
            println!("  Tables: profiles, notes");
        }
    }

    Ok(())
}

async fn load_document(url: &str, html_path: &Path) -> Result<ProfileDocument> {
    let html = read_file_content(html_path).await?;
    info!("Loaded {} bytes of page snapshot for {}", html.len(), url);
    Ok(ProfileDocument::parse(url, &html))
}

fn print_note_change(change: NoteChange, profile_url: &str) {
    match change {
        NoteChange::Saved(note) => println!("✓ Note {} saved for {}", note.id, profile_url),
        NoteChange::Removed(count) => println!("✓ Removed {} notes from {}", count, profile_url),
        NoteChange::Missing => println!("❌ No such note for {}", profile_url),
    }
}

fn or_unknown(name: &str) -> &str {
    if name.is_empty() {
        "Unknown"
    } else {
        name
    }
}

fn print_matches(outcome: &MatchOutcome, clock: &dyn Clock) {
    let people = match outcome {
        MatchOutcome::NotEnoughData => {
            println!(
                "Not enough data to run a search. Please save profiles and ensure the current page has work experience listed."
            );
            return;
        }
        MatchOutcome::Matches(people) if people.is_empty() => {
            println!("No overlapping work history found.");
            return;
        }
        MatchOutcome::Matches(people) => people,
    };

    let now = clock.now().naive_utc();
    println!("Found shared work history!");
    for person in people {
        println!("• {} ({})", person.name, person.profile_url);
        for found in &person.experiences {
            println!("    {} - {}", found.company, found.saved_title);
            println!("    Overlap: {}", found.overlap.display(now));
        }
    }
}

fn print_profile(profile: &ProfileRecord, notes: Option<search::NotesPreview>) {
    println!("{}", or_unknown(&profile.name));
    println!(
        "  {}",
        if profile.current_title.is_empty() {
            "No title"
        } else {
            &profile.current_title
        }
    );
    println!("  {}", profile.profile_url);

    if let Some(notes) = notes {
        println!("  Notes ({}): {}", notes.count, notes.preview);
    }

    if profile.work_experience.is_empty() {
        println!("  No work experience found");
    }
    for exp in profile.work_experience.iter().take(EXPERIENCE_PREVIEW) {
        let mut line = format!("  • {}", clean_text(&exp.title));
        if !exp.company.is_empty() {
            line.push_str(&format!(" at {}", clean_text(&exp.company)));
        }
        if !exp.duration.is_empty() {
            line.push_str(&format!(" ({})", clean_text(&exp.duration)));
        }
        println!("{}", line);
    }
    if profile.work_experience.len() > EXPERIENCE_PREVIEW {
        println!(
            "  ...and {} more",
            profile.work_experience.len() - EXPERIENCE_PREVIEW
        );
    }
    println!("  Saved: {}", profile.last_updated.format("%Y-%m-%d"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_save_command() {
        let cli = Cli::try_parse_from([
            "workmates",
            "save",
            "--url",
            "https://www.linkedin.com/in/jane/",
            "--html",
            "jane.html",
            "--database-path",
            "/tmp/w.db",
        ])
        .unwrap();
        assert_eq!(cli.database_path, Some(PathBuf::from("/tmp/w.db")));
        match cli.command {
            Command::Save { url, html } => {
                assert_eq!(url, "https://www.linkedin.com/in/jane/");
                assert_eq!(html, PathBuf::from("jane.html"));
            }
            _ => panic!("expected save command"),
        }
    }

    #[test]
    fn test_parse_note_add() {
        let cli = Cli::try_parse_from(["workmates", "note", "add", "https://x/", "hello"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Note {
                command: NoteCommand::Add { .. }
            }
        ));
    }

    #[test]
    fn test_parse_note_edit_and_clear() {
        let cli =
            Cli::try_parse_from(["workmates", "note", "edit", "https://x/", "7", "new text"]).unwrap();
        match cli.command {
            Command::Note {
                command: NoteCommand::Edit { id, content, .. },
            } => {
                assert_eq!(id, 7);
                assert_eq!(content, "new text");
            }
            _ => panic!("expected note edit"),
        }

        let cli = Cli::try_parse_from(["workmates", "note", "clear", "https://x/"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Note {
                command: NoteCommand::Clear { .. }
            }
        ));
        assert!(Cli::try_parse_from(["workmates", "note", "edit", "https://x/", "seven", "t"]).is_err());
    }

    #[test]
    fn test_parse_show() {
        let cli = Cli::try_parse_from(["workmates", "show", "https://x/"]).unwrap();
        assert!(matches!(cli.command, Command::Show { ref profile_url } if profile_url == "https://x/"));
    }

    #[test]
    fn test_save_requires_html() {
        assert!(Cli::try_parse_from(["workmates", "save", "--url", "u"]).is_err());
    }
}
