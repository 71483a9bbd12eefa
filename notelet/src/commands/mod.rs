use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use notelet_core::storage::{
    write_config, Config, Notebook, NoteId, RenameOutcome, Session, NOTE_EXTENSION,
};
use tracing::info;

// --- Handler Functions ---

pub async fn handle_list(session: &Session) -> Result<()> {
    let files = session.known_files();
    if files.is_empty() {
        println!("No notes yet.");
        return Ok(());
    }
    for path in files {
        if let Some(name) = path.file_name() {
            println!("{}", name.to_string_lossy());
        }
    }
    Ok(())
}

pub async fn handle_show(session: &Session, note: &Path) -> Result<()> {
    let path = resolve_note(session, note);
    let content = session
        .open_note(&path)
        .await
        .with_context(|| format!("Failed to open {}", path.display()))?;
    print!("{content}");
    Ok(())
}

pub async fn handle_new(session: &Session, content: Option<String>) -> Result<()> {
    let content = match content {
        Some(content) => content,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read note content from stdin")?;
            buf
        }
    };

    session.note_changed(content);
    session.flush().await.context("Failed to save the new note")?;

    match session.active_note().id {
        NoteId::Saved(path) => println!("Created {}", path.display()),
        NoteId::Draft => println!("Nothing to save: the note is empty."),
    }
    Ok(())
}

pub async fn handle_rename(session: &Session, note: &Path, name: &str) -> Result<()> {
    let path = resolve_note(session, note);
    session
        .open_note(&path)
        .await
        .with_context(|| format!("Failed to open {}", path.display()))?;

    match session.rename_note(name).await? {
        RenameOutcome::Renamed(target) => println!("Renamed to {}", target.display()),
        RenameOutcome::Blocked(existing) => {
            println!("A note named {} already exists.", existing.display())
        }
        RenameOutcome::Reverted => println!("Name unchanged."),
    }
    Ok(())
}

pub async fn handle_delete(session: &Session, note: &Path) -> Result<()> {
    let path = resolve_note(session, note);
    session
        .open_note(&path)
        .await
        .with_context(|| format!("Failed to open {}", path.display()))?;
    session
        .delete_note()
        .await
        .with_context(|| format!("Failed to delete {}", path.display()))?;

    match session.active_note().id {
        NoteId::Saved(next) => println!("Deleted. Current note is now {}", next.display()),
        NoteId::Draft => println!("Deleted. The folder is empty."),
    }
    Ok(())
}

pub async fn handle_use_folder(config_path: &Path, mut config: Config, path: PathBuf) -> Result<()> {
    let notebook = Notebook::create(&path)
        .await
        .with_context(|| format!("Failed to prepare notes folder {}", path.display()))?;

    config.root_dir = Some(notebook.root().to_path_buf());
    write_config(config_path, &config)
        .await
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

    info!(root = %notebook.root().display(), "Notes folder configured");
    println!("Using {}", notebook.root().display());
    Ok(())
}

/// Turns a user-supplied note argument into a path inside the notebook.
/// Bare names get the note extension appended and resolve against the root.
fn resolve_note(session: &Session, note: &Path) -> PathBuf {
    let mut path = note.to_path_buf();
    if path.extension().is_none() {
        path.set_extension(NOTE_EXTENSION);
    }
    if path.is_relative() {
        session.notebook().root().join(path)
    } else {
        path
    }
}
