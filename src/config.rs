use std::path::PathBuf;

use clap::Parser;

use crate::store::DEFAULT_STORAGE_KEY;

/// A tiny terminal notepad.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Config {
    /// SQLite file holding the saved notes
    #[arg(long, default_value = "notes.db")]
    pub db_path: PathBuf,

    /// Key the note list is stored under
    #[arg(long, default_value = DEFAULT_STORAGE_KEY)]
    pub storage_key: String,

    /// Where logs go, since the terminal belongs to the UI
    #[arg(long, default_value = "notes.log")]
    pub log_file: PathBuf,
}
