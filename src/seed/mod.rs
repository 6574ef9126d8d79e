//! Sample SQLite database used as the plaintext for `create`.
//!
//! The database is built in a hidden temp file next to the output,
//! read back whole, and deleted once the container has been written.

use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection};

use crate::errors::Result;

/// Users inserted into the sample database: (username, email).
pub const SAMPLE_USERS: [(&str, &str); 3] = [
    ("alice", "alice@example.com"),
    ("bob", "bob@example.com"),
    ("charlie", "charlie@example.com"),
];

/// Posts inserted into the sample database: (user_id, title, content).
pub const SAMPLE_POSTS: [(i64, &str, &str); 6] = [
    (1, "My First Post", "This is the content of my first post!"),
    (1, "Another Post", "More content here..."),
    (2, "Bob's Thoughts", "Just sharing some thoughts"),
    (2, "Weekend Plans", "Hiking, probably."),
    (3, "Hello World", "Classic first post"),
    (3, "Second Try", "Still getting the hang of this"),
];

const SCHEMA: &str = "
    CREATE TABLE users (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        username    TEXT UNIQUE NOT NULL,
        email       TEXT UNIQUE NOT NULL,
        created_at  DATETIME DEFAULT CURRENT_TIMESTAMP
    );
    CREATE TABLE posts (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id     INTEGER,
        title       TEXT NOT NULL,
        content     TEXT,
        created_at  DATETIME DEFAULT CURRENT_TIMESTAMP,
        FOREIGN KEY (user_id) REFERENCES users (id)
    );
";

/// A plaintext database file waiting to be sealed.
///
/// Dropping it without calling `discard` still removes the file, but
/// ignores any error doing so.
#[derive(Debug)]
pub struct StagedDatabase {
    path: PathBuf,
    discarded: bool,
}

impl StagedDatabase {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the full database file.
    pub fn read(&self) -> Result<Vec<u8>> {
        Ok(fs::read(&self.path)?)
    }

    /// Delete the staged file.
    pub fn discard(mut self) -> Result<()> {
        self.discarded = true;
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

impl Drop for StagedDatabase {
    fn drop(&mut self) {
        if !self.discarded {
            let _ = fs::remove_file(&self.path);
        }
    }
}

/// Build the sample database in `dir` and return its staging handle.
pub fn stage_sample_database(dir: &Path) -> Result<StagedDatabase> {
    let path = dir.join(format!(".sqlseal-plain-{}.db.tmp", std::process::id()));
    if path.exists() {
        fs::remove_file(&path)?;
    }
    let staged = StagedDatabase {
        path,
        discarded: false,
    };

    let mut conn = Connection::open(staged.path())?;
    conn.execute_batch(SCHEMA)?;

    let tx = conn.transaction()?;
    for (username, email) in SAMPLE_USERS {
        tx.execute(
            "INSERT INTO users (username, email) VALUES (?1, ?2)",
            params![username, email],
        )?;
    }
    for (user_id, title, content) in SAMPLE_POSTS {
        tx.execute(
            "INSERT INTO posts (user_id, title, content) VALUES (?1, ?2, ?3)",
            params![user_id, title, content],
        )?;
    }
    tx.commit()?;
    conn.close().map_err(|(_, e)| e)?;

    tracing::debug!(path = %staged.path().display(), "staged sample database");
    Ok(staged)
}
