//! Best-score persistence
//!
//! A single decimal integer in its own file, kept deliberately simpler than
//! the settings JSON. Anything unreadable counts as no record yet.

use std::fs;
use std::path::Path;

/// Best-score file name in the working directory
pub const FILE_NAME: &str = "ridgerun_bestscore";

/// Load the recorded best score; a missing or malformed file reads as 0
pub fn load() -> u64 {
    load_from(Path::new(FILE_NAME))
}

pub fn load_from(path: &Path) -> u64 {
    match fs::read_to_string(path) {
        Ok(text) => match text.trim().parse::<u64>() {
            Ok(score) => score,
            Err(err) => {
                log::warn!("Malformed best-score file {}: {err}", path.display());
                0
            }
        },
        Err(_) => 0,
    }
}

/// Record `score` if it beats the stored best; returns the new best
pub fn update(score: u64) -> u64 {
    update_at(Path::new(FILE_NAME), score)
}

pub fn update_at(path: &Path, score: u64) -> u64 {
    let best = load_from(path);
    if score <= best {
        return best;
    }
    if let Err(err) = fs::write(path, score.to_string()) {
        log::warn!("Could not save best score to {}: {err}", path.display());
    } else {
        log::info!("New best score: {score}");
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("ridgerun_bestscore_test");
        std::fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    #[test]
    fn test_missing_file_reads_as_zero() {
        assert_eq!(load_from(Path::new("/definitely/not/here")), 0);
    }

    #[test]
    fn test_malformed_file_reads_as_zero() {
        let path = temp_path("malformed");
        std::fs::write(&path, "not a number").unwrap();
        assert_eq!(load_from(&path), 0);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_update_keeps_the_maximum() {
        let path = temp_path("max");
        std::fs::remove_file(&path).ok();

        assert_eq!(update_at(&path, 100), 100);
        assert_eq!(load_from(&path), 100);
        // A lower score does not overwrite the record
        assert_eq!(update_at(&path, 50), 100);
        assert_eq!(load_from(&path), 100);
        assert_eq!(update_at(&path, 250), 250);

        std::fs::remove_file(&path).ok();
    }
}
