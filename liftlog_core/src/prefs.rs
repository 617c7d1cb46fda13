//! Small one-line preferences kept beside the collections: the current split
//! and the workout being recorded.

use crate::Result;
use std::path::{Path, PathBuf};

const SPLIT_FILE: &str = "current_split";
const CURRENT_WORKOUT_FILE: &str = "current_workout";

fn read_line(path: &Path) -> Result<String> {
    if !path.exists() {
        return Ok(String::new());
    }
    let contents = std::fs::read_to_string(path)?;
    Ok(contents.trim().to_string())
}

fn write_line(path: &Path, value: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, value.trim())?;
    Ok(())
}

/// Persisted label of the training split the user is following
#[derive(Clone, Debug)]
pub struct SplitPreference {
    path: PathBuf,
}

impl SplitPreference {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(SPLIT_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored label, or an empty string when none has been saved
    pub fn load(&self) -> Result<String> {
        read_line(&self.path)
    }

    pub fn save(&self, label: &str) -> Result<()> {
        write_line(&self.path, label)?;
        tracing::debug!("Saved current split '{}'", label.trim());
        Ok(())
    }
}

/// Id of the workout being recorded, so a session survives between commands
#[derive(Clone, Debug)]
pub struct CurrentWorkoutPointer {
    path: PathBuf,
}

impl CurrentWorkoutPointer {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(CURRENT_WORKOUT_FILE),
        }
    }

    pub fn load(&self) -> Result<Option<String>> {
        let id = read_line(&self.path)?;
        Ok((!id.is_empty()).then_some(id))
    }

    pub fn save(&self, id: &str) -> Result<()> {
        write_line(&self.path, id)?;
        tracing::debug!("Recording workout {}", id.trim());
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_split_is_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let pref = SplitPreference::new(temp_dir.path());
        assert_eq!(pref.load().unwrap(), "");
    }

    #[test]
    fn test_split_save_and_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let pref = SplitPreference::new(&temp_dir.path().join("data"));

        pref.save("Push/Pull/Legs\n").unwrap();
        assert_eq!(pref.load().unwrap(), "Push/Pull/Legs");

        pref.save("Upper/Lower").unwrap();
        assert_eq!(pref.load().unwrap(), "Upper/Lower");
    }

    #[test]
    fn test_current_workout_pointer() {
        let temp_dir = tempfile::tempdir().unwrap();
        let pointer = CurrentWorkoutPointer::new(temp_dir.path());
        assert_eq!(pointer.load().unwrap(), None);

        pointer.save("workout-1").unwrap();
        assert_eq!(pointer.load().unwrap().as_deref(), Some("workout-1"));

        pointer.clear().unwrap();
        pointer.clear().unwrap();
        assert_eq!(pointer.load().unwrap(), None);
    }
}
