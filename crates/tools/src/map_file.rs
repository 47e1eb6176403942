//! Map documents accepted by `mapview`: bare ASCII text or a versioned JSON wrapper.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use squaremap::SquareMap;

pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MapFile {
    pub format_version: u32,
    pub rows: Vec<String>,
}

impl MapFile {
    pub fn from_map(map: &SquareMap) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            rows: map.to_ascii().lines().map(str::to_owned).collect(),
        }
    }

    pub fn to_map(&self) -> Result<SquareMap> {
        if self.format_version != FORMAT_VERSION {
            bail!("Unsupported map format version {}", self.format_version);
        }
        Ok(SquareMap::from_ascii(&self.rows.join("\n"))?)
    }
}

/// Loads a map, choosing the decoder from the file extension (`.json` or plain text).
pub fn load_map(path: &Path) -> Result<SquareMap> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read map file: {}", path.display()))?;
    let map = if path.extension().is_some_and(|ext| ext == "json") {
        let file: MapFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to deserialize map JSON: {}", path.display()))?;
        file.to_map()
    } else {
        SquareMap::from_ascii(&content).map_err(Into::into)
    };
    map.with_context(|| format!("Invalid map in {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use squaremap::{CellFlags, Pos};
    use tempfile::tempdir;

    const ROOM: &str = "#####\n#..=#\n#####\n";

    #[test]
    fn text_and_json_load_the_same_map() {
        let dir = tempdir().unwrap();
        let text_path = dir.path().join("room.txt");
        let json_path = dir.path().join("room.json");
        fs::write(&text_path, ROOM).unwrap();
        let from_text = load_map(&text_path).unwrap();

        let json = serde_json::to_string_pretty(&MapFile::from_map(&from_text)).unwrap();
        fs::write(&json_path, json).unwrap();
        let from_json = load_map(&json_path).unwrap();

        assert_eq!(from_text, from_json);
        assert_eq!(from_json.cell(Pos::new(3, 1)).unwrap(), CellFlags::TRANSPARENT);
    }

    #[test]
    fn newer_format_versions_are_refused() {
        let file = MapFile { format_version: 2, rows: vec!["..".to_string()] };
        let err = file.to_map().unwrap_err();
        assert!(err.to_string().contains("version 2"));
    }

    #[test]
    fn parse_errors_keep_their_line() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.txt");
        fs::write(&path, "...\n.x.\n").unwrap();
        let err = load_map(&path).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("broken.txt"), "{message}");
        assert!(message.contains("line 2"), "{message}");
    }
}
