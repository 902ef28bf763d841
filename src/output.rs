//! JSON output of measurement and fit records.

use crate::errors::*;
use log::info;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Writes `value` as pretty printed JSON to `path`. Missing parent directories
/// are created.
pub fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir).chain_err(|| {
                format!("Unable to create output directory '{}'", dir.display())
            })?;
        }
    }

    let f = File::create(path)
        .chain_err(|| format!("couldn't create output file '{}'.", path.display()))?;
    let mut w = BufWriter::new(f);

    serde_json::to_writer_pretty(&mut w, value)
        .chain_err(|| format!("Cannot write JSON to '{}'.", path.display()))?;
    w.write_all(b"\n")?;
    w.flush()?;

    info!("Wrote {}", path.display());

    Ok(())
}

pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let f = File::open(path).chain_err(|| format!("Unable to open file '{}'.", path.display()))?;

    serde_json::from_reader(BufReader::new(f))
        .chain_err(|| format!("Cannot decode JSON in '{}'.", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit::FitRange;
    use std::env;

    #[test]
    fn test_save_and_load_json() {
        let dir = env::temp_dir().join(format!("vortexsublevel-output-{}", std::process::id()));
        let path = dir.join("nested").join("range.json");

        let r = FitRange::new(0.1, 0.4).unwrap();
        save_json(&path, &r).unwrap();

        let back: FitRange = load_json(&path).unwrap();
        assert_eq!(back, r);

        let raw: serde_json::Value = load_json(&path).unwrap();
        assert_eq!(raw, serde_json::json!([0.1, 0.4]));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_missing_file() {
        assert!(load_json::<FitRange>(Path::new("./does/not/exist.json")).is_err());
    }
}
