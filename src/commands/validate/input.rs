use bcdemux_lib::core::error::DemuxError;
use std::fs;
use std::path::{Path, PathBuf};

/// Files in `dir` ending with `ext`, sorted by name and taken two at a time.
pub fn discover_pairs(dir: &Path, ext: &str) -> Result<Vec<(PathBuf, PathBuf)>, DemuxError> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .map_or(false, |n| n.ends_with(ext))
        })
        .collect();
    files.sort();

    if files.len() % 2 != 0 {
        return Err(DemuxError::config(format!(
            "found {} files ending with '{}' in {:?}; expected an even number",
            files.len(),
            ext,
            dir
        )));
    }

    let mut pairs = Vec::with_capacity(files.len() / 2);
    let mut iter = files.into_iter();
    while let (Some(r1), Some(r2)) = (iter.next(), iter.next()) {
        pairs.push((r1, r2));
    }
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn pairs_adjacent_files() {
        let dir = tempdir().unwrap();
        for name in ["BBB_2.fq", "AAA_1.fq", "BBB_1.fq", "AAA_2.fq", "notes.txt"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        let pairs = discover_pairs(dir.path(), ".fq").unwrap();
        assert_eq!(pairs.len(), 2);
        assert!(pairs[0].0.ends_with("AAA_1.fq"));
        assert!(pairs[0].1.ends_with("AAA_2.fq"));
        assert!(pairs[1].1.ends_with("BBB_2.fq"));
    }

    #[test]
    fn odd_file_count_is_a_config_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("AAA_1.fq"), "").unwrap();
        assert!(discover_pairs(dir.path(), ".fq").unwrap_err().is_config());
    }
}
