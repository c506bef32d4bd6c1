use anyhow::Result;
use bcdemux_lib::core::prelude::stem_without_ext;
use bcdemux_lib::external::{FastqPair, Samtools};
use bcdemux_lib::validate::{ValidationReport, Validator};
use log::{error, info};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

/// Where each split ended up after the per-split steps.
#[derive(Debug)]
pub enum SplitOutcome {
    Validated {
        stem: String,
        report: ValidationReport,
    },
    /// An external step or the validator failed for this split; the
    /// remaining splits still run.
    Failed { stem: String, error: String },
}

/// Per-split BAM files in `dir`, sorted by name.
pub fn list_splits(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut splits: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .filter(|path| path.extension().and_then(|e| e.to_str()) == Some(extension))
        .collect();
    splits.sort();
    Ok(splits)
}

pub struct SplitConverter<'a> {
    pub samtools: &'a Samtools,
    pub validator: &'a Validator,
    pub collate_dir: &'a Path,
    pub fastq_dir: &'a Path,
}

impl<'a> SplitConverter<'a> {
    fn convert(&self, split: &Path, stem: &str) -> bcdemux_lib::core::error::Result<ValidationReport> {
        let collated = self.collate_dir.join(format!("{}.bam", stem));
        self.samtools.collate(split, &collated)?;

        let pair = FastqPair::in_dir(self.fastq_dir, stem);
        self.samtools.fastq(&collated, &pair)?;

        self.validator.validate_paths(&pair.r1, &pair.r2)
    }

    fn process(&self, split: &Path) -> SplitOutcome {
        let stem = stem_without_ext(split).unwrap_or_else(|| split.display().to_string());
        match self.convert(split, &stem) {
            Ok(report) => SplitOutcome::Validated { stem, report },
            Err(err) => {
                error!("split {} failed: {}", stem, err);
                SplitOutcome::Failed {
                    stem,
                    error: err.to_string(),
                }
            }
        }
    }

    /// Collate, convert and validate every split on the global rayon pool.
    /// Results come back in the order of `splits`.
    pub fn process_all(&self, splits: &[PathBuf]) -> Vec<SplitOutcome> {
        info!("converting {} splits to paired fastq", splits.len());
        splits.par_iter().map(|split| self.process(split)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bcdemux_lib::validate::ValidatorConfig;
    use tempfile::tempdir;

    #[test]
    fn lists_only_matching_files_in_order() {
        let dir = tempdir().unwrap();
        for name in ["BBB.bam", "AAA.bam", "undetermined.bam", "notes.txt"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        let splits = list_splits(dir.path(), "bam").unwrap();
        let names: Vec<String> = splits.iter().filter_map(stem_without_ext).collect();
        assert_eq!(names, vec!["AAA", "BBB", "undetermined"]);
    }

    #[test]
    fn failed_external_step_is_isolated_per_split() {
        let dir = tempdir().unwrap();
        let splits = vec![dir.path().join("AAA.bam"), dir.path().join("BBB.bam")];
        let samtools = Samtools::new("false");
        let validator = Validator::new(ValidatorConfig::default());
        let converter = SplitConverter {
            samtools: &samtools,
            validator: &validator,
            collate_dir: dir.path(),
            fastq_dir: dir.path(),
        };

        let outcomes = converter.process_all(&splits);
        assert_eq!(outcomes.len(), 2);
        for (outcome, expected) in outcomes.iter().zip(["AAA", "BBB"]) {
            match outcome {
                SplitOutcome::Failed { stem, error } => {
                    assert_eq!(stem, expected);
                    assert!(error.contains("collate"));
                }
                other => panic!("unexpected outcome {:?}", other),
            }
        }
    }
}
