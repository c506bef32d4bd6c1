//! BAM/SAM sinks backed by `rust_htslib`.

use std::path::{Path, PathBuf};

use rust_htslib::bam::{self, Header, HeaderView, Record};

use super::{RecordSink, SinkFactory};
use crate::core::error::{DemuxError, Result};
use crate::core::fs::is_stdio;
use crate::record::RoutingKey;

/// Where sink outputs are placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputLayout {
    /// One file per key: `{dir}/{key}.{extension}`.
    PerKey { dir: PathBuf, extension: String },
    /// Every key shares one output; `-` writes to stdout.
    Single(PathBuf),
}

impl OutputLayout {
    pub fn per_key<P: AsRef<Path>>(dir: P, extension: &str) -> Self {
        OutputLayout::PerKey {
            dir: dir.as_ref().to_path_buf(),
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    pub fn path_for(&self, key: &RoutingKey) -> PathBuf {
        match self {
            OutputLayout::PerKey { dir, extension } => {
                dir.join(format!("{}.{}", key.as_str(), extension))
            }
            OutputLayout::Single(path) => path.clone(),
        }
    }
}

/// A key must be usable as one file name inside the output directory.
fn check_file_name(key: &RoutingKey) -> Result<()> {
    let name = key.as_str();
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\', '\0']) {
        return Err(DemuxError::InvalidInput(format!(
            "tag value '{}' cannot be used as an output file name",
            name.escape_debug()
        )));
    }
    Ok(())
}

/// Output format implied by a path's extension; anything but `.sam` is BAM.
pub fn format_for(path: &Path) -> bam::Format {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("sam") => bam::Format::Sam,
        _ => bam::Format::Bam,
    }
}

/// Opens `bam::Writer`s whose header is copied from the input file.
pub struct BamSinkFactory {
    header: Header,
    layout: OutputLayout,
    threads: Option<usize>,
}

impl BamSinkFactory {
    pub fn new(template: &HeaderView, layout: OutputLayout) -> Self {
        Self {
            header: Header::from_template(template),
            layout,
            threads: None,
        }
    }

    /// Extra BGZF compression threads per writer.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads).filter(|&t| t > 1);
        self
    }
}

impl SinkFactory for BamSinkFactory {
    type Record = Record;
    type Sink = BamSink;

    fn create(&self, key: &RoutingKey) -> Result<BamSink> {
        if let OutputLayout::PerKey { .. } = self.layout {
            check_file_name(key)?;
        }
        let path = self.layout.path_for(key);
        let format = format_for(&path);
        let mut writer = if is_stdio(&path) {
            bam::Writer::from_stdout(&self.header, format)?
        } else {
            bam::Writer::from_path(&path, &self.header, format)?
        };
        if let Some(threads) = self.threads {
            writer.set_threads(threads)?;
        }
        Ok(BamSink { writer })
    }

    fn target_path(&self, key: &RoutingKey) -> PathBuf {
        self.layout.path_for(key)
    }
}

pub struct BamSink {
    writer: bam::Writer,
}

impl RecordSink<Record> for BamSink {
    #[inline]
    fn write(&mut self, record: &Record) -> Result<()> {
        self.writer.write(record)?;
        Ok(())
    }

    /// Always `Ok`: `bam::Writer` has no fallible close, htslib flushes and
    /// closes the file on drop and a failure there is not reported back.
    fn close(self) -> Result<()> {
        drop(self.writer);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_key_layout_builds_expected_paths() {
        let layout = OutputLayout::per_key("/out/splits", ".bam");
        assert_eq!(
            layout.path_for(&RoutingKey::new("AAACGG-1")),
            PathBuf::from("/out/splits/AAACGG-1.bam")
        );
        assert_eq!(
            layout.path_for(&RoutingKey::undetermined()),
            PathBuf::from("/out/splits/undetermined.bam")
        );
    }

    #[test]
    fn single_layout_ignores_key() {
        let layout = OutputLayout::Single(PathBuf::from("filtered.bam"));
        assert_eq!(
            layout.path_for(&RoutingKey::new("x")),
            layout.path_for(&RoutingKey::undetermined())
        );
    }

    #[test]
    fn format_follows_extension() {
        assert!(matches!(format_for(Path::new("a.sam")), bam::Format::Sam));
        assert!(matches!(format_for(Path::new("A.SAM")), bam::Format::Sam));
        assert!(matches!(format_for(Path::new("a.bam")), bam::Format::Bam));
        assert!(matches!(format_for(Path::new("-")), bam::Format::Bam));
    }

    #[test]
    fn keys_that_are_not_file_names_are_rejected() {
        for bad in ["AAA/1", "..", "", "a\\b"] {
            assert!(matches!(
                check_file_name(&RoutingKey::new(bad)),
                Err(DemuxError::InvalidInput(_))
            ));
        }
        assert!(check_file_name(&RoutingKey::new("AAACGG-1")).is_ok());
        assert!(check_file_name(&RoutingKey::undetermined()).is_ok());
    }

    #[test]
    fn per_key_factory_refuses_slash_in_barcode() {
        let dir = tempfile::tempdir().unwrap();
        let view = HeaderView::from_header(&Header::new());
        let factory = BamSinkFactory::new(&view, OutputLayout::per_key(dir.path(), "bam"));
        let err = match factory.create(&RoutingKey::new("AAA/1")) {
            Err(err) => err,
            Ok(_) => panic!("sink created for a key containing '/'"),
        };
        assert!(err.to_string().contains("AAA/1"));
        let sink = match factory.create(&RoutingKey::new("AAA")) {
            Ok(sink) => sink,
            Err(err) => panic!("{}", err),
        };
        assert!(sink.close().is_ok());
        let mut reader = bam::Reader::from_path(dir.path().join("AAA.bam")).unwrap();
        assert_eq!(bam::Read::records(&mut reader).count(), 0);
    }
}
