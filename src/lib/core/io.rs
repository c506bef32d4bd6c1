use csv;
use flate2::read::MultiGzDecoder;
use grep_cli::stdout;
use gzp::{deflate::Gzip, Compression, ZBuilder};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;
use termcolor::ColorChoice;

use super::error::{DemuxError, Result};
use super::fs::{is_gzipped, is_stdio};

const READ_BUFFER: usize = 256 * 1024;

fn with_path(err: io::Error, path: &Path) -> DemuxError {
    DemuxError::Io(io::Error::new(
        err.kind(),
        format!("{}: {}", path.display(), err),
    ))
}

fn open_file(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| with_path(e, path))
}

/// Open a text source (file, gzip file or `-` for stdin) as a buffered reader.
pub fn open_text<P: AsRef<Path>>(path: P) -> Result<Box<dyn BufRead>> {
    let path = path.as_ref();
    if is_stdio(path) {
        return Ok(Box::new(BufReader::with_capacity(READ_BUFFER, io::stdin())));
    }
    let file = open_file(path)?;
    let reader: Box<dyn BufRead> = if is_gzipped(path) {
        Box::new(BufReader::with_capacity(READ_BUFFER, MultiGzDecoder::new(file)))
    } else {
        Box::new(BufReader::with_capacity(READ_BUFFER, file))
    };
    Ok(reader)
}

/// Build a CSV reader for optional file/stdin sources.
pub fn get_reader<P: AsRef<Path>>(
    path: &Option<P>,
    delimiter: u8,
    has_headers: bool,
) -> Result<csv::Reader<Box<dyn Read>>> {
    let raw_reader: Box<dyn Read> = match path {
        Some(path) if !is_stdio(path) => {
            let path = path.as_ref();
            let reader = BufReader::new(open_file(path)?);
            if is_gzipped(path) {
                Box::new(MultiGzDecoder::new(reader))
            } else {
                Box::new(reader)
            }
        }
        _ => Box::new(io::stdin()),
    };

    Ok(csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(has_headers)
        .flexible(true)
        .from_reader(raw_reader))
}

/// Build a CSV writer targeting a file or stdout with optional gzip compression.
pub fn get_writer<P: AsRef<Path>>(
    path: &Option<P>,
    gzipped: bool,
    write_headers: bool,
    threads: usize,
    compression_level: u32,
) -> Result<csv::Writer<Box<dyn Write>>> {
    let raw_writer: Box<dyn Write> = match path {
        Some(path) if !is_stdio(path) => {
            let path = path.as_ref();
            let file = File::create(path).map_err(|e| with_path(e, path))?;
            let writer = BufWriter::new(file);
            if gzipped {
                Box::new(
                    ZBuilder::<Gzip, _>::new()
                        .num_threads(threads)
                        .compression_level(Compression::new(compression_level))
                        .from_writer(writer),
                )
            } else {
                Box::new(writer)
            }
        }
        _ => {
            let writer = stdout(ColorChoice::Never);
            if gzipped {
                Box::new(
                    ZBuilder::<Gzip, _>::new()
                        .num_threads(threads)
                        .compression_level(Compression::new(compression_level))
                        .from_writer(writer),
                )
            } else {
                Box::new(writer)
            }
        }
    };

    Ok(csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(write_headers)
        .from_writer(raw_writer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn open_text_reads_plain_and_gzip() {
        let dir = tempdir().unwrap();
        let plain = dir.path().join("r1.fq");
        std::fs::write(&plain, "@a\nACGT\n+\nIIII\n").unwrap();

        let gz = dir.path().join("r1.fq.gz");
        let mut enc = GzEncoder::new(File::create(&gz).unwrap(), flate2::Compression::fast());
        enc.write_all(b"@a\nACGT\n+\nIIII\n").unwrap();
        enc.finish().unwrap();

        for path in [&plain, &gz] {
            let lines: Vec<String> = open_text(path).unwrap().lines().map(|l| l.unwrap()).collect();
            assert_eq!(lines, vec!["@a", "ACGT", "+", "IIII"]);
        }
    }

    #[test]
    fn writer_emits_tab_separated_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("summary.tsv");
        {
            let mut writer = get_writer(&Some(&path), false, false, 1, 6).unwrap();
            writer.write_record(["demux", "1", "3", "0"]).unwrap();
            writer.flush().unwrap();
        }
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "demux\t1\t3\t0\n");
    }
}
