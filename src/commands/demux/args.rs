use bcdemux_lib::config::{RouterConfig, DEFAULT_EXTENSION, DEFAULT_TAG};
use bcdemux_lib::router::PROGRESS_INTERVAL;
use std::path::PathBuf;
use structopt::StructOpt;

/// CLI arguments for the `demux` subcommand.
#[derive(Debug, Clone, StructOpt)]
#[structopt(author, name = "demux")]
pub struct DemuxArgs {
    /// Input BAM/SAM file, `-` for stdin.
    #[structopt(default_value = "-", parse(from_os_str))]
    pub input: PathBuf,

    /// Directory receiving one `{barcode}.{ext}` file per tag value.
    #[structopt(long, short = "o", parse(from_os_str))]
    pub output_dir: PathBuf,

    /// Tag to demultiplex on.
    #[structopt(long, short = "t", default_value = DEFAULT_TAG)]
    pub tag: String,

    /// Extension of the per-barcode outputs (`bam` or `sam`).
    #[structopt(long, default_value = DEFAULT_EXTENSION)]
    pub ext: String,

    /// htslib threads for reading and writing.
    #[structopt(long, short = "@", default_value = "1")]
    pub threads: usize,

    /// Records between progress lines, 0 to disable.
    #[structopt(long, default_value = "1000000")]
    pub progress_interval: u64,

    /// Write the run summary to this TSV file.
    #[structopt(long, parse(from_os_str))]
    pub summary: Option<PathBuf>,
}

impl From<&DemuxArgs> for RouterConfig {
    fn from(args: &DemuxArgs) -> RouterConfig {
        RouterConfig {
            tag: Some(args.tag.clone()),
            output_dir: Some(args.output_dir.clone()),
            extension: args.ext.clone(),
            progress_interval: args.progress_interval,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_arguments() {
        let args = DemuxArgs::from_iter_safe(&["demux", "--output-dir", "splits"]).unwrap();
        assert_eq!(args.input, PathBuf::from("-"));
        assert_eq!(args.output_dir, PathBuf::from("splits"));
        assert_eq!(args.tag, "CB");
        assert_eq!(args.ext, "bam");
        assert_eq!(args.progress_interval, PROGRESS_INTERVAL);

        let config = RouterConfig::from(&args);
        assert_eq!(config.tag.as_deref(), Some("CB"));
        assert!(!config.filter_undetermined);
    }

    #[test]
    fn output_dir_is_required() {
        assert!(DemuxArgs::from_iter_safe(&["demux", "in.bam"]).is_err());
    }
}
