mod args;
mod input;

use anyhow::{Context, Result};
use bcdemux_lib::report::RunSummary;
use bcdemux_lib::validate::Validator;
use log::info;

use crate::commands::common::{self, Outcome};

pub use args::ValidateArgs;
pub use input::discover_pairs;

/// Execute the `validate` command over every requested pair.
pub fn run_validate(args: ValidateArgs) -> Result<Outcome> {
    let pairs = args.pairs()?;
    info!("validating {} fastq pairs", pairs.len());

    let validator = Validator::new(args.validator_config());
    let mut summary = RunSummary::new();
    for (r1, r2) in &pairs {
        let report = validator
            .validate_paths(r1, r2)
            .with_context(|| format!("Failed to validate {} {}", r1.display(), r2.display()))?;
        summary.record_validation("validate", &report);
    }

    common::finish(&summary, &args.summary)
}
