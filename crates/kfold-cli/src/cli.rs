//! Argument definitions for the `kfold` binary.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::builder::RangedU64ValueParser;
use clap::{Arg, ArgMatches, Command, ValueHint};

use crate::orchestrator::Invocation;

pub fn build_cli() -> Command {
    Command::new("kfold")
        .version(clap::crate_version!())
        .about("Cross-validate an SVM or random forest classifier on a pickled dataset")
        .arg(
            Arg::new("method")
                .help("The classification method (svm or random_forest)")
                .required(true)
                .value_parser(clap::builder::NonEmptyStringValueParser::new())
                .value_hint(ValueHint::Other),
        )
        .arg(
            Arg::new("data_path")
                .help("The pickled data file path")
                .required(true)
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("partitions")
                .help("The amount of equal sized data sets created upon partitioning the data")
                .required(true)
                .value_parser(RangedU64ValueParser::<usize>::new().range(1..)),
        )
        .arg(
            Arg::new("iterations")
                .help("The amount of times to perform k-fold cross-validation")
                .required(true)
                .value_parser(RangedU64ValueParser::<usize>::new().range(1..)),
        )
        .help_template(
            "{usage-heading} {usage}\n\n\
             {about-with-newline}\n\
             Version {version}\n\n\
             {all-args}{after-help}",
        )
}

impl Invocation {
    pub fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let method = matches.get_one::<String>("method").context("missing method")?;
        let data_path = matches.get_one::<PathBuf>("data_path").context("missing data_path")?;
        let partitions = *matches.get_one::<usize>("partitions").context("missing partitions")?;
        let iterations = *matches.get_one::<usize>("iterations").context("missing iterations")?;

        Ok(Invocation {
            method: method.clone(),
            data_path: data_path.clone(),
            partitions,
            iterations,
        })
    }
}
