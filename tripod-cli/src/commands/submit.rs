//! Submit command
//!
//! Builds the upload form from command-line flags and submits it.

use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use std::path::PathBuf;
use tripod_client::TripodClient;
use tripod_core::domain::submission::{
    DEFAULT_ALPHA, DetectionMethods, Gender, GenomeBuild, InputData, Submission,
};
use tripod_core::dto::job::JobTicket;

/// Upload form flags
#[derive(Args, Debug, Clone)]
pub struct SubmitArgs {
    /// Genotype file to upload (.txt, .csv or .tsv)
    #[arg(long, conflicts_with = "sample_data", required_unless_present = "sample_data")]
    pub file: Option<PathBuf>,

    /// Analyse the sample data bundled with the server
    #[arg(long)]
    pub sample_data: bool,

    /// Significance threshold
    #[arg(long, default_value_t = DEFAULT_ALPHA)]
    pub alpha: f64,

    /// Genome build (hg16, hg17, hg18, hg19)
    #[arg(long, default_value = "hg18")]
    pub build: GenomeBuild,

    /// Sample gender (M, F, NA)
    #[arg(long, default_value = "NA")]
    pub gender: Gender,

    /// Skip the POD detection method
    #[arg(long)]
    pub no_pod: bool,

    /// Run PODhd
    #[arg(long)]
    pub podhd: bool,

    /// Run PODmi1
    #[arg(long)]
    pub podmi1: bool,

    /// Run PODcr
    #[arg(long)]
    pub podcr: bool,
}

impl SubmitArgs {
    pub fn to_submission(&self) -> Submission {
        let input = match &self.file {
            Some(path) => InputData::Upload(path.clone()),
            None => InputData::SampleData,
        };

        Submission {
            input,
            alpha: self.alpha,
            build: self.build,
            gender: self.gender,
            methods: DetectionMethods {
                pod: !self.no_pod,
                podhd: self.podhd,
                podmi1: self.podmi1,
                podcr: self.podcr,
            },
        }
    }
}

/// Submit the form and report the job id
pub async fn submit(client: &TripodClient, args: &SubmitArgs, json: bool) -> Result<JobTicket> {
    let submission = args.to_submission();
    submission.validate()?;

    let ticket = client
        .submit(&submission)
        .await
        .context("Failed to submit analysis")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&ticket)?);
    } else {
        let source = ticket.name.as_deref().unwrap_or("sample data");
        eprintln!(
            "{} {} ({})",
            "✓ Submitted job".green(),
            ticket.id.to_string().cyan(),
            source.dimmed()
        );
        println!("{}", ticket.id);
    }

    Ok(ticket)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: SubmitArgs,
    }

    fn parse(argv: &[&str]) -> Result<SubmitArgs, clap::Error> {
        let mut full = vec!["tripod"];
        full.extend_from_slice(argv);
        TestCli::try_parse_from(full).map(|cli| cli.args)
    }

    #[test]
    fn test_defaults_follow_the_form() {
        let submission = parse(&["--sample-data"]).unwrap().to_submission();
        assert_eq!(submission, Submission::sample_data());
    }

    #[test]
    fn test_flags_map_to_form_fields() {
        let submission = parse(&[
            "--file",
            "trio.tsv",
            "--alpha",
            "0.05",
            "--build",
            "hg19",
            "--gender",
            "M",
            "--no-pod",
            "--podcr",
        ])
        .unwrap()
        .to_submission();

        assert_eq!(submission.input, InputData::Upload(PathBuf::from("trio.tsv")));
        assert_eq!(submission.alpha, 0.05);
        assert_eq!(submission.build, GenomeBuild::Hg19);
        assert_eq!(submission.gender, Gender::Male);
        assert!(!submission.methods.pod);
        assert!(submission.methods.podcr);
        assert!(submission.validate().is_ok());
    }

    #[test]
    fn test_requires_an_input() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["--file", "a.txt", "--sample-data"]).is_err());
        assert!(parse(&["--sample-data", "--build", "hg38"]).is_err());
    }
}
