//! Upload form contract
//!
//! A submission mirrors the triPOD upload form: an input file (or the bundled
//! sample data), the alpha threshold, the genome build, the sample gender and
//! the four detection-method toggles. The server turns it into a job whose id
//! feeds the result poller.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// File extensions the server accepts for uploads
pub const ALLOWED_EXTENSIONS: [&str; 3] = ["txt", "csv", "tsv"];

/// Form value selecting the sample data bundled with the server
pub const SAMPLE_DATA_FILE: &str = "sampledata.txt";

pub const DEFAULT_ALPHA: f64 = 0.1;

/// Submission validation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SubmissionError {
    #[error("File type must be .txt, .csv or .tsv (got {0})")]
    UnsupportedFileType(String),

    #[error("Upload path has no file name: {0}")]
    MissingFileName(String),

    #[error("alpha must be a number between 0 and 1 (got {0})")]
    AlphaOutOfRange(f64),

    #[error("Please specify at least one detection method")]
    NoDetectionMethod,

    #[error("Unknown genome build: {0}")]
    UnknownBuild(String),

    #[error("Unknown gender: {0} (expected M, F or NA)")]
    UnknownGender(String),
}

/// Reference genome build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenomeBuild {
    Hg16,
    Hg17,
    #[default]
    Hg18,
    /// hg19, also known as b37
    Hg19,
}

impl GenomeBuild {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Hg16 => "hg16",
            Self::Hg17 => "hg17",
            Self::Hg18 => "hg18",
            Self::Hg19 => "hg19",
        }
    }

    /// Value sent in the `build` form field (the centromere table to use)
    pub fn form_value(&self) -> &'static str {
        match self {
            Self::Hg16 => "hg16_centromeres.txt",
            Self::Hg17 => "hg17_centromeres.txt",
            Self::Hg18 => "hg18_centromeres.txt",
            Self::Hg19 => "hg19_centromeres.txt",
        }
    }
}

impl fmt::Display for GenomeBuild {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for GenomeBuild {
    type Err = SubmissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        let label = normalized
            .strip_suffix("_centromeres.txt")
            .unwrap_or(&normalized);

        match label {
            "hg16" => Ok(Self::Hg16),
            "hg17" => Ok(Self::Hg17),
            "hg18" => Ok(Self::Hg18),
            "hg19" | "b37" | "hg19(b37)" => Ok(Self::Hg19),
            _ => Err(SubmissionError::UnknownBuild(s.to_string())),
        }
    }
}

/// Sample gender, used for sex-chromosome handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gender {
    Male,
    Female,
    #[default]
    Unknown,
}

impl Gender {
    pub fn form_value(&self) -> &'static str {
        match self {
            Self::Male => "M",
            Self::Female => "F",
            Self::Unknown => "NA",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.form_value())
    }
}

impl FromStr for Gender {
    type Err = SubmissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "m" | "male" => Ok(Self::Male),
            "f" | "female" => Ok(Self::Female),
            "na" | "unknown" => Ok(Self::Unknown),
            _ => Err(SubmissionError::UnknownGender(s.to_string())),
        }
    }
}

/// Detection methods to run, each independently on or off
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectionMethods {
    pub pod: bool,
    pub podhd: bool,
    pub podmi1: bool,
    pub podcr: bool,
}

impl Default for DetectionMethods {
    fn default() -> Self {
        Self {
            pod: true,
            podhd: false,
            podmi1: false,
            podcr: false,
        }
    }
}

impl DetectionMethods {
    pub fn any_enabled(&self) -> bool {
        self.pod || self.podhd || self.podmi1 || self.podcr
    }

    /// Form field name and on/off token for each method
    pub fn form_fields(&self) -> [(&'static str, &'static str); 4] {
        [
            ("pod", if self.pod { "pod" } else { "nopod" }),
            ("podhd", if self.podhd { "hd" } else { "nohd" }),
            ("podmi1", if self.podmi1 { "mi1" } else { "nomi1" }),
            ("podcr", if self.podcr { "podcr" } else { "nopodcr" }),
        ]
    }
}

/// Genotype data to analyse
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputData {
    /// A local file uploaded in the `file` form field
    Upload(PathBuf),
    /// The sample data set bundled with the server
    SampleData,
}

/// A complete upload form submission
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub input: InputData,
    pub alpha: f64,
    pub build: GenomeBuild,
    pub gender: Gender,
    pub methods: DetectionMethods,
}

impl Submission {
    /// Submission of a local file with default parameters
    pub fn upload(path: impl Into<PathBuf>) -> Self {
        Self::with_input(InputData::Upload(path.into()))
    }

    /// Submission of the bundled sample data with default parameters
    pub fn sample_data() -> Self {
        Self::with_input(InputData::SampleData)
    }

    fn with_input(input: InputData) -> Self {
        Self {
            input,
            alpha: DEFAULT_ALPHA,
            build: GenomeBuild::default(),
            gender: Gender::default(),
            methods: DetectionMethods::default(),
        }
    }

    /// Checks the submission against the rules the server enforces
    pub fn validate(&self) -> Result<(), SubmissionError> {
        if let InputData::Upload(path) = &self.input {
            check_extension(path)?;
        }

        if !self.alpha.is_finite() || self.alpha <= 0.0 || self.alpha >= 1.0 {
            return Err(SubmissionError::AlphaOutOfRange(self.alpha));
        }

        if !self.methods.any_enabled() {
            return Err(SubmissionError::NoDetectionMethod);
        }

        Ok(())
    }

    /// Name of the uploaded file, if this submission uploads one
    pub fn file_name(&self) -> Option<String> {
        match &self.input {
            InputData::Upload(path) => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned()),
            InputData::SampleData => None,
        }
    }

    /// Text fields of the multipart form, in form order
    ///
    /// The file part itself is not included; callers attach it separately.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = Vec::with_capacity(9);

        if self.input == InputData::SampleData {
            fields.push(("sampledata", SAMPLE_DATA_FILE.to_string()));
        }

        fields.push(("alpha", self.alpha.to_string()));
        fields.push(("build", self.build.form_value().to_string()));
        fields.push(("gender", self.gender.form_value().to_string()));

        for (name, value) in self.methods.form_fields() {
            fields.push((name, value.to_string()));
        }

        fields
    }
}

fn check_extension(path: &Path) -> Result<(), SubmissionError> {
    let display = path.display().to_string();

    if path.file_name().is_none() {
        return Err(SubmissionError::MissingFileName(display));
    }

    let allowed = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false);

    if allowed {
        Ok(())
    } else {
        Err(SubmissionError::UnsupportedFileType(display))
    }
}
