use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::university::DataLoadError;

/// A university row exactly as it appears in the source, before any
/// normalization.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct RawUniversityRow {
    #[serde(rename = "University")]
    pub university: String,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Program")]
    pub program: String,
    #[serde(rename = "Deadlines")]
    pub deadlines: String,
    #[serde(rename = "Application_Fee")]
    pub application_fee: String,
    #[serde(rename = "Requirements")]
    pub requirements: String,
    #[serde(rename = "Expected_Qualities")]
    pub expected_qualities: String,
    #[serde(rename = "Apply_Link")]
    pub apply_link: String,
    #[serde(rename = "Program_Fee")]
    pub program_fee: String,
    #[serde(rename = "Tuition_Per_Year", default)]
    pub tuition_per_year: Option<String>,
    #[serde(rename = "Living_Costs_Yearly", default)]
    pub living_costs_yearly: Option<String>,
    #[serde(rename = "Total_Cost_2Years", default)]
    pub total_cost_2years: Option<String>,
    #[serde(rename = "Avg_Starting_Salary", default)]
    pub avg_starting_salary: Option<String>,
    #[serde(rename = "ROI_5Year", default)]
    pub roi_5year: Option<String>,
    #[serde(rename = "Acceptance_Rate", default)]
    pub acceptance_rate: Option<String>,
    #[serde(rename = "Placement_Rate", default)]
    pub placement_rate: Option<String>,
}

pub trait UniversitySource {
    fn describe(&self) -> String;
    fn rows(&self) -> Result<Vec<RawUniversityRow>, DataLoadError>;
}

/// The table shipped with the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinSource;

impl UniversitySource for BuiltinSource {
    fn describe(&self) -> String {
        "built-in table".to_string()
    }

    fn rows(&self) -> Result<Vec<RawUniversityRow>, DataLoadError> {
        Ok(BUILTIN_TABLE.iter().map(BuiltinRow::to_raw).collect())
    }
}

/// A CSV file with a header row. Columns may appear in any order and
/// unknown columns are ignored.
#[derive(Debug, Clone)]
pub struct CsvFileSource {
    path: PathBuf,
}

impl CsvFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl UniversitySource for CsvFileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn rows(&self) -> Result<Vec<RawUniversityRow>, DataLoadError> {
        let origin = self.describe();
        let file = std::fs::File::open(&self.path).map_err(|e| DataLoadError::Source {
            origin: origin.clone(),
            source: e.into(),
        })?;
        read_csv_rows(file, &origin)
    }
}

pub fn read_csv_rows<R: Read>(reader: R, origin: &str) -> Result<Vec<RawUniversityRow>, DataLoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    reader
        .deserialize::<RawUniversityRow>()
        .map(|row| {
            row.map_err(|source| DataLoadError::Source {
                origin: origin.to_string(),
                source,
            })
        })
        .collect()
}

struct BuiltinRow {
    university: &'static str,
    category: &'static str,
    program: &'static str,
    deadlines: &'static str,
    application_fee: &'static str,
    requirements: &'static str,
    expected_qualities: &'static str,
    apply_link: &'static str,
    program_fee: &'static str,
}

impl BuiltinRow {
    fn to_raw(&self) -> RawUniversityRow {
        RawUniversityRow {
            university: self.university.to_string(),
            category: self.category.to_string(),
            program: self.program.to_string(),
            deadlines: self.deadlines.to_string(),
            application_fee: self.application_fee.to_string(),
            requirements: self.requirements.to_string(),
            expected_qualities: self.expected_qualities.to_string(),
            apply_link: self.apply_link.to_string(),
            program_fee: self.program_fee.to_string(),
            ..RawUniversityRow::default()
        }
    }
}

const BUILTIN_TABLE: [BuiltinRow; 10] = [
    BuiltinRow {
        university: "UT Austin",
        category: "Self Apply",
        program: "MS CS",
        deadlines: "Dec 15, 2024",
        application_fee: "$75",
        requirements: "GRE (optional), TOEFL(88), 3 LORs, SOP",
        expected_qualities: "Strong CS background, Research experience, 3.5+ GPA",
        apply_link: "https://enterprise.login.utexas.edu/idp/profile/SAML2/Redirect/SSO?execution=e2s1",
        program_fee: "$48,000",
    },
    BuiltinRow {
        university: "University of Florida",
        category: "Self Apply",
        program: "MS CS",
        deadlines: "June 1, 2024",
        application_fee: "$65",
        requirements: "GRE (optional), TOEFL(80), 3 LORs, SOP",
        expected_qualities: "Programming skills, 3.0+ GPA, Project experience",
        apply_link: "https://www.applyweb.com/cgi-bin/ustat?formcode=uflgrad",
        program_fee: "$32,000",
    },
    BuiltinRow {
        university: "UC Davis",
        category: "Self Apply",
        program: "MS CS",
        deadlines: "Dec 15, 2024",
        application_fee: "$120",
        requirements: "GRE (required), TOEFL(90), 3 LORs, SOP",
        expected_qualities: "Research aptitude, 3.3+ GPA, Strong technical background",
        apply_link: "https://grad.ucdavis.edu/apply",
        program_fee: "$52,000",
    },
    BuiltinRow {
        university: "Texas A&M",
        category: "Self Apply",
        program: "MS DS",
        deadlines: "Jan 15, 2025",
        application_fee: "$65",
        requirements: "GRE (optional), TOEFL(80), 3 LORs, SOP",
        expected_qualities: "Statistics background, 3.0+ GPA, Programming skills",
        apply_link: "https://texasam2025.liaisoncas.com/applicant-ux/#/dashboard",
        program_fee: "$38,000",
    },
    BuiltinRow {
        university: "University of South Florida",
        category: "Self Apply",
        program: "MS CS",
        deadlines: "June 1, 2024",
        application_fee: "$50",
        requirements: "GRE (optional), TOEFL(79), 2 LORs, SOP",
        expected_qualities: "CS fundamentals, 3.0+ GPA, Technical projects",
        apply_link: "https://www.usf.edu/graduate-studies/admission",
        program_fee: "$28,000",
    },
    BuiltinRow {
        university: "University of Central Florida",
        category: "Self Apply",
        program: "MS CS",
        deadlines: "July 1, 2024",
        application_fee: "$55",
        requirements: "GRE (optional), TOEFL(80), 2 LORs, SOP",
        expected_qualities: "Programming proficiency, 3.0+ GPA, Project portfolio",
        apply_link: "https://applynow.graduate.ucf.edu/apply/",
        program_fee: "$30,000",
    },
    BuiltinRow {
        university: "San Jose State University",
        category: "IDP Consultancy",
        program: "MS CS",
        deadlines: "May 1, 2024",
        application_fee: "$70",
        requirements: "GRE (optional), TOEFL(80), 2 LORs, SOP",
        expected_qualities: "Technical skills, 3.0+ GPA, Industry experience preferred",
        apply_link: "https://www.sjsu.edu/admissions/graduate/want-to-apply",
        program_fee: "$35,000",
    },
    BuiltinRow {
        university: "University of Illinois Chicago",
        category: "IDP Consultancy",
        program: "MS CS",
        deadlines: "June 15, 2024",
        application_fee: "$70",
        requirements: "GRE (optional), TOEFL(80), 3 LORs, SOP",
        expected_qualities: "Strong academic record, 3.0+ GPA, Research/Project experience",
        apply_link: "https://admissions.uic.edu/graduate-professional/apply",
        program_fee: "$42,000",
    },
    BuiltinRow {
        university: "Florida Institute of Technology",
        category: "IDP Consultancy",
        program: "MS CS",
        deadlines: "June 1, 2024",
        application_fee: "$75",
        requirements: "GRE (optional), TOEFL(79), 2 LORs, SOP",
        expected_qualities: "CS background, 3.0+ GPA, Technical expertise",
        apply_link: "https://www.fit.edu/admissions/apply",
        program_fee: "$31,000",
    },
    BuiltinRow {
        university: "Florida International University",
        category: "IDP Consultancy",
        program: "MS CS",
        deadlines: "June 1, 2024",
        application_fee: "$60",
        requirements: "GRE (optional), TOEFL(80), 2 LORs, SOP",
        expected_qualities: "Programming skills, 3.0+ GPA, Project experience",
        apply_link: "https://admissions.fiu.edu/how-to-apply/graduate-applicant",
        program_fee: "$29,000",
    },
];
