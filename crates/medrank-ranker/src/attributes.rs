//! Attribute registry.
//!
//! The single source of truth for which school metrics exist, which way
//! they point, and whether they take part in scoring. Datasets, weight
//! vectors and submissions are all validated against [`Attribute`] at the
//! boundary; nothing downstream matches on raw strings.

use std::fmt;
use std::str::FromStr;

use medrank_common::{MedrankError, Result};
use serde::{Deserialize, Serialize};

/// Whether a higher raw value is better or worse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Higher raw value is better.
    Direct,
    /// Lower raw value is better (cost, debt).
    Inverse,
}

/// Display grouping. Has no effect on computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Academics,
    Research,
    Finances,
    ClinicalQuality,
    StudentBody,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Academics,
        Category::Research,
        Category::Finances,
        Category::ClinicalQuality,
        Category::StudentBody,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Category::Academics => "Academics",
            Category::Research => "Research",
            Category::Finances => "Finances",
            Category::ClinicalQuality => "Clinical Quality",
            Category::StudentBody => "Student Body",
        }
    }
}

/// Every rankable (or display-only) school metric, in registry order.
///
/// Serialises as its dataset column key, so `BTreeMap<Attribute, _>`
/// round-trips through JSON as a plain key/value object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "&'static str", try_from = "String")]
pub enum Attribute {
    AverageGpa,
    AverageMcat,
    NihFunding,
    NihFundingPerFaculty,
    AverageIndebtedness,
    TotalCost,
    TuitionAndFees,
    RankedSpecialties,
    Top10Specialties,
    UrmPercent,
    ClassSize,
}

/// Static definition of one attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeDefinition {
    pub attribute: Attribute,
    /// Exact dataset column name.
    pub key: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub direction: Direction,
    pub category: Category,
    /// `false` marks display-only attributes, excluded from every scoring stage.
    pub eligible: bool,
}

const fn def(
    attribute: Attribute,
    key: &'static str,
    label: &'static str,
    description: &'static str,
    direction: Direction,
    category: Category,
    eligible: bool,
) -> AttributeDefinition {
    AttributeDefinition { attribute, key, label, description, direction, category, eligible }
}

/// The registry. Indexed by `Attribute as usize`.
pub static REGISTRY: [AttributeDefinition; 11] = [
    def(Attribute::AverageGpa, "Average GPA", "GPA",
        "Average Undergraduate GPA", Direction::Direct, Category::Academics, true),
    def(Attribute::AverageMcat, "Average MCAT", "MCAT",
        "Average MCAT score", Direction::Direct, Category::Academics, true),
    def(Attribute::NihFunding, "NIH Research Funding", "Total NIH Funding",
        "Total Institutional NIH Funding", Direction::Direct, Category::Research, true),
    def(Attribute::NihFundingPerFaculty, "NIH Research Funding per Faculty", "NIH / Faculty",
        "NIH Funding per Faculty Member", Direction::Direct, Category::Research, true),
    def(Attribute::AverageIndebtedness, "Average Graduate Indebtedness", "Avg Debt",
        "Average Debt of Graduates", Direction::Inverse, Category::Finances, true),
    def(Attribute::TotalCost, "Total Cost of Attendance", "Total Cost",
        "Annual Cost of Attendance", Direction::Inverse, Category::Finances, true),
    def(Attribute::TuitionAndFees, "Tuition and Fees", "Tuition + Fees",
        "Tuition and Fees", Direction::Inverse, Category::Finances, true),
    def(Attribute::RankedSpecialties, "#n_ranked_specialties", "Ranked Specialties",
        "Nationally Ranked Specialties by US News & World Report",
        Direction::Direct, Category::ClinicalQuality, true),
    def(Attribute::Top10Specialties, "#n_top10_specialties", "Top 10 Specialties",
        "Top 10 Ranked Specialties by US News & World Report",
        Direction::Direct, Category::ClinicalQuality, true),
    def(Attribute::UrmPercent, "URM%", "% URM",
        "Underrepresented in Medicine %", Direction::Direct, Category::StudentBody, true),
    def(Attribute::ClassSize, "Class Size", "Class Size",
        "Number of Students", Direction::Direct, Category::StudentBody, false),
];

impl Attribute {
    pub const ALL: [Attribute; 11] = [
        Attribute::AverageGpa,
        Attribute::AverageMcat,
        Attribute::NihFunding,
        Attribute::NihFundingPerFaculty,
        Attribute::AverageIndebtedness,
        Attribute::TotalCost,
        Attribute::TuitionAndFees,
        Attribute::RankedSpecialties,
        Attribute::Top10Specialties,
        Attribute::UrmPercent,
        Attribute::ClassSize,
    ];

    pub fn definition(&self) -> &'static AttributeDefinition {
        &REGISTRY[*self as usize]
    }

    pub fn key(&self) -> &'static str {
        self.definition().key
    }

    pub fn direction(&self) -> Direction {
        self.definition().direction
    }

    pub fn is_eligible(&self) -> bool {
        self.definition().eligible
    }

    /// Attributes whose figures differ between in-state and out-of-state applicants.
    pub fn has_out_of_state_variant(&self) -> bool {
        matches!(self, Attribute::TuitionAndFees | Attribute::TotalCost)
    }

    /// Resolve an exact dataset column key.
    pub fn from_key(key: &str) -> Result<Self> {
        REGISTRY
            .iter()
            .find(|d| d.key == key)
            .map(|d| d.attribute)
            .ok_or_else(|| MedrankError::UnknownAttribute(key.to_string()))
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Attribute {
    type Err = MedrankError;

    fn from_str(s: &str) -> Result<Self> {
        Attribute::from_key(s)
    }
}

impl From<Attribute> for &'static str {
    fn from(attr: Attribute) -> Self {
        attr.key()
    }
}

impl TryFrom<String> for Attribute {
    type Error = MedrankError;

    fn try_from(value: String) -> Result<Self> {
        Attribute::from_key(&value)
    }
}

/// Ordered list of every attribute definition.
pub fn registry() -> &'static [AttributeDefinition] {
    &REGISTRY
}

/// Attributes that take part in scoring, in registry order.
pub fn eligible_attributes() -> impl Iterator<Item = Attribute> {
    Attribute::ALL.into_iter().filter(Attribute::is_eligible)
}

/// Registry grouped by display category, categories and members in registry order.
pub fn by_category() -> Vec<(Category, Vec<&'static AttributeDefinition>)> {
    Category::ALL
        .iter()
        .map(|&cat| (cat, REGISTRY.iter().filter(|d| d.category == cat).collect()))
        .collect()
}
