//! Aggregated weights feeding back into the ranking pipeline.
//!
//! Run with: cargo test --package medrank-ranker --test test_weight_aggregation

use medrank_ranker::aggregate::{find, submissions_from_json_str};
use medrank_ranker::{aggregate, rank, Attribute, Dataset, SchoolRecord};
use pretty_assertions::assert_eq;

const SUBMISSIONS: &str = r#"[
    {"role": "faculty", "weights": {"Average GPA": 10, "NIH Research Funding": 90}},
    {"role": "faculty", "weights": {"Average GPA": 20, "NIH Research Funding": 80}},
    {"role": "faculty", "weights": {"Average GPA": 90, "NIH Research Funding": 10}},
    {"role": "med_student", "weights": {"Average GPA": 50, "Tuition and Fees": 50}},
    {"role": "med_student", "weights": {"Average GPA": 30, "Tuition and Fees": 70}},
    {"role": null, "weights": {"Tuition and Fees": 100}}
]"#;

#[test]
fn test_aggregates_per_role_and_overall() {
    let subs = submissions_from_json_str(SUBMISSIONS).unwrap();
    let aggs = aggregate(&subs);

    let labels: Vec<String> = aggs.iter().map(|a| a.display_label()).collect();
    assert_eq!(
        labels,
        vec![
            "All (6)".to_string(),
            "Medical school faculty member (3)".to_string(),
            "Current US medical student (2)".to_string(),
        ]
    );

    let faculty = find(&aggs, "faculty").unwrap();
    assert_eq!(faculty.weights.get(Attribute::AverageGpa), 20.0);
    assert_eq!(faculty.weights.get(Attribute::NihFunding), 80.0);
    assert_eq!(faculty.weights.get(Attribute::TuitionAndFees), 0.0);

    let students = find(&aggs, "med_student").unwrap();
    assert_eq!(students.weights.get(Attribute::AverageGpa), 40.0);
    assert_eq!(students.weights.get(Attribute::TuitionAndFees), 60.0);

    let overall = find(&aggs, "overall").unwrap();
    // GPA: [10, 20, 30, 50, 90] -> 30; tuition: [50, 70, 100] -> 70
    assert_eq!(overall.weights.get(Attribute::AverageGpa), 30.0);
    assert_eq!(overall.weights.get(Attribute::TuitionAndFees), 70.0);
    assert_eq!(overall.weights.get(Attribute::NihFunding), 80.0);
}

#[test]
fn test_role_weightings_produce_different_rankings() {
    let subs = submissions_from_json_str(SUBMISSIONS).unwrap();
    let aggs = aggregate(&subs);

    let dataset = Dataset::new(vec![
        SchoolRecord::new("Research Powerhouse")
            .with(Attribute::AverageGpa, 3.7)
            .with(Attribute::NihFunding, 900_000_000.0)
            .with(Attribute::TuitionAndFees, 68_000.0),
        SchoolRecord::new("Affordable State")
            .with(Attribute::AverageGpa, 3.8)
            .with(Attribute::NihFunding, 40_000_000.0)
            .with(Attribute::TuitionAndFees, 32_000.0),
    ]);

    let by_faculty = rank(&dataset, &find(&aggs, "faculty").unwrap().weights);
    let by_students = rank(&dataset, &find(&aggs, "med_student").unwrap().weights);
    assert_eq!(by_faculty[0].school.name, "Research Powerhouse");
    assert_eq!(by_students[0].school.name, "Affordable State");
}
