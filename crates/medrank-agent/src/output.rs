//! Terminal rendering for `medrank` subcommands.

use std::io::Write;

use medrank_common::OutputFormat;
use medrank_ranker::aggregate::AggregateWeightVector;
use medrank_ranker::attributes::{by_category, Direction};
use medrank_ranker::{export, search, RankingRun, ScoredRecord};

/// Apply the search filter and row limit. Ranks are untouched.
pub fn select_rows(run: &RankingRun, term: Option<&str>, top_n: Option<usize>) -> Vec<ScoredRecord> {
    let matched = match term {
        Some(term) => search(&run.ranked, term),
        None => run.ranked.iter().collect(),
    };
    matched
        .into_iter()
        .take(top_n.unwrap_or(usize::MAX))
        .cloned()
        .collect()
}

pub fn write_ranking<W: Write>(rows: &[ScoredRecord], format: OutputFormat, mut out: W) -> anyhow::Result<()> {
    match format {
        OutputFormat::Csv => export::write_csv(rows, out)?,
        OutputFormat::Json => {
            export::write_json(rows, &mut out)?;
            writeln!(out)?;
        }
        OutputFormat::Table => {
            writeln!(out, "{:>5}  {:>8}  Institution", "Rank", "Score")?;
            for row in rows {
                writeln!(out, "{:>5}  {:>8.4}  {}", row.rank, row.raw_score, row.school.name)?;
            }
        }
    }
    Ok(())
}

/// One block per group: label, then every weighted attribute.
pub fn write_aggregates<W: Write>(aggregates: &[AggregateWeightVector], mut out: W) -> anyhow::Result<()> {
    if aggregates.is_empty() {
        writeln!(out, "No submissions.")?;
        return Ok(());
    }
    for agg in aggregates {
        writeln!(out, "{}", agg.display_label())?;
        for (attr, weight) in agg.weights.iter() {
            writeln!(out, "  {:<36} {:>6.1}", attr.key(), weight)?;
        }
    }
    Ok(())
}

pub fn write_attributes<W: Write>(mut out: W) -> anyhow::Result<()> {
    for (category, defs) in by_category() {
        writeln!(out, "{}", category.name())?;
        for def in defs {
            let note = match (def.eligible, def.direction) {
                (false, _) => "display only",
                (true, Direction::Direct) => "higher is better",
                (true, Direction::Inverse) => "lower is better",
            };
            writeln!(out, "  {:<36} {:<18} {}", def.key, note, def.description)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use medrank_common::CostView;
    use medrank_ranker::{run, Attribute, Dataset, SchoolRecord, WeightVector};

    fn ranking() -> RankingRun {
        let dataset = Dataset::new(vec![
            SchoolRecord::new("North Medical").with(Attribute::AverageMcat, 512.0),
            SchoolRecord::new("South Medical").with(Attribute::AverageMcat, 520.0),
            SchoolRecord::new("East Medical").with(Attribute::AverageMcat, 516.0),
        ]);
        let w = WeightVector::from_percentages([(Attribute::AverageMcat, 100)]).unwrap();
        run(&dataset, CostView::InState, &w)
    }

    fn render(rows: &[ScoredRecord], format: OutputFormat) -> String {
        let mut buf = Vec::new();
        write_ranking(rows, format, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_search_keeps_full_list_ranks() {
        let rows = select_rows(&ranking(), Some("north"), None);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].rank, 3);
    }

    #[test]
    fn test_top_n_limits_rows() {
        let rows = select_rows(&ranking(), None, Some(2));
        let names: Vec<&str> = rows.iter().map(|r| r.school.name.as_str()).collect();
        assert_eq!(names, vec!["South Medical", "East Medical"]);
    }

    #[test]
    fn test_table_output() {
        let text = render(&select_rows(&ranking(), None, None), OutputFormat::Table);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[1].contains("1.0000"));
        assert!(lines[1].ends_with("South Medical"));
    }

    #[test]
    fn test_csv_output_has_header() {
        let text = render(&select_rows(&ranking(), None, Some(1)), OutputFormat::Csv);
        assert!(text.starts_with("Rank,Institution,Score,"));
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn test_attributes_listing() {
        let mut buf = Vec::new();
        write_attributes(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("Academics\n"));
        assert!(text.contains("Class Size"));
        assert!(text.contains("display only"));
    }

    #[test]
    fn test_no_aggregates() {
        let mut buf = Vec::new();
        write_aggregates(&[], &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "No submissions.\n");
    }
}
