//! CSV export of processes, measures and scorecard rows

use csv::Writer;
use std::io::Write;

use crate::aggregate::{ElementNode, ElementScorecard, GoalNode, Scorecard};

/// Errors from the CSV writer
pub type CsvResult<T> = Result<T, csv::Error>;

fn finish<W: Write>(mut wtr: Writer<W>) -> CsvResult<()> {
    wtr.flush()?;
    Ok(())
}

fn opt(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

/// One row per process, in tree order
pub fn write_processes<W: Write>(out: W, tree: &[ElementNode]) -> CsvResult<()> {
    let mut wtr = Writer::from_writer(out);
    wtr.write_record([
        "element_number",
        "element",
        "process_number",
        "name",
        "status",
        "mandatory",
        "risk_frequency",
        "risk_impact",
        "risk_score",
        "risk_level",
        "steps",
        "measures",
        "id",
    ])?;

    for node in tree {
        for proc_node in &node.processes {
            let p = &proc_node.process;
            wtr.write_record([
                node.element.element_number.to_string(),
                node.element.title.clone(),
                p.process_number.clone(),
                p.name.clone(),
                p.status.to_string(),
                p.mandatory.to_string(),
                p.risk.frequency.map(|r| r.to_string()).unwrap_or_default(),
                p.risk.impact.map(|r| r.to_string()).unwrap_or_default(),
                p.risk.score().map(|s| s.to_string()).unwrap_or_default(),
                p.risk.level().map(|l| l.to_string()).unwrap_or_default(),
                proc_node.steps.len().to_string(),
                proc_node.measures.len().to_string(),
                p.id.to_string(),
            ])?;
        }
    }

    finish(wtr)
}

/// One row per measure reached through a goal
pub fn write_goal_measures<W: Write>(out: W, tree: &[GoalNode]) -> CsvResult<()> {
    let mut wtr = Writer::from_writer(out);
    wtr.write_record([
        "goal",
        "goal_category",
        "target_value",
        "current_value",
        "process_number",
        "measure",
        "formula",
        "target",
        "frequency",
        "scorecard_category",
    ])?;

    for node in tree {
        let g = &node.goal;
        let target = g.target_value.map(|v| v.to_string()).unwrap_or_default();
        let current = g.current_value.map(|v| v.to_string()).unwrap_or_default();
        for proc_node in &node.processes {
            for m in &proc_node.measures {
                wtr.write_record([
                    g.title.as_str(),
                    g.category.as_str(),
                    target.as_str(),
                    current.as_str(),
                    proc_node.process.process_number.as_str(),
                    m.name.as_str(),
                    opt(&m.formula),
                    opt(&m.target),
                    opt(&m.frequency),
                    m.scorecard_category.as_ref().map_or("", |c| c.as_str()),
                ])?;
            }
        }
    }

    finish(wtr)
}

/// Category, process count and measure count for each scorecard row
fn scorecard_rows(card: &Scorecard) -> Vec<[String; 3]> {
    let mut rows: Vec<[String; 3]> = card
        .categories
        .iter()
        .map(|group| {
            [
                group.category.to_string(),
                group.count.to_string(),
                group.measures.len().to_string(),
            ]
        })
        .collect();
    rows.push(["Other".to_string(), String::new(), card.other.len().to_string()]);
    rows.push([
        "Uncategorized".to_string(),
        String::new(),
        card.uncategorized.len().to_string(),
    ]);
    rows
}

/// Category roll-up: one row per fixed category plus other/uncategorized
pub fn write_scorecard<W: Write>(out: W, card: &Scorecard) -> CsvResult<()> {
    let mut wtr = Writer::from_writer(out);
    wtr.write_record(["category", "processes", "measures"])?;
    for row in scorecard_rows(card) {
        wtr.write_record(&row)?;
    }
    finish(wtr)
}

/// Per-element roll-ups, the scorecard rows prefixed by their element
pub fn write_element_scorecards<W: Write>(out: W, cards: &[ElementScorecard]) -> CsvResult<()> {
    let mut wtr = Writer::from_writer(out);
    wtr.write_record(["element_number", "element", "category", "processes", "measures"])?;
    for card in cards {
        let number = card.element_number.to_string();
        for [category, processes, measures] in scorecard_rows(&card.scorecard) {
            wtr.write_record([
                number.as_str(),
                card.element_title.as_str(),
                category.as_str(),
                processes.as_str(),
                measures.as_str(),
            ])?;
        }
    }
    finish(wtr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{build_element_tree, by_element, measure_rows};
    use crate::core::entity::{RiskRating, ScorecardCategory};
    use crate::core::store::FrameworkRows;
    use crate::entities::{Element, PerformanceMeasure, Process};

    fn rows() -> FrameworkRows {
        let e = Element::new(1, "Leadership, Vision".to_string(), "t".to_string());
        let mut p = Process::new("OE-1.1".to_string(), "Plan".to_string(), e.id.clone(), "t".to_string());
        p.risk.frequency = Some(RiskRating::High);
        p.risk.impact = Some(RiskRating::Medium);
        let m = PerformanceMeasure::new(p.id.clone(), "Cost".to_string(), "t".to_string())
            .with_category(ScorecardCategory::Financial);
        FrameworkRows {
            elements: vec![e],
            processes: vec![p],
            measures: vec![m],
            ..Default::default()
        }
    }

    #[test]
    fn test_process_csv_quotes_and_scores() {
        let tree = build_element_tree(&rows());
        let mut buf = Vec::new();
        write_processes(&mut buf, &tree).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("element_number,element,process_number"));
        let row = lines.next().unwrap();
        assert!(row.starts_with("1,\"Leadership, Vision\",OE-1.1,Plan,draft,false,high,medium,6,high,0,1,"));
    }

    #[test]
    fn test_scorecard_csv() {
        let card = Scorecard::from_rows(&measure_rows(&rows()));
        let mut buf = Vec::new();
        write_scorecard(&mut buf, &card).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Financial,1,1\n"));
        assert!(text.contains("Learning & Growth,0,0\n"));
        assert!(text.ends_with("Uncategorized,,0\n"));
    }

    #[test]
    fn test_element_scorecards_csv_prefixes_element() {
        let cards = by_element(&measure_rows(&rows()));
        let mut buf = Vec::new();
        write_element_scorecards(&mut buf, &cards).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("element_number,element,category,processes,measures")
        );
        assert_eq!(lines.next(), Some("1,\"Leadership, Vision\",Financial,1,1"));
        // Four categories plus other and uncategorized
        assert_eq!(text.lines().count(), 7);
    }
}
