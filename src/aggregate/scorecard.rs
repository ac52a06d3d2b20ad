//! Scorecard grouping of performance measures
//!
//! Counts per category are the number of distinct (element, process) pairs
//! with at least one measure in that category, not the number of measures.
//! Measures with an unrecognized category land in `other` and measures with
//! no category in `uncategorized`; neither contributes to the counts.

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::warn;

use crate::core::entity::ScorecardCategory;
use crate::core::identity::EntityId;
use crate::core::store::FrameworkRows;
use crate::entities::{Element, PerformanceMeasure, Process};

/// A measure joined with its owning process and element
#[derive(Debug, Clone, Serialize)]
pub struct MeasureContext {
    pub element_id: EntityId,
    pub element_number: u32,
    pub element_title: String,
    pub process_id: EntityId,
    pub process_number: String,
    #[serde(flatten)]
    pub measure: PerformanceMeasure,
}

impl MeasureContext {
    pub fn category(&self) -> Option<&ScorecardCategory> {
        self.measure.scorecard_category.as_ref()
    }
}

/// Join every measure to its process and element
///
/// Measures whose process or element no longer resolves are excluded.
pub fn measure_rows(rows: &FrameworkRows) -> Vec<MeasureContext> {
    let elements: HashMap<&EntityId, &Element> =
        rows.elements.iter().map(|e| (&e.id, e)).collect();
    let processes: HashMap<&EntityId, &Process> =
        rows.processes.iter().map(|p| (&p.id, p)).collect();

    rows.measures
        .iter()
        .filter_map(|m| {
            let Some(process) = processes.get(&m.process_id) else {
                warn!("measure {} references missing process {}; excluded", m.id, m.process_id);
                return None;
            };
            let Some(element) = elements.get(&process.element_id) else {
                warn!(
                    "process {} references missing element {}; measure {} excluded",
                    process.id, process.element_id, m.id
                );
                return None;
            };
            Some(MeasureContext {
                element_id: element.id.clone(),
                element_number: element.element_number,
                element_title: element.title.clone(),
                process_id: process.id.clone(),
                process_number: process.process_number.clone(),
                measure: m.clone(),
            })
        })
        .collect()
}

/// One of the four fixed categories with its distinct-process count
#[derive(Debug, Clone, Serialize)]
pub struct CategoryGroup {
    pub category: ScorecardCategory,
    pub count: usize,
    pub measures: Vec<MeasureContext>,
}

/// Category roll-up over a set of measures
#[derive(Debug, Clone, Serialize)]
pub struct Scorecard {
    /// Always the four fixed categories, in display order
    pub categories: Vec<CategoryGroup>,
    pub other: Vec<MeasureContext>,
    pub uncategorized: Vec<MeasureContext>,
}

impl Scorecard {
    /// Group measures by category and count distinct (element, process) pairs
    pub fn from_rows(rows: &[MeasureContext]) -> Self {
        let mut categories: Vec<CategoryGroup> = ScorecardCategory::FIXED
            .iter()
            .map(|c| CategoryGroup {
                category: c.clone(),
                count: 0,
                measures: Vec::new(),
            })
            .collect();
        let mut pairs: Vec<HashSet<(&EntityId, &EntityId)>> =
            vec![HashSet::new(); categories.len()];
        let mut other = Vec::new();
        let mut uncategorized = Vec::new();

        for row in rows {
            match row.category() {
                None => uncategorized.push(row.clone()),
                Some(cat) => match ScorecardCategory::FIXED.iter().position(|c| c == cat) {
                    Some(idx) => {
                        pairs[idx].insert((&row.element_id, &row.process_id));
                        categories[idx].measures.push(row.clone());
                    }
                    None => other.push(row.clone()),
                },
            }
        }

        for (group, seen) in categories.iter_mut().zip(&pairs) {
            group.count = seen.len();
        }

        Self {
            categories,
            other,
            uncategorized,
        }
    }

    pub fn group(&self, category: &ScorecardCategory) -> Option<&CategoryGroup> {
        self.categories.iter().find(|g| &g.category == category)
    }

    /// Distinct (element, process) count for a fixed category; 0 for others
    pub fn count(&self, category: &ScorecardCategory) -> usize {
        self.group(category).map_or(0, |g| g.count)
    }

    pub fn measure_count(&self) -> usize {
        self.categories.iter().map(|g| g.measures.len()).sum::<usize>()
            + self.other.len()
            + self.uncategorized.len()
    }
}

/// Scorecard for the measures of a single element
#[derive(Debug, Clone, Serialize)]
pub struct ElementScorecard {
    pub element_id: EntityId,
    pub element_number: u32,
    pub element_title: String,
    pub scorecard: Scorecard,
}

/// Group measures by (element, category), ordered by element number
pub fn by_element(rows: &[MeasureContext]) -> Vec<ElementScorecard> {
    let mut order: Vec<&EntityId> = Vec::new();
    let mut grouped: HashMap<&EntityId, Vec<MeasureContext>> = HashMap::new();
    for row in rows {
        let bucket = grouped.entry(&row.element_id).or_insert_with(|| {
            order.push(&row.element_id);
            Vec::new()
        });
        bucket.push(row.clone());
    }

    let mut cards: Vec<ElementScorecard> = order
        .into_iter()
        .filter_map(|id| grouped.remove(id))
        .filter_map(|measures| {
            let first = measures.first()?;
            Some(ElementScorecard {
                element_id: first.element_id.clone(),
                element_number: first.element_number,
                element_title: first.element_title.clone(),
                scorecard: Scorecard::from_rows(&measures),
            })
        })
        .collect();
    cards.sort_by_key(|c| c.element_number);
    cards
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> (FrameworkRows, Element, Process, Process) {
        let e = Element::new(1, "Leadership".to_string(), "t".to_string());
        let p1 = Process::new("OE-1.1".to_string(), "One".to_string(), e.id.clone(), "t".to_string());
        let p2 = Process::new("OE-1.2".to_string(), "Two".to_string(), e.id.clone(), "t".to_string());
        let rows = FrameworkRows {
            elements: vec![e.clone()],
            processes: vec![p1.clone(), p2.clone()],
            ..Default::default()
        };
        (rows, e, p1, p2)
    }

    fn kpi(p: &Process, name: &str, cat: Option<ScorecardCategory>) -> PerformanceMeasure {
        let m = PerformanceMeasure::new(p.id.clone(), name.to_string(), "t".to_string());
        match cat {
            Some(c) => m.with_category(c),
            None => m,
        }
    }

    #[test]
    fn test_count_is_distinct_processes() {
        let (mut rows, _e, p1, p2) = rows();
        let fin = Some(ScorecardCategory::Financial);
        rows.measures = vec![
            kpi(&p1, "a", fin.clone()),
            kpi(&p1, "b", fin.clone()),
            kpi(&p2, "c", fin),
        ];

        let card = Scorecard::from_rows(&measure_rows(&rows));
        assert_eq!(card.count(&ScorecardCategory::Financial), 2);
        assert_eq!(
            card.group(&ScorecardCategory::Financial).unwrap().measures.len(),
            3
        );
        assert_eq!(card.count(&ScorecardCategory::Customer), 0);
    }

    #[test]
    fn test_unknown_categories_kept_but_not_counted() {
        let (mut rows, _e, p1, _p2) = rows();
        rows.measures = vec![
            kpi(&p1, "green", Some(ScorecardCategory::from_stored("Sustainability"))),
            kpi(&p1, "bare", None),
            kpi(&p1, "cust", Some(ScorecardCategory::Customer)),
        ];

        let card = Scorecard::from_rows(&measure_rows(&rows));
        assert_eq!(card.other.len(), 1);
        assert_eq!(card.uncategorized.len(), 1);
        assert_eq!(card.measure_count(), 3);
        let total: usize = card.categories.iter().map(|g| g.count).sum();
        assert_eq!(total, 1);
        assert_eq!(card.categories.len(), 4);
    }

    #[test]
    fn test_by_element_groups_per_element() {
        let (mut rows, e, p1, _p2) = rows();
        let e2 = Element::new(2, "People".to_string(), "t".to_string());
        let p3 = Process::new("OE-2.1".to_string(), "Hire".to_string(), e2.id.clone(), "t".to_string());
        rows.measures = vec![
            kpi(&p3, "x", Some(ScorecardCategory::LearningGrowth)),
            kpi(&p1, "y", Some(ScorecardCategory::LearningGrowth)),
        ];
        rows.elements.push(e2);
        rows.processes.push(p3);

        let cards = by_element(&measure_rows(&rows));
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].element_id, e.id);
        assert_eq!(cards[0].scorecard.count(&ScorecardCategory::LearningGrowth), 1);
        assert_eq!(cards[1].element_number, 2);
    }

    #[test]
    fn test_dangling_measures_excluded() {
        let (mut rows, _e, p1, _p2) = rows();
        let ghost = Process::new(
            "OE-9.1".to_string(),
            "Ghost".to_string(),
            EntityId::new(crate::core::identity::EntityPrefix::Elem),
            "t".to_string(),
        );
        rows.measures = vec![kpi(&p1, "ok", None), kpi(&ghost, "lost", None)];
        rows.processes.push(ghost);

        let joined = measure_rows(&rows);
        assert_eq!(joined.len(), 1);
        assert_eq!(joined[0].process_number, "OE-1.1");
    }
}
