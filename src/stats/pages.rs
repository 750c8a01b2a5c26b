//! Page-path report folding for analytics provider adapters
//!
//! An adapter turns a raw page report into the `question_breakdown` map with
//! [`aggregate`]. The results are undated; the sync job stamps them.

use super::QuestionStat;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

static QUESTION_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^/questions/(\d+)").unwrap_or_else(|e| panic!("Invalid question regex: {e}"))
});

/// Raw page row as reported by an analytics page-path report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageRow {
    pub path: String,
    pub page_views: i64,
    pub unique_page_views: i64,
    pub avg_time_on_page: f64,
    pub entrances: i64,
}

/// Extract the question id from a page path like `/questions/42/answers`
pub fn question_id(path: &str) -> Option<i64> {
    QUESTION_PATH
        .captures(path)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Fold page rows into one [`QuestionStat`] per question.
///
/// Rows that do not point at a question are ignored. Rows resolving to the
/// same question are summed; the average time on page is weighted by page
/// views.
pub fn aggregate<I>(rows: I) -> BTreeMap<i64, QuestionStat>
where
    I: IntoIterator<Item = PageRow>,
{
    let mut stats: BTreeMap<i64, QuestionStat> = BTreeMap::new();
    let mut weighted_time: BTreeMap<i64, f64> = BTreeMap::new();

    for row in rows {
        let Some(id) = question_id(&row.path) else {
            continue;
        };

        let stat = stats.entry(id).or_insert_with(|| QuestionStat::new(id));
        stat.page_views += row.page_views;
        stat.unique_page_views += row.unique_page_views;
        stat.entrances += row.entrances;
        *weighted_time.entry(id).or_default() += row.avg_time_on_page * row.page_views as f64;
    }

    for (id, stat) in stats.iter_mut() {
        if stat.page_views > 0 {
            let total = weighted_time.get(id).copied().unwrap_or_default();
            stat.avg_time_on_page = total / stat.page_views as f64;
        }
    }

    stats
}
