//! Weighted combination of category scores into a route grade.

use crate::models::CategoryScore;
use crate::rules::policy;
use serde::{Deserialize, Serialize};

/// Route letter grade. Higher scores are worse, so `D` is the riskiest grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskGrade {
    A,
    B,
    C,
    D,
}

impl RiskGrade {
    /// Map an overall score to a grade. Thresholds are inclusive and checked
    /// from the highest down.
    pub fn from_score(score: f64) -> Self {
        if score >= 4.0 {
            RiskGrade::D
        } else if score >= 3.0 {
            RiskGrade::C
        } else if score >= 2.0 {
            RiskGrade::B
        } else {
            RiskGrade::A
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskGrade::A => "Minimal Risk",
            RiskGrade::B => "Low Risk",
            RiskGrade::C => "Mild Risk",
            RiskGrade::D => "High Risk",
        }
    }

    /// Severity rank, 0 for `A` up to 3 for `D`.
    pub fn rank(self) -> u8 {
        self as u8
    }
}

/// Route-level grade with its category breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskGradeReport {
    pub overall_score: f64,
    pub grade: RiskGrade,
    pub grade_label: String,
    pub categories: Vec<CategoryScore>,
}

/// Overall score used when no categories are supplied.
const EMPTY_OVERALL_SCORE: f64 = 1.0;

/// Combine category scores using the fixed weight table.
///
/// Weights come from the category policy, so an omitted category simply drops
/// out of both numerator and denominator. The breakdown is returned in
/// canonical category order.
pub fn aggregate(categories: Vec<CategoryScore>) -> RiskGradeReport {
    let mut categories = categories;
    categories.sort_by_key(|score| score.category.index());

    let mut weighted_sum = 0.0;
    let mut weight_sum = 0.0;
    for score in &mut categories {
        let weight = policy(score.category).weight;
        score.weight = weight;
        score.weighted_score = score.score * weight;
        weighted_sum += score.weighted_score;
        weight_sum += weight;
    }

    let overall_score = if weight_sum > 0.0 {
        weighted_sum / weight_sum
    } else {
        EMPTY_OVERALL_SCORE
    };
    let grade = RiskGrade::from_score(overall_score);

    RiskGradeReport {
        overall_score,
        grade,
        grade_label: grade.label().to_string(),
        categories,
    }
}

/// The `n` riskiest categories, highest score first. Ties keep canonical order.
pub fn highest_risk_categories(report: &RiskGradeReport, n: usize) -> Vec<&CategoryScore> {
    let mut ranked: Vec<&CategoryScore> = report.categories.iter().collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked.truncate(n);
    ranked
}
