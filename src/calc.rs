use crate::model::{GradeSnapshot, QuestionGrade};
use serde::Serialize;
use std::fmt;

/// Half-up 1-decimal rounding used for every displayed score:
/// `floor(10*x + 0.5) / 10`
pub fn round_off_1_decimal(x: f64) -> f64 {
    ((10.0 * x) + 0.5).floor() / 10.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LetterGrade {
    A,
    B,
    C,
    D,
    F,
}

impl fmt::Display for LetterGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LetterGrade::A => "A",
            LetterGrade::B => "B",
            LetterGrade::C => "C",
            LetterGrade::D => "D",
            LetterGrade::F => "F",
        };
        f.write_str(s)
    }
}

/// Bands are inclusive on their lower bound.
pub fn letter_grade(percentage: f64) -> LetterGrade {
    if percentage >= 90.0 {
        LetterGrade::A
    } else if percentage >= 80.0 {
        LetterGrade::B
    } else if percentage >= 70.0 {
        LetterGrade::C
    } else if percentage >= 60.0 {
        LetterGrade::D
    } else {
        LetterGrade::F
    }
}

pub fn clamp_score(score: f64, max_points: f64) -> f64 {
    if score.is_nan() || score < 0.0 {
        return 0.0;
    }
    if score > max_points {
        return max_points.max(0.0);
    }
    score
}

/// `total / max_total` as a percentage rounded half-up at the tenths digit.
/// A zero `max_total` yields 0 rather than dividing.
pub fn percentage(total_score: f64, max_total: f64) -> f64 {
    if max_total > 0.0 {
        ((total_score / max_total * 1000.0) + 0.5).floor() / 10.0
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub total_score: f64,
    pub max_total: f64,
    pub percentage: f64,
}

pub fn aggregate<'a, I>(questions: I) -> Totals
where
    I: IntoIterator<Item = &'a QuestionGrade>,
{
    let mut total_score: f64 = 0.0;
    let mut max_total: f64 = 0.0;
    for q in questions {
        total_score += q.score;
        max_total += q.max_points;
    }

    Totals {
        total_score,
        max_total,
        percentage: percentage(total_score, max_total),
    }
}

/// Writes freshly aggregated totals into the snapshot.
pub fn apply_totals(snapshot: &mut GradeSnapshot) -> Totals {
    let totals = aggregate(&snapshot.questions);
    snapshot.total_score = totals.total_score;
    snapshot.max_total = totals.max_total;
    snapshot.percentage = totals.percentage;
    totals
}

/// Clamps every question into `[0, max_points]` and then re-aggregates.
pub fn normalize_snapshot(snapshot: &mut GradeSnapshot) -> Totals {
    for q in snapshot.questions.iter_mut() {
        q.score = clamp_score(q.score, q.max_points);
    }
    apply_totals(snapshot)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSummary {
    pub total_score: f64,
    pub max_total: f64,
    pub percentage: f64,
    pub letter: LetterGrade,
}

pub fn summarize(snapshot: &GradeSnapshot) -> ScoreSummary {
    ScoreSummary {
        total_score: snapshot.total_score,
        max_total: snapshot.max_total,
        percentage: snapshot.percentage,
        letter: letter_grade(snapshot.percentage),
    }
}
