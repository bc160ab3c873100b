use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};
use crate::marks::Mark;

/// Subject name to mark, in sheet order. Order only matters for ties.
pub type SubjectMarkMap = IndexMap<String, Mark>;

/// Which total-score band table the narrative comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallScale {
    /// Raw per-term total over the full sheet, out of 1100.
    Absolute,
    /// Total out of 500. Per-term totals above that are folded back with a
    /// fixed divisor, so 501 reads as 228 while 500 reads as 500.
    #[default]
    Averaged,
}

/// Values substituted into a narrative comment.
struct Narrative<'a> {
    name: &'a str,
    total: String,
    high1: &'a str,
    high2: &'a str,
    low1: &'a str,
    low2: &'a str,
}

struct ScaleTable {
    max_total: f64,
    /// Ceiling of an over-scaled total. Totals above `max_total` are divided
    /// by `aggregate_ceiling / max_total`.
    aggregate_ceiling: Option<f64>,
    /// Band lower bounds, highest first.
    lowers: &'static [f64],
    narrative: fn(usize, &Narrative) -> String,
}

impl ScaleTable {
    /// Largest raw total the table accepts before any rescale.
    fn ceiling(&self) -> f64 {
        self.aggregate_ceiling.unwrap_or(self.max_total)
    }

    fn effective_total(&self, total: f64) -> f64 {
        match self.aggregate_ceiling {
            Some(ceiling) if total > self.max_total => total * self.max_total / ceiling,
            _ => total,
        }
    }

    fn band_for(&self, total: f64) -> usize {
        self.lowers
            .iter()
            .position(|lower| total >= *lower)
            .unwrap_or(self.lowers.len() - 1)
    }
}

const ABSOLUTE: ScaleTable = ScaleTable {
    max_total: 1100.0,
    aggregate_ceiling: None,
    lowers: &[
        1000.0, 900.0, 800.0, 700.0, 650.0, 600.0, 550.0, 500.0, 450.0, 400.0, 300.0, 200.0, 100.0,
        0.0,
    ],
    narrative: absolute_narrative,
};

const AVERAGED: ScaleTable = ScaleTable {
    max_total: 500.0,
    // Per-term total over eleven columns, folded onto five subjects (divisor 2.2).
    aggregate_ceiling: Some(1100.0),
    lowers: &[450.0, 400.0, 360.0, 320.0, 300.0, 250.0, 200.0, 150.0, 100.0, 0.0],
    narrative: averaged_narrative,
};

/// Per-term bands out of 1100.
fn absolute_narrative(band: usize, n: &Narrative) -> String {
    let Narrative {
        name,
        total,
        high1,
        high2,
        low1,
        low2,
    } = n;
    match band {
        0 => format!(
            "Outstanding job, {name}! Your stellar score of {total} out of 1100 is truly remarkable. You particularly excelled in {high1}. Keep polishing areas like {low1} and {low2} to rise to the top. You're soaring higher than an eagle!"
        ),
        1 => format!(
            "Exceptional performance, {name}! Your score of {total} showcases your dedication. Your prowess in {high1} is commendable, but don't forget to hone areas like {low1}. You're as determined as a cheetah on the hunt!"
        ),
        2 => format!(
            "Fabulous work, {name}! With a score of {total}, you're making waves. You've done notably well in {high1}. Continue to refine skills in areas like {low1} and {low2}. You're as dedicated as a beaver building a dam!"
        ),
        3 => format!(
            "Great effort, {name}! Your score of {total} is commendable. While you shined in {high1} and {high2}, there's more room for improvement in {low1} and {low2}. You're as agile as a monkey swinging through trees!"
        ),
        4 => format!(
            "Good job, {name}. A total score of {total} showcases your potential. Your skills in areas like {high1} and {high2} are evident. Yet, focus on {low1} and {low2} for holistic growth. You're as brave as a lion facing a storm!"
        ),
        5 => format!(
            "Stay determined, {name}. Your score of {total} is a testament to your hard work. {high1} and {high2} were a highlight, but don't neglect areas like {low1} and {low2}. You're as persistent as a tortoise on a mission!"
        ),
        6 => format!(
            "Continue pushing, {name}. Your score of {total} shows promise. While {high1} and {high2} were your strength, put some elbow grease into {low1} and {low2}. You're as tenacious as a kangaroo in the outback!"
        ),
        7 => format!(
            "Every step is progress, {name}. With {total}, you have shown that you have potential. Your efforts in {high1} are noteworthy. But, there's room for growth in {low1} and {low2}. You're as adaptable as an octopus exploring the ocean floor!"
        ),
        8 => format!(
            "Stay engaged, {name}. With a score of {total}, you can go the extra mile and achieve more. Your strengths lie in {high1}, but areas like {low1} and {low2} need your attention. You're as determined as a hummingbird searching for nectar!"
        ),
        9 => format!(
            "Keep the momentum, {name}. A score of {total} hints at your capabilities. You did well in {high1} and {high2}, but it's essential to strengthen your skills in {low1} and {low2} to rise. You're as spirited as a hawk soaring the skies!"
        ),
        10 => format!(
            "Your journey is important, {name}. With a score of {total}, the sky's the limit. While {high1} showed some bright moments, more effort in {low1} will help you rise to your potential. You're as curious as a cat exploring its surroundings!"
        ),
        11 => format!(
            "Every effort counts, {name}. Your score of {total} is a stepping stone. Your potential in {high1} is clear. However, work on areas like {low1} to enhance your prowess. You're as resilient as a cactus in the desert!"
        ),
        12 => format!(
            "Beginnings are full of lessons, {name}. A score of {total} means there's much to learn. You have some skills in {high1}, but look into nurturing {low1} and {low2}. You're as lively as a fish in the water!"
        ),
        _ => format!(
            "Every new start is an opportunity, {name}. With a score of {total}, growth awaits. Your interest in {high1} is evident. Yet, delve deeper into {low1} and {low2} to make strides. You're as sturdy as an oak tree in its prime!"
        ),
    }
}

/// Averaged bands out of 500.
fn averaged_narrative(band: usize, n: &Narrative) -> String {
    let Narrative {
        name,
        total,
        high1,
        high2,
        low1,
        low2,
    } = n;
    match band {
        0 => format!(
            "Outstanding job, {name}! Your average score of {total} out of 500 is truly remarkable. You particularly excelled in {high1}. Keep reaching for the stars and celebrate your achievements. You're soaring higher than an eagle!"
        ),
        1 => format!(
            "Excellent work, {name}! An average score of {total} out of 500 reflects real commitment. {high1} and {high2} stood out. A little more focus on {low1} will take you even further. You're as brave as a lion facing a storm!"
        ),
        2 => format!(
            "Great effort, {name}! Your average score of {total} out of 500 is commendable. You shined in {high1}, and with more practice in {low1} and {low2} you will climb higher. You're as agile as a monkey swinging through trees!"
        ),
        3 => format!(
            "Impressive work, {name}! With an average score of {total} out of 500, you're making great strides. You performed notably in {high1}. Keep focusing on areas like {low1} to achieve even more. You're as dedicated as a beaver building a dam!"
        ),
        4 => format!(
            "Well done, {name}! You scored an average of {total} out of 500. Your strong point was {high1}. With some more attention to {low1}, you can achieve even greater heights. You're as agile as a cheetah on the hunt!"
        ),
        5 => format!(
            "Fair performance, {name}. With an average score of {total} out of 500, your skills in {high1} stood out. Building on areas like {low1} will elevate your results. You're as persistent as a tortoise on a mission!"
        ),
        6 => format!(
            "Continue your journey, {name}. Your average score of {total} suggests potential for improvement. Your best was {high1}. Dedicating time to subjects like {low1} will make a difference. You're as tenacious as a kangaroo in the outback!"
        ),
        7 => format!(
            "There's room for growth, {name}. With an average score of {total}, focusing on all areas, especially {low1}, will be beneficial. Your efforts in {high1} are commendable. Stay persistent and keep believing in yourself! You're as tenacious as a mountain goat on a steep cliff!"
        ),
        8 => format!(
            "Every effort counts, {name}. An average score of {total} is a stepping stone. Your potential in {high1} is clear. However, work on {low1} and {low2} to build your confidence. You're as resilient as a cactus in the desert!"
        ),
        _ => format!(
            "Every new start is an opportunity, {name}. With an average score of {total}, growth awaits. Your interest in {high1} is evident. Yet, delve deeper into {low1} and {low2} to make strides. You're as sturdy as an oak tree in its prime!"
        ),
    }
}

impl OverallScale {
    fn table(self) -> &'static ScaleTable {
        match self {
            OverallScale::Absolute => &ABSOLUTE,
            OverallScale::Averaged => &AVERAGED,
        }
    }
}

/// Top two and bottom two subjects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectRanking<'a> {
    pub highest: &'a str,
    pub second_highest: &'a str,
    pub lowest: &'a str,
    pub second_lowest: &'a str,
}

/// Rank subjects by mark, descending. Equal marks keep their map order, so
/// the first-seen subject wins a tie for highest.
pub fn rank_subjects(marks: &SubjectMarkMap) -> Result<SubjectRanking<'_>> {
    if marks.len() < 2 {
        return Err(ReportError::InsufficientData { count: marks.len() });
    }
    let mut order: Vec<(&str, i64)> = marks
        .iter()
        .map(|(name, mark)| (name.as_str(), mark.value()))
        .collect();
    // sort_by is stable.
    order.sort_by(|a, b| b.1.cmp(&a.1));
    let n = order.len();
    Ok(SubjectRanking {
        highest: order[0].0,
        second_highest: order[1].0,
        lowest: order[n - 1].0,
        second_lowest: order[n - 2].0,
    })
}

fn integrity_message(name: &str, total: f64) -> String {
    format!("Total marks for {name} is {total}. Please check the marks entered.")
}

/// Narrative comment on the per-subject-averaged scale.
#[allow(dead_code)]
pub fn overall_comment(
    subject_marks: &SubjectMarkMap,
    total: f64,
    student_name: &str,
) -> Result<String> {
    overall_comment_with(OverallScale::default(), subject_marks, total, student_name)
}

pub fn overall_comment_with(
    scale: OverallScale,
    subject_marks: &SubjectMarkMap,
    total: f64,
    student_name: &str,
) -> Result<String> {
    let table = scale.table();
    if !(0.0..=table.ceiling()).contains(&total) {
        return Ok(integrity_message(student_name, total));
    }
    if total == 0.0 && !subject_marks.values().any(|m| m.is_entered()) {
        return Ok(integrity_message(student_name, total));
    }

    let ranking = rank_subjects(subject_marks)?;
    let effective = table.effective_total(total);
    let band = table.band_for(effective);

    Ok((table.narrative)(
        band,
        &Narrative {
            name: student_name,
            total: format!("{effective:.0}"),
            high1: ranking.highest,
            high2: ranking.second_highest,
            low1: ranking.lowest,
            low2: ranking.second_lowest,
        },
    ))
}
