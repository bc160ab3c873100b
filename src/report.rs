use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::comments::classify_subjects_with;
use crate::config::Settings;
use crate::error::{ReportError, Result};
use crate::format::{
    abbreviate_name, display_name, first_name, format_class_average, format_mark,
    format_position, format_student_id,
};
use crate::marks::{normalize, RawCell};
use crate::overall::{overall_comment_with, SubjectMarkMap};

const ID_COLUMN: usize = 0;
const NAME_COLUMN: usize = 1;
const GENDER_COLUMN: usize = 2;
const TOTAL_CHART_LABEL: &str = "TOT";

static EMPTY_CELL: RawCell = RawCell::Empty;

/// Extracted sheet: header row, student rows, class-averages row and a
/// head-teacher remarks row, in that order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClassSheet {
    pub school_name: String,
    pub class_name: String,
    pub term_name: String,
    pub rows: Vec<Vec<RawCell>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectLine {
    pub label: String,
    pub mark: i64,
    pub class_average: String,
    pub remark: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub title: String,
    pub labels: Vec<String>,
    pub student: Vec<f64>,
    pub class_averages: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentReport {
    pub row: usize,
    pub student_id: String,
    pub name: String,
    pub display_name: String,
    pub short_name: String,
    pub gender: String,
    pub position: String,
    pub subjects: Vec<SubjectLine>,
    pub overall_comment: String,
    pub chart: ChartData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectAverage {
    pub label: String,
    pub average: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassReport {
    pub school_name: String,
    pub class_name: String,
    pub term_name: String,
    pub student_count: usize,
    pub class_averages: Vec<SubjectAverage>,
    pub class_mean: String,
    pub head_teacher_remarks: String,
    pub students: Vec<StudentReport>,
}

fn cell(row: &[RawCell], col: usize) -> &RawCell {
    row.get(col).unwrap_or(&EMPTY_CELL)
}

fn text(row: &[RawCell], col: usize) -> String {
    cell(row, col).display_text().trim().to_string()
}

/// Class-wide values shared by every student page.
struct ClassContext {
    subject_labels: Vec<String>,
    total_label: String,
    subject_averages: Vec<f64>,
    class_mean: f64,
    averages_display: Vec<String>,
    student_count: usize,
}

fn class_context(sheet: &ClassSheet, settings: &Settings) -> Result<ClassContext> {
    let layout = &settings.layout;
    let header = &sheet.rows[0];
    let averages = &sheet.rows[sheet.rows.len() - 2];

    let subject_labels: Vec<String> = layout
        .subject_columns()
        .map(|col| text(header, col))
        .collect();
    let mut seen = HashSet::new();
    for label in &subject_labels {
        if label.is_empty() {
            return Err(ReportError::BadSheet(
                "header row is missing a subject name".to_string(),
            ));
        }
        if !seen.insert(label.to_lowercase()) {
            return Err(ReportError::BadSheet(format!(
                "subject {label:?} appears twice in the header row"
            )));
        }
    }

    let subject_averages: Vec<f64> = layout
        .subject_columns()
        .map(|col| cell(averages, col).as_f64().unwrap_or(0.0))
        .collect();
    let class_mean = subject_averages.iter().sum::<f64>() / subject_averages.len() as f64;

    let averages_display = layout
        .subject_columns()
        .chain(std::iter::once(layout.total_column))
        .map(|col| format_class_average(cell(averages, col)))
        .collect();

    Ok(ClassContext {
        subject_labels,
        total_label: text(header, layout.total_column),
        subject_averages,
        class_mean,
        averages_display,
        student_count: 0,
    })
}

fn build_student(
    row_no: usize,
    row: &[RawCell],
    ctx: &ClassContext,
    settings: &Settings,
) -> Result<StudentReport> {
    let layout = &settings.layout;
    let name = text(row, NAME_COLUMN);
    let display = display_name(&name);
    let total_cell = cell(row, layout.total_column);

    let mut mark_cells: Vec<RawCell> = layout
        .subject_columns()
        .map(|col| cell(row, col).clone())
        .collect();
    mark_cells.push(total_cell.clone());
    let remarks = classify_subjects_with(&layout.comment_rules(), &mark_cells)?;

    let mut subject_marks = SubjectMarkMap::new();
    for (label, raw) in ctx.subject_labels.iter().zip(&mark_cells) {
        subject_marks.insert(label.clone(), normalize(raw)?);
    }
    let total = normalize(total_cell)?.value() as f64;
    let overall_comment =
        overall_comment_with(settings.overall_scale, &subject_marks, total, &display)?;

    let labels_iter = ctx
        .subject_labels
        .iter()
        .chain(std::iter::once(&ctx.total_label));
    let subjects = labels_iter
        .zip(&mark_cells)
        .zip(&ctx.averages_display)
        .zip(remarks)
        .map(|(((label, raw), avg), remark)| SubjectLine {
            label: label.clone(),
            mark: format_mark(raw),
            class_average: avg.clone(),
            remark,
        })
        .collect();

    let mut student_series: Vec<f64> = mark_cells[..layout.subject_count]
        .iter()
        .map(|raw| format_mark(raw) as f64)
        .collect();
    student_series.push(format_mark(total_cell) as f64 / layout.total_divisor);

    let mut labels: Vec<String> = ctx
        .subject_labels
        .iter()
        .map(|l| l.chars().take(3).collect::<String>().to_uppercase())
        .collect();
    labels.push(TOTAL_CHART_LABEL.to_string());

    let mut class_series = ctx.subject_averages.clone();
    class_series.push(ctx.class_mean);

    Ok(StudentReport {
        row: row_no,
        student_id: format_student_id(cell(row, ID_COLUMN)),
        short_name: abbreviate_name(&name, settings.name_max_length),
        gender: text(row, GENDER_COLUMN),
        position: format_position(cell(row, layout.position_column), ctx.student_count),
        subjects,
        overall_comment,
        chart: ChartData {
            title: format!("{}'s Marks vs Class Averages", first_name(&name)),
            labels,
            student: student_series,
            class_averages: class_series,
        },
        display_name: display,
        name,
    })
}

/// Build every student's page model. Any failing row rejects the batch.
pub fn build_class_report(sheet: &ClassSheet, settings: &Settings) -> Result<ClassReport> {
    if sheet.rows.len() < 3 {
        return Err(ReportError::BadSheet(format!(
            "expected a header row, student rows and two summary rows, got {} rows",
            sheet.rows.len()
        )));
    }

    let student_rows: Vec<(usize, &Vec<RawCell>)> = sheet.rows[1..sheet.rows.len() - 2]
        .iter()
        .enumerate()
        .map(|(i, r)| (i + 2, r))
        .filter(|(_, r)| !r.iter().all(RawCell::is_blank))
        .collect();

    let mut ctx = class_context(sheet, settings)?;
    ctx.student_count = student_rows.len();

    let mut students = Vec::with_capacity(student_rows.len());
    for (row_no, row) in student_rows {
        match build_student(row_no, row, &ctx, settings) {
            Ok(s) => students.push(s),
            Err(e) => {
                let who = text(row, NAME_COLUMN);
                tracing::warn!(row = row_no, student = %who, error = %e, "rejecting class batch");
                return Err(e.in_row(row_no, who));
            }
        }
    }
    tracing::debug!(students = students.len(), "built class report");

    let head_teacher_remarks = sheet
        .rows
        .last()
        .map(|r| text(r, 0))
        .unwrap_or_default();

    Ok(ClassReport {
        school_name: sheet.school_name.clone(),
        class_name: sheet.class_name.clone(),
        term_name: sheet.term_name.clone(),
        student_count: ctx.student_count,
        class_averages: ctx
            .subject_labels
            .iter()
            .chain(std::iter::once(&ctx.total_label))
            .zip(&ctx.averages_display)
            .map(|(label, average)| SubjectAverage {
                label: label.clone(),
                average: average.clone(),
            })
            .collect(),
        class_mean: format!("{:.2}", ctx.class_mean),
        head_teacher_remarks,
        students,
    })
}
