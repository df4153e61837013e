use serde::Serialize;
use sqlx::SqlitePool;
use tracing::info;

use crate::db::courses;
use crate::error::AppError;
use crate::models::{CourseBlock, Frequency};

/// One row of a planned schedule before it is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedEntry {
    pub day_number: i64,
    pub content_block_id: i64,
}

#[derive(Debug, Serialize)]
pub struct ScheduleBuildResult {
    pub status: &'static str,
    pub message: String,
    pub course_id: i64,
    pub days: i64,
    pub entries: usize,
}

/// Walks days `1..=duration_days` and, for each day, every assignment in the
/// given order. Unknown frequencies never produce an entry.
pub fn plan_schedule(duration_days: i64, assignments: &[CourseBlock]) -> Vec<PlannedEntry> {
    let parsed: Vec<(Option<Frequency>, i64)> = assignments
        .iter()
        .map(|a| (Frequency::parse(&a.frequency), a.content_block_id))
        .collect();

    (1..=duration_days)
        .flat_map(|day| {
            parsed.iter().filter_map(move |(frequency, block_id)| match frequency {
                Some(f) if f.includes(day) => Some(PlannedEntry {
                    day_number: day,
                    content_block_id: *block_id,
                }),
                _ => None,
            })
        })
        .collect()
}

/// Replaces the stored schedule of a course with a freshly planned one.
///
/// The delete and every insert share one transaction; an error on any
/// statement drops the transaction and the previous rows survive.
pub async fn rebuild_schedule(db: &SqlitePool, course_id: i64) -> Result<ScheduleBuildResult, AppError> {
    let mut tx = db.begin().await?;

    let course = courses::find_course(&mut *tx, course_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;
    let assignments = courses::fetch_course_blocks(&mut *tx, course_id).await?;

    let plan = plan_schedule(course.duration_days, &assignments);

    let removed = courses::delete_schedule(&mut *tx, course_id).await?;
    for entry in &plan {
        courses::insert_schedule_entry(&mut *tx, course_id, entry.day_number, entry.content_block_id)
            .await?;
    }

    tx.commit().await?;

    info!(
        "rebuilt schedule for course {}: {} entries over {} days ({} replaced)",
        course_id,
        plan.len(),
        course.duration_days,
        removed
    );

    Ok(ScheduleBuildResult {
        status: "success",
        message: format!("Course schedule built for {} days", course.duration_days),
        course_id,
        days: course.duration_days,
        entries: plan.len(),
    })
}
