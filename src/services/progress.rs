use sqlx::SqlitePool;
use tracing::info;

use crate::db::{participants, webinars};
use crate::error::AppError;
use crate::models::{CompletionStatus, Participant, Webinar};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressStep {
    pub current_day: i64,
    pub status: CompletionStatus,
    /// True only on the transition into `Completed`.
    pub completed: bool,
}

#[derive(Debug, Clone)]
pub enum AdvanceOutcome {
    Advanced {
        participant: Participant,
        webinar: Webinar,
        completed: bool,
    },
    NotAdvanced,
}

/// Next state after `day_completed` is reported, or `None` when the report
/// is behind the current pointer or the participant has already finished.
pub fn next_step(participant: &Participant, duration_days: i64, day_completed: i64) -> Option<ProgressStep> {
    if participant.completion_status == CompletionStatus::Completed {
        return None;
    }
    if day_completed < participant.current_day {
        return None;
    }

    let next_day = day_completed.saturating_add(1);
    if next_day > duration_days {
        Some(ProgressStep {
            current_day: duration_days,
            status: CompletionStatus::Completed,
            completed: true,
        })
    } else {
        Some(ProgressStep {
            current_day: next_day,
            status: CompletionStatus::InProgress,
            completed: false,
        })
    }
}

pub async fn advance(
    db: &SqlitePool,
    participant_id: i64,
    day_completed: i64,
) -> Result<AdvanceOutcome, AppError> {
    let mut tx = db.begin().await?;

    let mut participant = participants::find_participant(&mut *tx, participant_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Participant with ID {} not found", participant_id)))?;
    let webinar = webinars::find_webinar(&mut *tx, participant.webinar_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Webinar with ID {} not found", participant.webinar_id))
        })?;

    let Some(step) = next_step(&participant, webinar.duration_days, day_completed) else {
        info!(
            "progress for participant {} not advanced (day_completed={}, current_day={}, status={})",
            participant_id, day_completed, participant.current_day, participant.completion_status
        );
        return Ok(AdvanceOutcome::NotAdvanced);
    };

    participants::update_progress(&mut *tx, participant_id, step.current_day, step.status).await?;
    tx.commit().await?;

    participant.current_day = step.current_day;
    participant.completion_status = step.status;

    info!(
        "updated progress for participant {} to day {} ({})",
        participant_id, step.current_day, step.status
    );

    Ok(AdvanceOutcome::Advanced {
        participant,
        webinar,
        completed: step.completed,
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::db::setup_test_db;
    use crate::models::NewWebinar;

    fn participant(current_day: i64, status: CompletionStatus) -> Participant {
        let now = Utc::now();
        Participant {
            id: 1,
            user_id: 1,
            webinar_id: 1,
            enrollment_date: now,
            completion_status: status,
            current_day,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_step_moves_pointer_past_completed_day() {
        let step = next_step(&participant(1, CompletionStatus::Enrolled), 10, 1).unwrap();
        assert_eq!(step.current_day, 2);
        assert_eq!(step.status, CompletionStatus::InProgress);
        assert!(!step.completed);
    }

    #[test]
    fn test_step_behind_pointer_is_rejected() {
        let p = participant(5, CompletionStatus::InProgress);
        assert!(next_step(&p, 10, 4).is_none());
        assert!(next_step(&p, 10, 2).is_none());
        assert!(next_step(&p, 10, 5).is_some());
    }

    #[test]
    fn test_step_past_end_clamps_and_completes() {
        let step = next_step(&participant(3, CompletionStatus::InProgress), 10, 9).unwrap();
        assert_eq!(step.current_day, 10);
        assert_eq!(step.status, CompletionStatus::Completed);
        assert!(step.completed);

        let step = next_step(&participant(3, CompletionStatus::InProgress), 10, 25).unwrap();
        assert_eq!(step.current_day, 10);
    }

    #[test]
    fn test_step_with_huge_day_still_clamps() {
        let step = next_step(&participant(3, CompletionStatus::InProgress), 10, i64::MAX).unwrap();
        assert_eq!(step.current_day, 10);
        assert_eq!(step.status, CompletionStatus::Completed);
        assert!(step.completed);
    }

    #[test]
    fn test_completed_participant_is_terminal() {
        assert!(next_step(&participant(10, CompletionStatus::Completed), 10, 10).is_none());
        assert!(next_step(&participant(10, CompletionStatus::Completed), 10, 12).is_none());
    }

    async fn enrolled(pool: &SqlitePool, duration_days: i64) -> i64 {
        let webinar = webinars::insert_webinar(
            pool,
            &NewWebinar {
                title: "10-Day Anti-Stress Journey".to_string(),
                description: None,
                duration_days,
                start_date: None,
                end_date: None,
            },
        )
        .await
        .unwrap();
        participants::insert_participant_if_absent(pool, 42, webinar.id, Utc::now())
            .await
            .unwrap()
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_advance_persists_step() {
        let pool = setup_test_db().await;
        let id = enrolled(&pool, 10).await;

        let outcome = advance(&pool, id, 1).await.unwrap();
        assert!(matches!(outcome, AdvanceOutcome::Advanced { completed: false, .. }));

        let stored = participants::find_participant(&pool, id).await.unwrap().unwrap();
        assert_eq!(stored.current_day, 2);
        assert_eq!(stored.completion_status, CompletionStatus::InProgress);
    }

    #[tokio::test]
    async fn test_advance_completes_exactly_once() {
        let pool = setup_test_db().await;
        let id = enrolled(&pool, 10).await;

        participants::update_progress(&pool, id, 3, CompletionStatus::InProgress)
            .await
            .unwrap();

        match advance(&pool, id, 9).await.unwrap() {
            AdvanceOutcome::Advanced { participant, completed, .. } => {
                assert!(completed);
                assert_eq!(participant.current_day, 10);
                assert_eq!(participant.completion_status, CompletionStatus::Completed);
            }
            AdvanceOutcome::NotAdvanced => panic!("expected progress to advance"),
        }

        let again = advance(&pool, id, 10).await.unwrap();
        assert!(matches!(again, AdvanceOutcome::NotAdvanced));

        let stored = participants::find_participant(&pool, id).await.unwrap().unwrap();
        assert_eq!(stored.current_day, 10);
        assert_eq!(stored.completion_status, CompletionStatus::Completed);
    }

    #[tokio::test]
    async fn test_advance_behind_pointer_leaves_state() {
        let pool = setup_test_db().await;
        let id = enrolled(&pool, 10).await;
        participants::update_progress(&pool, id, 6, CompletionStatus::InProgress)
            .await
            .unwrap();
        let before = participants::find_participant(&pool, id).await.unwrap().unwrap();

        let outcome = advance(&pool, id, 3).await.unwrap();
        assert!(matches!(outcome, AdvanceOutcome::NotAdvanced));

        let after = participants::find_participant(&pool, id).await.unwrap().unwrap();
        assert_eq!(after.current_day, before.current_day);
        assert_eq!(after.updated_at, before.updated_at);
    }

    #[tokio::test]
    async fn test_advance_unknown_participant() {
        let pool = setup_test_db().await;
        let err = advance(&pool, 77, 1).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
