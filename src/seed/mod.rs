//! One-time population of the anti-stress webinar and the content block
//! library derived from it. Both halves are skipped when already present, so
//! running the seeder again is harmless.

use chrono::{TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sqlx::SqlitePool;
use tracing::{error, info};

use crate::db::{content_blocks, webinars};
use crate::error::AppError;
use crate::models::{ContentBlockRequest, NewVisualTest, NewWebinar, NewWebinarDay};

const WEBINAR_SEED: &str = include_str!("../../seed/webinar.json");
const BLOCKS_SEED: &str = include_str!("../../seed/content_blocks.json");

/// Keys of a day's morning section copied into its content block.
const BLOCK_FIELDS: [&str; 4] = ["affirmation", "nutrition_fact", "exercise", "questions"];

#[derive(Debug, Deserialize)]
struct WebinarSeed {
    title: String,
    description: String,
    duration_days: i64,
    days: Vec<DaySeed>,
}

#[derive(Debug, Deserialize)]
struct DaySeed {
    day_number: i64,
    title: String,
    content: Value,
    questions: Vec<String>,
    visual_test: VisualTestSeed,
}

#[derive(Debug, Deserialize)]
struct VisualTestSeed {
    image_description: String,
    question: String,
    options: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct BlocksSeed {
    from_days: Vec<DayBlockSeed>,
    standalone: Vec<ContentBlockRequest>,
}

#[derive(Debug, Deserialize)]
struct DayBlockSeed {
    day_number: i64,
    category: String,
    description: String,
    content_type: String,
}

#[derive(Debug, Serialize)]
pub struct PopulateReport {
    pub status: &'static str,
    pub message: String,
    pub webinar_id: i64,
    pub webinar_created: bool,
    pub days_created: usize,
    pub visual_tests_created: usize,
    pub content_blocks_created: usize,
}

fn parse_seed<'a, T: Deserialize<'a>>(name: &str, raw: &'a str) -> Result<T, AppError> {
    serde_json::from_str(raw).map_err(|e| {
        error!("invalid {} seed: {}", name, e);
        AppError::InternalServerError
    })
}

/// Seed days are bundled data; one outside the webinar is a broken seed file.
fn check_day_number(day_number: i64, duration_days: i64) -> Result<(), AppError> {
    if day_number < 1 || day_number > duration_days {
        error!(
            "invalid webinar seed: day_number {} outside 1..={}",
            day_number, duration_days
        );
        return Err(AppError::InternalServerError);
    }
    Ok(())
}

fn block_from_day(day: &DaySeed, meta: &DayBlockSeed) -> ContentBlockRequest {
    let morning = day.content.get("morning");
    let content_data: serde_json::Map<String, Value> = BLOCK_FIELDS
        .iter()
        .filter_map(|key| {
            morning
                .and_then(|m| m.get(*key))
                .map(|v| (key.to_string(), v.clone()))
        })
        .collect();

    ContentBlockRequest {
        name: day.title.clone(),
        category: meta.category.clone(),
        description: Some(meta.description.clone()),
        content_type: meta.content_type.clone(),
        content_data: Value::Object(content_data),
        is_active: true,
    }
}

pub async fn populate(db: &SqlitePool) -> Result<PopulateReport, AppError> {
    let seed: WebinarSeed = parse_seed("webinar", WEBINAR_SEED)?;
    let blocks: BlocksSeed = parse_seed("content block", BLOCKS_SEED)?;

    let mut tx = db.begin().await?;

    let mut days_created = 0;
    let mut visual_tests_created = 0;

    let (webinar_id, webinar_created) =
        match webinars::find_webinar_by_title(&mut *tx, &seed.title).await? {
            Some(existing) => {
                info!("webinar '{}' already exists, skipping", existing.title);
                (existing.id, false)
            }
            None => {
                let start = Utc::now();
                let webinar = webinars::insert_webinar(
                    &mut *tx,
                    &NewWebinar {
                        title: seed.title.clone(),
                        description: Some(seed.description.clone()),
                        duration_days: seed.duration_days,
                        start_date: Some(start),
                        end_date: Some(start + TimeDelta::days(seed.duration_days)),
                    },
                )
                .await?;

                for day in &seed.days {
                    check_day_number(day.day_number, webinar.duration_days)?;

                    let visual = &day.visual_test;
                    let stored = webinars::insert_webinar_day(
                        &mut *tx,
                        webinar.id,
                        &NewWebinarDay {
                            day_number: day.day_number,
                            title: day.title.clone(),
                            content: day.content.clone(),
                            questions: day.questions.clone(),
                            visual_test_data: Some(json!({
                                "image_description": visual.image_description,
                                "question": visual.question,
                                "options": visual.options,
                            })),
                        },
                    )
                    .await?;
                    days_created += 1;

                    webinars::insert_visual_test(
                        &mut *tx,
                        stored.id,
                        &NewVisualTest {
                            image_url: None,
                            options: visual.options.clone(),
                            correct_answer: None,
                        },
                    )
                    .await?;
                    visual_tests_created += 1;
                }

                info!("created webinar '{}' with {} days", webinar.title, days_created);
                (webinar.id, true)
            }
        };

    let mut content_blocks_created = 0;
    if content_blocks::count_content_blocks(&mut *tx).await? == 0 {
        for meta in &blocks.from_days {
            let Some(day) = seed.days.iter().find(|d| d.day_number == meta.day_number) else {
                continue;
            };
            content_blocks::insert_content_block(&mut *tx, &block_from_day(day, meta)).await?;
            content_blocks_created += 1;
        }
        for block in &blocks.standalone {
            content_blocks::insert_content_block(&mut *tx, block).await?;
            content_blocks_created += 1;
        }
        info!("created {} content blocks", content_blocks_created);
    } else {
        info!("content blocks already exist, skipping conversion");
    }

    tx.commit().await?;

    let message = if webinar_created || content_blocks_created > 0 {
        "Database populated successfully".to_string()
    } else {
        "Database already populated".to_string()
    };

    Ok(PopulateReport {
        status: "success",
        message,
        webinar_id,
        webinar_created,
        days_created,
        visual_tests_created,
        content_blocks_created,
    })
}
