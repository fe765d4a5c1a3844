//! Demo data seeder. Stands in for the external logging subsystem: this is
//! the only write path to the log store anywhere in this workspace.

use anyhow::Result;
use chrono::{Days, Local};
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sqlx::SqlitePool;
use std::collections::HashMap;

use kenko::db;
use kenko::db::operations;

const SEED: u64 = 42;

// (name, working weight in kg, muscle group tags)
const EXERCISES: &[(&str, f64, &[&str])] = &[
    ("Bench Press", 60.0, &["Chest", "Triceps"]),
    ("Overhead Press", 40.0, &["Shoulders", "Triceps"]),
    ("Squat", 80.0, &["Quads", "Glutes"]),
    ("Deadlift", 100.0, &["Back", "Hamstrings"]),
    ("Barbell Row", 60.0, &["Back", "Biceps"]),
    ("Pull Up", 0.0, &["Back", "Biceps"]),
];

const SPLIT: &[(&str, &[&str])] = &[
    ("Push Day", &["Bench Press", "Overhead Press"]),
    ("Pull Day", &["Deadlift", "Barbell Row", "Pull Up"]),
    ("Leg Day", &["Squat"]),
];

const SETS_PER_EXERCISE: i64 = 3;

pub async fn run(pool: &SqlitePool, username: &str, reset: bool, weeks: u32) -> Result<()> {
    if reset {
        info!("Clearing all tables before seeding");
        db::clear_all_tables(pool).await?;
    }

    if let Some(user) = operations::find_user_by_username(pool, username).await? {
        if operations::count_set_records_for_user(pool, user.id).await? > 0 {
            anyhow::bail!(
                "User '{}' already has logged data; rerun with --reset to start over",
                username
            );
        }
    }

    let user_id = get_or_create_user(pool, username).await?;
    let exercise_ids = seed_catalog(pool).await?;

    let mut rng = StdRng::seed_from_u64(SEED);
    let today = Local::now().date_naive();
    let mut session_count = 0u32;

    for week in 0..weeks {
        for (day, (session_name, exercise_names)) in SPLIT.iter().enumerate() {
            let offset = u64::from(week) * 7 + day as u64 * 2;
            let Some(date) = today.checked_sub_days(Days::new(offset)) else {
                continue;
            };

            let session_id: i64 = sqlx::query_scalar(
                "INSERT INTO workout_sessions (user_id, name, date) VALUES (?1, ?2, ?3) RETURNING id",
            )
            .bind(user_id)
            .bind(session_name)
            .bind(date.format("%Y-%m-%d").to_string())
            .fetch_one(pool)
            .await?;
            session_count += 1;

            for name in *exercise_names {
                let &(exercise_id, base_weight) = exercise_ids
                    .get(name)
                    .ok_or_else(|| anyhow::anyhow!("Exercise '{}' missing from catalog", name))?;

                let logged_id: i64 = sqlx::query_scalar(
                    "INSERT INTO logged_exercises (session_id, exercise_id) \
                     VALUES (?1, ?2) RETURNING id",
                )
                .bind(session_id)
                .bind(exercise_id)
                .fetch_one(pool)
                .await?;

                for set_index in 1..=SETS_PER_EXERCISE {
                    let reps: i64 = rng.random_range(5..=10);
                    let weight = working_weight(&mut rng, base_weight, weeks - week);
                    sqlx::query(
                        "INSERT INTO set_records (logged_exercise_id, set_index, reps, weight) \
                         VALUES (?1, ?2, ?3, ?4)",
                    )
                    .bind(logged_id)
                    .bind(set_index)
                    .bind(reps)
                    .bind(weight)
                    .execute(pool)
                    .await?;
                }
            }
        }
    }

    info!(
        "Seeded {} sessions over {} weeks for user '{}' (id {})",
        session_count, weeks, username, user_id
    );
    println!(
        "Seeded {} sessions for user '{}' (id {})",
        session_count, username, user_id
    );
    Ok(())
}

/// Slow linear progression plus plate-sized jitter; bodyweight movements
/// stay at zero.
fn working_weight(rng: &mut StdRng, base: f64, weeks_trained: u32) -> f64 {
    if base == 0.0 {
        return 0.0;
    }
    let progressed = base + f64::from(weeks_trained) * 0.5;
    let jitter = rng.random_range(-2.5..=2.5);
    ((progressed + jitter) / 2.5).round() * 2.5
}

async fn get_or_create_user(pool: &SqlitePool, username: &str) -> Result<i64> {
    if let Some(user) = operations::find_user_by_username(pool, username).await? {
        return Ok(user.id);
    }
    sqlx::query_scalar("INSERT INTO users (username) VALUES (?1) RETURNING id")
        .bind(username)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
}

/// Insert the exercise and muscle group catalog, reusing rows that already
/// exist. Returns exercise name -> (id, base weight).
async fn seed_catalog(pool: &SqlitePool) -> Result<HashMap<&'static str, (i64, f64)>> {
    let mut muscle_ids: HashMap<&str, i64> = HashMap::new();
    for (_, _, muscles) in EXERCISES {
        for muscle in *muscles {
            if muscle_ids.contains_key(muscle) {
                continue;
            }
            let id = match operations::find_muscle_group_by_name(pool, muscle).await? {
                Some(found) => found.id,
                None => {
                    sqlx::query_scalar("INSERT INTO muscle_groups (name) VALUES (?1) RETURNING id")
                        .bind(muscle)
                        .fetch_one(pool)
                        .await?
                }
            };
            muscle_ids.insert(muscle, id);
        }
    }

    let mut exercise_ids = HashMap::new();
    for (name, base_weight, muscles) in EXERCISES {
        let id = match operations::find_exercise_by_name(pool, name).await? {
            Some(found) => found.id,
            None => {
                let id: i64 =
                    sqlx::query_scalar("INSERT INTO exercises (name) VALUES (?1) RETURNING id")
                        .bind(name)
                        .fetch_one(pool)
                        .await?;
                for muscle in *muscles {
                    sqlx::query(
                        "INSERT INTO exercise_muscle_groups (exercise_id, muscle_group_id) \
                         VALUES (?1, ?2)",
                    )
                    .bind(id)
                    .bind(muscle_ids[muscle])
                    .execute(pool)
                    .await?;
                }
                id
            }
        };
        exercise_ids.insert(*name, (id, *base_weight));
    }

    Ok(exercise_ids)
}
