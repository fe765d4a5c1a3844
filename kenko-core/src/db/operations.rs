//! Read-only lookups against the log store. The logging subsystem owns all
//! writes to these tables; nothing here mutates them.

use anyhow::Result;
use sqlx::SqlitePool;

use crate::db::models::{Exercise, MuscleGroup, SetRecord, User, WorkoutSession};

pub async fn get_all_exercises(pool: &SqlitePool) -> Result<Vec<Exercise>> {
    sqlx::query_as::<_, Exercise>("SELECT * FROM exercises ORDER BY name")
        .fetch_all(pool)
        .await
        .map_err(Into::into)
}

pub async fn find_exercise_by_name(pool: &SqlitePool, name: &str) -> Result<Option<Exercise>> {
    sqlx::query_as::<_, Exercise>("SELECT * FROM exercises WHERE name = ?1 COLLATE NOCASE")
        .bind(name)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
}

pub async fn get_all_muscle_groups(pool: &SqlitePool) -> Result<Vec<MuscleGroup>> {
    sqlx::query_as::<_, MuscleGroup>("SELECT * FROM muscle_groups ORDER BY name")
        .fetch_all(pool)
        .await
        .map_err(Into::into)
}

pub async fn find_muscle_group_by_name(
    pool: &SqlitePool,
    name: &str,
) -> Result<Option<MuscleGroup>> {
    sqlx::query_as::<_, MuscleGroup>("SELECT * FROM muscle_groups WHERE name = ?1 COLLATE NOCASE")
        .bind(name)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
}

pub async fn find_user_by_username(pool: &SqlitePool, username: &str) -> Result<Option<User>> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?1")
        .bind(username)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
}

/// All of a user's sessions, oldest first.
pub async fn get_sessions_for_user(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<Vec<WorkoutSession>> {
    sqlx::query_as::<_, WorkoutSession>(
        "SELECT * FROM workout_sessions WHERE user_id = ?1 ORDER BY date, id",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .map_err(Into::into)
}

/// Every set logged in one session, in logged order.
pub async fn get_sets_for_session(pool: &SqlitePool, session_id: i64) -> Result<Vec<SetRecord>> {
    sqlx::query_as::<_, SetRecord>(
        "SELECT sr.* FROM set_records sr \
         JOIN logged_exercises le ON le.id = sr.logged_exercise_id \
         WHERE le.session_id = ?1 ORDER BY le.id, sr.set_index",
    )
    .bind(session_id)
    .fetch_all(pool)
    .await
    .map_err(Into::into)
}

pub async fn count_set_records_for_user(pool: &SqlitePool, user_id: i64) -> Result<i64> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(sr.id) FROM set_records sr \
         JOIN logged_exercises le ON le.id = sr.logged_exercise_id \
         JOIN workout_sessions ws ON ws.id = le.session_id \
         WHERE ws.user_id = ?1",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await
    .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        db::init_database(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn exercise_lookup_is_case_insensitive() {
        let pool = test_pool().await;
        sqlx::query("INSERT INTO exercises (name) VALUES ('Bench Press')")
            .execute(&pool)
            .await
            .unwrap();

        let found = find_exercise_by_name(&pool, "bench press").await.unwrap();
        assert_eq!(found.map(|e| e.name), Some("Bench Press".to_string()));

        let missing = find_exercise_by_name(&pool, "Leg Press").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn sessions_for_user_are_ordered_and_scoped() {
        let pool = test_pool().await;
        let a: i64 = sqlx::query_scalar("INSERT INTO users (username) VALUES ('a') RETURNING id")
            .fetch_one(&pool)
            .await
            .unwrap();
        let b: i64 = sqlx::query_scalar("INSERT INTO users (username) VALUES ('b') RETURNING id")
            .fetch_one(&pool)
            .await
            .unwrap();
        for (user, date) in [(a, "2024-02-01"), (a, "2024-01-15"), (b, "2024-01-20")] {
            sqlx::query("INSERT INTO workout_sessions (user_id, date) VALUES (?1, ?2)")
                .bind(user)
                .bind(date)
                .execute(&pool)
                .await
                .unwrap();
        }

        let sessions = get_sessions_for_user(&pool, a).await.unwrap();
        let dates: Vec<&str> = sessions.iter().map(|s| s.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-01-15", "2024-02-01"]);

        assert_eq!(count_set_records_for_user(&pool, a).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn sets_for_session_come_back_in_logged_order() {
        let pool = test_pool().await;
        let user: i64 = sqlx::query_scalar("INSERT INTO users (username) VALUES ('a') RETURNING id")
            .fetch_one(&pool)
            .await
            .unwrap();
        let session: i64 = sqlx::query_scalar(
            "INSERT INTO workout_sessions (user_id, date) VALUES (?1, '2024-01-01') RETURNING id",
        )
        .bind(user)
        .fetch_one(&pool)
        .await
        .unwrap();
        let exercise: i64 =
            sqlx::query_scalar("INSERT INTO exercises (name) VALUES ('Squat') RETURNING id")
                .fetch_one(&pool)
                .await
                .unwrap();
        let logged: i64 = sqlx::query_scalar(
            "INSERT INTO logged_exercises (session_id, exercise_id) VALUES (?1, ?2) RETURNING id",
        )
        .bind(session)
        .bind(exercise)
        .fetch_one(&pool)
        .await
        .unwrap();
        for (set_index, weight) in [(2, 82.5), (1, 80.0)] {
            sqlx::query(
                "INSERT INTO set_records (logged_exercise_id, set_index, reps, weight) \
                 VALUES (?1, ?2, 5, ?3)",
            )
            .bind(logged)
            .bind(set_index)
            .bind(weight)
            .execute(&pool)
            .await
            .unwrap();
        }

        let sets = get_sets_for_session(&pool, session).await.unwrap();
        let weights: Vec<f64> = sets.iter().map(|s| s.weight).collect();
        assert_eq!(weights, vec![80.0, 82.5]);
        assert_eq!(count_set_records_for_user(&pool, user).await.unwrap(), 2);
    }
}
