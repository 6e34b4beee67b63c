use std::collections::HashSet;

use anyhow::Context;
use chrono::{Duration, NaiveDate};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};
use uuid::Uuid;

use crate::models::{AwardedBadge, LogEntry, Profile, RawLogEntry};

const PROFILE_COLUMNS: &str = "user_id, email, full_name, is_pro, email_reminders_enabled, \
     reminder_time, reminder_days, timezone";

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

async fn upsert_profile(
    tx: &mut Transaction<'_, Postgres>,
    email: &str,
    full_name: Option<&str>,
) -> anyhow::Result<Uuid> {
    let user_id: Uuid = sqlx::query(
        r#"
        INSERT INTO claim_compass.profiles (user_id, email, full_name)
        VALUES ($1, $2, $3)
        ON CONFLICT (email) DO UPDATE
        SET full_name = COALESCE(EXCLUDED.full_name, claim_compass.profiles.full_name)
        RETURNING user_id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(full_name)
    .fetch_one(&mut **tx)
    .await?
    .get("user_id");

    Ok(user_id)
}

async fn insert_log(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    entry: &LogEntry,
    source_key: &str,
) -> anyhow::Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO claim_compass.symptom_logs
        (id, user_id, condition, severity, affected_work, notes, logged_at, source_key)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (source_key) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(entry.condition.trim())
    .bind(entry.severity)
    .bind(entry.affected_work)
    .bind(entry.note_text())
    .bind(entry.logged_date)
    .bind(source_key)
    .execute(&mut **tx)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let mut tx = pool.begin().await?;
    let user_id = upsert_profile(&mut tx, "jane.doe@example.com", Some("Jane Doe")).await?;

    sqlx::query(
        r#"
        UPDATE claim_compass.profiles
        SET is_pro = TRUE, email_reminders_enabled = TRUE,
            reminder_time = '18:00', reminder_days = 'weekdays'
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    let start = NaiveDate::from_ymd_opt(2026, 1, 5).context("invalid date")?;
    let pattern = [
        ("Migraines", 6, true, Some("Had to leave work early, light sensitivity")),
        ("Migraines", 4, false, None),
        ("Lower back pain", 7, true, Some("Could not lift my kid; missed a shift")),
        ("Tinnitus", 5, false, Some("Ringing kept me awake past 2am")),
        ("Migraines", 8, true, Some("Vomiting, stayed in a dark room all day")),
        ("Lower back pain", 5, false, None),
        ("Tinnitus", 3, false, None),
    ];

    for day in 0..14 {
        let (condition, severity, affected_work, notes) = pattern[day % pattern.len()];
        let entry = LogEntry {
            logged_date: start + Duration::days(day as i64),
            condition: condition.to_string(),
            severity,
            affected_work,
            notes: notes.map(str::to_string),
        };
        insert_log(&mut tx, user_id, &entry, &format!("seed-{:03}", day + 1)).await?;
    }

    tx.commit().await?;
    tracing::info!(%user_id, "seeded demo profile");
    Ok(())
}

/// Imports symptom logs from CSV. Every row is validated before anything is
/// written; a malformed row aborts the import with no rows inserted.
pub async fn import_csv(pool: &PgPool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        email: String,
        full_name: Option<String>,
        condition: String,
        severity: i32,
        affected_work: bool,
        notes: Option<String>,
        logged_at: String,
        source_key: Option<String>,
    }

    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let mut rows = Vec::new();

    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        let line = index + 2;
        let row = result.with_context(|| format!("row {line}: unreadable"))?;
        let entry = LogEntry::try_from(RawLogEntry {
            logged_at: row.logged_at,
            condition: row.condition,
            severity: row.severity,
            affected_work: row.affected_work,
            notes: row.notes,
        })
        .with_context(|| format!("row {line}: invalid entry"))?;
        rows.push((row.email, row.full_name, entry, row.source_key));
    }

    let mut tx = pool.begin().await?;
    let mut inserted = 0usize;

    for (email, full_name, entry, source_key) in rows {
        let user_id = upsert_profile(&mut tx, &email, full_name.as_deref()).await?;
        let source_key = source_key.unwrap_or_else(|| format!("import-{}", Uuid::new_v4()));
        if insert_log(&mut tx, user_id, &entry, &source_key).await? {
            inserted += 1;
        }
    }

    tx.commit().await?;
    tracing::info!(inserted, path = %csv_path.display(), "imported symptom logs");
    Ok(inserted)
}

fn profile_from_row(row: &PgRow) -> Profile {
    Profile {
        user_id: row.get("user_id"),
        email: row.get("email"),
        full_name: row.get("full_name"),
        is_pro: row.get("is_pro"),
        email_reminders_enabled: row.get("email_reminders_enabled"),
        reminder_time: row.get("reminder_time"),
        reminder_days: row.get("reminder_days"),
        timezone: row.get("timezone"),
    }
}

pub async fn fetch_profile(pool: &PgPool, email: &str) -> anyhow::Result<Profile> {
    let query = format!("SELECT {PROFILE_COLUMNS} FROM claim_compass.profiles WHERE email = $1");
    let row = sqlx::query(&query)
        .bind(email)
        .fetch_optional(pool)
        .await?
        .with_context(|| format!("no profile found for {email}"))?;

    Ok(profile_from_row(&row))
}

pub async fn fetch_reminder_profiles(pool: &PgPool) -> anyhow::Result<Vec<Profile>> {
    let query = format!(
        "SELECT {PROFILE_COLUMNS} FROM claim_compass.profiles WHERE email_reminders_enabled"
    );
    let rows = sqlx::query(&query).fetch_all(pool).await?;
    Ok(rows.iter().map(profile_from_row).collect())
}

/// Entries logged inside `[start, end]`, newest first as the log page lists them.
pub async fn fetch_log_entries(
    pool: &PgPool,
    user_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
) -> anyhow::Result<Vec<LogEntry>> {
    let rows = sqlx::query(
        r#"
        SELECT condition, severity, affected_work, notes, logged_at
        FROM claim_compass.symptom_logs
        WHERE user_id = $1 AND logged_at >= $2 AND logged_at <= $3
        ORDER BY logged_at DESC, created_at DESC
        "#,
    )
    .bind(user_id)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    let entries: Vec<LogEntry> = rows
        .into_iter()
        .map(|row| LogEntry {
            logged_date: row.get("logged_at"),
            condition: row.get("condition"),
            severity: row.get("severity"),
            affected_work: row.get("affected_work"),
            notes: row.get("notes"),
        })
        .collect();

    tracing::debug!(%user_id, count = entries.len(), "fetched log entries");
    Ok(entries)
}

/// Every log date for a user, oldest first, paired with whether it carries notes.
pub async fn fetch_badge_activity(
    pool: &PgPool,
    user_id: Uuid,
) -> anyhow::Result<(Vec<NaiveDate>, Vec<bool>)> {
    let rows = sqlx::query(
        r#"
        SELECT logged_at, COALESCE(btrim(notes), '') <> '' AS has_notes
        FROM claim_compass.symptom_logs
        WHERE user_id = $1
        ORDER BY logged_at ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let date: NaiveDate = row.get("logged_at");
            let has_notes: bool = row.get("has_notes");
            (date, has_notes)
        })
        .unzip())
}

pub async fn fetch_awarded_ids(pool: &PgPool, user_id: Uuid) -> anyhow::Result<HashSet<String>> {
    let rows = sqlx::query("SELECT badge_id FROM claim_compass.user_badges WHERE user_id = $1")
        .bind(user_id)
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(|row| row.get("badge_id")).collect())
}

pub async fn fetch_awarded(pool: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<AwardedBadge>> {
    let rows = sqlx::query(
        r#"
        SELECT badge_id, badge_name, badge_description, badge_icon, earned_at
        FROM claim_compass.user_badges
        WHERE user_id = $1
        ORDER BY earned_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| AwardedBadge {
            badge_id: row.get("badge_id"),
            badge_name: row.get("badge_name"),
            badge_description: row.get("badge_description"),
            badge_icon: row.get("badge_icon"),
            earned_at: row.get("earned_at"),
        })
        .collect())
}

/// Persists awards, ignoring any the user already holds. Returns the badges
/// that were actually written, which can be fewer than requested when
/// another evaluation raced this one.
pub async fn insert_awards(
    pool: &PgPool,
    user_id: Uuid,
    awards: &[AwardedBadge],
) -> anyhow::Result<Vec<AwardedBadge>> {
    let mut tx = pool.begin().await?;
    let mut written = Vec::new();

    for award in awards {
        let result = sqlx::query(
            r#"
            INSERT INTO claim_compass.user_badges
            (id, user_id, badge_id, badge_name, badge_description, badge_icon, earned_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (user_id, badge_id) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&award.badge_id)
        .bind(&award.badge_name)
        .bind(&award.badge_description)
        .bind(&award.badge_icon)
        .bind(award.earned_at)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() > 0 {
            written.push(award.clone());
        }
    }

    tx.commit().await?;
    tracing::info!(%user_id, awarded = written.len(), "persisted badge awards");
    Ok(written)
}
