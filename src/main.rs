use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use claim_compass::config::Config;
use claim_compass::models::{AwardedBadge, Profile};
use claim_compass::{badges, db, export, reminders, statement};

#[derive(Parser)]
#[command(name = "claim-compass")]
#[command(about = "Symptom log badges and claim statements for ClaimCompass", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load a demo profile with two weeks of logs
    Seed,
    /// Import symptom logs from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Evaluate and award newly earned badges
    Badges {
        #[arg(long)]
        email: String,
        /// Print awarded badges as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show every badge with its earned state
    Board {
        #[arg(long)]
        email: String,
    },
    /// Write a statement in support of claim
    Statement {
        #[arg(long)]
        email: String,
        #[arg(long)]
        request: Option<String>,
        #[arg(long, default_value_t = statement::DEFAULT_WINDOW_DAYS)]
        since_days: i64,
        #[arg(long, default_value = "statement.txt")]
        out: PathBuf,
    },
    /// Export the statement as a formatted document (Pro)
    Export {
        #[arg(long)]
        email: String,
        #[arg(long)]
        request: Option<String>,
        #[arg(long, default_value_t = statement::DEFAULT_WINDOW_DAYS)]
        since_days: i64,
        #[arg(long, default_value = "statement.md")]
        out: PathBuf,
    },
    /// List profiles due a reminder email
    Reminders {
        /// Instant to evaluate, RFC 3339 (defaults to now)
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
}

fn init_tracing(filter: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_new(filter)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(env_filter)
        .init();
}

async fn award_badges(pool: &PgPool, profile: &Profile) -> anyhow::Result<Vec<AwardedBadge>> {
    let (dates, has_notes) = db::fetch_badge_activity(pool, profile.user_id).await?;
    let awarded = db::fetch_awarded_ids(pool, profile.user_id).await?;
    let ids = badges::evaluate(&dates, &has_notes, &awarded)?;

    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let records = badges::award_records(&ids, Utc::now());
    db::insert_awards(pool, profile.user_id, &records).await
}

async fn statement_text(
    pool: &PgPool,
    profile: &Profile,
    request: Option<&str>,
    since_days: i64,
) -> anyhow::Result<String> {
    let (start, end) = statement::default_window(Utc::now().date_naive(), since_days);
    let entries = db::fetch_log_entries(pool, profile.user_id, start, end).await?;
    let text = statement::aggregate(&entries, profile.statement_name(), request, start, end)?;

    if !text.is_empty() {
        let awarded = db::fetch_awarded_ids(pool, profile.user_id).await?;
        if !awarded.contains(badges::STATEMENT_CREATOR) {
            let records = badges::award_records(&[badges::STATEMENT_CREATOR], Utc::now());
            db::insert_awards(pool, profile.user_id, &records).await?;
        }
    }

    Ok(text)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;
    init_tracing(&config.log_filter);

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
        .context("failed to connect to Postgres")?;

    match cli.command {
        Commands::InitDb => {
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::Import { csv } => {
            let inserted = db::import_csv(&pool, &csv).await?;
            println!("Inserted {inserted} log entries from {}.", csv.display());
        }
        Commands::Badges { email, json } => {
            let profile = db::fetch_profile(&pool, &email).await?;
            let awarded = award_badges(&pool, &profile).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&awarded)?);
            } else if awarded.is_empty() {
                println!("No new badges for {}.", profile.display_name());
            } else {
                println!("New badges for {}:", profile.display_name());
                for badge in &awarded {
                    println!(
                        "- {} {}: {}",
                        badge.badge_icon, badge.badge_name, badge.badge_description
                    );
                }
            }
        }
        Commands::Board { email } => {
            let profile = db::fetch_profile(&pool, &email).await?;
            let earned = db::fetch_awarded(&pool, profile.user_id).await?;
            let earned_ids: HashSet<String> = earned.iter().map(|b| b.badge_id.clone()).collect();

            println!("Badges for {} ({} plan):", profile.display_name(), profile.plan());
            for (category, entries) in badges::board(&earned_ids) {
                println!();
                println!("{}", category.label());
                for entry in entries {
                    let state = match earned.iter().find(|b| b.badge_id == entry.badge.id) {
                        Some(award) => format!("earned {}", award.earned_at.date_naive()),
                        None => "locked".to_string(),
                    };
                    println!(
                        "- {} {} ({}): {}",
                        entry.badge.icon, entry.badge.name, state, entry.badge.description
                    );
                }
            }
        }
        Commands::Statement {
            email,
            request,
            since_days,
            out,
        } => {
            let profile = db::fetch_profile(&pool, &email).await?;
            let text = statement_text(&pool, &profile, request.as_deref(), since_days).await?;

            if text.is_empty() {
                println!("No log entries in the last {since_days} days.");
                return Ok(());
            }

            std::fs::write(&out, text)?;
            println!("Statement written to {}.", out.display());
        }
        Commands::Export {
            email,
            request,
            since_days,
            out,
        } => {
            let profile = db::fetch_profile(&pool, &email).await?;
            profile.plan().require_pro("Document export")?;
            let text = statement_text(&pool, &profile, request.as_deref(), since_days).await?;

            if text.trim().is_empty() {
                println!("Nothing to export yet.");
                return Ok(());
            }

            let markdown = export::to_markdown(&export::paragraphs(&text, None));
            std::fs::write(&out, markdown)?;
            println!("Export written to {}.", out.display());
        }
        Commands::Reminders { at } => {
            let now = at.unwrap_or_else(Utc::now);
            let profiles = db::fetch_reminder_profiles(&pool).await?;
            let due = reminders::due_recipients(&profiles, now);

            tracing::info!(checked = profiles.len(), due = due.len(), "evaluated reminders");
            if due.is_empty() {
                println!("No reminders due at {now}.");
            } else {
                println!("Reminders due at {now}:");
                for profile in due {
                    println!("- {} <{}>", profile.display_name(), profile.email);
                }
            }
        }
    }

    Ok(())
}
