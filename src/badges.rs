use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{ClaimError, ClaimResult};
use crate::models::{parse_date, AwardedBadge, BadgeCategory, BadgeDefinition};
use crate::streak;

pub const STATEMENT_CREATOR: &str = "statement-creator";

const MILESTONES: [(&str, usize); 4] = [
    ("first-entry", 1),
    ("data-collector", 10),
    ("evidence-builder", 50),
    ("thorough-documenter", 100),
];
const STREAKS: [(&str, u32); 3] = [("week-warrior", 7), ("month-master", 30), ("dedicated", 90)];
const DETAIL_ORIENTED: (&str, usize) = ("detail-oriented", 10);

/// Every badge a user can earn, consistency first, then milestones, then features.
pub static ALL_BADGES: [BadgeDefinition; 10] = [
    BadgeDefinition {
        id: "week-warrior",
        name: "Week Warrior",
        description: "Log symptoms 7 days in a row",
        icon: "🔥",
        category: BadgeCategory::Consistency,
    },
    BadgeDefinition {
        id: "month-master",
        name: "Month Master",
        description: "Log symptoms 30 days in a row",
        icon: "📅",
        category: BadgeCategory::Consistency,
    },
    BadgeDefinition {
        id: "dedicated",
        name: "Dedicated",
        description: "Log symptoms 90 days in a row",
        icon: "💪",
        category: BadgeCategory::Consistency,
    },
    BadgeDefinition {
        id: "first-entry",
        name: "First Entry",
        description: "Add your first symptom log",
        icon: "📝",
        category: BadgeCategory::Milestone,
    },
    BadgeDefinition {
        id: "data-collector",
        name: "Data Collector",
        description: "Log 10 entries",
        icon: "📊",
        category: BadgeCategory::Milestone,
    },
    BadgeDefinition {
        id: "evidence-builder",
        name: "Evidence Builder",
        description: "Log 50 entries",
        icon: "📈",
        category: BadgeCategory::Milestone,
    },
    BadgeDefinition {
        id: "thorough-documenter",
        name: "Thorough Documenter",
        description: "Log 100 entries",
        icon: "🏆",
        category: BadgeCategory::Milestone,
    },
    BadgeDefinition {
        id: STATEMENT_CREATOR,
        name: "Statement Creator",
        description: "Generate your first statement",
        icon: "📄",
        category: BadgeCategory::Feature,
    },
    BadgeDefinition {
        id: "vault-user",
        name: "Vault User",
        description: "Upload your first file",
        icon: "🗂️",
        category: BadgeCategory::Feature,
    },
    BadgeDefinition {
        id: "detail-oriented",
        name: "Detail Oriented",
        description: "Add notes to 10 entries",
        icon: "✍️",
        category: BadgeCategory::Feature,
    },
];

static BY_ID: LazyLock<HashMap<&'static str, &'static BadgeDefinition>> =
    LazyLock::new(|| ALL_BADGES.iter().map(|badge| (badge.id, badge)).collect());

pub fn definition(id: &str) -> Option<&'static BadgeDefinition> {
    BY_ID.get(id).copied()
}

/// Badge ids the log history qualifies for that are not yet in `awarded`.
///
/// `log_dates` and `has_notes` describe the same entries in the same order.
/// Every threshold is re-checked on each call, so a large first batch earns
/// all the milestones it crosses at once. Output follows catalog order.
pub fn evaluate(
    log_dates: &[NaiveDate],
    has_notes: &[bool],
    awarded: &HashSet<String>,
) -> ClaimResult<Vec<&'static str>> {
    if log_dates.len() != has_notes.len() {
        return Err(ClaimError::LengthMismatch {
            dates: log_dates.len(),
            flags: has_notes.len(),
        });
    }

    let entry_count = log_dates.len();
    let noted_count = has_notes.iter().filter(|flag| **flag).count();
    let best_streak = streak::longest_streak(log_dates);

    let mut qualified: HashSet<&'static str> = HashSet::new();
    for (id, threshold) in MILESTONES {
        if entry_count >= threshold {
            qualified.insert(id);
        }
    }
    if noted_count >= DETAIL_ORIENTED.1 {
        qualified.insert(DETAIL_ORIENTED.0);
    }
    for (id, threshold) in STREAKS {
        if best_streak >= threshold {
            qualified.insert(id);
        }
    }

    tracing::debug!(entry_count, noted_count, best_streak, "evaluated badge thresholds");

    Ok(ALL_BADGES
        .iter()
        .map(|badge| badge.id)
        .filter(|id| qualified.contains(id) && !awarded.contains(*id))
        .collect())
}

/// Same as [`evaluate`] for dates still in `YYYY-MM-DD` text; any
/// unparseable date fails the whole call.
pub fn evaluate_raw<S: AsRef<str>>(
    log_dates: &[S],
    has_notes: &[bool],
    awarded: &HashSet<String>,
) -> ClaimResult<Vec<&'static str>> {
    let dates = log_dates
        .iter()
        .map(|value| parse_date(value.as_ref()))
        .collect::<ClaimResult<Vec<_>>>()?;
    evaluate(&dates, has_notes, awarded)
}

pub fn award_records(ids: &[&str], earned_at: DateTime<Utc>) -> Vec<AwardedBadge> {
    ids.iter()
        .filter_map(|id| definition(id))
        .map(|badge| AwardedBadge {
            badge_id: badge.id.to_string(),
            badge_name: badge.name.to_string(),
            badge_description: badge.description.to_string(),
            badge_icon: badge.icon.to_string(),
            earned_at,
        })
        .collect()
}

#[derive(Debug, Clone, Copy)]
pub struct BoardEntry {
    pub badge: &'static BadgeDefinition,
    pub earned: bool,
}

/// The full catalog split by category, each badge marked earned or locked.
pub fn board(awarded: &HashSet<String>) -> Vec<(BadgeCategory, Vec<BoardEntry>)> {
    let mut sections: Vec<(BadgeCategory, Vec<BoardEntry>)> = Vec::new();

    for badge in ALL_BADGES.iter() {
        let entry = BoardEntry {
            badge,
            earned: awarded.contains(badge.id),
        };
        match sections.last_mut() {
            Some((category, entries)) if *category == badge.category => entries.push(entry),
            _ => sections.push((badge.category, vec![entry])),
        }
    }

    sections
}
