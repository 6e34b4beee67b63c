use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{ClaimError, ClaimResult};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn parse_date(value: &str) -> ClaimResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| ClaimError::MalformedDate {
        value: value.to_string(),
    })
}

/// One day's symptom entry as read back from storage.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub logged_date: NaiveDate,
    pub condition: String,
    pub severity: i32,
    pub affected_work: bool,
    pub notes: Option<String>,
}

impl LogEntry {
    /// Trimmed note text, `None` when absent or blank.
    pub fn note_text(&self) -> Option<&str> {
        self.notes
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }
}

/// A log entry with its date still in text form, as it arrives from an import.
#[derive(Debug, Clone)]
pub struct RawLogEntry {
    pub logged_at: String,
    pub condition: String,
    pub severity: i32,
    pub affected_work: bool,
    pub notes: Option<String>,
}

impl TryFrom<RawLogEntry> for LogEntry {
    type Error = ClaimError;

    fn try_from(raw: RawLogEntry) -> Result<Self, Self::Error> {
        let logged_date = parse_date(&raw.logged_at)?;
        if !(1..=10).contains(&raw.severity) {
            return Err(ClaimError::SeverityOutOfRange {
                value: raw.severity,
            });
        }

        Ok(LogEntry {
            logged_date,
            condition: raw.condition,
            severity: raw.severity,
            affected_work: raw.affected_work,
            notes: raw.notes,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BadgeCategory {
    Consistency,
    Milestone,
    Feature,
}

impl BadgeCategory {
    pub fn label(self) -> &'static str {
        match self {
            BadgeCategory::Consistency => "Consistency",
            BadgeCategory::Milestone => "Milestones",
            BadgeCategory::Feature => "Features",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadgeDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub category: BadgeCategory,
}

/// A badge granted to a user, denormalized the way `user_badges` stores it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AwardedBadge {
    pub badge_id: String,
    pub badge_name: String,
    pub badge_description: String,
    pub badge_icon: String,
    pub earned_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConditionSummary {
    pub condition: String,
    pub count: usize,
    pub average_severity: f64,
    pub max_severity: i32,
    pub work_impact_days: usize,
    pub note_excerpts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatementDocument {
    pub subject_name: String,
    pub request_label: Option<String>,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub conditions: Vec<ConditionSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plan {
    Free,
    Pro,
}

impl Plan {
    pub fn from_is_pro(is_pro: bool) -> Self {
        if is_pro {
            Plan::Pro
        } else {
            Plan::Free
        }
    }

    /// Fails with `ProRequired` unless this plan includes paid features.
    pub fn require_pro(self, feature: &str) -> ClaimResult<()> {
        match self {
            Plan::Pro => Ok(()),
            Plan::Free => Err(ClaimError::ProRequired {
                feature: feature.to_string(),
            }),
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Plan::Free => write!(f, "Free"),
            Plan::Pro => write!(f, "Pro"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReminderDays {
    #[default]
    Daily,
    Weekdays,
    Weekends,
}

impl FromStr for ReminderDays {
    type Err = ClaimError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "daily" | "" => Ok(ReminderDays::Daily),
            "weekdays" => Ok(ReminderDays::Weekdays),
            "weekends" => Ok(ReminderDays::Weekends),
            other => Err(ClaimError::UnknownReminderDays {
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Profile {
    pub user_id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub is_pro: bool,
    pub email_reminders_enabled: bool,
    pub reminder_time: Option<String>,
    pub reminder_days: Option<String>,
    pub timezone: Option<String>,
}

impl Profile {
    pub fn plan(&self) -> Plan {
        Plan::from_is_pro(self.is_pro)
    }

    /// Trimmed profile name, empty when none was given.
    pub fn statement_name(&self) -> &str {
        self.full_name.as_deref().map(str::trim).unwrap_or_default()
    }

    /// Name for console output: the profile name, else the sign-in email.
    pub fn display_name(&self) -> &str {
        match self.statement_name() {
            "" => &self.email,
            name => name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(date: &str, severity: i32) -> RawLogEntry {
        RawLogEntry {
            logged_at: date.to_string(),
            condition: "Tinnitus".to_string(),
            severity,
            affected_work: false,
            notes: None,
        }
    }

    #[test]
    fn raw_entry_converts_with_valid_fields() {
        let entry = LogEntry::try_from(raw("2025-03-04", 5)).expect("entry");
        assert_eq!(entry.logged_date, NaiveDate::from_ymd_opt(2025, 3, 4).unwrap());
        assert_eq!(entry.severity, 5);
    }

    #[test]
    fn raw_entry_rejects_malformed_date() {
        let err = LogEntry::try_from(raw("03/04/2025", 5)).unwrap_err();
        assert!(matches!(err, ClaimError::MalformedDate { .. }));
    }

    #[test]
    fn raw_entry_rejects_severity_outside_range() {
        assert!(LogEntry::try_from(raw("2025-03-04", 0)).is_err());
        assert!(LogEntry::try_from(raw("2025-03-04", 11)).is_err());
    }

    #[test]
    fn blank_notes_do_not_count() {
        let mut entry = LogEntry::try_from(raw("2025-03-04", 5)).unwrap();
        entry.notes = Some("   ".to_string());
        assert_eq!(entry.note_text(), None);
        entry.notes = Some("  ringing all night ".to_string());
        assert_eq!(entry.note_text(), Some("ringing all night"));
    }

    #[test]
    fn free_plan_is_refused_pro_features() {
        assert!(Plan::Free.require_pro("Word export").is_err());
        assert!(Plan::Pro.require_pro("Word export").is_ok());
    }

    #[test]
    fn reminder_days_parse() {
        assert_eq!("weekends".parse::<ReminderDays>().unwrap(), ReminderDays::Weekends);
        assert_eq!("".parse::<ReminderDays>().unwrap(), ReminderDays::Daily);
        assert!("monthly".parse::<ReminderDays>().is_err());
    }

    #[test]
    fn display_name_falls_back_to_email() {
        let profile = Profile {
            user_id: Uuid::new_v4(),
            email: "jane@example.com".to_string(),
            full_name: Some(" ".to_string()),
            is_pro: false,
            email_reminders_enabled: false,
            reminder_time: None,
            reminder_days: None,
            timezone: None,
        };
        assert_eq!(profile.display_name(), "jane@example.com");
        assert_eq!(profile.statement_name(), "");
        assert_eq!(profile.plan(), Plan::Free);
    }

    #[test]
    fn statement_name_never_uses_email() {
        let profile = Profile {
            user_id: Uuid::new_v4(),
            email: "jane@example.com".to_string(),
            full_name: Some("  Jane Doe ".to_string()),
            is_pro: true,
            email_reminders_enabled: false,
            reminder_time: None,
            reminder_days: None,
            timezone: None,
        };
        assert_eq!(profile.statement_name(), "Jane Doe");
        assert_eq!(profile.display_name(), "Jane Doe");

        let unnamed = Profile {
            full_name: None,
            ..profile
        };
        assert_eq!(unnamed.statement_name(), "");
    }
}
