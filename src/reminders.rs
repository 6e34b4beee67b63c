use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};
use chrono_tz::Tz;

use crate::error::{ClaimError, ClaimResult};
use crate::models::{Profile, ReminderDays};

pub const DEFAULT_REMINDER_HOUR: u32 = 18;
pub const DEFAULT_TIMEZONE: &str = "America/Chicago";

/// IANA zone for a profile, `America/Chicago` when unset.
pub fn profile_timezone(value: Option<&str>) -> ClaimResult<Tz> {
    let name = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_TIMEZONE);

    name.parse::<Tz>().map_err(|_| ClaimError::UnknownTimezone {
        value: name.to_string(),
    })
}

/// Hour component of an `HH:MM` (or `HH:MM:SS`) reminder time.
pub fn reminder_hour(value: Option<&str>) -> ClaimResult<u32> {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(DEFAULT_REMINDER_HOUR);
    };

    raw.split(':')
        .next()
        .and_then(|hour| hour.parse::<u32>().ok())
        .filter(|hour| *hour < 24)
        .ok_or_else(|| ClaimError::InvalidReminderTime {
            value: raw.to_string(),
        })
}

fn day_matches(days: ReminderDays, weekday: Weekday) -> bool {
    let weekend = matches!(weekday, Weekday::Sat | Weekday::Sun);
    match days {
        ReminderDays::Daily => true,
        ReminderDays::Weekdays => !weekend,
        ReminderDays::Weekends => weekend,
    }
}

/// Whether the hourly reminder run at `now` should email this profile.
pub fn is_due(profile: &Profile, now: DateTime<Utc>) -> ClaimResult<bool> {
    if !profile.email_reminders_enabled {
        return Ok(false);
    }

    let tz = profile_timezone(profile.timezone.as_deref())?;
    let local = now.with_timezone(&tz);
    let hour = reminder_hour(profile.reminder_time.as_deref())?;
    let days: ReminderDays = profile
        .reminder_days
        .as_deref()
        .unwrap_or_default()
        .parse()?;

    Ok(local.hour() == hour && day_matches(days, local.weekday()))
}

/// Profiles due a reminder at `now`. Profiles with unusable settings are
/// logged and skipped so one bad row does not stop the run.
pub fn due_recipients(profiles: &[Profile], now: DateTime<Utc>) -> Vec<&Profile> {
    profiles
        .iter()
        .filter(|profile| match is_due(profile, now) {
            Ok(due) => due,
            Err(err) => {
                tracing::warn!(email = %profile.email, error = %err, "skipping reminder");
                false
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn profile(time: Option<&str>, days: Option<&str>, timezone: Option<&str>) -> Profile {
        Profile {
            user_id: Uuid::new_v4(),
            email: "vet@example.com".to_string(),
            full_name: None,
            is_pro: false,
            email_reminders_enabled: true,
            reminder_time: time.map(str::to_string),
            reminder_days: days.map(str::to_string),
            timezone: timezone.map(str::to_string),
        }
    }

    // 2025-06-02 is a Monday.
    fn utc(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn default_is_six_pm_chicago_every_day() {
        let p = profile(None, None, None);
        // CST in winter: 18:00 local is 00:00 UTC the next day.
        let winter = Utc.with_ymd_and_hms(2025, 1, 7, 0, 0, 0).unwrap();
        assert!(is_due(&p, winter).unwrap());
        assert!(!is_due(&p, utc(2, 18)).unwrap());
    }

    #[test]
    fn chicago_reminder_follows_daylight_saving() {
        let p = profile(Some("18:00"), Some("daily"), Some("America/Chicago"));
        // 18:00 CDT is 23:00 UTC.
        let six_pm_cdt = Utc.with_ymd_and_hms(2025, 7, 1, 23, 0, 0).unwrap();
        let seven_pm_cdt = Utc.with_ymd_and_hms(2025, 7, 2, 0, 0, 0).unwrap();
        assert!(is_due(&p, six_pm_cdt).unwrap());
        assert!(!is_due(&p, seven_pm_cdt).unwrap());
    }

    #[test]
    fn weekday_and_weekend_filters() {
        let weekdays = profile(Some("09:00"), Some("weekdays"), Some("UTC"));
        let weekends = profile(Some("09:00"), Some("weekends"), Some("UTC"));
        assert!(is_due(&weekdays, utc(2, 9)).unwrap());
        assert!(!is_due(&weekends, utc(2, 9)).unwrap());
        // Saturday
        assert!(!is_due(&weekdays, utc(7, 9)).unwrap());
        assert!(is_due(&weekends, utc(7, 9)).unwrap());
    }

    #[test]
    fn local_weekday_follows_timezone() {
        // Monday 02:00 UTC is still Sunday evening in Chicago.
        let p = profile(Some("21:00"), Some("weekends"), Some("America/Chicago"));
        assert!(is_due(&p, utc(2, 2)).unwrap());
    }

    #[test]
    fn disabled_profiles_are_never_due() {
        let mut p = profile(Some("09:00"), None, Some("UTC"));
        p.email_reminders_enabled = false;
        assert!(!is_due(&p, utc(2, 9)).unwrap());
    }

    #[test]
    fn reminder_time_parses_hour() {
        assert_eq!(reminder_hour(Some("07:30:00")).unwrap(), 7);
        assert_eq!(reminder_hour(Some("")).unwrap(), DEFAULT_REMINDER_HOUR);
        assert!(reminder_hour(Some("25:00")).is_err());
        assert!(reminder_hour(Some("soon")).is_err());
    }

    #[test]
    fn timezone_names_resolve() {
        assert_eq!(profile_timezone(None).unwrap(), Tz::America__Chicago);
        assert_eq!(profile_timezone(Some(" ")).unwrap(), Tz::America__Chicago);
        assert_eq!(profile_timezone(Some("Europe/Berlin")).unwrap(), Tz::Europe__Berlin);
        assert!(matches!(
            profile_timezone(Some("Mars/Olympus")),
            Err(ClaimError::UnknownTimezone { .. })
        ));
    }

    #[test]
    fn bad_rows_are_skipped() {
        let good = profile(Some("09:00"), None, Some("UTC"));
        let bad_days = profile(Some("09:00"), Some("monthly"), Some("UTC"));
        let bad_zone = profile(Some("09:00"), None, Some("+40000000"));
        let profiles = vec![bad_zone, good, bad_days];
        let due = due_recipients(&profiles, utc(2, 9));
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].timezone.as_deref(), Some("UTC"));
        assert_eq!(due[0].reminder_days, None);
    }
}
