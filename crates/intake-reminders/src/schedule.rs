//! Declarative reminder schedule and next-fire computation.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveTime, TimeZone, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::ReminderError;

/// When reminders go out: a set of weekdays at one local wall-clock time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ReminderConfigWire", into = "ReminderConfigWire")]
pub struct ReminderConfig {
    pub enabled: bool,
    pub days: Vec<Weekday>,
    pub time: NaiveTime,
    /// Offset of the local time zone from UTC, in minutes.
    pub utc_offset_minutes: i32,
}

impl ReminderConfig {
    pub fn new(
        enabled: bool,
        days: Vec<Weekday>,
        time: NaiveTime,
        utc_offset_minutes: i32,
    ) -> Result<Self, ReminderError> {
        offset(utc_offset_minutes)?;
        let mut days = days;
        days.sort_by_key(|d| d.num_days_from_monday());
        days.dedup();
        Ok(Self {
            enabled,
            days,
            time,
            utc_offset_minutes,
        })
    }

    /// Weekdays 18:00 at UTC+05:30.
    pub fn weekday_evenings() -> Self {
        Self {
            enabled: true,
            days: vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
            ],
            time: NaiveTime::from_hms_opt(18, 0, 0).unwrap_or(NaiveTime::MIN),
            utc_offset_minutes: 330,
        }
    }
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self::weekday_evenings()
    }
}

/// JSON shape: `{"enabled":true,"days":["mon","fri"],"time":"18:00","utcOffsetMinutes":330}`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReminderConfigWire {
    #[serde(default = "default_enabled")]
    enabled: bool,
    days: Vec<String>,
    time: String,
    #[serde(default)]
    utc_offset_minutes: i32,
}

fn default_enabled() -> bool {
    true
}

impl TryFrom<ReminderConfigWire> for ReminderConfig {
    type Error = ReminderError;

    fn try_from(wire: ReminderConfigWire) -> Result<Self, Self::Error> {
        let days = wire
            .days
            .iter()
            .map(|d| parse_weekday(d))
            .collect::<Result<Vec<_>, _>>()?;
        ReminderConfig::new(
            wire.enabled,
            days,
            parse_time(&wire.time)?,
            wire.utc_offset_minutes,
        )
    }
}

impl From<ReminderConfig> for ReminderConfigWire {
    fn from(config: ReminderConfig) -> Self {
        ReminderConfigWire {
            enabled: config.enabled,
            days: config
                .days
                .iter()
                .map(|d| d.to_string().to_lowercase())
                .collect(),
            time: config.time.format("%H:%M").to_string(),
            utc_offset_minutes: config.utc_offset_minutes,
        }
    }
}

/// Accepts `mon`, `Monday`, `MON`, ...
pub fn parse_weekday(raw: &str) -> Result<Weekday, ReminderError> {
    raw.trim()
        .parse::<Weekday>()
        .map_err(|_| ReminderError::InvalidConfig(format!("unknown weekday: {raw}")))
}

/// Parse a comma-separated weekday list such as `mon,tue,wed`.
pub fn parse_weekdays(raw: &str) -> Result<Vec<Weekday>, ReminderError> {
    raw.split(',')
        .filter(|s| !s.trim().is_empty())
        .map(parse_weekday)
        .collect()
}

/// Accepts `HH:MM` or `HH:MM:SS`.
pub fn parse_time(raw: &str) -> Result<NaiveTime, ReminderError> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| ReminderError::InvalidConfig(format!("invalid time of day: {raw}")))
}

fn offset(minutes: i32) -> Result<FixedOffset, ReminderError> {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| ReminderError::InvalidConfig(format!("invalid UTC offset: {minutes}")))
}

/// Earliest instant strictly after `now` that lands on a configured weekday at the
/// configured local time. `None` when disabled or no days are selected.
pub fn compute_next_fire_time(config: &ReminderConfig, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    if !config.enabled || config.days.is_empty() {
        return None;
    }
    let tz = offset(config.utc_offset_minutes).ok()?;
    let today = now.with_timezone(&tz).date_naive();

    // Eight days covers "same weekday next week" when today's slot already passed.
    (0..=7)
        .map(|d| today + Duration::days(d))
        .filter(|date| config.days.contains(&date.weekday()))
        .filter_map(|date| tz.from_local_datetime(&date.and_time(config.time)).single())
        .map(|local| local.with_timezone(&Utc))
        .find(|candidate| *candidate > now)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn config(days: &[Weekday], time: &str, offset: i32) -> ReminderConfig {
        ReminderConfig::new(true, days.to_vec(), parse_time(time).unwrap(), offset).unwrap()
    }

    #[test]
    fn test_fires_later_same_day() {
        // 2026-10-12 is a Monday.
        let c = config(&[Weekday::Mon], "18:00", 0);
        let next = compute_next_fire_time(&c, utc("2026-10-12T09:00:00Z")).unwrap();
        assert_eq!(next, utc("2026-10-12T18:00:00Z"));
    }

    #[test]
    fn test_exact_fire_instant_moves_to_next_occurrence() {
        let c = config(&[Weekday::Mon], "18:00", 0);
        let next = compute_next_fire_time(&c, utc("2026-10-12T18:00:00Z")).unwrap();
        assert_eq!(next, utc("2026-10-19T18:00:00Z"));
    }

    #[test]
    fn test_skips_unselected_days() {
        let c = config(&[Weekday::Mon, Weekday::Fri], "18:00", 0);
        let next = compute_next_fire_time(&c, utc("2026-10-13T10:00:00Z")).unwrap();
        assert_eq!(next, utc("2026-10-16T18:00:00Z"));
    }

    #[test]
    fn test_applies_utc_offset() {
        // 18:00 IST is 12:30 UTC.
        let c = config(&[Weekday::Mon], "18:00", 330);
        let next = compute_next_fire_time(&c, utc("2026-10-12T00:00:00Z")).unwrap();
        assert_eq!(next, utc("2026-10-12T12:30:00Z"));
    }

    #[test]
    fn test_local_day_differs_from_utc_day() {
        // Sunday 20:00 UTC is already Monday 01:30 in IST.
        let c = config(&[Weekday::Mon], "09:00", 330);
        let next = compute_next_fire_time(&c, utc("2026-10-11T20:00:00Z")).unwrap();
        assert_eq!(next, utc("2026-10-12T03:30:00Z"));
    }

    #[test]
    fn test_disabled_or_empty_never_fires() {
        let mut c = config(&[Weekday::Mon], "18:00", 0);
        c.enabled = false;
        assert!(compute_next_fire_time(&c, Utc::now()).is_none());

        let empty = config(&[], "18:00", 0);
        assert!(compute_next_fire_time(&empty, Utc::now()).is_none());
    }

    #[test]
    fn test_days_are_sorted_and_deduplicated() {
        let c = config(&[Weekday::Fri, Weekday::Mon, Weekday::Fri], "08:30", 0);
        assert_eq!(c.days, vec![Weekday::Mon, Weekday::Fri]);
    }

    #[test]
    fn test_parsers() {
        assert_eq!(
            parse_weekdays("mon, Tue,WEDNESDAY").unwrap(),
            vec![Weekday::Mon, Weekday::Tue, Weekday::Wed]
        );
        assert!(parse_weekdays("mon,funday").is_err());
        assert_eq!(
            parse_time("07:05").unwrap(),
            NaiveTime::from_hms_opt(7, 5, 0).unwrap()
        );
        assert_eq!(
            parse_time("07:05:30").unwrap(),
            NaiveTime::from_hms_opt(7, 5, 30).unwrap()
        );
        assert!(parse_time("25:00").is_err());
    }

    #[test]
    fn test_invalid_offset_rejected() {
        let err = ReminderConfig::new(true, vec![Weekday::Mon], NaiveTime::MIN, 24 * 60);
        assert!(matches!(err, Err(ReminderError::InvalidConfig(_))));
    }

    #[test]
    fn test_offset_too_large_for_seconds_is_rejected() {
        for minutes in [40_000_000, i32::MIN] {
            let err = ReminderConfig::new(true, vec![Weekday::Mon], NaiveTime::MIN, minutes);
            assert!(matches!(err, Err(ReminderError::InvalidConfig(_))));
        }

        let wire = serde_json::from_value::<ReminderConfig>(serde_json::json!({
            "days": ["mon"],
            "time": "09:00",
            "utcOffsetMinutes": 40000000
        }));
        assert!(wire.is_err());

        let unchecked = ReminderConfig {
            utc_offset_minutes: 40_000_000,
            ..config(&[Weekday::Mon], "09:00", 0)
        };
        assert!(compute_next_fire_time(&unchecked, Utc::now()).is_none());
    }

    #[test]
    fn test_json_shape() {
        let c: ReminderConfig = serde_json::from_value(serde_json::json!({
            "days": ["fri", "mon"],
            "time": "17:45",
            "utcOffsetMinutes": 330
        }))
        .unwrap();
        assert!(c.enabled);
        assert_eq!(c.days, vec![Weekday::Mon, Weekday::Fri]);

        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["days"], serde_json::json!(["mon", "fri"]));
        assert_eq!(json["time"], "17:45");
        assert_eq!(json["utcOffsetMinutes"], 330);
    }
}
