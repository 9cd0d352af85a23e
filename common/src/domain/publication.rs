use chrono::{DateTime, LocalResult, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Lifecycle state of an editor-managed record.
///
/// Only `Scheduled` rows are ever touched by the automatic sweep;
/// `Archived` is terminal for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublicationStatus {
    Draft,
    Scheduled,
    Published,
    Archived,
}

impl PublicationStatus {
    /// The lowercase text stored in the `status` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            PublicationStatus::Draft => "draft",
            PublicationStatus::Scheduled => "scheduled",
            PublicationStatus::Published => "published",
            PublicationStatus::Archived => "archived",
        }
    }
}

impl std::fmt::Display for PublicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PublicationStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(PublicationStatus::Draft),
            "scheduled" => Ok(PublicationStatus::Scheduled),
            "published" => Ok(PublicationStatus::Published),
            "archived" => Ok(PublicationStatus::Archived),
            other => Err(UnknownStatus(other.to_owned())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl std::fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown publication status: {}", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

/// Failure to interpret an editor-supplied civil datetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CivilTimeError {
    /// Input did not match `YYYY-MM-DDTHH:MM[:SS]`.
    Unparseable(String),
    /// The local time falls in a DST gap and never occurred in the zone.
    NonexistentLocalTime(NaiveDateTime),
}

impl std::fmt::Display for CivilTimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CivilTimeError::Unparseable(input) => {
                write!(f, "cannot parse {:?} as a civil datetime (expected YYYY-MM-DDTHH:MM[:SS])", input)
            }
            CivilTimeError::NonexistentLocalTime(civil) => {
                write!(f, "local time {} does not exist in the configured timezone", civil)
            }
        }
    }
}

impl std::error::Error for CivilTimeError {}

/// Parse an editor-supplied civil datetime. No offset marker is accepted;
/// the value is interpreted later against the configured zone's rules.
pub fn parse_civil(input: &str) -> Result<NaiveDateTime, CivilTimeError> {
    NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M"))
        .map_err(|_| CivilTimeError::Unparseable(input.to_owned()))
}

/// Locate a civil datetime on the UTC timeline using the zone's rules for
/// that specific calendar date, never a fixed offset.
///
/// Ambiguous local times (clocks rolled back) resolve to the earliest
/// mapping; local times inside a spring-forward gap are rejected.
pub fn convert_civil_to_absolute(civil: NaiveDateTime, tz: Tz) -> Result<DateTime<Utc>, CivilTimeError> {
    match tz.from_local_datetime(&civil) {
        LocalResult::Single(instant) => Ok(instant.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _latest) => Ok(earliest.with_timezone(&Utc)),
        LocalResult::None => Err(CivilTimeError::NonexistentLocalTime(civil)),
    }
}

/// Outcome of [`resolve_initial_status`]: the status to persist and the
/// publish instant converted to absolute time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub status: PublicationStatus,
    pub publish_at: Option<DateTime<Utc>>,
}

/// Decide the status a record gets when an editor creates or updates it.
///
/// An explicit status always wins. Otherwise a publish instant at or before
/// `now` means the record goes out immediately; a future instant defers it
/// to `Scheduled`; no instant at all leaves a `Draft`.
pub fn resolve_initial_status(
    publish_at_civil: Option<NaiveDateTime>,
    explicit: Option<PublicationStatus>,
    tz: Tz,
    now: DateTime<Utc>,
) -> Result<Resolution, CivilTimeError> {
    let publish_at = match publish_at_civil {
        Some(civil) => Some(convert_civil_to_absolute(civil, tz)?),
        None => None,
    };

    if let Some(status) = explicit {
        // Editor override. A publish without an instant still has to satisfy
        // the public visibility predicate, so it gets stamped with `now`.
        let publish_at = match (status, publish_at) {
            (PublicationStatus::Published, None) => Some(now),
            (_, at) => at,
        };
        return Ok(Resolution { status, publish_at });
    }

    let status = match publish_at {
        Some(at) if at <= now => PublicationStatus::Published,
        Some(_) => PublicationStatus::Scheduled,
        None => PublicationStatus::Draft,
    };

    Ok(Resolution { status, publish_at })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const MEXICO_CITY: Tz = chrono_tz::America::Mexico_City;

    fn civil(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, min, 0).unwrap()
    }

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn parses_civil_with_and_without_seconds() {
        assert_eq!(parse_civil("2024-06-15T10:00:00").unwrap(), civil(2024, 6, 15, 10, 0));
        assert_eq!(parse_civil("2024-06-15T10:00").unwrap(), civil(2024, 6, 15, 10, 0));
    }

    #[test]
    fn rejects_malformed_civil_input() {
        for input in ["", "next tuesday", "2024-06-15", "2024-06-15 10:00", "2024-06-15T10:00:00Z"] {
            assert!(matches!(parse_civil(input), Err(CivilTimeError::Unparseable(_))), "{input}");
        }
    }

    #[test]
    fn applies_the_offset_in_effect_for_the_calendar_date() {
        // Mexico City observed DST until 2022: CDT (UTC-5) in June 2016,
        // CST (UTC-6) in December 2016.
        let summer = convert_civil_to_absolute(civil(2016, 6, 15, 10, 0), MEXICO_CITY).unwrap();
        let winter = convert_civil_to_absolute(civil(2016, 12, 15, 10, 0), MEXICO_CITY).unwrap();
        assert_eq!(summer, utc(2016, 6, 15, 15, 0));
        assert_eq!(winter, utc(2016, 12, 15, 16, 0));

        // A fixed-offset implementation could not produce both of these.
        assert_eq!((winter - summer).num_hours(), 183 * 24 + 1);
    }

    #[test]
    fn post_dst_abolition_dates_share_one_offset() {
        // DST was abolished in the zone in late 2022; both 2024 dates sit at UTC-6.
        let summer = convert_civil_to_absolute(civil(2024, 6, 15, 10, 0), MEXICO_CITY).unwrap();
        let winter = convert_civil_to_absolute(civil(2024, 12, 15, 10, 0), MEXICO_CITY).unwrap();
        assert_eq!(summer, utc(2024, 6, 15, 16, 0));
        assert_eq!(winter, utc(2024, 12, 15, 16, 0));
    }

    #[test]
    fn ambiguous_fall_back_time_resolves_to_earliest_mapping() {
        // 2016-10-30 01:30 happened twice in Mexico City; the first pass was CDT.
        let instant = convert_civil_to_absolute(civil(2016, 10, 30, 1, 30), MEXICO_CITY).unwrap();
        assert_eq!(instant, utc(2016, 10, 30, 6, 30));
    }

    #[test]
    fn nonexistent_spring_forward_time_is_rejected() {
        // 2016-04-03 02:30 was skipped when clocks jumped 02:00 -> 03:00.
        let result = convert_civil_to_absolute(civil(2016, 4, 3, 2, 30), MEXICO_CITY);
        assert!(matches!(result, Err(CivilTimeError::NonexistentLocalTime(_))));
    }

    #[test]
    fn past_instant_publishes_immediately() {
        // Yesterday 09:00 civil time, evaluated today.
        let now = utc(2024, 6, 16, 18, 0);
        let resolution =
            resolve_initial_status(Some(civil(2024, 6, 15, 9, 0)), None, MEXICO_CITY, now).unwrap();
        assert_eq!(resolution.status, PublicationStatus::Published);
        assert_eq!(resolution.publish_at, Some(utc(2024, 6, 15, 15, 0)));
    }

    #[test]
    fn future_instant_defers_to_scheduled() {
        let now = utc(2024, 6, 15, 15, 0);
        let resolution =
            resolve_initial_status(Some(civil(2024, 6, 15, 10, 0)), None, MEXICO_CITY, now).unwrap();
        // 10:00 civil is 16:00 UTC, one hour past `now`.
        assert_eq!(resolution.status, PublicationStatus::Scheduled);
        assert_eq!(resolution.publish_at, Some(utc(2024, 6, 15, 16, 0)));
    }

    #[test]
    fn instant_equal_to_now_counts_as_published() {
        let now = utc(2024, 6, 15, 16, 0);
        let resolution =
            resolve_initial_status(Some(civil(2024, 6, 15, 10, 0)), None, MEXICO_CITY, now).unwrap();
        assert_eq!(resolution.status, PublicationStatus::Published);
    }

    #[test]
    fn explicit_status_wins_over_the_comparison() {
        let now = utc(2024, 6, 16, 18, 0);
        let resolution = resolve_initial_status(
            Some(civil(2024, 6, 15, 9, 0)),
            Some(PublicationStatus::Draft),
            MEXICO_CITY,
            now,
        )
        .unwrap();
        assert_eq!(resolution.status, PublicationStatus::Draft);
    }

    #[test]
    fn explicit_publish_without_instant_is_stamped_with_now() {
        let now = utc(2024, 6, 16, 18, 0);
        let resolution =
            resolve_initial_status(None, Some(PublicationStatus::Published), MEXICO_CITY, now).unwrap();
        assert_eq!(resolution.status, PublicationStatus::Published);
        assert_eq!(resolution.publish_at, Some(now));
    }

    #[test]
    fn no_instant_and_no_override_stays_draft() {
        let now = utc(2024, 6, 16, 18, 0);
        let resolution = resolve_initial_status(None, None, MEXICO_CITY, now).unwrap();
        assert_eq!(resolution.status, PublicationStatus::Draft);
        assert_eq!(resolution.publish_at, None);
    }

    #[test]
    fn status_round_trips_through_text() {
        for status in [
            PublicationStatus::Draft,
            PublicationStatus::Scheduled,
            PublicationStatus::Published,
            PublicationStatus::Archived,
        ] {
            assert_eq!(status.as_str().parse::<PublicationStatus>().unwrap(), status);
        }
        assert!("live".parse::<PublicationStatus>().is_err());
    }
}
