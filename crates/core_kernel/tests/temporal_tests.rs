//! Unit tests for the Temporal module
//!
//! Tests cover OffsetTime, Timezone, Locale resolution and the
//! multi-grammar DateParser.

use chrono::{FixedOffset, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use core_kernel::temporal::{Grammar, Style, TemporalError};
use core_kernel::{epoch_date, DateParser, Locale, OffsetTime, Timezone};

fn parser(tag: &str) -> DateParser {
    DateParser::new(Locale::parse(tag).unwrap(), Timezone::default())
}

mod offset_time {
    use super::*;

    #[test]
    fn test_parse_with_numeric_offset() {
        let parsed: OffsetTime = "21:56:30+06:00".parse().unwrap();
        assert_eq!(parsed.time(), NaiveTime::from_hms_opt(21, 56, 30).unwrap());
        assert_eq!(parsed.offset(), FixedOffset::east_opt(6 * 3600).unwrap());
    }

    #[test]
    fn test_parse_with_zulu_suffix() {
        let parsed: OffsetTime = "08:00:00Z".parse().unwrap();
        assert_eq!(parsed.offset().local_minus_utc(), 0);
        assert_eq!(parsed.time().hour(), 8);
    }

    #[test]
    fn test_parse_negative_offset() {
        let parsed: OffsetTime = "07:15:00-03:30".parse().unwrap();
        assert_eq!(parsed.offset().local_minus_utc(), -(3 * 3600 + 1800));
    }

    #[test]
    fn test_parse_rejects_missing_offset() {
        let result = "07:15:00".parse::<OffsetTime>();
        assert!(matches!(result, Err(TemporalError::Unparseable { .. })));
    }

    #[test]
    fn test_from_instant_projects_time_of_day() {
        let instant = Utc.with_ymd_and_hms(2024, 6, 15, 22, 30, 0).unwrap();
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let time = OffsetTime::from_instant(instant, offset);
        assert_eq!(time.time(), NaiveTime::from_hms_opt(0, 30, 0).unwrap());
    }

    #[test]
    fn test_at_date_and_display() {
        let time: OffsetTime = "10:00:00+01:00".parse().unwrap();
        let combined = time.at_date(epoch_date()).unwrap();
        assert_eq!(combined.to_rfc3339(), "1970-01-01T10:00:00+01:00");
        assert_eq!(time.to_string(), "10:00:00+01:00");
    }
}

mod timezone {
    use super::*;

    #[test]
    fn test_default_is_utc() {
        assert_eq!(Timezone::default().0, chrono_tz::UTC);
    }

    #[test]
    fn test_parse_iana_name() {
        let tz = Timezone::parse("America/New_York").unwrap();
        assert_eq!(tz.tz(), chrono_tz::America::New_York);
    }

    #[test]
    fn test_parse_unknown_name_fails() {
        assert!(matches!(
            Timezone::parse("Mars/Olympus_Mons"),
            Err(TemporalError::InvalidTimezone(_))
        ));
    }

    #[test]
    fn test_start_of_day() {
        let tz = Timezone::parse("Europe/Paris").unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let start = tz.start_of_day(date).unwrap();

        assert_eq!(start.hour(), 0);
        assert_eq!(start.with_timezone(&Utc).hour(), 22);
    }

    #[test]
    fn test_localize_inside_gap_is_none() {
        let tz = Timezone::parse("Europe/Paris").unwrap();
        let gap = NaiveDate::from_ymd_opt(2024, 3, 31)
            .unwrap()
            .and_hms_opt(2, 30, 0)
            .unwrap();
        assert!(tz.localize(gap).is_none());
    }

    #[test]
    fn test_offset_at() {
        let tz = Timezone::parse("Asia/Dhaka").unwrap();
        let instant = Utc.with_ymd_and_hms(2023, 4, 14, 15, 0, 0).unwrap();
        assert_eq!(tz.offset_at(instant).local_minus_utc(), 6 * 3600);
    }

    #[test]
    fn test_json_roundtrip() {
        let tz = Timezone::parse("Asia/Dhaka").unwrap();
        let json = serde_json::to_string(&tz).unwrap();
        assert_eq!(json, "\"Asia/Dhaka\"");
        let back: Timezone = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tz);
    }
}

mod locale {
    use super::*;

    #[test]
    fn test_default_is_en_us() {
        assert_eq!(Locale::default().to_string(), "en-US");
        assert_eq!(Locale::default(), Locale::parse("en-US").unwrap());
    }

    #[test]
    fn test_unknown_region_falls_back_to_language() {
        let locale = Locale::parse("fr-BE").unwrap();
        assert_eq!(
            locale.pattern(Grammar::Date(Style::Short)),
            Locale::parse("fr-FR").unwrap().pattern(Grammar::Date(Style::Short))
        );
    }

    #[test]
    fn test_unknown_language_falls_back_to_root() {
        let locale = Locale::parse("ja-JP").unwrap();
        assert_eq!(locale.pattern(Grammar::Date(Style::Short)), "%Y-%m-%d");
        assert_eq!(
            Locale::root().pattern(Grammar::DateTime(Style::Medium, Style::Medium)),
            "%Y-%m-%dT%H:%M:%S"
        );
    }

    #[test]
    fn test_invalid_tag() {
        assert!(matches!(
            Locale::parse("not a tag!"),
            Err(TemporalError::InvalidLocale(_))
        ));
    }
}

mod date_parser {
    use super::*;

    #[test]
    fn test_attempt_order_has_fifteen_grammars() {
        let order = Grammar::attempt_order();
        assert_eq!(order.len(), 15);
        assert_eq!(order[0], Grammar::Date(Style::Short));
        assert_eq!(order[1], Grammar::Time(Style::Short));
        assert_eq!(order[2], Grammar::DateTime(Style::Short, Style::Short));
        assert_eq!(order[14], Grammar::DateTime(Style::Long, Style::Long));
    }

    #[test]
    fn test_iso_and_day_first_yield_same_instant() {
        let iso = parser("fr-CA").parse("2002-02-19").unwrap();
        let day_first = parser("fr-FR").parse("19/02/2002").unwrap();
        assert_eq!(iso, day_first);
        assert_eq!(iso, Utc.with_ymd_and_hms(2002, 2, 19, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_month_first_short_date() {
        let parsed = parser("en-US").parse("02/19/02").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2002, 2, 19, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_long_date_with_localized_month() {
        let (local, grammar) = parser("fr-FR").parse_local("19 février 2002").unwrap();
        assert_eq!(grammar, Grammar::Date(Style::Long));
        assert_eq!(local.date(), NaiveDate::from_ymd_opt(2002, 2, 19).unwrap());
    }

    #[test]
    fn test_date_time_combination() {
        let (local, grammar) = parser("en-GB").parse_local("19/02/2002, 14:30").unwrap();
        assert_eq!(grammar, Grammar::DateTime(Style::Short, Style::Short));
        assert_eq!(local.time(), NaiveTime::from_hms_opt(14, 30, 0).unwrap());
    }

    #[test]
    fn test_time_only_is_anchored_on_epoch() {
        let (local, grammar) = parser("en-GB").parse_local("14:30:15").unwrap();
        assert_eq!(grammar, Grammar::Time(Style::Medium));
        assert_eq!(local.date(), epoch_date());
    }

    #[test]
    fn test_local_result_is_placed_in_zone() {
        let parser = DateParser::new(
            Locale::parse("en-GB").unwrap(),
            Timezone::parse("Europe/Paris").unwrap(),
        );
        let instant = parser.parse("15/06/2024").unwrap();
        assert_eq!(instant, Utc.with_ymd_and_hms(2024, 6, 14, 22, 0, 0).unwrap());
    }

    #[test]
    fn test_failure_reports_furthest_offset() {
        let result = parser("fr-FR").parse("19/02/abc");
        assert_eq!(
            result,
            Err(TemporalError::Unparseable {
                input: "19/02/abc".to_string(),
                offset: 6,
            })
        );
    }

    #[test]
    fn test_failure_offset_is_measured_in_the_input_as_given() {
        // "juillet" is read as "July", which is three bytes shorter
        let result = parser("fr-FR").parse("3 juillet 20x4");
        assert_eq!(
            result,
            Err(TemporalError::Unparseable {
                input: "3 juillet 20x4".to_string(),
                offset: 12,
            })
        );
    }

    #[test]
    fn test_localized_month_ignores_case() {
        let (local, _) = parser("fr-FR").parse_local("3 JUILLET 2024").unwrap();
        assert_eq!(local.date(), NaiveDate::from_ymd_opt(2024, 7, 3).unwrap());

        let (local, _) = parser("de-DE").parse_local("1. März 2024").unwrap();
        assert_eq!(local.date(), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }

    #[test]
    fn test_local_time_inside_gap_is_nonexistent() {
        let parser = DateParser::new(
            Locale::parse("en-GB").unwrap(),
            Timezone::parse("Europe/Paris").unwrap(),
        );
        let result = parser.parse("31/03/2024, 02:30");
        assert!(matches!(
            result,
            Err(TemporalError::NonexistentLocalTime { ref zone, .. }) if zone == "Europe/Paris"
        ));
    }

    #[test]
    fn test_trailing_text_is_not_consumed() {
        assert!(parser("fr-CA").parse("2002-02-19 garbage").is_err());
    }
}
