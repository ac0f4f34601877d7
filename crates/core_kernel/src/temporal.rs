//! Date/time domains and locale-sensitive date parsing
//!
//! This module provides:
//! - `OffsetTime`: a time of day carrying its own UTC offset
//! - `Timezone`: the configured "system" zone used to anchor local values
//! - `Locale` and `DateParser`: the multi-grammar textual date parser used when
//!   text is converted to the timestamp domain

use std::fmt;
use std::iter;
use std::str::FromStr;

use chrono::format::{self, Item, Parsed, StrftimeItems};
use chrono::{
    DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc,
};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use unic_langid::LanguageIdentifier;

/// Errors related to temporal operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Could not parse {input:?} as a date (error offset {offset})")]
    Unparseable {
        input: String,
        offset: usize,
    },

    #[error("{local} does not exist in {zone}")]
    NonexistentLocalTime {
        local: NaiveDateTime,
        zone: String,
    },

    #[error("Invalid locale: {0}")]
    InvalidLocale(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),
}

/// The calendar date time-only values are anchored to (1970-01-01)
pub fn epoch_date() -> NaiveDate {
    NaiveDate::default()
}

/// A time of day with a fixed UTC offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OffsetTime {
    time: NaiveTime,
    offset: FixedOffset,
}

impl OffsetTime {
    pub fn new(time: NaiveTime, offset: FixedOffset) -> Self {
        Self { time, offset }
    }

    /// Projects an instant onto its time of day at the given offset
    pub fn from_instant(instant: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self {
            time: instant.with_timezone(&offset).time(),
            offset,
        }
    }

    pub fn time(&self) -> NaiveTime {
        self.time
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Combines this time with a calendar date
    pub fn at_date(&self, date: NaiveDate) -> Option<DateTime<FixedOffset>> {
        date.and_time(self.time)
            .and_local_timezone(self.offset)
            .single()
    }
}

impl fmt::Display for OffsetTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.time, self.offset)
    }
}

impl FromStr for OffsetTime {
    type Err = TemporalError;

    /// Parses ISO-8601 offset times such as `21:56:30+06:00` or `08:00Z`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unparseable = |offset: usize| TemporalError::Unparseable {
            input: s.to_string(),
            offset,
        };

        let (time_part, offset) = match s.strip_suffix('Z') {
            Some(time_part) => (time_part, Utc.fix()),
            None => {
                let split = s
                    .rfind(|c| c == '+' || c == '-')
                    .ok_or_else(|| unparseable(s.len()))?;
                let mut parsed = Parsed::new();
                format::parse(&mut parsed, &s[split..], StrftimeItems::new("%:z"))
                    .map_err(|_| unparseable(split))?;
                let offset = parsed.to_fixed_offset().map_err(|_| unparseable(split))?;
                (&s[..split], offset)
            }
        };

        let time = NaiveTime::from_str(time_part).map_err(|_| unparseable(0))?;
        Ok(Self { time, offset })
    }
}

/// Timezone wrapper for the zone local values are interpreted in
///
/// Wraps chrono_tz::Tz with custom serialization support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timezone(pub Tz);

impl Serialize for Timezone {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.0.name())
    }
}

impl<'de> Deserialize<'de> for Timezone {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Timezone::parse(&s).map_err(serde::de::Error::custom)
    }
}

impl Timezone {
    pub fn new(tz: Tz) -> Self {
        Self(tz)
    }

    /// Looks a zone up by its IANA name
    pub fn parse(name: &str) -> Result<Self, TemporalError> {
        Tz::from_str(name)
            .map(Timezone)
            .map_err(|_| TemporalError::InvalidTimezone(name.to_string()))
    }

    pub fn tz(&self) -> Tz {
        self.0
    }

    /// Interprets a local date-time in this zone, taking the earlier instant
    /// when the local time is ambiguous. `None` inside a DST gap.
    pub fn localize(&self, local: NaiveDateTime) -> Option<DateTime<Tz>> {
        self.0.from_local_datetime(&local).earliest()
    }

    /// Gets the start of day (00:00:00) in this timezone
    pub fn start_of_day(&self, date: NaiveDate) -> Option<DateTime<Tz>> {
        self.localize(date.and_time(NaiveTime::MIN))
    }

    /// Offset in effect at the given instant
    pub fn offset_at(&self, instant: DateTime<Utc>) -> FixedOffset {
        self.0.offset_from_utc_datetime(&instant.naive_utc()).fix()
    }
}

impl Default for Timezone {
    fn default() -> Self {
        Self(chrono_tz::UTC)
    }
}

/// Date and time formatting styles, from the most compact to the most verbose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Style {
    Short,
    Medium,
    Long,
}

impl Style {
    pub const ALL: [Style; 3] = [Style::Short, Style::Medium, Style::Long];

    fn index(self) -> usize {
        match self {
            Style::Short => 0,
            Style::Medium => 1,
            Style::Long => 2,
        }
    }
}

/// One of the fifteen textual date/time grammars of a locale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Grammar {
    Date(Style),
    Time(Style),
    DateTime(Style, Style),
}

impl Grammar {
    /// All grammars in the order the parser attempts them: for each style,
    /// the date, the time, then the date combined with each time style
    pub fn attempt_order() -> Vec<Grammar> {
        let mut grammars = Vec::with_capacity(15);
        for date_style in Style::ALL {
            grammars.push(Grammar::Date(date_style));
            grammars.push(Grammar::Time(date_style));
            for time_style in Style::ALL {
                grammars.push(Grammar::DateTime(date_style, time_style));
            }
        }
        grammars
    }
}

#[derive(Debug, PartialEq, Eq)]
struct LocaleProfile {
    language: &'static str,
    region: Option<&'static str>,
    dates: [&'static str; 3],
    times: [&'static str; 3],
    /// Text between the date and the time, by date style
    joiners: [&'static str; 3],
    /// Localized month names (lowercase) mapped to the English names chrono reads
    months: &'static [(&'static str, &'static str)],
}

const FRENCH_MONTHS: &[(&str, &str)] = &[
    ("janvier", "January"),
    ("février", "February"),
    ("mars", "March"),
    ("avril", "April"),
    ("mai", "May"),
    ("juin", "June"),
    ("juillet", "July"),
    ("août", "August"),
    ("septembre", "September"),
    ("octobre", "October"),
    ("novembre", "November"),
    ("décembre", "December"),
    ("janv.", "January"),
    ("févr.", "February"),
    ("avr.", "April"),
    ("juill.", "July"),
    ("juil.", "July"),
    ("sept.", "September"),
    ("oct.", "October"),
    ("nov.", "November"),
    ("déc.", "December"),
];

const GERMAN_MONTHS: &[(&str, &str)] = &[
    ("januar", "January"),
    ("februar", "February"),
    ("märz", "March"),
    ("april", "April"),
    ("mai", "May"),
    ("juni", "June"),
    ("juli", "July"),
    ("august", "August"),
    ("september", "September"),
    ("oktober", "October"),
    ("november", "November"),
    ("dezember", "December"),
];

static PROFILES: &[LocaleProfile] = &[
    LocaleProfile {
        language: "en",
        region: Some("US"),
        dates: ["%m/%d/%y", "%b %d, %Y", "%B %d, %Y"],
        times: ["%I:%M %p", "%I:%M:%S %p", "%I:%M:%S %p %Z"],
        joiners: [", ", ", ", " at "],
        months: &[],
    },
    LocaleProfile {
        language: "en",
        region: Some("GB"),
        dates: ["%d/%m/%Y", "%d %b %Y", "%d %B %Y"],
        times: ["%H:%M", "%H:%M:%S", "%H:%M:%S %Z"],
        joiners: [", ", ", ", " at "],
        months: &[],
    },
    LocaleProfile {
        language: "en",
        region: Some("CA"),
        dates: ["%Y-%m-%d", "%b %d, %Y", "%B %d, %Y"],
        times: ["%I:%M %p", "%I:%M:%S %p", "%I:%M:%S %p %Z"],
        joiners: [", ", ", ", " at "],
        months: &[],
    },
    LocaleProfile {
        language: "fr",
        region: Some("FR"),
        dates: ["%d/%m/%Y", "%d %b %Y", "%d %B %Y"],
        times: ["%H:%M", "%H:%M:%S", "%H:%M:%S %Z"],
        joiners: [" ", " ", " à "],
        months: FRENCH_MONTHS,
    },
    LocaleProfile {
        language: "fr",
        region: Some("CA"),
        dates: ["%Y-%m-%d", "%d %b %Y", "%d %B %Y"],
        times: ["%H h %M", "%H h %M min %S s", "%H h %M min %S s %Z"],
        joiners: [" ", ", ", " à "],
        months: FRENCH_MONTHS,
    },
    LocaleProfile {
        language: "de",
        region: Some("DE"),
        dates: ["%d.%m.%y", "%d.%m.%Y", "%d. %B %Y"],
        times: ["%H:%M", "%H:%M:%S", "%H:%M:%S %Z"],
        joiners: [", ", ", ", " um "],
        months: GERMAN_MONTHS,
    },
];

static ROOT_PROFILE: LocaleProfile = LocaleProfile {
    language: "und",
    region: None,
    dates: ["%Y-%m-%d", "%Y-%m-%d", "%Y-%m-%d"],
    times: ["%H:%M", "%H:%M:%S", "%H:%M:%S%.f"],
    joiners: [" ", "T", "T"],
    months: &[],
};

/// A locale and the date/time grammars it reads
///
/// Tags are resolved against the known profiles by language and region, then
/// by language alone, then to the ISO-8601 root profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale {
    id: LanguageIdentifier,
    profile: &'static LocaleProfile,
}

impl Locale {
    /// Parses a BCP-47 language tag such as `fr-CA`
    pub fn parse(tag: &str) -> Result<Self, TemporalError> {
        let id: LanguageIdentifier = tag
            .parse()
            .map_err(|_| TemporalError::InvalidLocale(tag.to_string()))?;

        let language = id.language.as_str();
        let region = id.region.as_ref().map(|r| r.as_str());
        let profile = PROFILES
            .iter()
            .find(|p| p.language == language && p.region == region)
            .or_else(|| PROFILES.iter().find(|p| p.language == language))
            .unwrap_or(&ROOT_PROFILE);

        Ok(Self { id, profile })
    }

    /// The ISO-8601 root locale
    pub fn root() -> Self {
        Self {
            id: LanguageIdentifier::default(),
            profile: &ROOT_PROFILE,
        }
    }

    pub fn id(&self) -> &LanguageIdentifier {
        &self.id
    }

    /// Returns the chrono format string for a grammar
    pub fn pattern(&self, grammar: Grammar) -> String {
        let profile = self.profile;
        match grammar {
            Grammar::Date(style) => profile.dates[style.index()].to_string(),
            Grammar::Time(style) => profile.times[style.index()].to_string(),
            Grammar::DateTime(date_style, time_style) => format!(
                "{}{}{}",
                profile.dates[date_style.index()],
                profile.joiners[date_style.index()],
                profile.times[time_style.index()]
            ),
        }
    }

    /// Rewrites localized month names into the English names chrono reads
    ///
    /// Returns the rewritten text and, for each of its bytes, the byte offset
    /// in `input` it came from.
    fn normalize(&self, input: &str) -> (String, Vec<usize>) {
        let mut text = String::with_capacity(input.len());
        let mut origins = Vec::with_capacity(input.len());
        let mut pos = 0;

        while let Some(c) = input[pos..].chars().next() {
            let (copied, consumed) = match self.month_at(&input[pos..]) {
                Some((english, consumed)) => (english, consumed),
                None => (&input[pos..pos + c.len_utf8()], c.len_utf8()),
            };
            text.push_str(copied);
            origins.extend(iter::repeat(pos).take(copied.len()));
            pos += consumed;
        }
        (text, origins)
    }

    /// Longest localized month name starting `rest`, compared without case
    fn month_at(&self, rest: &str) -> Option<(&'static str, usize)> {
        self.profile
            .months
            .iter()
            .filter_map(|(local, english)| {
                let chars = local.chars().count();
                let end = rest
                    .char_indices()
                    .nth(chars)
                    .map_or(rest.len(), |(i, _)| i);
                let candidate = &rest[..end];
                (candidate.chars().count() == chars && candidate.to_lowercase() == *local)
                    .then_some((*english, end))
            })
            .max_by_key(|(_, consumed)| *consumed)
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self {
            id: "en-US".parse().unwrap_or_default(),
            profile: &PROFILES[0],
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// Multi-grammar date parser bound to a locale and a zone
///
/// Attempts every [`Grammar`] of the locale in [`Grammar::attempt_order`] and
/// returns the first one that consumes the whole input. Date-only input is
/// read as midnight, time-only input as a time on [`epoch_date`]; the local
/// result is then placed in the zone.
#[derive(Debug, Clone, PartialEq)]
pub struct DateParser {
    locale: Locale,
    zone: Timezone,
}

impl DateParser {
    pub fn new(locale: Locale, zone: Timezone) -> Self {
        Self { locale, zone }
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    pub fn zone(&self) -> Timezone {
        self.zone
    }

    /// Parses text into an instant
    ///
    /// On failure the error carries the furthest offset in `input` any grammar
    /// reached before failing. A local time skipped by a daylight-saving
    /// transition in the zone is [`TemporalError::NonexistentLocalTime`].
    pub fn parse(&self, input: &str) -> Result<DateTime<Utc>, TemporalError> {
        let (local, grammar) = self.parse_local(input)?;
        self.zone
            .localize(local)
            .map(|instant| instant.with_timezone(&Utc))
            .ok_or_else(|| TemporalError::NonexistentLocalTime {
                local,
                zone: self.zone.tz().name().to_string(),
            })
            .inspect(|_| tracing::trace!(?grammar, input, "date grammar matched"))
    }

    /// Parses text into a local date-time, returning the grammar that matched
    pub fn parse_local(&self, input: &str) -> Result<(NaiveDateTime, Grammar), TemporalError> {
        let (normalized, origins) = self.locale.normalize(input);
        let mut furthest = 0;

        for grammar in Grammar::attempt_order() {
            match self.try_grammar(grammar, &normalized) {
                Ok(local) => return Ok((local, grammar)),
                Err(offset) => furthest = furthest.max(offset),
            }
        }

        Err(TemporalError::Unparseable {
            input: input.to_string(),
            offset: origins.get(furthest).copied().unwrap_or(input.len()),
        })
    }

    fn try_grammar(&self, grammar: Grammar, input: &str) -> Result<NaiveDateTime, usize> {
        let parsed = scan(&self.locale.pattern(grammar), input)?;
        let resolved = match grammar {
            Grammar::Date(_) => parsed.to_naive_date().map(|d| d.and_time(NaiveTime::MIN)),
            Grammar::Time(_) => parsed.to_naive_time().map(|t| epoch_date().and_time(t)),
            Grammar::DateTime(..) => parsed
                .to_naive_date()
                .and_then(|d| parsed.to_naive_time().map(|t| d.and_time(t))),
        };
        // Every character was consumed but the fields do not form a valid value
        resolved.map_err(|_| input.len())
    }
}

impl Default for DateParser {
    fn default() -> Self {
        Self::new(Locale::default(), Timezone::default())
    }
}

/// Runs a pattern item by item so a failure reports how far it got
fn scan(pattern: &str, input: &str) -> Result<Parsed, usize> {
    let mut parsed = Parsed::new();
    let mut rest = input;

    for item in StrftimeItems::new(pattern) {
        let consumed = input.len() - rest.len();
        if matches!(item, Item::Error) {
            return Err(consumed);
        }
        rest = format::parse_and_remainder(&mut parsed, rest, iter::once(item))
            .map_err(|_| consumed)?;
    }

    if rest.is_empty() {
        Ok(parsed)
    } else {
        Err(input.len() - rest.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn parser(tag: &str) -> DateParser {
        DateParser::new(Locale::parse(tag).unwrap(), Timezone::default())
    }

    #[test]
    fn test_grammar_order_has_fifteen_entries() {
        let order = Grammar::attempt_order();
        assert_eq!(order.len(), 15);
        assert_eq!(order[0], Grammar::Date(Style::Short));
        assert_eq!(order[1], Grammar::Time(Style::Short));
        assert_eq!(order[2], Grammar::DateTime(Style::Short, Style::Short));
        assert_eq!(order[14], Grammar::DateTime(Style::Long, Style::Long));
    }

    #[test]
    fn test_locale_resolution_falls_back_by_language() {
        let swiss_french = Locale::parse("fr-CH").unwrap();
        assert_eq!(swiss_french.pattern(Grammar::Date(Style::Short)), "%d/%m/%Y");

        let unknown = Locale::parse("ja-JP").unwrap();
        assert_eq!(unknown.pattern(Grammar::Date(Style::Short)), "%Y-%m-%d");

        assert!(Locale::parse("not a tag!").is_err());
    }

    #[test]
    fn test_parse_iso_and_day_first_agree() {
        let iso = parser("fr-CA").parse("2002-02-19").unwrap();
        let day_first = parser("fr-FR").parse("19/02/2002").unwrap();
        assert_eq!(iso, day_first);
        assert_eq!(iso, Utc.with_ymd_and_hms(2002, 2, 19, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_french_month_names() {
        let parsed = parser("fr-FR").parse("3 juillet 2024").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 7, 3, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_time_only_anchors_on_epoch() {
        let parsed = parser("fr-FR").parse("22:15:30").unwrap();
        assert_eq!(parsed.date_naive(), epoch_date());
        assert_eq!(parsed.hour(), 22);
        assert_eq!(parsed.second(), 30);
    }

    #[test]
    fn test_unparseable_reports_furthest_offset() {
        let err = parser("fr-FR").parse("19/02/abc").unwrap_err();
        match err {
            TemporalError::Unparseable { offset, .. } => assert_eq!(offset, 6),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_offset_time_from_str() {
        let time: OffsetTime = "21:56:30+06:00".parse().unwrap();
        assert_eq!(time.time(), NaiveTime::from_hms_opt(21, 56, 30).unwrap());
        assert_eq!(time.offset(), FixedOffset::east_opt(6 * 3600).unwrap());
        assert_eq!(time.to_string(), "21:56:30+06:00");

        let utc: OffsetTime = "08:00:00Z".parse().unwrap();
        assert_eq!(utc.offset(), Utc.fix());
        assert!("noon".parse::<OffsetTime>().is_err());
    }

    #[test]
    fn test_timezone_localize_and_offset() {
        let paris = Timezone::parse("Europe/Paris").unwrap();
        let winter = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let start = paris.start_of_day(winter).unwrap();
        assert_eq!(start.with_timezone(&Utc).hour(), 23);
        assert_eq!(
            paris.offset_at(start.with_timezone(&Utc)),
            FixedOffset::east_opt(3600).unwrap()
        );
        assert!(Timezone::parse("Mars/Olympus").is_err());
    }
}
