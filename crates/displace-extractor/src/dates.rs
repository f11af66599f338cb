//! Relative-date anchoring against a publication date.
//!
//! Date phrases in news text are assumed to refer to the past. When the
//! injected phrase parser produces a date after publication, the result is
//! reflected back: explicit dates ("15 March") roll back one year, purely
//! relative phrases ("next week") mirror their week delta into the past.

use std::sync::OnceLock;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use displace_core::{DatePhraseParser, EntityLabel, ParsedDocument};
use regex::Regex;
use tracing::debug;

/// How far before publication a date may plausibly lie.
const MAX_AGE_DAYS: i64 = 366;

fn month_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new("jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec").unwrap()
    })
}

/// Anchors date phrases using an injected [`DatePhraseParser`].
pub struct DateResolver<'p> {
    parser: &'p dyn DatePhraseParser,
}

impl<'p> DateResolver<'p> {
    pub fn new(parser: &'p dyn DatePhraseParser) -> Self {
        Self { parser }
    }

    /// Resolve a phrase into an absolute past date.
    ///
    /// Without a publication date the parser output passes through
    /// unchanged, future or not.
    pub fn resolve(
        &self,
        phrase: &str,
        publication: Option<NaiveDateTime>,
    ) -> Option<NaiveDateTime> {
        let parsed = self.parser.parse(phrase, publication)?;
        let Some(publication) = publication else {
            return Some(parsed);
        };
        if parsed <= publication {
            return Some(parsed);
        }
        if month_name_re().is_match(&phrase.to_lowercase()) {
            // An explicit month and day without a year lands in the
            // future; the same date last year was meant.
            Some(rollback_one_year(parsed))
        } else {
            Some(reflect_delta(parsed, publication))
        }
    }

    /// Whether a resolved date can be the event date: not after
    /// publication and at most a year before it.
    pub fn is_plausible(&self, date: NaiveDateTime, publication: Option<NaiveDateTime>) -> bool {
        let Some(publication) = publication else {
            return true;
        };
        if date > publication {
            return false;
        }
        (publication - date).num_days() <= MAX_AGE_DAYS
    }

    /// Resolve every date entity in a document, keeping plausible ones.
    pub fn extract_all_dates(
        &self,
        doc: &ParsedDocument,
        publication: Option<NaiveDateTime>,
    ) -> Vec<NaiveDateTime> {
        let mut dates = Vec::new();
        for entity in doc.entities() {
            if entity.label() != Some(EntityLabel::Date) {
                continue;
            }
            match self.resolve(entity.text(), publication) {
                Some(date) if self.is_plausible(date, publication) => dates.push(date),
                Some(date) => {
                    debug!(phrase = entity.text(), %date, "discarding implausible date")
                }
                None => debug!(phrase = entity.text(), "unparseable date phrase"),
            }
        }
        dates
    }
}

/// Same month and day one year earlier, at midnight. Feb 29 clamps to
/// Feb 28.
fn rollback_one_year(date: NaiveDateTime) -> NaiveDateTime {
    let year = date.year() - 1;
    let day = if date.month() == 2 && date.day() == 29 {
        28
    } else {
        date.day()
    };
    NaiveDate::from_ymd_opt(year, date.month(), day)
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, date.month(), 28).unwrap())
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// Mirror a future date into the past around the publication date,
/// preserving the day-of-week the phrase implied.
fn reflect_delta(parsed: NaiveDateTime, publication: NaiveDateTime) -> NaiveDateTime {
    let delta_days = (parsed - publication).num_days();
    let weeks = delta_days / 7;
    let remainder = delta_days % 7;
    let days_after = if remainder == 0 { 7 } else { remainder };
    publication - Duration::weeks(weeks) - Duration::days(7 - days_after)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Fixed-answer parser for tests.
    struct StubParser {
        answer: Option<NaiveDateTime>,
    }

    impl DatePhraseParser for StubParser {
        fn parse(&self, _phrase: &str, _anchor: Option<NaiveDateTime>) -> Option<NaiveDateTime> {
            self.answer
        }
    }

    fn dt(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_past_date_passes_through() {
        let parser = StubParser {
            answer: Some(dt(2017, 5, 1)),
        };
        let resolver = DateResolver::new(&parser);
        assert_eq!(
            resolver.resolve("last week", Some(dt(2017, 5, 10))),
            Some(dt(2017, 5, 1))
        );
    }

    #[test]
    fn test_no_publication_date_passes_through() {
        let parser = StubParser {
            answer: Some(dt(2030, 1, 1)),
        };
        let resolver = DateResolver::new(&parser);
        assert_eq!(resolver.resolve("someday", None), Some(dt(2030, 1, 1)));
    }

    #[test]
    fn test_relative_future_reflects_into_past() {
        // Parser lands exactly one week ahead; the reflection keeps the
        // day-of-week and moves one week back.
        let parser = StubParser {
            answer: Some(dt(2017, 5, 17)),
        };
        let resolver = DateResolver::new(&parser);
        assert_eq!(
            resolver.resolve("wednesday", Some(dt(2017, 5, 10))),
            Some(dt(2017, 5, 3))
        );
    }

    #[test]
    fn test_explicit_month_rolls_back_a_year() {
        let parser = StubParser {
            answer: Some(dt(2018, 3, 15)),
        };
        let resolver = DateResolver::new(&parser);
        assert_eq!(
            resolver.resolve("15 March", Some(dt(2017, 5, 10))),
            Some(dt(2017, 3, 15))
        );
    }

    #[test]
    fn test_leap_day_rollback_clamps() {
        let parser = StubParser {
            answer: Some(dt(2016, 2, 29)),
        };
        let resolver = DateResolver::new(&parser);
        assert_eq!(
            resolver.resolve("29 February", Some(dt(2015, 6, 1))),
            Some(dt(2015, 2, 28))
        );
    }

    #[test]
    fn test_plausibility_window() {
        let parser = StubParser { answer: None };
        let resolver = DateResolver::new(&parser);
        let publication = dt(2017, 5, 10);
        assert!(resolver.is_plausible(dt(2017, 5, 10), Some(publication)));
        assert!(resolver.is_plausible(dt(2016, 5, 10), Some(publication)));
        // One second into the future fails.
        assert!(!resolver.is_plausible(
            dt(2017, 5, 10) + Duration::seconds(1),
            Some(publication)
        ));
        // 367 days back fails, 366 passes.
        assert!(!resolver.is_plausible(publication - Duration::days(367), Some(publication)));
        assert!(resolver.is_plausible(publication - Duration::days(366), Some(publication)));
    }

    proptest::proptest! {
        #[test]
        fn prop_reflection_never_lands_in_future(days in 1i64..7000) {
            let publication = dt(2017, 5, 10);
            let parser = StubParser {
                answer: Some(publication + Duration::days(days)),
            };
            let resolver = DateResolver::new(&parser);
            let resolved = resolver.resolve("3 weeks", Some(publication)).unwrap();
            proptest::prop_assert!(resolved <= publication);
        }
    }
}
