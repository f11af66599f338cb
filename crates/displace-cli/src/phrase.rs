//! Built-in date-phrase parser.
//!
//! Covers the phrase shapes common in news text: "yesterday", "three days
//! ago", "last week", and explicit day-month mentions with or without a
//! year. Anything else parses to `None`. Deployments with a full calendar
//! parser plug it in through [`DatePhraseParser`] instead.

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime};
use displace_core::DatePhraseParser;

const MONTHS: &[(&str, u32)] = &[
    ("january", 1),
    ("february", 2),
    ("march", 3),
    ("april", 4),
    ("may", 5),
    ("june", 6),
    ("july", 7),
    ("august", 8),
    ("september", 9),
    ("october", 10),
    ("november", 11),
    ("december", 12),
];

fn month_number(word: &str) -> Option<u32> {
    MONTHS
        .iter()
        .find(|(name, _)| *name == word || (word.len() >= 3 && name.starts_with(word)))
        .map(|&(_, n)| n)
}

fn count_word(word: &str) -> Option<i64> {
    match word {
        "a" | "an" | "one" => Some(1),
        "two" => Some(2),
        "three" => Some(3),
        "four" => Some(4),
        "five" => Some(5),
        "six" => Some(6),
        "seven" => Some(7),
        "eight" => Some(8),
        "nine" => Some(9),
        "ten" => Some(10),
        _ => word.parse().ok(),
    }
}

fn back_from(anchor: NaiveDateTime, count: i64, unit: &str) -> Option<NaiveDateTime> {
    let date = anchor.date();
    let date = match unit.trim_end_matches('s') {
        "day" => date - Duration::days(count),
        "week" => date - Duration::weeks(count),
        "month" => date.checked_sub_months(Months::new(count as u32))?,
        "year" => date.checked_sub_months(Months::new(12 * count as u32))?,
        _ => return None,
    };
    date.and_hms_opt(0, 0, 0)
}

pub struct SimpleDateParser;

impl DatePhraseParser for SimpleDateParser {
    fn parse(&self, phrase: &str, anchor: Option<NaiveDateTime>) -> Option<NaiveDateTime> {
        let lowered = phrase.to_lowercase();
        let words: Vec<&str> = lowered
            .split_whitespace()
            .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
            .filter(|w| !w.is_empty() && !matches!(*w, "on" | "the" | "of" | "in"))
            .collect();

        match words.as_slice() {
            ["today"] => anchor?.date().and_hms_opt(0, 0, 0),
            ["yesterday"] => (anchor?.date() - Duration::days(1)).and_hms_opt(0, 0, 0),
            [count, unit, "ago"] => back_from(anchor?, count_word(count)?, unit),
            ["last", unit] => back_from(anchor?, 1, unit),
            _ => {
                // Explicit date: a month name plus a day number, with an
                // optional four-digit year; the anchor supplies a missing
                // year.
                let month = words.iter().find_map(|w| month_number(w))?;
                let mut day = None;
                let mut year = None;
                for w in &words {
                    if let Ok(n) = w.parse::<u32>() {
                        if (1000..=9999).contains(&n) {
                            year = Some(n as i32);
                        } else if (1..=31).contains(&n) && day.is_none() {
                            day = Some(n);
                        }
                    }
                }
                let year = year.or_else(|| anchor.map(|a| a.year()))?;
                NaiveDate::from_ymd_opt(year, month, day?)?.and_hms_opt(0, 0, 0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_relative_phrases() {
        let parser = SimpleDateParser;
        let anchor = Some(dt(2017, 5, 10));
        assert_eq!(parser.parse("yesterday", anchor), Some(dt(2017, 5, 9)));
        assert_eq!(parser.parse("three days ago", anchor), Some(dt(2017, 5, 7)));
        assert_eq!(parser.parse("2 weeks ago", anchor), Some(dt(2017, 4, 26)));
        assert_eq!(parser.parse("last month", anchor), Some(dt(2017, 4, 10)));
        assert_eq!(parser.parse("a year ago", anchor), Some(dt(2016, 5, 10)));
    }

    #[test]
    fn test_explicit_dates() {
        let parser = SimpleDateParser;
        let anchor = Some(dt(2017, 5, 10));
        assert_eq!(parser.parse("15 March", anchor), Some(dt(2017, 3, 15)));
        assert_eq!(parser.parse("March 15, 2016", anchor), Some(dt(2016, 3, 15)));
        assert_eq!(parser.parse("on the 3rd of April", anchor), None);
        assert_eq!(parser.parse("15 March", None), None);
    }

    #[test]
    fn test_relative_needs_anchor() {
        let parser = SimpleDateParser;
        assert_eq!(parser.parse("yesterday", None), None);
        assert_eq!(parser.parse("the past", Some(dt(2017, 5, 10))), None);
    }
}
