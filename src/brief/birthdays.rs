//! Birthday matching against the family roster.
//!
//! Birthdays match on month and day only. The stored year is used for the age.
//! A malformed birthday skips that person with a warning; it never blocks the brief.

use chrono::{Datelike, NaiveDate};

use crate::config::FamilyMember;

pub struct BirthdayMatcher<'a> {
    family: &'a [FamilyMember],
}

impl<'a> BirthdayMatcher<'a> {
    pub fn new(family: &'a [FamilyMember]) -> Self {
        Self { family }
    }

    /// `"<name> (<age> years)"` for everyone whose birthday falls on `today`.
    pub fn matches(&self, today: NaiveDate) -> Vec<String> {
        self.family
            .iter()
            .filter_map(|member| {
                let raw = member.birthday.as_deref().map(str::trim).filter(|b| !b.is_empty())?;
                let birthday = match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
                    Ok(date) => date,
                    Err(e) => {
                        tracing::warn!(
                            name = %member.name,
                            birthday = %raw,
                            error = %e,
                            "skipping invalid birthday"
                        );
                        return None;
                    }
                };
                if birthday.month() != today.month() || birthday.day() != today.day() {
                    return None;
                }
                let age = today.year() - birthday.year();
                Some(format!("{} ({} years)", member.name, age))
            })
            .collect()
    }
}
