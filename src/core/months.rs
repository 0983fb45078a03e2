use crate::domain::model::{FileCatalog, MonthKey};
use crate::utils::error::{RetrievalError, Result};
use chrono::{Datelike, Days, NaiveDate};

/// Parses a `YYYY-MM` month into its first day.
pub fn parse_month(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", value.trim()), "%Y-%m-%d").map_err(|e| {
        RetrievalError::InvalidConfigValueError {
            field: "month".to_string(),
            value: value.to_string(),
            reason: format!("expected yyyy-mm: {}", e),
        }
    })
}

/// Every calendar month from `start`'s through `end`'s, inclusive.
///
/// Cloning restarts the walk from wherever the clone was taken.
#[derive(Debug, Clone)]
pub struct MonthRange {
    next: Option<MonthKey>,
    last: MonthKey,
}

pub fn months_in_range(start: NaiveDate, end: NaiveDate) -> MonthRange {
    MonthRange {
        next: Some(MonthKey::containing(start)),
        last: MonthKey::containing(end),
    }
}

impl Iterator for MonthRange {
    type Item = MonthKey;

    fn next(&mut self) -> Option<MonthKey> {
        let current = self.next.filter(|month| *month <= self.last)?;
        // 32 days from the 1st always lands in the following month
        self.next = current
            .date()
            .checked_add_days(Days::new(32))
            .map(MonthKey::containing);
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.next.filter(|month| *month <= self.last) {
            Some(first) => {
                let (from, to) = (first.date(), self.last.date());
                let months = (to.year() - from.year()) * 12 + to.month() as i32
                    - from.month() as i32
                    + 1;
                let months = months as usize;
                (months, Some(months))
            }
            None => (0, Some(0)),
        }
    }
}

/// Catalog entries picked one per month, in month order.
#[derive(Debug, Clone)]
pub struct MatchedFiles<'a> {
    catalog: &'a FileCatalog,
    months: MonthRange,
}

pub fn match_files(catalog: &FileCatalog, start: NaiveDate, end: NaiveDate) -> MatchedFiles<'_> {
    MatchedFiles {
        catalog,
        months: months_in_range(start, end),
    }
}

impl<'a> MatchedFiles<'a> {
    /// Months in the remaining range for which the catalog holds no archive.
    pub fn missing_months(self) -> Vec<MonthKey> {
        let catalog = self.catalog;
        self.months
            .filter(|month| find_for_month(catalog, month).is_none())
            .collect()
    }
}

fn find_for_month<'a>(catalog: &'a FileCatalog, month: &MonthKey) -> Option<(&'a str, &'a str)> {
    let stamp = month.stamp();
    catalog.iter().find(|(name, _)| name.contains(&stamp))
}

impl<'a> Iterator for MatchedFiles<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        for month in self.months.by_ref() {
            match find_for_month(self.catalog, &month) {
                Some(entry) => return Some(entry),
                None => tracing::debug!("No archive found for {}", month),
            }
        }
        None
    }
}
