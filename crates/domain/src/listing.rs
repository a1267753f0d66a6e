use std::cmp::Ordering;
use std::str::FromStr;

use rentdesk_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Sort direction for list views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    /// Ascending order.
    #[default]
    Asc,
    /// Descending order.
    Desc,
}

impl FromStr for SortDirection {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(AppError::Validation(format!(
                "unknown sort direction '{value}'"
            ))),
        }
    }
}

/// Value of a sortable record field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    /// Text compared with locale-aware ordering.
    Text(&'a str),
    /// Number compared numerically.
    Number(f64),
}

/// Record that list views can filter and sort.
pub trait ListRecord {
    /// Returns the status used by equality filters.
    fn status(&self) -> Option<&str>;

    /// Returns the value of a sortable field by key.
    fn field(&self, key: &str) -> Option<FieldValue<'_>>;
}

/// Single-key sort for list views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSort {
    key: NonEmptyString,
    direction: SortDirection,
}

impl ListSort {
    /// Creates a validated sort definition.
    pub fn new(key: impl Into<String>, direction: SortDirection) -> AppResult<Self> {
        Ok(Self {
            key: NonEmptyString::new(key)?,
            direction,
        })
    }

    /// Returns the sort key.
    #[must_use]
    pub fn key(&self) -> &str {
        self.key.as_str()
    }

    /// Returns the sort direction.
    #[must_use]
    pub fn direction(&self) -> SortDirection {
        self.direction
    }
}

/// Status filter and sort applied to an already fetched page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    /// Keep only records whose status equals this value.
    pub status: Option<String>,
    /// Order records by one field.
    pub sort: Option<ListSort>,
}

impl ListQuery {
    /// Filters and sorts records in place.
    ///
    /// Sorting is stable. Records missing the sort field go last in ascending
    /// order and first in descending order.
    pub fn apply<T: ListRecord>(&self, records: &mut Vec<T>) {
        if let Some(status) = self
            .status
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
        {
            records.retain(|record| record.status() == Some(status));
        }

        if let Some(sort) = &self.sort {
            records.sort_by(|left, right| {
                let ordering = compare_fields(left.field(sort.key()), right.field(sort.key()));
                match sort.direction() {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            });
        }
    }
}

fn compare_fields(left: Option<FieldValue<'_>>, right: Option<FieldValue<'_>>) -> Ordering {
    match (left, right) {
        (Some(left), Some(right)) => compare_values(left, right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn compare_values(left: FieldValue<'_>, right: FieldValue<'_>) -> Ordering {
    match (left, right) {
        (FieldValue::Number(left), FieldValue::Number(right)) => {
            left.partial_cmp(&right).unwrap_or(Ordering::Equal)
        }
        (FieldValue::Text(left), FieldValue::Text(right)) => locale_compare(left, right),
        (FieldValue::Number(_), FieldValue::Text(_)) => Ordering::Less,
        (FieldValue::Text(_), FieldValue::Number(_)) => Ordering::Greater,
    }
}

/// Orders text by base letters first, then accents, then case.
fn locale_compare(left: &str, right: &str) -> Ordering {
    primary_key(left)
        .cmp(primary_key(right))
        .then_with(|| accent_key(left).cmp(accent_key(right)))
        .then_with(|| left.cmp(right))
}

fn primary_key(text: &str) -> impl Iterator<Item = char> + '_ {
    accent_key(text)
        .filter(|character| !is_combining_mark(*character))
        .map(base_letter)
}

fn accent_key(text: &str) -> impl Iterator<Item = char> + '_ {
    text.nfd().flat_map(char::to_lowercase)
}

// Letters with a stroke have no canonical decomposition.
fn base_letter(character: char) -> char {
    match character {
        'đ' => 'd',
        'ł' => 'l',
        'ø' => 'o',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::{FieldValue, ListQuery, ListRecord, ListSort, SortDirection};

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        name: &'static str,
        rent: Option<i64>,
        status: &'static str,
    }

    impl ListRecord for Row {
        fn status(&self) -> Option<&str> {
            Some(self.status)
        }

        fn field(&self, key: &str) -> Option<FieldValue<'_>> {
            match key {
                "name" => Some(FieldValue::Text(self.name)),
                "rent" => self.rent.map(|rent| FieldValue::Number(rent as f64)),
                _ => None,
            }
        }
    }

    fn sorted_by(key: &str, direction: SortDirection) -> ListQuery {
        ListQuery {
            status: None,
            sort: Some(ListSort::new(key, direction).unwrap_or_else(|_| unreachable!())),
        }
    }

    fn rows() -> Vec<Row> {
        vec![
            Row {
                name: "b house",
                rent: Some(2_000_000),
                status: "PENDING",
            },
            Row {
                name: "A house",
                rent: Some(2_400_000),
                status: "DONE",
            },
        ]
    }

    #[test]
    fn rent_ascending_keeps_order_and_descending_reverses() {
        let mut ascending = rows();
        sorted_by("rent", SortDirection::Asc).apply(&mut ascending);
        assert_eq!(ascending, rows());

        let mut descending = rows();
        sorted_by("rent", SortDirection::Desc).apply(&mut descending);
        let mut expected = rows();
        expected.reverse();
        assert_eq!(descending, expected);
    }

    #[test]
    fn text_sort_ignores_case() {
        let mut records = rows();
        sorted_by("name", SortDirection::Asc).apply(&mut records);
        assert_eq!(records[0].name, "A house");
    }

    #[test]
    fn accented_text_sorts_by_base_letter() {
        let titles = ["zoo", "đèn hỏng", "điện", "ống nước", "cửa"];
        let mut records: Vec<Row> = titles
            .into_iter()
            .map(|name| Row {
                name,
                rent: None,
                status: "PENDING",
            })
            .collect();

        sorted_by("name", SortDirection::Asc).apply(&mut records);
        let ascending: Vec<&str> = records.iter().map(|record| record.name).collect();
        assert_eq!(ascending, ["cửa", "đèn hỏng", "điện", "ống nước", "zoo"]);

        sorted_by("name", SortDirection::Desc).apply(&mut records);
        assert_eq!(records.first().map(|record| record.name), Some("zoo"));
        assert_eq!(records.last().map(|record| record.name), Some("cửa"));
    }

    #[test]
    fn accents_break_ties_before_case() {
        let mut records: Vec<Row> = ["Nha", "nhà", "nha"]
            .into_iter()
            .map(|name| Row {
                name,
                rent: None,
                status: "PENDING",
            })
            .collect();

        sorted_by("name", SortDirection::Asc).apply(&mut records);
        let ordered: Vec<&str> = records.iter().map(|record| record.name).collect();
        assert_eq!(ordered, ["Nha", "nha", "nhà"]);
    }

    #[test]
    fn status_filter_uses_equality() {
        let mut records = rows();
        ListQuery {
            status: Some("DONE".to_owned()),
            sort: None,
        }
        .apply(&mut records);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, "DONE");
    }

    #[test]
    fn missing_sort_values_go_last_ascending() {
        let mut records = rows();
        records[0].rent = None;
        sorted_by("rent", SortDirection::Asc).apply(&mut records);
        assert_eq!(records[1].rent, None);
    }
}
