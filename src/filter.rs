//! Search and category filtering shared by every list view.

use serde::{Deserialize, Serialize};

/// A record that list views can search and narrow by category.
pub trait Searchable {
    /// Fields matched by the free-text query.
    fn search_fields(&self) -> Vec<&str>;

    /// Value compared exactly against the category/status filter.
    fn category(&self) -> &str;
}

/// Free-text query plus exact category filter. Empty parts match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListFilter {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub category: String,
}

impl ListFilter {
    pub fn new(query: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            category: category.into(),
        }
    }

    pub fn query(query: impl Into<String>) -> Self {
        Self::new(query, "")
    }

    pub fn category(category: impl Into<String>) -> Self {
        Self::new("", category)
    }

    pub fn is_empty(&self) -> bool {
        self.query.is_empty() && self.category.is_empty()
    }

    pub fn matches<T: Searchable + ?Sized>(&self, record: &T) -> bool {
        matches_query(record, &self.query) && matches_category(record, &self.category)
    }

    /// Keeps the matching records, preserving their order.
    pub fn apply<'a, T, I>(&self, records: I) -> Vec<&'a T>
    where
        T: Searchable + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        let needle = self.query.to_lowercase();
        records
            .into_iter()
            .filter(|record| {
                contains_folded(*record, &needle) && matches_category(*record, &self.category)
            })
            .collect()
    }
}

/// Case-insensitive substring match over the record's search fields.
pub fn matches_query<T: Searchable + ?Sized>(record: &T, query: &str) -> bool {
    contains_folded(record, &query.to_lowercase())
}

/// Exact match on the record's category; an empty filter matches all.
pub fn matches_category<T: Searchable + ?Sized>(record: &T, category: &str) -> bool {
    category.is_empty() || record.category() == category
}

fn contains_folded<T: Searchable + ?Sized>(record: &T, needle: &str) -> bool {
    needle.is_empty()
        || record
            .search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    struct Row {
        code: &'static str,
        place: &'static str,
        status: &'static str,
    }

    impl Searchable for Row {
        fn search_fields(&self) -> Vec<&str> {
            vec![self.code, self.place]
        }

        fn category(&self) -> &str {
            self.status
        }
    }

    fn rows() -> Vec<Row> {
        vec![
            Row {
                code: "CC-001",
                place: "Sector A",
                status: "active",
            },
            Row {
                code: "CC-002",
                place: "Sector B",
                status: "maintenance",
            },
            Row {
                code: "CC-003",
                place: "Sector C",
                status: "active",
            },
        ]
    }

    fn codes(rows: &[&Row]) -> Vec<&'static str> {
        rows.iter().map(|r| r.code).collect()
    }

    #[rstest]
    #[case("", "", vec!["CC-001", "CC-002", "CC-003"])]
    #[case("cc-00", "", vec!["CC-001", "CC-002", "CC-003"])]
    #[case("SECTOR b", "", vec!["CC-002"])]
    #[case("", "active", vec!["CC-001", "CC-003"])]
    #[case("sector", "maintenance", vec!["CC-002"])]
    #[case("003", "maintenance", vec![])]
    #[case("", "Active", vec![])]
    #[case("zzz", "", vec![])]
    fn test_filter_cases(
        #[case] query: &str,
        #[case] category: &str,
        #[case] expected: Vec<&'static str>,
    ) {
        let data = rows();
        let filtered = ListFilter::new(query, category).apply(&data);
        assert_eq!(codes(&filtered), expected);
    }

    #[test]
    fn test_single_record_matches() {
        let data = rows();
        assert!(ListFilter::query("sector a").matches(&data[0]));
        assert!(!ListFilter::category("maintenance").matches(&data[0]));
        assert!(ListFilter::default().is_empty());
    }
}
