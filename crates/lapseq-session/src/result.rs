//! Results table: one row per classified driver

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Final classification of one driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResultRecord {
    #[serde(deserialize_with = "crate::lap::driver_number")]
    pub driver_number: String,
    pub abbreviation: String,
    /// 1-based finishing position; missing for unclassified drivers
    pub position: Option<f64>,
    #[serde(default)]
    pub team_name: Option<String>,
}

impl ResultRecord {
    #[must_use]
    pub fn new(
        driver_number: impl Into<String>,
        abbreviation: impl Into<String>,
        position: Option<f64>,
    ) -> Self {
        Self {
            driver_number: driver_number.into(),
            abbreviation: abbreviation.into(),
            position,
            team_name: None,
        }
    }
}

/// All result rows of a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultTable {
    pub results: Vec<ResultRecord>,
}

impl ResultTable {
    #[must_use]
    pub fn new(results: Vec<ResultRecord>) -> Self {
        Self { results }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResultRecord> + '_ {
        self.results.iter()
    }

    /// First result row with the given driver number.
    #[must_use]
    pub fn find_by_number(&self, driver_number: &str) -> Option<&ResultRecord> {
        self.results
            .iter()
            .find(|result| result.driver_number == driver_number)
    }

    /// Rows sorted by abbreviation (stable for equal abbreviations).
    #[must_use]
    pub fn sorted_by_abbreviation(&self) -> Vec<&ResultRecord> {
        let mut sorted = self.results.iter().collect::<Vec<_>>();
        sorted.sort_by(|a, b| a.abbreviation.cmp(&b.abbreviation));
        sorted
    }

    /// Distinct driver numbers in order of first appearance.
    #[must_use]
    pub fn distinct_driver_numbers(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        self.results
            .iter()
            .map(|result| result.driver_number.as_str())
            .filter(|number| seen.insert(*number))
            .collect()
    }

    /// Distinct driver abbreviations.
    #[must_use]
    pub fn abbreviations(&self) -> BTreeSet<&str> {
        self.results
            .iter()
            .map(|result| result.abbreviation.as_str())
            .collect()
    }
}

impl FromIterator<ResultRecord> for ResultTable {
    fn from_iter<I: IntoIterator<Item = ResultRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ResultTable {
        ResultTable::new(vec![
            ResultRecord::new("44", "HAM", Some(2.0)),
            ResultRecord::new("1", "VER", Some(1.0)),
            ResultRecord::new("16", "LEC", None),
            ResultRecord::new("44", "HAM", Some(2.0)),
        ])
    }

    #[test]
    fn test_sorted_by_abbreviation() {
        let table = table();
        let order = table
            .sorted_by_abbreviation()
            .into_iter()
            .map(|r| r.abbreviation.as_str())
            .collect::<Vec<_>>();
        assert_eq!(order, ["HAM", "HAM", "LEC", "VER"]);
    }

    #[test]
    fn test_distinct_driver_numbers_keep_first_appearance() {
        assert_eq!(table().distinct_driver_numbers(), ["44", "1", "16"]);
        assert_eq!(table().abbreviations().len(), 3);
    }

    #[test]
    fn test_find_by_number() {
        let table = table();
        assert_eq!(table.find_by_number("1").unwrap().abbreviation, "VER");
        assert!(table.find_by_number("5").is_none());
    }

    #[test]
    fn test_deserialize_numeric_driver_number() {
        let json = r#"[{"DriverNumber": 44, "Abbreviation": "HAM", "Position": 3.0, "Points": 15.0}]"#;
        let table: ResultTable = serde_json::from_str(json).unwrap();
        assert_eq!(table.results[0].driver_number, "44");
        assert_eq!(table.results[0].position, Some(3.0));
    }
}
