//! Data-driven filter cases
//!
//! A case names one grid column, the kind of filter control sitting on
//! top of it, and the value to type or select. Cases are immutable once
//! built and are consumed in declaration order.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::address::Address;
use crate::error::{FixtureError, FixtureResult};

/// Kind of filter control above a grid column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    /// Free text input
    Input,
    /// Dropdown, selected by visible label
    Select,
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterKind::Input => f.write_str("input"),
            FilterKind::Select => f.write_str("select"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCase {
    /// Short identifier used to tag the generated test cases
    pub identifier: String,

    #[serde(rename = "filter_type")]
    pub kind: FilterKind,

    /// Column whose filter control is set
    #[serde(rename = "filter_by")]
    pub column: String,

    /// Value typed or selected, and the substring every row must contain
    #[serde(rename = "filter_value")]
    pub value: String,

    /// Column read back when it differs from the filtered one
    /// (a country dropdown filters by id but the grid shows the name)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verify_column: Option<String>,
}

impl FilterCase {
    pub fn input(identifier: &str, column: &str, value: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            kind: FilterKind::Input,
            column: column.to_string(),
            value: value.to_string(),
            verify_column: None,
        }
    }

    pub fn select(identifier: &str, column: &str, value: &str) -> Self {
        Self {
            kind: FilterKind::Select,
            ..Self::input(identifier, column, value)
        }
    }

    pub fn verified_on(mut self, column: &str) -> Self {
        self.verify_column = Some(column.to_string());
        self
    }

    /// Column whose cells are checked against the filter value
    pub fn target_column(&self) -> &str {
        self.verify_column.as_deref().unwrap_or(&self.column)
    }

    pub fn validate(&self) -> FixtureResult<()> {
        let invalid = |reason: &str| FixtureError::InvalidCase {
            identifier: self.identifier.clone(),
            reason: reason.to_string(),
        };

        if self.identifier.trim().is_empty() {
            return Err(invalid("identifier is empty"));
        }
        if self.column.trim().is_empty() {
            return Err(invalid("filter_by is empty"));
        }
        if self.value.is_empty() {
            return Err(invalid("filter_value is empty"));
        }
        if matches!(&self.verify_column, Some(c) if c.trim().is_empty()) {
            return Err(invalid("verify_column is empty"));
        }
        Ok(())
    }

    /// Filters exercised on the addresses grid, fed by the demo addresses
    pub fn address_filters() -> Vec<Self> {
        let first = Address::first();
        let second = Address::second();
        let third = Address::third();

        vec![
            Self::input("filterId", "id_address", &first.id),
            Self::input("filterFirstName", "firstname", &second.first_name),
            Self::input("filterLastName", "lastname", &third.last_name),
            Self::input("filterAddress", "address1", &first.address),
            Self::input("filterPostCode", "postcode", &second.zip_code),
            Self::input("filterCity", "city", &third.city),
            Self::select("filterIdCountry", "id_country", &first.country).verified_on("country_name"),
        ]
    }
}

/// A named, ordered list of filter cases as stored in a YAML fixture file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterCaseSet {
    pub name: String,

    #[serde(default)]
    pub description: String,

    pub cases: Vec<FilterCase>,
}

impl FilterCaseSet {
    pub fn from_yaml(yaml: &str, origin: &Path) -> FixtureResult<Self> {
        let set: Self = serde_yaml::from_str(yaml).map_err(|source| FixtureError::Yaml {
            path: origin.to_path_buf(),
            source,
        })?;
        set.validate()?;
        Ok(set)
    }

    pub fn from_file(path: &Path) -> FixtureResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content, path)
    }

    /// Load every `.yaml`/`.yml` file under `dir`, sorted by path
    pub fn load_all(dir: &Path) -> FixtureResult<Vec<Self>> {
        let mut paths: Vec<_> = walkdir::WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "yaml" || ext == "yml")
                    .unwrap_or(false)
            })
            .map(|e| e.into_path())
            .collect();
        paths.sort();

        let mut sets = Vec::with_capacity(paths.len());
        for path in paths {
            debug!("Loading filter cases from {}", path.display());
            sets.push(Self::from_file(&path)?);
        }
        Ok(sets)
    }

    pub fn validate(&self) -> FixtureResult<()> {
        let mut seen = HashSet::new();
        for case in &self.cases {
            case.validate()?;
            if !seen.insert(case.identifier.as_str()) {
                return Err(FixtureError::DuplicateIdentifier(case.identifier.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn address_filters_keep_declaration_order() {
        let cases = FilterCase::address_filters();
        let ids: Vec<_> = cases.iter().map(|c| c.identifier.as_str()).collect();
        assert_eq!(
            ids,
            [
                "filterId",
                "filterFirstName",
                "filterLastName",
                "filterAddress",
                "filterPostCode",
                "filterCity",
                "filterIdCountry"
            ]
        );
    }

    #[test]
    fn country_case_is_a_select_checked_on_country_name() {
        let cases = FilterCase::address_filters();
        let country = cases.last().unwrap();
        assert_eq!(country.kind, FilterKind::Select);
        assert_eq!(country.column, "id_country");
        assert_eq!(country.target_column(), "country_name");
        assert_eq!(country.value, "France");
    }

    #[test]
    fn parses_case_set() {
        let yaml = r#"
name: addresses
description: Address grid filters
cases:
  - identifier: filterCity
    filter_type: input
    filter_by: city
    filter_value: Paris
  - identifier: filterIdCountry
    filter_type: select
    filter_by: id_country
    filter_value: France
    verify_column: country_name
"#;
        let set = FilterCaseSet::from_yaml(yaml, &PathBuf::from("inline.yaml")).unwrap();
        assert_eq!(set.name, "addresses");
        assert_eq!(set.cases.len(), 2);
        assert_eq!(set.cases[0].target_column(), "city");
        assert_eq!(set.cases[1].target_column(), "country_name");
    }

    #[test]
    fn bundled_file_matches_builtin_cases() {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/addresses.yaml");
        let set = FilterCaseSet::from_file(&path).unwrap();
        assert_eq!(set.cases, FilterCase::address_filters());
    }

    #[test]
    fn rejects_duplicate_identifiers() {
        let set = FilterCaseSet {
            name: "dup".to_string(),
            description: String::new(),
            cases: vec![
                FilterCase::input("filterCity", "city", "Paris"),
                FilterCase::input("filterCity", "city", "Miami"),
            ],
        };
        assert!(matches!(set.validate(), Err(FixtureError::DuplicateIdentifier(_))));
    }

    #[test]
    fn rejects_empty_value() {
        let case = FilterCase::input("filterCity", "city", "");
        assert!(matches!(case.validate(), Err(FixtureError::InvalidCase { .. })));
    }

    #[test]
    fn yaml_error_names_the_file() {
        let err = FilterCaseSet::from_yaml("name: [", &PathBuf::from("broken.yaml")).unwrap_err();
        assert!(err.to_string().contains("broken.yaml"));
    }

    #[test]
    fn loads_directory_in_path_order() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(
            dir.path().join("b.yaml"),
            "name: second\ncases:\n  - {identifier: a, filter_type: input, filter_by: city, filter_value: Paris}\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("a.yml"),
            "name: first\ncases: []\n",
        )
        .unwrap();
        std::fs::write(nested.join("ignored.txt"), "not yaml").unwrap();

        let sets = FilterCaseSet::load_all(dir.path()).unwrap();
        let names: Vec<_> = sets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["first", "second"]);
    }
}
