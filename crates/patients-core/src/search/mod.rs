//! Record search helpers

use crate::models::PatientRecord;

/// Which field a search query is matched against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchField {
    Code,
    GivenName,
    FamilyName,
    #[default]
    Any,
}

/// Case-insensitive substring search; a blank query matches nothing.
pub fn search_records<'a>(
    records: &'a [PatientRecord],
    query: &str,
    field: SearchField,
) -> Vec<&'a PatientRecord> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }

    let matches = |value: &str| value.to_lowercase().contains(&query);
    records
        .iter()
        .filter(|record| match field {
            SearchField::Code => matches(&record.code),
            SearchField::GivenName => matches(&record.given_name),
            SearchField::FamilyName => matches(&record.family_name),
            SearchField::Any => {
                matches(&record.code)
                    || matches(&record.given_name)
                    || matches(&record.family_name)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PatientStatus;

    fn record(code: &str, given: &str, family: &str) -> PatientRecord {
        PatientRecord {
            code: code.to_string(),
            given_name: given.to_string(),
            family_name: family.to_string(),
            email: None,
            phone: None,
            diagnosis: None,
            treatment: String::new(),
            status: PatientStatus::Active,
            created_at: String::new(),
        }
    }

    fn codes(found: &[&PatientRecord]) -> Vec<String> {
        found.iter().map(|r| r.code.clone()).collect()
    }

    #[test]
    fn any_field_matches_code_and_names() {
        let records = vec![
            record("AB-1", "Ana", "Lopez"),
            record("CD-2", "Bruno", "Abad"),
            record("EF-3", "Carla", "Diaz"),
        ];
        assert_eq!(
            codes(&search_records(&records, "ab", SearchField::Any)),
            vec!["AB-1", "CD-2"]
        );
    }

    #[test]
    fn field_specific_search_ignores_other_fields() {
        let records = vec![record("ANA-1", "Bruno", "Diaz"), record("X", "Ana", "Diaz")];
        assert_eq!(
            codes(&search_records(&records, "ANA", SearchField::GivenName)),
            vec!["X"]
        );
        assert_eq!(
            codes(&search_records(&records, "ana", SearchField::Code)),
            vec!["ANA-1"]
        );
    }

    #[test]
    fn blank_query_matches_nothing() {
        let records = vec![record("P1", "Ana", "Lopez")];
        assert!(search_records(&records, "  ", SearchField::Any).is_empty());
    }
}
