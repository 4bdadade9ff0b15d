use crate::university::{Category, UniversityRecord};

/// Category and program selection. An empty selection means "everything".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    pub categories: Vec<Category>,
    pub programs: Vec<String>,
}

impl RecordFilter {
    pub fn new(categories: Vec<Category>, programs: Vec<String>) -> Self {
        Self {
            categories,
            programs,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.programs.is_empty()
    }

    pub fn matches(&self, record: &UniversityRecord) -> bool {
        let category_ok = self.categories.is_empty() || self.categories.contains(&record.category);
        let program_ok = self.programs.is_empty()
            || self
                .programs
                .iter()
                .any(|p| p.trim().eq_ignore_ascii_case(record.program.trim()));
        category_ok && program_ok
    }

    pub fn apply(&self, records: &[UniversityRecord]) -> Vec<UniversityRecord> {
        records
            .iter()
            .filter(|record| self.matches(record))
            .cloned()
            .collect()
    }
}

pub fn unique_categories(records: &[UniversityRecord]) -> Vec<Category> {
    let mut out = Vec::new();
    for record in records {
        if !out.contains(&record.category) {
            out.push(record.category);
        }
    }
    out
}

pub fn unique_programs(records: &[UniversityRecord]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for record in records {
        if !out.iter().any(|p| p == &record.program) {
            out.push(record.program.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{unique_categories, unique_programs, RecordFilter};
    use crate::university::{load_universities, BuiltinSource, Category, UniversityRecord};

    fn fixture() -> Vec<UniversityRecord> {
        load_universities(&BuiltinSource).expect("builtin table should load")
    }

    fn names(records: &[UniversityRecord]) -> Vec<&str> {
        records.iter().map(|r| r.university.as_str()).collect()
    }

    #[test]
    fn filters_by_category_and_program_in_source_order() {
        let filter = RecordFilter::new(vec![Category::SelfApply], vec!["MS CS".to_string()]);
        let selected = filter.apply(&fixture());
        assert_eq!(
            names(&selected),
            vec![
                "UT Austin",
                "University of Florida",
                "UC Davis",
                "University of South Florida",
                "University of Central Florida",
            ]
        );
    }

    #[test]
    fn empty_filter_keeps_everything() {
        let records = fixture();
        let filter = RecordFilter::default();
        assert!(filter.is_empty());
        assert_eq!(filter.apply(&records), records);
    }

    #[test]
    fn program_only_filter() {
        let filter = RecordFilter::new(Vec::new(), vec!["ms ds".to_string()]);
        assert_eq!(names(&filter.apply(&fixture())), vec!["Texas A&M"]);
    }

    #[test]
    fn unmatched_selection_returns_nothing() {
        let filter = RecordFilter::new(vec![Category::IdpConsultancy], vec!["MS DS".to_string()]);
        assert!(filter.apply(&fixture()).is_empty());
    }

    #[test]
    fn unique_values_follow_first_appearance() {
        let records = fixture();
        assert_eq!(
            unique_categories(&records),
            vec![Category::SelfApply, Category::IdpConsultancy]
        );
        assert_eq!(unique_programs(&records), vec!["MS CS", "MS DS"]);
    }
}
