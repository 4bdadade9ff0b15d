use serde::Serialize;

use crate::university::normalize::parse_currency;
use crate::university::{Category, UniversityRecord};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ApplicationStats {
    pub total: usize,
    pub average_application_fee: Option<f64>,
    pub self_apply_count: usize,
    pub idp_consultancy_count: usize,
}

impl ApplicationStats {
    pub fn compute(records: &[UniversityRecord]) -> Self {
        let fees = records
            .iter()
            .filter_map(|r| parse_currency(&r.application_fee).ok())
            .collect::<Vec<_>>();
        let average_application_fee = if fees.is_empty() {
            None
        } else {
            Some(fees.iter().sum::<f64>() / fees.len() as f64)
        };
        let count = |category: Category| records.iter().filter(|r| r.category == category).count();
        Self {
            total: records.len(),
            average_application_fee,
            self_apply_count: count(Category::SelfApply),
            idp_consultancy_count: count(Category::IdpConsultancy),
        }
    }

    pub fn average_fee_label(&self) -> String {
        self.average_application_fee
            .map(|fee| format!("${fee:.2}"))
            .unwrap_or_else(|| "-".to_string())
    }
}
