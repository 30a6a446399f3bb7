//! Evidence category weight schedule (§4.3). Sums to 1.0.

pub const POLICY_CRITERIA_MET: f64 = 0.30;
pub const GUIDELINE_SUPPORT: f64 = 0.25;
pub const CLINICAL_APPROPRIATENESS: f64 = 0.20;
pub const DRUG_INTERACTIONS: f64 = 0.10;
pub const DRUG_SAFETY: f64 = 0.10;
pub const PATIENT_HISTORY: f64 = 0.05;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_sum_to_one() {
        let total = POLICY_CRITERIA_MET + GUIDELINE_SUPPORT + CLINICAL_APPROPRIATENESS + DRUG_INTERACTIONS + DRUG_SAFETY + PATIENT_HISTORY;
        assert!((total - 1.0).abs() < 1e-9);
    }
}
