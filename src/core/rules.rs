//! Weighted rule-based scoring over the Jeffrey Modell warning signs.

use crate::models::{ClinicalIndicators, RiskLevel};

/// Score at or above which a patient is bucketed as high risk.
pub const HIGH_RISK_THRESHOLD: i32 = 7;
/// Score at or above which a patient is bucketed as medium risk.
pub const MEDIUM_RISK_THRESHOLD: i32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    Otitis4OrMore,
    Sinusitis2OrMore,
    Antibiotics2Months,
    Pneumonia2OrMore,
    FailureToThrive,
    RecurrentDeepAbscess,
    PersistentThrush,
    IvAntibiotics,
    DeepInfections2OrMore,
    FamilyHistoryPid,
    Hospitalization,
    BcgLymphadenopathy,
    ChronicSkinIssue,
    CongenitalHeartDisease,
    ChronicDiarrhea,
    IcuAdmission,
    ParentalConsanguinity,
    EarlyFamilyDeath,
}

impl Indicator {
    pub const ALL: [Indicator; 18] = [
        Indicator::Otitis4OrMore,
        Indicator::Sinusitis2OrMore,
        Indicator::Antibiotics2Months,
        Indicator::Pneumonia2OrMore,
        Indicator::FailureToThrive,
        Indicator::RecurrentDeepAbscess,
        Indicator::PersistentThrush,
        Indicator::IvAntibiotics,
        Indicator::DeepInfections2OrMore,
        Indicator::FamilyHistoryPid,
        Indicator::Hospitalization,
        Indicator::BcgLymphadenopathy,
        Indicator::ChronicSkinIssue,
        Indicator::CongenitalHeartDisease,
        Indicator::ChronicDiarrhea,
        Indicator::IcuAdmission,
        Indicator::ParentalConsanguinity,
        Indicator::EarlyFamilyDeath,
    ];

    /// Points contributed when the sign is present.
    pub fn weight(self) -> i32 {
        match self {
            Indicator::FamilyHistoryPid => 3,
            Indicator::Pneumonia2OrMore
            | Indicator::DeepInfections2OrMore
            | Indicator::BcgLymphadenopathy
            | Indicator::ParentalConsanguinity
            | Indicator::EarlyFamilyDeath => 2,
            _ => 1,
        }
    }

    pub fn is_present(self, indicators: &ClinicalIndicators) -> bool {
        match self {
            Indicator::Otitis4OrMore => indicators.otitis_4_or_more,
            Indicator::Sinusitis2OrMore => indicators.sinusitis_2_or_more,
            Indicator::Antibiotics2Months => indicators.antibiotics_2_months,
            Indicator::Pneumonia2OrMore => indicators.pneumonia_2_or_more,
            Indicator::FailureToThrive => indicators.failure_to_thrive,
            Indicator::RecurrentDeepAbscess => indicators.recurrent_deep_abscess,
            Indicator::PersistentThrush => indicators.persistent_thrush,
            Indicator::IvAntibiotics => indicators.iv_antibiotics,
            Indicator::DeepInfections2OrMore => indicators.deep_infections_2_or_more,
            Indicator::FamilyHistoryPid => indicators.family_history_pid,
            Indicator::Hospitalization => indicators.hospitalization,
            Indicator::BcgLymphadenopathy => indicators.bcg_lymphadenopathy,
            Indicator::ChronicSkinIssue => indicators.chronic_skin_issue,
            Indicator::CongenitalHeartDisease => indicators.congenital_heart_disease,
            Indicator::ChronicDiarrhea => indicators.chronic_diarrhea,
            Indicator::IcuAdmission => indicators.icu_admission,
            Indicator::ParentalConsanguinity => indicators.parental_consanguinity,
            Indicator::EarlyFamilyDeath => indicators.early_family_death,
        }
    }
}

/// Signs present in `indicators`, in table order.
pub fn present(indicators: &ClinicalIndicators) -> impl Iterator<Item = Indicator> + '_ {
    Indicator::ALL
        .into_iter()
        .filter(move |indicator| indicator.is_present(indicators))
}

pub fn score(indicators: &ClinicalIndicators) -> i32 {
    present(indicators).map(Indicator::weight).sum()
}

pub fn risk_bucket(score: i32) -> RiskLevel {
    if score >= HIGH_RISK_THRESHOLD {
        RiskLevel::High
    } else if score >= MEDIUM_RISK_THRESHOLD {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn with(signs: &[Indicator]) -> ClinicalIndicators {
        let mut indicators = ClinicalIndicators::default();
        for sign in signs {
            let flag = match sign {
                Indicator::Otitis4OrMore => &mut indicators.otitis_4_or_more,
                Indicator::Sinusitis2OrMore => &mut indicators.sinusitis_2_or_more,
                Indicator::Antibiotics2Months => &mut indicators.antibiotics_2_months,
                Indicator::Pneumonia2OrMore => &mut indicators.pneumonia_2_or_more,
                Indicator::FailureToThrive => &mut indicators.failure_to_thrive,
                Indicator::RecurrentDeepAbscess => &mut indicators.recurrent_deep_abscess,
                Indicator::PersistentThrush => &mut indicators.persistent_thrush,
                Indicator::IvAntibiotics => &mut indicators.iv_antibiotics,
                Indicator::DeepInfections2OrMore => &mut indicators.deep_infections_2_or_more,
                Indicator::FamilyHistoryPid => &mut indicators.family_history_pid,
                Indicator::Hospitalization => &mut indicators.hospitalization,
                Indicator::BcgLymphadenopathy => &mut indicators.bcg_lymphadenopathy,
                Indicator::ChronicSkinIssue => &mut indicators.chronic_skin_issue,
                Indicator::CongenitalHeartDisease => &mut indicators.congenital_heart_disease,
                Indicator::ChronicDiarrhea => &mut indicators.chronic_diarrhea,
                Indicator::IcuAdmission => &mut indicators.icu_admission,
                Indicator::ParentalConsanguinity => &mut indicators.parental_consanguinity,
                Indicator::EarlyFamilyDeath => &mut indicators.early_family_death,
            };
            *flag = true;
        }
        indicators
    }

    #[test]
    fn no_signs_scores_zero_and_low() {
        let indicators = ClinicalIndicators::default();
        assert_eq!(score(&indicators), 0);
        assert_eq!(risk_bucket(score(&indicators)), RiskLevel::Low);
        assert_eq!(risk_bucket(0).label(), "Düşük Risk");
    }

    #[test]
    fn each_sign_contributes_its_own_weight() {
        for sign in Indicator::ALL {
            assert_eq!(score(&with(&[sign])), sign.weight(), "{sign:?}");
        }
    }

    #[test]
    fn all_signs_sum_the_whole_table() {
        let total: i32 = Indicator::ALL.iter().map(|s| s.weight()).sum();
        assert_eq!(score(&with(&Indicator::ALL)), total);
        assert_eq!(total, 25);
    }

    #[test]
    fn score_ignores_order_of_signs() {
        let forward = [
            Indicator::FamilyHistoryPid,
            Indicator::PersistentThrush,
            Indicator::IcuAdmission,
        ];
        let mut backward = forward;
        backward.reverse();
        assert_eq!(score(&with(&forward)), score(&with(&backward)));
        assert_eq!(score(&with(&forward)), 5);
    }

    #[test]
    fn otitis_alone_scores_its_weight() {
        let indicators = with(&[Indicator::Otitis4OrMore]);
        assert_eq!(score(&indicators), Indicator::Otitis4OrMore.weight());
        assert_eq!(risk_bucket(score(&indicators)), RiskLevel::Low);
    }

    #[test_case(0 => RiskLevel::Low)]
    #[test_case(3 => RiskLevel::Low)]
    #[test_case(MEDIUM_RISK_THRESHOLD => RiskLevel::Medium)]
    #[test_case(6 => RiskLevel::Medium)]
    #[test_case(HIGH_RISK_THRESHOLD => RiskLevel::High)]
    #[test_case(25 => RiskLevel::High)]
    fn bucket_boundaries_are_inclusive(score: i32) -> RiskLevel {
        risk_bucket(score)
    }

    #[test]
    fn bucket_labels_match_dashboard_text() {
        assert_eq!(risk_bucket(7).label(), "Yüksek Risk");
        assert_eq!(risk_bucket(4).label(), "Orta Risk");
    }
}
