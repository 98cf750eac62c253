use serde::{Deserialize, Serialize};

/// Number of standardized factors measured by the META assessment.
pub const FACTOR_COUNT: usize = 38;

/// Whether a higher T-score reflects better or worse adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    Positive,
    Negative,
}

impl Polarity {
    pub fn is_positive(self) -> bool {
        matches!(self, Polarity::Positive)
    }

    /// A difference is favorable only when it moves strictly in the better direction.
    pub fn is_favorable(self, diff: f64) -> bool {
        match self {
            Polarity::Positive => diff > 0.0,
            Polarity::Negative => diff < 0.0,
        }
    }

    /// Distance below (positive) or above (negative) the neutral T-score of 50.
    pub fn gap_from_ideal(self, score: f64) -> f64 {
        match self {
            Polarity::Positive => (50.0 - score).max(0.0),
            Polarity::Negative => (score - 50.0).max(0.0),
        }
    }

    /// Places an average T-score on a common "higher is better" scale.
    pub fn merit(self, avg_t: f64) -> f64 {
        match self {
            Polarity::Positive => avg_t,
            Polarity::Negative => 100.0 - avg_t,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Polarity::Positive => "positive",
            Polarity::Negative => "negative",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Personal,
    Academic,
    Relational,
    Family,
}

impl Domain {
    pub fn label(self) -> &'static str {
        match self {
            Domain::Personal => "개인",
            Domain::Academic => "학업",
            Domain::Relational => "관계",
            Domain::Family => "가정",
        }
    }
}

/// Reporting group used for class-level strength and weakness summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubCategory {
    SelfPerception,
    EmotionalDistress,
    RiskBehavior,
    AcademicBurnout,
    AcademicMotivation,
    LearningAttitude,
    PeerRelations,
    TeacherRelations,
    RelationalDifficulty,
    FamilyRelations,
    FamilyRisk,
}

impl SubCategory {
    pub fn ordered() -> [SubCategory; 11] {
        [
            SubCategory::SelfPerception,
            SubCategory::EmotionalDistress,
            SubCategory::RiskBehavior,
            SubCategory::AcademicBurnout,
            SubCategory::AcademicMotivation,
            SubCategory::LearningAttitude,
            SubCategory::PeerRelations,
            SubCategory::TeacherRelations,
            SubCategory::RelationalDifficulty,
            SubCategory::FamilyRelations,
            SubCategory::FamilyRisk,
        ]
    }

    pub fn label(self) -> &'static str {
        match self {
            SubCategory::SelfPerception => "자기인식",
            SubCategory::EmotionalDistress => "정서적 어려움",
            SubCategory::RiskBehavior => "위험행동",
            SubCategory::AcademicBurnout => "학업소진",
            SubCategory::AcademicMotivation => "학업동기",
            SubCategory::LearningAttitude => "학습태도",
            SubCategory::PeerRelations => "또래관계",
            SubCategory::TeacherRelations => "교사관계",
            SubCategory::RelationalDifficulty => "관계 어려움",
            SubCategory::FamilyRelations => "가족관계",
            SubCategory::FamilyRisk => "가정 위험",
        }
    }

    pub fn domain(self) -> Domain {
        match self {
            SubCategory::SelfPerception
            | SubCategory::EmotionalDistress
            | SubCategory::RiskBehavior => Domain::Personal,
            SubCategory::AcademicBurnout
            | SubCategory::AcademicMotivation
            | SubCategory::LearningAttitude => Domain::Academic,
            SubCategory::PeerRelations
            | SubCategory::TeacherRelations
            | SubCategory::RelationalDifficulty => Domain::Relational,
            SubCategory::FamilyRelations | SubCategory::FamilyRisk => Domain::Family,
        }
    }

    pub fn polarity(self) -> Polarity {
        match self {
            SubCategory::EmotionalDistress
            | SubCategory::RiskBehavior
            | SubCategory::AcademicBurnout
            | SubCategory::RelationalDifficulty
            | SubCategory::FamilyRisk => Polarity::Negative,
            _ => Polarity::Positive,
        }
    }
}

/// The 38 measured factors, declared in catalog index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorKind {
    SelfEsteem,
    SelfEfficacy,
    SelfRegulation,
    Resilience,
    Mindfulness,
    Depression,
    Anxiety,
    Anger,
    Stress,
    Aggression,
    Impulsivity,
    SmartphoneOveruse,
    Delinquency,
    EmotionalExhaustion,
    AcademicCynicism,
    AcademicInefficacy,
    IntrinsicMotivation,
    LearningEngagement,
    CareerGoals,
    ClassParticipation,
    AssignmentDiligence,
    TimeManagement,
    Friendship,
    PeerSupport,
    Cooperation,
    TeacherSupport,
    TeacherTrust,
    SchoolBelonging,
    PeerConflict,
    SocialWithdrawal,
    BullyingExperience,
    Loneliness,
    ParentalSupport,
    FamilyCohesion,
    ParentCommunication,
    FamilyConflict,
    AcademicPressure,
    Neglect,
}

impl FactorKind {
    pub const ALL: [FactorKind; FACTOR_COUNT] = [
        FactorKind::SelfEsteem,
        FactorKind::SelfEfficacy,
        FactorKind::SelfRegulation,
        FactorKind::Resilience,
        FactorKind::Mindfulness,
        FactorKind::Depression,
        FactorKind::Anxiety,
        FactorKind::Anger,
        FactorKind::Stress,
        FactorKind::Aggression,
        FactorKind::Impulsivity,
        FactorKind::SmartphoneOveruse,
        FactorKind::Delinquency,
        FactorKind::EmotionalExhaustion,
        FactorKind::AcademicCynicism,
        FactorKind::AcademicInefficacy,
        FactorKind::IntrinsicMotivation,
        FactorKind::LearningEngagement,
        FactorKind::CareerGoals,
        FactorKind::ClassParticipation,
        FactorKind::AssignmentDiligence,
        FactorKind::TimeManagement,
        FactorKind::Friendship,
        FactorKind::PeerSupport,
        FactorKind::Cooperation,
        FactorKind::TeacherSupport,
        FactorKind::TeacherTrust,
        FactorKind::SchoolBelonging,
        FactorKind::PeerConflict,
        FactorKind::SocialWithdrawal,
        FactorKind::BullyingExperience,
        FactorKind::Loneliness,
        FactorKind::ParentalSupport,
        FactorKind::FamilyCohesion,
        FactorKind::ParentCommunication,
        FactorKind::FamilyConflict,
        FactorKind::AcademicPressure,
        FactorKind::Neglect,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            FactorKind::SelfEsteem => "자아존중감",
            FactorKind::SelfEfficacy => "자기효능감",
            FactorKind::SelfRegulation => "자기조절",
            FactorKind::Resilience => "회복탄력성",
            FactorKind::Mindfulness => "마음챙김",
            FactorKind::Depression => "우울",
            FactorKind::Anxiety => "불안",
            FactorKind::Anger => "분노",
            FactorKind::Stress => "스트레스",
            FactorKind::Aggression => "공격성",
            FactorKind::Impulsivity => "충동성",
            FactorKind::SmartphoneOveruse => "스마트폰 과의존",
            FactorKind::Delinquency => "비행",
            FactorKind::EmotionalExhaustion => "정서적 탈진",
            FactorKind::AcademicCynicism => "학업 냉소",
            FactorKind::AcademicInefficacy => "학업 무능감",
            FactorKind::IntrinsicMotivation => "내재동기",
            FactorKind::LearningEngagement => "학습몰입",
            FactorKind::CareerGoals => "진로목표",
            FactorKind::ClassParticipation => "수업참여",
            FactorKind::AssignmentDiligence => "과제충실도",
            FactorKind::TimeManagement => "시간관리",
            FactorKind::Friendship => "교우관계",
            FactorKind::PeerSupport => "또래지지",
            FactorKind::Cooperation => "협동성",
            FactorKind::TeacherSupport => "교사지지",
            FactorKind::TeacherTrust => "교사신뢰",
            FactorKind::SchoolBelonging => "학교소속감",
            FactorKind::PeerConflict => "또래갈등",
            FactorKind::SocialWithdrawal => "사회적 위축",
            FactorKind::BullyingExperience => "따돌림 경험",
            FactorKind::Loneliness => "외로움",
            FactorKind::ParentalSupport => "부모지지",
            FactorKind::FamilyCohesion => "가족응집력",
            FactorKind::ParentCommunication => "부모와의 의사소통",
            FactorKind::FamilyConflict => "가정불화",
            FactorKind::AcademicPressure => "부모 학업압력",
            FactorKind::Neglect => "방임 경험",
        }
    }

    pub fn sub_category(self) -> SubCategory {
        use FactorKind::*;
        match self {
            SelfEsteem | SelfEfficacy | SelfRegulation | Resilience | Mindfulness => {
                SubCategory::SelfPerception
            }
            Depression | Anxiety | Anger | Stress => SubCategory::EmotionalDistress,
            Aggression | Impulsivity | SmartphoneOveruse | Delinquency => SubCategory::RiskBehavior,
            EmotionalExhaustion | AcademicCynicism | AcademicInefficacy => {
                SubCategory::AcademicBurnout
            }
            IntrinsicMotivation | LearningEngagement | CareerGoals => {
                SubCategory::AcademicMotivation
            }
            ClassParticipation | AssignmentDiligence | TimeManagement => {
                SubCategory::LearningAttitude
            }
            Friendship | PeerSupport | Cooperation => SubCategory::PeerRelations,
            TeacherSupport | TeacherTrust | SchoolBelonging => SubCategory::TeacherRelations,
            PeerConflict | SocialWithdrawal | BullyingExperience | Loneliness => {
                SubCategory::RelationalDifficulty
            }
            ParentalSupport | FamilyCohesion | ParentCommunication => SubCategory::FamilyRelations,
            FamilyConflict | AcademicPressure | Neglect => SubCategory::FamilyRisk,
        }
    }
}

/// Catalog row for a single factor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Factor {
    pub index: usize,
    pub kind: FactorKind,
    pub name: &'static str,
    pub domain: Domain,
    pub sub_category: SubCategory,
    pub polarity: Polarity,
}

impl Factor {
    fn from_kind(kind: FactorKind) -> Self {
        let sub_category = kind.sub_category();
        Self {
            index: kind.index(),
            kind,
            name: kind.label(),
            domain: sub_category.domain(),
            sub_category,
            polarity: sub_category.polarity(),
        }
    }
}

/// Immutable lookup table over the 38 factors, shared by reference.
#[derive(Debug, Clone)]
pub struct FactorCatalog {
    factors: Vec<Factor>,
}

impl FactorCatalog {
    pub fn standard() -> Self {
        Self {
            factors: FactorKind::ALL.into_iter().map(Factor::from_kind).collect(),
        }
    }

    pub fn factors(&self) -> &[Factor] {
        &self.factors
    }

    pub fn len(&self) -> usize {
        self.factors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Factor> {
        self.factors.get(index)
    }

    pub fn by_name(&self, name: &str) -> Option<&Factor> {
        let name = name.trim();
        self.factors.iter().find(|factor| factor.name == name)
    }

    pub fn members(&self, sub_category: SubCategory) -> impl Iterator<Item = &Factor> {
        self.factors
            .iter()
            .filter(move |factor| factor.sub_category == sub_category)
    }
}

impl Default for FactorCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_indexes_match_declaration_order() {
        let catalog = FactorCatalog::standard();
        assert_eq!(catalog.len(), FACTOR_COUNT);
        for (position, factor) in catalog.factors().iter().enumerate() {
            assert_eq!(factor.index, position);
            assert_eq!(factor.kind.index(), position);
        }
    }

    #[test]
    fn every_sub_category_has_members() {
        let catalog = FactorCatalog::standard();
        let total: usize = SubCategory::ordered()
            .into_iter()
            .map(|sub| catalog.members(sub).count())
            .sum();
        assert_eq!(total, FACTOR_COUNT);
        assert!(SubCategory::ordered()
            .into_iter()
            .all(|sub| catalog.members(sub).count() >= 3));
    }

    #[test]
    fn factors_inherit_sub_category_polarity() {
        let catalog = FactorCatalog::standard();
        let self_esteem = catalog.by_name("자아존중감").expect("self esteem listed");
        assert_eq!(self_esteem.polarity, Polarity::Positive);
        let exhaustion = catalog.get(FactorKind::EmotionalExhaustion.index()).expect("listed");
        assert_eq!(exhaustion.sub_category, SubCategory::AcademicBurnout);
        assert_eq!(exhaustion.polarity, Polarity::Negative);
    }

    #[test]
    fn favorable_direction_respects_polarity() {
        assert!(Polarity::Positive.is_favorable(3.0));
        assert!(!Polarity::Positive.is_favorable(-3.0));
        assert!(Polarity::Negative.is_favorable(-3.0));
        assert!(!Polarity::Negative.is_favorable(0.0));
        assert_eq!(Polarity::Negative.merit(65.0), 35.0);
        assert_eq!(Polarity::Positive.gap_from_ideal(30.0), 20.0);
        assert_eq!(Polarity::Negative.gap_from_ideal(30.0), 0.0);
    }
}
