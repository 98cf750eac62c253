use std::collections::BTreeMap;

use super::{EffectType, EvidenceSource, FactorRef, InterventionTemplate, ProfileStore, TypeProfile};
use crate::assessment::catalog::{FactorKind, SubCategory};
use crate::assessment::domain::{round_to_tenth, SchoolLevel};

const STANDARD_VERSION: &str = "2025.1-standard";

struct TypeBlueprint {
    name: &'static str,
    description: &'static str,
    /// Sub-category shift away from T=50; unlisted sub-categories stay neutral.
    offsets: &'static [(SubCategory, f64)],
    /// Elementary, middle, high.
    priors: [f64; 3],
    interventions: fn() -> Vec<InterventionTemplate>,
}

const BLUEPRINTS: [TypeBlueprint; 4] = [
    TypeBlueprint {
        name: "적응형",
        description: "전반적으로 안정적인 적응 수준을 보이는 유형",
        offsets: &[
            (SubCategory::SelfPerception, 7.0),
            (SubCategory::EmotionalDistress, -6.0),
            (SubCategory::RiskBehavior, -5.0),
            (SubCategory::AcademicBurnout, -6.0),
            (SubCategory::AcademicMotivation, 6.0),
            (SubCategory::LearningAttitude, 6.0),
            (SubCategory::PeerRelations, 5.0),
            (SubCategory::TeacherRelations, 5.0),
            (SubCategory::RelationalDifficulty, -5.0),
            (SubCategory::FamilyRelations, 5.0),
            (SubCategory::FamilyRisk, -4.0),
        ],
        priors: [0.46, 0.42, 0.40],
        interventions: adaptive_interventions,
    },
    TypeBlueprint {
        name: "정서위기형",
        description: "우울·불안 등 정서적 어려움이 두드러지는 유형",
        offsets: &[
            (SubCategory::SelfPerception, -10.0),
            (SubCategory::EmotionalDistress, 13.0),
            (SubCategory::RiskBehavior, 3.0),
            (SubCategory::AcademicBurnout, 5.0),
            (SubCategory::AcademicMotivation, -4.0),
            (SubCategory::RelationalDifficulty, 6.0),
            (SubCategory::FamilyRelations, -4.0),
            (SubCategory::FamilyRisk, 5.0),
        ],
        priors: [0.18, 0.22, 0.24],
        interventions: distress_interventions,
    },
    TypeBlueprint {
        name: "학업소진형",
        description: "학업 부담으로 인한 소진과 동기 저하가 나타나는 유형",
        offsets: &[
            (SubCategory::SelfPerception, -4.0),
            (SubCategory::EmotionalDistress, 5.0),
            (SubCategory::AcademicBurnout, 13.0),
            (SubCategory::AcademicMotivation, -10.0),
            (SubCategory::LearningAttitude, -8.0),
            (SubCategory::FamilyRisk, 6.0),
        ],
        priors: [0.16, 0.20, 0.24],
        interventions: burnout_interventions,
    },
    TypeBlueprint {
        name: "관계위축형",
        description: "또래·교사 관계에서 위축과 고립이 관찰되는 유형",
        offsets: &[
            (SubCategory::SelfPerception, -5.0),
            (SubCategory::EmotionalDistress, 4.0),
            (SubCategory::PeerRelations, -11.0),
            (SubCategory::TeacherRelations, -6.0),
            (SubCategory::RelationalDifficulty, 12.0),
        ],
        priors: [0.20, 0.16, 0.12],
        interventions: withdrawn_interventions,
    },
];

pub(super) fn standard_store() -> ProfileStore {
    let levels = SchoolLevel::ordered()
        .into_iter()
        .enumerate()
        .map(|(position, level)| {
            let types = BLUEPRINTS
                .iter()
                .map(|blueprint| TypeProfile {
                    name: blueprint.name.to_string(),
                    description: blueprint.description.to_string(),
                    means: Some(blueprint_means(blueprint, level_scale(level))),
                    prior: blueprint.priors[position],
                    interventions: (blueprint.interventions)(),
                })
                .collect();
            (level, types)
        })
        .collect::<BTreeMap<_, _>>();

    ProfileStore {
        version: STANDARD_VERSION.to_string(),
        levels,
    }
}

fn level_scale(level: SchoolLevel) -> f64 {
    match level {
        SchoolLevel::Elementary => 0.85,
        SchoolLevel::Middle => 1.0,
        SchoolLevel::High => 1.1,
    }
}

fn blueprint_means(blueprint: &TypeBlueprint, scale: f64) -> Vec<f64> {
    let mut member_position = BTreeMap::<SubCategory, usize>::new();

    FactorKind::ALL
        .iter()
        .map(|kind| {
            let sub_category = kind.sub_category();
            let position = member_position.entry(sub_category).or_insert(0);
            let taper = 1.0 - 0.08 * (*position as f64);
            *position += 1;

            let offset = blueprint
                .offsets
                .iter()
                .find(|(sub, _)| *sub == sub_category)
                .map(|(_, offset)| *offset)
                .unwrap_or(0.0);

            round_to_tenth(50.0 + offset * scale * taper)
        })
        .collect()
}

fn factor_ref(kinds: &[FactorKind]) -> FactorRef {
    FactorRef {
        label: kinds
            .iter()
            .map(|kind| kind.label())
            .collect::<Vec<_>>()
            .join("·"),
        factors: kinds.iter().map(|kind| kind.index()).collect(),
    }
}

#[allow(clippy::too_many_arguments)]
fn template(
    x: &[FactorKind],
    z: Option<&[FactorKind]>,
    y: &str,
    effect_type: EffectType,
    beta: Option<f64>,
    source: EvidenceSource,
    interpretation: &str,
    strategies: &[&str],
) -> InterventionTemplate {
    InterventionTemplate {
        x: factor_ref(x),
        z: z.map(factor_ref),
        y: y.to_string(),
        effect_type,
        beta,
        source,
        interpretation: interpretation.to_string(),
        strategies: strategies.iter().map(|s| s.to_string()).collect(),
    }
}

fn adaptive_interventions() -> Vec<InterventionTemplate> {
    use FactorKind::*;
    vec![
        template(
            &[SelfEfficacy, CareerGoals],
            None,
            "학업성취",
            EffectType::Direct,
            Some(0.31),
            EvidenceSource::Kg,
            "자기효능감과 진로목표가 뚜렷할수록 학업성취가 높아집니다.",
            &["강점 기반 목표 설정 면담", "진로 탐색 프로젝트에서 리더 역할 부여"],
        ),
        template(
            &[PeerSupport, Cooperation],
            Some(&[SchoolBelonging]),
            "학교적응",
            EffectType::Moderation,
            Some(0.22),
            EvidenceSource::KgIntervention,
            "학교소속감이 높을 때 또래지지가 학교적응에 미치는 효과가 커집니다.",
            &["또래 멘토링 프로그램 참여", "협동 학습 모둠장 역할"],
        ),
        template(
            &[SmartphoneOveruse],
            None,
            "생활습관",
            EffectType::Direct,
            None,
            EvidenceSource::Inferred,
            "안정적인 유형이라도 스마트폰 사용 습관은 꾸준한 점검이 필요합니다.",
            &["디지털 사용 자기점검표 작성", "가정 연계 사용 약속 정하기"],
        ),
    ]
}

fn distress_interventions() -> Vec<InterventionTemplate> {
    use FactorKind::*;
    vec![
        template(
            &[Depression, Anxiety],
            None,
            "학교적응",
            EffectType::Direct,
            Some(-0.42),
            EvidenceSource::Kg,
            "우울과 불안이 높을수록 학교적응이 어려워집니다.",
            &["Wee클래스 상담 연계", "정서 일기 쓰기", "주 1회 담임 체크인"],
        ),
        template(
            &[SelfEsteem],
            Some(&[TeacherSupport]),
            "우울",
            EffectType::Moderation,
            Some(-0.28),
            EvidenceSource::KgIntervention,
            "교사지지가 자아존중감의 우울 완충 효과를 강화합니다.",
            &["구체적인 칭찬 피드백", "작은 성공 경험 설계"],
        ),
        template(
            &[Stress, Anger],
            Some(&[SelfRegulation]),
            "공격성",
            EffectType::Mediation,
            Some(0.19),
            EvidenceSource::Kg,
            "스트레스가 분노를 거쳐 공격적 행동으로 이어질 수 있습니다.",
            &["호흡·이완 훈련", "감정 조절 단계 카드 활용"],
        ),
        template(
            &[Mindfulness, Resilience],
            None,
            "정서적 안정",
            EffectType::Direct,
            None,
            EvidenceSource::Inferred,
            "마음챙김과 회복탄력성은 정서 회복의 보호 요인입니다.",
            &["아침 3분 마음챙김 루틴", "회복 경험 나누기 활동"],
        ),
    ]
}

fn burnout_interventions() -> Vec<InterventionTemplate> {
    use FactorKind::*;
    vec![
        template(
            &[EmotionalExhaustion, AcademicCynicism],
            None,
            "학업성취",
            EffectType::Direct,
            Some(-0.35),
            EvidenceSource::Kg,
            "정서적 탈진과 학업 냉소는 학업성취를 떨어뜨립니다.",
            &["학습량 조절 및 휴식 계획", "단기 목표 쪼개기"],
        ),
        template(
            &[IntrinsicMotivation],
            Some(&[AcademicPressure]),
            "학습몰입",
            EffectType::Moderation,
            Some(0.27),
            EvidenceSource::KgIntervention,
            "부모 학업압력이 클수록 내재동기의 몰입 효과가 약해집니다.",
            &["흥미 기반 과제 선택권 부여", "학부모 상담으로 기대 수준 조율"],
        ),
        template(
            &[TimeManagement, AssignmentDiligence],
            None,
            "학업소진",
            EffectType::Direct,
            Some(-0.18),
            EvidenceSource::Inferred,
            "시간관리와 과제 습관이 잡히면 소진 위험이 줄어듭니다.",
            &["주간 플래너 코칭", "과제 점검 루틴 만들기"],
        ),
    ]
}

fn withdrawn_interventions() -> Vec<InterventionTemplate> {
    use FactorKind::*;
    vec![
        template(
            &[SocialWithdrawal, Loneliness],
            None,
            "학교적응",
            EffectType::Direct,
            Some(-0.33),
            EvidenceSource::Kg,
            "사회적 위축과 외로움은 학교적응을 어렵게 합니다.",
            &["소그룹 활동 배치", "관심사 기반 동아리 연결"],
        ),
        template(
            &[Friendship],
            Some(&[BullyingExperience]),
            "우울",
            EffectType::Moderation,
            Some(-0.24),
            EvidenceSource::KgIntervention,
            "따돌림 경험이 있을 때 교우관계의 보호 효과가 약해집니다.",
            &["학급 관계 지도 점검", "또래 도우미 지정"],
        ),
        template(
            &[TeacherTrust, TeacherSupport],
            None,
            "학교소속감",
            EffectType::Correlation,
            None,
            EvidenceSource::Inferred,
            "교사와의 신뢰 관계는 소속감 회복의 출발점입니다.",
            &["정기 1:1 대화 시간", "교실 내 역할 부여"],
        ),
    ]
}
