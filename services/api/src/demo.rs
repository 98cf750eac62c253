use crate::infra::{engine_from_config, parse_level, parse_scores, ScoreVector};
use clap::Args;
use meta_profile::assessment::{
    AssessmentError, AssessmentRequest, ClassAnalysis, Classification, FactorDeviation,
    ProfilingEngine, RankedIntervention, ReliabilityWarning, RosterImporter, SchoolLevel,
    StudentId, StudentRecord,
};
use meta_profile::config::AppConfig;
use meta_profile::error::AppError;
use serde::Serialize;
use std::path::PathBuf;

const DEMO_ROUND: u32 = 1;

#[derive(Args, Debug)]
pub(crate) struct ClassifyArgs {
    /// School level (elementary, middle, high or the Korean name)
    #[arg(long, value_parser = parse_level)]
    pub(crate) level: SchoolLevel,
    /// Comma separated T-scores, one per factor in catalog order
    #[arg(long, value_parser = parse_scores)]
    pub(crate) scores: ScoreVector,
    /// Number of deviations to report (defaults to the configured count)
    #[arg(long)]
    pub(crate) top_n: Option<usize>,
    /// Print the result as JSON instead of a text summary
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ClassProfileArgs {
    /// Roster CSV export with student_id, round, warnings and one column per factor
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Test round to aggregate
    #[arg(long, default_value_t = 1)]
    pub(crate) round: u32,
    /// Print the result as JSON instead of a text summary
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// School level whose types seed the synthetic class
    #[arg(long, value_parser = parse_level, default_value = "middle")]
    pub(crate) level: SchoolLevel,
    /// Synthetic students generated around each type's mean vector
    #[arg(long, default_value_t = 3)]
    pub(crate) students_per_type: usize,
}

#[derive(Serialize)]
struct ClassifyOutput<'a> {
    classification: &'a Classification,
    deviations: &'a [FactorDeviation],
    interventions: &'a [RankedIntervention],
}

pub(crate) fn run_classify(args: ClassifyArgs) -> Result<(), AppError> {
    let ClassifyArgs {
        level,
        scores: ScoreVector(scores),
        top_n,
        json,
    } = args;

    let engine = engine_from_config(&AppConfig::load()?)?;
    let classification = engine.classify(level, &scores)?;
    let deviations =
        engine.deviations(level, &classification.predicted_type, &scores, top_n)?;
    let interventions =
        engine.rank_interventions(level, &classification.predicted_type, Some(&scores))?;

    if json {
        return print_json(&ClassifyOutput {
            classification: &classification,
            deviations: &deviations,
            interventions: &interventions,
        });
    }

    render_classification(&classification);
    render_deviations(&deviations);
    render_interventions(&interventions);
    Ok(())
}

pub(crate) fn run_class_profile(args: ClassProfileArgs) -> Result<(), AppError> {
    let ClassProfileArgs { csv, round, json } = args;

    let engine = engine_from_config(&AppConfig::load()?)?;
    let students = RosterImporter::from_path(engine.catalog(), &csv)?;
    let analysis = engine.class_profile(&students, round);

    if json {
        return print_json(&analysis);
    }

    println!(
        "Roster {} ({} students)",
        csv.display(),
        students.len()
    );
    render_class_analysis(&analysis);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        level,
        students_per_type,
    } = args;

    let engine = engine_from_config(&AppConfig::load()?)?;
    println!(
        "META profile demo: {} ({}), store {}",
        level.label(),
        level,
        engine.store().version
    );

    let students = synthetic_class(&engine, level, students_per_type)?;
    if let Some(record) = students.first() {
        if let Some(result) = record
            .assessment_for(DEMO_ROUND)
            .and_then(|assessment| assessment.result.as_ref())
        {
            println!("\nDeviations for {}", record.student_id);
            render_deviations(&result.deviations);
        }
    }

    println!("\nClass profile for round {DEMO_ROUND}");
    render_class_analysis(&engine.class_profile(&students, DEMO_ROUND));
    Ok(())
}

/// Assesses students scattered around each type's mean vector. The first
/// student of the last type is flagged so the reliability filter shows up.
fn synthetic_class(
    engine: &ProfilingEngine,
    level: SchoolLevel,
    students_per_type: usize,
) -> Result<Vec<StudentRecord>, AppError> {
    let types = engine
        .store()
        .types(level)
        .map_err(AssessmentError::from)?;
    let last_type = types.len().saturating_sub(1);

    println!("\nSynthetic class");
    let mut students = Vec::new();
    for (type_position, profile) in types.iter().enumerate() {
        let Some(means) = profile.complete_means() else {
            println!("- skipping {}: no mean vector", profile.name);
            continue;
        };

        for member in 0..students_per_type {
            let student_id = StudentId(format!("demo-{}{:02}", type_position + 1, member + 1));
            let warnings = if type_position == last_type && member == 0 {
                vec![ReliabilityWarning::CarelessResponding]
            } else {
                Vec::new()
            };

            let report = engine.assess(AssessmentRequest {
                student_id: student_id.clone(),
                round: DEMO_ROUND,
                school_level: level,
                scores: jitter(means, type_position + member),
                warnings,
                assessed_on: None,
            })?;

            let top = report
                .interventions
                .first()
                .map(|entry| format!("{} ({})", intervention_label(entry), entry.relevance_score))
                .unwrap_or_else(|| "no interventions".to_string());
            println!(
                "- {} [{}]: {} {:.1}% | {}",
                student_id,
                profile.name,
                report.classification.predicted_type,
                report.classification.confidence,
                top
            );

            students.push(StudentRecord {
                student_id,
                assessments: vec![report.assessment],
            });
        }
    }

    Ok(students)
}

/// Deterministic spread of up to five T points around each mean.
fn jitter(means: &[f64], seed: usize) -> Vec<f64> {
    means
        .iter()
        .enumerate()
        .map(|(index, mean)| {
            let offset = ((index * 7 + seed * 5) % 11) as f64 - 5.0;
            (mean + offset).clamp(20.0, 80.0)
        })
        .collect()
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    let rendered = serde_json::to_string_pretty(value).map_err(std::io::Error::from)?;
    println!("{rendered}");
    Ok(())
}

fn render_classification(classification: &Classification) {
    println!(
        "Predicted type: {} ({:.1}% confidence, {})",
        classification.predicted_type,
        classification.confidence,
        classification.school_level.label()
    );
    for entry in &classification.rank {
        println!("  - {}: {:.2}%", entry.type_name, entry.probability);
    }
}

fn render_deviations(deviations: &[FactorDeviation]) {
    println!("Largest deviations from the type mean:");
    for deviation in deviations {
        println!(
            "  - {}: T={:.1} vs {:.1} ({:+.1}, {})",
            deviation.factor,
            deviation.score,
            deviation.type_mean,
            deviation.diff,
            deviation.direction.label()
        );
    }
}

fn render_interventions(interventions: &[RankedIntervention]) {
    println!("Recommended interventions:");
    for entry in interventions {
        println!(
            "  - [{:>3}] {} | {}",
            entry.relevance_score,
            intervention_label(entry),
            entry.relevance_reason
        );
        for strategy in &entry.template.strategies {
            println!("        * {strategy}");
        }
    }
}

fn intervention_label(entry: &RankedIntervention) -> String {
    let template = &entry.template;
    match &template.z {
        Some(z) => format!("{} x {} -> {}", template.x.label, z.label, template.y),
        None => format!("{} -> {}", template.x.label, template.y),
    }
}

fn render_class_analysis(analysis: &ClassAnalysis) {
    let profile = match analysis {
        ClassAnalysis::NoData { round } => {
            println!("No assessments recorded for round {round}");
            return;
        }
        ClassAnalysis::Profile(profile) => profile,
    };

    println!(
        "- {} students analysed ({} without reliability warnings)",
        profile.student_count, profile.reliable_count
    );
    if profile.used_unfiltered_fallback {
        println!("- every assessment carried a warning; results use the unfiltered set");
    }

    println!("Strengths:");
    for item in &profile.strengths {
        println!(
            "  - {}: avg T {:.1} (merit {:.1}), led by {} ({:.1})",
            item.label, item.avg_t, item.merit_score, item.top_factor, item.top_factor_avg_t
        );
    }
    println!("Weaknesses:");
    for item in &profile.weaknesses {
        println!(
            "  - {}: avg T {:.1} (merit {:.1}), driven by {} ({:.1})",
            item.label, item.avg_t, item.merit_score, item.top_factor, item.top_factor_avg_t
        );
    }
}
