//! End-to-end fatigue scoring walkthrough: literal baseline, one live window,
//! then a pre/post shift review.

use pearl_fatigue::{
    compare_shift_phases, BaselineProfile, FatigueModel, MetricMap, MetricStatistics,
    PersonalProfile, ShiftPhaseSnapshot,
};

fn metric_map(entries: &[(&str, f64)]) -> MetricMap {
    entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

fn main() {
    // Baseline derived from pre-shift calibration samples
    let baseline = BaselineProfile::new([
        ("response_delay", MetricStatistics::new(1.2, 0.2)),
        ("resolution_latency", MetricStatistics::new(2.5, 0.4)),
        ("blink_rate", MetricStatistics::new(18.0, 3.0)),
        ("yawn_frequency", MetricStatistics::new(0.2, 0.1)),
        ("pause_ratio", MetricStatistics::new(0.15, 0.05)),
        ("tone_stability", MetricStatistics::new(0.75, 0.05)),
        ("reaction_time_game", MetricStatistics::new(320.0, 25.0)),
        ("hesitation_frequency", MetricStatistics::new(0.04, 0.02)),
        ("posture_stability", MetricStatistics::new(0.82, 0.06)),
        ("workload_index", MetricStatistics::new(0.35, 0.1)),
        ("heart_stress_proxy", MetricStatistics::new(0.3, 0.05)),
    ]);

    // During-shift metrics captured in the latest window
    let current = metric_map(&[
        ("response_delay", 1.45),
        ("resolution_latency", 3.0),
        ("blink_rate", 25.0),
        ("yawn_frequency", 0.4),
        ("pause_ratio", 0.25),
        ("tone_stability", 0.65),
        ("reaction_time_game", 360.0),
        ("hesitation_frequency", 0.07),
        ("posture_stability", 0.7),
        ("workload_index", 0.55),
        ("heart_stress_proxy", 0.45),
    ]);

    let profile = PersonalProfile::new(4.0)
        .with_health_risk(0.2)
        .with_age(37)
        .with_self_report(2.0);

    let result = FatigueModel::new().compute_score(&baseline, &current, &profile, Some(0.6));

    println!("Fatigue score: {:.2} ({})", result.score, result.level);
    println!("Recommendation: {}", result.recommendation);
    println!("Top contributing factors:");
    for factor in &result.top_factors {
        println!(
            "  - {}: contribution={:.3}, risk={:.2}",
            factor.name, factor.contribution, factor.risk
        );
    }

    let mut post = current.clone();
    post.insert("reaction_time_game".to_string(), 390.0);
    post.insert("blink_rate".to_string(), 28.0);

    let review = compare_shift_phases(
        &ShiftPhaseSnapshot::new("Pre", current),
        &ShiftPhaseSnapshot::new("Post", post),
        0.08,
    );
    println!("\nShift review summary:");
    println!("{}", review.summary());
}
