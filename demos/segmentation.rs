use cohort::{
    filter_by_category, Algorithm, Dbscan, FeatureMatrixBuilder, IndividualScorer, Kmeans,
    MissingValuePolicy, OutlierPolicy, Record, SegmentationEngine, Value,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Minimal end-to-end walkthrough: records -> matrix -> segmentation ->
    // recommendations, plus the independent what-if scorer.
    tracing_subscriber::fmt().with_target(false).init();

    // A small synthetic customer table with the usual blemishes: one missing
    // balance, one absurd outlier.
    let mut records = Vec::new();
    for i in 0..20 {
        let (age, balance, job) = if i < 10 {
            (24.0 + i as f64, 800.0 + 40.0 * i as f64, "student")
        } else {
            (48.0 + i as f64, 52_000.0 + 900.0 * i as f64, "manager")
        };
        records.push(
            Record::new()
                .with("age", age)
                .with("balance", balance)
                .with("job", job),
        );
    }
    records[3].set("balance", Value::Missing);
    records.push(
        Record::new()
            .with("age", 39.0)
            .with("balance", 9_000_000.0)
            .with("job", "manager"),
    );

    let matrix = FeatureMatrixBuilder::new(["age", "balance", "job"])
        .with_missing_values(MissingValuePolicy::ImputeMeanMode)
        .with_outliers(OutlierPolicy::IqrTrim)
        .build(&records)?;

    let summary = matrix.summary();
    println!(
        "matrix: {} rows x {} columns {:?}",
        summary.n_rows,
        summary.n_columns,
        matrix.columns()
    );

    // Partitioning run.
    let mut engine = SegmentationEngine::new(matrix);
    let outcome = engine.run(&Algorithm::Partitioning(Kmeans::new(2).with_seed(42)))?;
    match outcome.evaluation.coefficient {
        Some(score) => println!("k-means silhouette: {score:.4}"),
        None => println!("k-means silhouette: undefined"),
    }
    for profile in &outcome.evaluation.profiles {
        println!("  segment {}: {} members", profile.label, profile.count);
    }

    let recommendations = engine.recommendations()?;
    for rec in recommendations.iter().take(3) {
        println!(
            "  row {} (segment {}): {} [{}]",
            rec.row, rec.label, rec.product, rec.category
        );
    }
    let savings = filter_by_category(&recommendations, "savings")?;
    println!("  {} rows fall in the savings category", savings.len());

    // Density run over the same matrix: cluster count is discovered, and
    // sparse rows come back as noise (label -1).
    let outcome = engine.run(&Algorithm::Density(Dbscan::new(0.4, 3)))?;
    println!(
        "dbscan: {} clusters, {} noise rows",
        outcome.assignment.segments().len(),
        outcome.assignment.noise_count()
    );

    // The what-if path needs no clustering at all.
    let mut scorer = IndividualScorer::new();
    for (age, tx) in [(16, 50), (60, 2), (27, 18)] {
        match scorer.score(age, tx) {
            Some(result) => {
                println!("prospect (age {age}, {tx} tx/mo): {} ({}/100)", result.product, result.score)
            }
            None => println!("prospect (age {age}, {tx} tx/mo): ineligible"),
        }
    }
    scorer.record_feedback("digital savings", 5);
    println!("feedback entries: {}", scorer.feedback().len());

    Ok(())
}
