//! Basic example walking through an experiment from planning to readout.
//!
//! This example shows how to:
//! 1. Project the MDE over the planned runtime
//! 2. Check the traffic split for SRM
//! 3. Check two concurrent experiments for interaction
//! 4. Test conversion rates and revenue per visitor

use pivot_point::prelude::*;

fn main() -> Result<()> {
    println!("=== Pivot Point Example ===\n");

    let thresholds = Thresholds::default();

    // Plan
    println!("=== Planning ===\n");
    let params = PowerParameters::default();
    let projection = project_runtime(40_000, 1_200, 3, &params, DEFAULT_WEEKS)?;
    println!("{}", projection);
    if let Some(advisory) = thresholds.check_projection(&projection) {
        println!("Warning: {}\n", advisory);
    }

    // Data quality
    println!("=== Data Quality ===\n");
    let srm = srm_test(&[80_120, 79_650, 80_230], None)?;
    println!("SRM: {}", srm);
    match thresholds.check_srm(&srm) {
        Some(advisory) => println!("Warning: {}", advisory),
        None => println!("No SRM detected."),
    }

    let overlap = ContingencyTable::new(vec![vec![40_100, 39_900], vec![40_050, 39_950]])?;
    let interaction = interaction_test(&overlap)?;
    println!("Interaction: {}", interaction);
    match thresholds.check_interaction(&interaction) {
        Some(advisory) => println!("Warning: {}", advisory),
        None => println!("No traffic interaction detected."),
    }
    println!();

    // Conversion rate readout
    println!("=== Conversion Rate ===\n");
    let control = ProportionSample::new(80_120, 2_404)?;
    let variants = vec![
        ProportionSample::new(79_650, 2_551)?,
        ProportionSample::new(80_230, 2_390)?,
    ];
    let results = multi_variant_test(&control, &variants, params.alpha, Alternative::TwoSided)?;
    println!("{}", results);

    for (comparison, variant) in results.comparisons.iter().zip(&variants) {
        let ci = diff_confidence_interval(&control, variant, results.corrected_alpha)?;
        println!(
            "  {}: difference {:.3} PP, CI [{:.3}, {:.3}]",
            comparison.label,
            ci.estimate * 100.0,
            ci.lower * 100.0,
            ci.upper * 100.0
        );
    }
    println!();

    // Revenue readout
    println!("=== Revenue per Visitor ===\n");
    let orders = |n: usize, base: f64| -> Vec<f64> {
        (0..n).map(|i| base + (i % 11) as f64 * 4.5).collect()
    };
    let control_revenue = ContinuousSample::new(2_000, orders(60, 35.0))?;
    let variant_revenue = ContinuousSample::new(2_000, orders(78, 35.0))?;
    println!(
        "Control RPV: {:.3}, variant RPV: {:.3}",
        control_revenue.revenue_per_visitor(),
        variant_revenue.revenue_per_visitor()
    );
    let t = means_test(&control_revenue, &variant_revenue, Alternative::TwoSided)?;
    println!("{}", t);

    Ok(())
}
