// Colored terminal output for classification runs.

use colored::Colorize;

use crate::pipeline::classify::Summary;

/// Display the end-of-run statistics.
pub fn display_summary(title: &str, summary: &Summary) {
    println!("\n{}", format!("=== {title} ===").bold());
    println!("  Total records: {}", summary.total);

    let relevant = format!(
        "{} ({:.1}%)",
        summary.relevant,
        summary.relevant_pct()
    );
    let relevant = if summary.relevant > 0 {
        relevant.green()
    } else {
        relevant.dimmed()
    };
    println!("  Relevant to UAE education: {relevant}");
    println!("  Title-based relevance: {}", summary.title_relevant);
    println!("  Answer-based relevance: {}", summary.answer_relevant);
    println!(
        "  {}",
        format!("(threshold: entailment > {:.2})", summary.threshold).dimmed()
    );
}

/// Display ad-hoc scores for individual texts.
pub fn display_text_scores(texts: &[String], scores: &[f64], threshold: f64) {
    println!(
        "\n  {:>6}  {:<10}  {}",
        "Score".dimmed(),
        "Label".dimmed(),
        "Text".dimmed()
    );
    println!("  {}", "-".repeat(78).dimmed());

    for (text, &score) in texts.iter().zip(scores) {
        let label = if score > threshold {
            "relevant".green().bold()
        } else {
            "irrelevant".dimmed()
        };
        println!(
            "  {:>6.3}  {:<10}  {}",
            score,
            label,
            super::truncate_chars(text, 60)
        );
    }
    println!();
}
