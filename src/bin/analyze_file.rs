use contentguard_lib::load_config;
use contentguard_lib::models::{AnalysisRequest, ContentType};
use contentguard_lib::services::text_processor::{normalize_punctuation, preview};
use contentguard_lib::services::AnalysisEngine;

fn parse_arg_value(args: &[String], key: &str) -> Option<String> {
    args.iter()
        .position(|a| a == key)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!(
            "Usage:\n  cargo run --bin analyze_file -- <path.txt> [--type blog|academic|marketing|general] [--out <json_path>]\n\nNotes:\n  - Providers are taken from the same config file and environment as the server.\n  - Without any provider keys the report uses local scoring only."
        );
        return Ok(());
    }

    let path = args[1].clone();
    let content_type = match parse_arg_value(&args, "--type") {
        Some(t) => Some(ContentType::from_str(&t).ok_or_else(|| format!("unknown content type: {}", t))?),
        None => None,
    };
    let out_path = parse_arg_value(&args, "--out");

    let raw = std::fs::read_to_string(&path).map_err(|e| format!("read file failed: {}", e))?;
    let text = normalize_punctuation(&raw);
    if text.is_empty() {
        return Err(format!("{} contains no text", path));
    }

    let config = load_config().map_err(|e| format!("{:#}", e))?;
    let engine = AnalysisEngine::from_config(&config);
    let strategy = engine.strategy_info().await;

    println!("File: {}", path);
    println!("Text: {} chars ({} bytes)", text.chars().count(), text.len());
    println!("Strategy: {}", strategy.strategy.as_str());
    println!();

    let request = AnalysisRequest {
        content: text,
        content_type,
        language: None,
    };
    let report = engine.analyze(&request).await;

    let ai = &report.ai_detection;
    println!("AI probability: {:.1}% ({:?})", ai.probability, ai.confidence);
    println!("  {}", preview(&ai.reasoning, 160));
    for p in &ai.highlighted_phrases {
        println!("  [{}..{}] {}  ({})", p.start_index, p.end_index, preview(&p.text, 60), p.reason);
    }

    let orig = &report.originality;
    println!(
        "Originality: {} / 100{}",
        orig.originality_score,
        if orig.is_plagiarized { "  (flagged)" } else { "" }
    );

    println!("Copyright risk: {:?}", report.copyright_risk.risk_level);
    for d in &report.copyright_risk.detected_content {
        println!("  {:?} {:.1}  {}", d.content_type, d.confidence, preview(&d.content, 80));
    }

    println!("E-E-A-T score: {:.1}", report.seo_assessment.score);
    for v in &report.seo_assessment.eeat_violations {
        println!("  {:?}/{:?}  {}", v.category, v.severity, v.description);
    }

    println!("Disclosure ({:?}): {}", report.disclosure_statement.placement, report.disclosure_statement.statement);
    println!();
    println!("Overall risk: {:?}", report.overall_risk);

    if let Some(out_path) = out_path {
        let json = serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?;
        std::fs::write(&out_path, json).map_err(|e| format!("write out failed: {}", e))?;
        println!();
        println!("Wrote JSON: {}", out_path);
    }

    Ok(())
}
