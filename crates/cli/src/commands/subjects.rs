//! `cvagent subjects`: show who can be asked about, and how questions route.

use cvagent_agent::SubjectResolver;
use cvagent_config::AppConfig;

pub async fn run(resolve: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let resolver = SubjectResolver::new(config.subjects(), &config.default_subject)?;

    println!();
    println!("  Configured subjects:");
    println!();
    for subject in resolver.subjects() {
        let marker = if subject.namespace_id == resolver.default_subject().namespace_id {
            " (default)"
        } else {
            ""
        };
        println!("  • {}{marker}", subject.display_name);
        println!("      namespace:  {}", subject.namespace_id);
        println!("      capability: {}", subject.capability_name());
        println!("      patterns:   {}", subject.match_patterns.join(", "));
    }
    println!();

    if let Some(text) = resolve {
        let names: Vec<&str> = resolver
            .resolve_subjects(&text)
            .into_iter()
            .map(|s| s.display_name.as_str())
            .collect();
        println!("  \"{text}\" → {}", names.join(", "));
        println!();
    }

    Ok(())
}
