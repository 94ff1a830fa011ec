//! `cvagent doctor`: diagnose configuration.

use cvagent_agent::SubjectResolver;
use cvagent_config::AppConfig;
use cvagent_providers::build_from_config;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 cvagent Doctor: Configuration Diagnostics");
    println!("===========================================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("  ✅ Config file found");
    } else {
        println!("  ⚠️  No config file, using defaults. Run `cvagent onboard` to create one");
        issues += 1;
    }

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Config valid");
            config
        }
        Err(e) => {
            println!("  ❌ Config invalid: {e}");
            println!();
            println!("  ⚠️  {} issue(s) found. See above for details.", issues + 1);
            return Ok(());
        }
    };

    if config.has_api_key() {
        println!("  ✅ API key configured for '{}'", config.default_provider);
    } else {
        println!("  ❌ No API key: set GROQ_API_KEY or add api_key to config.toml");
        issues += 1;
    }

    match &config.retrieval.index_host {
        Some(host) => println!("  ✅ Index host: {host}"),
        None => {
            println!("  ⚠️  No index host: set PINECONE_INDEX_HOST, answers will have no context");
            issues += 1;
        }
    }

    if config.retrieval.index_host.is_some() && config.retrieval.index_api_key.is_none() {
        println!("  ❌ No index API key: set PINECONE_API_KEY");
        issues += 1;
    }

    let embedder = config.embedding_provider();
    if config.can_embed() {
        println!("  ✅ Embeddings: {} via '{embedder}'", config.retrieval.embedding_model);
    } else {
        // Only reached without an index host; validation rejects the rest.
        println!("  ⚠️  Embedding provider '{embedder}' has no /embeddings endpoint");
        println!("      Set retrieval.embedding_provider before adding an index host");
        issues += 1;
    }

    if config.has_api_key() {
        issues += check_providers(&config).await;
    }

    match SubjectResolver::new(config.subjects(), &config.default_subject) {
        Ok(resolver) => println!(
            "  ✅ {} subject(s), default '{}'",
            resolver.subjects().count(),
            resolver.default_subject().display_name
        ),
        Err(e) => {
            println!("  ❌ Subject patterns invalid: {e}");
            issues += 1;
        }
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}

/// Ping the chat and embedding providers. Returns the number of failures.
async fn check_providers(config: &AppConfig) -> usize {
    let router = build_from_config(config);
    let mut targets = vec![("Chat", router.default())];
    if config.embedding_provider() != config.default_provider {
        targets.push(("Embedding", router.embedding()));
    }

    let mut failures = 0;
    for (role, provider) in targets {
        let Some(provider) = provider else {
            println!("  ❌ {role} provider not configured");
            failures += 1;
            continue;
        };
        match provider.health_check().await {
            Ok(true) => println!("  ✅ {role} provider '{}' reachable", provider.name()),
            Ok(false) => {
                println!("  ❌ {role} provider '{}' rejected the request (check the API key)", provider.name());
                failures += 1;
            }
            Err(e) => {
                println!("  ❌ {role} provider '{}' unreachable: {e}", provider.name());
                failures += 1;
            }
        }
    }
    failures
}
