//! `cvagent onboard`: first-time setup.

use cvagent_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");

    println!("📄 cvagent: First-Time Setup");
    println!("============================\n");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("✅ Created config directory: {}", config_dir.display());
    } else {
        println!("  Config directory exists: {}", config_dir.display());
    }

    if config_path.exists() {
        println!("\n⚠️  Config already exists at: {}", config_path.display());
        println!("   Edit it manually or delete and re-run onboard.\n");
    } else {
        std::fs::write(&config_path, AppConfig::default_toml())?;
        println!("✅ Created config.toml at: {}", config_path.display());
        println!("\n📝 Next steps:");
        println!("   1. Set GROQ_API_KEY (or add api_key to {})", config_path.display());
        println!("   2. Set PINECONE_API_KEY and PINECONE_INDEX_HOST for your résumé index");
        println!("   3. Set [retrieval] embedding_provider to an endpoint serving the embedding model");
        println!("   4. Adjust the [[subjects]] entries to match your namespaces");
        println!("   5. Run: cvagent doctor\n");
    }

    println!("🎉 Setup complete! Run `cvagent ask` to start asking questions.\n");

    Ok(())
}
