//! Configuration diagnostics
//!
//! Reports which source supplies the relay key (masked) and whether the
//! persona file is usable. Never prints the key itself.

use crate::server::load_config;
use anyhow::{Context, Result};
use folio_relay::CredentialResolver;
use std::path::Path;

pub async fn run() -> Result<()> {
    println!("🏥 Folio Doctor\n");

    let config = load_config().context("Failed to load configuration")?;
    println!(
        "Server: http://{}:{}",
        config.server.host, config.server.port
    );
    println!("Model: {}", config.relay.model);

    let mut all_ok = true;
    all_ok &= check_credential(
        &config.relay.key_name,
        config.relay.api_key.clone(),
        &config.relay.fallback_files,
    );
    check_persona(config.relay.persona_file.as_deref());

    println!();
    if all_ok {
        println!("✅ All checks passed! Ready to run Folio.");
    } else {
        println!("⚠️  Some checks failed. Please fix the issues above.");
        std::process::exit(1);
    }

    Ok(())
}

fn check_credential(
    key_name: &str,
    configured: Option<String>,
    fallback_files: &[std::path::PathBuf],
) -> bool {
    print!("Checking {}... ", key_name);

    let resolver = CredentialResolver::standard(key_name, configured, fallback_files);
    match resolver.resolve() {
        Ok(resolved) => {
            println!("✅ {} (from {})", resolved.secret.masked(), resolved.source);
            true
        }
        Err(e) => {
            println!("❌ {}", e);
            println!("   Searched: {}", resolver.source_names().join(", "));
            false
        }
    }
}

fn check_persona(path: Option<&Path>) {
    print!("Checking persona... ");

    match path {
        None => println!("✅ built-in Dossier Guardian"),
        Some(path) => match std::fs::read_to_string(path) {
            Ok(content) if !content.trim().is_empty() => {
                println!("✅ {}", path.display())
            }
            Ok(_) => println!("⚠️  {} is empty, using built-in", path.display()),
            Err(e) => println!("⚠️  {} unreadable ({}), using built-in", path.display(), e),
        },
    }
}
