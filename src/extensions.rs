//! `postsync extensions`: list registered batch extensions.

use postsync_core::extension::ExtensionRegistry;

use crate::config::Config;

/// Print every registered extension, marking the ones enabled in config.
pub fn list_extensions(config: &Config, registry: &ExtensionRegistry) {
    println!("{:<16} {:<8} DESCRIPTION", "EXTENSION", "ENABLED");
    for extension in registry.iter() {
        let enabled = config
            .pipeline
            .extensions
            .iter()
            .any(|name| name == extension.name());
        println!(
            "{:<16} {:<8} {}",
            extension.name(),
            if enabled { "yes" } else { "no" },
            extension.description()
        );
    }

    for name in &config.pipeline.extensions {
        if registry.get(name).is_none() {
            println!("{:<16} {:<8} (not registered)", name, "error");
        }
    }
}
