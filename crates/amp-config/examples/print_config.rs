/// Example program to print the loaded configuration
///
/// Run with: cargo run -p amp-config --example print_config

fn main() {
    // Load configuration from ampshell.toml
    let config = amp_config::AmpConfig::load();

    println!("=== Ampshell Configuration ===\n");

    println!("Window Settings:");
    println!("  Scale: {}", config.window.scale);
    println!("  Title: {}", config.window.title);
    println!(
        "  Initial Size: {}x{}",
        config.window.initial_width, config.window.initial_height
    );
    println!();

    println!("Content Settings:");
    println!("  Root: {}", config.content.root.display());
    println!("  Entry: {}", config.content.entry);
    println!();

    println!("Updates: {}", if config.updates.enabled { "enabled" } else { "disabled" });
    println!("Devtools: {}", config.dev.devtools);
    println!("Forward Console: {}", config.dev.forward_console);
    println!();

    match toml::to_string_pretty(&config) {
        Ok(toml_str) => {
            println!("=== Serialized Configuration ===");
            println!("{}", toml_str);
        }
        Err(e) => {
            eprintln!("Failed to serialize config: {}", e);
        }
    }
}
