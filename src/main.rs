use amp_config::AmpConfig;
use anyhow::Result;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // File settings first, then environment overrides
    let config = AmpConfig::load();
    log::info!(
        "ampshell starting (scale {}, content {})",
        config.window.scale,
        config.entry_path().display()
    );

    amp_window::run(config)
}
