use crate::config::Config;
use crate::core::game::Role;

/// Human-readable view of the resolved configuration, with the API key masked.
pub fn render_config(config: &Config) -> String {
    let mut lines = vec![
        "◆ twentyq configuration".to_string(),
        String::new(),
        format!("Version       {}", env!("CARGO_PKG_VERSION")),
        format!("Config        {}", config.config_path.display()),
        format!("API key       {}", config.masked_api_key()),
        format!("Log level     {}", config.log_level),
        String::new(),
    ];

    for role in [Role::Host, Role::Player] {
        lines.push(format!(
            "{:<13} provider={}, model={}, temperature={:.2}",
            role.to_string(),
            config.provider_for(role),
            config.model_for(role),
            config.temperature_for(role),
        ));
    }

    lines.push(String::new());
    lines.push(format!(
        "Game          quota={}, max_transitions={}, topic_samples={}",
        config.game.question_quota, config.game.max_transitions, config.game.topic_sample_size
    ));
    lines.push(format!(
        "Topics        {}",
        config.game.topics_path.display()
    ));
    lines.push(format!(
        "Observability {} (logs in {})",
        config.observability.backend,
        config.observability.log_dir.display()
    ));

    lines.join("\n")
}
