use super::Config;
use std::path::PathBuf;

impl Config {
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) =
            std::env::var("TWENTYQ_API_KEY").or_else(|_| std::env::var("OPENAI_API_KEY"))
            && !key.is_empty()
        {
            self.api_key = Some(key);
        }

        if let Ok(provider) = std::env::var("TWENTYQ_PROVIDER")
            && !provider.is_empty()
        {
            self.default_provider = Some(provider);
        }

        if let Ok(model) = std::env::var("TWENTYQ_MODEL")
            && !model.is_empty()
        {
            self.default_model = Some(model);
        }

        if let Ok(temp_str) = std::env::var("TWENTYQ_TEMPERATURE")
            && let Ok(temp) = temp_str.parse::<f64>()
            && (0.0..=2.0).contains(&temp)
        {
            self.default_temperature = temp;
        }

        if let Ok(topics) = std::env::var("TWENTYQ_TOPICS")
            && !topics.is_empty()
        {
            self.game.topics_path = PathBuf::from(topics);
        }
    }
}
