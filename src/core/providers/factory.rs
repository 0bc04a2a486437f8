use super::compatible::OpenAiCompatibleProvider;
use super::traits::Provider;
use std::sync::Arc;

/// `(display name, base url, requires key)` of each built-in provider.
fn provider_spec(name: &str) -> Option<(&'static str, &'static str, bool)> {
    let spec = match name {
        "openai" => ("OpenAI", "https://api.openai.com/v1", true),
        "openrouter" => ("OpenRouter", "https://openrouter.ai/api/v1", true),
        "ollama" => ("Ollama", "http://localhost:11434/v1", false),
        _ => return None,
    };
    Some(spec)
}

/// Build a provider from its config name: one of the built-ins, or
/// `custom:<base-url>` for any other OpenAI-compatible endpoint.
pub fn create_provider(name: &str, api_key: Option<&str>) -> anyhow::Result<Arc<dyn Provider>> {
    let name = name.trim();

    if let Some(base_url) = name.strip_prefix("custom:") {
        if base_url.is_empty() {
            anyhow::bail!("Custom provider requires a URL. Format: custom:https://your-api.com");
        }
        return Ok(Arc::new(OpenAiCompatibleProvider::new(
            "Custom", base_url, api_key, false,
        )));
    }

    let Some((display, base_url, requires_key)) = provider_spec(name) else {
        anyhow::bail!(
            "Unknown provider: {name}. Use openai, openrouter, ollama or custom:<base-url>"
        );
    };
    Ok(Arc::new(OpenAiCompatibleProvider::new(
        display,
        base_url,
        api_key,
        requires_key,
    )))
}
