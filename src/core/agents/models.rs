use crate::config::Config;
use crate::core::game::Role;
use crate::core::providers::{Provider, create_provider};
use std::sync::Arc;

/// The model one role talks to.
#[derive(Clone)]
pub struct RoleModel {
    pub provider: Arc<dyn Provider>,
    pub model: String,
    pub temperature: f64,
}

impl RoleModel {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>, temperature: f64) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature,
        }
    }
}

impl std::fmt::Debug for RoleModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoleModel")
            .field("provider", &self.provider.name())
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish()
    }
}

/// Host and player models, resolved once per process and shared by games.
#[derive(Debug, Clone)]
pub struct RoleModels {
    pub host: RoleModel,
    pub player: RoleModel,
}

impl RoleModels {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let build = |role: Role| -> anyhow::Result<RoleModel> {
            let provider = create_provider(&config.provider_for(role), config.api_key.as_deref())?;
            Ok(RoleModel::new(
                provider,
                config.model_for(role),
                config.temperature_for(role),
            ))
        };
        Ok(Self {
            host: build(Role::Host)?,
            player: build(Role::Player)?,
        })
    }

    /// Both roles on the same model.
    pub fn shared(model: RoleModel) -> Self {
        Self {
            host: model.clone(),
            player: model,
        }
    }

    pub fn for_role(&self, role: Role) -> &RoleModel {
        match role {
            Role::Host => &self.host,
            Role::Player => &self.player,
        }
    }
}
