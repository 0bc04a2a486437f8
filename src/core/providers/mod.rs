pub mod compatible;
pub mod factory;
pub mod http_client;
pub mod response;
pub mod scrub;
pub mod traits;

pub use compatible::OpenAiCompatibleProvider;
pub use factory::create_provider;
pub use http_client::{build_provider_client, build_provider_client_with_timeout};
pub use response::{ContentBlock, MessageRole, ProviderMessage, ProviderResponse, StopReason};
pub use scrub::{api_error, sanitize_api_error, scrub_secret_patterns};
pub use traits::{Provider, ToolChatRequest, ToolChoice};
