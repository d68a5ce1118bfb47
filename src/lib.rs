pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

use crate::services::eval_service::OpenAiEvalService;
use crate::services::generation_service::OpenAiGenerationService;
use crate::services::multiplayer_service::MultiplayerService;
use crate::services::session_service::SessionService;
use reqwest::Client;

/// Wires the engine against its production facade. Hosting code builds one
/// of these after `config::init_config()` and shares clones.
#[derive(Clone)]
pub struct EngineState {
    pub session_service: SessionService<OpenAiGenerationService, OpenAiEvalService>,
    pub multiplayer_service: MultiplayerService,
}

impl EngineState {
    pub fn new() -> Self {
        let config = crate::config::get_config();
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()
            .unwrap();

        let generation_service = OpenAiGenerationService::new(
            config.openai_api_key.clone(),
            config.openai_base_url.clone(),
            config.generation_model.clone(),
            http_client.clone(),
        );
        let eval_service = OpenAiEvalService::new(
            config.openai_api_key.clone(),
            config.openai_base_url.clone(),
            config.eval_model.clone(),
            http_client,
        );

        Self {
            session_service: SessionService::new(generation_service, eval_service)
                .with_batch_size(config.questions_per_batch),
            multiplayer_service: MultiplayerService::new(),
        }
    }
}
