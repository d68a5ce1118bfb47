pub mod adaptive_service;
pub mod eval_service;
pub mod generation_service;
pub mod matcher_service;
pub mod multiplayer_service;
pub mod report_service;
pub mod scoring_service;
pub mod session_service;
