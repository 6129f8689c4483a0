/*!
 * # backtrans - Multi-Model Translation Consensus
 *
 * A Rust service that translates text by fanning a request out to several
 * LLM backends in parallel, checking each candidate's fidelity through
 * round-trip back-translation, and returning a ranked consensus result.
 *
 * ## Features
 *
 * - Concurrent forward/backward translation rounds across configurable models
 * - Levenshtein-based similarity scoring of back-translations
 * - Partial-failure tolerance: one failing model never aborts the batch
 * - Ordered progress reporting for streaming transports
 * - Image text extraction via a vision-capable model
 * - JSON and server-sent-events HTTP endpoints
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `similarity`: Edit-distance similarity scoring
 * - `providers`: Chat-completion backends (OpenRouter, mock):
 *   - `providers::openrouter`: OpenRouter API client
 *   - `providers::mock`: Scripted backend for testing
 * - `gateway`: Per-model translation calls
 * - `detection`: Source language detection
 * - `extraction`: Image text extraction
 * - `consensus`: The consensus engine, data model and progress reporting
 * - `server`: HTTP routing and SSE progress streaming
 * - `language_utils`: Language name resolution
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod consensus;
pub mod detection;
pub mod errors;
pub mod extraction;
pub mod gateway;
pub mod language_utils;
pub mod providers;
pub mod server;
pub mod similarity;

// Re-export main types for easier usage
pub use app_config::Config;
pub use consensus::{CancelToken, ConsensusEngine, ConsensusResult, ModelId, TranslationRequest};
pub use errors::{AppError, EngineError, ProviderError};
pub use gateway::ModelGateway;
pub use similarity::similarity;
