/*!
 * Multi-model translation consensus.
 *
 * The consensus module is organized as:
 * - `consensus::types`: Data model for requests, round trips and results
 * - `consensus::progress`: Ordered progress event reporting
 * - `consensus::engine`: The fan-out/round-trip/rank pipeline
 */

pub mod engine;
pub mod progress;
pub mod types;

pub use engine::{CancelToken, ConsensusEngine};
pub use progress::{ChannelReporter, CollectingReporter, ProgressEvent, ProgressReporter};
pub use types::{ConsensusResult, ForwardResult, ModelId, RoundTripResult, TranslationRequest};
