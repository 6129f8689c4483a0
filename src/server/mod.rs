/*!
 * HTTP surface for the consensus service.
 *
 * Plumbing only: routing, CORS, multipart intake and SSE progress streaming.
 * The handlers delegate all translation work to the consensus engine and the
 * extraction gateway.
 */

mod handlers;
mod state;

pub use handlers::{ErrorResponse, router, run_server};
pub use state::ServerState;
