/*!
 * Authenticated caller extractor
 *
 * Responsibility:
 * - hand the verified caller (Identity) to handlers
 * - axum plumbing lives in core, the type itself in types
 */

mod core;
mod types;

pub use core::IdentityExtractor;
pub use types::Identity;
