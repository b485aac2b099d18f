//! # VaultMind Stream Processing
//!
//! Two single-threaded chunk processors that sit between a provider's
//! raw stream and the live message buffer:
//!
//! - [`StreamNormalizer`] unifies the vendor-specific reasoning shapes of
//!   incoming [`ResponseChunk`]s into one canonical think/answer text.
//! - [`BlockDetector`] watches the visible text for complete action
//!   blocks that may be split across chunk boundaries, executes them as
//!   side effects, and never lets broken tag fragments reach the UI.
//!
//! Neither holds locks or spawns tasks; the run loop drives both, one
//! chunk at a time.
//!
//! [`ResponseChunk`]: vaultmind_core::ResponseChunk

mod detector;
mod normalizer;

pub use detector::{ActionHandler, BlockDetector, DetectorEvent, NOTE_OPEN_TAG};
pub use normalizer::{StreamNormalizer, THINK_CLOSE, THINK_OPEN};
