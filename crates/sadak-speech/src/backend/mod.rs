//! Speech engine implementations.
//!
//! The controller only ever sees `Arc<dyn SpeechEngine>`, so engines can be
//! swapped without touching playback logic.
//!
//! | Module          | Engine                                              |
//! |-----------------|-----------------------------------------------------|
//! | [`simulated`]   | In-process engine with timed playback, for the CLI and tests |

pub mod simulated;

pub use simulated::{SimulatedEngine, default_voices};
