//! Dialogue tracks for maestro.
//!
//! A closed set of tracks, each a stateless state machine advanced one step
//! per turn, and the dispatcher that recovers a track's state from the
//! transcript and runs it.

pub mod catalogue;
pub mod chatbot;
pub mod dispatcher;
pub mod dummy;
pub mod error;
pub mod recipes;
pub mod track;
pub mod wizard;

#[cfg(test)]
mod testing;

pub use catalogue::{Domain, DomainInfo, TrackInfo};
pub use dispatcher::{DialogDispatcher, NO_SUCH_TRACK};
pub use error::DispatchError;
pub use track::{DialogTrack, Track, TrackId, TrackResponse, TrackSet, Turn};
