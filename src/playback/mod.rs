pub mod engine;
pub mod poller;
pub mod preview;
pub mod state;
pub mod sync;

pub use engine::{
    event_channel, EngineError, EngineEvent, EngineKind, EventReceiver, EventSender,
    PlaybackEngine, Track,
};
pub use poller::{PolledEngine, RemotePlayer, RemoteState};
pub use preview::{AudioElement, PreviewEngine, PreviewEvents};
pub use state::PlaybackState;
pub use sync::{PositionSynchronizer, SyncOutcome};
