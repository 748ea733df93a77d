pub mod api;
pub mod broadcast;
pub mod config;
pub mod error;
pub mod monitor;
pub mod prefs;
pub mod sanitize;

pub use api::{
    HttpMatchmakingApi, Job, JobId, JobStatus, MatchPage, MatchQuery, MatchResult,
    MatchmakingApi, PaginationState, Tier,
};
pub use broadcast::{SessionEvent, SessionEventBroadcaster, SessionEventKind};
pub use config::{load_config, ClientConfig};
pub use error::{ApiError, ConfigError, PreferenceError, Result, SessionError, TrendsageError};
pub use monitor::{
    FilterState, MatchmakingSession, PollerState, ResultsView, SessionPhase, SessionSettings,
    SessionView,
};
pub use prefs::{FilePreferences, MemoryPreferences, PreferenceStore, Preferences};
