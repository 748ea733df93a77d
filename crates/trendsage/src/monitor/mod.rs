//! Client-side job monitor.

pub mod fetcher;
pub mod poller;
pub mod presenter;
pub mod session;

pub use fetcher::{FetchOutcome, ResultFetcher};
pub use poller::{poll_until_terminal, PollDecision, PollExit, PollerState, StatusPoller};
pub use presenter::{FilterState, ResultPresenter, ResultsView};
pub use session::{MatchmakingSession, SessionPhase, SessionSettings, SessionView};
