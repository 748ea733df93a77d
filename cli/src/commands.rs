use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;
use log::{debug, warn};
use tokio::sync::broadcast::{error::RecvError, Receiver};

use trendsage::api::Tier;
use trendsage::config::{load_config, ClientConfig};
use trendsage::monitor::{FilterState, MatchmakingSession, SessionPhase, SessionSettings, SessionView};
use trendsage::prefs::{FilePreferences, Preferences};
use trendsage::{HttpMatchmakingApi, SessionEvent};

use crate::render;
use crate::MatchArgs;

/// Prompt shown when a project has no analysis yet.
pub const START_PROMPT: &str = "start_analysis";

pub struct Context {
    config: ClientConfig,
    prefs: Preferences<FilePreferences>,
    json: bool,
}

impl Context {
    pub fn load(config_path: Option<&Path>, json: bool) -> anyhow::Result<Self> {
        let config = match config_path {
            Some(path) => load_config(path)
                .with_context(|| format!("loading config from {}", path.display()))?,
            None => ClientConfig::from_env().context("reading configuration from environment")?,
        };
        let prefs = Preferences::new(FilePreferences::open_default()?);
        debug!("Using backend {}", config.trimmed_base_url());

        Ok(Self {
            config,
            prefs,
            json,
        })
    }

    fn session(&self, project_key: &str) -> anyhow::Result<MatchmakingSession> {
        let api = HttpMatchmakingApi::new(&self.config)?;
        let mut settings = SessionSettings::from_config(&self.config);
        if let Some(page_size) = self.prefs.page_size()? {
            settings.page_size = page_size;
        }
        Ok(MatchmakingSession::new(Arc::new(api), project_key, settings))
    }

    fn show(&self, view: &SessionView) -> anyhow::Result<()> {
        let hide_prompt = view.phase == SessionPhase::StartPrompt
            && self.prefs.is_prompt_dismissed(START_PROMPT)?;
        render::view(view, self.json, hide_prompt)
    }
}

/// Prints events until the session settles or the user interrupts.
async fn follow(
    ctx: &Context,
    session: &MatchmakingSession,
    events: &mut Receiver<SessionEvent>,
) -> anyhow::Result<SessionView> {
    let view = session.snapshot();
    if view.is_settled() {
        ctx.show(&view)?;
        return Ok(view);
    }

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    render::event(&event, ctx.json)?;
                    if event.view.is_settled() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Skipped {} session events", skipped);
                }
                Err(RecvError::Closed) => break,
            },
            _ = tokio::signal::ctrl_c() => {
                session.close();
                break;
            }
        }
    }

    let view = session.snapshot();
    ctx.show(&view)?;
    Ok(view)
}

pub async fn watch(ctx: &Context, project_key: &str) -> anyhow::Result<()> {
    let session = ctx.session(project_key)?;
    session.open().await?;
    let mut events = session.subscribe();
    follow(ctx, &session, &mut events).await?;
    Ok(())
}

pub async fn start(ctx: &Context, project_key: &str) -> anyhow::Result<()> {
    let session = ctx.session(project_key)?;
    if let Err(e) = session.open().await {
        warn!("Could not load current state for '{}': {}", project_key, e);
    }
    // Subscribe after open so its settled views are not replayed.
    let mut events = session.subscribe();
    session.start_analysis().await?;
    follow(ctx, &session, &mut events).await?;
    Ok(())
}

pub async fn retry(ctx: &Context, project_key: &str) -> anyhow::Result<()> {
    let session = ctx.session(project_key)?;
    session.open().await?;
    let mut events = session.subscribe();
    session.retry().await?;
    follow(ctx, &session, &mut events).await?;
    Ok(())
}

pub async fn matches(ctx: &Context, project_key: &str, args: MatchArgs) -> anyhow::Result<()> {
    let session = ctx.session(project_key)?;
    let view = session.open().await?;
    if view.phase != SessionPhase::Results {
        return ctx.show(&view);
    }

    if let Some(page_size) = args.page_size {
        ctx.prefs.set_page_size(page_size)?;
        session.set_page_size(page_size).await?;
    }

    let filters = FilterState {
        min_cred_score: args.min_cred_score,
        min_synergy_rating: args.min_synergy,
        tier_filter: args.tier.map(Tier::from),
    };
    if !filters.is_empty() {
        session.set_filters(filters).await?;
    }
    if args.page > 1 {
        session.set_page(args.page).await?;
    }

    let view = match args.search.as_deref() {
        Some(term) => session.set_search(term),
        None => session.snapshot(),
    };
    ctx.show(&view)
}

pub fn dismiss(ctx: &Context, prompt: &str, restore: bool) -> anyhow::Result<()> {
    if restore {
        ctx.prefs.restore_prompt(prompt)?;
        println!("Prompt '{}' will be shown again.", prompt);
    } else {
        ctx.prefs.dismiss_prompt(prompt)?;
        println!("Prompt '{}' dismissed.", prompt);
    }
    Ok(())
}
