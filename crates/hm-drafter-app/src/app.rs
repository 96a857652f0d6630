// Console application: turns operator commands into draft engine calls.
//
// The app owns at most one draft session at a time (one per loaded
// tournament). Every command goes through the session's `DraftHandle`, so
// the console never touches draft state directly.

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{info, warn};

use hm_drafter_api::{HiveMindClient, Tournament};
use hm_drafter_core::draft::DraftSession;
use hm_drafter_core::{DraftCoordinator, DraftError, DraftHandle, Id, StoreError, TournamentStore};

use crate::config::Config;
use crate::protocol::{parse_command, UserCommand, HELP};
use crate::render;

// ---------------------------------------------------------------------------
// Store seam
// ---------------------------------------------------------------------------

/// A tournament store that can also list a scene's tournaments.
#[async_trait]
pub trait TournamentDirectory: TournamentStore {
    async fn list_tournaments(&self, scene: &str, limit: usize)
        -> Result<Vec<Tournament>, StoreError>;
}

#[async_trait]
impl TournamentDirectory for HiveMindClient {
    async fn list_tournaments(
        &self,
        scene: &str,
        limit: usize,
    ) -> Result<Vec<Tournament>, StoreError> {
        HiveMindClient::list_tournaments(self, scene, limit).await
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct App<S> {
    config: Config,
    store: Arc<S>,
    draft: Option<DraftHandle>,
}

impl<S: TournamentDirectory + 'static> App<S> {
    pub fn new(config: Config, store: Arc<S>) -> Self {
        Self {
            config,
            store,
            draft: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Handle to the loaded draft, if any.
    pub fn draft(&self) -> Option<&DraftHandle> {
        self.draft.as_ref()
    }

    /// Run one command and return the text to show the operator.
    pub async fn execute(&mut self, command: UserCommand) -> anyhow::Result<String> {
        let deadline = self.config.command_deadline();

        match command {
            UserCommand::Tournaments => {
                let scene = &self.config.tournament.scene;
                let list = tokio::time::timeout(
                    deadline,
                    self.store
                        .list_tournaments(scene, self.config.tournament.listing_limit),
                )
                .await
                .map_err(|_| DraftError::DeadlineElapsed)?
                .map_err(DraftError::from)?;
                Ok(render::tournaments(&list))
            }
            UserCommand::Load { tournament } => self.load(&tournament).await,
            UserCommand::Captains { selections } => {
                let selection = self.handle()?.select_captains(selections).await?;
                Ok(render::captain_selection(&selection.value))
            }
            UserCommand::Order => {
                let order = self.handle()?.generate_draft_order().await?.value;
                let mut out = render::draft_order(&order);
                if let Some(first) = order.first() {
                    out.push('\n');
                    out.push_str(&render::up_next(first));
                }
                Ok(out)
            }
            UserCommand::Next => {
                let captain = self.handle()?.advance_turn().await?.value;
                Ok(render::up_next(&captain))
            }
            UserCommand::Pick { player } => {
                let pick = self.handle()?.pick_player(&player).await?;
                Ok(render::pick(&pick.value, pick.snapshot.pool.len()))
            }
            UserCommand::Assign { captain, team } => {
                let done = self
                    .handle()?
                    .assign_captain_to_team(&captain, &team, deadline)
                    .await?
                    .value;
                Ok(format!(
                    "Captain {} assigned to team {}.",
                    done.captain, done.team
                ))
            }
            UserCommand::Reassign { captain, team } => {
                let done = self
                    .handle()?
                    .reassign_captain_to_team(&captain, &team, deadline)
                    .await?
                    .value;
                Ok(format!("Captain {} moved to team {}.", done.captain, done.team))
            }
            UserCommand::TeamAdd { name } => {
                let team = self.handle()?.create_team(&name, deadline).await?.value;
                Ok(format!("Created team [{}] {}.", team.id, team.name))
            }
            UserCommand::TeamRemove { team } => {
                let removed = self.handle()?.delete_team(&team, deadline).await?.value;
                Ok(format!("Deleted team {removed}."))
            }
            UserCommand::Teams => {
                let refreshed = self.handle()?.refresh_teams(deadline).await?;
                Ok(render::teams(&refreshed.snapshot))
            }
            UserCommand::Status => Ok(render::status(&self.handle()?.snapshot().await?)),
            UserCommand::Help => Ok(HELP.to_string()),
            UserCommand::Quit => Ok("Bye.".to_string()),
        }
    }

    /// Fetch a tournament's players and teams and start a fresh session.
    async fn load(&mut self, raw: &str) -> anyhow::Result<String> {
        let tournament: Id = raw.parse()?;
        let deadline = self.config.command_deadline();

        let (players, teams) = tokio::time::timeout(deadline, async {
            tokio::try_join!(
                self.store.fetch_players(tournament),
                self.store.fetch_teams(tournament)
            )
        })
        .await
        .map_err(|_| DraftError::DeadlineElapsed)?
        .map_err(DraftError::from)
        .with_context(|| format!("failed to load tournament {tournament}"))?;

        if players.is_empty() {
            warn!("Tournament {} has no registered players", tournament);
        }
        let summary = format!(
            "Loaded tournament {}: {} players, {} teams.",
            tournament,
            players.len(),
            teams.len()
        );

        self.shutdown().await;
        let session = DraftSession::new(
            tournament,
            players,
            teams,
            self.config.draft.alt_name_slug.clone(),
        );
        let store: Arc<dyn TournamentStore> = self.store.clone();
        self.draft = Some(DraftCoordinator::spawn(
            session,
            self.config.draft_rng(),
            store,
        ));

        info!("{}", summary);
        Ok(summary)
    }

    fn handle(&self) -> anyhow::Result<&DraftHandle> {
        self.draft
            .as_ref()
            .context("no tournament loaded; use `load <tournament-id>` first")
    }

    /// Stop the current draft session, if any.
    pub async fn shutdown(&mut self) {
        if let Some(handle) = self.draft.take() {
            if let Err(e) = handle.shutdown().await {
                warn!("Draft coordinator already stopped: {}", e);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Console loop
// ---------------------------------------------------------------------------

/// Read commands line by line until `quit` or end of input. Failed commands
/// are reported and logged; they never end the loop.
pub async fn run<S, R, W>(app: &mut App<S>, input: R, output: &mut W) -> anyhow::Result<()>
where
    S: TournamentDirectory + 'static,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();

    while let Some(line) = lines.next_line().await? {
        let reply = match parse_command(&line) {
            Ok(None) => continue,
            Ok(Some(UserCommand::Quit)) => {
                info!("Quit command received, shutting down");
                write_line(output, "Bye.").await?;
                break;
            }
            Ok(Some(command)) => match app.execute(command).await {
                Ok(text) => text,
                Err(e) => {
                    warn!("Command `{}` failed: {:#}", line.trim(), e);
                    format!("error: {e:#}")
                }
            },
            Err(e) => e.to_string(),
        };
        write_line(output, &reply).await?;
    }

    app.shutdown().await;
    Ok(())
}

async fn write_line<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> std::io::Result<()> {
    output.write_all(text.as_bytes()).await?;
    output.write_all(b"\n").await?;
    output.flush().await
}
