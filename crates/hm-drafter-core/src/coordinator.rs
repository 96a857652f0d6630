// Draft coordinator: an actor task that serializes every command against
// one draft session.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::draft::{Assignment, CaptainSelection, DraftRng, DraftSession, DraftSnapshot};
use crate::error::{DraftError, DraftResult};
use crate::ids::Id;
use crate::model::{Captain, DraftPick, Team};
use crate::store::{StoreError, TournamentStore};

/// Bounded inbox size; senders wait when the actor falls behind.
const INBOX_CAPACITY: usize = 64;

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Messages processed by the coordinator, one at a time, in arrival order.
#[derive(Debug)]
pub enum DraftCommand {
    SelectCaptains {
        selections: Vec<String>,
        respond_to: oneshot::Sender<Applied<CaptainSelection>>,
    },
    GenerateOrder {
        respond_to: oneshot::Sender<DraftResult<Applied<Vec<Captain>>>>,
    },
    AdvanceTurn {
        respond_to: oneshot::Sender<DraftResult<Applied<Captain>>>,
    },
    CurrentCaptain {
        respond_to: oneshot::Sender<DraftResult<Captain>>,
    },
    PickPlayer {
        name: String,
        respond_to: oneshot::Sender<DraftResult<Applied<DraftPick>>>,
    },
    PrepareAssignment {
        captain: String,
        team: String,
        reassign: bool,
        respond_to: oneshot::Sender<DraftResult<Assignment>>,
    },
    CommitAssignment {
        assignment: Assignment,
        respond_to: oneshot::Sender<DraftResult<DraftSnapshot>>,
    },
    AddTeam {
        team: Team,
        respond_to: oneshot::Sender<DraftSnapshot>,
    },
    PrepareTeamDeletion {
        team: String,
        respond_to: oneshot::Sender<DraftResult<Id>>,
    },
    CommitTeamDeletion {
        team: Id,
        former_roster: Vec<Id>,
        respond_to: oneshot::Sender<DraftSnapshot>,
    },
    ReplaceTeams {
        teams: Vec<Team>,
        respond_to: oneshot::Sender<DraftSnapshot>,
    },
    Snapshot {
        respond_to: oneshot::Sender<DraftSnapshot>,
    },
    Shutdown,
}

/// A command's result together with the session state it left behind, both
/// taken in the same coordinator turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied<T> {
    pub value: T,
    pub snapshot: DraftSnapshot,
}

// ---------------------------------------------------------------------------
// Actor
// ---------------------------------------------------------------------------

/// Owns the draft session. Nothing else can reach it.
pub struct DraftCoordinator {
    session: DraftSession,
    rng: DraftRng,
    inbox: mpsc::Receiver<DraftCommand>,
}

impl DraftCoordinator {
    /// Create the actor and the handle that talks to it. The actor does
    /// nothing until [`DraftCoordinator::run`] is awaited.
    pub fn new(
        session: DraftSession,
        rng: DraftRng,
        store: Arc<dyn TournamentStore>,
    ) -> (Self, DraftHandle) {
        let (sender, inbox) = mpsc::channel(INBOX_CAPACITY);
        let handle = DraftHandle {
            sender,
            store,
            tournament: session.tournament(),
        };
        let actor = DraftCoordinator {
            session,
            rng,
            inbox,
        };
        (actor, handle)
    }

    /// Create the actor and run it on the current tokio runtime.
    pub fn spawn(
        session: DraftSession,
        rng: DraftRng,
        store: Arc<dyn TournamentStore>,
    ) -> DraftHandle {
        let (actor, handle) = Self::new(session, rng, store);
        tokio::spawn(actor.run());
        handle
    }

    /// Process commands until shutdown or until every handle is dropped.
    pub async fn run(mut self) {
        info!(
            "Draft coordinator started for tournament {}",
            self.session.tournament()
        );

        while let Some(command) = self.inbox.recv().await {
            if matches!(command, DraftCommand::Shutdown) {
                break;
            }
            self.handle(command);
        }

        info!(
            "Draft coordinator stopped for tournament {}",
            self.session.tournament()
        );
    }

    fn handle(&mut self, command: DraftCommand) {
        match command {
            DraftCommand::SelectCaptains {
                selections,
                respond_to,
            } => {
                let selection = self.session.select_captains(&selections);
                let _ = respond_to.send(self.applied(selection));
            }
            DraftCommand::GenerateOrder { respond_to } => {
                let result = self
                    .session
                    .generate_draft_order(&mut self.rng)
                    .map(|order| order.to_vec())
                    .map(|order| self.applied(order));
                let _ = respond_to.send(log_failure("generate order", result));
            }
            DraftCommand::AdvanceTurn { respond_to } => {
                let result = self
                    .session
                    .advance_turn()
                    .cloned()
                    .map(|captain| self.applied(captain));
                let _ = respond_to.send(log_failure("advance turn", result));
            }
            DraftCommand::CurrentCaptain { respond_to } => {
                let _ = respond_to.send(self.session.current_captain().cloned());
            }
            DraftCommand::PickPlayer { name, respond_to } => {
                let result = self
                    .session
                    .pick_player(&name)
                    .map(|pick| self.applied(pick));
                let _ = respond_to.send(log_failure("pick", result));
            }
            DraftCommand::PrepareAssignment {
                captain,
                team,
                reassign,
                respond_to,
            } => {
                let result = self.session.prepare_assignment(&captain, &team, reassign);
                let _ = respond_to.send(log_failure("assign", result));
            }
            DraftCommand::CommitAssignment {
                assignment,
                respond_to,
            } => {
                let result = self
                    .session
                    .commit_assignment(assignment)
                    .map(|()| self.session.snapshot());
                let _ = respond_to.send(log_failure("commit assignment", result));
            }
            DraftCommand::AddTeam { team, respond_to } => {
                self.session.add_team(team);
                let _ = respond_to.send(self.session.snapshot());
            }
            DraftCommand::PrepareTeamDeletion { team, respond_to } => {
                let result = self.session.prepare_team_deletion(&team);
                let _ = respond_to.send(log_failure("delete team", result));
            }
            DraftCommand::CommitTeamDeletion {
                team,
                former_roster,
                respond_to,
            } => {
                self.session.commit_team_deletion(team, &former_roster);
                let _ = respond_to.send(self.session.snapshot());
            }
            DraftCommand::ReplaceTeams { teams, respond_to } => {
                self.session.replace_teams(teams);
                let _ = respond_to.send(self.session.snapshot());
            }
            DraftCommand::Snapshot { respond_to } => {
                let _ = respond_to.send(self.session.snapshot());
            }
            DraftCommand::Shutdown => {}
        }
    }

    fn applied<T>(&self, value: T) -> Applied<T> {
        Applied {
            value,
            snapshot: self.session.snapshot(),
        }
    }
}

fn log_failure<T>(command: &str, result: DraftResult<T>) -> DraftResult<T> {
    if let Err(e) = &result {
        if e.is_recoverable() {
            debug!("Command '{}' rejected: {}", command, e);
        } else {
            warn!("Command '{}' failed: {}", command, e);
        }
    }
    result
}

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

/// Cloneable front door to a running coordinator.
///
/// Commands that touch the tournament store validate against the session
/// first, call the store on the caller's task with no session access, and
/// commit only once the store has succeeded.
#[derive(Clone)]
pub struct DraftHandle {
    sender: mpsc::Sender<DraftCommand>,
    store: Arc<dyn TournamentStore>,
    tournament: Id,
}

impl DraftHandle {
    pub fn tournament(&self) -> Id {
        self.tournament
    }

    pub async fn select_captains(
        &self,
        selections: Vec<String>,
    ) -> DraftResult<Applied<CaptainSelection>> {
        self.request(|respond_to| DraftCommand::SelectCaptains {
            selections,
            respond_to,
        })
        .await
    }

    pub async fn generate_draft_order(&self) -> DraftResult<Applied<Vec<Captain>>> {
        self.request(|respond_to| DraftCommand::GenerateOrder { respond_to })
            .await?
    }

    pub async fn advance_turn(&self) -> DraftResult<Applied<Captain>> {
        self.request(|respond_to| DraftCommand::AdvanceTurn { respond_to })
            .await?
    }

    pub async fn current_captain(&self) -> DraftResult<Captain> {
        self.request(|respond_to| DraftCommand::CurrentCaptain { respond_to })
            .await?
    }

    pub async fn pick_player(&self, name: &str) -> DraftResult<Applied<DraftPick>> {
        let name = name.to_string();
        self.request(|respond_to| DraftCommand::PickPlayer { name, respond_to })
            .await?
    }

    pub async fn snapshot(&self) -> DraftResult<DraftSnapshot> {
        self.request(|respond_to| DraftCommand::Snapshot { respond_to })
            .await
    }

    /// Bind an unassigned captain to a team, in the store and then locally.
    pub async fn assign_captain_to_team(
        &self,
        captain_id: &str,
        team_id: &str,
        deadline: Duration,
    ) -> DraftResult<Applied<Assignment>> {
        self.bind_captain(captain_id, team_id, false, deadline).await
    }

    /// Like [`DraftHandle::assign_captain_to_team`], but replaces an existing
    /// binding instead of refusing it.
    pub async fn reassign_captain_to_team(
        &self,
        captain_id: &str,
        team_id: &str,
        deadline: Duration,
    ) -> DraftResult<Applied<Assignment>> {
        self.bind_captain(captain_id, team_id, true, deadline).await
    }

    async fn bind_captain(
        &self,
        captain_id: &str,
        team_id: &str,
        reassign: bool,
        deadline: Duration,
    ) -> DraftResult<Applied<Assignment>> {
        let (captain, team) = (captain_id.to_string(), team_id.to_string());
        let assignment = self
            .request(|respond_to| DraftCommand::PrepareAssignment {
                captain,
                team,
                reassign,
                respond_to,
            })
            .await??;

        with_deadline(
            deadline,
            self.store
                .bind_player_to_team(assignment.captain, assignment.team, self.tournament),
        )
        .await?;

        let snapshot = self
            .request(|respond_to| DraftCommand::CommitAssignment {
                assignment,
                respond_to,
            })
            .await??;
        Ok(Applied {
            value: assignment,
            snapshot,
        })
    }

    /// Create a team in the store and start tracking it.
    pub async fn create_team(&self, name: &str, deadline: Duration) -> DraftResult<Applied<Team>> {
        let team = with_deadline(deadline, self.store.create_team(name, self.tournament)).await?;
        let added = team.clone();
        let snapshot = self
            .request(|respond_to| DraftCommand::AddTeam {
                team: added,
                respond_to,
            })
            .await?;
        Ok(Applied {
            value: team,
            snapshot,
        })
    }

    /// Delete a team in the store, then release everyone who was on it.
    pub async fn delete_team(&self, team_id: &str, deadline: Duration) -> DraftResult<Applied<Id>> {
        let team = team_id.to_string();
        let team = self
            .request(|respond_to| DraftCommand::PrepareTeamDeletion { team, respond_to })
            .await??;

        let former_roster =
            with_deadline(deadline, self.store.delete_team(team, self.tournament)).await?;

        let snapshot = self
            .request(|respond_to| DraftCommand::CommitTeamDeletion {
                team,
                former_roster,
                respond_to,
            })
            .await?;
        Ok(Applied {
            value: team,
            snapshot,
        })
    }

    /// Reload the team list from the store. The value is the number of
    /// teams listed.
    pub async fn refresh_teams(&self, deadline: Duration) -> DraftResult<Applied<usize>> {
        let teams = with_deadline(deadline, self.store.fetch_teams(self.tournament)).await?;
        let count = teams.len();
        let snapshot = self
            .request(|respond_to| DraftCommand::ReplaceTeams { teams, respond_to })
            .await?;
        Ok(Applied {
            value: count,
            snapshot,
        })
    }

    /// Ask the coordinator to stop after the commands already queued.
    pub async fn shutdown(&self) -> DraftResult<()> {
        self.sender
            .send(DraftCommand::Shutdown)
            .await
            .map_err(|_| DraftError::CoordinatorClosed)
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> DraftCommand,
    ) -> DraftResult<T> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| DraftError::CoordinatorClosed)?;
        response.await.map_err(|_| DraftError::CoordinatorClosed)
    }
}

/// Run a store call under the caller's deadline.
async fn with_deadline<T>(
    deadline: Duration,
    call: impl Future<Output = Result<T, StoreError>>,
) -> DraftResult<T> {
    match tokio::time::timeout(deadline, call).await {
        Ok(result) => Ok(result?),
        Err(_) => {
            warn!("Tournament store call exceeded {:?} deadline", deadline);
            Err(DraftError::DeadlineElapsed)
        }
    }
}
