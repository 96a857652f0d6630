// Integration tests for the draft engine.
//
// These drive a running coordinator through its handle, with an in-memory
// tournament store standing in for the remote API.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use hm_drafter_core::draft::{Direction, DraftRng, DraftSession};
use hm_drafter_core::model::{FormField, Player, Team, ALT_NAME_SLUG};
use hm_drafter_core::{DraftCoordinator, DraftError, DraftHandle, Id, StoreError, TournamentStore};

const TOURNAMENT: Id = Id(42);
const DEADLINE: Duration = Duration::from_secs(5);

// ===========================================================================
// Test helpers
// ===========================================================================

#[derive(Clone, Copy, PartialEq)]
enum Behavior {
    Succeed,
    Fail,
    Hang,
}

/// Tournament store backed by a map of player bindings.
struct FakeStore {
    behavior: Behavior,
    bindings: Mutex<HashMap<Id, Id>>,
    teams: Mutex<Vec<Team>>,
    next_team: Mutex<u64>,
}

impl FakeStore {
    fn new(behavior: Behavior) -> Self {
        FakeStore {
            behavior,
            bindings: Mutex::new(HashMap::new()),
            teams: Mutex::new(vec![Team::new(100u64, "Blue"), Team::new(200u64, "Gold")]),
            next_team: Mutex::new(500),
        }
    }

    fn binding(&self, player: Id) -> Option<Id> {
        self.bindings.lock().unwrap().get(&player).copied()
    }

    async fn write_gate(&self) -> Result<(), StoreError> {
        match self.behavior {
            Behavior::Succeed => Ok(()),
            Behavior::Fail => Err(StoreError::Status {
                status: 500,
                body: "boom".into(),
            }),
            Behavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(())
            }
        }
    }
}

#[async_trait]
impl TournamentStore for FakeStore {
    async fn fetch_form_field_catalog(&self, _: Id) -> Result<Vec<FormField>, StoreError> {
        Ok(Vec::new())
    }

    async fn fetch_players(&self, _: Id) -> Result<Vec<Player>, StoreError> {
        Ok(ten_players())
    }

    async fn fetch_teams(&self, _: Id) -> Result<Vec<Team>, StoreError> {
        Ok(self.teams.lock().unwrap().clone())
    }

    async fn create_team(&self, name: &str, _: Id) -> Result<Team, StoreError> {
        self.write_gate().await?;
        let mut next = self.next_team.lock().unwrap();
        let team = Team::new(*next, name);
        *next += 1;
        self.teams.lock().unwrap().push(team.clone());
        Ok(team)
    }

    async fn delete_team(&self, team: Id, _: Id) -> Result<Vec<Id>, StoreError> {
        self.write_gate().await?;
        self.teams.lock().unwrap().retain(|t| t.id != team);
        let mut bindings = self.bindings.lock().unwrap();
        let roster: Vec<Id> = bindings
            .iter()
            .filter(|(_, t)| **t == team)
            .map(|(p, _)| *p)
            .collect();
        bindings.retain(|_, t| *t != team);
        Ok(roster)
    }

    async fn bind_player_to_team(&self, player: Id, team: Id, _: Id) -> Result<(), StoreError> {
        self.write_gate().await?;
        self.bindings.lock().unwrap().insert(player, team);
        Ok(())
    }
}

fn ten_players() -> Vec<Player> {
    [
        "Alice", "Bob", "Charlie", "Dana", "Eve", "Finn", "Gus", "Hana", "Ivy", "Jo",
    ]
    .iter()
    .enumerate()
    .map(|(i, name)| Player::new(i as u64 + 1, *name))
    .collect()
}

fn start(store: Arc<FakeStore>) -> DraftHandle {
    let teams = vec![Team::new(100u64, "Blue"), Team::new(200u64, "Gold")];
    let session = DraftSession::new(TOURNAMENT, ten_players(), teams, ALT_NAME_SLUG);
    DraftCoordinator::spawn(session, DraftRng::seeded(11), store)
}

async fn drafted(store: Arc<FakeStore>) -> DraftHandle {
    let handle = start(store);
    handle
        .select_captains(vec!["Alice".into(), "Bob".into(), "Charlie".into()])
        .await
        .unwrap();
    handle.generate_draft_order().await.unwrap();
    handle
}

// ===========================================================================
// Full draft
// ===========================================================================

#[tokio::test]
async fn full_draft_empties_pool_in_snake_order() {
    let handle = drafted(Arc::new(FakeStore::new(Behavior::Succeed))).await;
    let order: Vec<Id> = handle
        .snapshot()
        .await
        .unwrap()
        .draft_order
        .iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(order.len(), 3);

    let mut pickers = Vec::new();
    for name in ["Dana", "Eve", "Finn", "Gus", "Hana", "Ivy", "Jo"] {
        let pick = handle.pick_player(name).await.unwrap().value;
        pickers.push(pick.captain_id.unwrap());
        handle.advance_turn().await.unwrap();
    }

    let expected: Vec<Id> = [0, 1, 2, 2, 1, 0, 0].iter().map(|&i| order[i]).collect();
    assert_eq!(pickers, expected);

    let snapshot = handle.snapshot().await.unwrap();
    assert!(snapshot.pool.is_empty());
    assert!(snapshot.is_complete);
    assert_eq!(snapshot.picks.len(), 7);
    assert_eq!(
        snapshot.picks.iter().map(|p| p.pick_number).collect::<Vec<_>>(),
        (1..=7).collect::<Vec<u32>>()
    );
    // After seven picks the walk sits on index 1 heading forward.
    assert_eq!(snapshot.current_captain.map(|c| c.id), Some(order[1]));
    assert_eq!(snapshot.direction, Some(Direction::Forward));
}

#[tokio::test]
async fn repeated_pick_is_rejected_without_side_effects() {
    let handle = drafted(Arc::new(FakeStore::new(Behavior::Succeed))).await;
    handle.pick_player("Dana").await.unwrap();
    let before = handle.snapshot().await.unwrap();

    let err = handle.pick_player("Dana").await.unwrap_err();
    assert!(matches!(err, DraftError::PlayerNotInPool { .. }));
    assert_eq!(handle.snapshot().await.unwrap(), before);
}

#[tokio::test]
async fn redraft_restarts_turns() {
    let handle = drafted(Arc::new(FakeStore::new(Behavior::Succeed))).await;
    handle.advance_turn().await.unwrap();
    let order = handle.generate_draft_order().await.unwrap().value;
    assert_eq!(handle.current_captain().await.unwrap(), order[0]);
}

// ===========================================================================
// Captain assignment
// ===========================================================================

#[tokio::test]
async fn assignment_commits_after_store_success() {
    let store = Arc::new(FakeStore::new(Behavior::Succeed));
    let handle = drafted(store.clone()).await;

    let assigned = handle
        .assign_captain_to_team("2", "200", DEADLINE)
        .await
        .unwrap();
    assert_eq!(assigned.value.captain, Id(2));
    assert_eq!(store.binding(Id(2)), Some(Id(200)));

    let snapshot = assigned.snapshot;
    assert_eq!(handle.snapshot().await.unwrap(), snapshot);
    assert!(snapshot.unassigned_captains.iter().all(|c| c.id != Id(2)));
    assert_eq!(snapshot.unassigned_captains.len(), 2);
    let gold = snapshot.team(Id(200)).unwrap();
    assert_eq!(gold.captain.as_ref().map(|c| c.id), Some(Id(2)));
}

#[tokio::test]
async fn failing_store_leaves_captain_unassigned() {
    let handle = drafted(Arc::new(FakeStore::new(Behavior::Fail))).await;

    let err = handle
        .assign_captain_to_team("2", "200", DEADLINE)
        .await
        .unwrap_err();
    assert!(matches!(err, DraftError::Store(_)));
    assert!(!err.is_recoverable());

    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.unassigned_captains.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn elapsed_deadline_leaves_captain_unassigned() {
    let handle = drafted(Arc::new(FakeStore::new(Behavior::Hang))).await;

    let err = handle
        .assign_captain_to_team("2", "200", Duration::from_millis(50))
        .await
        .unwrap_err();
    assert!(matches!(err, DraftError::DeadlineElapsed));

    // The coordinator keeps serving after the abandoned call.
    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.unassigned_captains.len(), 3);
    assert!(handle.pick_player("Dana").await.is_ok());
}

#[tokio::test]
async fn invalid_assignments_are_recoverable() {
    let store = Arc::new(FakeStore::new(Behavior::Succeed));
    let handle = drafted(store.clone()).await;

    for (captain, team) in [("x", "200"), ("2", "y"), ("9", "200"), ("2", "777")] {
        let err = handle
            .assign_captain_to_team(captain, team, DEADLINE)
            .await
            .unwrap_err();
        assert!(err.is_recoverable(), "{captain} -> {team}: {err}");
    }
    assert_eq!(store.binding(Id(2)), None);
}

#[tokio::test]
async fn second_assignment_needs_reassign() {
    let store = Arc::new(FakeStore::new(Behavior::Succeed));
    let handle = drafted(store.clone()).await;
    handle
        .assign_captain_to_team("1", "100", DEADLINE)
        .await
        .unwrap();

    let err = handle
        .assign_captain_to_team("1", "200", DEADLINE)
        .await
        .unwrap_err();
    assert!(matches!(err, DraftError::CaptainAlreadyAssigned { .. }));
    assert_eq!(store.binding(Id(1)), Some(Id(100)));

    handle
        .reassign_captain_to_team("1", "200", DEADLINE)
        .await
        .unwrap();
    assert_eq!(store.binding(Id(1)), Some(Id(200)));
}

#[tokio::test]
async fn concurrent_assignments_of_one_captain_bind_once() {
    let store = Arc::new(FakeStore::new(Behavior::Succeed));
    let handle = drafted(store.clone()).await;

    let (a, b) = tokio::join!(
        handle.assign_captain_to_team("3", "100", DEADLINE),
        handle.assign_captain_to_team("3", "200", DEADLINE),
    );
    // Both may pass validation, but only one commit can win locally.
    assert!(a.is_ok() || b.is_ok());
    let snapshot = handle.snapshot().await.unwrap();
    assert!(snapshot.unassigned_captains.iter().all(|c| c.id != Id(3)));
}

// ===========================================================================
// Teams
// ===========================================================================

#[tokio::test]
async fn created_team_accepts_captains() {
    let store = Arc::new(FakeStore::new(Behavior::Succeed));
    let handle = drafted(store.clone()).await;

    let created = handle.create_team("Green", DEADLINE).await.unwrap();
    let team = created.value;
    assert!(created.snapshot.team(team.id).is_some());
    handle
        .assign_captain_to_team("3", &team.id.to_string(), DEADLINE)
        .await
        .unwrap();
    assert_eq!(store.binding(Id(3)), Some(team.id));
}

#[tokio::test]
async fn deleting_team_returns_captain_to_unassigned() {
    let store = Arc::new(FakeStore::new(Behavior::Succeed));
    let handle = drafted(store.clone()).await;
    handle
        .assign_captain_to_team("1", "100", DEADLINE)
        .await
        .unwrap();

    let deleted = handle.delete_team("100", DEADLINE).await.unwrap();
    assert_eq!(deleted.value, Id(100));

    let snapshot = deleted.snapshot;
    assert!(snapshot.team(Id(100)).is_none());
    assert_eq!(snapshot.unassigned_captains.len(), 3);
    assert_eq!(snapshot.unassigned_captains, snapshot.draft_order);
}

#[tokio::test]
async fn refresh_picks_up_remote_teams() {
    let store = Arc::new(FakeStore::new(Behavior::Succeed));
    let handle = drafted(store.clone()).await;
    store.teams.lock().unwrap().push(Team::new(300u64, "Green"));

    let refreshed = handle.refresh_teams(DEADLINE).await.unwrap();
    assert_eq!(refreshed.value, 3);
    assert!(refreshed.snapshot.team(Id(300)).is_some());
}

#[tokio::test]
async fn team_deleted_remotely_frees_its_captain_on_refresh() {
    let store = Arc::new(FakeStore::new(Behavior::Succeed));
    let handle = drafted(store.clone()).await;
    handle
        .assign_captain_to_team("2", "200", DEADLINE)
        .await
        .unwrap();
    store.teams.lock().unwrap().retain(|t| t.id != Id(200));

    let refreshed = handle.refresh_teams(DEADLINE).await.unwrap();
    assert_eq!(refreshed.value, 1);
    assert!(refreshed
        .snapshot
        .unassigned_captains
        .iter()
        .any(|c| c.id == Id(2)));
    assert_eq!(refreshed.snapshot.unassigned_captains.len(), 3);
}
