// HTTP client for the HiveMind tournament API.
//
// Implements `TournamentStore` over the public REST endpoints. Reads are
// retried with exponential backoff; writes are sent exactly once.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use hm_drafter_core::model::{FormField, Player, Team};
use hm_drafter_core::{Id, StoreError, TournamentStore};

use crate::parse::{
    attach_rosters, parse_form_field, parse_page, parse_player, parse_team, parse_tournament, Page,
};
use crate::tournament::Tournament;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const DEFAULT_BASE_URL: &str = "https://kqhivemind.com/api/tournament";

/// Upper bound on listing pages walked while looking for a scene's events.
const MAX_LISTING_PAGES: u32 = 50;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Total tries for a read, including the first.
    pub read_attempts: u32,
    /// Delay before the first retry; doubled for each one after.
    pub retry_backoff: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(10),
            read_attempts: 3,
            retry_backoff: Duration::from_millis(250),
        }
    }
}

// ---------------------------------------------------------------------------
// HiveMindClient
// ---------------------------------------------------------------------------

pub struct HiveMindClient {
    http: reqwest::Client,
    config: ApiConfig,
}

impl HiveMindClient {
    pub fn new(config: ApiConfig) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(request_error)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// `{base}/{resource}/?format=json&k=v...`
    pub fn listing_url(&self, resource: &str, query: &[(&str, String)]) -> String {
        let mut url = format!(
            "{}/{}/?format=json",
            self.config.base_url.trim_end_matches('/'),
            resource
        );
        for (key, value) in query {
            url.push('&');
            url.push_str(key);
            url.push('=');
            url.push_str(value);
        }
        url
    }

    /// `{base}/{resource}/{id}/?tournament_id=..&format=json`
    pub fn item_url(&self, resource: &str, id: Id, tournament: Id) -> String {
        format!(
            "{}/{}/{}/?tournament_id={}&format=json",
            self.config.base_url.trim_end_matches('/'),
            resource,
            id,
            tournament
        )
    }

    /// The most recent `limit` tournaments run by `scene`, newest first as
    /// the API lists them.
    pub async fn list_tournaments(
        &self,
        scene: &str,
        limit: usize,
    ) -> Result<Vec<Tournament>, StoreError> {
        info!("Fetching tournaments for scene '{}'", scene);
        let mut found = Vec::new();

        walk_pages(
            MAX_LISTING_PAGES,
            move |page| async move {
                let url = self.listing_url("tournament", &[("page", page.to_string())]);
                Ok(parse_page(self.get_json(&url).await?))
            },
            |results| {
                for data in &results {
                    match parse_tournament(data) {
                        Ok(t) if t.scene_name == scene => {
                            found.push(t);
                            if found.len() >= limit {
                                return false;
                            }
                        }
                        Ok(_) => {}
                        Err(e) => warn!("Skipping tournament entry: {}", e),
                    }
                }
                true
            },
        )
        .await?;

        debug!("Found {} tournaments for '{}'", found.len(), scene);
        Ok(found)
    }

    /// Teams with their rosters filled in from the player list.
    pub async fn fetch_teams_with_rosters(&self, tournament: Id) -> Result<Vec<Team>, StoreError> {
        let (mut teams, players) = futures_util::try_join!(
            self.fetch_teams(tournament),
            self.fetch_players(tournament)
        )?;
        attach_rosters(&mut teams, &players);
        Ok(teams)
    }

    // -----------------------------------------------------------------------
    // Transport
    // -----------------------------------------------------------------------

    async fn get_json(&self, url: &str) -> Result<Value, StoreError> {
        retry_read(url, self.config.read_attempts, self.config.retry_backoff, || {
            self.get_once(url)
        })
        .await
    }

    async fn get_once(&self, url: &str) -> Result<Value, StoreError> {
        debug!("GET {}", url);
        let resp = self.http.get(url).send().await.map_err(request_error)?;
        let resp = expect_status(resp, &[200]).await?;
        resp.json::<Value>().await.map_err(request_error)
    }

    /// Walk every page of a tournament-scoped listing.
    async fn fetch_all(&self, resource: &str, tournament: Id) -> Result<Vec<Value>, StoreError> {
        let mut all = Vec::new();
        let pages = walk_pages(
            u32::MAX,
            move |page| async move {
                let url = self.listing_url(
                    resource,
                    &[
                        ("tournament_id", tournament.to_string()),
                        ("page", page.to_string()),
                    ],
                );
                Ok(parse_page(self.get_json(&url).await?))
            },
            |results| {
                all.extend(results);
                true
            },
        )
        .await?;
        debug!("Fetched {} {} records over {} pages", all.len(), resource, pages);
        Ok(all)
    }
}

#[async_trait]
impl TournamentStore for HiveMindClient {
    async fn fetch_form_field_catalog(&self, tournament: Id) -> Result<Vec<FormField>, StoreError> {
        let raw = self.fetch_all("player-info-field", tournament).await?;
        let mut catalog = Vec::with_capacity(raw.len());
        for data in &raw {
            match parse_form_field(data) {
                Ok(field) => catalog.push(field),
                Err(e) => warn!("Skipping form field: {}", e),
            }
        }
        info!("Form field catalog has {} entries", catalog.len());
        Ok(catalog)
    }

    async fn fetch_players(&self, tournament: Id) -> Result<Vec<Player>, StoreError> {
        let catalog = self.fetch_form_field_catalog(tournament).await?;
        let raw = self.fetch_all("player", tournament).await?;

        let mut players = Vec::with_capacity(raw.len());
        for data in &raw {
            match parse_player(data, &catalog) {
                Ok(player) => players.push(player),
                Err(e) => warn!("Skipping player: {}", e),
            }
        }
        info!("Fetched {} players for tournament {}", players.len(), tournament);
        Ok(players)
    }

    async fn fetch_teams(&self, tournament: Id) -> Result<Vec<Team>, StoreError> {
        let raw = self.fetch_all("team", tournament).await?;
        let teams = raw.iter().map(parse_team).collect::<Result<Vec<_>, _>>()?;
        info!("Fetched {} teams for tournament {}", teams.len(), tournament);
        Ok(teams)
    }

    async fn create_team(&self, name: &str, tournament: Id) -> Result<Team, StoreError> {
        let url = self.listing_url("team", &[("tournament_id", tournament.to_string())]);
        let body = json!({ "name": name, "tournament": tournament.get() });

        debug!("POST {}", url);
        let resp = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(request_error)?;
        let resp = expect_status(resp, &[200, 201]).await?;
        let created: Value = resp.json().await.map_err(request_error)?;
        let team = parse_team(&created)?;

        info!("Created team {} '{}'", team.id, team.name);
        Ok(team)
    }

    async fn delete_team(&self, team: Id, tournament: Id) -> Result<Vec<Id>, StoreError> {
        let roster: Vec<Id> = self
            .fetch_players(tournament)
            .await?
            .into_iter()
            .filter(|p| p.team == Some(team))
            .map(|p| p.id)
            .collect();

        let url = self.item_url("team", team, tournament);
        debug!("DELETE {}", url);
        let resp = self.http.delete(&url).send().await.map_err(request_error)?;
        expect_status(resp, &[200, 202, 204]).await?;

        info!("Deleted team {} ({} players released)", team, roster.len());
        Ok(roster)
    }

    async fn bind_player_to_team(
        &self,
        player: Id,
        team: Id,
        tournament: Id,
    ) -> Result<(), StoreError> {
        let url = self.item_url("player", player, tournament);
        let body = json!({ "team": team.get() });

        debug!("PATCH {}", url);
        let resp = self
            .http
            .patch(&url)
            .json(&body)
            .send()
            .await
            .map_err(request_error)?;
        expect_status(resp, &[200, 204]).await?;

        info!("Assigned player {} to team {}", player, team);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Request pages `1, 2, ...` and hand each page's results to `visit` until a
/// page comes back empty, the API stops linking a `next` page, `visit`
/// returns `false`, or `max_pages` have been read. Returns the number of
/// pages requested.
pub async fn walk_pages<F, Fut, V>(
    max_pages: u32,
    mut fetch: F,
    mut visit: V,
) -> Result<u32, StoreError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Page, StoreError>>,
    V: FnMut(Vec<Value>) -> bool,
{
    let mut page = 0;
    while page < max_pages {
        page += 1;
        let body = fetch(page).await?;
        let more = body.has_more();
        if body.results.is_empty() {
            break;
        }
        if !visit(body.results) || !more {
            break;
        }
    }
    if page == max_pages {
        debug!("Stopped paging after {} pages", max_pages);
    }
    Ok(page)
}

/// Run a read up to `attempts` times, sleeping `backoff`, `2 * backoff`, ...
/// between tries. Only retryable errors are repeated.
pub async fn retry_read<T, F, Fut>(
    what: &str,
    attempts: u32,
    backoff: Duration,
    mut op: F,
) -> Result<T, StoreError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, StoreError>>,
{
    let attempts = attempts.max(1);
    let mut delay = backoff;
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < attempts => {
                warn!(
                    "Read of {} failed (attempt {}/{}): {}; retrying in {:?}",
                    what, attempt, attempts, e, delay
                );
                tokio::time::sleep(delay).await;
                delay = delay.saturating_mul(2);
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

async fn expect_status(
    resp: reqwest::Response,
    accepted: &[u16],
) -> Result<reqwest::Response, StoreError> {
    let status = resp.status().as_u16();
    if accepted.contains(&status) {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(StoreError::Status { status, body })
}

fn request_error(e: reqwest::Error) -> StoreError {
    if e.is_timeout() {
        StoreError::Timeout
    } else if e.is_decode() {
        StoreError::Decode(e.to_string())
    } else {
        StoreError::Transport(e.to_string())
    }
}
