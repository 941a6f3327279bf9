//! The authoritative match state and the narrow operations that mutate it.
//!
//! One [`MatchStore`] owns every player record for the lifetime of the
//! process. All mutation paths go through its operations, which take the
//! single readers/writer lock; snapshots take the shared side. No operation
//! performs I/O or sleeps while holding the lock — log-worthy observations
//! are returned to the caller and scheduled work (respawns) runs on separate
//! tasks that re-enter the store by id.

use crate::combat::{self, Aim};
use crate::error::StateError;
use protocol::math::Vec3;
use protocol::{MAX_HEALTH, MatchSnapshot, Player, PlayerId};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::time::Instant;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Damage applied per successful hit. Four shots kill from full health.
pub const SHOT_DAMAGE: i32 = 25;

/// Cadence of the periodic status summary, in seconds of game time.
const STATUS_INTERVAL: f64 = 30.0;

/// Kill streak step that gets celebrated in the log.
const KILL_MILESTONE_STEP: u32 = 5;

/// Minimum kills of the top two live players for a close-match notice.
const CLOSE_MATCH_MIN_KILLS: u32 = 6;

/// Maximum kill gap between the top two live players for a close-match notice.
const CLOSE_MATCH_MAX_GAP: u32 = 2;

/// The fixed spawn locations of the arena. The table is spaced widely enough
/// that the plain rotation never drops two fresh spawns on top of each other.
pub fn default_spawn_points() -> Vec<Vec3> {
    vec![
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(24.0, 0.0, 10.0),
        Vec3::new(-18.0, 0.0, 22.0),
        Vec3::new(30.0, 0.0, -16.0),
        Vec3::new(-26.0, 0.0, -12.0),
        Vec3::new(8.0, 0.0, 34.0),
        Vec3::new(-12.0, 0.0, -30.0),
        Vec3::new(36.0, 0.0, 24.0),
    ]
}

/// Result of one resolved shot that grazed somebody.
#[derive(Debug, Clone, PartialEq)]
pub struct ShotOutcome {
    /// The struck player.
    pub victim: PlayerId,
    /// Health of the victim after the damage was applied.
    pub victim_health: i32,
    /// True when this hit killed the victim.
    pub fatal: bool,
}

/// Log-worthy observations collected by one tick, emitted after the lock drops.
#[derive(Debug, Clone, PartialEq)]
pub enum TickEvent {
    /// Periodic status line, once per 30 seconds of game time.
    Status {
        game_time: f64,
        player_count: usize,
        alive_count: usize,
        /// Name and kill count of the current leader, if anyone is in.
        leader: Option<(String, u32)>,
    },
    /// A live player reached another multiple-of-five kill streak.
    KillMilestone { name: String, kills: u32 },
    /// The two leading live players are close together at high kill counts.
    CloseMatch {
        leader: String,
        leader_kills: u32,
        runner_up: String,
        runner_up_kills: u32,
    },
}

/// Summary for the HTTP status sideband.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchStatus {
    pub players_connected: usize,
    pub match_active: bool,
    pub match_id: String,
    pub game_time: f64,
}

/// Mutable match data behind the lock.
struct MatchInner {
    players: HashMap<PlayerId, Player>,
    game_time: f64,
    is_active: bool,
    match_id: String,
    last_tick: Instant,
    spawn_cursor: usize,
    /// Kill milestones that were already announced, so ticks do not repeat them.
    announced_milestones: HashSet<(PlayerId, u32)>,
    /// Set while a close-match notice is standing, cleared when the gap opens up.
    close_match_flagged: bool,
}

/// The in-memory authoritative world. Cheap to share behind an `Arc`.
pub struct MatchStore {
    inner: RwLock<MatchInner>,
    spawn_points: Vec<Vec3>,
    max_players: usize,
}

impl MatchStore {
    /// Creates an empty match around the given spawn table.
    ///
    /// # Panics
    /// When the spawn table is empty. The table is compiled in, so this is a
    /// programming error and not a runtime condition.
    pub fn new(spawn_points: Vec<Vec3>, max_players: usize) -> MatchStore {
        assert!(!spawn_points.is_empty(), "spawn table must not be empty");
        MatchStore {
            inner: RwLock::new(MatchInner {
                players: HashMap::new(),
                game_time: 0.0,
                is_active: false,
                match_id: format!("match-{}", Uuid::new_v4()),
                last_tick: Instant::now(),
                spawn_cursor: 0,
                announced_milestones: HashSet::new(),
                close_match_flagged: false,
            }),
            spawn_points,
            max_players,
        }
    }

    /// Inserts a new player with full health at the next spawn point.
    /// The match starts automatically once the second player is in.
    pub async fn add_player(&self, id: &str) -> Result<Player, StateError> {
        let mut inner = self.inner.write().await;
        if inner.players.len() >= self.max_players {
            return Err(StateError::Full);
        }
        if inner.players.contains_key(id) {
            return Err(StateError::Duplicate(id.to_string()));
        }

        let position = self.next_spawn(&mut inner);
        let player = Player {
            id: id.to_string(),
            display_name: default_display_name(id),
            position,
            rotation: Vec3::default(),
            health: MAX_HEALTH,
            is_alive: true,
            kills: 0,
            deaths: 0,
        };
        inner.players.insert(id.to_string(), player.clone());

        if !inner.is_active && inner.players.len() >= 2 {
            inner.is_active = true;
            inner.game_time = 0.0;
        }
        Ok(player)
    }

    /// Removes a player. The second removal of the same id reports the player
    /// as unknown, so callers can treat repeated cleanup as a no-op.
    pub async fn remove_player(&self, id: &str) -> Result<(), StateError> {
        let mut inner = self.inner.write().await;
        match inner.players.remove(id) {
            Some(_) => Ok(()),
            None => Err(StateError::UnknownPlayer(id.to_string())),
        }
    }

    /// A consistent point-in-time copy of the match, suitable for broadcast.
    pub async fn snapshot(&self) -> MatchSnapshot {
        let inner = self.inner.read().await;
        MatchSnapshot {
            players: inner.players.clone(),
            game_time: inner.game_time,
            is_active: inner.is_active,
            match_id: inner.match_id.clone(),
        }
    }

    /// Summary for the `/status` sideband without copying the players map.
    pub async fn status(&self) -> MatchStatus {
        let inner = self.inner.read().await;
        MatchStatus {
            players_connected: inner.players.len(),
            match_active: inner.is_active,
            match_id: inner.match_id.clone(),
            game_time: inner.game_time,
        }
    }

    /// Overwrites position and/or rotation from a `move` or `jump` action.
    pub async fn update_transform(
        &self,
        id: &str,
        position: Option<Vec3>,
        rotation: Option<Vec3>,
    ) -> Result<(), StateError> {
        let mut inner = self.inner.write().await;
        let player = inner
            .players
            .get_mut(id)
            .ok_or_else(|| StateError::UnknownPlayer(id.to_string()))?;
        if !player.is_alive {
            return Err(StateError::NotAlive(id.to_string()));
        }
        if let Some(position) = position {
            player.position = position;
        }
        if let Some(rotation) = rotation {
            player.rotation = rotation;
        }
        Ok(())
    }

    /// Existence and liveness check for actions without server-visible state,
    /// such as `reload`.
    pub async fn ensure_alive(&self, id: &str) -> Result<(), StateError> {
        let inner = self.inner.read().await;
        let player = inner
            .players
            .get(id)
            .ok_or_else(|| StateError::UnknownPlayer(id.to_string()))?;
        if !player.is_alive {
            return Err(StateError::NotAlive(id.to_string()));
        }
        Ok(())
    }

    /// Sets the display name. The dispatcher has validated it already.
    pub async fn update_player_name(&self, id: &str, name: String) -> Result<(), StateError> {
        let mut inner = self.inner.write().await;
        let player = inner
            .players
            .get_mut(id)
            .ok_or_else(|| StateError::UnknownPlayer(id.to_string()))?;
        player.display_name = name;
        Ok(())
    }

    /// Applies a client-triggered heal. The requested health is clamped into
    /// the valid range. A clamp to zero runs the regular death bookkeeping
    /// without crediting anybody; the returned flag tells the caller to
    /// schedule a respawn. Dead players cannot be healed.
    pub async fn apply_heal(&self, id: &str, new_health: i64) -> Result<bool, StateError> {
        let mut inner = self.inner.write().await;
        let player = inner
            .players
            .get_mut(id)
            .ok_or_else(|| StateError::UnknownPlayer(id.to_string()))?;
        if !player.is_alive {
            return Err(StateError::NotAlive(id.to_string()));
        }
        player.health = new_health.clamp(0, MAX_HEALTH as i64) as i32;
        if player.health == 0 {
            player.is_alive = false;
            player.deaths += 1;
            return Ok(true);
        }
        Ok(false)
    }

    /// Resolves one shot and applies its damage in a single critical section.
    ///
    /// Returns `Ok(None)` when the ray misses everyone or the aim is
    /// degenerate. On a fatal hit the victim's death and the shooter's kill
    /// are booked before the lock is released; scheduling the respawn is the
    /// caller's job.
    pub async fn handle_shot(
        &self,
        shooter_id: &str,
        aim: Aim,
    ) -> Result<Option<ShotOutcome>, StateError> {
        let mut inner = self.inner.write().await;
        let shooter = inner
            .players
            .get(shooter_id)
            .ok_or_else(|| StateError::UnknownPlayer(shooter_id.to_string()))?;
        if !shooter.is_alive {
            return Err(StateError::NotAlive(shooter_id.to_string()));
        }
        let origin = shooter.position;
        let Some(direction) = aim.ray_direction(origin) else {
            return Ok(None);
        };

        let candidates: Vec<(PlayerId, Vec3)> = inner
            .players
            .values()
            .filter(|p| p.id != shooter_id && p.is_alive)
            .map(|p| (p.id.clone(), p.position))
            .collect();
        let Some(hit) = combat::resolve_hit(origin, direction, &candidates) else {
            return Ok(None);
        };

        let Some(victim) = inner.players.get_mut(&hit.victim) else {
            return Ok(None);
        };
        victim.health -= SHOT_DAMAGE;
        let fatal = victim.health <= 0;
        if fatal {
            victim.health = 0;
            victim.is_alive = false;
            victim.deaths += 1;
        }
        let outcome = ShotOutcome {
            victim: hit.victim.clone(),
            victim_health: victim.health,
            fatal,
        };
        if fatal {
            // Kill credit belongs into the same critical section as the death.
            if let Some(shooter) = inner.players.get_mut(shooter_id) {
                shooter.kills += 1;
            }
        }
        Ok(Some(outcome))
    }

    /// Reinserts a dead player with full health at a fresh spawn point,
    /// keeping kills and deaths. Returns false when the player left during
    /// the respawn delay or was revived by other means.
    pub async fn respawn(&self, id: &str) -> bool {
        let mut inner = self.inner.write().await;
        match inner.players.get(id) {
            Some(player) if !player.is_alive => {}
            _ => return false,
        }
        let position = self.next_spawn(&mut inner);
        if let Some(player) = inner.players.get_mut(id) {
            player.health = MAX_HEALTH;
            player.is_alive = true;
            player.position = position;
            return true;
        }
        false
    }

    /// Starts the match explicitly. Requires at least two players.
    pub async fn start_match(&self) -> Result<(), StateError> {
        let mut inner = self.inner.write().await;
        if inner.players.len() < 2 {
            return Err(StateError::TooFewPlayers);
        }
        inner.is_active = true;
        inner.game_time = 0.0;
        Ok(())
    }

    /// Deactivates the match, typically on shutdown.
    pub async fn end_match(&self) {
        self.inner.write().await.is_active = false;
    }

    /// Advances the match clock by the real elapsed time since the previous
    /// tick and collects the periodic bookkeeping. The caller logs the
    /// returned events after the lock is released.
    pub async fn tick(&self) -> Vec<TickEvent> {
        let mut inner = self.inner.write().await;
        let now = Instant::now();
        let delta = now.duration_since(inner.last_tick).as_secs_f64();
        inner.last_tick = now;
        let previous = inner.game_time;
        inner.game_time += delta;

        let mut events = Vec::new();
        if (previous / STATUS_INTERVAL).floor() != (inner.game_time / STATUS_INTERVAL).floor() {
            events.push(TickEvent::Status {
                game_time: inner.game_time,
                player_count: inner.players.len(),
                alive_count: inner.players.values().filter(|p| p.is_alive).count(),
                leader: inner
                    .players
                    .values()
                    .max_by_key(|p| p.kills)
                    .map(|p| (p.display_name.clone(), p.kills)),
            });
        }

        // Kill streaks, announced once per player and step.
        let mut fresh_milestones = Vec::new();
        for player in inner.players.values() {
            if !player.is_alive || player.kills == 0 || player.kills % KILL_MILESTONE_STEP != 0 {
                continue;
            }
            let key = (player.id.clone(), player.kills);
            if !inner.announced_milestones.contains(&key) {
                fresh_milestones.push((key, player.display_name.clone()));
            }
        }
        for ((id, kills), name) in fresh_milestones {
            inner.announced_milestones.insert((id, kills));
            events.push(TickEvent::KillMilestone { name, kills });
        }

        // Close-match notice while the two leading live players stay together.
        let mut leaders: Vec<(&String, u32)> = inner
            .players
            .values()
            .filter(|p| p.is_alive)
            .map(|p| (&p.display_name, p.kills))
            .collect();
        leaders.sort_by(|a, b| b.1.cmp(&a.1));
        let close = matches!(
            leaders.as_slice(),
            [(_, first), (_, second), ..]
                if *second >= CLOSE_MATCH_MIN_KILLS && first - second <= CLOSE_MATCH_MAX_GAP
        );
        if close && !inner.close_match_flagged {
            if let [(leader, leader_kills), (runner_up, runner_up_kills), ..] = leaders.as_slice() {
                events.push(TickEvent::CloseMatch {
                    leader: (*leader).clone(),
                    leader_kills: *leader_kills,
                    runner_up: (*runner_up).clone(),
                    runner_up_kills: *runner_up_kills,
                });
            }
        }
        inner.close_match_flagged = close;

        events
    }

    /// Deterministic rotation through the spawn table.
    fn next_spawn(&self, inner: &mut MatchInner) -> Vec3 {
        let point = self.spawn_points[inner.spawn_cursor % self.spawn_points.len()];
        inner.spawn_cursor += 1;
        point
    }
}

/// Fallback display name derived from the id prefix, e.g. `Player-1a2b3c4d`.
fn default_display_name(id: &str) -> String {
    let prefix: String = id.chars().take(8).collect();
    format!("Player-{prefix}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    fn store() -> MatchStore {
        MatchStore::new(default_spawn_points(), 50)
    }

    fn shot_down_x() -> Aim {
        Aim::Direction(Vec3::new(1.0, 0.0, 0.0))
    }

    /// Places two players on the x axis, shooter at the origin.
    async fn duel_setup(store: &MatchStore) -> (PlayerId, PlayerId) {
        store.add_player("p1").await.unwrap();
        store.add_player("p2").await.unwrap();
        store
            .update_transform("p1", Some(Vec3::default()), None)
            .await
            .unwrap();
        store
            .update_transform("p2", Some(Vec3::new(5.0, 0.0, 0.0)), None)
            .await
            .unwrap();
        ("p1".to_string(), "p2".to_string())
    }

    #[tokio::test]
    async fn players_spawn_with_full_health_at_rotating_spawn_points() {
        let store = store();
        let first = store.add_player("p1").await.unwrap();
        let second = store.add_player("p2").await.unwrap();
        assert_eq!(first.health, MAX_HEALTH);
        assert!(first.is_alive);
        assert_eq!(first.position, default_spawn_points()[0]);
        assert_eq!(second.position, default_spawn_points()[1]);
        assert_eq!(first.display_name, "Player-p1");
    }

    #[tokio::test]
    async fn capacity_and_duplicate_ids_are_rejected() {
        let store = MatchStore::new(default_spawn_points(), 2);
        store.add_player("p1").await.unwrap();
        assert_eq!(
            store.add_player("p1").await,
            Err(StateError::Duplicate("p1".to_string()))
        );
        store.add_player("p2").await.unwrap();
        assert_eq!(store.add_player("p3").await, Err(StateError::Full));
        assert_eq!(store.snapshot().await.players.len(), 2);
    }

    #[tokio::test]
    async fn add_then_remove_restores_the_player_count() {
        let store = store();
        let before = store.snapshot().await.players.len();
        store.add_player("ghost").await.unwrap();
        store.remove_player("ghost").await.unwrap();
        assert_eq!(store.snapshot().await.players.len(), before);
        assert_eq!(
            store.remove_player("ghost").await,
            Err(StateError::UnknownPlayer("ghost".to_string()))
        );
    }

    #[tokio::test]
    async fn match_starts_automatically_with_the_second_player() {
        let store = store();
        store.add_player("p1").await.unwrap();
        assert_eq!(store.start_match().await, Err(StateError::TooFewPlayers));
        assert!(!store.snapshot().await.is_active);
        store.add_player("p2").await.unwrap();
        assert!(store.snapshot().await.is_active);
    }

    #[tokio::test]
    async fn repeated_identical_moves_are_idempotent() {
        let store = store();
        store.add_player("p1").await.unwrap();
        let target = Vec3::new(3.0, 1.0, -2.0);
        store
            .update_transform("p1", Some(target), None)
            .await
            .unwrap();
        let once = store.snapshot().await.players["p1"].position;
        store
            .update_transform("p1", Some(target), None)
            .await
            .unwrap();
        let twice = store.snapshot().await.players["p1"].position;
        assert_eq!(once, twice);
    }

    #[tokio::test]
    async fn four_hits_kill_with_exactly_one_kill_and_death() {
        let store = store();
        let (shooter, victim) = duel_setup(&store).await;

        for expected in [75, 50, 25] {
            let outcome = store.handle_shot(&shooter, shot_down_x()).await.unwrap();
            let outcome = outcome.unwrap();
            assert_eq!(outcome.victim, victim);
            assert_eq!(outcome.victim_health, expected);
            assert!(!outcome.fatal);
        }
        let fatal = store
            .handle_shot(&shooter, shot_down_x())
            .await
            .unwrap()
            .unwrap();
        assert!(fatal.fatal);

        let snapshot = store.snapshot().await;
        let dead = &snapshot.players[&victim];
        assert_eq!(dead.health, 0);
        assert!(!dead.is_alive);
        assert_eq!(dead.deaths, 1);
        assert_eq!(snapshot.players[&shooter].kills, 1);
    }

    #[tokio::test]
    async fn dead_players_cannot_act_and_are_not_hit() {
        let store = store();
        let (shooter, victim) = duel_setup(&store).await;
        for _ in 0..4 {
            store.handle_shot(&shooter, shot_down_x()).await.unwrap();
        }

        assert_eq!(
            store
                .update_transform(&victim, Some(Vec3::default()), None)
                .await,
            Err(StateError::NotAlive(victim.clone()))
        );
        assert_eq!(
            store.handle_shot(&victim, shot_down_x()).await,
            Err(StateError::NotAlive(victim.clone()))
        );
        // Corpses are no candidates, so the next shot into the same ray misses.
        let outcome = store.handle_shot(&shooter, shot_down_x()).await.unwrap();
        assert!(outcome.is_none());
    }

    #[tokio::test]
    async fn heal_clamps_and_equal_health_is_a_no_op() {
        let store = store();
        store.add_player("p1").await.unwrap();
        let died = store.apply_heal("p1", 250).await.unwrap();
        assert!(!died);
        assert_eq!(store.snapshot().await.players["p1"].health, MAX_HEALTH);

        let before = store.snapshot().await;
        let died = store.apply_heal("p1", MAX_HEALTH as i64).await.unwrap();
        assert!(!died);
        let after = store.snapshot().await;
        assert_eq!(
            before.players["p1"].health,
            after.players["p1"].health
        );
    }

    #[tokio::test]
    async fn heal_to_zero_books_a_death_without_kill_credit() {
        let store = store();
        let (_, victim) = duel_setup(&store).await;
        let died = store.apply_heal(&victim, -20).await.unwrap();
        assert!(died);
        let snapshot = store.snapshot().await;
        let player = &snapshot.players[&victim];
        assert_eq!(player.health, 0);
        assert!(!player.is_alive);
        assert_eq!(player.deaths, 1);
        assert!(snapshot.players.values().all(|p| p.kills == 0));
        // And dead players stay beyond healing.
        assert_eq!(
            store.apply_heal(&victim, 50).await,
            Err(StateError::NotAlive(victim.clone()))
        );
    }

    #[tokio::test]
    async fn respawn_restores_health_and_position_but_keeps_the_score() {
        let store = store();
        let (shooter, victim) = duel_setup(&store).await;
        for _ in 0..4 {
            store.handle_shot(&shooter, shot_down_x()).await.unwrap();
        }

        assert!(store.respawn(&victim).await);
        let snapshot = store.snapshot().await;
        let revived = &snapshot.players[&victim];
        assert_eq!(revived.health, MAX_HEALTH);
        assert!(revived.is_alive);
        assert_eq!(revived.deaths, 1);
        assert!(default_spawn_points().contains(&revived.position));
        // A second respawn of a living player changes nothing.
        assert!(!store.respawn(&victim).await);
    }

    #[tokio::test]
    async fn respawn_after_disconnect_does_not_reinsert() {
        let store = store();
        let (shooter, victim) = duel_setup(&store).await;
        for _ in 0..4 {
            store.handle_shot(&shooter, shot_down_x()).await.unwrap();
        }
        store.remove_player(&victim).await.unwrap();

        assert!(!store.respawn(&victim).await);
        assert!(!store.snapshot().await.players.contains_key(&victim));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_shots_lose_no_damage() {
        let store = Arc::new(MatchStore::new(default_spawn_points(), 50));
        store.add_player("left").await.unwrap();
        store.add_player("right").await.unwrap();
        store.add_player("victim").await.unwrap();
        store
            .update_transform("left", Some(Vec3::new(-10.0, 0.0, 0.0)), None)
            .await
            .unwrap();
        store
            .update_transform("right", Some(Vec3::new(10.0, 0.0, 0.0)), None)
            .await
            .unwrap();
        store
            .update_transform("victim", Some(Vec3::default()), None)
            .await
            .unwrap();

        let from_left = {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .handle_shot("left", Aim::Direction(Vec3::new(1.0, 0.0, 0.0)))
                    .await
            })
        };
        let from_right = {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .handle_shot("right", Aim::Direction(Vec3::new(-1.0, 0.0, 0.0)))
                    .await
            })
        };
        from_left.await.unwrap().unwrap();
        from_right.await.unwrap().unwrap();

        let health = store.snapshot().await.players["victim"].health;
        assert_eq!(health, MAX_HEALTH - 2 * SHOT_DAMAGE);
    }

    #[tokio::test]
    async fn game_time_is_monotonic_across_ticks() {
        let store = store();
        store.tick().await;
        let first = store.snapshot().await.game_time;
        tokio::time::sleep(Duration::from_millis(5)).await;
        store.tick().await;
        let second = store.snapshot().await.game_time;
        assert!(second >= first);
    }

    #[tokio::test]
    async fn status_summary_fires_on_the_thirty_second_boundary() {
        let store = store();
        store.add_player("p1").await.unwrap();
        {
            let mut inner = store.inner.write().await;
            inner.game_time = STATUS_INTERVAL - 0.001;
            inner.last_tick = Instant::now() - Duration::from_millis(20);
        }
        let events = store.tick().await;
        assert!(events.iter().any(|event| matches!(
            event,
            TickEvent::Status { player_count: 1, alive_count: 1, .. }
        )));
        // The boundary was consumed, the next tick stays quiet.
        let events = store.tick().await;
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn kill_milestones_and_close_matches_are_announced_once() {
        let store = store();
        store.add_player("p1").await.unwrap();
        store.add_player("p2").await.unwrap();
        {
            let mut inner = store.inner.write().await;
            inner.players.get_mut("p1").unwrap().kills = 10;
            inner.players.get_mut("p2").unwrap().kills = 8;
        }

        let events = store.tick().await;
        assert!(events.iter().any(|event| matches!(
            event,
            TickEvent::KillMilestone { kills: 10, .. }
        )));
        assert!(events.iter().any(|event| matches!(
            event,
            TickEvent::CloseMatch { leader_kills: 10, runner_up_kills: 8, .. }
        )));

        // Neither notice repeats while the standings are unchanged.
        let events = store.tick().await;
        assert!(events.is_empty());
    }
}
