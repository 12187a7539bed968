use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::AbortHandle;
use tracing::{debug, info};

use crate::broadcaster::Broadcaster;
use crate::websocket::connection::{ConnectionError, Membership};
use crate::websocket::{ConnectionId, ConnectionRegistry};
use party_core::{GroupSession, Outcome, RoundSettings};
use party_types::{PlayerId, ServerMessage, SessionStateSnapshot};

pub const MAX_GROUP_NAME_CHARS: usize = 64;

#[derive(Debug, Error)]
pub enum GroupError {
    #[error("group name must be between 1 and {} characters", MAX_GROUP_NAME_CHARS)]
    InvalidGroupName,

    #[error("connection {0} has not joined a group")]
    NotInGroup(ConnectionId),

    #[error(transparent)]
    Connection(#[from] ConnectionError),
}

/// Current time on the tokio clock, so paused-time tests drive deadlines.
pub fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}

struct ActiveGroup {
    session: GroupSession,
    members: HashMap<ConnectionId, PlayerId>,
    timers: Vec<AbortHandle>,
    // Set once the last player leaves; the entry is about to be removed
    closed: bool,
}

impl ActiveGroup {
    fn new(session: GroupSession) -> Self {
        Self {
            session,
            members: HashMap::new(),
            timers: Vec::new(),
            closed: false,
        }
    }

    fn close(&mut self) {
        self.closed = true;
        for timer in self.timers.drain(..) {
            timer.abort();
        }
    }
}

type SharedGroup = Arc<Mutex<ActiveGroup>>;

/// Directory of live groups. Each group sits behind its own mutex, so
/// actions and timer expiries on one group run one at a time while other
/// groups proceed in parallel.
pub struct GroupManager {
    groups: DashMap<String, SharedGroup>,
    registry: Arc<ConnectionRegistry>,
    broadcaster: Broadcaster,
    settings: RoundSettings,
}

impl GroupManager {
    pub fn new(registry: Arc<ConnectionRegistry>, settings: RoundSettings) -> Self {
        Self {
            groups: DashMap::new(),
            broadcaster: Broadcaster::new(registry.clone()),
            registry,
            settings,
        }
    }

    fn group(&self, name: &str) -> Option<SharedGroup> {
        self.groups.get(name).map(|entry| entry.value().clone())
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn has_group(&self, name: &str) -> bool {
        self.groups.contains_key(name)
    }

    /// Add the connection's player to `group`, creating the group if needed.
    /// A connection already in a group leaves it first.
    pub async fn join(
        &self,
        connection_id: ConnectionId,
        name: &str,
        group: &str,
    ) -> Result<PlayerId, GroupError> {
        let group = group.trim();
        if group.is_empty() || group.chars().count() > MAX_GROUP_NAME_CHARS {
            return Err(GroupError::InvalidGroupName);
        }

        if let Some(previous) = self.registry.unbind(connection_id).await {
            info!(
                "Connection {} moving from group {} to {}",
                connection_id, previous.group, group
            );
            self.remove_member(connection_id, previous).await;
        }

        loop {
            let shared = self
                .groups
                .entry(group.to_string())
                .or_insert_with(|| {
                    info!("Creating group {}", group);
                    let session = GroupSession::new(group, self.settings.clone());
                    Arc::new(Mutex::new(ActiveGroup::new(session)))
                })
                .value()
                .clone();

            let mut active = shared.lock().await;
            if active.closed {
                // Lost a race with the last player leaving; the entry is
                // being replaced
                drop(active);
                tokio::task::yield_now().await;
                continue;
            }

            let (player_id, _) = active.session.join(name);
            if let Err(e) = self
                .registry
                .bind(connection_id, group.to_string(), player_id)
                .await
            {
                // The connection vanished while we waited for the lock
                let _ = active.session.leave(player_id, now());
                if active.session.is_empty() {
                    active.close();
                    drop(active);
                    self.groups
                        .remove_if(group, |_, current| Arc::ptr_eq(current, &shared));
                }
                return Err(e.into());
            }

            active.members.insert(connection_id, player_id);
            let _ = self
                .registry
                .send_to_connection(
                    connection_id,
                    ServerMessage::Joined {
                        player_id,
                        group: group.to_string(),
                    },
                )
                .await;
            broadcast_group(&self.broadcaster, &active).await;
            return Ok(player_id);
        }
    }

    pub async fn advance(&self, connection_id: ConnectionId) -> Result<Outcome, GroupError> {
        self.apply(connection_id, |session, player_id, now| {
            session.advance(player_id, now)
        })
        .await
    }

    pub async fn submit_word(
        &self,
        connection_id: ConnectionId,
        text: &str,
    ) -> Result<Outcome, GroupError> {
        self.apply(connection_id, |session, player_id, now| {
            session.submit_word(player_id, text, now)
        })
        .await
    }

    pub async fn submit_vote(
        &self,
        connection_id: ConnectionId,
        target_index: i64,
    ) -> Result<Outcome, GroupError> {
        self.apply(connection_id, |session, player_id, now| {
            session.submit_vote(player_id, target_index, now)
        })
        .await
    }

    /// Run one action against the sender's group while holding its lock.
    /// A rejected action changes nothing; the sender alone gets the current
    /// snapshot back.
    async fn apply<F>(&self, connection_id: ConnectionId, action: F) -> Result<Outcome, GroupError>
    where
        F: FnOnce(&mut GroupSession, PlayerId, Instant) -> Outcome,
    {
        let membership = self
            .registry
            .membership(connection_id)
            .await
            .ok_or(GroupError::NotInGroup(connection_id))?;
        let shared = self
            .group(&membership.group)
            .ok_or(GroupError::NotInGroup(connection_id))?;

        let mut active = shared.lock().await;
        if active.closed {
            return Err(GroupError::NotInGroup(connection_id));
        }

        let outcome = action(&mut active.session, membership.player_id, now());
        arm_timers(&shared, &self.broadcaster, &mut active, &outcome);

        if let Some(rejection) = &outcome.rejection {
            debug!(
                "Ignored action from {} in group {}: {}",
                connection_id, membership.group, rejection
            );
        }

        if outcome.changed() {
            broadcast_group(&self.broadcaster, &active).await;
        } else if outcome.is_rejected() {
            let snapshot = active.session.snapshot(now());
            self.broadcaster
                .send_to(connection_id, membership.player_id, &snapshot)
                .await;
        }

        Ok(outcome)
    }

    /// Explicit leave: the connection stays open but belongs to no group.
    pub async fn leave(&self, connection_id: ConnectionId) -> Result<(), GroupError> {
        let membership = self
            .registry
            .unbind(connection_id)
            .await
            .ok_or(GroupError::NotInGroup(connection_id))?;
        self.remove_member(connection_id, membership).await;
        self.registry
            .send_to_connection(connection_id, ServerMessage::Left)
            .await?;
        Ok(())
    }

    pub async fn disconnect(&self, connection_id: ConnectionId) {
        if let Some(membership) = self.registry.unbind(connection_id).await {
            self.remove_member(connection_id, membership).await;
        }
    }

    async fn remove_member(&self, connection_id: ConnectionId, membership: Membership) {
        let Some(shared) = self.group(&membership.group) else {
            return;
        };

        let mut active = shared.lock().await;
        if active.closed {
            return;
        }

        active.members.remove(&connection_id);
        let outcome = active.session.leave(membership.player_id, now());
        if let Some(rejection) = &outcome.rejection {
            debug!("Leave from {} ignored: {}", connection_id, rejection);
        }

        if active.session.is_empty() {
            active.close();
            drop(active);
            self.groups
                .remove_if(&membership.group, |_, current| Arc::ptr_eq(current, &shared));
            info!("Group {} is empty and was closed", membership.group);
            return;
        }

        arm_timers(&shared, &self.broadcaster, &mut active, &outcome);
        if outcome.changed() {
            broadcast_group(&self.broadcaster, &active).await;
        }
    }

    /// Current snapshot with any secret removed, for observers outside the
    /// group. Applies overdue timer transitions first.
    pub async fn group_snapshot(&self, name: &str) -> Option<SessionStateSnapshot> {
        let shared = self.group(name)?;
        let mut active = shared.lock().await;
        if active.closed {
            return None;
        }

        let outcome = Outcome::new(active.session.poll_timers(now()), Ok(()));
        if outcome.changed() {
            arm_timers(&shared, &self.broadcaster, &mut active, &outcome);
            broadcast_group(&self.broadcaster, &active).await;
        }

        Some(active.session.snapshot(now()).redacted())
    }

    pub async fn cleanup_inactive_connections(&self, timeout: Duration) {
        for connection_id in self.registry.inactive_connections(timeout).await {
            info!("Removing inactive connection: {}", connection_id);
            self.disconnect(connection_id).await;
            self.registry.remove_connection(connection_id).await;
        }
    }
}

async fn broadcast_group(broadcaster: &Broadcaster, active: &ActiveGroup) {
    let snapshot = active.session.snapshot(now());
    broadcaster
        .send_snapshot(&snapshot, active.members.iter())
        .await;
}

fn arm_timers(
    shared: &SharedGroup,
    broadcaster: &Broadcaster,
    active: &mut ActiveGroup,
    outcome: &Outcome,
) {
    active.timers.retain(|timer| !timer.is_finished());
    for (round, deadline) in outcome.deadlines() {
        let timer = spawn_timer(shared.clone(), broadcaster.clone(), round, deadline);
        active.timers.push(timer);
    }
}

/// Wake at `deadline` and let the session apply whatever expired. The check
/// takes the group lock like any player action.
fn spawn_timer(
    shared: SharedGroup,
    broadcaster: Broadcaster,
    round: u64,
    deadline: Instant,
) -> AbortHandle {
    let task = tokio::spawn(async move {
        tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await;

        let mut active = shared.lock().await;
        if active.closed {
            return;
        }

        let events = active.session.handle_timer(round, now());
        if events.is_empty() {
            return;
        }

        debug!(
            "Timer for round {} in group {} applied {} events",
            round,
            active.session.name(),
            events.len()
        );
        let outcome = Outcome::new(events, Ok(()));
        arm_timers(&shared, &broadcaster, &mut active, &outcome);
        broadcast_group(&broadcaster, &active).await;
    });

    task.abort_handle()
}
