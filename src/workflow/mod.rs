//! Shared status lifecycle for assets, maintenance, transfers and acquisitions
//!
//! Each entity declares its legal moves as a static table and hooks that run on
//! entering a status. [`transition`] is the only way a status changes: it checks the
//! table before touching the entity, runs the hook, sets the status and appends exactly
//! one timeline entry.

pub mod acquisition;
pub mod asset;
pub mod maintenance;
pub mod transfer;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::enums::{AcquisitionStatus, AssetStatus, MaintenanceStatus, TransferStatus};

/// Immutable record appended to an entity timeline (the maintenance work-log uses the same shape)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[aliases(
    AssetTimelineEntry = TimelineEntry<AssetStatus>,
    MaintenanceLogEntry = TimelineEntry<MaintenanceStatus>,
    TransferTimelineEntry = TimelineEntry<TransferStatus>,
    AcquisitionTimelineEntry = TimelineEntry<AcquisitionStatus>
)]
pub struct TimelineEntry<S> {
    /// Status entered by this entry, absent for non-status events
    pub status: Option<S>,
    pub action: String,
    pub description: String,
    pub performed_by: Option<Uuid>,
    pub timestamp: DateTime<Utc>,
    /// Hours logged with this entry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_spent: Option<f64>,
}

/// Who is acting and what they supplied alongside the transition
#[derive(Debug, Clone)]
pub struct TransitionContext {
    pub actor: Option<Uuid>,
    pub now: DateTime<Utc>,
    pub action: Option<String>,
    pub notes: Option<String>,
    pub reason: Option<String>,
    pub time_spent: Option<f64>,
}

impl TransitionContext {
    pub fn by(actor: Uuid) -> Self {
        Self {
            actor: Some(actor),
            now: Utc::now(),
            action: None,
            notes: None,
            reason: None,
            time_spent: None,
        }
    }

    /// Transition performed without an authenticated actor
    pub fn system() -> Self {
        Self {
            actor: None,
            now: Utc::now(),
            action: None,
            notes: None,
            reason: None,
            time_spent: None,
        }
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn with_notes(mut self, notes: Option<String>) -> Self {
        self.notes = notes.filter(|n| !n.trim().is_empty());
        self
    }

    pub fn with_reason(mut self, reason: Option<String>) -> Self {
        self.reason = reason.filter(|r| !r.trim().is_empty());
        self
    }

    pub fn with_time_spent(mut self, hours: Option<f64>) -> Self {
        self.time_spent = hours;
        self
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum TransitionError {
    #[error("Cannot move {entity} from '{from}' to '{to}'")]
    Illegal {
        entity: &'static str,
        from: String,
        to: String,
    },

    #[error("{entity}: {reason}")]
    Precondition { entity: &'static str, reason: String },
}

/// A record with a status lifecycle
pub trait Lifecycle {
    type Status: Copy + Eq + Debug + Display + 'static;
    /// Cross-entity change requested by a hook, applied by the caller
    type Effect;

    /// Human label used in messages and logs
    const ENTITY: &'static str;
    const TRANSITIONS: &'static [(Self::Status, Self::Status)];

    fn id(&self) -> Uuid;
    fn status(&self) -> Self::Status;
    fn set_status(&mut self, status: Self::Status);
    fn timeline(&self) -> &[TimelineEntry<Self::Status>];
    fn timeline_mut(&mut self) -> &mut Vec<TimelineEntry<Self::Status>>;

    /// Actor recorded when the transition has none
    fn fallback_actor(&self) -> Option<Uuid>;

    /// Runs after the move was accepted and before the status is set
    fn on_enter(&mut self, next: Self::Status, ctx: &TransitionContext) -> Option<Self::Effect>;

    fn can_transition(&self, next: Self::Status) -> bool {
        Self::TRANSITIONS
            .iter()
            .any(|(from, to)| *from == self.status() && *to == next)
    }

    fn ensure_transition(&self, next: Self::Status) -> Result<(), TransitionError> {
        if self.can_transition(next) {
            Ok(())
        } else {
            Err(TransitionError::Illegal {
                entity: Self::ENTITY,
                from: self.status().to_string(),
                to: next.to_string(),
            })
        }
    }
}

/// Move `entity` to `next`, returning the hook's side effect if any.
///
/// On error nothing about the entity has changed.
pub fn transition<E: Lifecycle>(
    entity: &mut E,
    next: E::Status,
    ctx: &TransitionContext,
) -> Result<Option<E::Effect>, TransitionError> {
    entity.ensure_transition(next)?;

    let previous = entity.status();
    let effect = entity.on_enter(next, ctx);
    entity.set_status(next);

    let description = match &ctx.notes {
        Some(notes) => format!("{} moved from {} to {}: {}", E::ENTITY, previous, next, notes),
        None => format!("{} moved from {} to {}", E::ENTITY, previous, next),
    };
    let action = ctx
        .action
        .clone()
        .unwrap_or_else(|| format!("Status changed to {}", next));
    append(entity, Some(next), action, description, ctx);

    tracing::info!(
        entity = E::ENTITY,
        id = %entity.id(),
        from = %previous,
        to = %next,
        actor = ?ctx.actor,
        "workflow transition"
    );

    Ok(effect)
}

/// Append a timeline entry that does not change the status
pub fn record<E: Lifecycle>(
    entity: &mut E,
    action: impl Into<String>,
    description: impl Into<String>,
    ctx: &TransitionContext,
) {
    append(entity, None, action.into(), description.into(), ctx);
}

fn append<E: Lifecycle>(
    entity: &mut E,
    status: Option<E::Status>,
    action: String,
    description: String,
    ctx: &TransitionContext,
) {
    let performed_by = ctx.actor.or_else(|| entity.fallback_actor());
    // Timestamps never go backwards within a timeline
    let timestamp = match entity.timeline().last() {
        Some(last) if last.timestamp > ctx.now => last.timestamp,
        _ => ctx.now,
    };
    entity.timeline_mut().push(TimelineEntry {
        status,
        action,
        description,
        performed_by,
        timestamp,
        time_spent: ctx.time_spent,
    });
}

/// Human reference such as `TRF-4F7K2Q`
pub fn reference_number(prefix: &str) -> String {
    use rand::{distributions::Alphanumeric, Rng};

    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(|c| (c as char).to_ascii_uppercase())
        .collect();
    format!("{}-{}", prefix, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_number_shape() {
        let reference = reference_number("TRF");
        assert!(reference.starts_with("TRF-"));
        assert_eq!(reference.len(), 10);
        assert!(reference[4..].chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }
}
