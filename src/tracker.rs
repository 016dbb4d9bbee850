use chrono::{DateTime, Utc};
use log::debug;

use crate::error::{parse_reference, TrackerError};
use crate::models::Project;
use crate::store::Store;

/// Something a command did, in the order it happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Created(i64),
    Started(i64),
    Stopped(i64),
    AlreadyInProgress(i64),
    NothingInProgress,
    Archived(i64),
    Unarchived(i64),
    Removed(Project),
}

/// Find the project a command targets. A number is a reference or ID, a
/// missing argument means reference 0, anything else names a new project.
pub fn resolve_target(
    store: &mut Store,
    arg: Option<&str>,
    now: DateTime<Utc>,
) -> Result<i64, TrackerError> {
    let arg = arg.filter(|a| !a.is_empty());

    match arg {
        None => Ok(store.find(0)?.id),
        Some(a) => match parse_reference(a) {
            Ok(reference) => Ok(store.find(reference)?.id),
            Err(_) => Ok(store.create(a, now).id),
        },
    }
}

pub fn create(store: &mut Store, name: &str, now: DateTime<Utc>) -> Result<Event, TrackerError> {
    if name.is_empty() {
        return Err(TrackerError::MissingName);
    }
    Ok(Event::Created(store.create(name, now).id))
}

/// Close whatever is running
pub fn stop(store: &mut Store, now: DateTime<Utc>) -> Event {
    let Some(id) = store.in_progress().map(|p| p.id) else {
        return Event::NothingInProgress;
    };

    if let Some(project) = store.get_mut(id) {
        project.stop(now);
    }
    debug!("Stopped project {}", id);
    Event::Stopped(id)
}

/// Start `target`, stopping any other running project first. Starting the
/// project that is already running changes nothing.
pub fn start(store: &mut Store, target: i64, now: DateTime<Utc>) -> Result<Vec<Event>, TrackerError> {
    if store.in_progress().is_some_and(|p| p.id == target) {
        return Ok(vec![Event::AlreadyInProgress(target)]);
    }

    let mut events = Vec::new();
    if let Event::Stopped(id) = stop(store, now) {
        events.push(Event::Stopped(id));
    }

    store
        .get_mut(target)
        .ok_or(TrackerError::ProjectNotFound(target))?
        .start(now);
    debug!("Started project {}", target);
    events.push(Event::Started(target));

    Ok(events)
}

/// Stop `target` if it is running, otherwise start it
pub fn toggle(store: &mut Store, target: i64, now: DateTime<Utc>) -> Result<Vec<Event>, TrackerError> {
    if store.in_progress().is_some_and(|p| p.id == target) {
        return Ok(vec![stop(store, now)]);
    }
    start(store, target, now)
}

/// Flip the archived flag. A running project is stopped before it is archived.
pub fn toggle_archive(
    store: &mut Store,
    target: i64,
    now: DateTime<Utc>,
) -> Result<Vec<Event>, TrackerError> {
    let mut events = Vec::new();

    let project = store
        .get(target)
        .ok_or(TrackerError::ProjectNotFound(target))?;
    if !project.archived && project.in_progress() {
        events.push(stop(store, now));
    }

    let project = store
        .get_mut(target)
        .ok_or(TrackerError::ProjectNotFound(target))?;
    project.archived = !project.archived;
    events.push(if project.archived {
        Event::Archived(target)
    } else {
        Event::Unarchived(target)
    });

    Ok(events)
}

pub fn remove(store: &mut Store, target: i64) -> Result<Event, TrackerError> {
    store
        .remove(target)
        .map(Event::Removed)
        .ok_or(TrackerError::ProjectNotFound(target))
}
