use chrono::{DateTime, Utc};
use log::debug;

use crate::error::TrackerError;
use crate::models::Project;

/// A loaded store never seeds its counter below this. A store that was never
/// written starts from zero instead, so its first project gets ID 1.
const ID_FLOOR: i64 = 9;

/// How many active projects get a short positional reference
const SHORT_REFERENCES: usize = 10;

/// All projects, in recency order once `assign_references` has run.
/// `Store::default()` is the store before anything was ever saved.
#[derive(Debug, Clone, Default)]
pub struct Store {
    next_id: i64,
    projects: Vec<Project>,
}

impl Store {
    /// Build a store from loaded projects: sort them, seed the ID counter from
    /// the floor and hand out references.
    pub fn new(projects: Vec<Project>) -> Self {
        let mut store = Self {
            next_id: ID_FLOOR,
            projects,
        };
        store.assign_references();
        store
    }

    /// Sort by recency, then give the first ten active projects their
    /// position as reference. Everything else is addressed by ID.
    fn assign_references(&mut self) {
        self.projects.sort_by(Project::cmp_recency);

        self.next_id = self
            .projects
            .iter()
            .map(|p| p.id)
            .fold(ID_FLOOR, i64::max);

        for project in &mut self.projects {
            project.reference = Some(project.id);
        }

        for (position, project) in self
            .projects
            .iter_mut()
            .filter(|p| !p.archived)
            .take(SHORT_REFERENCES)
            .enumerate()
        {
            project.reference = Some(position as i64);
        }

        debug!(
            "Assigned references to {} projects (next id {})",
            self.projects.len(),
            self.next_id + 1
        );
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    /// Same projects, ignoring references and the ID counter
    pub fn same_projects(&self, other: &Store) -> bool {
        self.projects == other.projects
    }

    /// Projects in recency order, archived ones only when asked for
    pub fn list(&self, include_archived: bool) -> Vec<&Project> {
        self.projects
            .iter()
            .filter(|p| include_archived || !p.archived)
            .collect()
    }

    /// The most recent project, if any
    pub fn current(&self) -> Option<&Project> {
        self.projects.first()
    }

    pub fn create(&mut self, name: impl Into<String>, now: DateTime<Utc>) -> &mut Project {
        self.next_id += 1;
        let project = Project::new(self.next_id, name, now);
        debug!("Created project {} ({})", project.id, project.name);
        self.projects.push(project);
        let last = self.projects.len() - 1;
        &mut self.projects[last]
    }

    pub fn remove(&mut self, id: i64) -> Option<Project> {
        let index = self.projects.iter().position(|p| p.id == id)?;
        Some(self.projects.remove(index))
    }

    /// Resolve a user supplied number: references win over IDs
    pub fn find(&self, reference: i64) -> Result<&Project, TrackerError> {
        if self.projects.is_empty() {
            return Err(TrackerError::NoProjects);
        }

        self.projects
            .iter()
            .find(|p| p.reference == Some(reference))
            .or_else(|| self.projects.iter().find(|p| p.id == reference))
            .ok_or(TrackerError::ProjectNotFound(reference))
    }

    pub fn get(&self, id: i64) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn get_mut(&mut self, id: i64) -> Option<&mut Project> {
        self.projects.iter_mut().find(|p| p.id == id)
    }

    pub fn in_progress(&self) -> Option<&Project> {
        self.projects.iter().find(|p| p.in_progress())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 6, 9, 0, 0).unwrap()
    }

    fn project_started(id: i64, minutes_ago: i64) -> Project {
        let mut project = Project::new(id, format!("project {}", id), base() - Duration::days(30));
        let start = base() - Duration::minutes(minutes_ago);
        project.start(start);
        project.stop(start + Duration::minutes(1));
        project
    }

    #[test]
    fn test_fresh_store_starts_at_one() {
        let mut store = Store::default();
        assert!(store.projects().is_empty());
        let project = store.create("Write spec", base());
        assert_eq!(project.id, 1);
        assert!(project.just_created());
    }

    #[test]
    fn test_loaded_store_seeds_counter_at_floor() {
        let mut store = Store::new(Vec::new());
        assert_eq!(store.create("Write spec", base()).id, 10);

        let mut store = Store::new(vec![project_started(1, 5)]);
        assert_eq!(store.create("next", base()).id, 10);
    }

    #[test]
    fn test_counter_follows_highest_id() {
        let mut store = Store::new(vec![project_started(42, 5), project_started(17, 10)]);
        assert_eq!(store.create("next", base()).id, 43);
    }

    #[test]
    fn test_removed_ids_are_not_reused() {
        let mut store = Store::default();
        let first = store.create("first", base()).id;
        assert!(store.remove(first).is_some());
        assert!(store.remove(first).is_none());
        assert_eq!(store.create("second", base()).id, first + 1);
    }

    #[test]
    fn test_references_follow_recency() {
        let store = Store::new(vec![
            project_started(10, 30),
            project_started(11, 10),
            project_started(12, 20),
        ]);

        let ordered: Vec<(i64, i64)> = store
            .projects()
            .iter()
            .map(|p| (p.id, p.reference()))
            .collect();
        assert_eq!(ordered, vec![(11, 0), (12, 1), (10, 2)]);
    }

    #[test]
    fn test_references_overflow_and_archived_use_id() {
        let mut projects: Vec<Project> = (0..12).map(|i| project_started(100 + i, i + 1)).collect();
        let mut archived = project_started(500, 0);
        archived.archived = true;
        projects.push(archived);

        let store = Store::new(projects);

        for (position, project) in store.projects().iter().enumerate() {
            if position < SHORT_REFERENCES {
                assert_eq!(project.reference(), position as i64);
            } else {
                assert_eq!(project.reference(), project.id);
            }
        }
        let last = store.projects().last().unwrap();
        assert_eq!(last.id, 500);
        assert_eq!(last.reference(), 500);
    }

    #[test]
    fn test_list_filters_archived() {
        let mut archived = project_started(10, 1);
        archived.archived = true;
        let store = Store::new(vec![archived, project_started(11, 5)]);

        let active: Vec<i64> = store.list(false).iter().map(|p| p.id).collect();
        assert_eq!(active, vec![11]);
        let all: Vec<i64> = store.list(true).iter().map(|p| p.id).collect();
        assert_eq!(all, vec![11, 10]);
    }

    #[test]
    fn test_find_prefers_reference_over_id() {
        let store = Store::new(vec![project_started(1, 1), project_started(20, 2)]);

        // ID 1 sorts first, but reference 1 belongs to ID 20
        assert_eq!(store.find(1).unwrap().id, 20);
        assert_eq!(store.find(0).unwrap().id, 1);
        assert_eq!(store.find(20).unwrap().id, 20);
        assert_eq!(store.find(99), Err(TrackerError::ProjectNotFound(99)));
    }

    #[test]
    fn test_find_on_empty_store() {
        let store = Store::default();
        assert_eq!(store.find(0), Err(TrackerError::NoProjects));
    }

    #[test]
    fn test_same_projects_ignores_references() {
        let loaded = Store::new(vec![project_started(10, 5)]);
        let mut other = loaded.clone();
        other.projects[0].reference = Some(7);
        assert!(loaded.same_projects(&other));

        other.get_mut(10).unwrap().name = "renamed".to_string();
        assert!(!loaded.same_projects(&other));
    }
}
