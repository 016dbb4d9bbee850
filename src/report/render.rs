use anyhow::Result;
use chrono::{DateTime, Duration, Local, Utc};
use std::io::Write;

use super::style::{Palette, Role};
use super::{format_duration, Cell, Grid};
use crate::models::Project;
use crate::store::Store;
use crate::tracker::Event;

/// Writes command output. All durations are measured against `now`.
pub struct Renderer<'a, W: Write> {
    writer: &'a mut W,
    palette: &'a Palette,
    now: DateTime<Local>,
}

impl<'a, W: Write> Renderer<'a, W> {
    pub fn new(writer: &'a mut W, palette: &'a Palette, now: DateTime<Local>) -> Self {
        Self {
            writer,
            palette,
            now,
        }
    }

    fn now_utc(&self) -> DateTime<Utc> {
        self.now.with_timezone(&Utc)
    }

    pub fn message(&mut self, text: &str) -> Result<()> {
        writeln!(self.writer, "{}", text)?;
        Ok(())
    }

    /// State of the most recent project plus its stats
    pub fn current(&mut self, project: &Project) -> Result<()> {
        let state = if project.in_progress() {
            self.palette.paint(Role::Positive, "In progress:")
        } else {
            self.palette.paint(Role::Negative, "Stopped:")
        };
        let paren = self.reference_paren(project);
        writeln!(self.writer, "{} {} {}", state, project.name, paren)?;
        writeln!(self.writer)?;
        self.stats(project, true)
    }

    /// Render what a command did. `store` is read after the command ran.
    pub fn events(&mut self, store: &Store, events: &[Event]) -> Result<()> {
        let mut iter = events.iter().peekable();
        while let Some(event) = iter.next() {
            self.event(store, event)?;
            if matches!(event, Event::Stopped(_)) && iter.peek().is_some() {
                writeln!(self.writer)?;
            }
        }
        Ok(())
    }

    fn event(&mut self, store: &Store, event: &Event) -> Result<()> {
        let project = move |id: &i64| store.get(*id);

        match event {
            Event::Created(id) => {
                if let Some(p) = project(id) {
                    let paren = self.reference_paren(p);
                    writeln!(self.writer, "Created {} {}", p.name, paren)?;
                }
            }
            Event::Started(id) => {
                if let Some(p) = project(id) {
                    self.labelled(Role::Positive, "Started:", p)?;
                    if !p.just_created() {
                        writeln!(self.writer)?;
                        self.stats(p, false)?;
                    }
                }
            }
            Event::Stopped(id) => {
                if let Some(p) = project(id) {
                    self.labelled(Role::Negative, "Stopped:", p)?;
                    writeln!(self.writer)?;
                    self.stats(p, true)?;
                }
            }
            Event::AlreadyInProgress(_) => self.message("Project already in progress")?,
            Event::NothingInProgress => self.message("No project in progress")?,
            Event::Archived(id) => {
                if let Some(p) = project(id) {
                    self.labelled(Role::Muted, "Archived:", p)?;
                }
            }
            Event::Unarchived(id) => {
                if let Some(p) = project(id) {
                    self.labelled(Role::Heading, "Unarchived:", p)?;
                }
            }
            Event::Removed(p) => self.labelled(Role::Negative, "Removed:", p)?,
        }
        Ok(())
    }

    fn labelled(&mut self, role: Role, label: &str, project: &Project) -> Result<()> {
        let paren = self.reference_paren(project);
        let label = self.palette.paint(role, label);
        writeln!(self.writer, "{} {} {}", label, project.name, paren)?;
        Ok(())
    }

    fn stats(&mut self, project: &Project, with_duration: bool) -> Result<()> {
        let mut grid = Grid::new();
        if with_duration {
            grid.push(vec![
                Cell::plain("Duration"),
                Cell::styled(self.last_duration(project), Role::Accent),
            ]);
        }
        grid.push(vec![
            Cell::plain("This week"),
            Cell::styled(self.this_week(project), Role::Accent),
        ]);
        grid.push(vec![
            Cell::plain("Total"),
            Cell::styled(self.total(project), Role::Accent),
        ]);
        writeln!(self.writer, "{}", grid.render(self.palette))?;
        Ok(())
    }

    /// Project table. `limit` caps the number of rows when set.
    pub fn list(&mut self, projects: &[&Project], show_archived: bool, limit: Option<usize>) -> Result<()> {
        if projects.is_empty() {
            return self.message("No projects");
        }

        let mut header = vec!["Ref", "Name", "Last Start", "Last Duration", "This Week", "Total"];
        if show_archived {
            header.push("Archived");
        }

        let mut grid = Grid::new();
        grid.push(header.into_iter().map(|h| Cell::styled(h, Role::Heading)).collect());

        let limit = limit.unwrap_or(usize::MAX);
        for project in projects.iter().take(limit) {
            let name_role = if project.archived {
                Some(Role::Muted)
            } else if project.in_progress() {
                Some(Role::Positive)
            } else {
                None
            };
            let name = match name_role {
                Some(role) => Cell::styled(project.name.as_str(), role),
                None => Cell::plain(project.name.as_str()),
            };

            let mut row = vec![
                self.reference_column(project),
                name,
                Cell::styled(self.last_start(project), Role::Accent),
                Cell::styled(self.last_duration(project), Role::Accent),
                Cell::styled(self.this_week(project), Role::Accent),
                Cell::styled(self.total(project), Role::Accent),
            ];
            if project.archived {
                row.push(Cell::styled("True", Role::Muted));
            }
            grid.push(row);
        }

        writeln!(self.writer, "{}", grid.render(self.palette))?;
        Ok(())
    }

    /// Weekly summary, skipping projects with nothing this week
    pub fn week(&mut self, projects: &[&Project]) -> Result<()> {
        if projects.is_empty() {
            return self.message("No projects");
        }

        let mut grid = Grid::new();
        grid.push(
            ["Name", "This Week", "Total"]
                .into_iter()
                .map(|h| Cell::styled(h, Role::Heading))
                .collect(),
        );

        for project in projects {
            let this_week = project.this_week_duration(&self.now);
            if this_week == Duration::zero() {
                continue;
            }
            grid.push(vec![
                Cell::plain(project.name.as_str()),
                Cell::styled(format_duration(this_week), Role::Accent),
                Cell::styled(self.total(project), Role::Accent),
            ]);
        }

        if grid.row_count() == 1 {
            return self.message("Nothing tracked this week");
        }

        writeln!(self.writer, "{}", grid.render(self.palette))?;
        Ok(())
    }

    /// Only the numbers are highlighted
    fn reference_column(&self, project: &Project) -> Cell {
        let reference = project.reference();
        let cell = Cell::styled(reference.to_string(), Role::Accent);
        if reference == project.id {
            cell
        } else {
            cell.then(" (id=")
                .then_styled(project.id.to_string(), Role::Accent)
                .then(")")
        }
    }

    fn reference_paren(&self, project: &Project) -> String {
        let accent = |n: i64| self.palette.paint(Role::Accent, &n.to_string());
        match project.reference {
            None => format!("(id={})", accent(project.id)),
            Some(r) if r == project.id => format!("(ref={})", accent(r)),
            Some(r) => format!("(ref={} id={})", accent(r), accent(project.id)),
        }
    }

    fn last_start(&self, project: &Project) -> String {
        match project.last_entry() {
            Some(entry) => format!("{} ago", format_duration(self.now_utc() - entry.start)),
            None => "-".to_string(),
        }
    }

    fn last_duration(&self, project: &Project) -> String {
        match project.last_entry() {
            Some(entry) => format_duration(entry.duration(self.now_utc())),
            None => "-".to_string(),
        }
    }

    fn this_week(&self, project: &Project) -> String {
        if project.entries.is_empty() {
            return "-".to_string();
        }
        format_duration(project.this_week_duration(&self.now))
    }

    fn total(&self, project: &Project) -> String {
        if project.entries.is_empty() {
            return "-".to_string();
        }
        format_duration(project.total_duration(self.now_utc()))
    }
}
