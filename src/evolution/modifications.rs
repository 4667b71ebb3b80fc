//! Modification aggregation
//!
//! Groups modification events by template and measures how many of the
//! projects using a template independently added the same path.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use super::records::ModificationEvent;

/// Adoption statistics for one added path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathAdoption {
    /// Number of distinct projects that added the path
    pub count: u64,
    /// `count / total_projects`
    pub adoption_rate: f64,
}

/// Aggregated modification pattern for one template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplatePattern {
    pub total_projects: u64,
    pub additions: BTreeMap<String, PathAdoption>,
}

/// Per-template accumulator, created the first time a template is seen
#[derive(Debug, Default)]
struct TemplateModificationProfile {
    projects: BTreeSet<String>,
    additions: BTreeMap<String, BTreeSet<String>>,
}

/// Accumulates modification events into per-template patterns
#[derive(Debug, Default)]
pub struct ModificationAggregator {
    templates: BTreeMap<String, TemplateModificationProfile>,
    dropped: u64,
}

impl ModificationAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a single event. Events without a template or project are dropped.
    pub fn record(&mut self, event: &ModificationEvent) {
        let (Some(template_id), Some(project_path)) = (
            non_empty(event.template_id.as_deref()),
            non_empty(event.project_path.as_deref()),
        ) else {
            self.dropped += 1;
            return;
        };

        let profile = self.templates.entry(template_id.to_string()).or_default();
        profile.projects.insert(project_path.to_string());

        if event.kind.is_some_and(|kind| kind.is_addition()) {
            let path = event.path.clone().unwrap_or_default();
            profile
                .additions
                .entry(path)
                .or_default()
                .insert(project_path.to_string());
        }
    }

    /// Record every event in a batch
    pub fn extend<'a>(&mut self, events: impl IntoIterator<Item = &'a ModificationEvent>) {
        for event in events {
            self.record(event);
        }
    }

    /// Number of events dropped for missing required fields
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Compute adoption rates for every template that has at least one project
    pub fn finish(self) -> BTreeMap<String, TemplatePattern> {
        if self.dropped > 0 {
            debug!("Dropped {} modification events without template or project", self.dropped);
        }

        self.templates
            .into_iter()
            .filter(|(_, profile)| !profile.projects.is_empty())
            .map(|(template_id, profile)| {
                let total_projects = profile.projects.len() as u64;
                let additions = profile
                    .additions
                    .into_iter()
                    .map(|(path, adopters)| {
                        let count = adopters.len() as u64;
                        let adoption = PathAdoption {
                            count,
                            adoption_rate: count as f64 / total_projects as f64,
                        };
                        (path, adoption)
                    })
                    .collect();

                (template_id, TemplatePattern { total_projects, additions })
            })
            .collect()
    }
}

/// Aggregate a batch of modification events
pub fn aggregate_modifications(events: &[ModificationEvent]) -> BTreeMap<String, TemplatePattern> {
    let mut aggregator = ModificationAggregator::new();
    aggregator.extend(events);
    aggregator.finish()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evolution::records::ModificationKind;

    fn event(template: &str, project: &str, kind: ModificationKind, path: &str) -> ModificationEvent {
        ModificationEvent {
            template_id: Some(template.to_string()),
            project_path: Some(project.to_string()),
            kind: Some(kind),
            path: Some(path.to_string()),
        }
    }

    #[test]
    fn test_projects_counted_once() {
        let events = vec![
            event("T1", "/p/a", ModificationKind::FileAdded, "a.txt"),
            event("T1", "/p/a", ModificationKind::Other, "b.txt"),
            event("T1", "/p/a", ModificationKind::DirectoryAdded, "docs/"),
            event("T1", "/p/b", ModificationKind::Other, "c.txt"),
        ];

        let patterns = aggregate_modifications(&events);
        assert_eq!(patterns["T1"].total_projects, 2);
    }

    #[test]
    fn test_adoption_rate() {
        let events = vec![
            event("T1", "/p/a", ModificationKind::DirectoryAdded, "hooks/"),
            event("T1", "/p/b", ModificationKind::DirectoryAdded, "hooks/"),
            event("T1", "/p/c", ModificationKind::Other, "README.md"),
            event("T1", "/p/d", ModificationKind::FileAdded, "Makefile"),
        ];

        let patterns = aggregate_modifications(&events);
        let pattern = &patterns["T1"];
        assert_eq!(pattern.total_projects, 4);
        assert_eq!(pattern.additions["hooks/"].count, 2);
        assert_eq!(pattern.additions["hooks/"].adoption_rate, 0.5);
        assert_eq!(pattern.additions["Makefile"].adoption_rate, 0.25);
        // Non-additions are not tracked as paths
        assert!(!pattern.additions.contains_key("README.md"));
    }

    #[test]
    fn test_repeated_addition_by_one_project_stays_bounded() {
        let events = vec![
            event("T1", "/p/a", ModificationKind::FileAdded, "x.rs"),
            event("T1", "/p/a", ModificationKind::FileAdded, "x.rs"),
            event("T1", "/p/a", ModificationKind::FileAdded, "x.rs"),
        ];

        let patterns = aggregate_modifications(&events);
        let adoption = &patterns["T1"].additions["x.rs"];
        assert_eq!(adoption.count, 1);
        assert_eq!(adoption.adoption_rate, 1.0);
    }

    #[test]
    fn test_incomplete_events_dropped() {
        let mut aggregator = ModificationAggregator::new();
        aggregator.record(&ModificationEvent {
            template_id: Some("T1".to_string()),
            project_path: None,
            kind: Some(ModificationKind::FileAdded),
            path: Some("a".to_string()),
        });
        aggregator.record(&ModificationEvent {
            template_id: Some(String::new()),
            project_path: Some("/p/a".to_string()),
            ..Default::default()
        });

        assert_eq!(aggregator.dropped(), 2);
        assert!(aggregator.finish().is_empty());
    }

    #[test]
    fn test_wrongly_typed_kind_still_counts_project() {
        let events: Vec<ModificationEvent> = [
            r#"{"template_id":"T1","project_path":"a","type":"directory_added","path":"hooks/"}"#,
            r#"{"template_id":"T1","project_path":"b","type":5}"#,
        ]
        .iter()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

        let patterns = aggregate_modifications(&events);
        assert_eq!(patterns["T1"].total_projects, 2);
        assert_eq!(patterns["T1"].additions["hooks/"].adoption_rate, 0.5);
    }

    #[test]
    fn test_templates_kept_separate() {
        let events = vec![
            event("T1", "/p/a", ModificationKind::FileAdded, "a"),
            event("T2", "/p/a", ModificationKind::FileAdded, "b"),
            event("T2", "/p/b", ModificationKind::FileAdded, "b"),
        ];

        let patterns = aggregate_modifications(&events);
        assert_eq!(patterns.len(), 2);
        assert_eq!(patterns["T1"].total_projects, 1);
        assert_eq!(patterns["T2"].total_projects, 2);
        assert_eq!(patterns["T2"].additions["b"].adoption_rate, 1.0);
    }
}
