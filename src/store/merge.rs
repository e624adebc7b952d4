//! Merge of imported providers into the store
//!
//! Union keyed on ids only. A provider or project already present is kept
//! as it is (name, url) and its children are merged one level down; an
//! element already present is left alone. Anything new is appended with its
//! whole subtree.

use serde::Serialize;

use crate::config::types::{Project, Provider, ShuttleData};

/// What a merge added
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeStats {
    pub providers: usize,
    pub projects: usize,
    pub elements: usize,
}

impl MergeStats {
    /// Totals of a whole provider list
    pub fn of(providers: &[Provider]) -> Self {
        let mut stats = Self::default();
        for provider in providers {
            stats.add_subtree(provider);
        }
        stats
    }

    fn add_subtree(&mut self, provider: &Provider) {
        self.providers += 1;
        for project in &provider.projects {
            self.add_project(project);
        }
    }

    fn add_project(&mut self, project: &Project) {
        self.projects += 1;
        self.elements += project.elements.len();
    }
}

/// Merge `incoming` into `current`
pub fn merge(mut current: ShuttleData, incoming: Vec<Provider>) -> ShuttleData {
    merge_providers(&mut current.providers, incoming);
    current
}

/// Merge `incoming` into `providers` in place
pub fn merge_providers(providers: &mut Vec<Provider>, incoming: Vec<Provider>) -> MergeStats {
    let mut stats = MergeStats::default();

    for imported in incoming {
        match providers.iter_mut().find(|p| p.id == imported.id) {
            Some(existing) => merge_projects(existing, imported, &mut stats),
            None => {
                stats.add_subtree(&imported);
                providers.push(imported);
            }
        }
    }

    stats
}

fn merge_projects(provider: &mut Provider, imported: Provider, stats: &mut MergeStats) {
    for imported_project in imported.projects {
        match provider.projects.iter_mut().find(|p| p.id == imported_project.id) {
            Some(existing) => merge_elements(existing, imported_project, stats),
            None => {
                stats.add_project(&imported_project);
                provider.projects.push(imported_project);
            }
        }
    }
}

fn merge_elements(project: &mut Project, imported: Project, stats: &mut MergeStats) {
    for element in imported.elements {
        if !project.elements.iter().any(|e| e.id == element.id) {
            stats.elements += 1;
            project.elements.push(element);
        }
    }
}
