//! Quick search over the connection book

use uuid::Uuid;

use crate::config::types::{Element, ShuttleData};

/// One search result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit<'a> {
    pub provider_id: Uuid,
    pub provider_name: &'a str,
    pub project_id: Uuid,
    pub project_name: &'a str,
    pub element: &'a Element,
}

/// Case-insensitive substring search.
///
/// A project matching on name or url returns all of its elements; otherwise
/// elements match on name, host, ip or user. Results keep tree order.
pub fn search<'a>(data: &'a ShuttleData, query: &str) -> Vec<SearchHit<'a>> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }

    let matches = |field: &str| field.to_lowercase().contains(&query);
    let mut hits = Vec::new();

    for provider in &data.providers {
        for project in &provider.projects {
            let project_matches =
                matches(&project.name) || project.url.as_deref().is_some_and(matches);

            for element in &project.elements {
                let element_matches = matches(&element.name)
                    || matches(&element.host)
                    || matches(&element.ip)
                    || matches(&element.user);

                if project_matches || element_matches {
                    hits.push(SearchHit {
                        provider_id: provider.id,
                        provider_name: &provider.name,
                        project_id: project.id,
                        project_name: &project.name,
                        element,
                    });
                }
            }
        }
    }

    hits
}
