//! Domain and track listings.

use crate::track::TrackSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Groups of tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    Examples,
}

impl Domain {
    pub const ALL: [Self; 1] = [Self::Examples];

    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            Self::Examples => "Examples",
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Examples => "Примеры",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainInfo {
    pub domain_id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackInfo {
    pub track_id: String,
    pub name: String,
    pub domain_id: String,
}

/// Lists every domain.
#[must_use]
pub fn domains() -> Vec<DomainInfo> {
    Domain::ALL
        .into_iter()
        .map(|d| DomainInfo {
            domain_id: d.id().to_string(),
            name: d.name().to_string(),
        })
        .collect()
}

/// Lists every track in the set.
#[must_use]
pub fn tracks(set: &TrackSet) -> Vec<TrackInfo> {
    let tracks: Vec<_> = set
        .iter()
        .map(|t| {
            let id = t.id();
            TrackInfo {
                track_id: id.as_str().to_string(),
                name: id.caption().to_string(),
                domain_id: id.domain().id().to_string(),
            }
        })
        .collect();
    debug!(count = tracks.len(), "Listed tracks");
    tracks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeLlm, empty_files};
    use std::sync::Arc;

    #[test]
    fn single_examples_domain() {
        assert_eq!(
            domains(),
            vec![DomainInfo {
                domain_id: "Examples".to_string(),
                name: "Примеры".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn every_track_is_listed_under_examples() {
        let (files, _dir) = empty_files().await;
        let set = TrackSet::new(files, Arc::new(FakeLlm::answering("ok")));
        let listed = tracks(&set);

        let ids: Vec<_> = listed.iter().map(|t| t.track_id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["Dummy", "Chatbot", "EntrypointsWizard", "RecipesSummarizer"]
        );
        assert!(listed.iter().all(|t| t.domain_id == "Examples"));
        assert_eq!(listed[1].name, "🤖 Chat");
    }
}
