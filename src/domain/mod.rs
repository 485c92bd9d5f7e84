//! Catalog data shapes shared across layers.
//!
//! Field names follow the remote API so that persisted records are plain API
//! character objects.

use serde::{Deserialize, Serialize};
use std::fmt;

pub type CharacterId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CharacterStatus {
    Alive,
    Dead,
    #[serde(rename = "unknown")]
    #[serde(other)]
    Unknown,
}

impl fmt::Display for CharacterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CharacterStatus::Alive => "Alive",
            CharacterStatus::Dead => "Dead",
            CharacterStatus::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// Named place reference (`origin` / `location` in the API).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LocationRef {
    pub name: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    #[serde(default)]
    pub image: String,
    pub status: CharacterStatus,
    #[serde(default)]
    pub species: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub origin: LocationRef,
    #[serde(default)]
    pub location: LocationRef,
    #[serde(default)]
    pub episode: Vec<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
}

impl Character {
    pub fn episode_count(&self) -> usize {
        self.episode.len()
    }
}

/// Opaque token for the next page of a listing (the API's `info.next` URL).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageCursor(String);

impl PageCursor {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Page {
    pub items: Vec<Character>,
    pub next: Option<PageCursor>,
}

impl Page {
    pub fn empty() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusFilter {
    Alive,
    Dead,
    Unknown,
}

impl StatusFilter {
    pub fn as_query_value(&self) -> &'static str {
        match self {
            StatusFilter::Alive => "alive",
            StatusFilter::Dead => "dead",
            StatusFilter::Unknown => "unknown",
        }
    }
}

impl std::str::FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "alive" => Ok(StatusFilter::Alive),
            "dead" => Ok(StatusFilter::Dead),
            "unknown" => Ok(StatusFilter::Unknown),
            other => Err(format!("unknown status filter '{other}' (expected alive, dead or unknown)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenderFilter {
    Female,
    Male,
    Genderless,
    Unknown,
}

impl GenderFilter {
    pub fn as_query_value(&self) -> &'static str {
        match self {
            GenderFilter::Female => "female",
            GenderFilter::Male => "male",
            GenderFilter::Genderless => "genderless",
            GenderFilter::Unknown => "unknown",
        }
    }
}

impl std::str::FromStr for GenderFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "female" => Ok(GenderFilter::Female),
            "male" => Ok(GenderFilter::Male),
            "genderless" => Ok(GenderFilter::Genderless),
            "unknown" => Ok(GenderFilter::Unknown),
            other => Err(format!(
                "unknown gender filter '{other}' (expected female, male, genderless or unknown)"
            )),
        }
    }
}

/// Search criteria. Unset filters are never sent as empty constraints.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchFilters {
    pub name: Option<String>,
    pub status: Option<StatusFilter>,
    pub gender: Option<GenderFilter>,
}

impl SearchFilters {
    pub fn new(name: Option<String>, status: Option<StatusFilter>, gender: Option<GenderFilter>) -> Self {
        let name = name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        Self { name, status, gender }
    }

    pub fn by_name(name: &str) -> Self {
        Self::new(Some(name.to_string()), None, None)
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.status.is_none() && self.gender.is_none()
    }

    /// Query pairs in the order name, status, gender.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(name) = &self.name {
            pairs.push(("name", name.clone()));
        }
        if let Some(status) = self.status {
            pairs.push(("status", status.as_query_value().to_string()));
        }
        if let Some(gender) = self.gender {
            pairs.push(("gender", gender.as_query_value().to_string()));
        }
        pairs
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_api_character() {
        let raw = json!({
            "id": 2,
            "name": "Morty Smith",
            "status": "Alive",
            "species": "Human",
            "type": "",
            "gender": "Male",
            "origin": { "name": "unknown", "url": "" },
            "location": { "name": "Citadel of Ricks", "url": "https://rickandmortyapi.com/api/location/3" },
            "image": "https://rickandmortyapi.com/api/character/avatar/2.jpeg",
            "episode": ["https://rickandmortyapi.com/api/episode/1"],
            "url": "https://rickandmortyapi.com/api/character/2",
            "created": "2017-11-04T18:50:21.651Z"
        });

        let character: Character = serde_json::from_value(raw).unwrap();
        assert_eq!(character.id, 2);
        assert_eq!(character.status, CharacterStatus::Alive);
        assert_eq!(character.location.name, "Citadel of Ricks");
        assert_eq!(character.episode_count(), 1);
        assert_eq!(character.kind.as_deref(), Some(""));
    }

    #[test]
    fn unrecognised_status_decodes_as_unknown() {
        let raw = json!({ "id": 9, "name": "Zeep", "status": "Cronenberged" });
        let character: Character = serde_json::from_value(raw).unwrap();
        assert_eq!(character.status, CharacterStatus::Unknown);
        assert_eq!(character.status.to_string(), "unknown");
    }

    #[test]
    fn query_pairs_skip_unset_and_blank_filters() {
        let filters = SearchFilters::new(Some("   ".into()), Some(StatusFilter::Alive), None);
        assert_eq!(filters.query_pairs(), vec![("status", "alive".to_string())]);

        let filters = SearchFilters::new(Some(" rick ".into()), None, Some(GenderFilter::Female));
        assert_eq!(
            filters.query_pairs(),
            vec![("name", "rick".to_string()), ("gender", "female".to_string())]
        );

        assert!(SearchFilters::default().query_pairs().is_empty());
        assert!(SearchFilters::new(Some(String::new()), None, None).is_empty());
    }

    #[test]
    fn filters_parse_case_insensitively() {
        assert_eq!("Alive".parse::<StatusFilter>(), Ok(StatusFilter::Alive));
        assert_eq!("GENDERLESS".parse::<GenderFilter>(), Ok(GenderFilter::Genderless));
        assert!("zombie".parse::<StatusFilter>().is_err());
    }
}
