use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// Digest returned by `summarize` when nothing is known about the user yet.
pub const NO_FACTS_PLACEHOLDER: &str = "zatím žádné podrobnosti";

/// Accumulated facts about one user. Every field stays `None` until the
/// extractor observes it; after that it only changes to another non-null
/// value, or back to `None` via an explicit reset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub age: Option<u32>,
    pub place_of_residence: Option<String>,
    pub hobbies: Option<String>,
    pub social_service_interest: Option<String>,
    pub health_status: Option<String>,
    pub medical_diagnosis: Option<String>,
    pub life_limitations: Option<String>,
}

/// One turn's worth of extracted facts. Same fields as [`UserProfile`],
/// each independently present-or-absent. Deserializes directly from the
/// extraction model's structured reply (missing and JSON-null both map
/// to `None`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialProfile {
    pub age: Option<u32>,
    pub place_of_residence: Option<String>,
    pub hobbies: Option<String>,
    pub social_service_interest: Option<String>,
    pub health_status: Option<String>,
    pub medical_diagnosis: Option<String>,
    pub life_limitations: Option<String>,
}

impl PartialProfile {
    pub fn is_empty(&self) -> bool {
        self.age.is_none()
            && self.place_of_residence.is_none()
            && self.hobbies.is_none()
            && self.social_service_interest.is_none()
            && self.health_status.is_none()
            && self.medical_diagnosis.is_none()
            && self.life_limitations.is_none()
    }
}

impl UserProfile {
    /// Field-wise last-non-null-wins merge. A `None` in the partial never
    /// clears a value that is already known.
    pub fn merge(&mut self, partial: &PartialProfile) {
        if let Some(age) = partial.age {
            self.age = Some(age);
        }
        if let Some(ref v) = partial.place_of_residence {
            self.place_of_residence = Some(v.clone());
        }
        if let Some(ref v) = partial.hobbies {
            self.hobbies = Some(v.clone());
        }
        if let Some(ref v) = partial.social_service_interest {
            self.social_service_interest = Some(v.clone());
        }
        if let Some(ref v) = partial.health_status {
            self.health_status = Some(v.clone());
        }
        if let Some(ref v) = partial.medical_diagnosis {
            self.medical_diagnosis = Some(v.clone());
        }
        if let Some(ref v) = partial.life_limitations {
            self.life_limitations = Some(v.clone());
        }
    }

    /// Short, order-stable digest of the known fields. Age, residence and
    /// hobbies always come first, in that order; the remaining known fields
    /// follow in declaration order.
    pub fn summarize(&self) -> String {
        let mut parts = Vec::new();
        if let Some(age) = self.age {
            parts.push(format!("{age} let"));
        }
        if let Some(ref place) = self.place_of_residence {
            parts.push(format!("bydlí v {place}"));
        }
        if let Some(ref hobbies) = self.hobbies {
            parts.push(format!("zájmy: {hobbies}"));
        }
        if let Some(ref interest) = self.social_service_interest {
            parts.push(format!("zájem o službu: {interest}"));
        }
        if let Some(ref health) = self.health_status {
            parts.push(format!("zdravotní stav: {health}"));
        }
        if let Some(ref diagnosis) = self.medical_diagnosis {
            parts.push(format!("diagnóza: {diagnosis}"));
        }
        if let Some(ref limitations) = self.life_limitations {
            parts.push(format!("omezení: {limitations}"));
        }

        if parts.is_empty() {
            NO_FACTS_PLACEHOLDER.to_string()
        } else {
            parts.join(", ")
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == UserProfile::default()
    }
}

/// Session-keyed store of user profiles. The single shared instance for the
/// process; the lock keeps merge/read/reset from tearing under concurrent
/// requests, and the session key keeps conversations from contaminating
/// each other.
pub struct ProfileStore {
    sessions: RwLock<HashMap<String, UserProfile>>,
}

impl ProfileStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Merge one turn's extracted facts into the session's profile and
    /// return the resulting snapshot. Creates the session on first use.
    pub async fn merge(&self, session: &str, partial: &PartialProfile) -> UserProfile {
        let mut sessions = self.sessions.write().await;
        let profile = sessions.entry(session.to_string()).or_default();
        profile.merge(partial);
        debug!(session, ?profile, "profile merged");
        profile.clone()
    }

    /// Digest of the session's known facts; the fixed placeholder when the
    /// session is unknown or empty.
    pub async fn summarize(&self, session: &str) -> String {
        let sessions = self.sessions.read().await;
        match sessions.get(session) {
            Some(profile) => profile.summarize(),
            None => NO_FACTS_PLACEHOLDER.to_string(),
        }
    }

    /// Snapshot of the session's profile, if the session exists.
    pub async fn get(&self, session: &str) -> Option<UserProfile> {
        let sessions = self.sessions.read().await;
        sessions.get(session).cloned()
    }

    /// Clear every field of the session's profile. Idempotent; unknown
    /// sessions are a no-op.
    pub async fn reset(&self, session: &str) {
        let mut sessions = self.sessions.write().await;
        if let Some(profile) = sessions.get_mut(session) {
            *profile = UserProfile::default();
            debug!(session, "profile reset");
        }
    }
}

impl Default for ProfileStore {
    fn default() -> Self {
        Self::new()
    }
}
