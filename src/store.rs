//! Persistent history and saved videos.
//!
//! Backed by two sled trees. History keys are big-endian millisecond
//! timestamps (suffixed with the topic for uniqueness) so iteration order is
//! chronological; saved videos are keyed by video id.

use std::collections::HashSet;

use sled::Tree;

use crate::models::Video;

/// Most recent topics kept in history.
const HISTORY_CAP: usize = 30;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Db(#[from] sled::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Clone)]
pub struct Store {
    history: Tree,
    saved: Tree,
}

impl Store {
    pub fn open(db: &sled::Db) -> Result<Self, StoreError> {
        Ok(Self {
            history: db.open_tree("history")?,
            saved: db.open_tree("saved")?,
        })
    }

    #[cfg(test)]
    pub fn temporary() -> Self {
        let db = sled::Config::new()
            .temporary(true)
            .open()
            .expect("temporary db");
        Self::open(&db).expect("open trees")
    }

    // ========================================================================
    // Search History
    // ========================================================================

    /// Record a searched topic. Repeated topics move to the front; the list
    /// is capped at the most recent entries.
    pub fn record_search(&self, topic: &str, now_millis: u64) -> Result<(), StoreError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Ok(());
        }

        // Drop any older entry for the same topic
        let stale: Vec<Vec<u8>> = self
            .history
            .iter()
            .filter_map(|kv| kv.ok())
            .filter(|(_, v)| v.as_ref() == topic.as_bytes())
            .map(|(k, _)| k.to_vec())
            .collect();
        for key in stale {
            self.history.remove(key)?;
        }

        let mut key = now_millis.to_be_bytes().to_vec();
        key.extend_from_slice(topic.as_bytes());
        self.history.insert(key, topic.as_bytes())?;

        // Prune oldest beyond the cap
        while self.history.len() > HISTORY_CAP {
            match self.history.first()? {
                Some((key, _)) => {
                    self.history.remove(key)?;
                }
                None => break,
            }
        }

        Ok(())
    }

    /// Topics, most recent first.
    pub fn history(&self) -> Result<Vec<String>, StoreError> {
        let mut topics = Vec::new();
        for kv in self.history.iter().rev() {
            let (_, value) = kv?;
            topics.push(String::from_utf8_lossy(&value).to_string());
        }
        Ok(topics)
    }

    pub fn clear_history(&self) -> Result<(), StoreError> {
        self.history.clear()?;
        Ok(())
    }

    // ========================================================================
    // Saved Videos
    // ========================================================================

    pub fn save_video(&self, video: &Video) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(video)?;
        self.saved.insert(video.id.as_bytes(), bytes)?;
        Ok(())
    }

    /// Remove a saved video; returns whether it existed.
    pub fn unsave_video(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.saved.remove(id.as_bytes())?.is_some())
    }

    pub fn saved_videos(&self) -> Result<Vec<Video>, StoreError> {
        let mut videos = Vec::new();
        for kv in self.saved.iter() {
            let (_, value) = kv?;
            // Skip records from older schema versions rather than failing the list
            if let Ok(video) = serde_json::from_slice::<Video>(&value) {
                videos.push(video);
            }
        }
        Ok(videos)
    }

    /// Channels appearing in saved videos; feeds the ranking boosts.
    pub fn saved_channels(&self) -> Result<HashSet<String>, StoreError> {
        Ok(self
            .saved_videos()?
            .into_iter()
            .map(|v| v.channel)
            .filter(|c| !c.is_empty())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video(id: &str, channel: &str) -> Video {
        Video {
            id: id.to_string(),
            title: format!("title {}", id),
            url: format!("https://www.youtube.com/watch?v={}", id),
            duration: "1:00".to_string(),
            thumbnail: String::new(),
            channel: channel.to_string(),
            views: 1,
            uploaded_at: String::new(),
            description: String::new(),
        }
    }

    #[test]
    fn history_is_most_recent_first_and_deduped() {
        let store = Store::temporary();
        store.record_search("alpha", 1).unwrap();
        store.record_search("beta", 2).unwrap();
        store.record_search("alpha", 3).unwrap();

        assert_eq!(store.history().unwrap(), vec!["alpha", "beta"]);
    }

    #[test]
    fn history_is_capped() {
        let store = Store::temporary();
        for i in 0..40u64 {
            store.record_search(&format!("topic {}", i), i).unwrap();
        }
        let history = store.history().unwrap();
        assert_eq!(history.len(), HISTORY_CAP);
        assert_eq!(history[0], "topic 39");
        assert!(!history.contains(&"topic 0".to_string()));
    }

    #[test]
    fn blank_topics_are_ignored() {
        let store = Store::temporary();
        store.record_search("   ", 1).unwrap();
        assert!(store.history().unwrap().is_empty());
    }

    #[test]
    fn clear_history_empties_the_list() {
        let store = Store::temporary();
        store.record_search("x", 1).unwrap();
        store.clear_history().unwrap();
        assert!(store.history().unwrap().is_empty());
    }

    #[test]
    fn saved_videos_round_trip_and_channels() {
        let store = Store::temporary();
        store.save_video(&video("a", "Chan One")).unwrap();
        store.save_video(&video("b", "Chan Two")).unwrap();
        store.save_video(&video("c", "Chan One")).unwrap();

        assert_eq!(store.saved_videos().unwrap().len(), 3);
        let channels = store.saved_channels().unwrap();
        assert_eq!(channels.len(), 2);
        assert!(channels.contains("Chan One"));

        assert!(store.unsave_video("b").unwrap());
        assert!(!store.unsave_video("b").unwrap());
        assert_eq!(store.saved_videos().unwrap().len(), 2);
    }

    #[test]
    fn saving_same_id_overwrites() {
        let store = Store::temporary();
        store.save_video(&video("a", "Old")).unwrap();
        store.save_video(&video("a", "New")).unwrap();
        let saved = store.saved_videos().unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].channel, "New");
    }
}
