use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::trace;

use crate::{backend::PriorityStore, types::priority::Score, QueueResult};

#[derive(Debug, Default)]
struct Members {
    /// (score, member), ascending; the last element is the next to pop
    ordered: BTreeSet<(Score, String)>,

    /// member -> score, for duplicate detection
    scores: HashMap<String, Score>,
}

/// In-memory backend for testing and development.
///
/// Mirrors sorted-set semantics: members are unique, ordering is by score
/// and then by member bytes, and pop-highest happens under a single lock.
/// Clones share the same contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    members: Arc<Mutex<Members>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of queued members, highest first
    pub fn members(&self) -> Vec<(String, Score)> {
        let members = self.members.lock();
        members
            .ordered
            .iter()
            .rev()
            .map(|(score, member)| (member.clone(), *score))
            .collect()
    }
}

#[async_trait]
impl PriorityStore for MemoryStore {
    async fn insert(&self, member: &str, score: Score) -> QueueResult<()> {
        let mut members = self.members.lock();

        if members.scores.contains_key(member) {
            trace!("Member already queued, leaving it in place");
            return Ok(());
        }

        members.scores.insert(member.to_string(), score);
        members.ordered.insert((score, member.to_string()));
        Ok(())
    }

    async fn pop_highest(&self) -> QueueResult<Option<String>> {
        let mut members = self.members.lock();

        let Some((_, member)) = members.ordered.pop_last() else {
            return Ok(None);
        };
        members.scores.remove(&member);
        Ok(Some(member))
    }

    async fn size(&self) -> usize {
        self.members.lock().scores.len()
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
