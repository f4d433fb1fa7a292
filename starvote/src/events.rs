use crate::*;
use parking_lot::Mutex;
use std::sync::Arc;

/// Notifications published to observers after an operation commits.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub enum Event {
    PollCreated {
        poll_id: PollId,
        coordinator: Principal,
    },
    PollStarted {
        poll_id: PollId,
        coordinator: Principal,
        encryption_key: String,
    },
    PollEnded {
        poll_id: PollId,
        coordinator: Principal,
        decryption_key: String,
    },
    MemberAdded {
        poll_id: PollId,
        index: u64,
        commitment: Field,
        root: Field,
    },
    VoteAdded {
        poll_id: PollId,
        ballot: Ballot,
    },
}

impl Event {
    pub fn poll_id(&self) -> PollId {
        match self {
            Event::PollCreated { poll_id, .. }
            | Event::PollStarted { poll_id, .. }
            | Event::PollEnded { poll_id, .. }
            | Event::MemberAdded { poll_id, .. }
            | Event::VoteAdded { poll_id, .. } => *poll_id,
        }
    }
}

/// Receives committed events synchronously, in commit order.
///
/// Observers only ever see fully applied state; they are never called while an
/// operation is in flight.
pub trait Observer: Send {
    fn notify(&mut self, event: &Event);
}

impl<F> Observer for F
where
    F: FnMut(&Event) + Send,
{
    fn notify(&mut self, event: &Event) {
        self(event)
    }
}

/// A shared, cloneable event recorder.
#[derive(Clone, Default, Debug)]
pub struct EventLog {
    inner: Arc<Mutex<Vec<Event>>>,
}

impl EventLog {
    pub fn new() -> Self {
        EventLog::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.inner.lock().clone()
    }

    pub fn last(&self) -> Option<Event> {
        self.inner.lock().last().cloned()
    }

    /// Remove and return everything recorded so far
    pub fn drain(&self) -> Vec<Event> {
        std::mem::take(&mut *self.inner.lock())
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

impl Observer for EventLog {
    fn notify(&mut self, event: &Event) {
        self.inner.lock().push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_json_shape() {
        let event = Event::VoteAdded {
            poll_id: 1,
            ballot: Ballot::from("yes"),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "vote_added");
        assert_eq!(json["poll_id"], 1);
        assert_eq!(json["ballot"], hex::encode("yes"));
        assert_eq!(event.poll_id(), 1);
    }

    #[test]
    fn event_log_is_shared_between_clones() {
        let log = EventLog::new();
        let mut observer = log.clone();
        observer.notify(&Event::PollCreated {
            poll_id: 4,
            coordinator: Principal([0; 32]),
        });

        assert_eq!(log.len(), 1);
        assert_eq!(log.last().map(|e| e.poll_id()), Some(4));
        assert_eq!(log.drain().len(), 1);
        assert!(log.is_empty());
    }
}
