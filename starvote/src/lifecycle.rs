use crate::*;

/// Poll phase. Transitions only ever move forward: Created -> Started -> Ended.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Created,
    Started,
    Ended,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            Phase::Created => "created",
            Phase::Started => "started",
            Phase::Ended => "ended",
        };
        write!(f, "{}", name)
    }
}

/// Phase state machine of a single poll, together with the keys published on each transition.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Lifecycle {
    poll_id: PollId,
    coordinator: Principal,
    phase: Phase,
    encryption_key: Option<String>,
    decryption_key: Option<String>,
}

impl Lifecycle {
    pub fn new(poll_id: PollId, coordinator: Principal) -> Self {
        Lifecycle {
            poll_id,
            coordinator,
            phase: Phase::Created,
            encryption_key: None,
            decryption_key: None,
        }
    }

    /// Created -> Started. Only the coordinator may start a poll.
    pub fn start(&mut self, caller: &Principal, encryption_key: String) -> Result<(), Error> {
        self.check_coordinator(caller)?;
        if self.phase != Phase::Created {
            return Err(Error::AlreadyStarted(self.poll_id));
        }

        self.phase = Phase::Started;
        self.encryption_key = Some(encryption_key);
        Ok(())
    }

    /// Started -> Ended. Only the coordinator may end a poll.
    pub fn end(&mut self, caller: &Principal, decryption_key: String) -> Result<(), Error> {
        self.check_coordinator(caller)?;
        if self.phase != Phase::Started {
            return Err(Error::NotOngoing(self.poll_id));
        }

        self.phase = Phase::Ended;
        self.decryption_key = Some(decryption_key);
        Ok(())
    }

    pub fn check_coordinator(&self, caller: &Principal) -> Result<(), Error> {
        if *caller != self.coordinator {
            return Err(Error::Unauthorized(self.poll_id));
        }
        Ok(())
    }

    /// Membership is open only before the poll starts
    pub fn check_accepting_members(&self) -> Result<(), Error> {
        if self.phase != Phase::Created {
            return Err(Error::AlreadyStarted(self.poll_id));
        }
        Ok(())
    }

    pub fn check_ongoing(&self) -> Result<(), Error> {
        if self.phase != Phase::Started {
            return Err(Error::NotOngoing(self.poll_id));
        }
        Ok(())
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn coordinator(&self) -> &Principal {
        &self.coordinator
    }

    pub fn encryption_key(&self) -> Option<&str> {
        self.encryption_key.as_deref()
    }

    pub fn decryption_key(&self) -> Option<&str> {
        self.decryption_key.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principals() -> (Principal, Principal) {
        (Principal([1; 32]), Principal([2; 32]))
    }

    #[test]
    fn full_lifecycle() {
        let (coordinator, _) = principals();
        let mut lifecycle = Lifecycle::new(1, coordinator);
        assert_eq!(lifecycle.phase(), Phase::Created);
        assert!(lifecycle.check_accepting_members().is_ok());
        assert!(lifecycle.check_ongoing().is_err());

        lifecycle.start(&coordinator, "enc".into()).unwrap();
        assert_eq!(lifecycle.phase(), Phase::Started);
        assert_eq!(lifecycle.encryption_key(), Some("enc"));
        assert!(lifecycle.check_ongoing().is_ok());

        lifecycle.end(&coordinator, "dec".into()).unwrap();
        assert_eq!(lifecycle.phase(), Phase::Ended);
        assert_eq!(lifecycle.decryption_key(), Some("dec"));
        assert!(lifecycle.check_ongoing().is_err());
    }

    #[test]
    fn guards_check_caller_before_phase() {
        let (coordinator, stranger) = principals();
        let mut lifecycle = Lifecycle::new(1, coordinator);

        assert!(matches!(
            lifecycle.end(&stranger, "dec".into()),
            Err(Error::Unauthorized(1))
        ));
        assert!(matches!(
            lifecycle.end(&coordinator, "dec".into()),
            Err(Error::NotOngoing(1))
        ));
        assert!(matches!(
            lifecycle.start(&stranger, "enc".into()),
            Err(Error::Unauthorized(1))
        ));
        assert_eq!(lifecycle.phase(), Phase::Created);

        lifecycle.start(&coordinator, "enc".into()).unwrap();
        assert!(matches!(
            lifecycle.start(&coordinator, "again".into()),
            Err(Error::AlreadyStarted(1))
        ));
        assert_eq!(lifecycle.encryption_key(), Some("enc"));

        lifecycle.end(&coordinator, "dec".into()).unwrap();
        assert!(matches!(
            lifecycle.end(&coordinator, "again".into()),
            Err(Error::NotOngoing(1))
        ));
        assert!(matches!(
            lifecycle.start(&coordinator, "again".into()),
            Err(Error::AlreadyStarted(1))
        ));
        assert_eq!(lifecycle.decryption_key(), Some("dec"));
    }
}
