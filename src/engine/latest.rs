/// Hands out tickets for async requests and tells whether a ticket is still the
/// newest one. Responses carrying an outdated ticket are dropped by the caller.
#[derive(Clone, Debug)]
pub struct Latest<K> {
    generation: u64,
    key: Option<K>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Ticket<K> {
    generation: u64,
    pub key: K,
}

impl<K: Clone + PartialEq> Latest<K> {
    pub fn new() -> Self {
        Self {
            generation: 0,
            key: None,
        }
    }

    pub fn issue(&mut self, key: K) -> Ticket<K> {
        self.generation += 1;
        self.key = Some(key.clone());

        Ticket {
            generation: self.generation,
            key,
        }
    }

    /// Supersedes every outstanding ticket without issuing a new one.
    pub fn invalidate(&mut self) {
        self.generation += 1;
        self.key = None;
    }

    pub fn is_current(&self, ticket: &Ticket<K>) -> bool {
        ticket.generation == self.generation && self.key.as_ref() == Some(&ticket.key)
    }

    pub fn key(&self) -> Option<&K> {
        self.key.as_ref()
    }
}

#[test]
fn only_the_newest_ticket_is_current() {
    let mut latest = Latest::new();

    let a = latest.issue("lyo".to_string());
    let b = latest.issue("lyon".to_string());

    assert!(!latest.is_current(&a));
    assert!(latest.is_current(&b));
}

#[test]
fn reissuing_the_same_key_still_supersedes() {
    let mut latest = Latest::new();

    let first = latest.issue(1);
    let second = latest.issue(1);

    assert!(!latest.is_current(&first));
    assert!(latest.is_current(&second));
}

#[test]
fn invalidate_supersedes_everything() {
    let mut latest = Latest::new();

    let ticket = latest.issue(1);
    latest.invalidate();

    assert!(!latest.is_current(&ticket));
    assert_eq!(latest.key(), None);
}
