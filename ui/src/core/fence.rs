//! Request fencing: only the most recently issued request may land.
//!
//! Every submission takes a [`Ticket`]. When its response arrives the view
//! checks the ticket against the fence; anything older than the latest issued
//! ticket is dropped instead of overwriting newer state.

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn id(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct RequestFence {
    issued: u64,
}

impl RequestFence {
    pub fn issue(&mut self) -> Ticket {
        self.issued = self.issued.saturating_add(1);
        Ticket(self.issued)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.issued
    }

    pub fn latest(&self) -> Option<Ticket> {
        (self.issued > 0).then_some(Ticket(self.issued))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_latest_ticket_is_current() {
        let mut fence = RequestFence::default();
        assert_eq!(fence.latest(), None);

        let first = fence.issue();
        assert!(fence.is_current(first));

        let second = fence.issue();
        assert!(!fence.is_current(first));
        assert!(fence.is_current(second));
        assert!(second > first);
        assert_eq!(fence.latest(), Some(second));
    }
}
