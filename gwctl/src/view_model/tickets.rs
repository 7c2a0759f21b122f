//! Per-resource request sequencing.
//!
//! Every load takes a ticket for its resource. When the response arrives it is applied only
//! if that ticket is still the latest one issued for the resource, so an older request that
//! finishes late never overwrites newer data.

use crate::fallback::Resource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Ticket {
    resource: Resource,
    id: u64,
}

impl Ticket {
    pub(crate) fn resource(&self) -> Resource {
        self.resource
    }
}

#[derive(Debug, Default)]
pub(crate) struct RequestTickets {
    next: u64,
    latest: [u64; Resource::COUNT],
    /// Bumped whenever every outstanding ticket is invalidated
    epoch: u64,
}

impl RequestTickets {
    pub(crate) fn issue(&mut self, resource: Resource) -> Ticket {
        self.next += 1;
        self.latest[resource.index()] = self.next;
        Ticket { resource, id: self.next }
    }

    pub(crate) fn is_current(&self, ticket: &Ticket) -> bool {
        self.latest[ticket.resource.index()] == ticket.id
    }

    /// Make every ticket issued so far stale.
    pub(crate) fn invalidate_all(&mut self) {
        self.next += 1;
        self.latest = [self.next; Resource::COUNT];
        self.epoch += 1;
    }

    pub(crate) fn epoch(&self) -> u64 {
        self.epoch
    }
}
