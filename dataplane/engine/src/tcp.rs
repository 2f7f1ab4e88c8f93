/*
Copyright 2023 The Kubernetes Authors.

SPDX-License-Identifier: (GPL-2.0-only OR BSD-2-Clause)
*/

//! Connection lifecycle driven by TCP control flags.
//!
//! Only the teardown signals matter here: a flow is `Active` until a FIN is
//! seen, then `FinWait`, and `Closing` as soon as any packet carries RST. The
//! most severe flag ever observed wins, so packet order within a flow does not
//! change the outcome and nothing can move a flow back towards `Active`.

use std::time::{Duration, Instant};

use common::{ConnState, Protocol, TcpFlags};

use crate::config::Timeouts;

/// The state a single packet's flags ask for, ignoring history.
pub fn classify(flags: TcpFlags) -> ConnState {
    if flags.rst() {
        ConnState::Closing
    } else if flags.fin() {
        ConnState::FinWait
    } else {
        ConnState::Active
    }
}

// Updates the connection's state from the flags of the incoming packet.
// It returns true if the state transitioned to a different phase.
pub fn process_tcp_state_transition(flags: TcpFlags, state: &mut ConnState) -> bool {
    let requested = classify(flags);
    if requested > *state {
        *state = requested;
        return true;
    }
    false
}

/// Applies the lifecycle rules to connection entries and computes their
/// expiry deadlines.
#[derive(Debug, Clone, Copy)]
pub struct LifecycleMonitor {
    timeouts: Timeouts,
}

impl LifecycleMonitor {
    pub fn new(timeouts: Timeouts) -> Self {
        LifecycleMonitor { timeouts }
    }

    pub fn timeouts(&self) -> &Timeouts {
        &self.timeouts
    }

    /// State and deadline for a flow whose first packet carries `flags`.
    pub fn open(&self, protocol: Protocol, flags: TcpFlags, now: Instant) -> (ConnState, Instant) {
        let state = match protocol {
            Protocol::Tcp => classify(flags),
            Protocol::Udp => ConnState::Active,
        };
        (state, now + self.timeouts.for_state(protocol, state))
    }

    /// Applies a packet to an existing entry. Returns true when the state
    /// changed.
    ///
    /// * `Active` entries get their idle deadline pushed back by every packet.
    /// * `FinWait` is measured from the first FIN and is not extended by later
    ///   traffic.
    /// * `Closing` may only shorten the deadline, never extend it.
    pub fn observe(
        &self,
        protocol: Protocol,
        flags: TcpFlags,
        state: &mut ConnState,
        deadline: &mut Instant,
        now: Instant,
    ) -> bool {
        let transitioned = match protocol {
            Protocol::Tcp => process_tcp_state_transition(flags, state),
            Protocol::Udp => false,
        };

        match *state {
            ConnState::Active => {
                *deadline = now + self.timeouts.for_state(protocol, ConnState::Active);
            }
            ConnState::FinWait if transitioned => {
                *deadline = now + self.timeouts.for_state(protocol, ConnState::FinWait);
            }
            ConnState::Closing if transitioned => {
                let rst_deadline = now + self.timeouts.for_state(protocol, ConnState::Closing);
                *deadline = (*deadline).min(rst_deadline);
            }
            _ => {}
        }

        transitioned
    }

    /// Applies a state learned from a peer node, together with the deadline
    /// the peer holds for it. The merge is monotonic like local packets, so
    /// duplicated or reordered records are harmless, and it never moves a
    /// deadline past one that some node derived from real traffic.
    pub fn merge(
        &self,
        incoming: ConnState,
        remote_deadline: Instant,
        state: &mut ConnState,
        deadline: &mut Instant,
    ) -> bool {
        if incoming > *state {
            *state = incoming;
            *deadline = match incoming {
                ConnState::Closing => (*deadline).min(remote_deadline),
                _ => remote_deadline,
            };
            return true;
        }
        if incoming == *state {
            *deadline = match incoming {
                ConnState::Active => (*deadline).max(remote_deadline),
                _ => (*deadline).min(remote_deadline),
            };
        }
        false
    }

    /// Deadline a replicated entry may claim: the peer's remaining lifetime,
    /// capped by the local timeout for its state.
    pub fn remote_deadline(
        &self,
        protocol: Protocol,
        state: ConnState,
        remaining: Duration,
        now: Instant,
    ) -> Instant {
        now + remaining.min(self.timeouts.for_state(protocol, state))
    }
}
