//! Command-mode bracket
//!
//! Every configuration command is wrapped in the sequence
//!
//! ```text
//! Idle ──► EnterPending{1..n} ──ack ok──► CommandSent ──ack──► ExitPending ──► Done
//!               │                              │
//!               └─ n failures ──► Failed       └─ self-exiting ──► Done
//! ```
//!
//! The transition table is pure; [`run`] drives it against a transport.
//! Four commands (baud rate, trigger source, external trigger and reset)
//! take the sensor out of command mode on their own, so no exit frame
//! follows them.

use tfmini_hal::{DeviceId, Transport};
use tfmini_protocol::{Command, CommandFrame, CommandTable, Status};

use crate::config::SessionConfig;
use crate::link;

/// Where a command execution currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Nothing sent yet
    Idle,
    /// Enter-command-mode frame sent, waiting for its ack
    EnterPending {
        /// 1-based attempt number
        attempt: u8,
    },
    /// In command mode, the command frame is out
    CommandSent,
    /// Exit frame is out; carries the command's own status
    ExitPending(Status),
    /// Finished with the command's status
    Done(Status),
    /// Never got into command mode
    Failed,
}

/// Inputs that move a [`Phase`] forward
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// Begin the bracket
    Start,
    /// Ack (or its absence, as [`Status::ErrorTransmission`]) for the
    /// outstanding frame
    Ack(Status),
}

impl Phase {
    /// Attempt to transition to a new phase
    ///
    /// `enter_attempts` is the number of enter frames tried before giving
    /// up. Events that make no sense in the current phase leave it
    /// unchanged.
    pub fn transition(self, event: Event, command: Command, enter_attempts: u8) -> Phase {
        let enter_attempts = enter_attempts.max(1);

        match (self, event) {
            (Phase::Idle, Event::Start) => Phase::EnterPending { attempt: 1 },

            (Phase::EnterPending { .. }, Event::Ack(Status::Success)) => Phase::CommandSent,
            (Phase::EnterPending { attempt }, Event::Ack(_)) if attempt < enter_attempts => {
                Phase::EnterPending {
                    attempt: attempt + 1,
                }
            }
            (Phase::EnterPending { .. }, Event::Ack(_)) => Phase::Failed,

            (Phase::CommandSent, Event::Ack(status)) if command.leaves_command_mode() => {
                Phase::Done(status)
            }
            (Phase::CommandSent, Event::Ack(status)) => Phase::ExitPending(status),

            // The exit ack is read but never changes the outcome
            (Phase::ExitPending(status), Event::Ack(_)) => Phase::Done(status),

            (current, _) => current,
        }
    }

    /// Check if execution has finished
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Done(_) | Phase::Failed)
    }

    /// Final status, once terminal
    pub fn outcome(&self) -> Option<Status> {
        match self {
            Phase::Done(status) => Some(*status),
            Phase::Failed => Some(Status::ErrorTransmission),
            _ => None,
        }
    }
}

/// Execute one command inside the enter/exit bracket
///
/// `frame` is the already-parameterized frame for `command`; the enter and
/// exit frames come from `table`.
pub fn run<T: Transport>(
    transport: &mut T,
    device: DeviceId,
    table: &CommandTable,
    command: Command,
    frame: &CommandFrame,
    config: &SessionConfig,
) -> Status {
    let budget = config.max_search_attempts.max(1);
    let mut phase = Phase::Idle.transition(Event::Start, command, config.enter_attempts);

    loop {
        let outgoing = match phase {
            Phase::Idle => {
                phase = phase.transition(Event::Start, command, config.enter_attempts);
                continue;
            }
            Phase::EnterPending { attempt } => {
                if attempt > 1 {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("device {}: retrying enter ({})", device, attempt);
                }
                table.frame(Command::EnterCommandMode)
            }
            Phase::CommandSent => frame,
            Phase::ExitPending(_) => table.frame(Command::ExitCommandMode),
            Phase::Done(_) | Phase::Failed => break,
        };

        let ack = link::exchange(transport, device, outgoing, budget);
        let next = phase.transition(Event::Ack(ack), command, config.enter_attempts);

        #[cfg(feature = "defmt")]
        defmt::trace!("device {}: {} -> {}", device, phase, next);

        phase = next;
    }

    match phase.outcome() {
        Some(status) => status,
        None => Status::ErrorTransmission,
    }
}
