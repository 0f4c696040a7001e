//! Domain events emitted by the engine.
//!
//! Events are fire-and-forget: services emit after their transaction
//! commits, and a failed send is logged, never surfaced to the caller.

use crate::entities::status::{AssignmentSection, EscalationLevel};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Events that can occur in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Opportunity pipeline
    EnquiryCreated(Uuid),
    EnquiryApproved(Uuid),
    EnquiryRejected(Uuid),
    EnquiryConverted {
        enquiry_id: Uuid,
        proposal_request_id: Uuid,
    },
    ProposalRequestCreated(Uuid),
    ProposalRequestApproved(Uuid),
    ProposalRequestConverted {
        proposal_request_id: Uuid,
        proposal_id: Uuid,
    },
    ProposalCreated(Uuid),
    ProposalApproved(Uuid),
    ProposalOutcome {
        proposal_id: Uuid,
        outcome: String,
    },
    ProposalConverted {
        proposal_id: Uuid,
        assignment_id: Uuid,
    },

    // Assignment workflow
    AssignmentRegistered(Uuid),
    AssignmentRegistrationApproved(Uuid),
    TeamLeaderAllocated {
        assignment_id: Uuid,
        officer_id: Uuid,
    },
    SectionSubmitted {
        assignment_id: Uuid,
        section: AssignmentSection,
    },
    SectionApproved {
        assignment_id: Uuid,
        section: AssignmentSection,
    },
    SectionRejected {
        assignment_id: Uuid,
        section: AssignmentSection,
    },
    SectionReopened {
        assignment_id: Uuid,
        section: AssignmentSection,
    },
    AssignmentActivated(Uuid),
    AssignmentDeactivated(Uuid),

    // Milestones & finance
    MilestonePlanned {
        assignment_id: Uuid,
        count: usize,
    },
    MilestoneCompleted(Uuid),
    InvoiceRequested(Uuid),
    InvoiceApproved {
        request_id: Uuid,
        revenue_recognized: Decimal,
    },
    InvoiceRejected(Uuid),
    PaymentRecorded {
        receipt_id: Uuid,
        revenue_recognized: Decimal,
    },

    // Grievances
    GrievanceOpened(Uuid),
    GrievanceEscalated {
        ticket_id: Uuid,
        to_level: EscalationLevel,
    },
    GrievanceResolved(Uuid),
    GrievanceClosed(Uuid),
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Bounded event channel pair. The receiver end is consumed by whatever
/// projection/notification worker the embedding application runs.
pub fn channel(capacity: usize) -> (EventSender, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(capacity);
    (EventSender::new(tx), rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn events_round_trip_through_channel() {
        let (sender, mut rx) = channel(4);
        let id = Uuid::new_v4();
        sender.send(Event::AssignmentActivated(id)).await.unwrap();

        match rx.recv().await {
            Some(Event::AssignmentActivated(got)) => assert_eq!(got, id),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn send_fails_once_receiver_dropped() {
        let (sender, rx) = channel(1);
        drop(rx);
        assert!(sender.send(Event::GrievanceOpened(Uuid::new_v4())).await.is_err());
    }
}
