use crate::models::{EmergencyAssessment, EmergencyContact, EmergencyPriority};

/// Delivery seam for contact notifications. Delivery is fire-and-forget: no
/// confirmation, retry or dead-letter handling is modeled here.
pub trait NotificationChannel: Send + Sync {
    fn deliver(
        &self,
        contact: &EmergencyContact,
        assessment: &EmergencyAssessment,
    ) -> Result<(), String>;
}

/// Default channel: structured log lines, for deployments where the real
/// transport lives outside the engine.
pub struct TracingChannel;

impl NotificationChannel for TracingChannel {
    fn deliver(
        &self,
        contact: &EmergencyContact,
        assessment: &EmergencyAssessment,
    ) -> Result<(), String> {
        tracing::info!(
            contact = %contact.name,
            channel = contact.channel.as_str(),
            priority = assessment.highest_priority.as_str(),
            requires_ems = assessment.requires_ems,
            "Emergency notification"
        );
        Ok(())
    }
}

/// Maps assessment severity to a contact fan-out policy over a patient's
/// escalation chain.
pub struct NotificationDispatcher {
    channel: Box<dyn NotificationChannel>,
}

impl NotificationDispatcher {
    pub fn new(channel: Box<dyn NotificationChannel>) -> Self {
        Self { channel }
    }

    /// Pure recipient-selection policy:
    /// - LifeThreatening: every registered contact
    /// - Emergency: exactly the 2 lowest rank-numbers
    /// - Urgent: exactly 1, the primary-flagged contact, else lowest rank
    ///
    /// No registered contacts is a silent no-op by contract; the warn-level
    /// log is the hook for a monitoring layer.
    pub fn select_recipients<'c>(
        priority: EmergencyPriority,
        contacts: &'c [EmergencyContact],
    ) -> Vec<&'c EmergencyContact> {
        let mut sorted: Vec<&EmergencyContact> = contacts.iter().collect();
        sorted.sort_by_key(|c| c.rank);

        match priority {
            EmergencyPriority::LifeThreatening => sorted,
            EmergencyPriority::Emergency => sorted.into_iter().take(2).collect(),
            EmergencyPriority::Urgent => sorted
                .iter()
                .find(|c| c.primary)
                .or_else(|| sorted.first())
                .map(|c| vec![*c])
                .unwrap_or_default(),
        }
    }

    /// Deliver to each selected recipient. Per-contact failures are logged
    /// and swallowed; the workflow never fails on delivery.
    pub fn dispatch(
        &self,
        assessment: &EmergencyAssessment,
        recipients: &[&EmergencyContact],
    ) {
        if recipients.is_empty() {
            tracing::warn!(
                priority = assessment.highest_priority.as_str(),
                "No emergency contacts registered; notification skipped"
            );
            return;
        }

        for contact in recipients {
            if let Err(e) = self.channel.deliver(contact, assessment) {
                tracing::warn!(
                    contact = %contact.name,
                    error = %e,
                    "Notification delivery failed"
                );
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::{Arc, Mutex};

    use super::*;

    /// Records delivered contact names for assertions.
    pub struct RecordingChannel {
        pub delivered: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingChannel {
        pub fn new() -> (Self, Arc<Mutex<Vec<String>>>) {
            let delivered = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    delivered: delivered.clone(),
                },
                delivered,
            )
        }
    }

    impl NotificationChannel for RecordingChannel {
        fn deliver(
            &self,
            contact: &EmergencyContact,
            _assessment: &EmergencyAssessment,
        ) -> Result<(), String> {
            self.delivered.lock().unwrap().push(contact.name.clone());
            Ok(())
        }
    }
}
