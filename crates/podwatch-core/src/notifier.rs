//! Change notification pipeline.
//!
//! Turns each lifecycle event into a [`ChangeRecord`], encodes it, logs it,
//! and hands the payload to a [`Transport`]. Handlers run on a single
//! worker (`&mut self`) and process events strictly in the order given:
//! nothing is buffered, merged, or reordered across calls.

use podwatch_common::config::{NotifierConfig, UpdateAction};
use podwatch_common::constants::STATUS_DELETED;
use podwatch_common::error::Result;
use podwatch_common::types::{Action, ChangeRecord, PodSnapshot};

use crate::dedup::LastLabelCache;
use crate::event::{PodEvent, SnapshotContext};
use crate::status::synthesize;
use crate::transport::Transport;

/// Converts pod lifecycle events into change notifications.
#[derive(Debug)]
pub struct Notifier<T> {
    transport: T,
    update_action: Action,
    last_labels: Option<LastLabelCache>,
}

impl<T: Transport> Notifier<T> {
    /// Creates a notifier with the default configuration.
    #[must_use]
    pub const fn new(transport: T) -> Self {
        Self {
            transport,
            update_action: Action::Add,
            last_labels: None,
        }
    }

    /// Creates a notifier from a configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration fails validation.
    pub fn with_config(transport: T, config: &NotifierConfig) -> Result<Self> {
        config.validate()?;
        let update_action = match config.update_action {
            UpdateAction::Add => Action::Add,
            UpdateAction::Update => Action::Update,
        };
        let last_labels = config
            .suppress_unchanged
            .then(|| LastLabelCache::new(config.dedup_capacity));
        Ok(Self {
            transport,
            update_action,
            last_labels,
        })
    }

    /// Handles one inbound event.
    ///
    /// Returns the emitted record, or `None` if it was suppressed as
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the change record cannot be encoded.
    pub fn dispatch(&mut self, event: &PodEvent) -> Result<Option<ChangeRecord>> {
        match event {
            PodEvent::Add { object } => self.on_add(object),
            PodEvent::Update { old, new } => self.on_update(old, new),
            PodEvent::Delete { object } => self.on_delete(object).map(Some),
        }
    }

    /// Handles a newly observed pod.
    ///
    /// # Errors
    ///
    /// Returns an error if the change record cannot be encoded.
    pub fn on_add(&mut self, pod: &PodSnapshot) -> Result<Option<ChangeRecord>> {
        let status = label_for(pod, SnapshotContext::New);
        self.emit_if_changed(ChangeRecord::new(
            Action::Add,
            &pod.name,
            &pod.namespace,
            status,
        ))
    }

    /// Handles a changed pod. Every update is emitted, whether or not the
    /// label moved, unless suppression is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the change record cannot be encoded.
    pub fn on_update(
        &mut self,
        old: &PodSnapshot,
        new: &PodSnapshot,
    ) -> Result<Option<ChangeRecord>> {
        let previous = label_for(old, SnapshotContext::Old);
        let status = label_for(new, SnapshotContext::New);
        tracing::debug!(
            name = %new.name,
            namespace = %new.namespace,
            %previous,
            %status,
            "pod updated"
        );
        self.emit_if_changed(ChangeRecord::new(
            self.update_action,
            &new.name,
            &new.namespace,
            status,
        ))
    }

    /// Handles a removed pod. The label is always `deleted`; container
    /// state at deletion time is not inspected.
    ///
    /// # Errors
    ///
    /// Returns an error if the change record cannot be encoded.
    pub fn on_delete(&mut self, pod: &PodSnapshot) -> Result<ChangeRecord> {
        if let Some(cache) = self.last_labels.as_mut() {
            cache.forget(&pod.namespace, &pod.name);
        }
        let record = ChangeRecord::new(Action::Delete, &pod.name, &pod.namespace, STATUS_DELETED);
        self.emit(&record)?;
        Ok(record)
    }

    fn emit_if_changed(&mut self, record: ChangeRecord) -> Result<Option<ChangeRecord>> {
        if let Some(cache) = self.last_labels.as_mut() {
            if !cache.observe(&record.namespace, &record.name, &record.status) {
                tracing::debug!(
                    name = %record.name,
                    namespace = %record.namespace,
                    status = %record.status,
                    "label unchanged, notification suppressed"
                );
                return Ok(None);
            }
        }
        self.emit(&record)?;
        Ok(Some(record))
    }

    fn emit(&self, record: &ChangeRecord) -> Result<()> {
        let payload = record.to_payload()?;
        tracing::info!(
            action = %record.action,
            name = %record.name,
            namespace = %record.namespace,
            status = %record.status,
            payload = %String::from_utf8_lossy(&payload),
            "sent"
        );
        self.transport.send(&payload);
        Ok(())
    }
}

fn label_for(pod: &PodSnapshot, context: SnapshotContext) -> String {
    let span = tracing::debug_span!(
        "synthesize",
        %context,
        name = %pod.name,
        namespace = %pod.namespace
    );
    let label = span.in_scope(|| synthesize(pod));
    tracing::trace!(%context, name = %pod.name, %label, "status synthesized");
    label
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use podwatch_common::types::{ContainerState, ContainerStatus, PodPhase};

    use super::*;
    use crate::transport::RecordingTransport;

    fn running_pod(name: &str) -> PodSnapshot {
        let mut pod = PodSnapshot::new(name, "prod", PodPhase::Running);
        pod.container_statuses = vec![ContainerStatus {
            ready: true,
            ..ContainerStatus::new("app", ContainerState::running())
        }];
        pod
    }

    fn decoded(transport: &RecordingTransport) -> Vec<ChangeRecord> {
        transport
            .payloads()
            .iter()
            .map(|p| serde_json::from_slice(p).unwrap())
            .collect()
    }

    #[test]
    fn add_emits_synthesized_label() {
        let recorder = RecordingTransport::new();
        let mut notifier = Notifier::new(recorder.clone());
        let record = notifier.on_add(&running_pod("web-0")).unwrap().unwrap();
        assert_eq!(record, ChangeRecord::new(Action::Add, "web-0", "prod", "Running"));
        assert_eq!(decoded(&recorder), vec![record]);
    }

    #[test]
    fn update_is_reported_as_add_by_default() {
        let recorder = RecordingTransport::new();
        let mut notifier = Notifier::new(recorder.clone());
        let old = PodSnapshot::new("web-0", "prod", PodPhase::Pending);
        let _ = notifier.on_update(&old, &running_pod("web-0")).unwrap();
        let records = decoded(&recorder);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].action, Action::Add);
        assert_eq!(records[0].status, "Running");
    }

    #[test]
    fn unchanged_update_still_emits_by_default() {
        let recorder = RecordingTransport::new();
        let mut notifier = Notifier::new(recorder.clone());
        let pod = running_pod("web-0");
        let _ = notifier.on_update(&pod, &pod).unwrap();
        let _ = notifier.on_update(&pod, &pod).unwrap();
        assert_eq!(recorder.payloads().len(), 2);
    }

    #[test]
    fn update_action_can_be_distinguished() {
        let recorder = RecordingTransport::new();
        let config = NotifierConfig {
            update_action: UpdateAction::Update,
            ..NotifierConfig::default()
        };
        let mut notifier = Notifier::with_config(recorder.clone(), &config).unwrap();
        let pod = running_pod("web-0");
        let record = notifier.on_update(&pod, &pod).unwrap().unwrap();
        assert_eq!(record.action, Action::Update);
        let _ = notifier.on_add(&pod).unwrap();
        assert_eq!(decoded(&recorder)[1].action, Action::Add);
    }

    #[test]
    fn delete_label_is_fixed() {
        let recorder = RecordingTransport::new();
        let mut notifier = Notifier::new(recorder.clone());
        let mut pod = running_pod("web-0");
        pod.container_statuses[0].state = ContainerState::waiting("CrashLoopBackOff");
        pod.deletion_timestamp = Some(Utc::now());
        let record = notifier.on_delete(&pod).unwrap();
        assert_eq!(record.status, "deleted");
        assert_eq!(record.action, Action::Delete);
        assert_eq!(decoded(&recorder), vec![record]);
    }

    #[test]
    fn suppression_skips_repeated_labels_until_delete() {
        let recorder = RecordingTransport::new();
        let config = NotifierConfig {
            suppress_unchanged: true,
            ..NotifierConfig::default()
        };
        let mut notifier = Notifier::with_config(recorder.clone(), &config).unwrap();
        let pod = running_pod("web-0");

        assert!(notifier.on_add(&pod).unwrap().is_some());
        assert!(notifier.on_update(&pod, &pod).unwrap().is_none());
        let _ = notifier.on_delete(&pod).unwrap();
        assert!(notifier.on_add(&pod).unwrap().is_some());

        let actions: Vec<Action> = decoded(&recorder).iter().map(|r| r.action).collect();
        assert_eq!(actions, vec![Action::Add, Action::Delete, Action::Add]);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = NotifierConfig {
            suppress_unchanged: true,
            dedup_capacity: 0,
            ..NotifierConfig::default()
        };
        assert!(Notifier::with_config(RecordingTransport::new(), &config).is_err());
    }

    #[test]
    fn dispatch_routes_each_kind() {
        let recorder = RecordingTransport::new();
        let mut notifier = Notifier::new(recorder.clone());
        let pod = running_pod("web-0");
        let events = [
            PodEvent::Add {
                object: pod.clone(),
            },
            PodEvent::Update {
                old: pod.clone(),
                new: pod.clone(),
            },
            PodEvent::Delete { object: pod },
        ];
        for event in &events {
            let _ = notifier.dispatch(event).unwrap();
        }
        let statuses: Vec<String> = decoded(&recorder).into_iter().map(|r| r.status).collect();
        assert_eq!(statuses, vec!["Running", "Running", "deleted"]);
    }
}
