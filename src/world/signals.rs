//! Signals broadcast to receiving things

use ahash::AHashSet;

use super::events::ThingEvent;
use super::World;
use crate::core::error::ThingError;
use crate::core::types::ThingId;

#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub tag: String,
    pub subject: Option<ThingId>,
}

impl Signal {
    pub fn new(tag: impl Into<String>, subject: Option<ThingId>) -> Self {
        Self {
            tag: tag.into(),
            subject,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SignalManager {
    receivers: AHashSet<ThingId>,
    sent: Vec<Signal>,
}

impl SignalManager {
    pub fn register_receiver(&mut self, thing: ThingId) {
        self.receivers.insert(thing);
    }

    pub fn deregister_receiver(&mut self, thing: ThingId) {
        self.receivers.remove(&thing);
    }

    pub fn is_receiver(&self, thing: ThingId) -> bool {
        self.receivers.contains(&thing)
    }

    /// Every signal sent since the last [`take_sent`](Self::take_sent), oldest first
    pub fn sent(&self) -> &[Signal] {
        &self.sent
    }

    pub fn take_sent(&mut self) -> Vec<Signal> {
        std::mem::take(&mut self.sent)
    }

    fn receivers_sorted(&self) -> Vec<ThingId> {
        let mut ids: Vec<_> = self.receivers.iter().copied().collect();
        ids.sort();
        ids
    }
}

impl World {
    /// Deliver `signal` to every registered receiver
    pub fn send_signal(&mut self, signal: Signal) {
        tracing::debug!("Signal {} ({:?})", signal.tag, signal.subject);
        for id in self.signals.receivers_sorted() {
            let Some(thing) = self.things.get_mut(&id) else {
                continue;
            };
            let mut overdrawn = false;
            for comp in thing.comps.iter_mut() {
                overdrawn |= comp.receive_signal(&signal.tag);
            }
            if overdrawn {
                let name = thing.to_string();
                self.diagnostics.error(ThingError::PowerOverdraw(name));
            }
        }
        self.events.push(ThingEvent::SignalSent {
            tag: signal.tag.clone(),
            subject: signal.subject,
        });
        self.signals.sent.push(signal);
    }

    /// Drain the signal log
    pub fn take_signals(&mut self) -> Vec<Signal> {
        self.signals.take_sent()
    }

    /// Send `{tag}.{suffix}` for each quest tag on the thing
    pub(crate) fn send_quest_signals(&mut self, id: ThingId, suffix: &str) {
        let tags = match self.things.get(&id) {
            Some(thing) if !thing.quest_tags.is_empty() => thing.quest_tags.clone(),
            _ => return,
        };
        for tag in tags {
            self.send_signal(Signal::new(format!("{}.{}", tag, suffix), Some(id)));
        }
    }
}
