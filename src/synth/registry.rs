use crate::synth::voice::{Voice, VoiceId};

/// Table of live voices, in insertion order.
///
/// Only the manager inserts and removes; everything else looks voices up by
/// id. Voice counts stay small (tens), so a linear scan beats hashing.
#[derive(Default)]
pub struct VoiceRegistry {
    voices: Vec<Voice>,
}

impl VoiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, voice: Voice) -> VoiceId {
        let id = voice.id().clone();
        self.voices.push(voice);
        id
    }

    pub fn remove(&mut self, id: &VoiceId) -> Option<Voice> {
        let index = self.voices.iter().position(|v| v.id() == id)?;
        Some(self.voices.remove(index))
    }

    /// Remove every voice matching `pred`, returning them.
    pub fn remove_where(&mut self, mut pred: impl FnMut(&Voice) -> bool) -> Vec<Voice> {
        let mut removed = Vec::new();
        let mut index = 0;
        while index < self.voices.len() {
            if pred(&self.voices[index]) {
                removed.push(self.voices.remove(index));
            } else {
                index += 1;
            }
        }
        removed
    }

    pub fn get(&self, id: &VoiceId) -> Option<&Voice> {
        self.voices.iter().find(|v| v.id() == id)
    }

    pub fn get_mut(&mut self, id: &VoiceId) -> Option<&mut Voice> {
        self.voices.iter_mut().find(|v| v.id() == id)
    }

    pub fn contains(&self, id: &VoiceId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    pub fn ids(&self) -> Vec<VoiceId> {
        self.voices.iter().map(|v| v.id().clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Voice> {
        self.voices.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Voice> {
        self.voices.iter_mut()
    }

    pub fn drain(&mut self) -> Vec<Voice> {
        std::mem::take(&mut self.voices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Category;
    use crate::synth::voice::VoiceKind;

    fn voice(seq: u64) -> Voice {
        Voice::new(VoiceId::new(VoiceKind::Tone, "t", 0, seq), Category::Events)
    }

    #[test]
    fn insert_lookup_remove() {
        let mut registry = VoiceRegistry::new();
        let a = registry.insert(voice(1));
        let b = registry.insert(voice(2));
        assert_eq!(registry.len(), 2);
        assert!(registry.contains(&a));

        assert!(registry.remove(&a).is_some());
        assert!(registry.remove(&a).is_none());
        assert_eq!(registry.ids(), vec![b]);
    }

    #[test]
    fn remove_where_keeps_order_of_the_rest() {
        let mut registry = VoiceRegistry::new();
        for seq in 0..6 {
            registry.insert(voice(seq));
        }
        let removed = registry.remove_where(|v| v.id().seq() % 2 == 0);
        assert_eq!(removed.len(), 3);
        let left: Vec<u64> = registry.iter().map(|v| v.id().seq()).collect();
        assert_eq!(left, vec![1, 3, 5]);
    }
}
