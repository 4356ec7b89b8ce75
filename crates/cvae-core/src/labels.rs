//! Label alphabet and the conditioning vectors derived from it.
//!
//! A label vector has one slot per label plus a trailing padding slot, so its
//! length is always `labels.len() + 1`. Slot `i` carries the weight of `labels[i]`.

use crate::error::{CvaeError, CvaeResult};

/// Conditioning input for the decoder.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelVector(Vec<f32>);

impl LabelVector {
    /// An all-zero vector of the given length.
    pub fn zeros(len: usize) -> Self {
        Self(vec![0.0; len])
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Weight at `slot`, or `0.0` when the slot is out of range.
    pub fn weight(&self, slot: usize) -> f32 {
        self.0.get(slot).copied().unwrap_or(0.0)
    }

    /// Number of slots holding a non-zero weight.
    pub fn populated(&self) -> usize {
        self.0.iter().filter(|w| **w != 0.0).count()
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.0
    }
}

/// Ordered, immutable label alphabet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRegistry {
    labels: Vec<String>,
}

impl LabelRegistry {
    pub fn new(labels: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Length of every label vector built from this registry.
    pub fn vector_len(&self) -> usize {
        self.labels.len() + 1
    }

    /// Position of `label` in the alphabet; `None` when it is not registered.
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    /// Like [`index_of`](Self::index_of), but an unknown label is an error.
    pub fn require(&self, label: &str) -> CvaeResult<usize> {
        self.index_of(label)
            .ok_or_else(|| CvaeError::InvalidLabel(label.to_string()))
    }

    /// The class that follows `cursor` in alphabet order. The last label wraps to the first.
    pub fn next_index(&self, cursor: usize) -> usize {
        if self.labels.is_empty() {
            return 0;
        }
        (cursor + 1) % self.labels.len()
    }

    /// A vector with `1.0` at `index` and `0.0` everywhere else.
    pub fn one_hot(&self, index: usize) -> LabelVector {
        let mut vector = LabelVector::zeros(self.vector_len());
        if let Some(slot) = vector.0.get_mut(index) {
            *slot = 1.0;
        }
        vector
    }

    /// Linear morph from `from` (weight `1 - t`) toward `to` (weight `t`).
    ///
    /// `t` is clamped to `[0, 1]`. When `from == to` the slot holds `1.0`.
    pub fn blend(&self, from: usize, to: usize, t: f32) -> LabelVector {
        if from == to {
            return self.one_hot(from);
        }
        let t = t.clamp(0.0, 1.0);
        let mut vector = LabelVector::zeros(self.vector_len());
        if let Some(slot) = vector.0.get_mut(from) {
            *slot = 1.0 - t;
        }
        if let Some(slot) = vector.0.get_mut(to) {
            *slot = t;
        }
        vector
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn registry() -> LabelRegistry {
        LabelRegistry::new(["cat", "dog", "bird"])
    }

    #[rstest]
    #[case("cat", 0)]
    #[case("dog", 1)]
    #[case("bird", 2)]
    fn one_hot_has_a_single_unit_slot(#[case] label: &str, #[case] slot: usize) {
        let registry = registry();
        let index = registry.require(label).unwrap();
        let vector = registry.one_hot(index);

        assert_eq!(vector.len(), registry.len() + 1);
        assert_eq!(vector.populated(), 1);
        assert_eq!(vector.weight(slot), 1.0);
        assert!(
            vector
                .as_slice()
                .iter()
                .enumerate()
                .all(|(i, w)| if i == slot { *w == 1.0 } else { *w == 0.0 })
        );
    }

    #[test]
    fn dog_encodes_as_second_slot() {
        let registry = registry();
        let vector = registry.one_hot(registry.require("dog").unwrap());
        assert_eq!(vector.as_slice(), &[0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn unknown_label_yields_sentinel_and_error() {
        let registry = registry();
        assert_eq!(registry.index_of("fish"), None);
        assert!(matches!(
            registry.require("fish"),
            Err(CvaeError::InvalidLabel(label)) if label == "fish"
        ));
    }

    #[test]
    fn next_index_wraps_after_last_label() {
        let registry = registry();
        assert_eq!(registry.next_index(0), 1);
        assert_eq!(registry.next_index(1), 2);
        assert_eq!(registry.next_index(2), 0);
    }

    #[test]
    fn blend_weights_sum_to_one() {
        let registry = registry();
        for step in 0..=10 {
            let t = step as f32 / 10.0;
            let vector = registry.blend(0, 1, t);
            assert!((vector.weight(0) + vector.weight(1) - 1.0).abs() < 1e-6);
            assert_eq!(vector.weight(2), 0.0);
            assert_eq!(vector.weight(3), 0.0);
            assert!(vector.populated() <= 2);
        }
    }

    #[test]
    fn blend_onto_itself_is_one_hot() {
        let registry = LabelRegistry::new(["solo"]);
        let vector = registry.blend(0, 0, 0.3);
        assert_eq!(vector.as_slice(), &[1.0, 0.0]);
    }
}
