//! Panel identity labels
//!
//! Panels are labelled like spreadsheet columns: `A`..`Z`, then `AA`, `AB`,
//! and so on (bijective base-26). Labels are assigned in extraction order, so
//! the same model always yields the same labels.

use crate::panel::Panel;

const ALPHABET: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Label for the panel at zero-based `index`
pub fn panel_label(index: usize) -> String {
    let mut letters = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        n -= 1;
        letters.push(ALPHABET[n % 26]);
        n /= 26;
    }
    letters.iter().rev().map(|&b| char::from(b)).collect()
}

/// Label every panel by its position
pub fn assign_labels(panels: &mut [Panel]) {
    for (panel, label) in panels.iter_mut().zip(LabelSequence::new()) {
        panel.label = label;
    }
}

/// Endless iterator over `A`, `B`, ..., `Z`, `AA`, ...
#[derive(Debug, Clone, Default)]
pub struct LabelSequence {
    next: usize,
}

impl LabelSequence {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Iterator for LabelSequence {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        let label = panel_label(self.next);
        self.next += 1;
        Some(label)
    }
}
