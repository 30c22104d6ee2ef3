use std::sync::Mutex;

/// Generator of MSH-10 Message Control IDs.
///
/// Ids are decimal integers starting at `"1"`. The counter sits behind a mutex, so concurrent
/// callers always observe strictly increasing, never repeated values.
#[derive(Debug, Default)]
pub struct MessageControlGenerator {
    last_id: Mutex<u64>,
}

impl MessageControlGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resumes numbering after `last_id`, e.g. when continuing a previous run.
    pub fn starting_after(last_id: u64) -> Self {
        Self {
            last_id: Mutex::new(last_id),
        }
    }

    /// Returns the next control id.
    pub fn next_control_id(&self) -> String {
        // The counter is a plain integer, so a poisoned lock still holds a usable value.
        let mut last_id = self
            .last_id
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *last_id += 1;
        tracing::trace!(control_id = *last_id, "issued message control id");
        last_id.to_string()
    }
}
