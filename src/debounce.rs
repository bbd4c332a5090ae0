#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinEntry {
    pub pin_id: u32,
    pub last_accepted_ms: i64,
}

impl PinEntry {
    pub fn new(pin_id: u32) -> Self {
        Self {
            pin_id,
            last_accepted_ms: 0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Debouncer {
    bounce_ms: i64,
    grace_ms: i64,
}

impl Debouncer {
    pub fn new(bounce_ms: u64, grace_ms: u64) -> Self {
        Self {
            bounce_ms: i64::try_from(bounce_ms).unwrap_or(i64::MAX),
            grace_ms: i64::try_from(grace_ms).unwrap_or(i64::MAX),
        }
    }

    // single threshold; irregular bounce needs the window tuned per switch
    pub fn admits(&self, entry: &PinEntry, now_ms: i64) -> bool {
        now_ms.saturating_sub(entry.last_accepted_ms) > self.bounce_ms && now_ms > self.grace_ms
    }

    pub fn accept(&self, entry: &mut PinEntry, now_ms: i64) {
        entry.last_accepted_ms = now_ms;
    }
}
