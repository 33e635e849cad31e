use parking_lot::RwLock;

/// A single string value, overwritten by one thread and read by others.
///
/// The sender publishes `"spa->tpa"` here after every request it puts on the wire, and clears
/// it when it stops. There is no history; readers see the last write.
#[derive(Debug, Default)]
pub struct StatusSlot {
    value: RwLock<String>,
}

impl StatusSlot {
    pub fn new() -> Self {
        StatusSlot::default()
    }

    pub fn set(&self, value: impl Into<String>) {
        *self.value.write() = value.into();
    }

    pub fn get(&self) -> String {
        self.value.read().clone()
    }

    pub fn clear(&self) {
        self.value.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_write_wins() {
        let slot = StatusSlot::new();
        assert_eq!(slot.get(), "");

        slot.set("10.0.0.43->10.0.0.1");
        slot.set("10.0.0.43->10.0.0.2");
        assert_eq!(slot.get(), "10.0.0.43->10.0.0.2");

        slot.clear();
        assert_eq!(slot.get(), "");
    }
}
