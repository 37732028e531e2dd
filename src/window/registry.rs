use std::collections::HashMap;

use x11rb::protocol::xproto::Window;

/// The authoritative client -> frame mapping.
///
/// An entry exists iff the client is currently framed: entries are added
/// only when a frame is created around a client and removed only when that
/// frame is torn down. Every later event is judged managed or unmanaged by
/// membership here, never by asking the server again.
#[derive(Debug, Default)]
pub struct ClientRegistry {
    frames: HashMap<Window, Window>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self {
            frames: HashMap::new(),
        }
    }

    /// Records a freshly framed client. Framing a client twice is a logic
    /// error; the dispatch policy keeps this unreachable.
    pub fn put(&mut self, client: Window, frame: Window) {
        let previous = self.frames.insert(client, frame);
        debug_assert!(previous.is_none(), "client {} framed twice", client);
    }

    pub fn get(&self, client: Window) -> Option<Window> {
        self.frames.get(&client).copied()
    }

    pub fn remove(&mut self, client: Window) -> Option<Window> {
        self.frames.remove(&client)
    }

    pub fn contains(&self, client: Window) -> bool {
        self.frames.contains_key(&client)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_get_remove() {
        let mut reg = ClientRegistry::new();
        assert!(!reg.contains(10));

        reg.put(10, 100);
        assert!(reg.contains(10));
        assert_eq!(reg.get(10), Some(100));

        assert_eq!(reg.remove(10), Some(100));
        assert!(!reg.contains(10));
        assert_eq!(reg.get(10), None);
    }

    #[test]
    fn frame_unframe_round_trip_leaves_no_entry() {
        let mut reg = ClientRegistry::new();
        reg.put(7, 70);
        reg.remove(7);
        assert!(reg.is_empty());
    }

    #[test]
    fn mapping_stays_one_to_one() {
        let mut reg = ClientRegistry::new();
        reg.put(1, 11);
        reg.put(2, 22);
        reg.put(3, 33);
        assert_eq!(reg.len(), 3);

        let mut frames = vec![
            reg.get(1).unwrap(),
            reg.get(2).unwrap(),
            reg.get(3).unwrap(),
        ];
        frames.sort_unstable();
        frames.dedup();
        assert_eq!(frames.len(), 3);

        assert_eq!(reg.remove(2), Some(22));
        assert_eq!(reg.len(), 2);
        assert!(reg.contains(1) && reg.contains(3));
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "framed twice")]
    fn double_put_is_a_logic_error() {
        let mut reg = ClientRegistry::new();
        reg.put(5, 50);
        reg.put(5, 51);
    }
}
