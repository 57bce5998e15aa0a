use super::state::InputState;
use super::types::{InputEvent, Key};

/// Source of input for the engine loop.
pub trait InputProvider {
    /// Drains events received since the previous call, in arrival order.
    fn poll_events(&mut self) -> Vec<InputEvent>;

    /// Whether `key` is currently held.
    fn key_down(&self, key: Key) -> bool;

    /// Last known pointer position in logical pixels.
    fn mouse_position(&self) -> (f32, f32);
}

/// Typed receiver for drawable-size changes.
///
/// Registered with the engine's event dispatch; called synchronously before
/// the next frame is rendered.
pub trait ResizeListener {
    fn on_resize(&mut self, width: u32, height: u32);
}

/// Queue-backed `InputProvider`.
///
/// Platform glue pushes translated events as they arrive; held-state is
/// updated immediately so `key_down` is accurate even before the queue is
/// drained.
#[derive(Debug, Default)]
pub struct EventQueue {
    state: InputState,
    pending: Vec<InputEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, ev: InputEvent) {
        self.state.apply_event(&ev);
        self.pending.push(ev);
    }

    pub fn state(&self) -> &InputState {
        &self.state
    }
}

impl InputProvider for EventQueue {
    fn poll_events(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.pending)
    }

    fn key_down(&self, key: Key) -> bool {
        self.state.key_down(key)
    }

    fn mouse_position(&self) -> (f32, f32) {
        self.state.pointer_pos
    }
}

/// Forwards every `Resize` in `events` to `listener`, in order.
///
/// Returns the number of resize notifications delivered.
pub fn dispatch_resize(events: &[InputEvent], listener: &mut dyn ResizeListener) -> usize {
    let mut n = 0;
    for ev in events {
        if let InputEvent::Resize { width, height } = ev {
            listener.on_resize(*width, *height);
            n += 1;
        }
    }
    n
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::MouseButton;

    #[derive(Default)]
    struct Sizes(Vec<(u32, u32)>);

    impl ResizeListener for Sizes {
        fn on_resize(&mut self, width: u32, height: u32) {
            self.0.push((width, height));
        }
    }

    #[test]
    fn poll_drains_in_arrival_order() {
        let mut q = EventQueue::new();
        q.push(InputEvent::MouseMove { x: 1.0, y: 2.0 });
        q.push(InputEvent::Quit);

        let evs = q.poll_events();
        assert_eq!(evs, vec![InputEvent::MouseMove { x: 1.0, y: 2.0 }, InputEvent::Quit]);
        assert!(q.poll_events().is_empty());
    }

    #[test]
    fn key_state_visible_before_poll() {
        let mut q = EventQueue::new();
        q.push(InputEvent::KeyDown(Key::D));
        assert!(q.key_down(Key::D));
    }

    #[test]
    fn mouse_position_tracks_latest_event() {
        let mut q = EventQueue::new();
        q.push(InputEvent::MouseDown { button: MouseButton::Left, x: 3.0, y: 3.0 });
        q.push(InputEvent::MouseMove { x: 8.0, y: 5.0 });
        assert_eq!(q.mouse_position(), (8.0, 5.0));
    }

    #[test]
    fn resize_dispatch_is_typed_and_ordered() {
        let evs = vec![
            InputEvent::Resize { width: 800, height: 600 },
            InputEvent::Quit,
            InputEvent::Resize { width: 1024, height: 768 },
        ];
        let mut sizes = Sizes::default();
        assert_eq!(dispatch_resize(&evs, &mut sizes), 2);
        assert_eq!(sizes.0, vec![(800, 600), (1024, 768)]);
    }
}
