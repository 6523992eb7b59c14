//! Panel resize drag
//!
//! Pressing the resize grip records where inside the panel it was grabbed.
//! Every pointer move while pressed reports the new left edge to the host.

use tabdock_tabs::HostRequest;

#[derive(Debug, Default)]
pub struct ResizeDrag {
    /// Pointer x inside the panel at press time
    grab_offset: Option<i32>,
}

impl ResizeDrag {
    pub fn press(&mut self, client_x: i32) {
        self.grab_offset = Some(client_x);
    }

    /// Request for a pointer move, if a resize is in progress.
    pub fn motion(&self, screen_x: i32) -> Option<HostRequest> {
        let grab_offset = self.grab_offset?;
        Some(HostRequest::HorizontalResize {
            delta: screen_x.saturating_sub(grab_offset),
        })
    }

    pub fn release(&mut self) {
        self.grab_offset = None;
    }

    pub fn is_active(&self) -> bool {
        self.grab_offset.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resize_drag() {
        let mut drag = ResizeDrag::default();
        assert_eq!(drag.motion(300), None);

        drag.press(4);
        assert!(drag.is_active());
        assert_eq!(
            drag.motion(300),
            Some(HostRequest::HorizontalResize { delta: 296 })
        );
        assert_eq!(
            drag.motion(2),
            Some(HostRequest::HorizontalResize { delta: -2 })
        );

        drag.release();
        assert_eq!(drag.motion(310), None);
    }

    #[test]
    fn test_extreme_coordinates_saturate() {
        let mut drag = ResizeDrag::default();
        drag.press(10);
        assert_eq!(
            drag.motion(i32::MIN),
            Some(HostRequest::HorizontalResize { delta: i32::MIN })
        );

        drag.press(-10);
        assert_eq!(
            drag.motion(i32::MAX),
            Some(HostRequest::HorizontalResize { delta: i32::MAX })
        );
    }
}
