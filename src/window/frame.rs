/// Width of the X border drawn around each frame, in pixels.
pub const BORDER_WIDTH: u16 = 3;
/// Border color of a framed window.
pub const BORDER_COLOR: u32 = 0xffff00;
/// Frame background, visible only if the client is smaller than the frame.
pub const BG_COLOR: u32 = 0x0000ff;

/// Placement of a frame window around a client.
///
/// The frame interior mirrors the client's geometry exactly and the border
/// is drawn by the server outside it, so the client always sits at (0, 0)
/// inside its frame and decoration never offsets it.
pub struct FrameGeometry {
    pub x: i16,
    pub y: i16,
    pub width: u16,
    pub height: u16,
}

impl FrameGeometry {
    pub fn from_client(x: i16, y: i16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_mirrors_client_geometry() {
        let frame = FrameGeometry::from_client(100, 50, 800, 600);

        assert_eq!(frame.x, 100);
        assert_eq!(frame.y, 50);
        assert_eq!(frame.width, 800);
        assert_eq!(frame.height, 600);
    }

    #[test]
    fn frame_mirrors_negative_origin() {
        // Clients partially off-screen keep their position.
        let frame = FrameGeometry::from_client(-20, -10, 640, 480);

        assert_eq!(frame.x, -20);
        assert_eq!(frame.y, -10);
        assert_eq!(frame.width, 640);
        assert_eq!(frame.height, 480);
    }
}
