use x11rb::connection::Connection;
use x11rb::protocol::xproto::Window;
use x11rb::rust_connection::RustConnection;

use crate::window::error::WmError;

/// A live X connection plus the handles everything else hangs off.
pub struct Context {
    pub conn: RustConnection,
    pub screen_num: usize,
    pub root_window: Window,
    pub root_depth: u8,
}

impl Context {
    pub fn new(display: Option<&str>) -> Result<Self, WmError> {
        let (conn, screen_num) = x11rb::connect(display)?;
        let screen = &conn.setup().roots[screen_num];
        let root_window = screen.root;
        let root_depth = screen.root_depth;

        Ok(Self {
            conn,
            screen_num,
            root_window,
            root_depth,
        })
    }
}
