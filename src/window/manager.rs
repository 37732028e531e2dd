use tracing::{debug, error, info, warn};
use x11rb::connection::Connection;
use x11rb::errors::ReplyError;
use x11rb::protocol::xproto::{
    ChangeWindowAttributesAux, ConfigureRequestEvent, ConfigureWindowAux, ConnectionExt,
    CreateWindowAux, EventMask, MapRequestEvent, MapState, SetMode, UnmapNotifyEvent, Window,
    WindowClass,
};
use x11rb::protocol::{ErrorKind, Event};

use crate::core::context::Context;
use crate::window::error::WmError;
use crate::window::frame::{FrameGeometry, BG_COLOR, BORDER_COLOR, BORDER_WIDTH};
use crate::window::registry::ClientRegistry;

pub struct WindowManager {
    ctx: Context,
    registry: ClientRegistry,
}

/// Whether a window may be framed. Windows discovered at startup are adopted
/// only if they are viewable and have not set override-redirect; a window
/// that asks to be mapped while the manager runs has opted in by asking.
fn should_adopt(adopted_at_startup: bool, override_redirect: bool, map_state: MapState) -> bool {
    !adopted_at_startup || (!override_redirect && map_state == MapState::VIEWABLE)
}

/// What to do with an UnmapNotify, given registry membership and the
/// container the notification was reported from.
#[derive(Debug, PartialEq, Eq)]
enum UnmapAction {
    /// Not a managed client.
    Ignore,
    /// The manager's own reparent of an adopted window echoed back via the
    /// root container.
    IgnoreReparentEcho,
    Unframe,
}

fn unmap_action(registered: bool, reported_from_root: bool) -> UnmapAction {
    if !registered {
        UnmapAction::Ignore
    } else if reported_from_root {
        UnmapAction::IgnoreReparentEcho
    } else {
        UnmapAction::Unframe
    }
}

impl WindowManager {
    pub fn new(ctx: Context) -> Self {
        Self {
            ctx,
            registry: ClientRegistry::new(),
        }
    }

    /// One-shot initialization, then the event loop. Only returns on a
    /// connection-level failure or when another manager holds the display.
    pub fn run(&mut self) -> Result<(), WmError> {
        self.become_wm()?;
        self.scan_windows()?;

        loop {
            self.ctx.conn.flush()?;
            let event = self.ctx.conn.wait_for_event()?;
            match self.dispatch(event) {
                Ok(()) => {}
                // A stale window in one request must not halt management of
                // every other window.
                Err(WmError::Reply(e)) => {
                    error!("Request failed while handling event: {}", e);
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Claim substructure redirection on the root window. The server grants
    /// it to exactly one client per screen; an Access error here means a
    /// window manager is already running.
    fn become_wm(&self) -> Result<(), WmError> {
        let change = ChangeWindowAttributesAux::new()
            .event_mask(EventMask::SUBSTRUCTURE_REDIRECT | EventMask::SUBSTRUCTURE_NOTIFY);
        let result = self
            .ctx
            .conn
            .change_window_attributes(self.ctx.root_window, &change)?
            .check();

        match result {
            Ok(()) => {
                info!(
                    "Acquired substructure redirection on root window {}",
                    self.ctx.root_window
                );
                Ok(())
            }
            Err(ReplyError::X11Error(ref e)) if e.error_kind == ErrorKind::Access => {
                Err(WmError::AlreadyManaged)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Adopt the top-level windows that already exist. The server is grabbed
    /// for the duration so the window population cannot change between the
    /// tree query and the adoption.
    fn scan_windows(&mut self) -> Result<(), WmError> {
        self.ctx.conn.grab_server()?;
        let tree = self.ctx.conn.query_tree(self.ctx.root_window)?.reply()?;
        info!("Scanning {} existing top-level windows", tree.children.len());

        for &win in &tree.children {
            // A window can vanish between the query and its attribute fetch.
            if let Err(e) = self.frame_window(win, true) {
                warn!("Failed to adopt window {}: {}", win, e);
            }
        }

        self.ctx.conn.ungrab_server()?;
        self.ctx.conn.flush()?;
        info!("Adopted {} pre-existing windows", self.registry.len());
        Ok(())
    }

    /// Wrap a client window in a newly created frame and record the pair.
    ///
    /// Returns `Ok(None)` without issuing any mutating request when a
    /// pre-existing window fails the adoption filter.
    fn frame_window(
        &mut self,
        win: Window,
        adopted_at_startup: bool,
    ) -> Result<Option<Window>, WmError> {
        let attrs = self.ctx.conn.get_window_attributes(win)?.reply()?;
        if !should_adopt(adopted_at_startup, attrs.override_redirect, attrs.map_state) {
            debug!(
                "Skipping pre-existing window {} (override-redirect or not viewable)",
                win
            );
            return Ok(None);
        }

        let geom = self.ctx.conn.get_geometry(win)?.reply()?;
        let frame_geom = FrameGeometry::from_client(geom.x, geom.y, geom.width, geom.height);

        let frame = self.ctx.conn.generate_id()?;
        let values = CreateWindowAux::new()
            .event_mask(EventMask::SUBSTRUCTURE_REDIRECT | EventMask::SUBSTRUCTURE_NOTIFY)
            .background_pixel(BG_COLOR)
            .border_pixel(BORDER_COLOR);
        self.ctx.conn.create_window(
            self.ctx.root_depth,
            frame,
            self.ctx.root_window,
            frame_geom.x,
            frame_geom.y,
            frame_geom.width,
            frame_geom.height,
            BORDER_WIDTH,
            WindowClass::INPUT_OUTPUT,
            0,
            &values,
        )?;

        // The save-set entry must exist before the client leaves the root:
        // it is what hands the client back to the root if the manager dies.
        self.ctx.conn.change_save_set(SetMode::INSERT, win)?;
        self.ctx.conn.reparent_window(win, frame, 0, 0)?;
        // Map the frame only once the client is inside it. The client's own
        // map state stays under the caller's control.
        self.ctx.conn.map_window(frame)?;

        self.registry.put(win, frame);
        info!("Framed window {} [frame {}]", win, frame);
        Ok(Some(frame))
    }

    /// Reverse `frame_window` exactly. The client must be back under the
    /// root before its frame is destroyed, or it would go down with it.
    fn unframe_window(&mut self, win: Window) -> Result<(), WmError> {
        let Some(frame) = self.registry.get(win) else {
            warn!("Ignoring unframe of unmanaged window {}", win);
            return Ok(());
        };

        self.ctx.conn.unmap_window(frame)?;
        self.ctx.conn.reparent_window(win, self.ctx.root_window, 0, 0)?;
        self.ctx.conn.change_save_set(SetMode::DELETE, win)?;
        self.ctx.conn.destroy_window(frame)?;
        self.registry.remove(win);

        info!("Unframed window {} [frame {}]", win, frame);
        Ok(())
    }

    fn dispatch(&mut self, event: Event) -> Result<(), WmError> {
        match event {
            Event::MapRequest(e) => self.on_map_request(e),
            Event::UnmapNotify(e) => self.on_unmap_notify(e),
            Event::ConfigureRequest(e) => self.on_configure_request(e),
            // Reserved for future placement and stacking policy.
            Event::CreateNotify(_)
            | Event::DestroyNotify(_)
            | Event::ReparentNotify(_)
            | Event::MapNotify(_)
            | Event::ConfigureNotify(_) => Ok(()),
            Event::Error(e) => {
                // Steady-state protocol errors never take the manager down.
                error!(
                    "X11 error: {:?} from request {} (sequence {}, bad value {})",
                    e.error_kind,
                    e.request_name.unwrap_or("unknown"),
                    e.sequence,
                    e.bad_value
                );
                Ok(())
            }
            other => {
                debug!("Ignored event: {:?}", other);
                Ok(())
            }
        }
    }

    fn on_map_request(&mut self, event: MapRequestEvent) -> Result<(), WmError> {
        // A second map request for an already framed client must not frame
        // it again; the grant below is still issued.
        if !self.registry.contains(event.window) {
            self.frame_window(event.window, false)?;
        }
        self.ctx.conn.map_window(event.window)?;
        Ok(())
    }

    fn on_unmap_notify(&mut self, event: UnmapNotifyEvent) -> Result<(), WmError> {
        let registered = self.registry.contains(event.window);
        match unmap_action(registered, event.event == self.ctx.root_window) {
            UnmapAction::Ignore => {
                debug!("Ignoring UnmapNotify for unmanaged window {}", event.window);
                Ok(())
            }
            UnmapAction::IgnoreReparentEcho => {
                debug!(
                    "Ignoring UnmapNotify for reparented pre-existing window {}",
                    event.window
                );
                Ok(())
            }
            UnmapAction::Unframe => self.unframe_window(event.window),
        }
    }

    /// Grant every configure request verbatim, mirroring it onto the frame
    /// first when the window is managed so the frame tracks its client.
    fn on_configure_request(&mut self, event: ConfigureRequestEvent) -> Result<(), WmError> {
        let changes = ConfigureWindowAux::from_configure_request(&event);

        if let Some(frame) = self.registry.get(event.window) {
            self.ctx.conn.configure_window(frame, &changes)?;
            info!(
                "Resized frame {} to {}x{}",
                frame, event.width, event.height
            );
        }

        self.ctx.conn.configure_window(event.window, &changes)?;
        info!(
            "Resized window {} to {}x{}",
            event.window, event.width, event.height
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startup_adoption_filter() {
        assert!(should_adopt(true, false, MapState::VIEWABLE));
        assert!(!should_adopt(true, true, MapState::VIEWABLE));
        assert!(!should_adopt(true, false, MapState::UNMAPPED));
        assert!(!should_adopt(true, false, MapState::UNVIEWABLE));
    }

    #[test]
    fn map_requests_are_always_framed() {
        // A map request is opt-in regardless of current attributes.
        assert!(should_adopt(false, true, MapState::UNMAPPED));
        assert!(should_adopt(false, false, MapState::VIEWABLE));
    }

    #[test]
    fn unmap_of_unregistered_window_is_ignored() {
        assert_eq!(unmap_action(false, false), UnmapAction::Ignore);
        assert_eq!(unmap_action(false, true), UnmapAction::Ignore);
    }

    #[test]
    fn unmap_reported_from_root_is_ignored_even_if_registered() {
        assert_eq!(unmap_action(true, true), UnmapAction::IgnoreReparentEcho);
    }

    #[test]
    fn unmap_of_registered_window_unframes() {
        assert_eq!(unmap_action(true, false), UnmapAction::Unframe);
    }
}
