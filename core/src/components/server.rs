use log::debug;

use crate::components::request::Request;

/// Single-slot worker. Holds at most one request and counts down its service time.
///
/// `remaining == 0` whenever the server is not busy. A finished request stays
/// parked in the slot until [`Server::retrieve`] moves it out.
#[derive(Debug, Default)]
pub struct Server {
    busy: bool,
    remaining: u32,
    current: Option<Request>,
}

impl Server {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn current(&self) -> Option<&Request> {
        self.current.as_ref()
    }

    /// Takes ownership of `req` and starts serving it at `tick`.
    ///
    /// A busy server hands the request straight back, as does one whose finished
    /// request has not been retrieved yet. The scheduler only assigns to idle
    /// servers so it never sees the `Err`.
    pub fn assign(&mut self, mut req: Request, tick: u64) -> Result<(), Request> {
        if self.busy || self.current.is_some() {
            return Err(req);
        }
        req.assigned_tick = Some(tick);
        self.remaining = req.service_time;
        self.busy = req.service_time > 0;
        if !self.busy {
            req.completed = true;
        }
        debug!(
            "assigned {} -> {} at tick {} for {} cycles",
            req.source, req.destination, tick, req.service_time
        );
        self.current = Some(req);
        Ok(())
    }

    pub fn tick(&mut self) {
        if self.busy && self.remaining > 0 {
            self.remaining -= 1;
            if self.remaining == 0 {
                self.busy = false;
                if let Some(req) = self.current.as_mut() {
                    req.completed = true;
                }
            }
        }
    }

    pub fn is_done(&self) -> bool {
        !self.busy && self.current.as_ref().is_some_and(|r| r.completed)
    }

    /// Moves the finished request out and resets to idle. `None` unless done.
    pub fn retrieve(&mut self) -> Option<Request> {
        if !self.is_done() {
            return None;
        }
        self.remaining = 0;
        self.current.take()
    }

    /// Drops whatever the server holds, finished or not. Used at teardown.
    pub(crate) fn evict(&mut self) -> Option<Request> {
        self.busy = false;
        self.remaining = 0;
        self.current.take()
    }
}
