use crate::engine::Snapshot;

/// Something that watches the simulation from outside, once per cycle.
pub trait Observer {
    fn on_cycle(&mut self, snapshot: &Snapshot);
}

impl<F> Observer for F
where
    F: FnMut(&Snapshot),
{
    fn on_cycle(&mut self, snapshot: &Snapshot) {
        self(snapshot)
    }
}
