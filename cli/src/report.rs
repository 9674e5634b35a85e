use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use lbsim_core::{Observer, Snapshot};
use log::error;

/// Writes the header, then every `every`-th cycle (0-based) plus the last one.
pub struct CsvLog<W: Write> {
    out: W,
    every: u64,
    total_cycles: u64,
    seen: u64,
    failed: bool,
}

impl CsvLog<BufWriter<File>> {
    pub fn create(path: &Path, every: u64, total_cycles: u64) -> io::Result<Self> {
        Self::new(BufWriter::new(File::create(path)?), every, total_cycles)
    }
}

impl<W: Write> CsvLog<W> {
    pub fn new(mut out: W, every: u64, total_cycles: u64) -> io::Result<Self> {
        writeln!(out, "{}", Snapshot::CSV_HEADER)?;
        Ok(Self {
            out,
            every: every.max(1),
            total_cycles,
            seen: 0,
            failed: false,
        })
    }

    pub fn finish(mut self) -> io::Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

impl<W: Write> Observer for CsvLog<W> {
    fn on_cycle(&mut self, snapshot: &Snapshot) {
        let i = self.seen;
        self.seen += 1;
        if self.failed || !(i % self.every == 0 || i + 1 == self.total_cycles) {
            return;
        }
        if let Err(e) = writeln!(self.out, "{}", snapshot.csv_row()) {
            error!("failed to write log entry: {}", e);
            self.failed = true;
        }
    }
}

/// Console status line, every `every` cycles. `every == 0` keeps quiet.
pub struct StatusPrinter {
    pub every: u64,
}

impl StatusPrinter {
    pub fn line(snapshot: &Snapshot) -> String {
        let mut line = format!(
            "[Cycle {:>5}] Queue: {:>4} | Active Servers: {:>2} | Total Servers: {:>2}",
            snapshot.tick, snapshot.queue_depth, snapshot.busy_servers, snapshot.total_servers
        );
        if snapshot.blocked_requests > 0 {
            line.push_str(&format!(
                " | Blocked: {:>3} ({} IPs)",
                snapshot.blocked_requests, snapshot.blocked_ips
            ));
        }
        line
    }
}

impl Observer for StatusPrinter {
    fn on_cycle(&mut self, snapshot: &Snapshot) {
        if self.every != 0 && snapshot.tick % self.every == 0 {
            println!("{}", Self::line(snapshot));
        }
    }
}
