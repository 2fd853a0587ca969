//! Binary entrypoint: read ledger records as JSON lines from stdin, write the
//! asset status report to stdout.
//!
//! Each input line is a RentalEvent. Malformed lines produce an ErrorOutput
//! line on stdout and are skipped. The status date is `FLEET_AS_OF`
//! (YYYY-MM-DD or an RFC3339 timestamp) when set, otherwise today's UTC date.

use fleet_engine::date;
use fleet_engine::types::ErrorOutput;
use fleet_engine::{FleetEngine, RentalEvent};
use std::io::{self, BufRead, Write};

fn main() {
  let stdin = io::stdin();
  let stdout = io::stdout();
  let mut out = io::BufWriter::new(stdout.lock());
  let engine = FleetEngine::with_defaults();

  let as_of = match std::env::var("FLEET_AS_OF") {
    Ok(raw) => match date::parse_as_of(&raw) {
      Some(d) => Some(d),
      None => {
        let _ = writeln!(io::stderr(), "fleet-engine: invalid FLEET_AS_OF {:?}: expected YYYY-MM-DD or RFC3339", raw);
        std::process::exit(2);
      }
    },
    Err(_) => None,
  };
  let status_date = date::today(as_of);

  let mut records = Vec::new();
  for (idx, line) in stdin.lock().lines().enumerate() {
    let line = match line {
      Ok(l) => l,
      Err(e) => {
        let _ = writeln!(io::stderr(), "fleet-engine: read error: {}", e);
        std::process::exit(1);
      }
    };

    let trimmed = line.trim();
    if trimmed.is_empty() {
      continue;
    }

    match serde_json::from_str::<RentalEvent>(trimmed) {
      Ok(event) => records.push(event),
      Err(e) => {
        let err = ErrorOutput::new(format!("line {}: json parse: {}", idx + 1, e));
        let _ = serde_json::to_writer(&mut out, &err);
        let _ = writeln!(out);
      }
    }
  }

  engine.restore(records);
  let report = engine.status_report(status_date);
  let _ = serde_json::to_writer(&mut out, &report);
  let _ = writeln!(out);
  let _ = out.flush();
}
