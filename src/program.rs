//! Movement mini-language used by the path editor.
//!
//! One command per line: `<type> <value> [<speed>]`, type is `reto` or `giro`
//! (any case). Blank lines and `#` comments are ignored. Malformed lines are
//! skipped and reported, never rejected.
//!
//! ```text
//! # leave base
//! reto 40 60
//! giro 90
//! reto -15 30
//! ```

use serde::Serialize;
use tracing::debug;

use crate::domain::{Movement, DEFAULT_SPEED};

/// A line that did not parse as a command (1-based line number).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SkippedLine {
  pub line: usize,
  pub text: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ParsedProgram {
  pub movements: Vec<Movement>,
  pub skipped: Vec<SkippedLine>,
}

fn parse_number(tok: &str) -> Option<f64> {
  tok.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Parse a single command line. `None` for anything malformed.
pub fn parse_line(line: &str) -> Option<Movement> {
  let mut tokens = line.split_whitespace();
  let kind = tokens.next()?.to_lowercase();
  let value = parse_number(tokens.next()?)?;
  let speed = match tokens.next() {
    Some(tok) => parse_number(tok).filter(|s| *s > 0.0)?,
    None => DEFAULT_SPEED,
  };
  if tokens.next().is_some() {
    return None;
  }
  match kind.as_str() {
    "reto" => Some(Movement::Reto { distance: value, speed }),
    "giro" => Some(Movement::Giro { degrees: value, speed }),
    _ => None,
  }
}

pub fn parse_program(source: &str) -> ParsedProgram {
  let mut out = ParsedProgram::default();
  for (i, raw) in source.lines().enumerate() {
    let line = raw.trim();
    if line.is_empty() || line.starts_with('#') {
      continue;
    }
    match parse_line(line) {
      Some(m) => out.movements.push(m),
      None => out.skipped.push(SkippedLine { line: i + 1, text: line.to_string() }),
    }
  }
  if !out.skipped.is_empty() {
    debug!(target: "path", skipped = out.skipped.len(), parsed = out.movements.len(), "Skipped malformed program lines");
  }
  out
}

/// Render movements back to source text, one command per line.
pub fn format_program(movements: &[Movement]) -> String {
  movements
    .iter()
    .map(|m| match m {
      Movement::Reto { distance, speed } => format!("reto {} {}\n", distance, speed),
      Movement::Giro { degrees, speed } => format!("giro {} {}\n", degrees, speed),
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_commands_with_and_without_speed() {
    let p = parse_program("reto 50 30\nGIRO -90\n");
    assert_eq!(
      p.movements,
      vec![Movement::Reto { distance: 50.0, speed: 30.0 }, Movement::Giro { degrees: -90.0, speed: 50.0 }]
    );
    assert!(p.skipped.is_empty());
  }

  #[test]
  fn ignores_blank_lines_and_comments() {
    let p = parse_program("\n   # start\n\n  reto 10  \n#giro 90\n");
    assert_eq!(p.movements, vec![Movement::Reto { distance: 10.0, speed: 50.0 }]);
    assert!(p.skipped.is_empty());
  }

  #[test]
  fn skips_malformed_lines_with_line_numbers() {
    let src = "reto 10\nandar 5\nreto abc\ngiro 90 fast\nreto 1 2 3\ngiro 45 0\ngiro 30";
    let p = parse_program(src);
    assert_eq!(p.movements.len(), 2);
    let lines: Vec<usize> = p.skipped.iter().map(|s| s.line).collect();
    assert_eq!(lines, vec![2, 3, 4, 5, 6]);
    assert_eq!(p.skipped[0].text, "andar 5");
  }

  #[test]
  fn rejects_non_finite_numbers() {
    assert_eq!(parse_line("reto inf"), None);
    assert_eq!(parse_line("giro NaN 10"), None);
    assert_eq!(parse_line("reto"), None);
  }

  #[test]
  fn formatted_program_parses_back() {
    let ms = vec![
      Movement::Reto { distance: 12.5, speed: 40.0 },
      Movement::Giro { degrees: -45.0, speed: 90.0 },
    ];
    let src = format_program(&ms);
    assert_eq!(src, "reto 12.5 40\ngiro -45 90\n");
    assert_eq!(parse_program(&src).movements, ms);
  }
}
