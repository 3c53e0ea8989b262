//! UCI engine subprocess used as the best-move oracle.
//!
//! A reader thread forwards every stdout line into a channel so that each
//! request can wait with a deadline. Before a new search the previous one is
//! stopped and fenced with `isready`/`readyok`, which drains any stale
//! `bestmove` left over from a timed-out request.

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::oracle::oracle_trait::{Evaluation, Oracle, OracleError, OracleRequest, OracleResponse};

pub struct UciProcessOracle {
    child: Child,
    stdin: ChildStdin,
    lines: Receiver<String>,
    searching: bool,
    name: String,
}

impl UciProcessOracle {
    /// Launch `command` and complete the `uci`/`isready` handshake.
    pub fn spawn(
        command: &str,
        args: &[String],
        handshake_timeout: Duration,
    ) -> Result<Self, OracleError> {
        let mut child = Command::new(command)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|err| OracleError::Unavailable(format!("cannot start '{}': {}", command, err)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| OracleError::Unavailable("stdin was not captured".to_owned()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| OracleError::Unavailable("stdout was not captured".to_owned()))?;

        let (tx, rx) = mpsc::channel::<String>();
        thread::spawn(move || {
            let reader = BufReader::new(stdout);
            for line in reader.lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });

        let mut oracle = Self {
            child,
            stdin,
            lines: rx,
            searching: false,
            name: command.to_owned(),
        };

        let deadline = Instant::now() + handshake_timeout;
        oracle.send("uci")?;
        let mut engine_name = None;
        oracle.wait_for(deadline, handshake_timeout, |line| {
            if let Some(rest) = line.strip_prefix("id name ") {
                engine_name = Some(rest.trim().to_owned());
            }
            line.trim() == "uciok"
        })?;
        if let Some(engine_name) = engine_name {
            oracle.name = engine_name;
        }
        oracle.send("isready")?;
        oracle.wait_for(deadline, handshake_timeout, |line| line.trim() == "readyok")?;

        debug!(oracle = %oracle.name, "oracle handshake complete");
        Ok(oracle)
    }

    fn send(&mut self, command: &str) -> Result<(), OracleError> {
        writeln!(self.stdin, "{}", command)?;
        self.stdin.flush()?;
        Ok(())
    }

    /// Consume lines until `done` accepts one or the deadline passes.
    fn wait_for<F>(&mut self, deadline: Instant, timeout: Duration, mut done: F) -> Result<String, OracleError>
    where
        F: FnMut(&str) -> bool,
    {
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(OracleError::Timeout(timeout));
            }
            match self.lines.recv_timeout(remaining) {
                Ok(line) => {
                    if done(&line) {
                        return Ok(line);
                    }
                }
                Err(RecvTimeoutError::Timeout) => return Err(OracleError::Timeout(timeout)),
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(OracleError::Unavailable("oracle process closed its output".to_owned()))
                }
            }
        }
    }

    /// Stop a search left running by an earlier timeout and drain its output.
    fn fence(&mut self, deadline: Instant, timeout: Duration) -> Result<(), OracleError> {
        if self.searching {
            self.send("stop")?;
        }
        self.send("isready")?;
        self.wait_for(deadline, timeout, |line| line.trim() == "readyok")?;
        self.searching = false;
        Ok(())
    }
}

impl Oracle for UciProcessOracle {
    fn name(&self) -> &str {
        &self.name
    }

    fn best_move(
        &mut self,
        request: &OracleRequest,
        timeout: Duration,
    ) -> Result<OracleResponse, OracleError> {
        let deadline = Instant::now() + timeout;
        self.fence(deadline, timeout)?;

        self.send(&format!("position fen {}", request.position))?;
        self.send(&format!("go depth {}", request.search_depth.max(1)))?;
        self.searching = true;

        let mut evaluation = None;
        let outcome = self.wait_for(deadline, timeout, |line| {
            if line.starts_with("info") {
                if let Some(score) = parse_info_score(line) {
                    evaluation = Some(score);
                }
                return false;
            }
            line.starts_with("bestmove")
        });

        match outcome {
            Ok(line) => {
                self.searching = false;
                let best_move = parse_bestmove(&line)?;
                Ok(OracleResponse {
                    best_move,
                    evaluation,
                })
            }
            Err(OracleError::Timeout(limit)) => {
                // Leave `searching` set so the next request stops it first.
                if let Err(err) = self.send("stop") {
                    warn!(error = %err, "failed to stop timed-out oracle search");
                }
                Err(OracleError::Timeout(limit))
            }
            Err(err) => Err(err),
        }
    }
}

impl Drop for UciProcessOracle {
    fn drop(&mut self) {
        let _ = self.send("quit");
        thread::sleep(Duration::from_millis(20));
        match self.child.try_wait() {
            Ok(Some(_)) => {}
            _ => {
                let _ = self.child.kill();
                let _ = self.child.wait();
            }
        }
    }
}

/// Extract the move code from a `bestmove <code> [ponder <code>]` line.
pub fn parse_bestmove(line: &str) -> Result<String, OracleError> {
    let mut words = line.split_whitespace();
    if words.next() != Some("bestmove") {
        return Err(OracleError::Malformed(format!("expected bestmove, got '{}'", line)));
    }
    match words.next() {
        Some("(none)") | Some("0000") => Err(OracleError::Malformed(
            "oracle reported no legal move".to_owned(),
        )),
        Some(code) if (4..=5).contains(&code.len()) => Ok(code.to_owned()),
        Some(code) => Err(OracleError::Malformed(format!("bad move code '{}'", code))),
        None => Err(OracleError::Malformed("bestmove without a move".to_owned())),
    }
}

/// Read `score cp N` or `score mate N` out of an `info` line.
pub fn parse_info_score(line: &str) -> Option<Evaluation> {
    let mut words = line.split_whitespace();
    while let Some(word) = words.next() {
        if word != "score" {
            continue;
        }
        let kind = words.next()?;
        let value = words.next()?.parse::<i32>().ok()?;
        return match kind {
            "cp" => Some(Evaluation::Centipawns(value)),
            "mate" => Some(Evaluation::Mate(value)),
            _ => None,
        };
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::chess_types::Side;

    #[test]
    fn parses_bestmove_lines() {
        assert_eq!(parse_bestmove("bestmove e7e5").expect("plain move"), "e7e5");
        assert_eq!(
            parse_bestmove("bestmove a2a1q ponder b7b6").expect("promotion with ponder"),
            "a2a1q"
        );
        assert!(matches!(
            parse_bestmove("bestmove (none)"),
            Err(OracleError::Malformed(_))
        ));
        assert!(matches!(
            parse_bestmove("info depth 3"),
            Err(OracleError::Malformed(_))
        ));
        assert!(matches!(parse_bestmove("bestmove"), Err(OracleError::Malformed(_))));
    }

    #[test]
    fn parses_info_scores() {
        assert_eq!(
            parse_info_score("info depth 12 seldepth 18 score cp -35 nodes 1000 pv e7e5"),
            Some(Evaluation::Centipawns(-35))
        );
        assert_eq!(
            parse_info_score("info depth 5 score mate 2 pv d8h4"),
            Some(Evaluation::Mate(2))
        );
        assert_eq!(parse_info_score("info string hello"), None);
        assert_eq!(parse_info_score("info score lowerbound"), None);
    }

    #[test]
    fn missing_program_is_unavailable() {
        let result = UciProcessOracle::spawn(
            "definitely-not-a-real-oracle-binary",
            &[],
            Duration::from_millis(200),
        );
        assert!(matches!(result, Err(OracleError::Unavailable(_))));
    }

    #[cfg(unix)]
    fn scripted_engine(script: &str) -> Result<UciProcessOracle, OracleError> {
        UciProcessOracle::spawn(
            "sh",
            &["-c".to_owned(), script.to_owned()],
            Duration::from_secs(2),
        )
    }

    #[cfg(unix)]
    fn request() -> OracleRequest {
        OracleRequest {
            position: "4k3/8/8/8/8/8/8/4K3 b - - 0 1".to_owned(),
            side_to_move: Side::Enemy,
            search_depth: 4,
        }
    }

    #[cfg(unix)]
    #[test]
    fn scripted_engine_answers_a_request() {
        let script = r#"
while read line; do
  case "$line" in
    uci) echo "id name Scripted"; echo "uciok" ;;
    isready) echo "readyok" ;;
    go*) echo "info depth 1 score cp 12 pv e8d8"; echo "bestmove e8d8" ;;
    quit) exit 0 ;;
  esac
done
"#;
        let mut oracle = scripted_engine(script).expect("scripted engine should start");
        assert_eq!(oracle.name(), "Scripted");
        let response = oracle
            .best_move(&request(), Duration::from_secs(2))
            .expect("scripted engine should answer");
        assert_eq!(response.best_move, "e8d8");
        assert_eq!(response.evaluation, Some(Evaluation::Centipawns(12)));
    }

    #[cfg(unix)]
    #[test]
    fn silent_search_times_out() {
        let script = r#"
while read line; do
  case "$line" in
    uci) echo "uciok" ;;
    isready) echo "readyok" ;;
    quit) exit 0 ;;
  esac
done
"#;
        let mut oracle = scripted_engine(script).expect("scripted engine should start");
        let result = oracle.best_move(&request(), Duration::from_millis(150));
        assert!(matches!(result, Err(OracleError::Timeout(_))));
        assert!(oracle.searching);
    }
}
