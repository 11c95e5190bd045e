//! # Timed script interpreter module
//!
//! This module provides an interpreter for timed scripts. A script is a text
//! file of commands, each of the form `<time_s>: <json>;`, where the JSON
//! payload deserialises into the command type chosen by the user. Lines which
//! don't match this form (such as `#` comments) are ignored.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::fs;
use regex::RegexBuilder;
use serde::de::DeserializeOwned;
use thiserror::Error;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A command which is scripted to occur at a specific time.
struct Command<T> {
    /// The time the command is supposed to execute at
    exec_time_s: f64,

    /// The command itself
    cmd: T
}

/// A script interpreter.
///
/// After initialising with the path to the script to run use
/// `.get_pending_cmds()` to acquire a list of commands that need executing.
pub struct ScriptInterpreter<T> {
    cmds: VecDeque<Command<T>>
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Could not find the script at {0:?}")]
    ScriptNotFound(PathBuf),

    #[error("Could not load the script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error("The script is empty (or is so bad it can't be read)")]
    ScriptEmpty,

    #[error(
        "Script contains an invalid timestamp: {0}. \
        Should be a float (like 1.0)")]
    InvalidTimestamp(String),

    #[error("Script contains an invalid command at {0} s: {1}")]
    InvalidCmd(f64, serde_json::Error)
}

pub enum PendingCmds<T> {
    None,
    Some(Vec<T>),
    EndOfScript
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<T: DeserializeOwned> ScriptInterpreter<T> {

    /// Create a new interpreter from the given script path.
    pub fn new<P: AsRef<Path>>(script_path: P) -> Result<Self, ScriptError> {

        let path = PathBuf::from(script_path.as_ref());

        if !path.exists() {
            return Err(ScriptError::ScriptNotFound(path));
        }

        let script = fs::read_to_string(&path)
            .map_err(ScriptError::ScriptLoadError)?;

        Self::from_str(&script)
    }

    /// Create a new interpreter from the contents of a script.
    pub fn from_str(script: &str) -> Result<Self, ScriptError> {

        let mut cmd_queue: VecDeque<Command<T>> = VecDeque::new();

        // Go through the script executing __the magic regex__.
        let re = RegexBuilder::new(r"^\s*(\d+(\.\d+)?)\s*:\s*([^;]*);")
            .multi_line(true)
            .build()
            .expect("Script regex is invalid");

        for cap in re.captures_iter(script) {
            let exec_time_s: f64 = cap[1].parse()
                .map_err(|e| ScriptError::InvalidTimestamp(format!("{}", e)))?;

            let cmd = serde_json::from_str(&cap[3])
                .map_err(|e| ScriptError::InvalidCmd(exec_time_s, e))?;

            cmd_queue.push_back(Command {
                exec_time_s,
                cmd
            });
        }

        if cmd_queue.is_empty() {
            return Err(ScriptError::ScriptEmpty)
        }

        Ok(ScriptInterpreter {
            cmds: cmd_queue
        })
    }

    /// Return all commands due at `current_time_s`, or `None` if no commands
    /// need executing now.
    pub fn get_pending_cmds(&mut self, current_time_s: f64) -> PendingCmds<T> {

        // If the queue is empty the script is over and we return the end of
        // script variant
        if self.cmds.is_empty() {
            return PendingCmds::EndOfScript
        }

        let mut cmd_vec: Vec<T> = vec![];

        // Pop commands off the front of the queue until the head's exec time
        // is in the future
        while let Some(head) = self.cmds.front() {
            if head.exec_time_s > current_time_s {
                break;
            }
            if let Some(c) = self.cmds.pop_front() {
                cmd_vec.push(c.cmd);
            }
        }

        if cmd_vec.is_empty() {
            PendingCmds::None
        }
        else {
            PendingCmds::Some(cmd_vec)
        }
    }

    /// Get the number of commands remaining in the script
    pub fn get_num_cmds(&self) -> usize {
        self.cmds.len()
    }

    /// Get the length of the script in seconds
    pub fn get_duration(&self) -> f64 {
        match self.cmds.back() {
            Some(c) => c.exec_time_s,
            None => 0f64
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_script_ordering() {
        let script = "\
            # comment lines are skipped\n\
            0.0: 1;\n\
            0.5: 2;\n\
            0.5: 3;\n\
            2: 4;\n";

        let mut si: ScriptInterpreter<u32> = ScriptInterpreter::from_str(script).unwrap();
        assert_eq!(si.get_num_cmds(), 4);
        assert_eq!(si.get_duration(), 2.0);

        match si.get_pending_cmds(0.0) {
            PendingCmds::Some(v) => assert_eq!(v, vec![1]),
            _ => panic!("Expected the first command")
        }
        assert!(matches!(si.get_pending_cmds(0.25), PendingCmds::None));
        match si.get_pending_cmds(1.0) {
            PendingCmds::Some(v) => assert_eq!(v, vec![2, 3]),
            _ => panic!("Expected two commands")
        }
        match si.get_pending_cmds(3.0) {
            PendingCmds::Some(v) => assert_eq!(v, vec![4]),
            _ => panic!("Expected the last command")
        }
        assert!(matches!(si.get_pending_cmds(4.0), PendingCmds::EndOfScript));
    }

    #[test]
    fn test_script_errors() {
        assert!(matches!(
            ScriptInterpreter::<u32>::from_str("# nothing here\n"),
            Err(ScriptError::ScriptEmpty)
        ));
        assert!(matches!(
            ScriptInterpreter::<u32>::from_str("1.0: \"not a number\";\n"),
            Err(ScriptError::InvalidCmd(_, _))
        ));
        assert!(matches!(
            ScriptInterpreter::<u32>::new("/definitely/not/a/script.aogs"),
            Err(ScriptError::ScriptNotFound(_))
        ));
    }
}
