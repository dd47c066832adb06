//! Deterministic harness scripts.
//!
//! A script is a JSON list of steps driving editors, the follow graph, and
//! the debounce scheduler against a simulated clock. Replay is fully
//! deterministic — no wall-clock waits — and produces a line trace that the
//! harness prints and tests assert on.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::Path;
use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::editor::Editor;
use crate::scheduler::{DelayJobRunner, Job};

/// One scripted action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    /// Create a named editor.
    Create { editor: String },
    /// Register `editor` as a follower of `other`.
    Follow {
        editor: String,
        other: String,
        #[serde(default)]
        follow_back: bool,
    },
    /// Remove the follow relationship, if it exists.
    Unfollow {
        editor: String,
        other: String,
        #[serde(default)]
        unfollow_back: bool,
    },
    /// Declare `other` as `editor`'s mirror source.
    Mirror { editor: String, other: String },
    /// Forget `editor`'s mirror source.
    ClearMirror { editor: String },
    /// Replace `editor`'s document text.
    SetText { editor: String, text: String },
    /// Request a debounced job against `editor`.
    Request { editor: String, job: String },
    /// Drop the pending job.
    Cancel,
    /// Advance the simulated clock, firing the scheduler if a job comes due.
    Advance { ms: u64 },
}

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("unknown editor `{0}`")]
    UnknownEditor(String),
    #[error("editor `{0}` already exists")]
    DuplicateEditor(String),
}

/// Parse a script from its JSON text.
///
/// # Errors
/// Returns an error when the JSON does not describe a step list.
pub fn parse_script(json: &str) -> Result<Vec<Step>> {
    serde_json::from_str(json).context("Failed to parse script")
}

/// Load and parse a script file.
///
/// # Errors
/// Returns an error when the file cannot be read or parsed.
pub fn load_script(path: &Path) -> Result<Vec<Step>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script {}", path.display()))?;
    parse_script(&content)
}

/// Replays [`Step`]s against a simulated clock.
pub struct ScriptRunner {
    editors: BTreeMap<String, Editor>,
    runner: DelayJobRunner,
    now: Instant,
    trace: Rc<RefCell<Vec<String>>>,
}

impl ScriptRunner {
    pub fn new(delay: Duration) -> Self {
        Self {
            editors: BTreeMap::new(),
            runner: DelayJobRunner::new(delay),
            now: Instant::now(),
            trace: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Apply every step in order.
    ///
    /// # Errors
    /// Stops at the first step referencing an unknown or duplicate editor,
    /// or at a debounced job failure.
    pub fn run(&mut self, steps: &[Step]) -> Result<()> {
        for step in steps {
            self.apply(step)?;
        }
        Ok(())
    }

    /// The trace lines produced so far.
    pub fn trace(&self) -> Vec<String> {
        self.trace.borrow().clone()
    }

    fn push(&self, line: String) {
        self.trace.borrow_mut().push(line);
    }

    fn editor(&self, name: &str) -> Result<Editor, ScriptError> {
        self.editors
            .get(name)
            .cloned()
            .ok_or_else(|| ScriptError::UnknownEditor(name.to_string()))
    }

    fn apply(&mut self, step: &Step) -> Result<()> {
        match step {
            Step::Create { editor } => {
                if self.editors.contains_key(editor) {
                    return Err(ScriptError::DuplicateEditor(editor.clone()).into());
                }
                self.editors.insert(editor.clone(), Editor::new());
                self.push(format!("create {editor}"));
            }
            Step::Follow {
                editor,
                other,
                follow_back,
            } => {
                let a = self.editor(editor)?;
                let b = self.editor(other)?;
                a.follow(&b, *follow_back);
                self.push(format!("follow {editor} -> {other} back={follow_back}"));
            }
            Step::Unfollow {
                editor,
                other,
                unfollow_back,
            } => {
                let a = self.editor(editor)?;
                let b = self.editor(other)?;
                a.unfollow(&b, *unfollow_back);
                self.push(format!("unfollow {editor} -> {other} back={unfollow_back}"));
            }
            Step::Mirror { editor, other } => {
                let a = self.editor(editor)?;
                let b = self.editor(other)?;
                let outcomes = a.set_shared_reference(&b);
                let summary = outcomes
                    .iter()
                    .map(|(key, result)| {
                        if result.is_ok() {
                            format!("{key}: ok")
                        } else {
                            format!("{key}: incompatible")
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                self.push(format!("mirror {editor} -> {other} [{summary}]"));
            }
            Step::ClearMirror { editor } => {
                let a = self.editor(editor)?;
                a.clear_shared_reference();
                self.push(format!("clear_mirror {editor}"));
            }
            Step::SetText { editor, text } => {
                let a = self.editor(editor)?;
                a.set_text(text);
                let revision = a.document().borrow().revision();
                self.push(format!("set_text {editor} rev={revision}"));
            }
            Step::Request { editor, job } => {
                let a = self.editor(editor)?;
                let trace = Rc::clone(&self.trace);
                let label = format!("{job}({editor})");
                let line_label = label.clone();
                self.runner.request(
                    Job::new(label.clone(), move || {
                        let revision = a.document().borrow().revision();
                        trace
                            .borrow_mut()
                            .push(format!("job {line_label} ran rev={revision}"));
                        Ok(())
                    }),
                    self.now,
                );
                self.push(format!("request {label}"));
            }
            Step::Cancel => {
                self.runner.cancel();
                self.push("cancel".to_string());
            }
            Step::Advance { ms } => {
                self.now += Duration::from_millis(*ms);
                self.push(format!("advance {ms}ms"));
                self.runner
                    .run_due(self.now)
                    .context("debounced job failed")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner() -> ScriptRunner {
        ScriptRunner::new(Duration::from_millis(500))
    }

    #[test]
    fn test_parse_script_reads_tagged_steps() {
        let json = r#"[
            {"step": "create", "editor": "alpha"},
            {"step": "create", "editor": "beta"},
            {"step": "follow", "editor": "beta", "other": "alpha", "follow_back": true},
            {"step": "request", "editor": "alpha", "job": "reparse"},
            {"step": "advance", "ms": 600}
        ]"#;

        let steps = parse_script(json).unwrap();
        assert_eq!(steps.len(), 5);
        assert_eq!(
            steps[2],
            Step::Follow {
                editor: "beta".to_string(),
                other: "alpha".to_string(),
                follow_back: true,
            }
        );
    }

    #[test]
    fn test_replay_produces_deterministic_trace() {
        let mut runner = runner();
        runner
            .run(&[
                Step::Create {
                    editor: "alpha".to_string(),
                },
                Step::Create {
                    editor: "beta".to_string(),
                },
                Step::Follow {
                    editor: "beta".to_string(),
                    other: "alpha".to_string(),
                    follow_back: false,
                },
                Step::Mirror {
                    editor: "beta".to_string(),
                    other: "alpha".to_string(),
                },
                Step::SetText {
                    editor: "alpha".to_string(),
                    text: "hello".to_string(),
                },
                Step::Request {
                    editor: "alpha".to_string(),
                    job: "reparse".to_string(),
                },
                Step::Advance { ms: 600 },
            ])
            .unwrap();

        assert_eq!(
            runner.trace(),
            vec![
                "create alpha".to_string(),
                "create beta".to_string(),
                "follow beta -> alpha back=false".to_string(),
                "mirror beta -> alpha [panels: ok, features: ok]".to_string(),
                "set_text alpha rev=1".to_string(),
                "request reparse(alpha)".to_string(),
                "advance 600ms".to_string(),
                "job reparse(alpha) ran rev=1".to_string(),
            ]
        );
    }

    #[test]
    fn test_burst_of_requests_runs_only_the_last_job() {
        let mut runner = runner();
        runner
            .run(&[
                Step::Create {
                    editor: "alpha".to_string(),
                },
                Step::Request {
                    editor: "alpha".to_string(),
                    job: "first".to_string(),
                },
                Step::Advance { ms: 100 },
                Step::Request {
                    editor: "alpha".to_string(),
                    job: "second".to_string(),
                },
                Step::Advance { ms: 600 },
            ])
            .unwrap();

        let job_lines: Vec<_> = runner
            .trace()
            .into_iter()
            .filter(|line| line.starts_with("job "))
            .collect();
        assert_eq!(job_lines, vec!["job second(alpha) ran rev=0".to_string()]);
    }

    #[test]
    fn test_cancel_suppresses_the_pending_job() {
        let mut runner = runner();
        runner
            .run(&[
                Step::Create {
                    editor: "alpha".to_string(),
                },
                Step::Request {
                    editor: "alpha".to_string(),
                    job: "doomed".to_string(),
                },
                Step::Cancel,
                Step::Advance { ms: 600 },
            ])
            .unwrap();

        assert!(
            runner.trace().iter().all(|line| !line.starts_with("job ")),
            "cancelled job must never run"
        );
    }

    #[test]
    fn test_unknown_editor_is_an_error() {
        let mut runner = runner();
        let err = runner
            .run(&[Step::SetText {
                editor: "ghost".to_string(),
                text: String::new(),
            }])
            .unwrap_err();
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn test_duplicate_create_is_an_error() {
        let mut runner = runner();
        let err = runner
            .run(&[
                Step::Create {
                    editor: "alpha".to_string(),
                },
                Step::Create {
                    editor: "alpha".to_string(),
                },
            ])
            .unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }
}
