//! Confirmation gating for destructive actions.
//!
//! The operator is asked through a [`Prompter`], so tests can script answers
//! instead of reading the console. Prompts block with no timeout.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, BufRead};
use std::rc::Rc;

use colored::Color;

use crate::core::errors::{CleanError, Result};
use crate::core::options::RunOptions;
use crate::logger::Reporter;

/// Source of operator answers.
pub trait Prompter {
    /// Show `question` and return one line of input, or `None` at end of input.
    fn read_answer(&mut self, reporter: &mut Reporter, question: &str) -> io::Result<Option<String>>;
}

/// Reads answers from the process stdin.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinPrompter;

impl Prompter for StdinPrompter {
    fn read_answer(&mut self, reporter: &mut Reporter, question: &str) -> io::Result<Option<String>> {
        reporter.prompt(question);
        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line)?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }
}

/// Replays a fixed list of answers and remembers every question asked.
/// Once the script runs out it behaves like end of input.
#[derive(Debug, Default, Clone)]
pub struct ScriptedPrompter {
    state: Rc<RefCell<Script>>,
}

#[derive(Debug, Default)]
struct Script {
    answers: VecDeque<String>,
    asked: Vec<String>,
}

impl ScriptedPrompter {
    #[must_use]
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let script = Script {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        };
        Self {
            state: Rc::new(RefCell::new(script)),
        }
    }

    /// Questions asked so far, in order.
    #[must_use]
    pub fn asked(&self) -> Vec<String> {
        self.state.borrow().asked.clone()
    }
}

impl Prompter for ScriptedPrompter {
    fn read_answer(&mut self, reporter: &mut Reporter, question: &str) -> io::Result<Option<String>> {
        reporter.prompt(question);
        let mut state = self.state.borrow_mut();
        state.asked.push(question.to_string());
        Ok(state.answers.pop_front())
    }
}

/// `y` / `yes`, trimmed and case-insensitive. Everything else, including an
/// empty line, is a no.
#[must_use]
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// What the gate decided about one action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Go ahead and mutate.
    Proceed,
    /// Operator said no.
    Declined,
    /// Dry-run: report only. Counted as a simulated success.
    Simulated,
}

/// Gate in front of every destructive action.
pub struct Confirmer {
    force: bool,
    simulate: bool,
    prompter: Box<dyn Prompter>,
}

impl std::fmt::Debug for Confirmer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Confirmer")
            .field("force", &self.force)
            .field("simulate", &self.simulate)
            .finish_non_exhaustive()
    }
}

impl Confirmer {
    #[must_use]
    pub fn new(options: &RunOptions, prompter: Box<dyn Prompter>) -> Self {
        Self {
            force: options.force,
            simulate: options.simulate,
            prompter,
        }
    }

    /// Whether prompts are suppressed.
    #[must_use]
    pub const fn is_forced(&self) -> bool {
        self.force
    }

    /// Decide whether the action described by `description` may run.
    ///
    /// Simulate wins over force: nothing is asked and nothing may run.
    pub fn confirm(&mut self, reporter: &mut Reporter, description: &str) -> Result<Decision> {
        if self.simulate {
            reporter.warn(format!("[simulate] would perform: {description}"));
            return Ok(Decision::Simulated);
        }
        if self.force {
            return Ok(Decision::Proceed);
        }
        reporter.blank();
        for line in description.lines() {
            reporter.colored_line(line, Color::Yellow);
        }
        if self.ask_yes_no(reporter, "\nConfirm? (y/N): ")? {
            Ok(Decision::Proceed)
        } else {
            reporter.warn("operation cancelled by user");
            Ok(Decision::Declined)
        }
    }

    /// Raw yes/no question, ignoring force and simulate.
    pub fn ask_yes_no(&mut self, reporter: &mut Reporter, question: &str) -> Result<bool> {
        let answer = self
            .prompter
            .read_answer(reporter, question)
            .map_err(|source| CleanError::Prompt { source })?;
        Ok(answer.as_deref().is_some_and(is_affirmative))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::CaptureSink;

    fn reporter() -> (Reporter, CaptureSink) {
        let sink = CaptureSink::new();
        (Reporter::with_sink(Box::new(sink.clone())), sink)
    }

    fn confirmer(options: RunOptions, prompter: &ScriptedPrompter) -> Confirmer {
        Confirmer::new(&options, Box::new(prompter.clone()))
    }

    #[test]
    fn affirmative_answers() {
        for yes in ["y", "Y", "yes", " YES \n", "Yes\r\n"] {
            assert!(is_affirmative(yes), "{yes:?} should be a yes");
        }
        for no in ["", "n", "no", "yep", "y es", "1"] {
            assert!(!is_affirmative(no), "{no:?} should be a no");
        }
    }

    #[test]
    fn simulate_skips_prompt_even_with_force() {
        let prompter = ScriptedPrompter::new(["y"]);
        let options = RunOptions {
            simulate: true,
            force: true,
            ..RunOptions::default()
        };
        let (mut rep, sink) = reporter();
        let decision = confirmer(options, &prompter)
            .confirm(&mut rep, "delete things")
            .unwrap();
        assert_eq!(decision, Decision::Simulated);
        assert!(prompter.asked().is_empty());
        assert!(sink.contents().contains("would perform: delete things"));
    }

    #[test]
    fn force_proceeds_without_prompt() {
        let prompter = ScriptedPrompter::new(Vec::<String>::new());
        let options = RunOptions {
            force: true,
            ..RunOptions::default()
        };
        let (mut rep, _sink) = reporter();
        let decision = confirmer(options, &prompter)
            .confirm(&mut rep, "delete things")
            .unwrap();
        assert_eq!(decision, Decision::Proceed);
        assert!(prompter.asked().is_empty());
    }

    #[test]
    fn yes_proceeds_and_no_declines() {
        let prompter = ScriptedPrompter::new(["yes", "n"]);
        let mut gate = confirmer(RunOptions::default(), &prompter);
        let (mut rep, sink) = reporter();
        assert_eq!(gate.confirm(&mut rep, "first").unwrap(), Decision::Proceed);
        assert_eq!(gate.confirm(&mut rep, "second").unwrap(), Decision::Declined);
        assert_eq!(prompter.asked().len(), 2);
        assert!(sink.contents().contains("operation cancelled by user"));
    }

    #[test]
    fn end_of_input_declines() {
        let prompter = ScriptedPrompter::new(Vec::<String>::new());
        let mut gate = confirmer(RunOptions::default(), &prompter);
        let (mut rep, _sink) = reporter();
        assert_eq!(gate.confirm(&mut rep, "x").unwrap(), Decision::Declined);
    }

    struct BrokenPrompter;

    impl Prompter for BrokenPrompter {
        fn read_answer(&mut self, _: &mut Reporter, _: &str) -> io::Result<Option<String>> {
            Err(io::Error::other("stdin closed"))
        }
    }

    #[test]
    fn prompt_failure_is_an_error() {
        let mut gate = Confirmer::new(&RunOptions::default(), Box::new(BrokenPrompter));
        let (mut rep, _sink) = reporter();
        let err = gate.confirm(&mut rep, "x").unwrap_err();
        assert_eq!(err.code(), "ACL-3001");
    }
}
