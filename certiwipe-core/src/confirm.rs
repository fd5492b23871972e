//! Confirmation helpers for the destructive wipe.

use crate::audit_log::DeviceInfo;
use anyhow::{Context, Result};
use dialoguer::Input;
use std::collections::VecDeque;
use std::io::{self, BufRead, IsTerminal, Write};
use std::sync::Mutex;

pub const CONFIRM_PHRASE: &str = "ERASE EVERYTHING";
pub const PHRASE_PROMPT: &str = "Type 'ERASE EVERYTHING' to confirm";
pub const FINAL_PROMPT: &str = "Are you absolutely sure? This cannot be undone! (yes/NO)";

/// Source of free-text answers.
pub trait Prompter {
    fn ask(&self, prompt: &str) -> Result<String>;
}

/// Reads answers from the controlling terminal.
///
/// `dialoguer` needs stderr to be a terminal; when it is not (stderr redirected to a file),
/// the prompt goes to stdout and the answer is read as a plain line from stdin.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn ask(&self, prompt: &str) -> Result<String> {
        if io::stderr().is_terminal() {
            return Input::<String>::new()
                .with_prompt(prompt)
                .allow_empty(true)
                .interact_text()
                .context("Failed to read confirmation input");
        }
        read_answer(prompt, &mut io::stdin().lock(), &mut io::stdout())
    }
}

/// Line-based prompt. The answer is returned without its line ending and otherwise
/// untouched; end of input reads as an empty answer.
fn read_answer<R: BufRead, W: Write>(
    prompt: &str,
    input: &mut R,
    output: &mut W,
) -> Result<String> {
    write!(output, "{}: ", prompt).context("Failed to write prompt")?;
    output.flush().context("Failed to write prompt")?;

    let mut line = String::new();
    input
        .read_line(&mut line)
        .context("Failed to read confirmation input")?;
    let answer = line.strip_suffix('\n').unwrap_or(&line);
    let answer = answer.strip_suffix('\r').unwrap_or(answer);
    Ok(answer.to_string())
}

/// Replays canned answers; an exhausted script answers with an empty line.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<String>>,
    asked: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: Mutex::new(answers.into_iter().map(Into::into).collect()),
            asked: Mutex::new(Vec::new()),
        }
    }

    /// Prompts shown so far.
    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().map(|a| a.clone()).unwrap_or_default()
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&self, prompt: &str) -> Result<String> {
        if let Ok(mut asked) = self.asked.lock() {
            asked.push(prompt.to_string());
        }
        let answer = self
            .answers
            .lock()
            .map_err(|_| anyhow::anyhow!("prompt script mutex poisoned"))?
            .pop_front()
            .unwrap_or_default();
        Ok(answer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    /// First prompt: the phrase was not typed exactly.
    PhraseMismatch,
    /// Second prompt: anything other than `yes`.
    FinalDeclined,
}

pub fn phrase_matches(answer: &str) -> bool {
    answer == CONFIRM_PHRASE
}

pub fn final_answer_accepts(answer: &str) -> bool {
    answer.eq_ignore_ascii_case("yes")
}

fn print_warning(device: &DeviceInfo) {
    let rule = "=".repeat(60);
    println!();
    println!("{rule}");
    println!("WARNING: THIS WILL ERASE ALL DATA ON THE DEVICE");
    println!("{rule}");
    println!(
        "Device: {} {}",
        device.manufacturer_or_unknown(),
        device.model_or_unknown()
    );
    println!("Android Version: {}", device.android_version_or_unknown());
    println!("Serial: {}", device.serial_or_unknown());
    println!("{rule}");
    println!("This operation will PERMANENTLY ERASE ALL DATA!");
    println!("ALL DATA WILL BE PERMANENTLY DELETED AND UNRECOVERABLE!");
    println!("{rule}");
    println!("MAKE SURE OEM UNLOCKING IS ENABLED IN DEVELOPER OPTIONS!");
    println!("{rule}");
}

/// Show the warning screen and run both prompts. The second prompt is skipped after a
/// phrase mismatch.
pub fn confirm_wipe(prompter: &dyn Prompter, device: &DeviceInfo) -> Result<Confirmation> {
    print_warning(device);

    let answer = prompter.ask(PHRASE_PROMPT)?;
    if !phrase_matches(&answer) {
        return Ok(Confirmation::PhraseMismatch);
    }

    let answer = prompter.ask(FINAL_PROMPT)?;
    if !final_answer_accepts(&answer) {
        return Ok(Confirmation::FinalDeclined);
    }
    Ok(Confirmation::Confirmed)
}
