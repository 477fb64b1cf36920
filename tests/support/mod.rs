//! Scripted doubles for driving the release pipeline without git or a network.

#![allow(dead_code)]

use release_pilot::changelog::default_query;
use release_pilot::error::Result;
use release_pilot::{
    BumpRequest, CommandOutput, CommandRunner, EventSink, Invocation, Prompter, ReleaseApi,
    ReleaseEvent, ReleasePhase, ReleaseRequest, VersionBumpTool,
};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

pub const REMOTE_URL: &str = "git@github.com:acme/widgets.git";

/// Answers commands from a script keyed by command line and records every call
#[derive(Default)]
pub struct ScriptedRunner {
    script: HashMap<String, CommandOutput>,
    calls: RefCell<Vec<Invocation>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository on `master`, clean, whose latest tag is `tag`
    pub fn healthy_repo(tag: &str) -> Self {
        Self::new()
            .on("git rev-parse --abbrev-ref HEAD", CommandOutput::ok("master\n"))
            .on("git status --untracked-files=no --porcelain", CommandOutput::ok(""))
            .on("git pull origin master", CommandOutput::ok(""))
            .on("git fetch --tags", CommandOutput::ok(""))
            .on("git describe --abbrev=0 --tags", CommandOutput::ok(format!("{tag}\n")))
            .on(
                &default_query(Some(tag)).command_line(),
                CommandOutput::ok("* Add widgets (1a2b3c4)\n* Fix gears (5d6e7f8)\n"),
            )
            .on("git push origin master --no-verify", CommandOutput::ok(""))
            .on("git push origin master --tags --no-verify", CommandOutput::ok(""))
            .on("git remote get-url origin", CommandOutput::ok(format!("{REMOTE_URL}\n")))
    }

    /// Script (or re-script) the output for `line`
    pub fn on(mut self, line: &str, output: CommandOutput) -> Self {
        self.script.insert(line.to_string(), output);
        self
    }

    /// Command lines run so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .map(Invocation::command_line)
            .collect()
    }

    /// Invocations run so far, in order
    pub fn invocations(&self) -> Vec<Invocation> {
        self.calls.borrow().clone()
    }

    pub fn ran(&self, line: &str) -> bool {
        self.calls().iter().any(|call| call == line)
    }

    pub fn ran_any(&self, prefix: &str) -> bool {
        self.calls().iter().any(|call| call.starts_with(prefix))
    }
}

impl CommandRunner for ScriptedRunner {
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput> {
        self.calls.borrow_mut().push(invocation.clone());
        let line = invocation.command_line();
        Ok(self
            .script
            .get(&line)
            .cloned()
            .unwrap_or_else(|| CommandOutput::failed(127, format!("unscripted command: {line}"))))
    }
}

/// Replies with queued answers; fails like closed stdin once they run out
#[derive(Default)]
pub struct ScriptedPrompter {
    answers: RefCell<VecDeque<String>>,
    asked: RefCell<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn answering(answers: &[&str]) -> Self {
        Self {
            answers: RefCell::new(answers.iter().map(|a| a.to_string()).collect()),
            asked: RefCell::new(Vec::new()),
        }
    }

    pub fn asked(&self) -> Vec<String> {
        self.asked.borrow().clone()
    }
}

impl Prompter for ScriptedPrompter {
    async fn ask(&self, text: &str, _default: &str) -> Result<String> {
        self.asked.borrow_mut().push(text.to_string());
        self.answers.borrow_mut().pop_front().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "no scripted answer").into()
        })
    }
}

/// Records bump requests
#[derive(Default)]
pub struct RecordingBumper {
    pub requests: RefCell<Vec<BumpRequest>>,
}

impl VersionBumpTool for RecordingBumper {
    async fn bump(&self, request: &BumpRequest) -> Result<()> {
        self.requests.borrow_mut().push(request.clone());
        Ok(())
    }
}

/// Records release requests; optionally fails them
#[derive(Default)]
pub struct RecordingApi {
    pub requests: RefCell<Vec<ReleaseRequest>>,
    pub fail: bool,
}

impl ReleaseApi for RecordingApi {
    async fn create_release(&self, request: &ReleaseRequest) -> Result<()> {
        self.requests.borrow_mut().push(request.clone());
        if self.fail {
            return Err(std::io::Error::other("503 Service Unavailable").into());
        }
        Ok(())
    }
}

/// Records every event
#[derive(Default)]
pub struct RecordingEvents {
    pub events: RefCell<Vec<ReleaseEvent>>,
}

impl RecordingEvents {
    pub fn phases(&self) -> Vec<ReleasePhase> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                ReleaseEvent::Phase(phase) => Some(*phase),
                _ => None,
            })
            .collect()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                ReleaseEvent::Warning(message) => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn dry_runs(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                ReleaseEvent::DryRun { command } => Some(command.clone()),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for RecordingEvents {
    fn emit(&self, event: &ReleaseEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}
