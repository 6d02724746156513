use colored::Colorize;
use console::Term;
use std::io;
use tracing::debug;

use crate::application::services::decision::{
    CleanupChoice, CleanupRequest, ConfirmKind, ConfirmRequest, Confirmation, Decider, GitTagChoice,
    GitTagRequest, SvnTagChoice, SvnTagRequest,
};

/// Asks the operator through numbered menus on the terminal.
///
/// Input errors (closed stdin and the like) are treated as the most
/// conservative answer: abort, quit or no selection.
pub struct TerminalDecider {
    term: Term,
}

impl TerminalDecider {
    pub fn new() -> Self {
        Self { term: Term::stdout() }
    }

    fn ask(&self, prompt: &str) -> io::Result<String> {
        self.term
            .write_str(&format!("{} {} ", "?".yellow().bold(), prompt))?;
        self.term.flush()?;
        Ok(self.term.read_line()?.trim().to_string())
    }

    /// Loops until one of `options` is picked. Returns its index.
    fn choose(&self, title: &str, options: &[String]) -> Option<usize> {
        let mut listing = format!("{}\n", title);
        for (n, option) in options.iter().enumerate() {
            listing.push_str(&format!("  {}) {}\n", n + 1, option));
        }
        if self.term.write_str(&listing).is_err() {
            return None;
        }
        loop {
            let answer = match self.ask(&format!("choice [1-{}]:", options.len())) {
                Ok(answer) => answer,
                Err(e) => {
                    debug!(error = %e, "prompt failed");
                    return None;
                }
            };
            match answer.parse::<usize>() {
                Ok(n) if (1..=options.len()).contains(&n) => return Some(n - 1),
                _ => {
                    let _ = self.term.write_line(&format!("'{}' is not a valid choice", answer));
                }
            }
        }
    }

    /// Reads a non-empty line. Empty input or an error yields `None`.
    fn read_value(&self, prompt: &str) -> Option<String> {
        match self.ask(prompt) {
            Ok(value) if !value.is_empty() => Some(value),
            _ => None,
        }
    }
}

impl Default for TerminalDecider {
    fn default() -> Self {
        Self::new()
    }
}

fn cleanup_label(choice: CleanupChoice) -> &'static str {
    match choice {
        CleanupChoice::CommitAll => "commit all changes",
        CleanupChoice::ResetAndClean => "discard all changes (reset --hard, clean -fd)",
        CleanupChoice::HandledManually => "I have cleaned up by hand, check again",
        CleanupChoice::Abort => "abort",
    }
}

fn continue_label(kind: ConfirmKind) -> &'static str {
    match kind {
        ConfirmKind::ConflictResolved => "conflicts are resolved, continue",
        ConfirmKind::PinnedModified => "ignore the modifications and continue",
        ConfirmKind::PushRejected => "integrated by hand, push again",
        ConfirmKind::FreezeModified => "freeze anyway",
        ConfirmKind::ReviewBaseline => "create the tag",
    }
}

impl Decider for TerminalDecider {
    fn cleanup(&self, request: &CleanupRequest) -> CleanupChoice {
        let choices = request.choices();
        let labels: Vec<String> = choices.iter().map(|c| cleanup_label(*c).to_string()).collect();
        let title = format!(
            "{} has uncommitted changes:\n{}",
            request.location.display(),
            request.summary
        );
        self.choose(&title, &labels)
            .map(|n| choices[n])
            .unwrap_or(CleanupChoice::Abort)
    }

    fn confirm(&self, request: &ConfirmRequest) -> Confirmation {
        let labels = vec![continue_label(request.kind).to_string(), "quit".to_string()];
        match self.choose(&request.message, &labels) {
            Some(0) => Confirmation::Continue,
            _ => Confirmation::Quit,
        }
    }

    fn select_local_branch(&self, remote: &str, candidates: &[String]) -> Option<String> {
        let title = format!("several local branches track {}:", remote);
        self.choose(&title, candidates).map(|n| candidates[n].clone())
    }

    fn git_tag(&self, request: &GitTagRequest) -> GitTagChoice {
        let mut labels: Vec<String> = request
            .candidates
            .iter()
            .map(|tag| format!("use existing tag '{}'", tag))
            .collect();
        labels.push(format!("create tag '{}'", request.baseline));
        labels.push("create a tag with another name".to_string());
        let title = format!("{}: which tag should the baseline record?", request.location.display());

        loop {
            let n = match self.choose(&title, &labels) {
                Some(n) => n,
                None => return GitTagChoice::CreateBaseline,
            };
            if n < request.candidates.len() {
                return GitTagChoice::UseExisting(request.candidates[n].clone());
            }
            if n == request.candidates.len() {
                return GitTagChoice::CreateBaseline;
            }
            if let Some(name) = self.read_value("tag name:") {
                return GitTagChoice::CreateNamed(name);
            }
        }
    }

    fn svn_tag(&self, request: &SvnTagRequest) -> SvnTagChoice {
        let labels = vec![
            format!("record {}@{}", request.branch_url, request.revision),
            format!("create tag '{}'", request.baseline),
            "create a tag with another name".to_string(),
        ];
        let title = format!("{}: how should the baseline pin it?", request.location.display());

        loop {
            match self.choose(&title, &labels) {
                Some(1) => return SvnTagChoice::CreateBaseline,
                Some(2) => {
                    if let Some(name) = self.read_value("tag name:") {
                        return SvnTagChoice::CreateNamed(name);
                    }
                }
                _ => return SvnTagChoice::UseRevision,
            }
        }
    }

    fn tags_url(&self, branch_url: &str) -> Option<String> {
        let _ = self
            .term
            .write_line(&format!("no tags_url is configured for {}", branch_url));
        self.read_value("tags directory URL (empty to cancel):")
    }
}
