// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Argument normalization for wrapped tool invocations.
//!
//! The orchestrator injects bare separator tokens between its own flags
//! and the tool's flags. They mean nothing to the tool itself and must
//! never be forwarded.

/// Tokens the orchestrator injects as flag separators.
const SEPARATORS: &[&str] = &["-", "--"];

/// Subcommand classification for a wrapped invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subcommand {
    Init,
    Plan,
    Apply,
    Destroy,
    Show,
    /// Anything else is passed through unmodified and uncaptured.
    Other(String),
}

impl Subcommand {
    fn classify(raw: &str) -> Self {
        match raw {
            "init" => Subcommand::Init,
            "plan" => Subcommand::Plan,
            "apply" => Subcommand::Apply,
            "destroy" => Subcommand::Destroy,
            "show" => Subcommand::Show,
            other => Subcommand::Other(other.to_string()),
        }
    }

    /// The subcommand name as forwarded to the tool.
    pub fn name(&self) -> &str {
        match self {
            Subcommand::Init => "init",
            Subcommand::Plan => "plan",
            Subcommand::Apply => "apply",
            Subcommand::Destroy => "destroy",
            Subcommand::Show => "show",
            Subcommand::Other(name) => name,
        }
    }

    /// Whether this subcommand gets a durable per-module transcript.
    pub fn captures_transcript(&self) -> bool {
        matches!(
            self,
            Subcommand::Init | Subcommand::Plan | Subcommand::Apply | Subcommand::Destroy
        )
    }
}

/// Facts extracted from a plan invocation's flags, needed downstream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanOpts {
    /// A machine-readable-output flag was present (the transcript itself
    /// is JSON lines).
    pub json: bool,
    /// Value of the output-plan-file flag, last occurrence winning.
    pub out_file: Option<String>,
}

/// One normalized execution of the wrapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub subcommand: Subcommand,
    /// Cleaned arguments forwarded to the tool, subcommand excluded.
    pub args: Vec<String>,
    pub plan: PlanOpts,
}

impl Invocation {
    /// Normalize the raw argv tail (first element is the subcommand).
    ///
    /// Separator tokens are stripped wherever they appear, including
    /// before the subcommand itself.
    pub fn parse<I>(argv: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut cleaned: Vec<String> =
            argv.into_iter().filter(|tok| !SEPARATORS.contains(&tok.as_str())).collect();

        if cleaned.is_empty() {
            return Self {
                subcommand: Subcommand::Other(String::new()),
                args: Vec::new(),
                plan: PlanOpts::default(),
            };
        }

        let subcommand = Subcommand::classify(&cleaned.remove(0));
        let plan = match subcommand {
            Subcommand::Plan => extract_plan_opts(&cleaned),
            _ => PlanOpts::default(),
        };

        Self { subcommand, args: cleaned, plan }
    }

    /// Full argv forwarded to the real binary.
    pub fn forwarded_args(&self) -> Vec<String> {
        if self.subcommand.name().is_empty() {
            return Vec::new();
        }
        let mut argv = Vec::with_capacity(self.args.len() + 1);
        argv.push(self.subcommand.name().to_string());
        argv.extend(self.args.iter().cloned());
        argv
    }

    /// Transcript artifact name, for subcommands that produce one.
    pub fn transcript_name(&self) -> Option<String> {
        self.subcommand
            .captures_transcript()
            .then(|| format!("tf-{}.log", self.subcommand.name()))
    }
}

/// Scan cleaned plan arguments for the `-json` and `-out` flags.
///
/// Both `-flag=value` and `-flag value` forms are accepted, with single
/// or double dashes; the last occurrence wins when duplicated.
fn extract_plan_opts(args: &[String]) -> PlanOpts {
    let mut opts = PlanOpts::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if !arg.starts_with('-') {
            continue;
        }
        let flag = arg.strip_prefix("--").unwrap_or_else(|| arg.strip_prefix('-').unwrap_or(arg));
        if flag == "json" {
            opts.json = true;
        } else if flag == "out" {
            if let Some(value) = iter.next() {
                opts.out_file = Some(value.clone());
            }
        } else if let Some(value) = flag.strip_prefix("out=") {
            opts.out_file = Some(value.to_string());
        }
    }
    opts
}

#[cfg(test)]
#[path = "invocation_tests.rs"]
mod tests;
