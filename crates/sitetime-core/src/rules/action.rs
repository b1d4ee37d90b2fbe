//! Rule actions.
//!
//! An action is what happens once an origin's budget is spent. Built-in
//! actions come from configuration; embedders can supply any closure.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ActionError, ConfigError};
use crate::origin::Origin;
use crate::storage::ActionConfig;

/// Side effect run when a rule fires.
pub trait RuleAction {
    fn run(&self, origin: &Origin) -> Result<(), ActionError>;

    /// Short human-readable description.
    fn describe(&self) -> String {
        "custom action".to_string()
    }
}

impl<F> RuleAction for F
where
    F: Fn(&Origin) -> Result<(), ActionError>,
{
    fn run(&self, origin: &Origin) -> Result<(), ActionError> {
        self(origin)
    }
}

/// Marks the timer expired and does nothing else.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeoutAction;

impl RuleAction for TimeoutAction {
    fn run(&self, _origin: &Origin) -> Result<(), ActionError> {
        Ok(())
    }

    fn describe(&self) -> String {
        "timeout".to_string()
    }
}

/// Sends the user somewhere else by opening `url`.
#[derive(Debug, Clone)]
pub struct RedirectAction {
    url: Url,
}

impl RedirectAction {
    pub fn new(url: &str) -> Result<Self, ConfigError> {
        let url = Url::parse(url).map_err(|e| ConfigError::InvalidValue {
            key: "action.url".to_string(),
            message: format!("'{url}': {e}"),
        })?;
        Ok(Self { url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl RuleAction for RedirectAction {
    fn run(&self, _origin: &Origin) -> Result<(), ActionError> {
        open::that(self.url.as_str()).map_err(|source| ActionError::Open {
            url: self.url.to_string(),
            source,
        })
    }

    fn describe(&self) -> String {
        format!("redirect to {}", self.url)
    }
}

/// Spawns a program without waiting for it. The origin is passed in the
/// `SITETIME_ORIGIN` environment variable.
#[derive(Debug, Clone)]
pub struct CommandAction {
    program: String,
    args: Vec<String>,
}

impl CommandAction {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Result<Self, ConfigError> {
        let program = program.into();
        if program.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "action.program".to_string(),
                message: "program is empty".to_string(),
            });
        }
        Ok(Self { program, args })
    }
}

impl RuleAction for CommandAction {
    fn run(&self, origin: &Origin) -> Result<(), ActionError> {
        std::process::Command::new(&self.program)
            .args(&self.args)
            .env("SITETIME_ORIGIN", origin.as_str())
            .spawn()
            .map(|_child| ())
            .map_err(|source| ActionError::Spawn {
                program: self.program.clone(),
                source,
            })
    }

    fn describe(&self) -> String {
        if self.args.is_empty() {
            format!("run {}", self.program)
        } else {
            format!("run {} {}", self.program, self.args.join(" "))
        }
    }
}

/// Build the action a configuration entry names.
pub fn from_config(config: &ActionConfig) -> Result<Box<dyn RuleAction>, ConfigError> {
    Ok(match config {
        ActionConfig::Timeout => Box::new(TimeoutAction),
        ActionConfig::Redirect { url } => Box::new(RedirectAction::new(url)?),
        ActionConfig::Command { program, args } => {
            Box::new(CommandAction::new(program.clone(), args.clone())?)
        }
    })
}

/// Outcome of running an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ActionStatus {
    Success,
    Failed { reason: String },
}

impl ActionStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, ActionStatus::Success)
    }
}
