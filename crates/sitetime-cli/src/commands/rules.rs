use clap::Subcommand;
use sitetime_core::{Config, RuleBook};

#[derive(Subcommand)]
pub enum RulesAction {
    /// List configured rules as JSON
    List,
}

pub fn run(action: RulesAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        RulesAction::List => {
            let rules = RuleBook::from_config(&Config::load()?)?;
            println!("{}", serde_json::to_string_pretty(&rules.summaries())?);
        }
    }
    Ok(())
}
