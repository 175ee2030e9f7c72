//! Command-line definitions

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::models::TripRequest;

/// TripSage - agent-driven travel itinerary planning
#[derive(Parser, Debug)]
#[command(
    name = "tripsage",
    about = "Plan a trip with research agents and get one consolidated markdown itinerary",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to execute, `serve` when omitted
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the web interface
    Serve {
        /// Override the configured port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Plan a trip from the command line
    Plan(PlanArgs),
}

#[derive(Args, Debug, Clone)]
pub struct PlanArgs {
    /// Departure city, e.g. Mumbai
    #[arg(long = "from", value_name = "CITY")]
    pub departure_city: String,

    /// Destination city, e.g. Paris
    #[arg(long = "to", value_name = "CITY")]
    pub destination_city: String,

    /// Travel dates, e.g. "Dec 20-25, 2024"
    #[arg(long)]
    pub dates: String,

    /// Interests, e.g. "museums, food, hiking"
    #[arg(long)]
    pub interests: String,

    /// Total budget in INR, e.g. 80000
    #[arg(long)]
    pub budget: String,

    /// Directory the itinerary file is written to
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Dispatch the research tasks concurrently
    #[arg(long)]
    pub parallel: bool,
}

impl PlanArgs {
    pub fn to_trip(&self) -> crate::Result<TripRequest> {
        TripRequest::from_fields(
            &self.departure_city,
            &self.destination_city,
            &self.dates,
            &self.interests,
            &self.budget,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plan_command() {
        let cli = Cli::try_parse_from([
            "tripsage",
            "plan",
            "--from",
            "Mumbai",
            "--to",
            "Paris",
            "--dates",
            "Dec 20-25, 2024",
            "--interests",
            "museums, food",
            "--budget",
            "80000",
        ])
        .unwrap();

        let Some(Command::Plan(args)) = cli.command else {
            panic!("expected plan command");
        };
        assert_eq!(args.output, PathBuf::from("."));
        assert!(!args.parallel);
        let trip = args.to_trip().unwrap();
        assert_eq!(trip.destination_city, "Paris");
        assert_eq!(trip.budget.amount(), 80000.0);
    }

    #[test]
    fn test_serve_is_optional() {
        let cli = Cli::try_parse_from(["tripsage", "--config", "/tmp/t.toml"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/t.toml")));
    }

    #[test]
    fn test_plan_requires_all_flags() {
        assert!(Cli::try_parse_from(["tripsage", "plan", "--from", "Mumbai"]).is_err());
    }
}
