//! TripSage command-line entry point

use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use futures::{StreamExt, channel::mpsc};
use tracing::info;

use tripsage::cli::{Cli, Command, PlanArgs};
use tripsage::{
    AgentRoster, ChatDispatcher, PlanEvent, TripPlanner, TripSageConfig, tools, web,
};

fn build_planner(config: &TripSageConfig) -> Result<TripPlanner> {
    let dispatcher = ChatDispatcher::from_config(config)?;
    let sources = tools::from_config(&config.tools)?;
    Ok(
        TripPlanner::new(Arc::new(dispatcher), AgentRoster::from_config(config))
            .with_sources(sources)
            .parallel(config.planning.parallel),
    )
}

async fn cmd_serve(mut config: TripSageConfig, port: Option<u16>) -> Result<()> {
    if let Some(port) = port {
        config.server.port = port;
    }
    let planner = build_planner(&config)?;
    web::run(&config.server, planner).await
}

fn print_event(event: &PlanEvent) {
    match event {
        PlanEvent::CategoryCompleted { category, markdown } => {
            println!("\n=== {} ===\n\n{}\n", category.title(), markdown);
        }
        PlanEvent::CategoryFailed { category, message } => {
            println!("\n=== {} ===\n\n🚨 {}\n", category.title(), message);
        }
        PlanEvent::ItineraryCompleted { markdown } => {
            println!("\n=== 📋 Here's your Complete Travel Plan ===\n\n{markdown}\n");
        }
        PlanEvent::ItineraryFailed { message } => {
            println!("\n=== 📋 Complete Travel Plan ===\n\n🚨 {message}\n");
        }
    }
}

async fn cmd_plan(config: TripSageConfig, args: PlanArgs) -> Result<()> {
    // Nothing is dispatched for an invalid request
    let trip = args.to_trip()?;
    let planner = build_planner(&config)?.parallel(config.planning.parallel || args.parallel);

    println!("🎈 Sit tight! Preparing your travel planning journey!");
    let (tx, mut rx) = mpsc::unbounded();
    let printer = async {
        while let Some(event) = rx.next().await {
            print_event(&event);
        }
    };
    let (plan, ()) = tokio::join!(planner.plan(&trip, Some(tx)), printer);

    let itinerary = plan
        .itinerary
        .map_err(|e| anyhow!("No itinerary was produced: {}", e.user_message()))?;

    let path = args.output.join(trip.download_file_name());
    std::fs::write(&path, itinerary.markdown())
        .with_context(|| format!("Failed to write itinerary to {}", path.display()))?;
    info!("Itinerary written to {}", path.display());
    println!("📥 Itinerary saved to {}", path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config =
        TripSageConfig::load_from_path(cli.config).context("Failed to load configuration")?;
    tripsage::logging::init(&config.logging)?;

    match cli.command.unwrap_or(Command::Serve { port: None }) {
        Command::Serve { port } => cmd_serve(config, port).await,
        Command::Plan(args) => cmd_plan(config, args).await,
    }
}
