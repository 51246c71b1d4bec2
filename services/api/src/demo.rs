use crate::infra::simulated_sensor_readings;
use clap::Args;
use flood_sync::config::{AppConfig, StoreConfig};
use flood_sync::error::AppError;
use flood_sync::store::{HttpReportStore, InMemoryReportStore, InMemorySensorStore, StoreClient};
use flood_sync::workflows::validation::{
    eligible_reports, DashboardView, PeerValidationService, Report, ReportStore,
    ReportSubmission, VoteKind, VotingRules,
};
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Water level in meters for the report that gets validated
    #[arg(long, default_value_t = 1.5)]
    pub(crate) water_level: f64,
    /// Skip the rejection walk-through
    #[arg(long)]
    pub(crate) skip_rejection: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct PoolArgs {
    /// Base URL of the report store (defaults to STORE_BASE_URL)
    #[arg(long)]
    pub(crate) store_url: Option<String>,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        water_level,
        skip_rejection,
    } = args;

    let service = PeerValidationService::new(
        Arc::new(InMemoryReportStore::default()),
        Arc::new(InMemorySensorStore::with_readings(
            simulated_sensor_readings(),
        )),
        VotingRules::default(),
    );
    if let Err(err) = service.refresh().await {
        println!("  Sensor feed unavailable: {}", err);
    }

    println!("FloodSync peer validation demo");
    let flooded = match service
        .submit(demo_submission(
            "Ikorodu",
            water_level,
            "Heavy flooding, blocked drain",
        ))
        .await
    {
        Ok(report) => report,
        Err(err) => {
            println!("  Submission rejected: {}", err);
            return Ok(());
        }
    };
    println!(
        "- Report {} submitted at {} ({}m) -> {}",
        flooded.id,
        flooded.location,
        flooded.water_level,
        flooded.status.label()
    );

    let prank = if skip_rejection {
        None
    } else {
        let report = service
            .submit(demo_submission(
                "Ajegunle",
                0.3,
                "Puddle near the market gate",
            ))
            .await
            .map_err(|err| {
                println!("  Submission rejected: {}", err);
                err
            })
            .ok();
        if let Some(report) = &report {
            println!(
                "- Report {} submitted at {} ({}m) -> {}",
                report.id,
                report.location,
                report.water_level,
                report.status.label()
            );
        }
        report
    };

    println!("\nValidation session");
    let session = service.open_session();
    println!("- {} report(s) awaiting peer votes", session.pending);

    // Votes alternate between the two reports as the cursor advances.
    let votes = if prank.is_some() {
        vec![
            VoteKind::Up,
            VoteKind::Down,
            VoteKind::Up,
            VoteKind::Down,
            VoteKind::Up,
            VoteKind::Down,
        ]
    } else {
        vec![VoteKind::Up; 3]
    };

    for kind in votes {
        match service.vote_in_session(&session.session_id, kind).await {
            Ok(result) => {
                println!(
                    "  {:?} on {} -> up {} / down {} ({})",
                    kind,
                    result.vote.report.location,
                    result.vote.report.upvotes,
                    result.vote.report.downvotes,
                    result.vote.outcome.label()
                );
                if let Some(notice) = result.vote.notice {
                    println!("    {}", notice);
                }
            }
            Err(err) => {
                println!("  Vote not recorded: {}", err);
                break;
            }
        }
    }

    render_dashboard(&service.dashboard());
    Ok(())
}

pub(crate) async fn run_pool(args: PoolArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let base_url = match args.store_url {
        Some(url) => StoreConfig::normalize_url(Some(url))?,
        None => config.store.base_url.clone(),
    };
    let Some(base_url) = base_url else {
        println!("No report store configured; pass --store-url or set STORE_BASE_URL.");
        return Ok(());
    };

    let store = HttpReportStore::new(StoreClient::new(base_url.clone(), config.store.timeout)?);
    let reports = store.list().await?;
    let pool = eligible_reports(&reports, &config.voting);

    println!("Reports awaiting peer validation at {}", base_url);
    render_pool(&pool, reports.len());
    Ok(())
}

fn demo_submission(location: &str, water_level: f64, description: &str) -> ReportSubmission {
    ReportSubmission {
        location: location.to_string(),
        water_level,
        description: description.to_string(),
        latitude: None,
        longitude: None,
        image_url: None,
    }
}

fn render_pool(pool: &[Report], total: usize) {
    if pool.is_empty() {
        println!("- none of {} report(s) are open for voting", total);
        return;
    }
    for (index, report) in pool.iter().enumerate() {
        println!(
            "{:>3}. [{}] {} ({}m) up {} / down {} - {}",
            index + 1,
            report.id,
            report.location,
            report.water_level,
            report.upvotes,
            report.downvotes,
            report.description
        );
    }
    println!("- {} of {} report(s) open for voting", pool.len(), total);
}

fn render_dashboard(view: &DashboardView) {
    println!("\nDashboard");
    println!(
        "- Map centre {:.4}, {:.4} with {} validated incident(s)",
        view.map_center.latitude,
        view.map_center.longitude,
        view.validated.len()
    );
    for marker in &view.validated {
        println!(
            "  - {} ({}m) at {:.4}, {:.4}",
            marker.location, marker.water_level, marker.latitude, marker.longitude
        );
    }
    if let Some(chart) = &view.sensor_chart {
        println!(
            "- Sensor {}: {}m of {}m scale at {}",
            chart.location,
            chart.water_level,
            chart.axis_max,
            chart.timestamp.format("%H:%M:%S")
        );
    }
    println!("All reports:");
    for card in &view.reports {
        println!(
            "  - {} ({}m): {} | up {} / down {}",
            card.location, card.water_level, card.status_label, card.upvotes, card.downvotes
        );
    }
}
