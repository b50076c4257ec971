use release_lead_time::action::ActionOutput;
use release_lead_time::ActionContext;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    // Local runs read inputs such as INPUT_AUTH-TOKEN from a .env file.
    dotenvy::dotenv().ok();

    // Initialize tracing (logging)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "release_lead_time=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let context = match ActionContext::from_env() {
        Ok(context) => context,
        Err(e) => {
            tracing::error!("{:#}", e);
            ActionOutput::default().set_failed(&format!("{e:#}"));
            return ExitCode::FAILURE;
        }
    };
    let output = context.output();

    match release_lead_time::run(&context).await {
        Ok(report) => {
            for failure in &report.failures {
                output.set_failed(&failure.message);
            }
            if let Some(lead_time) = report.lead_time {
                tracing::info!("Lead Time For Change in Days: {}", lead_time);
            }

            if report.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            tracing::error!("{:#}", e);
            output.set_failed(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}
