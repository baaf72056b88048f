use crate::params::ParameterStore;
use crate::workflow::Workflow;
use anyhow::{anyhow, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Everything a workflow needs to run, without the account credentials.
#[derive(Serialize, Debug)]
pub struct RunPlan {
    pub workflow: Workflow,
    pub parameters: ParameterStore,
    pub command: String,
    pub downloads: PathBuf,
    pub created: String,
}

impl RunPlan {
    pub fn new(parameters: ParameterStore, command: String, downloads: PathBuf) -> Result<Self> {
        let workflow = parameters
            .workflow()
            .ok_or(anyhow!("No process in the parameter set"))?;
        Ok(Self {
            workflow,
            parameters,
            command,
            downloads,
            created: chrono::Local::now().to_rfc3339(),
        })
    }

    pub fn write<P: AsRef<Path>>(self: &Self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

/// The five entry points of the EODMS client.
pub trait Dispatcher {
    async fn search_order_download(self: &Self, plan: &RunPlan) -> Result<()>;

    async fn order_csv(self: &Self, plan: &RunPlan) -> Result<()>;

    async fn order_ids(self: &Self, plan: &RunPlan) -> Result<()>;

    async fn download_available(self: &Self, plan: &RunPlan) -> Result<()>;

    async fn download_results(self: &Self, plan: &RunPlan) -> Result<()>;
}

pub async fn dispatch(dispatcher: &impl Dispatcher, plan: &RunPlan) -> Result<()> {
    match plan.workflow {
        Workflow::Full => dispatcher.search_order_download(plan).await,
        Workflow::OrderCsv => dispatcher.order_csv(plan).await,
        Workflow::RecordId => dispatcher.order_ids(plan).await,
        Workflow::DownloadAvailable => dispatcher.download_available(plan).await,
        Workflow::DownloadResults => dispatcher.download_results(plan).await,
    }
}

/// Writes each run plan as JSON into the results folder for the download client to pick up.
pub struct PlanDispatcher {
    results: PathBuf,
}

impl PlanDispatcher {
    pub fn new(results: PathBuf) -> Self {
        Self { results }
    }

    fn write_plan(self: &Self, plan: &RunPlan) -> Result<PathBuf> {
        if !self.results.exists() {
            fs::create_dir_all(&self.results)?;
        }
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let path = self.results.join(format!("{}_{}.json", plan.workflow, stamp));
        plan.write(&path)?;
        info!("Run plan for {} written to {}", plan.workflow, path.display());
        println!("\nRun plan written to '{}'.", path.display());
        Ok(path)
    }
}

impl Dispatcher for PlanDispatcher {
    async fn search_order_download(self: &Self, plan: &RunPlan) -> Result<()> {
        self.write_plan(plan)?;
        Ok(())
    }

    async fn order_csv(self: &Self, plan: &RunPlan) -> Result<()> {
        self.write_plan(plan)?;
        Ok(())
    }

    async fn order_ids(self: &Self, plan: &RunPlan) -> Result<()> {
        self.write_plan(plan)?;
        Ok(())
    }

    async fn download_available(self: &Self, plan: &RunPlan) -> Result<()> {
        self.write_plan(plan)?;
        Ok(())
    }

    async fn download_results(self: &Self, plan: &RunPlan) -> Result<()> {
        self.write_plan(plan)?;
        Ok(())
    }
}
