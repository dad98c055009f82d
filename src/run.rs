use tracing::{debug, info};

use crate::{
    models::{
        args::{AppArgs, Command},
        config::{RunConfig, TempDirPolicy},
    },
    pipeline::{
        downloader::{Downloader, HttpTransport},
        driver::Pipeline,
    },
    remote::{retry::RetryingRemoteService, tfe::TfeRemoteService},
    utils::{
        dir::{DirUtils, DownloadLocator},
        errors::{EmptyResult, ResultWithError},
        printer::Printer,
    },
};

/// Main controller to run the application logic.
pub struct Run {
    args: AppArgs,
    config: RunConfig,
}

impl Run {
    pub fn new(args: AppArgs, config: RunConfig) -> Self {
        Self { args, config }
    }

    fn pipeline(
        &self,
    ) -> ResultWithError<Pipeline<RetryingRemoteService<TfeRemoteService>, HttpTransport>> {
        let remote = RetryingRemoteService::new(
            TfeRemoteService::new(&self.config.address, &self.config.token)?,
            self.config.retry,
        );
        let downloader = Downloader::new(HttpTransport::new()?, self.config.retry);
        let org = if self.args.command.needs_org() {
            self.config.org()?.to_owned()
        } else {
            String::new()
        };
        Ok(Pipeline::new(remote, downloader, org))
    }

    pub fn execute(&self) -> EmptyResult {
        let printer = Printer::new(self.args.format);
        let pipeline = self.pipeline()?;

        match &self.args.command {
            Command::ListWorkspaces => {
                let workspaces = pipeline.list_workspaces()?;
                println!("{}", printer.workspaces(&workspaces)?);
            }
            Command::LatestStatefileSize => {
                let dir = DirUtils::curr_dir()?;
                pipeline.latest_statefile_sizes(&dir, |latest| {
                    println!("{}", Printer::latest_line(latest));
                    debug!("Statefile of {} kept at {}", latest.workspace, latest.path.display());
                })?;
            }
            Command::AllStatefilesSize { .. } => {
                if self.config.cleanup {
                    info!("--cleanup enabled, so statefiles will be deleted after completion");
                }
                if self.config.temp_dir != TempDirPolicy::Disabled {
                    info!(
                        "--totmpdir enabled, so statefiles will be downloaded to default tmpdir ({})",
                        std::env::temp_dir().display()
                    );
                }

                let locator = DownloadLocator::from_policy(self.config.temp_dir)?;
                pipeline.all_statefile_sizes(&locator, self.config.cleanup, |summary| {
                    println!("{}", Printer::summary_line(summary));
                })?;
            }
            Command::Validate => match pipeline.validate() {
                Ok(user) => {
                    println!("API Token valid - User is: {}", user.username);
                    debug!("Token owner email: {}", user.email.as_deref().unwrap_or("<NONE>"));
                }
                Err(e) => println!("{e}"),
            },
        }

        info!("Execution finished");

        Ok(())
    }
}
