pub mod server;
pub mod session;

// The match lives in `run` so this module only declares what can run.
mod run;

#[derive(Debug)]
pub enum Action {
    Session(session::Args),
    Server(server::Args),
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> anyhow::Result<()> {
        run::execute(self).await
    }
}
