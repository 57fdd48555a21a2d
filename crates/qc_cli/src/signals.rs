use qc_transport::CancellationToken;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Cancels a token when Ctrl-C is pressed, for as long as it is alive.
pub(crate) struct CancelOnInterrupt(JoinHandle<()>);

impl CancelOnInterrupt {
    pub(crate) fn new(cancel: &CancellationToken) -> Self {
        let cancel = cancel.clone();

        Self(tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!(signal = "SIGINT", "Signal received, cancelling answer.");
                    cancel.cancel();
                }
                Err(error) => warn!(%error, "Couldn't listen for Ctrl-C."),
            }
        }))
    }
}

impl Drop for CancelOnInterrupt {
    fn drop(&mut self) {
        self.0.abort();
    }
}
