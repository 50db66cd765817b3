use anyhow::Result;
use hourfit::{cli::run_cli, utils::runtime::single_thread_runtime};
use tracing::error;

fn main() -> Result<()> {
    let runtime = single_thread_runtime()?;
    let result = runtime.block_on(async {
        run_cli().await.inspect_err(|e| {
            error!("Error running cli {e:?}");
        })
    });
    // A session may leave a blocking read of stdin behind.
    runtime.shutdown_background();
    result
}
