use anyhow::Result;

/// Everything in daymark runs on one thread, the reminder loop and the notification consumer
/// cooperate on the same runtime.
pub fn single_thread_runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}
