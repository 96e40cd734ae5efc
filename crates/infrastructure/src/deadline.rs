use std::future::Future;

use cloudtrust_core::{AppError, AppResult, CallContext};

/// Runs `future` under the context deadline, reporting expiry as `ProviderUnavailable`.
pub(crate) async fn within_deadline<T, F>(
    context: &CallContext,
    operation: &str,
    future: F,
) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    context.ensure_not_expired(operation)?;

    match context.remaining() {
        Some(remaining) => tokio::time::timeout(remaining, future)
            .await
            .map_err(|_| {
                AppError::ProviderUnavailable(format!("deadline elapsed during {operation}"))
            })?,
        None => future.await,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn elapsed_deadline_reports_provider_unavailable() {
        let context = CallContext::with_timeout(Duration::from_millis(20));

        let result: AppResult<()> = within_deadline(&context, "get_role", async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;

        assert!(matches!(result, Err(AppError::ProviderUnavailable(_))));
    }

    #[tokio::test]
    async fn expired_context_fails_before_the_call_starts() {
        let context = CallContext::with_timeout(Duration::ZERO);
        tokio::time::sleep(Duration::from_millis(1)).await;

        let result: AppResult<()> = within_deadline(&context, "assume_role", async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;

        assert!(matches!(
            result,
            Err(AppError::ProviderUnavailable(message)) if message.contains("before assume_role")
        ));
    }

    #[tokio::test]
    async fn calls_inside_the_deadline_return_their_value() {
        let context = CallContext::with_timeout(Duration::from_secs(5));

        let result = within_deadline(&context, "get_role", async { Ok(7_u8) }).await;

        assert!(matches!(result, Ok(7)));
    }

    #[tokio::test]
    async fn background_context_is_unbounded() {
        let result =
            within_deadline(&CallContext::background(), "get_role", async { Ok("done") }).await;

        assert!(matches!(result, Ok("done")));
    }
}
