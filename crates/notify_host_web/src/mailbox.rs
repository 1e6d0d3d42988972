//! Mailbox adapter wrapping the platform SDK's `mailbox` member.

use notify_host::{MailRecord, MailboxError, MailboxFuture, MailboxQuery, MailboxService};

use crate::sdk::SdkHandle;

#[derive(Debug, Clone)]
/// Mailbox service backed by the SDK's mailbox client.
pub struct JsMailboxService {
    mailbox: SdkHandle,
}

impl JsMailboxService {
    /// Wraps the `mailbox` member of `sdk`.
    pub fn new(sdk: &SdkHandle) -> Self {
        Self {
            mailbox: sdk.member("mailbox"),
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn failure(err: &wasm_bindgen::JsValue) -> MailboxError {
    use crate::sdk::js;

    if js::error_status(err) == 404 {
        MailboxError::NotFound
    } else {
        MailboxError::Failed(js::js_error_to_string(err))
    }
}

#[cfg(target_arch = "wasm32")]
fn query_value(query: &MailboxQuery) -> Result<wasm_bindgen::JsValue, MailboxError> {
    use serde::Serialize;

    query
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| MailboxError::Failed(e.to_string()))
}

impl MailboxService for JsMailboxService {
    fn find<'a>(
        &'a self,
        query: &'a MailboxQuery,
    ) -> MailboxFuture<'a, Result<Vec<MailRecord>, MailboxError>> {
        Box::pin(async move {
            #[cfg(target_arch = "wasm32")]
            {
                use crate::sdk::js;

                let mailbox = self
                    .mailbox
                    .value()
                    .ok_or_else(|| MailboxError::Failed("mailbox client unavailable".to_string()))?;
                let promise =
                    js::mailbox_find(mailbox, query_value(query)?).map_err(|e| failure(&e))?;
                let value = js::await_promise(promise).await.map_err(|e| failure(&e))?;
                if value.is_null() || value.is_undefined() {
                    return Ok(Vec::new());
                }
                let mut records: Vec<MailRecord> = serde_wasm_bindgen::from_value(value)
                    .map_err(|e| MailboxError::Failed(e.to_string()))?;
                if let Some(limit) = query.limit {
                    records.truncate(limit);
                }
                Ok(records)
            }

            #[cfg(not(target_arch = "wasm32"))]
            {
                let _ = query;
                Err(MailboxError::Failed("mailbox client unavailable".to_string()))
            }
        })
    }

    fn delete<'a>(&'a self, query: &'a MailboxQuery) -> MailboxFuture<'a, Result<(), MailboxError>> {
        Box::pin(async move {
            #[cfg(target_arch = "wasm32")]
            {
                use crate::sdk::js;

                let mailbox = self
                    .mailbox
                    .value()
                    .ok_or_else(|| MailboxError::Failed("mailbox client unavailable".to_string()))?;
                let promise =
                    js::mailbox_delete(mailbox, query_value(query)?).map_err(|e| failure(&e))?;
                js::await_promise(promise)
                    .await
                    .map(|_| ())
                    .map_err(|e| failure(&e))
            }

            #[cfg(not(target_arch = "wasm32"))]
            {
                let _ = query;
                Err(MailboxError::Failed("mailbox client unavailable".to_string()))
            }
        })
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn missing_sdk_reports_failures_not_not_found() {
        let mailbox = JsMailboxService::new(&SdkHandle::default());
        let query = MailboxQuery::by_id("m-1");
        assert_eq!(
            block_on(mailbox.delete(&query)),
            Err(MailboxError::Failed("mailbox client unavailable".to_string()))
        );
        assert!(block_on(mailbox.find(&query)).is_err());
    }
}
