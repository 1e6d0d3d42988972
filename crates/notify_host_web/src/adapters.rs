use std::rc::Rc;

use notify_host::{
    HostServices, MailboxService, NoopMailboxService, NoopPushService, PushService,
};

use crate::{
    sdk::{SdkHandle, SDK_GLOBAL},
    JsMailboxService, JsPushService, WebInjectionTarget, WebNotificationService, WebPageService,
    WebSessionStore, WebTaskSpawner, WebTimerService, WebToastSurface,
};

/// Builds the push adapter: the SDK push client when present, otherwise a silent channel.
pub fn push_service(sdk: &SdkHandle) -> Rc<dyn PushService> {
    if sdk.member("push").is_present() {
        Rc::new(JsPushService::new(sdk))
    } else {
        Rc::new(NoopPushService)
    }
}

/// Builds the mailbox adapter: the SDK mailbox client when present, otherwise an empty mailbox.
pub fn mailbox_service(sdk: &SdkHandle) -> Rc<dyn MailboxService> {
    if sdk.member("mailbox").is_present() {
        Rc::new(JsMailboxService::new(sdk))
    } else {
        Rc::new(NoopMailboxService)
    }
}

/// Builds browser host services around an explicit SDK handle.
pub fn build_host_services_with_sdk(sdk: &SdkHandle) -> HostServices {
    HostServices {
        session: Rc::new(WebSessionStore),
        push: push_service(sdk),
        mailbox: mailbox_service(sdk),
        notifications: Rc::new(WebNotificationService::default()),
        surface: Rc::new(WebToastSurface::default()),
        injection: Rc::new(WebInjectionTarget),
        page: Rc::new(WebPageService),
        timers: Rc::new(WebTimerService),
        spawner: Rc::new(WebTaskSpawner::default()),
    }
}

/// Builds browser host services, looking the SDK up on `globalThis`.
pub fn build_host_services() -> HostServices {
    build_host_services_with_sdk(&SdkHandle::from_global(SDK_GLOBAL))
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use futures::executor::block_on;
    use notify_host::{MailboxError, MailboxQuery};

    use super::*;

    #[test]
    fn missing_sdk_falls_back_to_silent_adapters() {
        let services = build_host_services();
        assert!(!services.push.is_ready());
        assert_eq!(block_on(services.mailbox.find(&MailboxQuery::all())), Ok(Vec::new()));
        assert_eq!(
            block_on(services.mailbox.delete(&MailboxQuery::by_id("m-1"))),
            Err(MailboxError::NotFound)
        );
        assert_eq!(services.session.get("anything"), None);
    }
}
