//! Runtime configuration with a single validation step.

use notify_host::ToastPosition;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Query parameter carrying a notification id on page load.
pub const DEFAULT_QUERY_PARAM: &str = "nid";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Which entry becomes selected after the selected entry is removed.
pub enum AutoSelect {
    /// Leave nothing selected.
    #[default]
    Disabled,
    /// Select the oldest remaining entry.
    Oldest,
    /// Select the newest remaining entry.
    Newest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// How an arrival whose id is already queued is handled.
pub enum DuplicatePolicy {
    /// The newer copy overwrites the queued record in place (last wins).
    #[default]
    Replace,
    /// The queued record is kept and the arrival dropped (first wins).
    Ignore,
}

impl DuplicatePolicy {
    /// Returns whether arrivals with a queued id are dropped.
    pub fn is_ignore(self) -> bool {
        self == Self::Ignore
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
/// Maximum number of simultaneously visible toasts per corner.
pub enum StackLimit {
    /// Never queue toasts.
    Unlimited,
    /// At most this many visible toasts (always at least one).
    Limited(usize),
}

impl StackLimit {
    /// Returns whether another toast fits next to `visible` visible toasts.
    pub fn allows(self, visible: usize) -> bool {
        match self {
            Self::Unlimited => true,
            Self::Limited(max) => visible < max,
        }
    }

    /// Returns whether the limit is unlimited.
    pub fn is_unlimited(self) -> bool {
        matches!(self, Self::Unlimited)
    }
}

impl From<i32> for StackLimit {
    fn from(raw: i32) -> Self {
        if raw <= 0 {
            Self::Unlimited
        } else {
            Self::Limited(raw as usize)
        }
    }
}

impl From<StackLimit> for i32 {
    fn from(limit: StackLimit) -> Self {
        match limit {
            StackLimit::Unlimited => -1,
            StackLimit::Limited(max) => i32::try_from(max).unwrap_or(i32::MAX),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
/// Auto-hide delay; non-positive raw values mean "never hide".
pub struct AutoHide(Option<u32>);

impl AutoHide {
    /// Never hide automatically.
    pub const NEVER: AutoHide = AutoHide(None);

    /// Hide after `ms` milliseconds (zero means never).
    pub fn after_ms(ms: u32) -> Self {
        Self((ms > 0).then_some(ms))
    }

    /// Returns the delay, if any.
    pub fn delay_ms(self) -> Option<u32> {
        self.0
    }
}

impl From<i64> for AutoHide {
    fn from(raw: i64) -> Self {
        if raw <= 0 {
            Self::NEVER
        } else {
            Self(Some(u32::try_from(raw).unwrap_or(u32::MAX)))
        }
    }
}

impl From<AutoHide> for i64 {
    fn from(hide: AutoHide) -> Self {
        hide.0.map(i64::from).unwrap_or(-1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
/// Toast close button options.
pub struct CloseButtonConfig {
    /// Render a close button.
    pub enabled: bool,
    /// Inline style appended to the button defaults.
    pub style: String,
}

impl Default for CloseButtonConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            style: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
/// Toast options.
pub struct ToastConfig {
    /// Show toasts when native notifications are unavailable.
    pub enabled: bool,
    /// Auto-hide delay after a toast becomes visible.
    pub hide_after_ms: AutoHide,
    /// Visible toasts per corner.
    pub stack_limit: StackLimit,
    /// Force-hide the oldest visible toast when the limit is reached.
    pub overwrite_old: bool,
    /// Default corner.
    #[serde(deserialize_with = "lenient_position")]
    pub position: ToastPosition,
    /// Honor [`crate::Notification::position`] overrides, stacking each corner independently.
    pub per_notification_position: bool,
    /// Pixels between stacked toasts.
    pub spacing: i32,
    /// Inline style appended to the toast defaults.
    pub style: String,
    /// Close button options.
    pub close: CloseButtonConfig,
}

impl Default for ToastConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            hide_after_ms: AutoHide::NEVER,
            stack_limit: StackLimit::Limited(3),
            overwrite_old: true,
            position: ToastPosition::TopRight,
            per_notification_position: false,
            spacing: 2,
            style: String::new(),
            close: CloseButtonConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
/// Native desktop notification options.
pub struct NativeConfig {
    /// Prefer native notifications when permission is granted.
    pub enabled: bool,
    /// Auto-close delay measured from when the notification is shown.
    pub hide_after_ms: AutoHide,
}

impl Default for NativeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            hide_after_ms: AutoHide::NEVER,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
/// Complete runtime configuration.
pub struct NotifyConfig {
    /// Selection policy after the selected entry is removed.
    pub auto_select: AutoSelect,
    /// Hide a toast or native notification after its default click action.
    pub hide_after_click: bool,
    /// Default title for toasts and native notifications.
    pub title: String,
    /// Default icon URL.
    pub icon: String,
    /// Handling of arrivals whose id is already queued.
    pub duplicate_policy: DuplicatePolicy,
    /// Inject the first auto-selected arrival when it targets the current page.
    pub inject_on_arrival: bool,
    /// Delete mailbox-backed records from the mailbox when they leave the queue.
    pub delete_from_mailbox_on_remove: bool,
    /// Query parameter consumed at start to select a specific notification.
    pub notification_query_param: String,
    /// Toast options.
    pub toast: ToastConfig,
    /// Native notification options.
    pub native: NativeConfig,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            auto_select: AutoSelect::Disabled,
            hide_after_click: true,
            title: String::new(),
            icon: String::new(),
            duplicate_policy: DuplicatePolicy::Replace,
            inject_on_arrival: true,
            delete_from_mailbox_on_remove: true,
            notification_query_param: DEFAULT_QUERY_PARAM.to_string(),
            toast: ToastConfig::default(),
            native: NativeConfig::default(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Configuration rejected by [`NotifyConfig::validate`].
pub enum ConfigError {
    /// Toast spacing must not be negative.
    #[error("toast spacing must not be negative (got {0})")]
    NegativeSpacing(i32),
    /// The notification query parameter must be a non-empty token.
    #[error("notification query parameter must not be empty")]
    EmptyQueryParam,
    /// The JSON document could not be parsed.
    #[error("invalid configuration json: {0}")]
    InvalidJson(String),
}

impl NotifyConfig {
    /// Starts a builder from the defaults.
    pub fn builder() -> NotifyConfigBuilder {
        NotifyConfigBuilder::default()
    }

    /// Parses camelCase JSON (missing keys take defaults) and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidJson`] for malformed documents and any validation error.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(raw).map_err(|err| ConfigError::InvalidJson(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field invariants.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.toast.spacing < 0 {
            return Err(ConfigError::NegativeSpacing(self.toast.spacing));
        }
        if self.notification_query_param.trim().is_empty() {
            return Err(ConfigError::EmptyQueryParam);
        }
        Ok(())
    }

    /// Returns the configured title, or `None` when blank.
    pub fn title(&self) -> Option<&str> {
        non_blank(&self.title)
    }

    /// Returns the configured icon, or `None` when blank.
    pub fn icon(&self) -> Option<&str> {
        non_blank(&self.icon)
    }
}

fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn lenient_position<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ToastPosition, D::Error> {
    let token = String::deserialize(deserializer)?;
    Ok(ToastPosition::parse(&token).unwrap_or_default())
}

#[derive(Debug, Clone, Default)]
/// Builder for [`NotifyConfig`]; [`NotifyConfigBuilder::build`] validates once at the end.
pub struct NotifyConfigBuilder {
    config: NotifyConfig,
}

impl NotifyConfigBuilder {
    /// Sets the auto-select policy.
    #[must_use]
    pub fn with_auto_select(mut self, policy: AutoSelect) -> Self {
        self.config.auto_select = policy;
        self
    }

    /// Sets hide-after-click.
    #[must_use]
    pub fn with_hide_after_click(mut self, hide: bool) -> Self {
        self.config.hide_after_click = hide;
        self
    }

    /// Sets the default title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.config.title = title.into();
        self
    }

    /// Sets the default icon.
    #[must_use]
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.config.icon = icon.into();
        self
    }

    /// Sets the duplicate policy.
    #[must_use]
    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.config.duplicate_policy = policy;
        self
    }

    /// Enables or disables inject-on-arrival.
    #[must_use]
    pub fn with_inject_on_arrival(mut self, inject: bool) -> Self {
        self.config.inject_on_arrival = inject;
        self
    }

    /// Enables or disables mailbox deletes on removal.
    #[must_use]
    pub fn with_delete_from_mailbox_on_remove(mut self, delete: bool) -> Self {
        self.config.delete_from_mailbox_on_remove = delete;
        self
    }

    /// Sets the notification query parameter name.
    #[must_use]
    pub fn with_query_param(mut self, name: impl Into<String>) -> Self {
        self.config.notification_query_param = name.into();
        self
    }

    /// Enables or disables toasts.
    #[must_use]
    pub fn with_toasts_enabled(mut self, enabled: bool) -> Self {
        self.config.toast.enabled = enabled;
        self
    }

    /// Sets the toast auto-hide delay (non-positive means never).
    #[must_use]
    pub fn with_toast_hide_after_ms(mut self, ms: i64) -> Self {
        self.config.toast.hide_after_ms = AutoHide::from(ms);
        self
    }

    /// Sets the stack limit (non-positive means unlimited).
    #[must_use]
    pub fn with_stack_limit(mut self, limit: i32) -> Self {
        self.config.toast.stack_limit = StackLimit::from(limit);
        self
    }

    /// Sets overwrite-old.
    #[must_use]
    pub fn with_overwrite_old(mut self, overwrite: bool) -> Self {
        self.config.toast.overwrite_old = overwrite;
        self
    }

    /// Sets the default corner.
    #[must_use]
    pub fn with_position(mut self, position: ToastPosition) -> Self {
        self.config.toast.position = position;
        self
    }

    /// Honors per-notification corner overrides.
    #[must_use]
    pub fn with_per_notification_position(mut self, enabled: bool) -> Self {
        self.config.toast.per_notification_position = enabled;
        self
    }

    /// Sets the spacing between toasts.
    #[must_use]
    pub fn with_spacing(mut self, spacing: i32) -> Self {
        self.config.toast.spacing = spacing;
        self
    }

    /// Sets the toast inline style.
    #[must_use]
    pub fn with_toast_style(mut self, style: impl Into<String>) -> Self {
        self.config.toast.style = style.into();
        self
    }

    /// Configures the close button.
    #[must_use]
    pub fn with_close_button(mut self, enabled: bool, style: impl Into<String>) -> Self {
        self.config.toast.close = CloseButtonConfig {
            enabled,
            style: style.into(),
        };
        self
    }

    /// Enables or disables native notifications.
    #[must_use]
    pub fn with_native_enabled(mut self, enabled: bool) -> Self {
        self.config.native.enabled = enabled;
        self
    }

    /// Sets the native auto-close delay (non-positive means never).
    #[must_use]
    pub fn with_native_hide_after_ms(mut self, ms: i64) -> Self {
        self.config.native.hide_after_ms = AutoHide::from(ms);
        self
    }

    /// Validates and returns the configuration.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn build(self) -> Result<NotifyConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn defaults_match_library_defaults() {
        let config = NotifyConfig::default();
        assert_eq!(config.toast.stack_limit, StackLimit::Limited(3));
        assert!(config.toast.overwrite_old);
        assert_eq!(config.toast.spacing, 2);
        assert_eq!(config.toast.position, ToastPosition::TopRight);
        assert_eq!(config.toast.hide_after_ms.delay_ms(), None);
        assert_eq!(config.native.hide_after_ms, AutoHide::NEVER);
        assert_eq!(config.notification_query_param, "nid");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn json_normalizes_limits_delays_and_positions() {
        let config = NotifyConfig::from_json(
            r#"{
                "autoSelect": "newest",
                "toast": { "stackLimit": 0, "hideAfterMs": 5000, "position": "sideways" },
                "native": { "hideAfterMs": -1 }
            }"#,
        )
        .expect("parse");

        assert_eq!(config.auto_select, AutoSelect::Newest);
        assert!(config.toast.stack_limit.is_unlimited());
        assert_eq!(config.toast.hide_after_ms.delay_ms(), Some(5000));
        assert_eq!(config.toast.position, ToastPosition::TopRight);
        assert_eq!(config.native.hide_after_ms.delay_ms(), None);
        assert!(config.hide_after_click);
    }

    #[test]
    fn builder_validates_once_at_build() {
        assert_eq!(
            NotifyConfig::builder().with_spacing(-4).build(),
            Err(ConfigError::NegativeSpacing(-4))
        );
        assert_eq!(
            NotifyConfig::builder().with_query_param("  ").build(),
            Err(ConfigError::EmptyQueryParam)
        );

        let config = NotifyConfig::builder()
            .with_stack_limit(2)
            .with_overwrite_old(false)
            .with_position(ToastPosition::BottomLeft)
            .build()
            .expect("build");
        assert_eq!(config.toast.stack_limit, StackLimit::Limited(2));
        assert!(!config.toast.overwrite_old);
        assert_eq!(config.toast.position, ToastPosition::BottomLeft);
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(matches!(
            NotifyConfig::from_json("{ nope"),
            Err(ConfigError::InvalidJson(_))
        ));
    }

    #[test]
    fn stack_limit_allows_below_maximum_only() {
        assert!(StackLimit::Limited(2).allows(1));
        assert!(!StackLimit::Limited(2).allows(2));
        assert!(StackLimit::Unlimited.allows(10_000));
        assert_eq!(i32::from(StackLimit::from(-3)), -1);
    }

    #[test]
    fn blank_title_and_icon_read_as_absent() {
        let config = NotifyConfig::builder()
            .with_title("  ")
            .with_icon("/badge.png")
            .build()
            .expect("build");
        assert_eq!(config.title(), None);
        assert_eq!(config.icon(), Some("/badge.png"));
    }
}
