//! Query-then-conditionally-set reconciliation of modem settings.
//!
//! Some corrective commands restart the module (`AT+CFUN=1`), so a setting
//! is only written when a query shows it differs from what we want. The two
//! descriptor flavours differ only in how a reply is judged and where the
//! corrective command comes from; both run through [`Modem::reconcile`].

use crate::modem::{commands, Modem};
use std::time::Duration;
use tracing::{info, warn};

/// Settle time after powering the radio up; the module restarts.
pub const POWER_SETTLE: Duration = Duration::from_secs(2);

/// Settle time after entering the SIM PIN.
pub const PIN_SETTLE: Duration = Duration::from_secs(1);

/// What a query reply says about a setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reading {
    /// Already in the desired state.
    Satisfied,
    /// Differs; `current` describes what was found, for logging.
    NeedsCorrection { current: String },
    /// The reply did not have the expected shape.
    Malformed,
}

/// One reconcilable modem setting.
pub trait StatusCheck {
    /// Human-readable name used in logs.
    fn label(&self) -> &str;

    /// Command that reports the current state.
    fn query(&self) -> &str;

    /// Judge the filtered reply of the query.
    fn evaluate(&self, data: &str) -> Reading;

    /// Command that puts the setting right, if one can be produced.
    fn corrective_command(&self) -> Option<String>;

    /// Pause after a successful correction before the next command.
    fn settle_delay(&self) -> Option<Duration>;
}

/// A setting reported as `<prefix> <integer>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumericStatus {
    pub label: String,
    pub query: String,
    pub prefix: String,
    pub expected: i64,
    pub corrective: String,
    pub settle: Option<Duration>,
}

impl NumericStatus {
    pub fn new(
        label: impl Into<String>,
        query: impl Into<String>,
        prefix: impl Into<String>,
        expected: i64,
        corrective: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            query: query.into(),
            prefix: prefix.into(),
            expected,
            corrective: corrective.into(),
            settle: None,
        }
    }

    /// Wait `delay` after a successful correction.
    pub fn settle_after(mut self, delay: Duration) -> Self {
        self.settle = Some(delay);
        self
    }
}

impl StatusCheck for NumericStatus {
    fn label(&self) -> &str {
        &self.label
    }

    fn query(&self) -> &str {
        &self.query
    }

    fn evaluate(&self, data: &str) -> Reading {
        match parse_value(data, &self.prefix) {
            Some(value) if value == self.expected => Reading::Satisfied,
            Some(value) => Reading::NeedsCorrection {
                current: value.to_string(),
            },
            None => Reading::Malformed,
        }
    }

    fn corrective_command(&self) -> Option<String> {
        Some(self.corrective.clone())
    }

    fn settle_delay(&self) -> Option<Duration> {
        self.settle
    }
}

/// A setting whose ready state shows up as a literal in the reply.
///
/// The corrective command is produced lazily because it may need a secret
/// (the SIM PIN) that is only looked up when a correction is due. A supplier
/// returning `None` declines the correction.
pub struct TextStatus<F> {
    pub label: String,
    pub query: String,
    pub prefix: String,
    pub ready_literal: String,
    pub supplier: F,
    pub settle: Option<Duration>,
}

impl<F> TextStatus<F>
where
    F: Fn() -> Option<String>,
{
    pub fn new(
        label: impl Into<String>,
        query: impl Into<String>,
        prefix: impl Into<String>,
        ready_literal: impl Into<String>,
        supplier: F,
    ) -> Self {
        Self {
            label: label.into(),
            query: query.into(),
            prefix: prefix.into(),
            ready_literal: ready_literal.into(),
            supplier,
            settle: None,
        }
    }

    /// Wait `delay` after a successful correction.
    pub fn settle_after(mut self, delay: Duration) -> Self {
        self.settle = Some(delay);
        self
    }
}

impl<F> std::fmt::Debug for TextStatus<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextStatus")
            .field("label", &self.label)
            .field("query", &self.query)
            .field("ready_literal", &self.ready_literal)
            .field("settle", &self.settle)
            .finish_non_exhaustive()
    }
}

impl<F> StatusCheck for TextStatus<F>
where
    F: Fn() -> Option<String>,
{
    fn label(&self) -> &str {
        &self.label
    }

    fn query(&self) -> &str {
        &self.query
    }

    fn evaluate(&self, data: &str) -> Reading {
        if data.contains(&self.ready_literal) {
            return Reading::Satisfied;
        }
        let current = data
            .split_once(self.prefix.as_str())
            .map(|(_, rest)| rest.lines().next().unwrap_or("").trim().to_string())
            .unwrap_or_else(|| data.trim().to_string());
        Reading::NeedsCorrection { current }
    }

    fn corrective_command(&self) -> Option<String> {
        (self.supplier)()
    }

    fn settle_delay(&self) -> Option<Duration> {
        self.settle
    }
}

/// Integer following `prefix` in `data`: the first whitespace-delimited
/// token after the prefix, parsed as base 10.
pub fn parse_value(data: &str, prefix: &str) -> Option<i64> {
    let (_, rest) = data.split_once(prefix)?;
    rest.split_whitespace().next()?.parse().ok()
}

/// Radio power (`+CFUN`) must be 1, full functionality.
pub fn power() -> NumericStatus {
    NumericStatus::new(
        "Power",
        commands::POWER_QUERY,
        commands::POWER_PREFIX,
        1,
        commands::POWER_FULL,
    )
    .settle_after(POWER_SETTLE)
}

/// SMS format (`+CMGF`) must be 1, text mode.
pub fn sms_text_mode() -> NumericStatus {
    NumericStatus::new(
        "SMS Mode",
        commands::SMS_FORMAT_QUERY,
        commands::SMS_FORMAT_PREFIX,
        1,
        commands::SMS_TEXT_MODE,
    )
}

/// SIM must report `READY`; otherwise enter the PIN from `pin`.
///
/// `pin` is only called when the SIM actually asks for a PIN.
pub fn pin<P>(pin: P) -> TextStatus<impl Fn() -> Option<String>>
where
    P: Fn() -> Option<String>,
{
    TextStatus::new(
        "PIN",
        commands::PIN_QUERY,
        commands::PIN_PREFIX,
        commands::PIN_READY,
        move || match pin() {
            Some(value) => Some(commands::enter_pin(&value)),
            None => {
                warn!("PIN required but none configured");
                None
            }
        },
    )
    .settle_after(PIN_SETTLE)
}

impl Modem {
    /// Bring one setting into its desired state, touching the modem only if
    /// needed. Returns whether the setting ends up (or already was) right.
    pub fn reconcile(&mut self, check: &impl StatusCheck) -> bool {
        let label = check.label();
        let result = self.send(check.query());
        if !result.success() {
            warn!(label, "failed to query status");
            return false;
        }

        match check.evaluate(result.data()) {
            Reading::Satisfied => {
                info!(label, "already in desired state");
                return true;
            }
            Reading::Malformed => {
                warn!(label, reply = %result.data(), "unexpected response format");
                return false;
            }
            Reading::NeedsCorrection { current } => {
                info!(label, current = %current, "correcting");
            }
        }

        let Some(command) = check.corrective_command() else {
            warn!(label, "no corrective command available");
            return false;
        };

        let corrected = self.send(&command);
        if !corrected.success() {
            warn!(label, "failed to apply setting");
            return false;
        }

        info!(label, "setting applied");
        if let Some(delay) = check.settle_delay() {
            std::thread::sleep(delay);
        }
        true
    }

    /// [`Modem::reconcile`] for an integer-valued setting.
    pub fn reconcile_numeric(&mut self, status: &NumericStatus) -> bool {
        self.reconcile(status)
    }

    /// [`Modem::reconcile`] for a literal-valued setting.
    pub fn reconcile_text<F>(&mut self, status: &TextStatus<F>) -> bool
    where
        F: Fn() -> Option<String>,
    {
        self.reconcile(status)
    }
}
