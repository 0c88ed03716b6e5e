//! Runtime entry points referenced by lowered bind expressions.

/// Runtime helper calls emitted by bind lowering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindRuntimeHelper {
    /// Formats the bound value for display.
    GetValue,
    /// Wraps a setter in a plain delegate.
    SetValueHandler,
    /// Wraps a setter in an awaitable callback bound to the receiver.
    CreateBinder,
}

impl BindRuntimeHelper {
    /// Fully qualified call target.
    pub fn name(self) -> &'static str {
        match self {
            Self::GetValue => "BindMethods.GetValue",
            Self::SetValueHandler => "BindMethods.SetValueHandler",
            Self::CreateBinder => "EventCallback.Factory.CreateBinder",
        }
    }

    /// Whether the call takes the receiver as its first argument.
    #[inline]
    pub fn takes_receiver(self) -> bool {
        matches!(self, Self::CreateBinder)
    }
}

/// Receiver passed to helpers that dispatch through the component instance.
pub const RECEIVER: &str = "this";

/// Parameter name of generated setter lambdas.
pub const SETTER_PARAMETER: &str = "__value";
