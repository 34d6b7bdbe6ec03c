//! Diagnostic message table.
//!
//! Codes in the 5000 range belong to the concurrency checker. The primary
//! code is 5001; the others are notes attached as related information.

use super::{DiagnosticCategory, DiagnosticMessage};

pub mod diagnostic_codes {
    pub const TYPE_DOES_NOT_CONFORM_TO_PROTOCOL: u32 = 5001;
    pub const CAPTURED_SUBSCRIPT_ARGUMENT_DOES_NOT_CONFORM: u32 = 5002;
    pub const TYPE_HAS_NO_DECLARED_CONFORMANCE: u32 = 5003;
    pub const CONFORMANCE_EXPLICITLY_UNAVAILABLE: u32 = 5004;
    pub const CONDITIONAL_REQUIREMENT_NOT_SATISFIED: u32 = 5005;
    pub const FUNCTION_TYPE_NOT_SENDABLE: u32 = 5006;
    pub const TUPLE_ELEMENT_DOES_NOT_CONFORM: u32 = 5007;
    pub const CONFORMANCE_CHECK_TOO_DEEP: u32 = 5008;
    pub const KEY_PATH_VALUE_NOT_INFERRED_SENDABLE: u32 = 5009;
    pub const TYPE_PARAMETER_NOT_CONSTRAINED: u32 = 5010;
}

pub mod diagnostic_messages {
    pub const TYPE_DOES_NOT_CONFORM_TO_PROTOCOL: &str =
        "type '{0}' does not conform to the '{1}' protocol";
    pub const CAPTURED_SUBSCRIPT_ARGUMENT_DOES_NOT_CONFORM: &str =
        "subscript argument of type '{0}' is captured by the key path and does not conform to '{1}'";
    pub const TYPE_HAS_NO_DECLARED_CONFORMANCE: &str =
        "'{0}' does not declare a conformance to '{1}'";
    pub const CONFORMANCE_EXPLICITLY_UNAVAILABLE: &str =
        "conformance of '{0}' to '{1}' has been explicitly marked unavailable";
    pub const CONDITIONAL_REQUIREMENT_NOT_SATISFIED: &str =
        "conformance of '{0}' to '{1}' requires that '{2}' conform to '{3}'";
    pub const FUNCTION_TYPE_NOT_SENDABLE: &str = "function type '{0}' is not '@Sendable'";
    pub const TUPLE_ELEMENT_DOES_NOT_CONFORM: &str =
        "tuple element {0} of type '{1}' does not conform to '{2}'";
    pub const CONFORMANCE_CHECK_TOO_DEEP: &str =
        "conformance of '{0}' to '{1}' exceeds the generic nesting limit";
    pub const KEY_PATH_VALUE_NOT_INFERRED_SENDABLE: &str =
        "key path value of type '{0}' is not known to be '{1}'";
    pub const TYPE_PARAMETER_NOT_CONSTRAINED: &str =
        "generic parameter '{0}' is not constrained to '{1}'";
}

macro_rules! messages {
    ($($name:ident => $category:ident),* $(,)?) => {
        pub static DIAGNOSTIC_MESSAGES: &[DiagnosticMessage] = &[
            $(DiagnosticMessage {
                code: diagnostic_codes::$name,
                category: DiagnosticCategory::$category,
                message: diagnostic_messages::$name,
            }),*
        ];
    };
}

messages! {
    TYPE_DOES_NOT_CONFORM_TO_PROTOCOL => Error,
    CAPTURED_SUBSCRIPT_ARGUMENT_DOES_NOT_CONFORM => Message,
    TYPE_HAS_NO_DECLARED_CONFORMANCE => Message,
    CONFORMANCE_EXPLICITLY_UNAVAILABLE => Message,
    CONDITIONAL_REQUIREMENT_NOT_SATISFIED => Message,
    FUNCTION_TYPE_NOT_SENDABLE => Message,
    TUPLE_ELEMENT_DOES_NOT_CONFORM => Message,
    CONFORMANCE_CHECK_TOO_DEEP => Message,
    KEY_PATH_VALUE_NOT_INFERRED_SENDABLE => Message,
    TYPE_PARAMETER_NOT_CONSTRAINED => Message,
}
