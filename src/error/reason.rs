//! Reason codes.

use std::fmt::{self, Display};

use super::event::Params;

/// Machine-readable reason for a validation failure.
///
/// The set is closed: every [`ErrorEvent`](crate::ErrorEvent) carries exactly
/// one of these, and [`Reason::code`] is the uppercase string that appears in
/// both error views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Reason {
    /// A required source column is absent from the table.
    ColumnMissing,
    /// A null cell in a field that does not allow nulls.
    NullNotAllowed,
    /// A cell of a type the field cannot coerce.
    InvalidType,
    /// Text that does not parse as a number in a numeric field.
    NonNumericValue,
    /// An empty string in a text field that does not allow blanks.
    BlankNotAllowed,
    /// Text shorter than the field's minimum length.
    MinLengthValue,
    /// Text longer than the field's maximum length.
    MaxLengthValue,
    /// A number below the field's minimum.
    MinValue,
    /// A number above the field's maximum.
    MaxValue,
    /// Text that does not parse with the date field's format.
    IncorrectDateFormat,
    /// Text that does not parse with the datetime field's format.
    IncorrectDateTimeFormat,
    /// Text that does not match the field's pattern.
    PatternMismatch,
    /// A value outside the field's allowed choices.
    InvalidChoice,
    /// A file name whose extension is not a supported image format.
    ImageFormatNotSupported,
    /// An identifier that does not exist in the external lookup.
    IdentifierNotFound,
    /// A row whose composite key repeats an earlier row.
    NonUniqueTogether,
    /// A per-field hook failed.
    HookFailed,
}

impl Reason {
    /// Returns the uppercase reason code.
    pub fn code(&self) -> &'static str {
        match self {
            Reason::ColumnMissing => "COLUMN_MISSING",
            Reason::NullNotAllowed => "NULL_NOT_ALLOWED",
            Reason::InvalidType => "INVALID_TYPE",
            Reason::NonNumericValue => "NON_NUMERIC_VALUE",
            Reason::BlankNotAllowed => "BLANK_NOT_ALLOWED",
            Reason::MinLengthValue => "MIN_LENGTH_VALUE",
            Reason::MaxLengthValue => "MAX_LENGTH_VALUE",
            Reason::MinValue => "MIN_VALUE",
            Reason::MaxValue => "MAX_VALUE",
            Reason::IncorrectDateFormat => "INCORRECT_DATE_FORMAT",
            Reason::IncorrectDateTimeFormat => "INCORRECT_DATETIME_FORMAT",
            Reason::PatternMismatch => "PATTERN_MISMATCH",
            Reason::InvalidChoice => "INVALID_CHOICE",
            Reason::ImageFormatNotSupported => "IMAGE_FORMAT_NOT_SUPPORTED",
            Reason::IdentifierNotFound => "IDENTIFIER_NOT_FOUND",
            Reason::NonUniqueTogether => "NON_UNIQUE_TOGETHER",
            Reason::HookFailed => "HOOK_FAILED",
        }
    }

    /// Parses an uppercase reason code.
    pub fn from_code(code: &str) -> Option<Reason> {
        Reason::ALL.iter().copied().find(|r| r.code() == code)
    }

    /// Every reason, in declaration order.
    pub const ALL: [Reason; 17] = [
        Reason::ColumnMissing,
        Reason::NullNotAllowed,
        Reason::InvalidType,
        Reason::NonNumericValue,
        Reason::BlankNotAllowed,
        Reason::MinLengthValue,
        Reason::MaxLengthValue,
        Reason::MinValue,
        Reason::MaxValue,
        Reason::IncorrectDateFormat,
        Reason::IncorrectDateTimeFormat,
        Reason::PatternMismatch,
        Reason::InvalidChoice,
        Reason::ImageFormatNotSupported,
        Reason::IdentifierNotFound,
        Reason::NonUniqueTogether,
        Reason::HookFailed,
    ];

    /// Renders the default human-readable message for this reason.
    ///
    /// Parameters such as `limit_value` are interpolated when present.
    pub fn default_message(&self, params: &Params) -> String {
        let param = |key: &str| {
            params
                .get(key)
                .map(render_param)
                .unwrap_or_else(|| "?".to_string())
        };

        match self {
            Reason::ColumnMissing => "This column is required.".to_string(),
            Reason::NullNotAllowed => "This field may not be null.".to_string(),
            Reason::InvalidType => "Value has an invalid type for this field.".to_string(),
            Reason::NonNumericValue => "A valid number is required.".to_string(),
            Reason::BlankNotAllowed => "This field may not be blank.".to_string(),
            Reason::MinLengthValue => format!(
                "Ensure this field has at least {} characters.",
                param("limit_value")
            ),
            Reason::MaxLengthValue => format!(
                "Ensure this field has no more than {} characters.",
                param("limit_value")
            ),
            Reason::MinValue => format!(
                "Ensure this value is greater than or equal to {}.",
                param("limit_value")
            ),
            Reason::MaxValue => format!(
                "Ensure this value is less than or equal to {}.",
                param("limit_value")
            ),
            Reason::IncorrectDateFormat => {
                format!("Date has wrong format. Use {}.", param("format"))
            }
            Reason::IncorrectDateTimeFormat => {
                format!("Datetime has wrong format. Use {}.", param("format"))
            }
            Reason::PatternMismatch => {
                format!("This value does not match the pattern {}.", param("pattern"))
            }
            Reason::InvalidChoice => {
                format!("Value is not a valid choice. Choose from {}.", param("choices"))
            }
            Reason::ImageFormatNotSupported => format!(
                "Image format is not supported. Use one of {}.",
                param("supported_extensions")
            ),
            Reason::IdentifierNotFound => "Identifier does not exist.".to_string(),
            Reason::NonUniqueTogether => format!(
                "The fields {} must make a unique set.",
                param("unique_together_fields")
            ),
            Reason::HookFailed => "Custom field validation failed.".to_string(),
        }
    }
}

impl Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

fn render_param(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Array(items) => items
            .iter()
            .map(render_param)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}
