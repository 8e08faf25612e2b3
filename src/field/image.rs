//! Image file field validation.

use serde_json::{json, Value as Json};

use crate::error::{Reason, Violation};
use crate::interop::ToJsonSchema;
use crate::table::{Column, Value};

use super::traits::{coerce_cells, flagged, into_violations, FieldType};

/// Extensions accepted when none are configured.
pub const DEFAULT_IMAGE_EXTENSIONS: [&str; 7] = ["bmp", "gif", "jpeg", "jpg", "png", "tiff", "webp"];

/// A field for columns of image file names, paths or URLs.
///
/// Cells must be text. Each value's extension (the part after the last `.`
/// of the final path segment, ignoring any `?query` or `#fragment`) is
/// compared case-insensitively against the supported set. Values with an
/// unsupported or missing extension are `IMAGE_FORMAT_NOT_SUPPORTED` with a
/// `supported_extensions` parameter.
///
/// # Example
///
/// ```rust
/// use tablecheck::{Column, Field, FieldType, Reason, Value};
///
/// let field = Field::image().extensions(["png", "jpg"]);
/// let column = Column::new(vec![Value::from("logo.PNG"), Value::from("scan.tiff")]);
///
/// let violations = field.check_constraints(&column);
/// assert_eq!(violations[0].reason, Reason::ImageFormatNotSupported);
/// assert_eq!(violations[0].indexes.iter().copied().collect::<Vec<_>>(), vec![1]);
/// ```
#[derive(Debug, Clone)]
pub struct ImageField {
    extensions: Vec<String>,
    type_error_message: Option<String>,
    format_message: Option<String>,
}

impl ImageField {
    /// Creates an image field accepting [`DEFAULT_IMAGE_EXTENSIONS`].
    pub fn new() -> Self {
        Self {
            extensions: DEFAULT_IMAGE_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            type_error_message: None,
            format_message: None,
        }
    }

    /// Replaces the supported extensions. A leading `.` is ignored.
    pub fn extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
            .collect();
        self
    }

    /// Returns the supported extensions, lowercased.
    pub fn supported_extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Sets the message for unsupported formats.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.format_message = Some(message.into());
        self
    }

    /// Sets the message for cells that are not text.
    pub fn type_error(mut self, message: impl Into<String>) -> Self {
        self.type_error_message = Some(message.into());
        self
    }

    fn is_supported(&self, value: &str) -> bool {
        extension_of(value).is_some_and(|ext| self.extensions.iter().any(|e| *e == ext))
    }
}

impl Default for ImageField {
    fn default() -> Self {
        Self::new()
    }
}

/// Lowercased extension of the last path segment, if any.
fn extension_of(value: &str) -> Option<String> {
    let path = value.split(['?', '#']).next().unwrap_or(value);
    let segment = path.rsplit(['/', '\\']).next().unwrap_or(path);
    match segment.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext.to_ascii_lowercase()),
        _ => None,
    }
}

fn cast_image(value: &Value) -> Result<Value, Reason> {
    match value {
        Value::Text(s) => Ok(Value::Text(s.trim().to_string())),
        _ => Err(Reason::InvalidType),
    }
}

impl FieldType for ImageField {
    fn type_name(&self) -> &'static str {
        "image"
    }

    fn coerce(&self, column: &Column) -> (Column, Vec<Violation>) {
        let (coerced, failures) = coerce_cells(column, cast_image);
        let violations = into_violations(failures, |v| {
            v.with_message_opt(self.type_error_message.as_ref())
        });
        (coerced, violations)
    }

    fn check_constraints(&self, column: &Column) -> Vec<Violation> {
        let rows = column.present_positions(|v| v.as_str().is_some_and(|s| !self.is_supported(s)));
        flagged(Reason::ImageFormatNotSupported, rows)
            .map(|v| {
                v.with_param("supported_extensions", json!(self.extensions))
                    .with_message_opt(self.format_message.as_ref())
            })
            .into_iter()
            .collect()
    }
}

impl ToJsonSchema for ImageField {
    fn to_json_schema(&self) -> Json {
        let alternatives = self.extensions.join("|");
        json!({
            "type": "string",
            "pattern": format!(r"(?i)\.({alternatives})([?#].*)?$"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(v: &Violation) -> Vec<usize> {
        v.indexes.iter().copied().collect()
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("photo.JPG").as_deref(), Some("jpg"));
        assert_eq!(extension_of("/srv/media/a.b/photo.png").as_deref(), Some("png"));
        assert_eq!(
            extension_of("https://cdn.example.com/p/1.webp?size=large#top").as_deref(),
            Some("webp")
        );
        assert_eq!(extension_of("C:\\pics\\scan.tiff").as_deref(), Some("tiff"));
        assert_eq!(extension_of("README"), None);
        assert_eq!(extension_of(".png"), None);
        assert_eq!(extension_of("photo."), None);
        assert_eq!(extension_of("/srv/a.b/photo"), None);
    }

    #[test]
    fn test_unsupported_formats_grouped() {
        let field = ImageField::new().extensions([".png", "JPG"]);
        let column = Column::new(vec![
            Value::from("a.png"),
            Value::from("b.gif"),
            Value::Null,
            Value::from("c.jpg"),
            Value::from("noext"),
        ]);

        let violations = field.check_constraints(&column);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].reason, Reason::ImageFormatNotSupported);
        assert_eq!(rows(&violations[0]), vec![1, 4]);
        assert_eq!(
            violations[0].params.get("supported_extensions"),
            Some(&json!(["png", "jpg"]))
        );
        assert_eq!(
            violations[0].message,
            "Image format is not supported. Use one of png, jpg."
        );
    }

    #[test]
    fn test_non_text_cells_are_invalid_type() {
        let column = Column::new(vec![Value::from(" logo.png "), Value::Int(4)]);
        let (coerced, violations) = ImageField::new().type_error("expected a file name").coerce(&column);

        assert_eq!(coerced.get(0), Some(&Value::from("logo.png")));
        assert_eq!(violations[0].reason, Reason::InvalidType);
        assert_eq!(rows(&violations[0]), vec![1]);
        assert_eq!(violations[0].message, "expected a file name");
    }

    #[test]
    fn test_custom_format_message() {
        let field = ImageField::new().error("upload a picture");
        let violations = field.check_constraints(&Column::new(vec![Value::from("cv.pdf")]));
        assert_eq!(violations[0].message, "upload a picture");
    }
}
