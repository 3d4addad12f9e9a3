use std::borrow::Cow;
use std::path::Path;

/// Render a path for use as a tool argument.
///
/// A relative path beginning with `-` would be parsed as an option by ffmpeg
/// or gifsicle, so it gets a `./` prefix.
pub fn safe_path_arg(path: &Path) -> Cow<'_, str> {
    match path.to_string_lossy() {
        s if s.starts_with('-') => Cow::Owned(format!("./{}", s)),
        s => s,
    }
}
