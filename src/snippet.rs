//! rustc-like rendering of errors against the YAML source.
//!
//! Errors do not keep the input, so rendering takes it again. A window of two lines before
//! and after the error line is shown, cropped horizontally around the error column.

use annotate_snippets::{AnnotationKind, Level, Renderer, Snippet, renderer::DecorStyle};

use crate::error::Error;
use crate::location::Location;
use crate::options::Options;

/// Columns kept on each side of the error column by [`Error::render`].
pub const DEFAULT_CROP_RADIUS: usize = 64;

impl Error {
    /// Render this error as a rustc-like diagnostic pointing into `source`.
    ///
    /// `path` is shown in the snippet header. Errors without a location (I/O failures) render
    /// as their plain message.
    ///
    /// ```rust
    /// let yaml = "a: 1\nb: [1, 2\n";
    /// let err = yaml_loader::load(yaml).unwrap_err();
    /// let rendered = err.render(yaml, "config.yaml");
    /// assert!(rendered.contains("config.yaml"));
    /// assert!(rendered.contains("b: [1, 2"));
    /// ```
    pub fn render(&self, source: &str, path: &str) -> String {
        self.render_cropped(source, path, DEFAULT_CROP_RADIUS)
    }

    /// Like [`Error::render`], honoring [`Options::with_snippet`] and [`Options::crop_radius`].
    pub fn render_with_options(&self, source: &str, path: &str, options: &Options) -> String {
        if !options.with_snippet || options.crop_radius == 0 {
            return self.to_string();
        }
        self.render_cropped(source, path, options.crop_radius)
    }

    fn render_cropped(&self, source: &str, path: &str, crop_radius: usize) -> String {
        let Some(location) = self.location() else {
            return self.to_string();
        };
        render_window(source, path, &location, &self.message(), crop_radius).unwrap_or_else(|| self.to_string())
    }
}

#[cold]
#[inline(never)]
fn render_window(text: &str, path: &str, location: &Location, msg: &str, crop_radius: usize) -> Option<String> {
    // `Location` is 1-based and uses *character* columns (not byte offsets).
    let row = location.line() as usize;
    let col = location.column() as usize;

    let line_starts = line_starts(text);
    if row == 0 || row > line_starts.len() {
        return None;
    }
    let start = line_col_to_byte_offset_with_starts(text, &line_starts, row, col)?;

    // One character, or an empty span when pointing at the end of a line or of the input.
    let end = match text.as_bytes().get(start) {
        Some(b'\n') | Some(b'\r') => start,
        _ => next_char_boundary(text, start).unwrap_or(start),
    };

    let total_lines = line_starts.len();
    let window_start_row = row.saturating_sub(2).max(1);
    let window_end_row = row.saturating_add(2).min(total_lines);

    let window_start = line_starts[window_start_row - 1];
    let window_end = if window_end_row < total_lines {
        line_starts[window_end_row]
    } else {
        text.len()
    };
    let window_text = &text[window_start..window_end];

    let local_start = start.saturating_sub(window_start).min(window_text.len());
    let local_end = end.saturating_sub(window_start).min(window_text.len());
    let (window_text, local_start, local_end) =
        crop_window_text(window_text, window_start_row, row, col, crop_radius, local_start, local_end);

    let report = &[Level::ERROR
        .primary_title(format!("line {row} column {col}: {msg}"))
        .element(
            Snippet::source(&window_text)
                .line_start(window_start_row)
                .path(path)
                .fold(false)
                .annotation(AnnotationKind::Primary.span(local_start..local_end).label(msg)),
        )];

    // Plain ASCII decorations keep the output free of escape sequences.
    let renderer = Renderer::plain().decor_style(DecorStyle::Ascii);
    Some(renderer.render(report).to_string())
}

/// Replace control characters (except `\n` and `\t`) without changing the byte length, so
/// spans computed on the original text stay valid.
pub(crate) fn sanitize_terminal_snippet_preserve_len(s: String) -> String {
    let mut bytes = s.into_bytes();

    for x in &mut bytes {
        let b = *x;
        if (b < 0x20 && b != b'\n' && b != b'\t') || b == 0x7F {
            *x = b' ';
        }
    }

    // UTF-8 encoded C1 controls (U+0080..U+009F) become NBSP, also two bytes.
    let mut i = 0usize;
    while i + 1 < bytes.len() {
        if bytes[i] == 0xC2 && (0x80..=0x9F).contains(&bytes[i + 1]) {
            bytes[i + 1] = 0xA0;
            i += 2;
            continue;
        }
        i += 1;
    }

    match String::from_utf8(bytes) {
        Ok(out) => out,
        Err(e) => String::from_utf8_lossy(&e.into_bytes()).into_owned(),
    }
}

/// Crop every line of the window to the same column range around the error and drop `\r`.
/// Returns the new text and the annotation span rebased onto it.
fn crop_window_text(
    window_text: &str,
    window_start_row: usize,
    error_row: usize,
    error_col: usize,
    crop_radius: usize,
    local_start: usize,
    local_end: usize,
) -> (String, usize, usize) {
    let left_col = error_col.saturating_sub(crop_radius).max(1);
    let right_col = error_col.saturating_add(crop_radius);

    let mut out = String::with_capacity(window_text.len().min(4096));
    let mut new_local_start = local_start;
    let mut new_local_end = local_end;
    let mut rebased = false;

    let mut row = window_start_row;
    let mut old_pos = 0usize;
    for line_raw in window_text.split_inclusive('\n') {
        let had_nl = line_raw.ends_with('\n');
        let line = line_raw.strip_suffix('\n').unwrap_or(line_raw);
        let line = line.strip_suffix('\r').unwrap_or(line);

        let line_start_new = out.len();
        let (rendered_line, crop) = crop_line_by_cols(line, left_col, right_col);
        out.push_str(&rendered_line);
        if had_nl {
            out.push('\n');
        }

        if row == error_row {
            let old_in_line_start = local_start.saturating_sub(old_pos).min(line.len());
            let old_in_line_end = local_end.saturating_sub(old_pos).min(line.len());
            let max = line_start_new + rendered_line.len();
            new_local_start =
                (line_start_new + crop.prefix_bytes + old_in_line_start.saturating_sub(crop.start_byte)).min(max);
            new_local_end =
                (line_start_new + crop.prefix_bytes + old_in_line_end.saturating_sub(crop.start_byte)).min(max);
            rebased = true;
        }

        old_pos += line_raw.len();
        row += 1;
    }

    // An error on the implicit empty line after a final line break.
    if !rebased && window_text.ends_with('\n') && row == error_row {
        new_local_start = out.len();
        new_local_end = out.len();
    }

    let max = out.len();
    new_local_start = new_local_start.min(max);
    new_local_end = new_local_end.min(max).max(new_local_start);

    (sanitize_terminal_snippet_preserve_len(out), new_local_start, new_local_end)
}

/// Where a cropped line starts in the original, and the bytes of the `…` put in front.
#[derive(Clone, Copy, Debug, Default)]
struct LineCrop {
    start_byte: usize,
    prefix_bytes: usize,
}

/// Crop one line to the 1-based character columns `left_col_1..=right_col_1`.
fn crop_line_by_cols(line: &str, left_col_1: usize, right_col_1: usize) -> (String, LineCrop) {
    let line_len_cols = line.chars().count();
    // Lines that end before the window, or fit in it, are kept whole.
    if left_col_1 > line_len_cols || (left_col_1 <= 1 && right_col_1 >= line_len_cols) {
        return (line.to_owned(), LineCrop::default());
    }

    let end_col_excl = right_col_1.saturating_add(1).min(line_len_cols + 1);
    let start_byte = col_to_byte_offset_in_line(line, left_col_1).unwrap_or(0);
    let end_byte = col_to_byte_offset_in_line(line, end_col_excl).unwrap_or(line.len());

    let left_clipped = start_byte > 0;
    let right_clipped = end_byte < line.len();

    let mut out = String::new();
    if left_clipped {
        out.push('…');
    }
    out.push_str(&line[start_byte..end_byte]);
    if right_clipped {
        out.push('…');
    }

    let prefix_bytes = if left_clipped { '…'.len_utf8() } else { 0 };
    (out, LineCrop { start_byte, prefix_bytes })
}

/// Byte offset of the 1-based column `col_1` in a single line. `len + 1` is the line end.
fn col_to_byte_offset_in_line(line: &str, col_1: usize) -> Option<usize> {
    if col_1 == 0 {
        return None;
    }
    match line.char_indices().nth(col_1 - 1) {
        Some((i, _)) => Some(i),
        None if line.chars().count() + 1 == col_1 => Some(line.len()),
        None => None,
    }
}

/// Byte offsets of all line starts. A trailing `\n` adds a start for the empty last line.
fn line_starts(source: &str) -> Vec<usize> {
    let mut starts = vec![0usize];
    starts.extend(source.bytes().enumerate().filter(|&(_, b)| b == b'\n').map(|(i, _)| i + 1));
    starts
}

fn line_col_to_byte_offset_with_starts(source: &str, starts: &[usize], row_1: usize, col_1: usize) -> Option<usize> {
    let row_idx = row_1.checked_sub(1)?;
    let line_start = *starts.get(row_idx)?;
    let mut line_end = match starts.get(row_idx + 1) {
        Some(next) => next.saturating_sub(1),
        None => source.len(),
    };
    if line_end > line_start && source.as_bytes().get(line_end - 1) == Some(&b'\r') {
        line_end -= 1;
    }
    let line = &source[line_start..line_end];
    col_to_byte_offset_in_line(line, col_1).map(|off| line_start + off)
}

fn next_char_boundary(source: &str, start: usize) -> Option<usize> {
    let ch = source.get(start..)?.chars().next()?;
    Some(start + ch.len_utf8())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_points_at_the_error_line() {
        let yaml = "a: 1\nb: *nope\nc: 3\n";
        let err = crate::load(yaml).unwrap_err();
        let rendered = err.render(yaml, "input.yaml");
        assert!(rendered.contains("input.yaml"), "{rendered}");
        assert!(rendered.contains("b: *nope"), "{rendered}");
        assert!(rendered.contains("line 2 column 4"), "{rendered}");
    }

    #[test]
    fn render_without_snippet_is_display() {
        let yaml = "[1, 2";
        let err = crate::load(yaml).unwrap_err();
        let options = crate::options! { with_snippet: false };
        assert_eq!(err.render_with_options(yaml, "x.yaml", &options), err.to_string());
    }

    #[test]
    fn io_error_renders_as_message() {
        let err: Error = std::io::Error::other("gone").into();
        assert_eq!(err.render("", "x.yaml"), "IO error: gone");
    }

    #[test]
    fn long_lines_are_cropped_around_the_column() {
        let line = format!("{}X{}", "a".repeat(100), "b".repeat(100));
        let (cropped, crop) = crop_line_by_cols(&line, 91, 111);
        assert!(cropped.starts_with('…') && cropped.ends_with('…'));
        assert!(cropped.contains('X'));
        assert_eq!(crop.start_byte, 90);
        assert_eq!(crop.prefix_bytes, '…'.len_utf8());
    }

    #[test]
    fn control_characters_are_neutralized() {
        let clean = sanitize_terminal_snippet_preserve_len("a\u{1b}[31mb\n".to_string());
        assert_eq!(clean, "a [31mb\n");
    }

    #[test]
    fn columns_are_characters() {
        let text = "αβ: x\n";
        let starts = line_starts(text);
        assert_eq!(line_col_to_byte_offset_with_starts(text, &starts, 1, 3), Some(4));
        assert_eq!(line_col_to_byte_offset_with_starts(text, &starts, 1, 6), Some(text.len() - 1));
        assert_eq!(line_col_to_byte_offset_with_starts(text, &starts, 3, 1), None);
    }
}
