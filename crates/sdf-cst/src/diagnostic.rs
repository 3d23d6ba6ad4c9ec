//! Diagnostic rendering for parser errors.

use ariadne::{Color, Label, Report, ReportKind, Source};

use crate::parser::ParseError;

impl ParseError {
    /// Render this error with ariadne.
    ///
    /// Returns a string containing the formatted error message with source context.
    pub fn render(&self, filename: &str, source: &str) -> String {
        let mut output = Vec::new();
        self.write_report(filename, source, &mut output);
        String::from_utf8(output).unwrap_or_else(|_| format!("{}", self))
    }

    /// Write the error report to a writer.
    pub fn write_report<W: std::io::Write>(&self, filename: &str, source: &str, writer: W) {
        let range = self.range(source);
        let _ = Report::build(ReportKind::Error, (filename, range.clone()))
            .with_message(&self.message)
            .with_label(
                Label::new((filename, range))
                    .with_message(&self.message)
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename, Source::from(source)), writer);
    }

    /// The character at the error offset, or an empty range at end of input.
    fn range(&self, source: &str) -> std::ops::Range<usize> {
        let start = (self.offset as usize).min(source.len());
        let width = source[start..].chars().next().map_or(0, char::len_utf8);
        start..start + width
    }
}

#[cfg(test)]
mod tests {
    use crate::parse;

    #[test]
    fn test_render_mentions_message_and_file() {
        let source = "type A {\n  Id: int\n}";
        let parse = parse(source);
        let error = &parse.errors()[0];
        let rendered = error.render("schema.sdf", source);
        assert!(rendered.contains("expected ';' after entry"), "{rendered}");
        assert!(rendered.contains("schema.sdf"), "{rendered}");
    }

    #[test]
    fn test_render_at_end_of_input() {
        let source = "type A {";
        let parse = parse(source);
        let error = parse.errors().last().unwrap();
        assert_eq!(error.offset as usize, source.len());
        let rendered = error.render("open.sdf", source);
        assert!(rendered.contains("expected '}'"), "{rendered}");
    }
}
