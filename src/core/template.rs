//! Descriptor template substitution.
//!
//! Rewrites `@NAME@` placeholders against a build specification. The variable
//! set is closed; an unrecognized name is fatal rather than passed through,
//! so a typo in the template cannot ship a literal placeholder.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::{Error, Result};
use crate::spec::BuildSpec;

const DELIMITER: char = '@';

fn lookup<'a>(spec: &'a BuildSpec, name: &str) -> Option<&'a str> {
    match name {
        "PLUGINID" => Some(&spec.plugin_id),
        "SINCE" => Some(&spec.since_build),
        "UNTIL" => Some(&spec.until_build),
        _ => None,
    }
}

/// Substitute every placeholder in a single line.
///
/// Scanning continues strictly after each replacement, so substituted text is
/// never re-scanned and expansion cannot recurse. A trailing unpaired
/// delimiter is literal text, not a token.
pub fn substitute(line: &str, spec: &BuildSpec) -> Result<String> {
    if !line.contains(DELIMITER) {
        return Ok(line.to_string());
    }

    let mut out = String::with_capacity(line.len());
    let mut rest = line;
    while let Some(start) = rest.find(DELIMITER) {
        let after = &rest[start + 1..];
        let Some(len) = after.find(DELIMITER) else {
            break;
        };
        let name = &after[..len];
        let value =
            lookup(spec, name).ok_or_else(|| Error::template_unknown_variable(name))?;
        out.push_str(&rest[..start]);
        out.push_str(value);
        rest = &after[len + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Stream a template document through `substitute`, writing the generated
/// descriptor line by line.
pub fn generate_descriptor(template: &Path, output: &Path, spec: &BuildSpec) -> Result<()> {
    let source = File::open(template).map_err(|e| {
        Error::internal_io(
            format!("{}: {}", template.display(), e),
            Some("open descriptor template".to_string()),
        )
    })?;

    if let Some(parent) = output.parent() {
        crate::utils::io::ensure_dir(parent, "create descriptor dir")?;
    }
    let target = File::create(output).map_err(|e| {
        Error::internal_io(
            format!("{}: {}", output.display(), e),
            Some("create descriptor".to_string()),
        )
    })?;
    let mut writer = BufWriter::new(target);

    for line in BufReader::new(source).lines() {
        let line = line.map_err(|e| {
            Error::internal_io(e.to_string(), Some("read descriptor template".to_string()))
        })?;
        let resolved = substitute(&line, spec)?;
        writeln!(writer, "{}", resolved).map_err(|e| {
            Error::internal_io(e.to_string(), Some("write descriptor".to_string()))
        })?;
    }

    writer
        .flush()
        .map_err(|e| Error::internal_io(e.to_string(), Some("write descriptor".to_string())))?;

    log_status!("template", "Generated {}", output.display());
    Ok(())
}

/// Validate every placeholder in a template without writing anything.
///
/// Returns the number of lines checked; the first unknown variable fails with
/// its one-based line number attached.
pub fn verify_template(template: &Path, spec: &BuildSpec) -> Result<usize> {
    let raw = crate::utils::io::read_file(template, "read descriptor template")?;

    let mut checked = 0;
    for (index, line) in raw.lines().enumerate() {
        substitute(line, spec)
            .map_err(|e| e.with_hint(format!("template line {}", index + 1)))?;
        checked += 1;
    }
    Ok(checked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testutil::{temp_context, write_matrix, MATRIX_ONE};
    use crate::spec::{self, ProductFilter};

    fn master_spec() -> BuildSpec {
        let (_dir, ctx) = temp_context();
        write_matrix(&ctx.root, MATRIX_ONE);
        spec::resolve(&ctx, &ProductFilter::default())
            .unwrap()
            .remove(0)
    }

    #[test]
    fn line_without_delimiter_is_unchanged() {
        let spec = master_spec();
        let line = "  <vendor>flutter.io</vendor>";
        assert_eq!(substitute(line, &spec).unwrap(), line);
    }

    #[test]
    fn plugin_id_placeholder_resolves() {
        let spec = master_spec();
        let result = substitute("<id>@PLUGINID@</id>", &spec).unwrap();
        assert_eq!(result, "<id>io.flutter</id>");
    }

    #[test]
    fn replacement_spans_exactly_the_token() {
        let spec = master_spec();
        let result = substitute("before @SINCE@ after", &spec).unwrap();
        assert_eq!(result, "before 171.1 after");
    }

    #[test]
    fn multiple_placeholders_resolve_in_one_line() {
        let spec = master_spec();
        let result = substitute(
            r#"<idea-version since-build="@SINCE@" until-build="@UNTIL@"/>"#,
            &spec,
        )
        .unwrap();
        assert_eq!(
            result,
            r#"<idea-version since-build="171.1" until-build="171.9999"/>"#
        );
    }

    #[test]
    fn unknown_variable_is_fatal() {
        let spec = master_spec();
        let err = substitute("<id>@BOGUS@</id>", &spec).unwrap_err();
        assert_eq!(err.code.as_str(), "template.unknown_variable");
    }

    #[test]
    fn unpaired_delimiter_is_literal() {
        let spec = master_spec();
        let line = "mail the team @ flutter.io";
        assert_eq!(substitute(line, &spec).unwrap(), line);
    }

    #[test]
    fn scanning_resumes_strictly_after_replacement() {
        let spec = master_spec();
        // The delimiter closing the first token never pairs with the text
        // that follows it; the trailing delimiter is left literal.
        let result = substitute("@SINCE@UNTIL@", &spec).unwrap();
        assert_eq!(result, "171.1UNTIL@");
    }

    #[test]
    fn generate_descriptor_streams_all_lines() {
        let (dir, ctx) = temp_context();
        write_matrix(&ctx.root, MATRIX_ONE);
        let spec = spec::resolve(&ctx, &ProductFilter::default())
            .unwrap()
            .remove(0);

        let template = dir.path().join("plugin.xml.template");
        std::fs::write(
            &template,
            "<idea-plugin>\n  <id>@PLUGINID@</id>\n</idea-plugin>\n",
        )
        .unwrap();

        let output = dir.path().join("out/plugin.xml");
        generate_descriptor(&template, &output, &spec).unwrap();

        let generated = std::fs::read_to_string(output).unwrap();
        assert_eq!(
            generated,
            "<idea-plugin>\n  <id>io.flutter</id>\n</idea-plugin>\n"
        );
    }

    #[test]
    fn verify_template_reports_offending_line() {
        let (dir, _ctx) = temp_context();
        let spec = master_spec();

        let template = dir.path().join("plugin.xml.template");
        std::fs::write(&template, "<id>@PLUGINID@</id>\n<id>@NOPE@</id>\n").unwrap();

        let err = verify_template(&template, &spec).unwrap_err();
        assert_eq!(err.code.as_str(), "template.unknown_variable");
        assert!(err.hints.iter().any(|h| h.message.contains("line 2")));
    }
}
