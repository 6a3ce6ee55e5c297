//! Embedding fragments into minimal compilable units.

use crate::diagnostics::HarnessError;

/// Which wrapper a fragment goes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentKind {
    Expression,
    Statement,
}

impl FragmentKind {
    pub fn name(self) -> &'static str {
        match self {
            FragmentKind::Expression => "expression",
            FragmentKind::Statement => "statement",
        }
    }
}

/// A unit whose only initializer assigns `expr` to a fresh variable. The
/// `VariableInitializer` of the parsed unit has a single `Expression` child
/// holding the fragment.
pub fn wrap_expression(expr: &str, imports: &[String]) -> String {
    format!(
        "{}class Foo {{\n    {{\n        Object o = {expr};\n    }}\n}}\n",
        import_block(imports)
    )
}

/// A unit whose only initializer block contains `statement` verbatim. The
/// caller supplies the terminating `;` where the statement needs one.
pub fn wrap_statement(statement: &str, imports: &[String]) -> String {
    format!(
        "{}class Foo {{\n    {{\n        {statement}\n    }}\n}}\n",
        import_block(imports)
    )
}

fn import_block(imports: &[String]) -> String {
    imports.iter().map(|i| format!("{i}\n")).collect()
}

/// Cheap check that `fragment` cannot escape its wrapper.
///
/// Braces must balance and never close more than was opened, and an
/// expression may not contain `;` outside braces. String and character
/// literals and comments are skipped, but a comment may not swallow the
/// wrapper's own text: an expression cannot end in a `//` comment and no
/// fragment can leave a `/*` comment open.
pub fn check_embeddable(fragment: &str, kind: FragmentKind) -> Result<(), HarnessError> {
    let mut depth: usize = 0;
    let mut chars = fragment.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' | '\'' => skip_quoted(&mut chars, c),
            '/' if chars.peek() == Some(&'/') => {
                let closed = chars.by_ref().any(|c| c == '\n');
                if !closed && kind == FragmentKind::Expression {
                    return Err(HarnessError::malformed(format!(
                        "expression fragment ends inside a line comment: {fragment}"
                    )));
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = ' ';
                let closed = chars.by_ref().any(|c| {
                    let end = prev == '*' && c == '/';
                    prev = c;
                    end
                });
                if !closed {
                    return Err(HarnessError::malformed(format!(
                        "{} fragment leaves a block comment open: {fragment}",
                        kind.name()
                    )));
                }
            }
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1).ok_or_else(|| {
                    HarnessError::malformed(format!(
                        "{} fragment closes a brace it never opened: {fragment}",
                        kind.name()
                    ))
                })?;
            }
            ';' if depth == 0 && kind == FragmentKind::Expression => {
                return Err(HarnessError::malformed(format!(
                    "expression fragment contains a statement terminator: {fragment}"
                )));
            }
            _ => {}
        }
    }

    if depth != 0 {
        return Err(HarnessError::malformed(format!(
            "{} fragment leaves {depth} brace(s) open: {fragment}",
            kind.name()
        )));
    }
    Ok(())
}

fn skip_quoted(chars: &mut std::iter::Peekable<std::str::Chars<'_>>, quote: char) {
    while let Some(c) = chars.next() {
        if c == '\\' {
            chars.next();
        } else if c == quote || c == '\n' {
            return;
        }
    }
}
