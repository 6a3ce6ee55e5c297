pub mod token;

use logos::Logos;

use crate::diagnostics::HarnessError;
use crate::level::{LanguageFeature, LanguageLevelChecker};
use crate::span::{Span, Spanned};
use token::Token;

/// Tokenize a compilation unit. Numeric literal spellings newer than the
/// checker's version are rejected here, since they never reach the parser
/// as distinct tokens.
pub fn lex(source: &str, level: &LanguageLevelChecker) -> Result<Vec<Spanned<Token>>, HarnessError> {
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer(source);

    while let Some(result) = lexer.next() {
        let span = Span::new(lexer.span().start, lexer.span().end);
        match result {
            Ok(tok) => {
                if tok == Token::IntLit || tok == Token::FloatLit {
                    check_numeric_literal(lexer.slice(), span, source, level)?;
                }
                tokens.push(Spanned::new(tok, span));
            }
            Err(()) => {
                return Err(HarnessError::parse(
                    level.version(),
                    format!("unexpected character '{}'", lexer.slice()),
                    span,
                    source,
                ));
            }
        }
    }

    Ok(tokens)
}

fn check_numeric_literal(
    text: &str,
    span: Span,
    source: &str,
    level: &LanguageLevelChecker,
) -> Result<(), HarnessError> {
    if text.starts_with("0b") || text.starts_with("0B") {
        level.check(LanguageFeature::BinaryLiterals, span, source)?;
    }
    if text.contains('_') {
        level.check(LanguageFeature::UnderscoresInLiterals, span, source)?;
        if text.ends_with('_') || text.contains("_.") || text.contains("._") {
            return Err(HarnessError::parse(
                level.version(),
                format!("illegal underscore in numeric literal '{text}'"),
                span,
                source,
            ));
        }
    }
    Ok(())
}
