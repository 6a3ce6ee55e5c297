//! Language-level checks: which constructs each Java version accepts.

use std::fmt;

use crate::diagnostics::HarnessError;
use crate::span::Span;
use crate::version::JavaVersion;

/// A construct that only exists from some Java version onwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageFeature {
    AssertStatements,
    Generics,
    StaticImports,
    EnhancedFor,
    Annotations,
    Enums,
    VarArgs,
    DiamondOperator,
    BinaryLiterals,
    UnderscoresInLiterals,
    TryWithResources,
    MultiCatch,
    LambdaExpressions,
    MethodReferences,
    DefaultMethods,
    StaticInterfaceMethods,
    Modules,
    PrivateInterfaceMethods,
    LocalVariableTypeInference,
    VarInLambdaParameters,
}

impl LanguageFeature {
    pub fn min_version(self) -> JavaVersion {
        use LanguageFeature::*;
        match self {
            AssertStatements => JavaVersion::J1_4,
            Generics | StaticImports | EnhancedFor | Annotations | Enums | VarArgs => {
                JavaVersion::J1_5
            }
            DiamondOperator | BinaryLiterals | UnderscoresInLiterals | TryWithResources
            | MultiCatch => JavaVersion::J1_7,
            LambdaExpressions | MethodReferences | DefaultMethods | StaticInterfaceMethods => {
                JavaVersion::J1_8
            }
            Modules | PrivateInterfaceMethods => JavaVersion::J9,
            LocalVariableTypeInference => JavaVersion::J10,
            VarInLambdaParameters => JavaVersion::J11,
        }
    }

    fn description(self) -> &'static str {
        use LanguageFeature::*;
        match self {
            AssertStatements => "Assert statements",
            Generics => "Generics",
            StaticImports => "Static imports",
            EnhancedFor => "Enhanced for loops",
            Annotations => "Annotations",
            Enums => "Enums",
            VarArgs => "Varargs parameters",
            DiamondOperator => "The diamond operator",
            BinaryLiterals => "Binary numeric literals",
            UnderscoresInLiterals => "Underscores in numeric literals",
            TryWithResources => "Try-with-resources",
            MultiCatch => "Multi-catch",
            LambdaExpressions => "Lambda expressions",
            MethodReferences => "Method references",
            DefaultMethods => "Default interface methods",
            StaticInterfaceMethods => "Static interface methods",
            Modules => "Module declarations",
            PrivateInterfaceMethods => "Private interface methods",
            LocalVariableTypeInference => "Local variable type inference",
            VarInLambdaParameters => "'var' lambda parameters",
        }
    }
}

impl fmt::Display for LanguageFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Rejects constructs newer than the selected version. Every rejection is
/// a parse failure naming that version.
#[derive(Debug, Clone, Copy)]
pub struct LanguageLevelChecker {
    version: JavaVersion,
}

impl LanguageLevelChecker {
    pub fn new(version: JavaVersion) -> Self {
        Self { version }
    }

    pub fn version(&self) -> JavaVersion {
        self.version
    }

    pub fn supports(&self, feature: LanguageFeature) -> bool {
        self.version >= feature.min_version()
    }

    pub fn check(&self, feature: LanguageFeature, span: Span, source: &str) -> Result<(), HarnessError> {
        if self.supports(feature) {
            return Ok(());
        }
        tracing::debug!(%feature, version = %self.version, "language level violation");
        Err(HarnessError::parse(
            self.version,
            format!(
                "{feature} are a feature of Java {}, you should select your language version accordingly (selected: Java {})",
                feature.min_version(),
                self.version
            ),
            span,
            source,
        ))
    }
}
